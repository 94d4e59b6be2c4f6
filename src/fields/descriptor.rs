use crate::conditions::Condition;
use crate::fields::containers::{ArrayField, GroupField, PageField, RowField};
use crate::fields::leaf::LeafField;

/// Type name used for the page container in raw configuration.
pub const PAGE_TYPE: &str = "page";
/// Type name used for the row container in raw configuration.
pub const ROW_TYPE: &str = "row";
/// Type name used for the group container in raw configuration.
pub const GROUP_TYPE: &str = "group";
/// Type name used for the array container in raw configuration.
pub const ARRAY_TYPE: &str = "array";

/// Enumeration over all descriptor variants.
///
/// Two families: containers (page, row, group, array) holding child
/// descriptors, and leaves carrying a value or display content.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldDescriptor {
    Page(PageField),
    Row(RowField),
    Group(GroupField),
    Array(ArrayField),
    Leaf(LeafField),
}

impl FieldDescriptor {
    /// The descriptor's type tag: a fixed name for containers, the open
    /// component name for leaves.
    pub fn type_name(&self) -> &str {
        match self {
            Self::Page(_) => PAGE_TYPE,
            Self::Row(_) => ROW_TYPE,
            Self::Group(_) => GROUP_TYPE,
            Self::Array(_) => ARRAY_TYPE,
            Self::Leaf(leaf) => &leaf.component,
        }
    }

    /// The authored key, if any. Page and row keys are carried for
    /// diagnostics but never appear in the value shape.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Page(page) => page.key.as_deref(),
            Self::Row(row) => row.key.as_deref(),
            Self::Group(group) => Some(&group.key).filter(|k| !k.is_empty()).map(String::as_str),
            Self::Array(array) => Some(&array.key).filter(|k| !k.is_empty()).map(String::as_str),
            Self::Leaf(leaf) => Some(&leaf.key).filter(|k| !k.is_empty()).map(String::as_str),
        }
    }

    pub fn is_container(&self) -> bool {
        !matches!(self, Self::Leaf(_))
    }

    /// Hidden conditions attached to this descriptor, whatever its family.
    pub fn hidden_conditions(&self) -> Vec<&Condition> {
        match self {
            Self::Page(page) => page.hidden.iter().collect(),
            Self::Row(row) => row.hidden.iter().collect(),
            Self::Group(group) => group.hidden.iter().collect(),
            Self::Array(array) => array.hidden.iter().collect(),
            Self::Leaf(leaf) => leaf.hidden_conditions().collect(),
        }
    }

    pub fn as_leaf(&self) -> Option<&LeafField> {
        match self {
            Self::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }
}
