use crate::conditions::Condition;
use crate::fields::descriptor::FieldDescriptor;

/// A multi-step page of the form.
///
/// Pages never contribute a key: their children flatten into the enclosing
/// scope. A page may not contain another page at any depth.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageField {
    pub key: Option<String>,
    pub fields: Vec<FieldDescriptor>,
    /// Container logic is restricted to `hidden`; multiple entries OR together.
    pub hidden: Vec<Condition>,
}

/// A horizontal layout row. Like pages, rows vanish from the value shape.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RowField {
    pub key: Option<String>,
    pub fields: Vec<FieldDescriptor>,
    pub hidden: Vec<Condition>,
}

/// A group container introducing one nested object scope under its key.
/// An empty key is legal in authored configuration; the flattener assigns
/// a generated one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GroupField {
    pub key: String,
    pub fields: Vec<FieldDescriptor>,
    pub hidden: Vec<Condition>,
}

/// A repeatable array container. Children are item templates: each item is
/// itself an ordered sequence of descriptors forming one per-item scope.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArrayField {
    pub key: String,
    pub items: Vec<Vec<FieldDescriptor>>,
    pub hidden: Vec<Condition>,
}
