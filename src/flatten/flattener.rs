//! Single-pass flattener over a normalized descriptor tree.
//!
//! Pages (and by default rows) vanish: their children splice into the
//! enclosing scope. Groups and arrays survive with their own children
//! recursively flattened, so value scopes are preserved. Every emitted
//! node is guaranteed a non-empty key, generated where the author omitted
//! one.

use crate::conditions::Condition;
use crate::fields::containers::{ArrayField, GroupField, RowField};
use crate::fields::logic::LogicRule;
use crate::fields::{FieldDescriptor, LeafField};
use crate::flatten::registry::{ComponentRegistry, ValueHandling};

/// One node of the flattened form shape.
#[derive(Debug, Clone, PartialEq)]
pub enum FlatNode {
    Leaf {
        key: String,
        /// False for exclude-mode types (display text, generated array
        /// controls): rendered, never part of the output value.
        value_bearing: bool,
        field: LeafField,
    },
    /// Present only when row preservation is requested for rendering.
    Row {
        key: String,
        hidden: Vec<Condition>,
        children: Vec<FlatNode>,
    },
    Group {
        key: String,
        hidden: Vec<Condition>,
        children: Vec<FlatNode>,
    },
    Array {
        key: String,
        hidden: Vec<Condition>,
        items: Vec<Vec<FlatNode>>,
    },
}

impl FlatNode {
    pub fn key(&self) -> &str {
        match self {
            Self::Leaf { key, .. }
            | Self::Row { key, .. }
            | Self::Group { key, .. }
            | Self::Array { key, .. } => key,
        }
    }
}

/// Flattening options. Row preservation is a rendering concern: the
/// value-producing shape is identical either way.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlattenOptions {
    pub preserve_rows: bool,
}

/// Generated-key counters for one scope. Shared across spliced page/row
/// children (they land in the same scope), fresh for each group and each
/// array item, so sibling scopes may reuse the same generated names.
#[derive(Debug, Default)]
struct AutoKeys {
    field: usize,
    row: usize,
    group: usize,
    array: usize,
}

impl AutoKeys {
    fn next(counter: &mut usize, prefix: &str) -> String {
        let key = format!("{}_{}", prefix, *counter);
        *counter += 1;
        key
    }

    fn next_field(&mut self) -> String {
        Self::next(&mut self.field, "auto_field")
    }

    fn next_row(&mut self) -> String {
        Self::next(&mut self.row, "auto_row")
    }

    fn next_group(&mut self) -> String {
        Self::next(&mut self.group, "auto_group")
    }

    fn next_array(&mut self) -> String {
        Self::next(&mut self.array, "auto_array")
    }
}

/// Flattens a normalized descriptor tree.
pub fn flatten(
    fields: &[FieldDescriptor],
    registry: &ComponentRegistry,
    options: FlattenOptions,
) -> Vec<FlatNode> {
    let mut keys = AutoKeys::default();
    flatten_scope(fields, registry, options, &mut keys, &[])
}

/// `inherited` carries hidden conditions of spliced ancestors (pages,
/// non-preserved rows): their container node vanishes, so the conditions
/// attach to whatever survives below.
fn flatten_scope(
    fields: &[FieldDescriptor],
    registry: &ComponentRegistry,
    options: FlattenOptions,
    keys: &mut AutoKeys,
    inherited: &[Condition],
) -> Vec<FlatNode> {
    let mut out = Vec::new();
    for field in fields {
        match field {
            FieldDescriptor::Page(page) => {
                // Pages always splice; their own key never reaches output
                let hidden = chain_hidden(inherited, &page.hidden);
                out.extend(flatten_scope(&page.fields, registry, options, keys, &hidden));
            }
            FieldDescriptor::Row(row) => {
                if options.preserve_rows {
                    out.push(flatten_row(row, registry, options, keys, inherited));
                } else {
                    let hidden = chain_hidden(inherited, &row.hidden);
                    out.extend(flatten_scope(&row.fields, registry, options, keys, &hidden));
                }
            }
            FieldDescriptor::Group(group) => {
                out.push(flatten_group(group, registry, options, keys, inherited));
            }
            FieldDescriptor::Array(array) => {
                out.push(flatten_array(array, registry, options, keys, inherited));
            }
            FieldDescriptor::Leaf(leaf) => out.push(flatten_leaf(leaf, registry, keys, inherited)),
        }
    }
    out
}

fn chain_hidden(inherited: &[Condition], own: &[Condition]) -> Vec<Condition> {
    inherited.iter().chain(own).cloned().collect()
}

fn flatten_row(
    row: &RowField,
    registry: &ComponentRegistry,
    options: FlattenOptions,
    keys: &mut AutoKeys,
    inherited: &[Condition],
) -> FlatNode {
    let key = match row.key.as_deref().filter(|key| !key.is_empty()) {
        Some(key) => key.to_string(),
        None => keys.next_row(),
    };
    // Row children stay in the enclosing value scope, so the same counters
    // keep flowing through; the surviving row node carries the inherited
    // conditions, not the children
    let children = flatten_scope(&row.fields, registry, options, keys, &[]);
    FlatNode::Row {
        key,
        hidden: chain_hidden(inherited, &row.hidden),
        children,
    }
}

fn flatten_group(
    group: &GroupField,
    registry: &ComponentRegistry,
    options: FlattenOptions,
    keys: &mut AutoKeys,
    inherited: &[Condition],
) -> FlatNode {
    let key = if group.key.is_empty() {
        keys.next_group()
    } else {
        group.key.clone()
    };
    let mut nested = AutoKeys::default();
    let children = flatten_scope(&group.fields, registry, options, &mut nested, &[]);
    FlatNode::Group {
        key,
        hidden: chain_hidden(inherited, &group.hidden),
        children,
    }
}

fn flatten_array(
    array: &ArrayField,
    registry: &ComponentRegistry,
    options: FlattenOptions,
    keys: &mut AutoKeys,
    inherited: &[Condition],
) -> FlatNode {
    let key = if array.key.is_empty() {
        keys.next_array()
    } else {
        array.key.clone()
    };
    let items = array
        .items
        .iter()
        .map(|item| {
            let mut item_keys = AutoKeys::default();
            flatten_scope(item, registry, options, &mut item_keys, &[])
        })
        .collect();
    FlatNode::Array {
        key,
        hidden: chain_hidden(inherited, &array.hidden),
        items,
    }
}

fn flatten_leaf(
    leaf: &LeafField,
    registry: &ComponentRegistry,
    keys: &mut AutoKeys,
    inherited: &[Condition],
) -> FlatNode {
    let mut field = leaf.clone();
    if field.key.is_empty() {
        field.key = keys.next_field();
    }
    for condition in inherited {
        field.logic.push(LogicRule::Hidden(condition.clone()));
    }
    let value_bearing = registry.handling(&field.component) != ValueHandling::Exclude;
    FlatNode::Leaf {
        key: field.key.clone(),
        value_bearing,
        field,
    }
}

/// Rebuilds an explicit descriptor tree from flattened nodes. Useful for
/// re-flattening checks and for callers that want the flattened shape in
/// descriptor form.
pub fn to_descriptors(nodes: &[FlatNode]) -> Vec<FieldDescriptor> {
    nodes
        .iter()
        .map(|node| match node {
            FlatNode::Leaf { field, .. } => FieldDescriptor::Leaf(field.clone()),
            FlatNode::Row {
                key,
                hidden,
                children,
            } => FieldDescriptor::Row(RowField {
                key: Some(key.clone()),
                fields: to_descriptors(children),
                hidden: hidden.clone(),
            }),
            FlatNode::Group {
                key,
                hidden,
                children,
            } => FieldDescriptor::Group(GroupField {
                key: key.clone(),
                fields: to_descriptors(children),
                hidden: hidden.clone(),
            }),
            FlatNode::Array { key, hidden, items } => FieldDescriptor::Array(ArrayField {
                key: key.clone(),
                items: items.iter().map(|item| to_descriptors(item)).collect(),
                hidden: hidden.clone(),
            }),
        })
        .collect()
}
