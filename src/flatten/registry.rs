//! Component registry mapping descriptor type names to value handling.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::fields::{ADD_ITEM_COMPONENT, REMOVE_ITEM_COMPONENT, TEXT_COMPONENT};

/// How a descriptor type's value shows up in form output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueHandling {
    /// Ordinary value-bearing field, kept as a leaf in the result.
    Include,
    /// Display or action-only: dropped from value-producing output but
    /// still passed through for rendering.
    Exclude,
    /// Container whose children splice into the current scope, discarding
    /// the container itself.
    Flatten,
}

static DEFAULT_HANDLING: Lazy<HashMap<&'static str, ValueHandling>> = Lazy::new(|| {
    let mut map = HashMap::new();
    map.insert("page", ValueHandling::Flatten);
    map.insert("row", ValueHandling::Flatten);
    map.insert("group", ValueHandling::Include);
    map.insert("array", ValueHandling::Include);
    map.insert("input", ValueHandling::Include);
    map.insert("textarea", ValueHandling::Include);
    map.insert("select", ValueHandling::Include);
    map.insert("radio", ValueHandling::Include);
    map.insert("checkbox", ValueHandling::Include);
    map.insert("toggle", ValueHandling::Include);
    map.insert("hidden", ValueHandling::Include);
    map.insert(TEXT_COMPONENT, ValueHandling::Exclude);
    map.insert(ADD_ITEM_COMPONENT, ValueHandling::Exclude);
    map.insert(REMOVE_ITEM_COMPONENT, ValueHandling::Exclude);
    map
});

/// Per-form registry of descriptor type names.
///
/// The renderer subsystem registers its component types here; unregistered
/// types fall back to `Include`, a value-bearing passthrough rather than an
/// error.
#[derive(Debug, Clone)]
pub struct ComponentRegistry {
    handling: HashMap<String, ValueHandling>,
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self {
            handling: DEFAULT_HANDLING
                .iter()
                .map(|(name, handling)| (name.to_string(), *handling))
                .collect(),
        }
    }
}

impl ComponentRegistry {
    /// Registry preloaded with the built-in component types.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers or overrides the handling for one type name.
    pub fn register(&mut self, type_name: &str, handling: ValueHandling) {
        self.handling.insert(type_name.to_string(), handling);
    }

    /// Handling for a type name; unregistered types default to `Include`.
    pub fn handling(&self, type_name: &str) -> ValueHandling {
        self.handling
            .get(type_name)
            .copied()
            .unwrap_or(ValueHandling::Include)
    }
}
