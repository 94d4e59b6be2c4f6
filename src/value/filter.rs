//! Output value filtering.
//!
//! Walks the flattened shape next to a live snapshot and the current field
//! states, dropping values whose resolved exclusion policy says so. The
//! three tiers resolve independently per flag: field overrides beat the
//! form-wide overrides, which beat the built-in global policy.

use std::collections::HashMap;

use serde_json::{Map, Value as JsonValue};

use crate::compiler::FieldState;
use crate::fields::{ExclusionOverrides, ExclusionPolicy};
use crate::flatten::FlatNode;
use crate::path::FieldPath;

/// Produces the outward form value for one snapshot.
pub fn filter_value(
    nodes: &[FlatNode],
    snapshot: &JsonValue,
    states: &HashMap<String, FieldState>,
    form_exclusion: &ExclusionOverrides,
    global: ExclusionPolicy,
) -> JsonValue {
    let scope = match snapshot.as_object() {
        Some(map) => map,
        None => return JsonValue::Object(Map::new()),
    };
    let filtered = filter_scope(nodes, scope, &FieldPath::root(), states, form_exclusion, global);
    JsonValue::Object(filtered)
}

fn filter_scope(
    nodes: &[FlatNode],
    scope: &Map<String, JsonValue>,
    path: &FieldPath,
    states: &HashMap<String, FieldState>,
    form_exclusion: &ExclusionOverrides,
    global: ExclusionPolicy,
) -> Map<String, JsonValue> {
    let mut out = Map::new();
    for node in nodes {
        match node {
            FlatNode::Row { children, .. } => {
                out.extend(filter_scope(children, scope, path, states, form_exclusion, global));
            }
            FlatNode::Leaf {
                key,
                value_bearing,
                field,
            } => {
                if !value_bearing {
                    continue;
                }
                let raw = match scope.get(key) {
                    Some(raw) => raw,
                    None => continue,
                };
                // Literal-value leaves have no reactive state to exclude on
                if field.is_hidden_value() {
                    out.insert(key.clone(), raw.clone());
                    continue;
                }
                if included(&path.child(key), &field.exclusion, states, form_exclusion, global) {
                    out.insert(key.clone(), raw.clone());
                }
            }
            FlatNode::Group { key, children, .. } => {
                let child_path = path.child(key);
                if !included(&child_path, &ExclusionOverrides::default(), states, form_exclusion, global)
                {
                    continue;
                }
                match scope.get(key) {
                    Some(JsonValue::Object(nested)) => {
                        let filtered = filter_scope(
                            children,
                            nested,
                            &child_path,
                            states,
                            form_exclusion,
                            global,
                        );
                        out.insert(key.clone(), JsonValue::Object(filtered));
                    }
                    Some(raw) => {
                        out.insert(key.clone(), raw.clone());
                    }
                    None => {}
                }
            }
            // Arrays are excluded or kept whole; items are not filtered
            // individually
            FlatNode::Array { key, .. } => {
                let child_path = path.child(key);
                if !included(&child_path, &ExclusionOverrides::default(), states, form_exclusion, global)
                {
                    continue;
                }
                if let Some(raw) = scope.get(key) {
                    out.insert(key.clone(), raw.clone());
                }
            }
        }
    }
    out
}

/// A field missing from the state map has not been evaluated; it is
/// included rather than silently dropped.
fn included(
    path: &FieldPath,
    overrides: &ExclusionOverrides,
    states: &HashMap<String, FieldState>,
    form_exclusion: &ExclusionOverrides,
    global: ExclusionPolicy,
) -> bool {
    let state = match states.get(&path.to_string()) {
        Some(state) => *state,
        None => return true,
    };
    let policy = ExclusionPolicy::resolve(overrides, form_exclusion, global);
    !((state.hidden && policy.if_hidden)
        || (state.disabled && policy.if_disabled)
        || (state.readonly && policy.if_readonly))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::LeafField;
    use serde_json::json;

    fn hidden_state() -> FieldState {
        FieldState {
            hidden: true,
            disabled: false,
            readonly: false,
        }
    }

    fn disabled_state() -> FieldState {
        FieldState {
            hidden: false,
            disabled: true,
            readonly: false,
        }
    }

    fn input(key: &str) -> FlatNode {
        FlatNode::Leaf {
            key: key.to_string(),
            value_bearing: true,
            field: LeafField::new("input", key),
        }
    }

    fn filter(
        nodes: &[FlatNode],
        snapshot: &JsonValue,
        states: HashMap<String, FieldState>,
    ) -> JsonValue {
        filter_value(
            nodes,
            snapshot,
            &states,
            &ExclusionOverrides::default(),
            ExclusionPolicy::DEFAULT,
        )
    }

    #[test]
    fn test_hidden_value_dropped_by_default() {
        let nodes = vec![input("name"), input("secret")];
        let snapshot = json!({ "name": "Ada", "secret": "x" });
        let mut states = HashMap::new();
        states.insert("secret".to_string(), hidden_state());
        states.insert("name".to_string(), FieldState::default());
        assert_eq!(filter(&nodes, &snapshot, states), json!({ "name": "Ada" }));
    }

    #[test]
    fn test_disabled_value_kept_by_default() {
        let nodes = vec![input("name")];
        let snapshot = json!({ "name": "Ada" });
        let mut states = HashMap::new();
        states.insert("name".to_string(), disabled_state());
        assert_eq!(filter(&nodes, &snapshot, states), json!({ "name": "Ada" }));
    }

    #[test]
    fn test_field_override_beats_form_tier() {
        let mut field = LeafField::new("input", "name");
        field.exclusion.exclude_value_if_hidden = Some(false);
        let nodes = vec![FlatNode::Leaf {
            key: "name".to_string(),
            value_bearing: true,
            field,
        }];
        let snapshot = json!({ "name": "Ada" });
        let mut states = HashMap::new();
        states.insert("name".to_string(), hidden_state());
        // Form tier says exclude hidden; the field override keeps it
        let form = ExclusionOverrides {
            exclude_value_if_hidden: Some(true),
            ..ExclusionOverrides::default()
        };
        let filtered = filter_value(&nodes, &snapshot, &states, &form, ExclusionPolicy::DEFAULT);
        assert_eq!(filtered, json!({ "name": "Ada" }));
    }

    #[test]
    fn test_form_tier_excludes_disabled() {
        let nodes = vec![input("name")];
        let snapshot = json!({ "name": "Ada" });
        let mut states = HashMap::new();
        states.insert("name".to_string(), disabled_state());
        let form = ExclusionOverrides {
            exclude_value_if_disabled: Some(true),
            ..ExclusionOverrides::default()
        };
        let filtered = filter_value(&nodes, &snapshot, &states, &form, ExclusionPolicy::DEFAULT);
        assert_eq!(filtered, json!({}));
    }

    #[test]
    fn test_hidden_group_drops_whole_object() {
        let nodes = vec![FlatNode::Group {
            key: "address".to_string(),
            hidden: Vec::new(),
            children: vec![input("street")],
        }];
        let snapshot = json!({ "address": { "street": "Main" } });
        let mut states = HashMap::new();
        states.insert("address".to_string(), hidden_state());
        assert_eq!(filter(&nodes, &snapshot, states), json!({}));
    }

    #[test]
    fn test_group_children_filter_recursively() {
        let nodes = vec![FlatNode::Group {
            key: "address".to_string(),
            hidden: Vec::new(),
            children: vec![input("street"), input("unit")],
        }];
        let snapshot = json!({ "address": { "street": "Main", "unit": "4b" } });
        let mut states = HashMap::new();
        states.insert("address".to_string(), FieldState::default());
        states.insert("address.street".to_string(), FieldState::default());
        states.insert("address.unit".to_string(), hidden_state());
        assert_eq!(
            filter(&nodes, &snapshot, states),
            json!({ "address": { "street": "Main" } })
        );
    }

    #[test]
    fn test_hidden_array_drops_whole_list() {
        let nodes = vec![FlatNode::Array {
            key: "tags".to_string(),
            hidden: Vec::new(),
            items: Vec::new(),
        }];
        let snapshot = json!({ "tags": [{ "label": "a" }] });
        let mut states = HashMap::new();
        states.insert("tags".to_string(), hidden_state());
        assert_eq!(filter(&nodes, &snapshot, states), json!({}));
    }

    #[test]
    fn test_literal_value_leaf_always_included() {
        let mut field = LeafField::new("hidden", "version");
        field.value = Some(json!(3));
        let nodes = vec![FlatNode::Leaf {
            key: "version".to_string(),
            value_bearing: true,
            field,
        }];
        let snapshot = json!({ "version": 3 });
        assert_eq!(
            filter(&nodes, &snapshot, HashMap::new()),
            json!({ "version": 3 })
        );
    }

    #[test]
    fn test_display_leaf_never_included() {
        let nodes = vec![FlatNode::Leaf {
            key: "note".to_string(),
            value_bearing: false,
            field: LeafField::new("text", "note"),
        }];
        let snapshot = json!({ "note": "stray" });
        assert_eq!(filter(&nodes, &snapshot, HashMap::new()), json!({}));
    }
}
