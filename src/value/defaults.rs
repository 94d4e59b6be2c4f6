//! Initial value extraction from a flattened form shape.

use serde_json::{Map, Value as JsonValue};

use crate::flatten::FlatNode;

const CHECKBOX_COMPONENTS: [&str; 3] = ["checkbox", "toggle", "switch"];

/// Builds the initial snapshot: declared values win over declared defaults,
/// and a type-appropriate zero value fills the rest. Groups nest, rows
/// splice, arrays emit one object per existing item (or an empty list).
pub fn default_values(nodes: &[FlatNode]) -> JsonValue {
    let mut map = Map::new();
    collect(nodes, &mut map);
    JsonValue::Object(map)
}

fn collect(nodes: &[FlatNode], map: &mut Map<String, JsonValue>) {
    for node in nodes {
        match node {
            FlatNode::Leaf {
                key,
                value_bearing,
                field,
            } => {
                if !value_bearing {
                    continue;
                }
                let default = field
                    .value
                    .clone()
                    .or_else(|| field.default_value.clone())
                    .unwrap_or_else(|| zero_value(&field.component));
                map.insert(key.clone(), default);
            }
            FlatNode::Row { children, .. } => collect(children, map),
            FlatNode::Group { key, children, .. } => {
                let mut nested = Map::new();
                collect(children, &mut nested);
                map.insert(key.clone(), JsonValue::Object(nested));
            }
            FlatNode::Array { key, items, .. } => {
                let entries = items
                    .iter()
                    .map(|item| {
                        let mut entry = Map::new();
                        collect(item, &mut entry);
                        JsonValue::Object(entry)
                    })
                    .collect();
                map.insert(key.clone(), JsonValue::Array(entries));
            }
        }
    }
}

fn zero_value(component: &str) -> JsonValue {
    if CHECKBOX_COMPONENTS.contains(&component) {
        JsonValue::Bool(false)
    } else {
        JsonValue::String(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::LeafField;
    use serde_json::json;

    fn input(key: &str) -> FlatNode {
        FlatNode::Leaf {
            key: key.to_string(),
            value_bearing: true,
            field: LeafField::new("input", key),
        }
    }

    #[test]
    fn test_zero_values_per_component() {
        let mut agree = LeafField::new("checkbox", "agree");
        agree.default_value = None;
        let nodes = vec![
            input("name"),
            FlatNode::Leaf {
                key: "agree".to_string(),
                value_bearing: true,
                field: agree,
            },
        ];
        assert_eq!(
            default_values(&nodes),
            json!({ "name": "", "agree": false })
        );
    }

    #[test]
    fn test_value_wins_over_default() {
        let mut field = LeafField::new("input", "name");
        field.value = Some(json!("Ada"));
        field.default_value = Some(json!("Grace"));
        let nodes = vec![FlatNode::Leaf {
            key: "name".to_string(),
            value_bearing: true,
            field,
        }];
        assert_eq!(default_values(&nodes), json!({ "name": "Ada" }));
    }

    #[test]
    fn test_groups_nest_and_rows_splice() {
        let nodes = vec![
            FlatNode::Row {
                key: "auto_row_0".to_string(),
                hidden: Vec::new(),
                children: vec![input("first")],
            },
            FlatNode::Group {
                key: "address".to_string(),
                hidden: Vec::new(),
                children: vec![input("street")],
            },
        ];
        assert_eq!(
            default_values(&nodes),
            json!({ "first": "", "address": { "street": "" } })
        );
    }

    #[test]
    fn test_array_items_become_objects() {
        let nodes = vec![FlatNode::Array {
            key: "tags".to_string(),
            hidden: Vec::new(),
            items: vec![vec![input("label")], vec![input("label")]],
        }];
        assert_eq!(
            default_values(&nodes),
            json!({ "tags": [{ "label": "" }, { "label": "" }] })
        );
    }

    #[test]
    fn test_display_fields_contribute_nothing() {
        let nodes = vec![FlatNode::Leaf {
            key: "note".to_string(),
            value_bearing: false,
            field: LeafField::new("text", "note"),
        }];
        assert_eq!(default_values(&nodes), json!({}));
    }

    #[test]
    fn test_hidden_value_literal() {
        let mut field = LeafField::new("hidden", "version");
        field.value = Some(json!(3));
        let nodes = vec![FlatNode::Leaf {
            key: "version".to_string(),
            value_bearing: true,
            field,
        }];
        assert_eq!(default_values(&nodes), json!({ "version": 3 }));
    }
}
