//! End-to-end tests over the full preparation and evaluation pipeline:
//! JSON in, defaults, states, violations, derived values and filtered
//! output out.

use serde_json::json;

use dynaform::{ConditionContext, FlatNode, FormEngine, RawFormConfig};

fn engine(config: serde_json::Value) -> FormEngine {
    let _ = env_logger::builder().is_test(true).try_init();
    let raw: RawFormConfig = serde_json::from_value(config).expect("config parses");
    FormEngine::new(raw).expect("engine builds")
}

#[test]
fn test_paged_form_flattens_to_one_value_scope() {
    let engine = engine(json!({
        "fields": [
            {"type": "page", "key": "personal", "fields": [
                {"type": "row", "fields": [
                    {"type": "input", "key": "first"},
                    {"type": "input", "key": "last"}
                ]}
            ]},
            {"type": "page", "key": "contact", "fields": [
                {"type": "input", "key": "email"}
            ]}
        ]
    }));

    // Page and row keys never reach the value shape
    assert_eq!(
        engine.default_values(),
        json!({ "first": "", "last": "", "email": "" })
    );
}

#[test]
fn test_group_scopes_nest_in_defaults_and_output() {
    let engine = engine(json!({
        "fields": [
            {"type": "input", "key": "name"},
            {"type": "group", "key": "address", "fields": [
                {"type": "input", "key": "street"},
                {"type": "input", "key": "city", "value": "Oslo"}
            ]}
        ]
    }));

    let defaults = engine.default_values();
    assert_eq!(
        defaults,
        json!({ "name": "", "address": { "street": "", "city": "Oslo" } })
    );
    assert_eq!(engine.output_value(&defaults), defaults);
}

#[test]
fn test_simplified_array_expands_end_to_end() {
    let engine = engine(json!({
        "fields": [{
            "type": "array",
            "key": "tags",
            "template": {"type": "input", "key": "label"},
            "value": ["alpha", "beta"]
        }]
    }));

    let defaults = engine.default_values();
    assert_eq!(
        defaults,
        json!({ "tags": [{ "label": "alpha" }, { "label": "beta" }] })
    );
    // Generated add/remove controls never contribute values
    assert_eq!(engine.output_value(&defaults), defaults);

    // The add control keeps a value-less blueprint of the item to insert
    let add = engine
        .compiled()
        .flat()
        .iter()
        .find_map(|node| match node {
            FlatNode::Leaf { field, .. } if field.component == "addArrayItem" => Some(field),
            _ => None,
        })
        .expect("add control present");
    assert_eq!(add.template.len(), 1);
    let blueprint = add.template[0].as_leaf().expect("leaf blueprint");
    assert_eq!(blueprint.key, "label");
    assert!(blueprint.value.is_none());
}

#[test]
fn test_hidden_page_fields_drop_out_of_validation_and_output() {
    let engine = engine(json!({
        "fields": [
            {"type": "page", "key": "visible_page", "fields": [
                {"type": "input", "key": "visible"}
            ]},
            {"type": "page", "key": "secret_page",
             "logic": [{"type": "hidden", "condition": true}],
             "fields": [
                {"type": "input", "key": "secret", "required": true}
            ]}
        ]
    }));

    let snapshot = json!({ "visible": "v", "secret": "" });
    let evaluation = engine.evaluate(&snapshot);
    assert!(evaluation.state("secret").hidden);
    assert!(evaluation.is_valid());
    assert_eq!(engine.output_value(&snapshot), json!({ "visible": "v" }));
}

#[test]
fn test_multiple_hidden_conditions_combine_as_or() {
    let engine = engine(json!({
        "fields": [
            {"type": "input", "key": "a"},
            {"type": "input", "key": "b"},
            {"type": "input", "key": "detail", "logic": [
                {"type": "hidden", "condition": {
                    "fieldPath": "a", "operator": "equals", "value": "x"
                }},
                {"type": "hidden", "condition": {
                    "fieldPath": "b", "operator": "equals", "value": "y"
                }}
            ]}
        ]
    }));

    let hidden = |snapshot: &serde_json::Value| engine.evaluate(snapshot).state("detail").hidden;
    assert!(!hidden(&json!({ "a": "", "b": "" })));
    assert!(hidden(&json!({ "a": "x", "b": "" })));
    assert!(hidden(&json!({ "a": "", "b": "y" })));
    assert!(hidden(&json!({ "a": "x", "b": "y" })));
}

#[test]
fn test_missing_path_compares_like_null() {
    let engine = engine(json!({
        "fields": [
            {"type": "input", "key": "detail", "logic": [
                {"type": "hidden", "condition": {
                    "fieldPath": "a.b.c", "operator": "equals", "value": null
                }}
            ]}
        ]
    }));

    // `a.b.c` resolves nowhere; equality against null holds
    assert!(engine.evaluate(&json!({})).state("detail").hidden);
}

#[test]
fn test_unregistered_custom_condition_fails_closed() {
    let engine = engine(json!({
        "fields": [
            {"type": "input", "key": "detail", "logic": [
                {"type": "hidden", "condition": {"custom": "neverRegistered"}}
            ]}
        ]
    }));

    assert!(!engine.evaluate(&json!({})).state("detail").hidden);
}

#[test]
fn test_registered_custom_condition_drives_state() {
    let raw: RawFormConfig = serde_json::from_value(json!({
        "fields": [
            {"type": "input", "key": "count"},
            {"type": "input", "key": "detail", "logic": [
                {"type": "hidden", "condition": {"custom": "manyItems"}}
            ]}
        ]
    }))
    .unwrap();
    let mut engine = FormEngine::new(raw).unwrap();
    engine.register_condition(
        "manyItems",
        Box::new(|ctx: &ConditionContext| {
            ctx.form_value
                .get("count")
                .and_then(|count| count.as_f64())
                .map(|count| count > 3.0)
                .unwrap_or(false)
        }),
    );

    assert!(engine.evaluate(&json!({ "count": 5 })).state("detail").hidden);
    assert!(!engine.evaluate(&json!({ "count": 2 })).state("detail").hidden);
}

#[test]
fn test_malformed_expression_condition_fails_closed() {
    let engine = engine(json!({
        "fields": [
            {"type": "input", "key": "detail", "logic": [
                {"type": "hidden", "condition": {"expression": "prices += 1;"}}
            ]}
        ]
    }));

    // Statements are outside the grammar; the condition parses to nothing
    // and evaluates false
    assert!(!engine.evaluate(&json!({})).state("detail").hidden);
}

#[test]
fn test_derived_value_follows_inputs() {
    let engine = engine(json!({
        "fields": [
            {"type": "input", "key": "quantity"},
            {"type": "input", "key": "price"},
            {"type": "input", "key": "total", "logic": [
                {"type": "derive", "expression": "quantity * price"}
            ]}
        ]
    }));

    let evaluation = engine.evaluate(&json!({ "quantity": 3, "price": 2.5, "total": 0 }));
    assert_eq!(evaluation.derived.get("total"), Some(&json!(7.5)));
}

#[test]
fn test_form_tier_exclusion_applies_where_field_is_silent() {
    let engine = engine(json!({
        "excludeValueIfDisabled": true,
        "fields": [
            {"type": "input", "key": "plain", "disabled": true},
            {"type": "input", "key": "opted_out", "disabled": true,
             "excludeValueIfDisabled": false}
        ]
    }));

    let snapshot = json!({ "plain": "a", "opted_out": "b" });
    // `plain` inherits the form tier; the field override keeps `opted_out`
    assert_eq!(engine.output_value(&snapshot), json!({ "opted_out": "b" }));
}

#[test]
fn test_hidden_group_value_dropped_whole() {
    let engine = engine(json!({
        "fields": [
            {"type": "checkbox", "key": "shipping_differs"},
            {"type": "group", "key": "shipping", "logic": [
                {"type": "hidden", "condition": {
                    "fieldPath": "shipping_differs", "operator": "equals", "value": false
                }}
            ], "fields": [
                {"type": "input", "key": "street"}
            ]}
        ]
    }));

    let snapshot = json!({
        "shipping_differs": false,
        "shipping": { "street": "Main" }
    });
    assert_eq!(
        engine.output_value(&snapshot),
        json!({ "shipping_differs": false })
    );
}

#[test]
fn test_hidden_value_leaf_survives_filtering() {
    let engine = engine(json!({
        "fields": [
            {"type": "hidden", "key": "form_version", "value": 7},
            {"type": "text", "key": "blurb", "value": "Welcome"}
        ]
    }));

    let defaults = engine.default_values();
    assert_eq!(defaults, json!({ "form_version": 7 }));
    assert_eq!(engine.output_value(&defaults), json!({ "form_version": 7 }));
}

#[test]
fn test_constraint_when_gate_reacts_to_other_fields() {
    let engine = engine(json!({
        "fields": [
            {"type": "checkbox", "key": "subscribe"},
            {"type": "input", "key": "email", "validators": [
                {"type": "required", "message": "Email needed to subscribe",
                 "when": {"fieldPath": "subscribe", "operator": "equals", "value": true}}
            ]}
        ]
    }));

    assert!(engine
        .evaluate(&json!({ "subscribe": false, "email": "" }))
        .is_valid());

    let evaluation = engine.evaluate(&json!({ "subscribe": true, "email": "" }));
    assert_eq!(evaluation.violations.len(), 1);
    assert_eq!(evaluation.violations[0].message, "Email needed to subscribe");
}

#[test]
fn test_schema_bundle_applied_through_pipeline() {
    let engine = engine(json!({
        "schemas": [{
            "name": "percentage",
            "validators": [
                {"type": "min", "value": 0},
                {"type": "max", "value": 100}
            ]
        }],
        "fields": [
            {"type": "input", "key": "discount", "schemas": ["percentage"]}
        ]
    }));

    assert!(engine.evaluate(&json!({ "discount": 50 })).is_valid());
    let evaluation = engine.evaluate(&json!({ "discount": 120 }));
    assert_eq!(evaluation.violations.len(), 1);
    assert_eq!(evaluation.violations[0].constraint, "max");
}

#[test]
fn test_structural_warnings_surface_in_report() {
    let engine = engine(json!({
        "fields": [{"type": "page", "fields": [{"type": "input", "key": "a"}]}]
    }));
    assert!(engine
        .report()
        .warnings
        .iter()
        .any(|warning| warning.contains("single page")));
}
