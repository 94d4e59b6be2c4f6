//! # Tree Normalizer
//!
//! Expands simplified-array shorthand (`template` + `value[]` + optional
//! `addButton`/`removeButton` flags) into the explicit descriptor shape:
//! one item per `value[]` entry, a generated remove control sharing each
//! item's row, and a generated add control emitted as a sibling after the
//! array. All other nodes pass through with their children normalized.
//!
//! The transform is purely additive sugar and idempotent: a tree without
//! `template` properties comes back unchanged.

use serde_json::Value as JsonValue;

use crate::config::types::{RawChildren, RawField, RawFormConfig, RawTemplate};
use crate::fields::{ADD_ITEM_COMPONENT, REMOVE_ITEM_COMPONENT, REMOVE_ITEM_KEY};

/// Normalizes a whole raw configuration.
pub fn normalize_config(mut config: RawFormConfig) -> RawFormConfig {
    config.fields = normalize_fields(config.fields);
    config
}

/// Normalizes a raw descriptor list. One input node may expand to several
/// output nodes (an array plus its generated add control).
pub fn normalize_fields(fields: Vec<RawField>) -> Vec<RawField> {
    let mut result = Vec::with_capacity(fields.len());
    for field in fields {
        result.extend(normalize_field(field));
    }
    result
}

fn normalize_field(mut field: RawField) -> Vec<RawField> {
    // Recurse first, then rebuild this node
    field.fields = field.fields.map(|children| match children {
        RawChildren::Fields(fields) => RawChildren::Fields(normalize_fields(fields)),
        RawChildren::Items(items) => {
            RawChildren::Items(items.into_iter().map(normalize_fields).collect())
        }
    });

    // Presence of `template` on an array is the shorthand discriminant
    if field.field_type == "array" && field.template.is_some() {
        return expand_simplified_array(field);
    }

    vec![field]
}

fn expand_simplified_array(mut field: RawField) -> Vec<RawField> {
    let template = match field.template.take() {
        Some(template) => template,
        None => return vec![field],
    };
    let entries = match field.value.take() {
        Some(JsonValue::Array(entries)) => entries,
        _ => Vec::new(),
    };

    let with_remove = field.remove_button != Some(false);
    let with_add = field.add_button != Some(false);

    let items: Vec<Vec<RawField>> = entries
        .iter()
        .map(|entry| build_item(&template, entry, with_remove))
        .collect();

    field.fields = Some(RawChildren::Items(items));
    field.add_button = None;
    field.remove_button = None;

    let mut result = vec![field];

    if with_add {
        let array_key = result[0].key.clone().unwrap_or_default();
        let mut add = RawField::new(ADD_ITEM_COMPONENT).with_key(&format!("{}__add", array_key));
        // A value-less copy of the template, for use when a new item is
        // inserted at runtime
        add.template = Some(strip_template_values(template));
        result.push(add);
    }

    result
}

/// Builds one explicit item from the template and one `value[]` entry.
///
/// A single-leaf template takes the entry wholesale; a multi-field template
/// merges each field with the matching key of an object entry, leaving
/// missing keys at the template's own default.
fn build_item(template: &RawTemplate, entry: &JsonValue, with_remove: bool) -> Vec<RawField> {
    let mut item_fields: Vec<RawField> = match template {
        RawTemplate::Single(field) => {
            let mut merged = (**field).clone();
            merged.value = Some(entry.clone());
            vec![merged]
        }
        RawTemplate::Many(fields) => fields
            .iter()
            .map(|field| {
                let mut merged = field.clone();
                if let (JsonValue::Object(map), Some(key)) = (entry, &field.key) {
                    if let Some(value) = map.get(key) {
                        merged.value = Some(value.clone());
                    }
                }
                merged
            })
            .collect(),
    };

    if with_remove {
        item_fields.push(RawField::new(REMOVE_ITEM_COMPONENT).with_key(REMOVE_ITEM_KEY));
        // Template fields and the remove control share one visual row
        vec![RawField::new("row").with_fields(item_fields)]
    } else {
        item_fields
    }
}

fn strip_template_values(template: RawTemplate) -> RawTemplate {
    fn strip(mut field: RawField) -> RawField {
        field.value = None;
        field.default_value = None;
        field
    }
    match template {
        RawTemplate::Single(field) => RawTemplate::Single(Box::new(strip(*field))),
        RawTemplate::Many(fields) => RawTemplate::Many(fields.into_iter().map(strip).collect()),
    }
}
