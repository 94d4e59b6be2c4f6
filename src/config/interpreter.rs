//! Converts raw configuration into the typed descriptor model.
//!
//! Expects normalized input (see [`crate::normalize`]); the conversion is
//! shape-driven off each node's `type` string. Structural legality (nesting
//! bans, duplicate keys) is the validator's concern, not this pass's; the
//! interpreter only rejects shapes it cannot represent at all.

use log::warn;
use std::collections::HashMap;

use crate::config::types::{RawChildren, RawField, RawFormConfig, RawLogic};
use crate::error::{FormError, Result};
use crate::fields::descriptor::{ARRAY_TYPE, GROUP_TYPE, PAGE_TYPE, ROW_TYPE};
use crate::fields::exclusion::ExclusionOverrides;
use crate::fields::logic::{LogicKind, LogicRule};
use crate::fields::schema_def::SchemaDefinition;
use crate::fields::{ArrayField, FieldDescriptor, GroupField, LeafField, PageField, RowField};
use crate::conditions::Condition;

/// A fully interpreted form configuration.
#[derive(Debug, Clone)]
pub struct FormConfig {
    pub fields: Vec<FieldDescriptor>,
    pub schemas: HashMap<String, SchemaDefinition>,
    pub translations: HashMap<String, HashMap<String, String>>,
    /// Form-tier exclusion overrides.
    pub exclusion: ExclusionOverrides,
}

/// Interprets a normalized raw configuration into the typed model.
pub fn interpret_config(raw: RawFormConfig) -> Result<FormConfig> {
    let mut schemas = HashMap::new();
    for schema in raw.schemas {
        if schemas.insert(schema.name.clone(), schema.clone()).is_some() {
            warn!("Duplicate schema definition '{}', keeping the last", schema.name);
        }
    }

    Ok(FormConfig {
        fields: interpret_fields(raw.fields)?,
        schemas,
        translations: raw.translations,
        exclusion: raw.exclusion,
    })
}

pub fn interpret_fields(fields: Vec<RawField>) -> Result<Vec<FieldDescriptor>> {
    fields.into_iter().map(interpret_field).collect()
}

fn interpret_field(raw: RawField) -> Result<FieldDescriptor> {
    match raw.field_type.as_str() {
        PAGE_TYPE => {
            let hidden = container_hidden(&raw.logic, PAGE_TYPE);
            Ok(FieldDescriptor::Page(PageField {
                key: raw.key.clone(),
                fields: interpret_fields(plain_children(raw, PAGE_TYPE)?)?,
                hidden,
            }))
        }
        ROW_TYPE => {
            let hidden = container_hidden(&raw.logic, ROW_TYPE);
            Ok(FieldDescriptor::Row(RowField {
                key: raw.key.clone(),
                fields: interpret_fields(plain_children(raw, ROW_TYPE)?)?,
                hidden,
            }))
        }
        GROUP_TYPE => {
            let hidden = container_hidden(&raw.logic, GROUP_TYPE);
            Ok(FieldDescriptor::Group(GroupField {
                key: raw.key.clone().unwrap_or_default(),
                fields: interpret_fields(plain_children(raw, GROUP_TYPE)?)?,
                hidden,
            }))
        }
        ARRAY_TYPE => {
            let hidden = container_hidden(&raw.logic, ARRAY_TYPE);
            let key = raw.key.clone().unwrap_or_default();
            let items = match raw.fields {
                Some(RawChildren::Items(items)) => items
                    .into_iter()
                    .map(interpret_fields)
                    .collect::<Result<Vec<_>>>()?,
                // Tolerated: a plain field list reads as one field per item
                Some(RawChildren::Fields(fields)) => fields
                    .into_iter()
                    .map(|field| interpret_fields(vec![field]))
                    .collect::<Result<Vec<_>>>()?,
                None => Vec::new(),
            };
            Ok(FieldDescriptor::Array(ArrayField { key, items, hidden }))
        }
        _ => interpret_leaf(raw),
    }
}

fn interpret_leaf(raw: RawField) -> Result<FieldDescriptor> {
    if raw.fields.is_some() {
        return Err(FormError::InvalidField(format!(
            "Leaf descriptor '{}' cannot carry child fields",
            raw.key.as_deref().unwrap_or(&raw.field_type)
        )));
    }

    let mut leaf = LeafField::new(&raw.field_type, raw.key.as_deref().unwrap_or_default());
    leaf.value = raw.value;
    leaf.default_value = raw.default_value;
    leaf.validators = raw.validators;
    leaf.logic = interpret_logic(raw.logic);
    leaf.schemas = raw.schemas;
    leaf.required = raw.required.unwrap_or(false);
    leaf.email = raw.email.unwrap_or(false);
    leaf.min = raw.min;
    leaf.max = raw.max;
    leaf.min_length = raw.min_length;
    leaf.max_length = raw.max_length;
    leaf.pattern = raw.pattern;
    leaf.disabled = raw.disabled.unwrap_or(false);
    leaf.exclusion = raw.exclusion;
    leaf.props = raw.props;
    // Generated add-item controls carry the item blueprint along
    leaf.template = match raw.template {
        Some(template) => interpret_fields(template.fields())?,
        None => Vec::new(),
    };

    Ok(FieldDescriptor::Leaf(leaf))
}

fn plain_children(raw: RawField, container: &str) -> Result<Vec<RawField>> {
    match raw.fields {
        Some(RawChildren::Fields(fields)) => Ok(fields),
        Some(RawChildren::Items(_)) => Err(FormError::InvalidField(format!(
            "'{}' container cannot carry array item templates",
            container
        ))),
        None => Ok(Vec::new()),
    }
}

/// Containers have no notion of disabled or readonly; anything but hidden
/// logic is dropped with a warning.
fn container_hidden(logic: &[RawLogic], container: &str) -> Vec<Condition> {
    let mut hidden = Vec::new();
    for rule in logic {
        match (&rule.kind, &rule.condition) {
            (LogicKind::Hidden, Some(condition)) => hidden.push(condition.clone()),
            (LogicKind::Hidden, None) => {
                warn!("Hidden logic on '{}' container has no condition, ignoring", container);
            }
            (other, _) => {
                warn!(
                    "Logic kind {:?} is not supported on '{}' containers, ignoring",
                    other, container
                );
            }
        }
    }
    hidden
}

fn interpret_logic(logic: Vec<RawLogic>) -> Vec<LogicRule> {
    let mut rules = Vec::with_capacity(logic.len());
    for raw in logic {
        match raw.kind {
            LogicKind::Hidden | LogicKind::Disabled | LogicKind::Readonly => {
                let Some(condition) = raw.condition else {
                    warn!("{:?} logic entry has no condition, ignoring", raw.kind);
                    continue;
                };
                rules.push(match raw.kind {
                    LogicKind::Hidden => LogicRule::Hidden(condition),
                    LogicKind::Disabled => LogicRule::Disabled(condition),
                    LogicKind::Readonly => LogicRule::Readonly(condition),
                    LogicKind::Derive => unreachable!(),
                });
            }
            LogicKind::Derive => {
                let Some(expression) = raw.expression else {
                    warn!("Derive logic entry has no expression, ignoring");
                    continue;
                };
                rules.push(LogicRule::Derive(expression));
            }
        }
    }
    rules
}
