//! Serde-facing raw configuration types.
//!
//! This is the shape authors write (typically as JSON). The interpreter
//! converts it into the typed descriptor model; the normalizer expands
//! simplified-array shorthand on it beforehand. Every property is optional
//! where the authored format allows omission.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

use crate::conditions::Condition;
use crate::fields::exclusion::ExclusionOverrides;
use crate::fields::logic::LogicKind;
use crate::fields::schema_def::SchemaDefinition;
use crate::fields::validators::ValidatorConfig;

fn default_field_type() -> String {
    "input".to_string()
}

/// Top-level raw form configuration: `{ fields, schemas?, translations? }`.
///
/// Form-level exclusion overrides sit alongside (`excludeValueIfHidden`
/// etc.) and form the middle tier of the exclusion hierarchy. Translations
/// are carried opaquely for the external locale layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawFormConfig {
    pub fields: Vec<RawField>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub schemas: Vec<SchemaDefinition>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub translations: HashMap<String, HashMap<String, String>>,
    #[serde(flatten)]
    pub exclusion: ExclusionOverrides,
}

/// One raw descriptor node, container or leaf; the open `type` string
/// discriminates. Containers carry `fields`; arrays may instead carry the
/// simplified `template`/`value` shorthand the normalizer expands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawField {
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<RawChildren>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<RawTemplate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_button: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_button: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<ValidatorConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub logic: Vec<RawLogic>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub schemas: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(flatten)]
    pub exclusion: ExclusionOverrides,
    #[serde(skip_serializing_if = "serde_json::Map::is_empty")]
    pub props: serde_json::Map<String, JsonValue>,
}

impl Default for RawField {
    fn default() -> Self {
        Self {
            field_type: default_field_type(),
            key: None,
            value: None,
            default_value: None,
            fields: None,
            template: None,
            add_button: None,
            remove_button: None,
            validators: Vec::new(),
            logic: Vec::new(),
            schemas: Vec::new(),
            required: None,
            email: None,
            min: None,
            max: None,
            min_length: None,
            max_length: None,
            pattern: None,
            disabled: None,
            exclusion: ExclusionOverrides::default(),
            props: serde_json::Map::new(),
        }
    }
}

impl RawField {
    pub fn new(field_type: &str) -> Self {
        Self {
            field_type: field_type.to_string(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_key(mut self, key: &str) -> Self {
        self.key = Some(key.to_string());
        self
    }

    #[must_use]
    pub fn with_value(mut self, value: JsonValue) -> Self {
        self.value = Some(value);
        self
    }

    #[must_use]
    pub fn with_fields(mut self, fields: Vec<RawField>) -> Self {
        self.fields = Some(RawChildren::Fields(fields));
        self
    }

    #[must_use]
    pub fn with_items(mut self, items: Vec<Vec<RawField>>) -> Self {
        self.fields = Some(RawChildren::Items(items));
        self
    }
}

/// Children of a raw container: ordinary descriptor lists for page, row and
/// group; item templates (a list of descriptor lists) for arrays.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawChildren {
    Fields(Vec<RawField>),
    Items(Vec<Vec<RawField>>),
}

/// The `template` half of the simplified-array shorthand: a single leaf for
/// primitive entries, or a descriptor sequence merged per key with object
/// entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTemplate {
    Single(Box<RawField>),
    Many(Vec<RawField>),
}

impl RawTemplate {
    pub fn fields(&self) -> Vec<RawField> {
        match self {
            Self::Single(field) => vec![(**field).clone()],
            Self::Many(fields) => fields.clone(),
        }
    }

    pub fn is_single(&self) -> bool {
        matches!(self, Self::Single(_))
    }
}

/// One raw `logic` entry. `condition` applies to the hidden/disabled/
/// readonly kinds; `expression` to `derive`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLogic {
    #[serde(rename = "type")]
    pub kind: LogicKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
}
