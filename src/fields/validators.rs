use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::conditions::Condition;

/// Kind tag for a declarative constraint configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidatorKind {
    Required,
    Email,
    Min,
    Max,
    MinLength,
    MaxLength,
    Pattern,
    Custom,
    CustomAsync,
    CustomHttp,
}

/// One entry of a field's `validators` list.
///
/// `value` carries the bound for min/max/length kinds and the pattern string
/// for `pattern`. `expression` names a custom function or carries a
/// restricted-DSL expression for `custom` kinds, or the endpoint for
/// `customHttp`. `when` gates whether the constraint applies at all; while
/// the gate evaluates false the constraint is inert for that cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorConfig {
    #[serde(rename = "type")]
    pub kind: ValidatorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<Condition>,
}

impl ValidatorConfig {
    pub fn new(kind: ValidatorKind) -> Self {
        Self {
            kind,
            value: None,
            expression: None,
            message: None,
            when: None,
        }
    }

    #[must_use]
    pub fn with_value(mut self, value: JsonValue) -> Self {
        self.value = Some(value);
        self
    }

    #[must_use]
    pub fn with_when(mut self, when: Condition) -> Self {
        self.when = Some(when);
        self
    }
}
