use serde_json::Value as JsonValue;

use crate::conditions::Condition;
use crate::fields::exclusion::ExclusionOverrides;
use crate::fields::logic::LogicRule;
use crate::fields::validators::ValidatorConfig;
use crate::fields::{FieldDescriptor, HIDDEN_VALUE_COMPONENT, TEXT_COMPONENT};

/// A value-bearing or display-only leaf descriptor.
///
/// The `component` string is an open type tag; it drives value-handling
/// lookup in the flattener's registry and component selection in the
/// (external) renderer. Shorthand validation flags (`required`, `min`, ...)
/// sit alongside the explicit `validators` list and are applied first by the
/// constraint compiler.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafField {
    pub component: String,
    pub key: String,
    pub value: Option<JsonValue>,
    pub default_value: Option<JsonValue>,
    pub validators: Vec<ValidatorConfig>,
    pub logic: Vec<LogicRule>,
    pub schemas: Vec<String>,
    pub required: bool,
    pub email: bool,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub pattern: Option<String>,
    pub disabled: bool,
    pub exclusion: ExclusionOverrides,
    /// Renderer passthrough bag; `props.min`/`props.max` shorthand also
    /// feeds the constraint compiler.
    pub props: serde_json::Map<String, JsonValue>,
    /// Value-less item blueprint carried by generated add-item controls:
    /// the descriptors to instantiate when a new array item is inserted.
    pub template: Vec<FieldDescriptor>,
}

impl LeafField {
    pub fn new(component: &str, key: &str) -> Self {
        Self {
            component: component.to_string(),
            key: key.to_string(),
            value: None,
            default_value: None,
            validators: Vec::new(),
            logic: Vec::new(),
            schemas: Vec::new(),
            required: false,
            email: false,
            min: None,
            max: None,
            min_length: None,
            max_length: None,
            pattern: None,
            disabled: false,
            exclusion: ExclusionOverrides::default(),
            props: serde_json::Map::new(),
            template: Vec::new(),
        }
    }

    /// Componentless leaves carry a literal value and expose no reactive
    /// state, so their value is always included in output.
    pub fn is_hidden_value(&self) -> bool {
        self.component == HIDDEN_VALUE_COMPONENT
    }

    pub fn is_text(&self) -> bool {
        self.component == TEXT_COMPONENT
    }

    /// Numeric bound shorthand may come from the descriptor itself or from
    /// a nested `props.min`/`props.max`.
    pub fn effective_min(&self) -> Option<f64> {
        self.min.or_else(|| self.props.get("min").and_then(JsonValue::as_f64))
    }

    pub fn effective_max(&self) -> Option<f64> {
        self.max.or_else(|| self.props.get("max").and_then(JsonValue::as_f64))
    }

    pub fn hidden_conditions(&self) -> impl Iterator<Item = &Condition> {
        self.logic.iter().filter_map(|rule| match rule {
            LogicRule::Hidden(cond) => Some(cond),
            _ => None,
        })
    }
}
