//! # Dynaform Engine Library
//!
//! This library implements a declarative dynamic-form engine. Forms are
//! authored as JSON descriptor trees, normalized, structurally validated,
//! flattened into a scope-correct value shape and compiled into a reusable
//! constraint program that is evaluated against value snapshots.
//!
//! ## Core Components
//!
//! * `conditions` - declarative condition model with fail-closed evaluation
//! * `compiler` - constraint compilation and per-snapshot evaluation
//! * `config` - raw configuration parsing, interpretation and validation
//! * `error` - error types and handling
//! * `expr` - the restricted expression DSL (parser and interpreter)
//! * `fields` - the typed field descriptor vocabulary
//! * `flatten` - tree flattening with the value-handling registry
//! * `normalize` - shorthand expansion (simplified arrays)
//! * `path` - dotted field-path addressing
//! * `value` - default snapshot construction and output filtering
//!
//! ## Architecture
//!
//! The engine is a pipeline: raw JSON is deserialized into an open
//! configuration shape, normalized, optionally validated strictly, then
//! interpreted into typed descriptors and flattened. The flat shape is
//! compiled once; after that every value change is a pure evaluation step
//! producing field states, constraint violations and derived values, and
//! the outward form value is filtered through the three-tier exclusion
//! policy. Rendering and persistence stay outside: the engine only ever
//! sees descriptors and value snapshots.

pub mod compiler;
pub mod conditions;
pub mod config;
pub mod error;
pub mod expr;
pub mod fields;
pub mod flatten;
pub mod normalize;
pub mod path;
pub mod value;

// Re-export main types for convenience
pub use compiler::{
    AsyncValidationGuard, CompiledForm, Constraint, ConstraintViolation, Evaluation, FieldState,
};
pub use conditions::{CompareOp, CompiledCondition, Condition, ConditionContext, FunctionRegistry};
pub use config::{interpret_config, validate_config, ConfigReport, FormConfig, RawFormConfig};
pub use error::{FormError, Result};
pub use fields::{ExclusionOverrides, ExclusionPolicy, FieldDescriptor, LeafField};
pub use flatten::{FlatNode, FlattenOptions};
pub use path::FieldPath;

use serde_json::Value as JsonValue;

use crate::conditions::ConditionFunction;
use crate::expr::ExprFunction;
use crate::flatten::ComponentRegistry;

/// End-to-end engine over one form configuration.
///
/// Owns the flat shape and compiled constraint program; construction runs
/// the whole preparation pipeline once, after which [`FormEngine::evaluate`]
/// and [`FormEngine::output_value`] are pure functions of a snapshot.
pub struct FormEngine {
    compiled: CompiledForm,
    report: ConfigReport,
    translations: std::collections::HashMap<String, std::collections::HashMap<String, String>>,
}

impl FormEngine {
    /// Builds an engine from an already-parsed raw configuration.
    ///
    /// Lenient: structural defects land in the report (see
    /// [`FormEngine::report`]) and unknown schema references are logged and
    /// skipped. Only a malformed regex pattern fails construction.
    pub fn new(raw: RawFormConfig) -> Result<Self> {
        Self::build(raw, false)
    }

    /// Strict construction: structural errors and unknown schema references
    /// reject the configuration outright.
    pub fn new_strict(raw: RawFormConfig) -> Result<Self> {
        Self::build(raw, true)
    }

    /// Parses a JSON configuration document and builds an engine from it.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawFormConfig = serde_json::from_str(json)?;
        Self::new(raw)
    }

    fn build(raw: RawFormConfig, strict: bool) -> Result<Self> {
        let normalized = normalize::normalize_config(raw);
        let report = validate_config(&normalized);
        if strict && !report.is_valid() {
            return Err(FormError::InvalidConfig(report.errors.join("; ")));
        }
        let config = interpret_config(normalized)?;

        let registry = ComponentRegistry::new();
        let flat = flatten::flatten(&config.fields, &registry, FlattenOptions::default());
        if strict {
            compiler::SchemaCompiler::new(&config.schemas).verify_schema_references(&flat)?;
        }
        let compiled =
            CompiledForm::new(flat, &config.schemas, config.exclusion, FunctionRegistry::new())?;
        Ok(Self {
            compiled,
            report,
            translations: config.translations,
        })
    }

    /// The structural validation report gathered during construction.
    pub fn report(&self) -> &ConfigReport {
        &self.report
    }

    pub fn compiled(&self) -> &CompiledForm {
        &self.compiled
    }

    /// Translation tables carried opaquely for the external locale layer.
    pub fn translations(
        &self,
    ) -> &std::collections::HashMap<String, std::collections::HashMap<String, String>> {
        &self.translations
    }

    /// Registers a function callable from DSL expressions and custom
    /// validators.
    pub fn register_expr_function(&mut self, name: &str, function: ExprFunction) {
        self.compiled
            .functions_mut()
            .register_expr_function(name, function);
    }

    /// Registers a named custom condition.
    pub fn register_condition(&mut self, name: &str, function: ConditionFunction) {
        self.compiled
            .functions_mut()
            .register_condition(name, function);
    }

    /// Builds the initial value snapshot for this form.
    pub fn default_values(&self) -> JsonValue {
        value::default_values(self.compiled.flat())
    }

    /// Evaluates field states, constraints and derivations for a snapshot.
    pub fn evaluate(&self, snapshot: &JsonValue) -> Evaluation {
        self.compiled.evaluate(snapshot)
    }

    /// Produces the outward form value for a snapshot, with the three-tier
    /// exclusion policy applied against freshly evaluated field states.
    pub fn output_value(&self, snapshot: &JsonValue) -> JsonValue {
        let evaluation = self.compiled.evaluate(snapshot);
        value::filter_value(
            self.compiled.flat(),
            snapshot,
            &evaluation.states,
            self.compiled.form_exclusion(),
            ExclusionPolicy::DEFAULT,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn engine(config: serde_json::Value) -> FormEngine {
        let raw: RawFormConfig = serde_json::from_value(config).unwrap();
        FormEngine::new(raw).unwrap()
    }

    #[test]
    fn test_end_to_end_defaults_and_validation() {
        let engine = engine(json!({
            "fields": [
                {"type": "page", "fields": [
                    {"type": "input", "key": "name", "required": true},
                    {"type": "input", "key": "email", "email": true}
                ]}
            ]
        }));

        let defaults = engine.default_values();
        assert_eq!(defaults, json!({ "name": "", "email": "" }));

        let evaluation = engine.evaluate(&defaults);
        assert_eq!(evaluation.violations.len(), 1);
        assert_eq!(evaluation.violations[0].path, "name");
    }

    #[test]
    fn test_strict_rejects_illegal_nesting() {
        let raw: RawFormConfig = serde_json::from_value(json!({
            "fields": [{"type": "page", "fields": [{"type": "page", "fields": []}]}]
        }))
        .unwrap();
        assert!(matches!(
            FormEngine::new_strict(raw),
            Err(FormError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_strict_rejects_unknown_schema_reference() {
        let raw: RawFormConfig = serde_json::from_value(json!({
            "fields": [{"type": "input", "key": "email", "schemas": ["contact"]}]
        }))
        .unwrap();
        assert!(matches!(
            FormEngine::new_strict(raw),
            Err(FormError::UnknownSchema(name)) if name == "contact"
        ));
    }

    #[test]
    fn test_output_value_drops_hidden_fields() {
        let engine = engine(json!({
            "fields": [
                {"type": "input", "key": "other"},
                {"type": "input", "key": "detail", "logic": [
                    {"type": "hidden", "condition": {
                        "fieldPath": "other", "operator": "equals", "value": ""
                    }}
                ]}
            ]
        }));

        let snapshot = json!({ "other": "", "detail": "kept?" });
        assert_eq!(engine.output_value(&snapshot), json!({ "other": "" }));

        let snapshot = json!({ "other": "x", "detail": "kept" });
        assert_eq!(
            engine.output_value(&snapshot),
            json!({ "other": "x", "detail": "kept" })
        );
    }

    #[test]
    fn test_registered_function_reachable_from_expression() {
        let raw: RawFormConfig = serde_json::from_value(json!({
            "fields": [{"type": "input", "key": "code", "validators": [
                {"type": "custom", "expression": "isEven(fieldValue)"}
            ]}]
        }))
        .unwrap();
        let mut engine = FormEngine::new(raw).unwrap();
        engine.register_expr_function(
            "isEven",
            Box::new(|args| {
                let n = match args.first() {
                    Some(expr::Value::Number(n)) => *n,
                    _ => return Err("isEven expects a number".to_string()),
                };
                Ok(expr::Value::Boolean(n % 2.0 == 0.0))
            }),
        );

        assert!(engine.evaluate(&json!({ "code": 4 })).is_valid());
        assert!(!engine.evaluate(&json!({ "code": 3 })).is_valid());
    }
}
