//! # Condition Evaluator
//!
//! Declarative boolean conditions resolved against the live form value
//! snapshot. Four kinds: a literal boolean, a field-value comparison, an
//! expression string in the restricted DSL, and a named custom function.
//!
//! Evaluation is fail-closed: a broken expression or a missing custom
//! function is logged through the `log` facade and evaluates to `false`,
//! never crashing the surrounding reactive graph.

use log::error;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

use crate::expr::functions::{builtin_functions, ExprFunction};
use crate::expr::{Expression, ExpressionParser, Interpreter};
use crate::path::FieldPath;

/// Comparison operator for `fieldValue` conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CompareOp {
    Equals,
    NotEquals,
    Gt,
    Gte,
    Lt,
    Lte,
    Contains,
    In,
}

/// A declarative boolean condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Condition {
    /// Literal boolean, returned as-is.
    Bool(bool),
    /// Compare the value at `fieldPath` in the snapshot against `value`.
    #[serde(rename_all = "camelCase")]
    FieldValue {
        field_path: String,
        operator: CompareOp,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<JsonValue>,
    },
    /// An expression string in the restricted DSL. The legacy `javascript`
    /// key is accepted on input, but the string must parse in the
    /// restricted grammar regardless.
    Expression {
        #[serde(alias = "javascript")]
        expression: String,
    },
    /// A named function looked up in the per-form registry.
    Custom { custom: String },
}

/// Signature of a registered custom condition function.
pub type ConditionFunction = Box<dyn Fn(&ConditionContext) -> bool>;

/// Per-form lookup tables for expression functions and custom conditions.
///
/// Constructed per form instance, never ambient, so independent forms
/// cannot cross-contaminate registered functions.
pub struct FunctionRegistry {
    expr_functions: HashMap<String, ExprFunction>,
    conditions: HashMap<String, ConditionFunction>,
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self {
            expr_functions: builtin_functions(),
            conditions: HashMap::new(),
        }
    }
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a function callable from DSL expressions.
    pub fn register_expr_function(&mut self, name: &str, function: ExprFunction) {
        self.expr_functions.insert(name.to_string(), function);
    }

    /// Registers a named custom condition.
    pub fn register_condition(&mut self, name: &str, function: ConditionFunction) {
        self.conditions.insert(name.to_string(), function);
    }

    pub fn expr_functions(&self) -> &HashMap<String, ExprFunction> {
        &self.expr_functions
    }

    pub fn condition(&self, name: &str) -> Option<&ConditionFunction> {
        self.conditions.get(name)
    }
}

/// Everything a condition may read while being evaluated.
pub struct ConditionContext<'a> {
    /// The full current form value snapshot.
    pub form_value: &'a JsonValue,
    /// The evaluated field's own value, when applicable.
    pub field_value: Option<&'a JsonValue>,
    /// Path of the field the condition is attached to.
    pub path: &'a FieldPath,
    /// Per-form function tables.
    pub functions: &'a FunctionRegistry,
}

/// A condition with its expression (if any) parsed once up front.
///
/// Parse failures are logged at construction and pin the condition to
/// `false` for its lifetime; nothing is re-parsed per evaluation cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledCondition {
    source: Condition,
    parsed: Option<Expression>,
}

impl CompiledCondition {
    pub fn new(source: Condition) -> Self {
        let parsed = match &source {
            Condition::Expression { expression } => {
                match ExpressionParser::parse_expression(expression) {
                    Ok(expr) => Some(expr),
                    Err(err) => {
                        error!("Failed to parse condition expression '{}': {}", expression, err);
                        None
                    }
                }
            }
            _ => None,
        };
        Self { source, parsed }
    }

    pub fn source(&self) -> &Condition {
        &self.source
    }

    /// Evaluates the condition, fail-closed.
    pub fn evaluate(&self, ctx: &ConditionContext) -> bool {
        match &self.source {
            Condition::Bool(b) => *b,
            Condition::FieldValue {
                field_path,
                operator,
                value,
            } => {
                let actual = FieldPath::parse(field_path).lookup(ctx.form_value);
                compare(*operator, actual, value.as_ref())
            }
            Condition::Expression { expression } => match &self.parsed {
                Some(expr) => {
                    let interpreter =
                        Interpreter::new(ctx.form_value, ctx.functions.expr_functions())
                            .with_field_value(ctx.field_value);
                    match interpreter.evaluate_bool(expr) {
                        Ok(result) => result,
                        Err(err) => {
                            error!("Condition expression '{}' failed: {}", expression, err);
                            false
                        }
                    }
                }
                None => false,
            },
            Condition::Custom { custom } => match ctx.functions.condition(custom) {
                Some(function) => function(ctx),
                None => {
                    error!("Custom condition function not registered: {}", custom);
                    false
                }
            },
        }
    }
}

/// OR-combination over a rule list: true if any condition evaluates true.
pub fn any_true(conditions: &[CompiledCondition], ctx: &ConditionContext) -> bool {
    conditions.iter().any(|condition| condition.evaluate(ctx))
}

/// Applies a comparison operator against a possibly-absent snapshot value.
///
/// Absent resolves like null: equality treats it as a value, ordering
/// operators evaluate false, membership checks fail quietly.
fn compare(operator: CompareOp, actual: Option<&JsonValue>, expected: Option<&JsonValue>) -> bool {
    let null = JsonValue::Null;
    let actual = actual.unwrap_or(&null);
    let expected = expected.unwrap_or(&null);

    match operator {
        CompareOp::Equals => actual == expected,
        CompareOp::NotEquals => actual != expected,
        CompareOp::Gt => ordering(actual, expected, |ord| ord.is_gt()),
        CompareOp::Gte => ordering(actual, expected, |ord| ord.is_ge()),
        CompareOp::Lt => ordering(actual, expected, |ord| ord.is_lt()),
        CompareOp::Lte => ordering(actual, expected, |ord| ord.is_le()),
        CompareOp::Contains => match (actual, expected) {
            (JsonValue::String(haystack), JsonValue::String(needle)) => haystack.contains(needle),
            (JsonValue::Array(items), needle) => items.contains(needle),
            _ => false,
        },
        CompareOp::In => match expected {
            JsonValue::Array(items) => items.contains(actual),
            _ => false,
        },
    }
}

fn ordering(
    actual: &JsonValue,
    expected: &JsonValue,
    test: fn(std::cmp::Ordering) -> bool,
) -> bool {
    match (actual, expected) {
        (JsonValue::Number(a), JsonValue::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a.partial_cmp(&b).map(test).unwrap_or(false),
            _ => false,
        },
        (JsonValue::String(a), JsonValue::String(b)) => test(a.cmp(b)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx<'a>(
        form_value: &'a JsonValue,
        path: &'a FieldPath,
        functions: &'a FunctionRegistry,
    ) -> ConditionContext<'a> {
        ConditionContext {
            form_value,
            field_value: None,
            path,
            functions,
        }
    }

    #[test]
    fn test_literal_bool() {
        let snapshot = json!({});
        let path = FieldPath::root();
        let functions = FunctionRegistry::new();
        let condition = CompiledCondition::new(Condition::Bool(true));
        assert!(condition.evaluate(&ctx(&snapshot, &path, &functions)));
    }

    #[test]
    fn test_field_value_equals() {
        let snapshot = json!({"country": "US"});
        let path = FieldPath::root();
        let functions = FunctionRegistry::new();
        let condition = CompiledCondition::new(Condition::FieldValue {
            field_path: "country".to_string(),
            operator: CompareOp::Equals,
            value: Some(json!("US")),
        });
        assert!(condition.evaluate(&ctx(&snapshot, &path, &functions)));
    }

    #[test]
    fn test_missing_intermediate_never_throws() {
        let snapshot = json!({"a": {}});
        let path = FieldPath::root();
        let functions = FunctionRegistry::new();

        let equals = CompiledCondition::new(Condition::FieldValue {
            field_path: "a.b.c".to_string(),
            operator: CompareOp::Equals,
            value: Some(json!("x")),
        });
        assert!(!equals.evaluate(&ctx(&snapshot, &path, &functions)));

        let gt = CompiledCondition::new(Condition::FieldValue {
            field_path: "a.b.c".to_string(),
            operator: CompareOp::Gt,
            value: Some(json!(3)),
        });
        assert!(!gt.evaluate(&ctx(&snapshot, &path, &functions)));

        // Absent compares equal to an explicit null
        let equals_null = CompiledCondition::new(Condition::FieldValue {
            field_path: "a.b.c".to_string(),
            operator: CompareOp::Equals,
            value: None,
        });
        assert!(equals_null.evaluate(&ctx(&snapshot, &path, &functions)));
    }

    #[test]
    fn test_contains_and_in() {
        let snapshot = json!({"tags": ["a", "b"], "name": "Johnny"});
        let path = FieldPath::root();
        let functions = FunctionRegistry::new();

        let membership = CompiledCondition::new(Condition::FieldValue {
            field_path: "tags".to_string(),
            operator: CompareOp::Contains,
            value: Some(json!("b")),
        });
        assert!(membership.evaluate(&ctx(&snapshot, &path, &functions)));

        let substring = CompiledCondition::new(Condition::FieldValue {
            field_path: "name".to_string(),
            operator: CompareOp::Contains,
            value: Some(json!("ohn")),
        });
        assert!(substring.evaluate(&ctx(&snapshot, &path, &functions)));

        let one_of = CompiledCondition::new(Condition::FieldValue {
            field_path: "name".to_string(),
            operator: CompareOp::In,
            value: Some(json!(["Johnny", "Jane"])),
        });
        assert!(one_of.evaluate(&ctx(&snapshot, &path, &functions)));
    }

    #[test]
    fn test_expression_condition() {
        let snapshot = json!({"age": 21});
        let path = FieldPath::root();
        let functions = FunctionRegistry::new();
        let condition = CompiledCondition::new(Condition::Expression {
            expression: "age >= 18".to_string(),
        });
        assert!(condition.evaluate(&ctx(&snapshot, &path, &functions)));
    }

    #[test]
    fn test_broken_expression_fails_closed() {
        let snapshot = json!({});
        let path = FieldPath::root();
        let functions = FunctionRegistry::new();
        let condition = CompiledCondition::new(Condition::Expression {
            expression: "this is (not an expression".to_string(),
        });
        assert!(!condition.evaluate(&ctx(&snapshot, &path, &functions)));
    }

    #[test]
    fn test_unregistered_custom_fails_closed() {
        let snapshot = json!({});
        let path = FieldPath::root();
        let functions = FunctionRegistry::new();
        let condition = CompiledCondition::new(Condition::Custom {
            custom: "isEligible".to_string(),
        });
        assert!(!condition.evaluate(&ctx(&snapshot, &path, &functions)));
    }

    #[test]
    fn test_registered_custom_receives_context() {
        let snapshot = json!({"score": 80});
        let path = FieldPath::root();
        let mut functions = FunctionRegistry::new();
        functions.register_condition(
            "isEligible",
            Box::new(|ctx| {
                FieldPath::parse("score")
                    .lookup(ctx.form_value)
                    .and_then(JsonValue::as_f64)
                    .map(|score| score >= 50.0)
                    .unwrap_or(false)
            }),
        );
        let condition = CompiledCondition::new(Condition::Custom {
            custom: "isEligible".to_string(),
        });
        assert!(condition.evaluate(&ctx(&snapshot, &path, &functions)));
    }

    #[test]
    fn test_or_semantics_across_rules() {
        let snapshot = json!({});
        let path = FieldPath::root();
        let functions = FunctionRegistry::new();
        let rules = vec![
            CompiledCondition::new(Condition::Bool(false)),
            CompiledCondition::new(Condition::Bool(true)),
        ];
        assert!(any_true(&rules, &ctx(&snapshot, &path, &functions)));
    }

    #[test]
    fn test_condition_deserializes_from_config_shapes() {
        let literal: Condition = serde_json::from_value(json!(true)).unwrap();
        assert_eq!(literal, Condition::Bool(true));

        let field: Condition = serde_json::from_value(json!({
            "fieldPath": "age", "operator": "gte", "value": 18
        }))
        .unwrap();
        assert_eq!(
            field,
            Condition::FieldValue {
                field_path: "age".to_string(),
                operator: CompareOp::Gte,
                value: Some(json!(18)),
            }
        );

        let expression: Condition =
            serde_json::from_value(json!({"expression": "age >= 18"})).unwrap();
        assert_eq!(
            expression,
            Condition::Expression {
                expression: "age >= 18".to_string()
            }
        );

        let legacy: Condition =
            serde_json::from_value(json!({"javascript": "age >= 18"})).unwrap();
        assert_eq!(legacy, expression);

        let custom: Condition = serde_json::from_value(json!({"custom": "isEligible"})).unwrap();
        assert_eq!(
            custom,
            Condition::Custom {
                custom: "isEligible".to_string()
            }
        );
    }
}
