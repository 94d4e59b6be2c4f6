//! Interpreter for the restricted expression DSL.
//!
//! Evaluates a parsed [`Expression`] against a form value snapshot. Paths
//! resolve through the snapshot with missing segments reading as null, so
//! evaluation never fails on absent data; only genuinely untyped operations
//! (say, multiplying strings) produce errors, which callers at the
//! condition seam turn into a fail-closed `false`.

use serde_json::Value as JsonValue;
use std::collections::HashMap;

use super::ast::{Expression, Operator, UnaryOperator, Value};
use super::functions::ExprFunction;
use crate::error::FormError;
use crate::path::FieldPath;

/// Name under which the whole snapshot is addressable inside expressions.
pub const FORM_VALUE_BINDING: &str = "formValue";
/// Name under which the evaluated field's own value is bound, when present.
pub const FIELD_VALUE_BINDING: &str = "fieldValue";

/// Expression interpreter borrowing a snapshot and a function table.
pub struct Interpreter<'a> {
    snapshot: &'a JsonValue,
    functions: &'a HashMap<String, ExprFunction>,
    bindings: HashMap<&'static str, Value>,
}

impl<'a> Interpreter<'a> {
    pub fn new(snapshot: &'a JsonValue, functions: &'a HashMap<String, ExprFunction>) -> Self {
        Self {
            snapshot,
            functions,
            bindings: HashMap::new(),
        }
    }

    /// Binds the evaluated field's own value under `fieldValue`.
    #[must_use]
    pub fn with_field_value(mut self, value: Option<&JsonValue>) -> Self {
        let bound = value.map_or(Value::Null, Value::from);
        self.bindings.insert(FIELD_VALUE_BINDING, bound);
        self
    }

    /// Evaluates an expression to a value.
    pub fn evaluate(&self, expr: &Expression) -> Result<Value, FormError> {
        match expr {
            Expression::Literal(value) => Ok(value.clone()),
            Expression::Path(segments) => Ok(self.resolve_path(segments)),
            Expression::BinaryOp {
                left,
                operator,
                right,
            } => self.evaluate_binary_op(left, *operator, right),
            Expression::UnaryOp { operator, expr } => self.evaluate_unary_op(*operator, expr),
            Expression::FunctionCall { name, args } => self.evaluate_function_call(name, args),
        }
    }

    /// Evaluates an expression and coerces the result to a boolean.
    pub fn evaluate_bool(&self, expr: &Expression) -> Result<bool, FormError> {
        Ok(self.evaluate(expr)?.is_truthy())
    }

    /// Resolves a dotted path. Special bindings (`fieldValue`, a leading
    /// `formValue`) take precedence; everything else walks the snapshot.
    /// Missing segments resolve to null, never to an error.
    fn resolve_path(&self, segments: &[String]) -> Value {
        let (head, rest) = match segments.split_first() {
            Some(split) => split,
            None => return Value::Null,
        };

        if head == FORM_VALUE_BINDING {
            return Self::walk(self.snapshot, rest);
        }

        if let Some(bound) = self.bindings.get(head.as_str()) {
            if rest.is_empty() {
                return bound.clone();
            }
            let json: JsonValue = bound.clone().into();
            return Self::walk(&json, rest);
        }

        Self::walk(self.snapshot, segments)
    }

    fn walk(value: &JsonValue, segments: &[String]) -> Value {
        let mut path = FieldPath::root();
        for segment in segments {
            path = path.child(segment);
        }
        path.lookup(value).map_or(Value::Null, Value::from)
    }

    fn evaluate_binary_op(
        &self,
        left: &Expression,
        operator: Operator,
        right: &Expression,
    ) -> Result<Value, FormError> {
        // Short-circuit the boolean combinators
        match operator {
            Operator::And => {
                let left_val = self.evaluate(left)?;
                if !left_val.is_truthy() {
                    return Ok(Value::Boolean(false));
                }
                return Ok(Value::Boolean(self.evaluate(right)?.is_truthy()));
            }
            Operator::Or => {
                let left_val = self.evaluate(left)?;
                if left_val.is_truthy() {
                    return Ok(Value::Boolean(true));
                }
                return Ok(Value::Boolean(self.evaluate(right)?.is_truthy()));
            }
            _ => {}
        }

        let left_val = self.evaluate(left)?;
        let right_val = self.evaluate(right)?;

        match operator {
            Operator::Add => Self::add(&left_val, &right_val),
            Operator::Subtract => Self::arithmetic(&left_val, &right_val, "subtract", |a, b| a - b),
            Operator::Multiply => Self::arithmetic(&left_val, &right_val, "multiply", |a, b| a * b),
            Operator::Divide => Self::divide(&left_val, &right_val),
            Operator::Power => Self::arithmetic(&left_val, &right_val, "raise", f64::powf),
            Operator::Equal => Ok(Value::Boolean(Self::values_equal(&left_val, &right_val))),
            Operator::NotEqual => Ok(Value::Boolean(!Self::values_equal(&left_val, &right_val))),
            Operator::LessThan => Self::ordering(&left_val, &right_val, |ord| ord.is_lt()),
            Operator::LessThanOrEqual => Self::ordering(&left_val, &right_val, |ord| ord.is_le()),
            Operator::GreaterThan => Self::ordering(&left_val, &right_val, |ord| ord.is_gt()),
            Operator::GreaterThanOrEqual => Self::ordering(&left_val, &right_val, |ord| ord.is_ge()),
            Operator::And | Operator::Or => unreachable!("handled above"),
        }
    }

    fn evaluate_unary_op(
        &self,
        operator: UnaryOperator,
        expr: &Expression,
    ) -> Result<Value, FormError> {
        let value = self.evaluate(expr)?;
        match operator {
            UnaryOperator::Negate => match value {
                Value::Number(n) => Ok(Value::Number(-n)),
                other => Err(FormError::InvalidExpression(format!(
                    "Cannot negate non-numeric value {}",
                    other
                ))),
            },
            UnaryOperator::Not => Ok(Value::Boolean(!value.is_truthy())),
        }
    }

    fn evaluate_function_call(&self, name: &str, args: &[Expression]) -> Result<Value, FormError> {
        let mut evaluated = Vec::with_capacity(args.len());
        for arg in args {
            evaluated.push(self.evaluate(arg)?);
        }

        match self.functions.get(name) {
            Some(func) => func(evaluated).map_err(FormError::InvalidExpression),
            None => Err(FormError::InvalidExpression(format!(
                "Function not found: {}",
                name
            ))),
        }
    }

    fn add(left: &Value, right: &Value) -> Result<Value, FormError> {
        match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            (Value::String(a), Value::String(b)) => Ok(Value::String(format!("{}{}", a, b))),
            _ => Err(FormError::InvalidExpression(
                "Cannot add values of these types".to_string(),
            )),
        }
    }

    fn arithmetic(
        left: &Value,
        right: &Value,
        verb: &str,
        op: fn(f64, f64) -> f64,
    ) -> Result<Value, FormError> {
        match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(op(*a, *b))),
            _ => Err(FormError::InvalidExpression(format!(
                "Cannot {} non-numeric values",
                verb
            ))),
        }
    }

    fn divide(left: &Value, right: &Value) -> Result<Value, FormError> {
        match (left, right) {
            (Value::Number(_), Value::Number(b)) if *b == 0.0 => Err(
                FormError::InvalidExpression("Division by zero".to_string()),
            ),
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a / b)),
            _ => Err(FormError::InvalidExpression(
                "Cannot divide non-numeric values".to_string(),
            )),
        }
    }

    fn values_equal(left: &Value, right: &Value) -> bool {
        match (left, right) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            _ => false,
        }
    }

    /// Ordering comparisons work on number pairs and string pairs; any
    /// comparison against null is false rather than an error, matching the
    /// undefined-path contract.
    fn ordering(
        left: &Value,
        right: &Value,
        test: fn(std::cmp::Ordering) -> bool,
    ) -> Result<Value, FormError> {
        match (left, right) {
            (Value::Null, _) | (_, Value::Null) => Ok(Value::Boolean(false)),
            (Value::Number(a), Value::Number(b)) => Ok(Value::Boolean(
                a.partial_cmp(b).map(test).unwrap_or(false),
            )),
            (Value::String(a), Value::String(b)) => Ok(Value::Boolean(test(a.cmp(b)))),
            _ => Err(FormError::InvalidExpression(
                "Cannot compare non-comparable values".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::functions::builtin_functions;
    use crate::expr::parser::ExpressionParser;
    use serde_json::json;

    fn eval(input: &str, snapshot: &JsonValue) -> Value {
        let functions = builtin_functions();
        let expr = ExpressionParser::parse_expression(input).unwrap();
        Interpreter::new(snapshot, &functions).evaluate(&expr).unwrap()
    }

    #[test]
    fn test_arithmetic_precedence() {
        let snapshot = json!({});
        assert_eq!(eval("1 + 2 * 3", &snapshot), Value::Number(7.0));
        assert_eq!(eval("(1 + 2) * 3", &snapshot), Value::Number(9.0));
        assert_eq!(eval("2 ^ 3", &snapshot), Value::Number(8.0));
    }

    #[test]
    fn test_path_resolution() {
        let snapshot = json!({"age": 21, "address": {"city": "Boston"}});
        assert_eq!(eval("age >= 18", &snapshot), Value::Boolean(true));
        assert_eq!(
            eval("address.city == 'Boston'", &snapshot),
            Value::Boolean(true)
        );
    }

    #[test]
    fn test_missing_path_is_null() {
        let snapshot = json!({"a": {}});
        assert_eq!(eval("a.b.c", &snapshot), Value::Null);
        // Ordering against null is false, equality works
        assert_eq!(eval("a.b.c > 3", &snapshot), Value::Boolean(false));
        assert_eq!(eval("a.b.c == null", &snapshot), Value::Boolean(true));
    }

    #[test]
    fn test_form_value_prefix_is_snapshot_alias() {
        let snapshot = json!({"age": 30});
        assert_eq!(eval("formValue.age == age", &snapshot), Value::Boolean(true));
    }

    #[test]
    fn test_field_value_binding() {
        let snapshot = json!({"other": 1});
        let functions = builtin_functions();
        let expr = ExpressionParser::parse_expression("fieldValue > 10").unwrap();
        let own = json!(12);
        let result = Interpreter::new(&snapshot, &functions)
            .with_field_value(Some(&own))
            .evaluate(&expr)
            .unwrap();
        assert_eq!(result, Value::Boolean(true));
    }

    #[test]
    fn test_short_circuit_and() {
        // The right side would error on its own; && must not evaluate it
        let snapshot = json!({"flag": false});
        assert_eq!(
            eval("flag && 'a' * 2 == 4", &snapshot),
            Value::Boolean(false)
        );
    }

    #[test]
    fn test_unknown_function_errors() {
        let snapshot = json!({});
        let functions = builtin_functions();
        let expr = ExpressionParser::parse_expression("nope(1)").unwrap();
        assert!(Interpreter::new(&snapshot, &functions).evaluate(&expr).is_err());
    }

    #[test]
    fn test_division_by_zero_errors() {
        let snapshot = json!({});
        let functions = builtin_functions();
        let expr = ExpressionParser::parse_expression("1 / 0").unwrap();
        assert!(Interpreter::new(&snapshot, &functions).evaluate(&expr).is_err());
    }
}
