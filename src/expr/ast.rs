//! Abstract syntax tree for the restricted expression DSL.
//!
//! Conditions and derivations are authored as strings in a small closed
//! grammar, parsed once into this tree, and evaluated repeatedly against
//! form value snapshots.

use serde_json::Value as JsonValue;
use std::fmt;

/// A runtime value in the expression DSL.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Boolean(bool),
    String(String),
    Null,
    Object(serde_json::Map<String, JsonValue>),
    Array(Vec<JsonValue>),
}

impl Value {
    /// Boolean coercion used wherever a condition needs a yes/no answer.
    /// Null is false; numbers are false at zero; strings, arrays and
    /// objects are false when empty.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Boolean(b) => *b,
            Value::Number(n) => *n != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::Null => false,
            Value::Object(map) => !map.is_empty(),
            Value::Array(items) => !items.is_empty(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Null => write!(f, "null"),
            Value::Object(_) => write!(f, "<object>"),
            Value::Array(_) => write!(f, "<array>"),
        }
    }
}

impl From<Value> for JsonValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Number(n) => serde_json::Number::from_f64(n)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Value::Boolean(b) => JsonValue::Bool(b),
            Value::String(s) => JsonValue::String(s),
            Value::Null => JsonValue::Null,
            Value::Object(map) => JsonValue::Object(map),
            Value::Array(items) => JsonValue::Array(items),
        }
    }
}

impl From<&JsonValue> for Value {
    fn from(value: &JsonValue) -> Self {
        match value {
            JsonValue::Number(n) => Value::Number(n.as_f64().unwrap_or(0.0)),
            JsonValue::Bool(b) => Value::Boolean(*b),
            JsonValue::String(s) => Value::String(s.clone()),
            JsonValue::Null => Value::Null,
            JsonValue::Object(map) => Value::Object(map.clone()),
            JsonValue::Array(items) => Value::Array(items.clone()),
        }
    }
}

impl From<JsonValue> for Value {
    fn from(value: JsonValue) -> Self {
        Value::from(&value)
    }
}

/// A binary operator in the expression DSL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    And,
    Or,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Power => "^",
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::LessThan => "<",
            Operator::LessThanOrEqual => "<=",
            Operator::GreaterThan => ">",
            Operator::GreaterThanOrEqual => ">=",
            Operator::And => "&&",
            Operator::Or => "||",
        };
        write!(f, "{}", symbol)
    }
}

/// A unary operator in the expression DSL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Negate,
    Not,
}

/// A parsed expression.
///
/// Identifier chains (`address.city`) parse to a single [`Expression::Path`]
/// resolved against the form value snapshot, with missing segments reading
/// as null. There is no variable binding and no statement layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Value),
    Path(Vec<String>),
    BinaryOp {
        left: Box<Expression>,
        operator: Operator,
        right: Box<Expression>,
    },
    UnaryOp {
        operator: UnaryOperator,
        expr: Box<Expression>,
    },
    FunctionCall {
        name: String,
        args: Vec<Expression>,
    },
}

impl Expression {
    /// Collects every path referenced by this expression, in source order.
    /// Lets hosts know which fields a condition or derivation depends on.
    pub fn referenced_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        self.collect_paths(&mut paths);
        paths
    }

    fn collect_paths(&self, out: &mut Vec<String>) {
        match self {
            Expression::Literal(_) => {}
            Expression::Path(segments) => out.push(segments.join(".")),
            Expression::BinaryOp { left, right, .. } => {
                left.collect_paths(out);
                right.collect_paths(out);
            }
            Expression::UnaryOp { expr, .. } => expr.collect_paths(out),
            Expression::FunctionCall { args, .. } => {
                for arg in args {
                    arg.collect_paths(out);
                }
            }
        }
    }
}
