//! Compiled constraint model.
//!
//! Declarative [`ValidatorConfig`] entries compile once into [`Constraint`]
//! values bound to a field path; checking happens per snapshot. Pattern
//! strings compile here, the single place a construction-time error is
//! expected and propagated.

use log::error;
use regex::Regex;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::conditions::{CompiledCondition, ConditionContext};
use crate::expr::ast::Value;
use crate::expr::{Expression, Interpreter};

/// A compiled, checkable constraint.
#[derive(Debug, Clone)]
pub enum Constraint {
    Required,
    Email,
    Min(f64),
    Max(f64),
    MinLength(u64),
    MaxLength(u64),
    Pattern(Regex),
    /// Inline expression in the restricted DSL, satisfied when truthy.
    Expr(Expression),
    /// Named function from the per-form expression table, called with the
    /// field's own value.
    CustomFn(String),
    /// Resolved by an external collaborator; inert locally.
    CustomAsync(String),
    /// Resolved by an external collaborator against an endpoint; inert
    /// locally.
    CustomHttp(String),
}

impl Constraint {
    /// Short label used in violation reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Email => "email",
            Self::Min(_) => "min",
            Self::Max(_) => "max",
            Self::MinLength(_) => "minLength",
            Self::MaxLength(_) => "maxLength",
            Self::Pattern(_) => "pattern",
            Self::Expr(_) | Self::CustomFn(_) => "custom",
            Self::CustomAsync(_) => "customAsync",
            Self::CustomHttp(_) => "customHttp",
        }
    }

    pub fn default_message(&self) -> String {
        match self {
            Self::Required => "A value is required".to_string(),
            Self::Email => "Must be a valid email address".to_string(),
            Self::Min(bound) => format!("Must be at least {}", bound),
            Self::Max(bound) => format!("Must be at most {}", bound),
            Self::MinLength(bound) => format!("Must be at least {} characters", bound),
            Self::MaxLength(bound) => format!("Must be at most {} characters", bound),
            Self::Pattern(pattern) => format!("Must match pattern {}", pattern.as_str()),
            Self::Expr(_) | Self::CustomFn(_) => "Invalid value".to_string(),
            Self::CustomAsync(name) | Self::CustomHttp(name) => {
                format!("Pending external validation '{}'", name)
            }
        }
    }

    /// True when the value satisfies the constraint. Inapplicable types
    /// pass: a numeric bound on a non-number says nothing, `required` is
    /// the one constraint that rejects absence. Broken custom functions
    /// recover locally and pass rather than fabricating violations.
    pub fn check(&self, value: Option<&JsonValue>, ctx: &ConditionContext) -> bool {
        match self {
            Self::Required => match value {
                None | Some(JsonValue::Null) => false,
                Some(JsonValue::String(s)) => !s.is_empty(),
                Some(JsonValue::Array(items)) => !items.is_empty(),
                Some(_) => true,
            },
            Self::Email => match value {
                Some(JsonValue::String(s)) if !s.is_empty() => looks_like_email(s),
                _ => true,
            },
            Self::Min(bound) => match value.and_then(JsonValue::as_f64) {
                Some(n) => n >= *bound,
                None => true,
            },
            Self::Max(bound) => match value.and_then(JsonValue::as_f64) {
                Some(n) => n <= *bound,
                None => true,
            },
            Self::MinLength(bound) => match length_of(value) {
                Some(len) => len >= *bound,
                None => true,
            },
            Self::MaxLength(bound) => match length_of(value) {
                Some(len) => len <= *bound,
                None => true,
            },
            Self::Pattern(pattern) => match value {
                Some(JsonValue::String(s)) if !s.is_empty() => pattern.is_match(s),
                _ => true,
            },
            Self::Expr(expr) => {
                let interpreter = Interpreter::new(ctx.form_value, ctx.functions.expr_functions())
                    .with_field_value(value);
                match interpreter.evaluate_bool(expr) {
                    Ok(satisfied) => satisfied,
                    Err(err) => {
                        error!("Custom validator expression failed: {}", err);
                        true
                    }
                }
            }
            Self::CustomFn(name) => match ctx.functions.expr_functions().get(name) {
                Some(function) => {
                    let own = value.map_or(Value::Null, Value::from);
                    match function(vec![own]) {
                        Ok(result) => result.is_truthy(),
                        Err(err) => {
                            error!("Custom validator function '{}' failed: {}", name, err);
                            true
                        }
                    }
                }
                None => {
                    error!("Custom validator function not registered: {}", name);
                    true
                }
            },
            // Settled externally; the async guard decides whose outcome wins
            Self::CustomAsync(_) | Self::CustomHttp(_) => true,
        }
    }
}

fn length_of(value: Option<&JsonValue>) -> Option<u64> {
    match value {
        Some(JsonValue::String(s)) => Some(s.chars().count() as u64),
        Some(JsonValue::Array(items)) => Some(items.len() as u64),
        _ => None,
    }
}

fn looks_like_email(s: &str) -> bool {
    use once_cell::sync::Lazy;
    static EMAIL: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap_or_else(|_| unreachable!("static pattern"))
    });
    EMAIL.is_match(s)
}

/// A constraint together with its message override and `when` gate.
#[derive(Debug, Clone)]
pub struct CompiledConstraint {
    pub constraint: Constraint,
    pub message: Option<String>,
    pub when: Option<CompiledCondition>,
}

impl CompiledConstraint {
    pub fn unconditional(constraint: Constraint) -> Self {
        Self {
            constraint,
            message: None,
            when: None,
        }
    }

    /// A gated constraint is inert while its `when` evaluates false; the
    /// gate is re-checked every evaluation cycle.
    pub fn applies(&self, ctx: &ConditionContext) -> bool {
        match &self.when {
            Some(gate) => gate.evaluate(ctx),
            None => true,
        }
    }

    pub fn message(&self) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| self.constraint.default_message())
    }
}

/// One failed constraint for one field path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstraintViolation {
    pub path: String,
    pub constraint: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditions::FunctionRegistry;
    use crate::path::FieldPath;
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
    fn test_required_rejects_empty() {
        let snapshot = json!({});
        let path = FieldPath::root();
        let functions = FunctionRegistry::new();
        let context = ctx(&snapshot, &path, &functions);
        assert!(!Constraint::Required.check(None, &context));
        assert!(!Constraint::Required.check(Some(&json!(null)), &context));
        assert!(!Constraint::Required.check(Some(&json!("")), &context));
        assert!(!Constraint::Required.check(Some(&json!([])), &context));
        assert!(Constraint::Required.check(Some(&json!(false)), &context));
        assert!(Constraint::Required.check(Some(&json!("x")), &context));
    }

    #[test]
    fn test_bounds_ignore_inapplicable_types() {
        let snapshot = json!({});
        let path = FieldPath::root();
        let functions = FunctionRegistry::new();
        let context = ctx(&snapshot, &path, &functions);
        assert!(Constraint::Min(3.0).check(Some(&json!("text")), &context));
        assert!(!Constraint::Min(3.0).check(Some(&json!(2)), &context));
        assert!(!Constraint::MaxLength(2).check(Some(&json!("abc")), &context));
        assert!(Constraint::MinLength(2).check(Some(&json!(["a", "b"])), &context));
    }

    #[test]
    fn test_email_shape() {
        let snapshot = json!({});
        let path = FieldPath::root();
        let functions = FunctionRegistry::new();
        let context = ctx(&snapshot, &path, &functions);
        assert!(Constraint::Email.check(Some(&json!("a@b.co")), &context));
        assert!(!Constraint::Email.check(Some(&json!("not-an-email")), &context));
        // Empty is required's business, not email's
        assert!(Constraint::Email.check(Some(&json!("")), &context));
    }

    #[test]
    fn test_missing_custom_function_passes_and_logs() {
        let snapshot = json!({});
        let path = FieldPath::root();
        let functions = FunctionRegistry::new();
        let context = ctx(&snapshot, &path, &functions);
        assert!(Constraint::CustomFn("nope".to_string()).check(Some(&json!(1)), &context));
    }
}
