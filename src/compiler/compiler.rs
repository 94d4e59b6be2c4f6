//! Constraint and state compiler over the flattened form shape.
//!
//! Compilation walks the flat nodes once and resolves everything static:
//! shorthand flags become constraints, explicit validators compile, logic
//! rules bind parsed conditions, named schemas splice in, patterns and
//! derivation expressions parse. The resulting [`CompiledForm`] is then
//! evaluated against arbitrary snapshots without touching descriptors
//! again.

use std::collections::HashMap;

use log::{error, warn};
use regex::Regex;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::compiler::constraints::{CompiledConstraint, Constraint, ConstraintViolation};
use crate::conditions::{any_true, CompiledCondition, ConditionContext, FunctionRegistry};
use crate::error::{FormError, Result};
use crate::conditions::Condition;
use crate::expr::parser::ExpressionParser;
use crate::expr::Expression;
use crate::fields::descriptor::{ARRAY_TYPE, GROUP_TYPE};
use crate::fields::{
    ExclusionOverrides, ExclusionPolicy, LeafField, LogicRule, SchemaDefinition, ValidatorConfig,
    ValidatorKind,
};
use crate::flatten::FlatNode;
use crate::path::FieldPath;

/// Reactive state of one field for one snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FieldState {
    pub hidden: bool,
    pub disabled: bool,
    pub readonly: bool,
}

/// Result of evaluating a compiled form against a snapshot.
#[derive(Debug, Default)]
pub struct Evaluation {
    /// Per dotted path, for every stateful field.
    pub states: HashMap<String, FieldState>,
    pub violations: Vec<ConstraintViolation>,
    /// Derivation outputs keyed by dotted path; the host writes these back
    /// into its snapshot.
    pub derived: HashMap<String, JsonValue>,
}

impl Evaluation {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn state(&self, path: &str) -> FieldState {
        self.states.get(path).copied().unwrap_or_default()
    }
}

/// A pre-parsed derivation binding for one field.
#[derive(Debug)]
struct DeriveBinding {
    parsed: Expression,
}

/// What compilation produced for one addressable field.
#[derive(Debug)]
pub struct CompiledField {
    pub path: FieldPath,
    pub component: String,
    /// Hidden-value leaves carry no reactive state and are never reported
    /// in `Evaluation::states`.
    stateful: bool,
    constraints: Vec<CompiledConstraint>,
    hidden: Vec<CompiledCondition>,
    /// Hidden conditions of every enclosing container; any one turning
    /// true hides this field along with its ancestor.
    ancestor_hidden: Vec<CompiledCondition>,
    disabled: Vec<CompiledCondition>,
    readonly: Vec<CompiledCondition>,
    derive: Option<DeriveBinding>,
    static_disabled: bool,
}

impl CompiledField {
    fn container(
        path: FieldPath,
        component: &str,
        hidden: &[Condition],
        inherited: &[Condition],
    ) -> Self {
        Self {
            path,
            component: component.to_string(),
            stateful: true,
            constraints: Vec::new(),
            hidden: compile_conditions(hidden),
            ancestor_hidden: compile_conditions(inherited),
            disabled: Vec::new(),
            readonly: Vec::new(),
            derive: None,
            static_disabled: false,
        }
    }

    pub fn constraints(&self) -> &[CompiledConstraint] {
        &self.constraints
    }
}

/// Compiler state: the schema table and function registry are borrowed for
/// the duration of one `compile` walk.
pub struct SchemaCompiler<'a> {
    schemas: &'a HashMap<String, SchemaDefinition>,
}

impl<'a> SchemaCompiler<'a> {
    pub fn new(schemas: &'a HashMap<String, SchemaDefinition>) -> Self {
        Self { schemas }
    }

    /// Rejects the first schema reference missing from the table. Lenient
    /// compilation only logs these; strict construction calls this first.
    pub fn verify_schema_references(&self, nodes: &[FlatNode]) -> Result<()> {
        for node in nodes {
            match node {
                FlatNode::Leaf { field, .. } => {
                    for name in &field.schemas {
                        if !self.schemas.contains_key(name) {
                            return Err(FormError::UnknownSchema(name.clone()));
                        }
                    }
                }
                FlatNode::Row { children, .. } | FlatNode::Group { children, .. } => {
                    self.verify_schema_references(children)?;
                }
                FlatNode::Array { items, .. } => {
                    for item in items {
                        self.verify_schema_references(item)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Compiles a flattened tree. The only construction-time failure under
    /// well-formed input is a malformed regex pattern; everything else
    /// degrades locally with a log line.
    pub fn compile(&self, nodes: &[FlatNode]) -> Result<Vec<CompiledField>> {
        let mut fields = Vec::new();
        self.compile_scope(nodes, &FieldPath::root(), &[], &mut fields)?;
        Ok(fields)
    }

    fn compile_scope(
        &self,
        nodes: &[FlatNode],
        scope: &FieldPath,
        inherited: &[Condition],
        out: &mut Vec<CompiledField>,
    ) -> Result<()> {
        for node in nodes {
            match node {
                // Rows keep their children in the enclosing value scope;
                // their hidden logic cascades onto the children
                FlatNode::Row { hidden, children, .. } => {
                    let next = chain_hidden(inherited, hidden);
                    self.compile_scope(children, scope, &next, out)?;
                }
                FlatNode::Leaf { key, field, .. } => {
                    out.push(self.compile_leaf(scope.child(key), field, inherited)?);
                }
                FlatNode::Group { key, hidden, children } => {
                    let path = scope.child(key);
                    out.push(CompiledField::container(path.clone(), GROUP_TYPE, hidden, inherited));
                    let next = chain_hidden(inherited, hidden);
                    self.compile_scope(children, &path, &next, out)?;
                }
                // Array items are not compiled per-item: item-level
                // constraints would need index-aware paths, which the
                // addressing model does not carry
                FlatNode::Array { key, hidden, .. } => {
                    out.push(CompiledField::container(
                        scope.child(key),
                        ARRAY_TYPE,
                        hidden,
                        inherited,
                    ));
                }
            }
        }
        Ok(())
    }

    fn compile_leaf(
        &self,
        path: FieldPath,
        field: &LeafField,
        inherited: &[Condition],
    ) -> Result<CompiledField> {
        let mut constraints = Vec::new();

        // 1. Shorthand flags
        if field.required {
            constraints.push(CompiledConstraint::unconditional(Constraint::Required));
        }
        if field.email {
            constraints.push(CompiledConstraint::unconditional(Constraint::Email));
        }
        if let Some(bound) = field.effective_min() {
            constraints.push(CompiledConstraint::unconditional(Constraint::Min(bound)));
        }
        if let Some(bound) = field.effective_max() {
            constraints.push(CompiledConstraint::unconditional(Constraint::Max(bound)));
        }
        if let Some(bound) = field.min_length {
            constraints.push(CompiledConstraint::unconditional(Constraint::MinLength(bound)));
        }
        if let Some(bound) = field.max_length {
            constraints.push(CompiledConstraint::unconditional(Constraint::MaxLength(bound)));
        }
        if let Some(pattern) = &field.pattern {
            constraints.push(CompiledConstraint::unconditional(compile_pattern(pattern)?));
        }

        // 2. Explicit validator list
        for config in &field.validators {
            if let Some(constraint) = compile_validator(config)? {
                constraints.push(constraint);
            }
        }

        // 3. Logic bindings
        let mut hidden = Vec::new();
        let mut disabled = Vec::new();
        let mut readonly = Vec::new();
        let mut derive = None;
        for rule in &field.logic {
            match rule {
                LogicRule::Hidden(cond) => hidden.push(CompiledCondition::new(cond.clone())),
                LogicRule::Disabled(cond) => disabled.push(CompiledCondition::new(cond.clone())),
                LogicRule::Readonly(cond) => readonly.push(CompiledCondition::new(cond.clone())),
                LogicRule::Derive(expression) => {
                    match ExpressionParser::parse_expression(expression) {
                        Ok(parsed) => derive = Some(DeriveBinding { parsed }),
                        Err(err) => {
                            error!(
                                "Field '{}' has an invalid derive expression '{}': {}",
                                path, expression, err
                            );
                        }
                    }
                }
            }
        }

        // 4. Named schema bundles, spliced in declaration order
        for name in &field.schemas {
            match self.schemas.get(name) {
                Some(schema) => {
                    for config in &schema.validators {
                        if let Some(constraint) = compile_validator(config)? {
                            constraints.push(constraint);
                        }
                    }
                }
                None => warn!("Field '{}' references unknown schema '{}'", path, name),
            }
        }

        Ok(CompiledField {
            path,
            component: field.component.clone(),
            stateful: !field.is_hidden_value(),
            constraints,
            hidden,
            ancestor_hidden: compile_conditions(inherited),
            disabled,
            readonly,
            derive,
            static_disabled: field.disabled,
        })
    }
}

fn compile_conditions(conditions: &[Condition]) -> Vec<CompiledCondition> {
    conditions.iter().cloned().map(CompiledCondition::new).collect()
}

fn chain_hidden(inherited: &[Condition], own: &[Condition]) -> Vec<Condition> {
    inherited.iter().chain(own).cloned().collect()
}

fn compile_pattern(pattern: &str) -> Result<Constraint> {
    Regex::new(pattern)
        .map(Constraint::Pattern)
        .map_err(|err| FormError::InvalidPattern(format!("{}: {}", pattern, err)))
}

/// Compiles one declarative validator entry. Returns `None` for entries
/// that are structurally incomplete; only a malformed pattern is an error.
fn compile_validator(config: &ValidatorConfig) -> Result<Option<CompiledConstraint>> {
    let constraint = match config.kind {
        ValidatorKind::Required => Some(Constraint::Required),
        ValidatorKind::Email => Some(Constraint::Email),
        ValidatorKind::Min => numeric_bound(config).map(Constraint::Min),
        ValidatorKind::Max => numeric_bound(config).map(Constraint::Max),
        ValidatorKind::MinLength => integer_bound(config).map(Constraint::MinLength),
        ValidatorKind::MaxLength => integer_bound(config).map(Constraint::MaxLength),
        ValidatorKind::Pattern => match config.value.as_ref().and_then(JsonValue::as_str) {
            Some(pattern) => Some(compile_pattern(pattern)?),
            None => {
                warn!("Pattern validator without a pattern string, skipping");
                None
            }
        },
        ValidatorKind::Custom => match (&config.expression, &config.value) {
            (Some(expression), _) => match ExpressionParser::parse_expression(expression) {
                Ok(parsed) => Some(Constraint::Expr(parsed)),
                Err(err) => {
                    error!("Invalid custom validator expression '{}': {}", expression, err);
                    None
                }
            },
            (None, Some(JsonValue::String(name))) => Some(Constraint::CustomFn(name.clone())),
            _ => {
                warn!("Custom validator without expression or function name, skipping");
                None
            }
        },
        ValidatorKind::CustomAsync => match handler_name(config) {
            Some(name) => Some(Constraint::CustomAsync(name)),
            None => {
                warn!("Async validator without a handler name, skipping");
                None
            }
        },
        ValidatorKind::CustomHttp => match handler_name(config) {
            Some(endpoint) => Some(Constraint::CustomHttp(endpoint)),
            None => {
                warn!("HTTP validator without an endpoint, skipping");
                None
            }
        },
    };

    Ok(constraint.map(|constraint| CompiledConstraint {
        constraint,
        message: config.message.clone(),
        when: config.when.clone().map(CompiledCondition::new),
    }))
}

fn numeric_bound(config: &ValidatorConfig) -> Option<f64> {
    let bound = config.value.as_ref().and_then(JsonValue::as_f64);
    if bound.is_none() {
        warn!("{:?} validator without a numeric bound, skipping", config.kind);
    }
    bound
}

fn integer_bound(config: &ValidatorConfig) -> Option<u64> {
    let bound = config.value.as_ref().and_then(JsonValue::as_u64);
    if bound.is_none() {
        warn!("{:?} validator without an integer bound, skipping", config.kind);
    }
    bound
}

/// Handler or endpoint name for externally resolved validators: the
/// `expression` property, or a string `value` as fallback.
fn handler_name(config: &ValidatorConfig) -> Option<String> {
    config.expression.clone().or_else(|| {
        config
            .value
            .as_ref()
            .and_then(JsonValue::as_str)
            .map(str::to_string)
    })
}

/// A fully compiled form, ready for repeated snapshot evaluation.
pub struct CompiledForm {
    flat: Vec<FlatNode>,
    fields: Vec<CompiledField>,
    form_exclusion: ExclusionOverrides,
    functions: FunctionRegistry,
}

impl CompiledForm {
    pub fn new(
        flat: Vec<FlatNode>,
        schemas: &HashMap<String, SchemaDefinition>,
        form_exclusion: ExclusionOverrides,
        functions: FunctionRegistry,
    ) -> Result<Self> {
        let fields = SchemaCompiler::new(schemas).compile(&flat)?;
        Ok(Self {
            flat,
            fields,
            form_exclusion,
            functions,
        })
    }

    pub fn flat(&self) -> &[FlatNode] {
        &self.flat
    }

    pub fn fields(&self) -> &[CompiledField] {
        &self.fields
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    pub fn functions_mut(&mut self) -> &mut FunctionRegistry {
        &mut self.functions
    }

    pub fn form_exclusion(&self) -> &ExclusionOverrides {
        &self.form_exclusion
    }

    /// Evaluates every field's reactive state, constraints and derivations
    /// against one snapshot.
    pub fn evaluate(&self, snapshot: &JsonValue) -> Evaluation {
        let mut evaluation = Evaluation::default();
        for field in &self.fields {
            let field_value = field.path.lookup(snapshot);
            let ctx = ConditionContext {
                form_value: snapshot,
                field_value,
                path: &field.path,
                functions: &self.functions,
            };

            let state = FieldState {
                hidden: any_true(&field.ancestor_hidden, &ctx) || any_true(&field.hidden, &ctx),
                disabled: field.static_disabled || any_true(&field.disabled, &ctx),
                readonly: any_true(&field.readonly, &ctx),
            };
            if field.stateful {
                evaluation.states.insert(field.path.to_string(), state);
            }

            // Hidden fields keep their value question (exclusion) but stop
            // raising violations or deriving
            if state.hidden {
                continue;
            }

            for constraint in &field.constraints {
                if !constraint.applies(&ctx) {
                    continue;
                }
                if !constraint.constraint.check(field_value, &ctx) {
                    evaluation.violations.push(ConstraintViolation {
                        path: field.path.to_string(),
                        constraint: constraint.constraint.label().to_string(),
                        message: constraint.message(),
                    });
                }
            }

            if let Some(binding) = &field.derive {
                let interpreter = crate::expr::Interpreter::new(
                    snapshot,
                    self.functions.expr_functions(),
                )
                .with_field_value(field_value);
                match interpreter.evaluate(&binding.parsed) {
                    Ok(value) => {
                        let derived: JsonValue = value.into();
                        if field_value != Some(&derived) {
                            evaluation.derived.insert(field.path.to_string(), derived);
                        }
                    }
                    Err(err) => {
                        error!("Derivation for '{}' failed: {}", field.path, err);
                    }
                }
            }
        }
        evaluation
    }

    /// Resolved exclusion policy for one leaf, all three tiers applied.
    pub fn exclusion_for(&self, field: &ExclusionOverrides) -> ExclusionPolicy {
        ExclusionPolicy::resolve(field, &self.form_exclusion, ExclusionPolicy::DEFAULT)
    }
}
