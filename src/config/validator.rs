//! Structural validation of a (normalized) raw configuration.
//!
//! Produces a report of human-readable errors and advisory warnings rather
//! than failing on first defect; callers opting into strict mode use
//! [`validate_strict`] to turn a failed report into a [`FormError`].

use std::collections::HashSet;

use crate::config::types::{RawChildren, RawField, RawFormConfig};
use crate::error::{FormError, Result};
use crate::fields::HIDDEN_VALUE_COMPONENT;

/// Outcome of structural validation.
#[derive(Debug, Clone, Default)]
pub struct ConfigReport {
    /// Blocking defects: illegal nesting, duplicate keys.
    pub errors: Vec<String>,
    /// Non-fatal configuration smells, surfaced but never blocking.
    pub warnings: Vec<String>,
}

impl ConfigReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validates the configuration and returns the full report.
pub fn validate_config(config: &RawFormConfig) -> ConfigReport {
    let mut report = ConfigReport::default();

    let pages: Vec<&RawField> = config
        .fields
        .iter()
        .filter(|field| field.field_type == "page")
        .collect();
    if pages.len() == 1 {
        report
            .warnings
            .push("Paged form declares a single page; paging adds nothing".to_string());
    }

    let mut scope = Scope::default();
    for field in &config.fields {
        validate_field(field, &Context::default(), &mut scope, &mut report);
    }

    report
}

/// Validates and returns an error carrying every reported defect if the
/// configuration is structurally invalid.
pub fn validate_strict(config: &RawFormConfig) -> Result<()> {
    let report = validate_config(config);
    if report.is_valid() {
        Ok(())
    } else {
        Err(FormError::InvalidConfig(report.errors.join("; ")))
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Context {
    in_page: bool,
    in_row: bool,
    in_array_item: bool,
}

/// Key bookkeeping for one value scope. Page and row children land in the
/// enclosing scope; group and array items each get a fresh one.
#[derive(Default)]
struct Scope {
    keys: HashSet<String>,
}

impl Scope {
    fn claim(&mut self, key: &str, report: &mut ConfigReport) {
        if !key.is_empty() && !self.keys.insert(key.to_string()) {
            report
                .errors
                .push(format!("Duplicate key '{}' within one scope", key));
        }
    }
}

fn validate_field(field: &RawField, ctx: &Context, scope: &mut Scope, report: &mut ConfigReport) {
    match field.field_type.as_str() {
        "page" => {
            if ctx.in_page {
                report
                    .errors
                    .push("A page may not contain another page at any depth".to_string());
            }
            if ctx.in_array_item {
                report
                    .errors
                    .push("An array item template may not contain a page".to_string());
            }
            let children = plain_children(field);
            if children.is_empty() {
                report.warnings.push(format!(
                    "Page '{}' has no fields",
                    field.key.as_deref().unwrap_or("<unkeyed>")
                ));
            }
            let ctx = Context {
                in_page: true,
                ..*ctx
            };
            for child in children {
                validate_field(child, &ctx, scope, report);
            }
        }
        "row" => {
            let ctx = Context {
                in_row: true,
                ..*ctx
            };
            for child in plain_children(field) {
                validate_field(child, &ctx, scope, report);
            }
        }
        "group" => {
            scope.claim(field.key.as_deref().unwrap_or(""), report);
            let mut nested = Scope::default();
            for child in plain_children(field) {
                validate_field(child, ctx, &mut nested, report);
            }
        }
        "array" => {
            scope.claim(field.key.as_deref().unwrap_or(""), report);
            if let Some(RawChildren::Items(items)) = &field.fields {
                let ctx = Context {
                    in_array_item: true,
                    ..*ctx
                };
                for item in items {
                    let mut item_scope = Scope::default();
                    for child in item {
                        validate_field(child, &ctx, &mut item_scope, report);
                    }
                }
            }
        }
        leaf_type => {
            if leaf_type == HIDDEN_VALUE_COMPONENT && ctx.in_row {
                report.warnings.push(format!(
                    "Hidden-value leaf '{}' inside a row renders nothing and breaks the row layout",
                    field.key.as_deref().unwrap_or("<unkeyed>")
                ));
            }
            scope.claim(field.key.as_deref().unwrap_or(""), report);
        }
    }
}

fn plain_children(field: &RawField) -> &[RawField] {
    match &field.fields {
        Some(RawChildren::Fields(fields)) => fields,
        _ => &[],
    }
}
