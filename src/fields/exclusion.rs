use serde::{Deserialize, Serialize};

/// Per-tier exclusion settings, each flag optional.
///
/// An unset flag defers to the next tier down: field overrides defer to the
/// form-level overrides, which defer to the built-in global default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExclusionOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_value_if_hidden: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_value_if_disabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_value_if_readonly: Option<bool>,
}

impl ExclusionOverrides {
    pub fn is_empty(&self) -> bool {
        self.exclude_value_if_hidden.is_none()
            && self.exclude_value_if_disabled.is_none()
            && self.exclude_value_if_readonly.is_none()
    }
}

/// Fully resolved exclusion policy for one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExclusionPolicy {
    pub if_hidden: bool,
    pub if_disabled: bool,
    pub if_readonly: bool,
}

impl ExclusionPolicy {
    /// Built-in global default: hidden values are dropped, disabled and
    /// readonly values are kept.
    pub const DEFAULT: Self = Self {
        if_hidden: true,
        if_disabled: false,
        if_readonly: false,
    };

    /// Resolves the three tiers for one field. Each flag independently
    /// falls through `field` -> `form` -> `global` on `None`.
    pub fn resolve(
        field: &ExclusionOverrides,
        form: &ExclusionOverrides,
        global: ExclusionPolicy,
    ) -> Self {
        Self {
            if_hidden: field
                .exclude_value_if_hidden
                .or(form.exclude_value_if_hidden)
                .unwrap_or(global.if_hidden),
            if_disabled: field
                .exclude_value_if_disabled
                .or(form.exclude_value_if_disabled)
                .unwrap_or(global.if_disabled),
            if_readonly: field
                .exclude_value_if_readonly
                .or(form.exclude_value_if_readonly)
                .unwrap_or(global.if_readonly),
        }
    }
}
