use serde::{Deserialize, Serialize};

use crate::fields::validators::ValidatorConfig;

/// A named, reusable bundle of validator configurations.
///
/// Leaves reference bundles by name through their `schemas` list; the
/// constraint compiler resolves each reference against a per-form table,
/// never against ambient global state, so independent form instances cannot
/// cross-contaminate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDefinition {
    pub name: String,
    pub validators: Vec<ValidatorConfig>,
}
