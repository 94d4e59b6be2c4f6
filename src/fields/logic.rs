use serde::{Deserialize, Serialize};

use crate::conditions::Condition;

/// Kind tag for a conditional logic rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LogicKind {
    Hidden,
    Disabled,
    Readonly,
    Derive,
}

/// A conditional behavior attached to a field.
///
/// `Hidden`, `Disabled` and `Readonly` carry a boolean condition evaluated
/// against the live form value; multiple rules of the same kind on one field
/// combine with OR semantics. `Derive` carries an expression in the
/// restricted DSL whose result is written back as the field's own value
/// whenever any referenced field changes.
#[derive(Debug, Clone, PartialEq)]
pub enum LogicRule {
    Hidden(Condition),
    Disabled(Condition),
    Readonly(Condition),
    Derive(String),
}

impl LogicRule {
    pub fn kind(&self) -> LogicKind {
        match self {
            Self::Hidden(_) => LogicKind::Hidden,
            Self::Disabled(_) => LogicKind::Disabled,
            Self::Readonly(_) => LogicKind::Readonly,
            Self::Derive(_) => LogicKind::Derive,
        }
    }
}
