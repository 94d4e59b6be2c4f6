//! # Constraint Compiler
//!
//! Turns the flattened form shape into a reusable [`CompiledForm`]:
//!
//! * `constraints` - the compiled constraint model and checking semantics
//! * `compiler` - the compilation walk and per-snapshot evaluation
//! * `guard` - staleness tracking for asynchronous validators
//!
//! Compilation is the fail-loud half (a malformed regex pattern is an
//! error); evaluation is the fail-closed half (broken expressions log and
//! degrade locally).

pub mod compiler;
pub mod constraints;
pub mod guard;

pub use compiler::{CompiledField, CompiledForm, Evaluation, FieldState, SchemaCompiler};
pub use constraints::{CompiledConstraint, Constraint, ConstraintViolation};
pub use guard::AsyncValidationGuard;
