//! # Configuration Layer
//!
//! The raw, serde-facing configuration shape and the passes that turn it
//! into the typed descriptor model:
//!
//! * `types` - raw configuration structs as authored (JSON-friendly)
//! * `interpreter` - raw tree to typed [`crate::fields::FieldDescriptor`] tree
//! * `validator` - structural legality checks with errors and warnings

pub mod interpreter;
pub mod types;
pub mod validator;

pub use interpreter::{interpret_config, FormConfig};
pub use types::{RawChildren, RawField, RawFormConfig, RawLogic, RawTemplate};
pub use validator::{validate_config, validate_strict, ConfigReport};
