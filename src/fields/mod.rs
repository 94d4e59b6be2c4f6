//! # Field Definition Model
//!
//! The typed vocabulary of container and leaf descriptors that make up a
//! form configuration tree, plus the attached rule types:
//!
//! * `descriptor` - the [`FieldDescriptor`] variant enum over all field kinds
//! * `containers` - page, row, group, and array container structs
//! * `leaf` - value-bearing and display-only leaf fields
//! * `logic` - conditional hidden/disabled/readonly/derive rules
//! * `validators` - declarative constraint configurations
//! * `exclusion` - the three-tier output exclusion policy
//! * `schema_def` - named reusable validator bundles

pub mod containers;
pub mod descriptor;
pub mod exclusion;
pub mod leaf;
pub mod logic;
pub mod schema_def;
pub mod validators;

pub use containers::{ArrayField, GroupField, PageField, RowField};
pub use descriptor::FieldDescriptor;
pub use exclusion::{ExclusionOverrides, ExclusionPolicy};
pub use leaf::LeafField;
pub use logic::{LogicKind, LogicRule};
pub use schema_def::SchemaDefinition;
pub use validators::{ValidatorConfig, ValidatorKind};

/// Component type name of the componentless literal-value leaf.
pub const HIDDEN_VALUE_COMPONENT: &str = "hidden";
/// Component type name of the display-only text leaf.
pub const TEXT_COMPONENT: &str = "text";
/// Component type name of the generated add-item control.
pub const ADD_ITEM_COMPONENT: &str = "addArrayItem";
/// Component type name of the generated remove-item control.
pub const REMOVE_ITEM_COMPONENT: &str = "removeArrayItem";
/// Fixed key of the generated remove-item control, local to each item.
pub const REMOVE_ITEM_KEY: &str = "__remove";
