//! # Flattener
//!
//! Turns a normalized descriptor tree into the linear, scope-correct form
//! shape:
//!
//! * `registry` - descriptor type name to value-handling mode
//! * `flattener` - the single recursive pass with generated-key counters

pub mod flattener;
pub mod registry;

pub use flattener::{flatten, to_descriptors, FlatNode, FlattenOptions};
pub use registry::{ComponentRegistry, ValueHandling};
