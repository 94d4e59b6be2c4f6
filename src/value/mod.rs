//! # Form Value Handling
//!
//! * `defaults` - initial snapshot construction from the flattened shape
//! * `filter` - exclusion-aware output value production

pub mod defaults;
pub mod filter;

pub use defaults::default_values;
pub use filter::filter_value;
