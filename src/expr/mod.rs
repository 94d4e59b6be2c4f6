//! # Expression DSL
//!
//! A small, closed expression language for form conditions and derived
//! values.
//!
//! ## Components
//!
//! * `ast` - Abstract syntax tree definitions
//! * `parser` - PEST-based parser (`grammar.pest`)
//! * `interpreter` - Snapshot-bound evaluator
//! * `functions` - Builtin function table
//!
//! Expressions are parsed once when a form is compiled and evaluated once
//! per relevant value change. The grammar intentionally stops at
//! comparisons, boolean combinators, arithmetic, field-path lookups and
//! function calls; there is no statement layer and no access to anything
//! outside the value snapshot and the registered function tables.

pub mod ast;
pub mod functions;
pub mod interpreter;
pub mod parser;

pub use ast::{Expression, Operator, UnaryOperator, Value};
pub use functions::{builtin_functions, ExprFunction};
pub use interpreter::Interpreter;
pub use parser::ExpressionParser;
