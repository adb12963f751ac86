//! Deterministic structural parsing of Python source
//!
//! Builds the `CodeUnit` snapshot every other stage reads: function and class
//! ranges, parameter lists, pre-counted decision points, top-level bindings,
//! and the structural facts behind the Empty Catch Block and Missing Default
//! checks. Parsing never fails a request; malformed input produces an
//! unparsable unit with the error recorded.

pub mod code_unit;
mod parser;

pub use code_unit::{ClassInfo, CodeUnit, FunctionInfo, LineRange};
