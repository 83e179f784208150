//! Compiler from a block graph to a Marlowe contract document.
//!
//! - [`compiler`] -- [`compile`], the entry point
//! - [`translate`] -- one translator per grammar category
//! - [`chain`] -- ordered chains of cases and bounds
//! - [`document`] -- the contract document IR
//! - [`serialize`] -- canonical JSON output
//! - [`reader`] -- parsing a document back into the IR

pub mod chain;
pub mod compiler;
pub mod document;
pub mod error;
pub mod reader;
pub mod serialize;
pub mod translate;

pub use compiler::{compile, compile_to_string};
pub use document::{
    Action, Bound, Case, ChoiceId, CompareOp, Contract, Observation, Party, Payee, Token, Value,
};
pub use error::{CompileError, ReadError};
pub use reader::read_document;
pub use serialize::{serialize, to_json};
