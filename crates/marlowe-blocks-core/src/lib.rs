//! Block graph data model for the Marlowe contract editor.
//!
//! A contract is drawn as a graph of typed blocks. This crate holds the
//! pieces every consumer of that graph shares:
//!
//! - [`kind`] -- block kinds and the categories they belong to
//! - [`grammar`] -- the static grammar table (slots, fields, chain roles)
//! - [`graph`] -- [`BlockGraph`], a petgraph-backed snapshot with builder methods
//! - [`source`] -- [`BlockSource`], the read-only view the compiler consumes
//! - [`workspace`] -- import of the editor's Blockly workspace JSON

pub mod edge;
pub mod error;
pub mod grammar;
pub mod graph;
pub mod id;
pub mod kind;
pub mod node;
pub mod source;
pub mod workspace;

// Re-export commonly used types
pub use edge::BlockEdge;
pub use error::CoreError;
pub use grammar::{ChainRole, FieldSpec, FieldType, KindSpec, SlotSpec, GRAMMAR};
pub use graph::BlockGraph;
pub use id::NodeId;
pub use kind::{
    ActionKind, BlockKind, Category, ContractKind, ObservationKind, PartyKind, PayeeKind,
    ValueKind,
};
pub use node::{BlockNode, FieldValue};
pub use source::BlockSource;
