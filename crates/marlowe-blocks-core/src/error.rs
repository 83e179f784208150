//! Core error types for marlowe-blocks-core.
//!
//! Uses `thiserror` for structured, matchable variants covering graph
//! construction and workspace import. Grammar violations found while
//! compiling a finished graph are reported by the compiler crate instead.

use thiserror::Error;

use crate::id::NodeId;
use crate::kind::BlockKind;

/// Errors produced while building or importing a block graph.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A node id was not found in the graph.
    #[error("node not found: NodeId({id})")]
    NodeNotFound { id: NodeId },

    /// A block tag does not name any known kind.
    #[error("unknown block type: '{tag}'")]
    UnknownKind { tag: String },

    /// The kind declares no slot with this name.
    #[error("block {kind} has no input '{slot}'")]
    UnknownSlot { kind: BlockKind, slot: String },

    /// The kind declares no field with this name.
    #[error("block {kind} has no field '{field}'")]
    UnknownField { kind: BlockKind, field: String },

    /// A `next` link was set on a kind that does not chain.
    #[error("block {kind} cannot be chained")]
    NotChainable { kind: BlockKind },

    /// The workspace document is not valid Blockly JSON.
    #[error("invalid workspace: {0}")]
    Workspace(#[from] serde_json::Error),
}
