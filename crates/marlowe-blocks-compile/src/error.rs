//! Error types for compiling block graphs and reading documents.
//!
//! [`CompileError`] is a plain value: the first structural violation found
//! by the depth-first walk. Every variant that concerns a particular block
//! carries its [`NodeId`] so the editor can highlight it.

use serde::Serialize;

use marlowe_blocks_core::{BlockKind, Category, NodeId};

/// Structural violations of the block grammar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum CompileError {
    /// The graph has no top-level `contract_root` block.
    #[error("no contract_root block found; add a Contract Root block")]
    MissingRoot,

    /// A required slot is empty.
    #[error("missing required input \"{slot}\" on {block_kind} (node {node})")]
    MissingInput {
        node: NodeId,
        block_kind: BlockKind,
        slot: &'static str,
    },

    /// A block of the wrong category is plugged into a slot or chain.
    #[error("expected a {expected} block, found {found} ({}) at node {node}", .found.category())]
    CategoryMismatch {
        node: NodeId,
        expected: Category,
        found: BlockKind,
    },

    /// A chain of cases or bounds links back to one of its own elements.
    #[error("chain revisits node {at_node}")]
    CyclicChain { at_node: NodeId },

    /// A block is reachable from itself through slots.
    #[error("block at node {at_node} contains itself")]
    CyclicSlot { at_node: NodeId },

    /// A numeric field does not hold an integer.
    #[error("field {field} on {block_kind} (node {node}) is not an integer: \"{raw}\"")]
    InvalidNumericField {
        node: NodeId,
        block_kind: BlockKind,
        field: &'static str,
        raw: String,
    },

    /// A declared field has no value at all.
    #[error("missing field {field} on {block_kind} (node {node})")]
    MissingField {
        node: NodeId,
        block_kind: BlockKind,
        field: &'static str,
    },

    /// A slot or chain link names a node the snapshot does not contain.
    #[error("reference to unknown node {node}")]
    DanglingReference { node: NodeId },
}

impl CompileError {
    /// The node to highlight, if the error concerns one.
    pub fn node(&self) -> Option<NodeId> {
        match self {
            CompileError::MissingRoot => None,
            CompileError::MissingInput { node, .. }
            | CompileError::CategoryMismatch { node, .. }
            | CompileError::InvalidNumericField { node, .. }
            | CompileError::MissingField { node, .. }
            | CompileError::DanglingReference { node } => Some(*node),
            CompileError::CyclicChain { at_node } | CompileError::CyclicSlot { at_node } => {
                Some(*at_node)
            }
        }
    }
}

/// Errors reading a serialized contract document back into the IR.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    /// The text is not JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A JSON value does not have the shape of any variant of the expected
    /// category.
    #[error("unrecognized {expected} at {path}: {found}")]
    Unrecognized {
        expected: &'static str,
        path: String,
        found: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use marlowe_blocks_core::{ContractKind, ValueKind};

    #[test]
    fn messages_name_kind_and_slot() {
        let err = CompileError::MissingInput {
            node: NodeId(0),
            block_kind: BlockKind::Root,
            slot: "CONTRACT",
        };
        assert_eq!(
            err.to_string(),
            "missing required input \"CONTRACT\" on contract_root (node 0)"
        );

        let err = CompileError::CategoryMismatch {
            node: NodeId(4),
            expected: Category::Contract,
            found: BlockKind::Value(ValueKind::Add),
        };
        assert_eq!(
            err.to_string(),
            "expected a Contract block, found value_add (Value) at node 4"
        );
    }

    #[test]
    fn errors_serialize_with_tag() {
        let err = CompileError::InvalidNumericField {
            node: NodeId(2),
            block_kind: BlockKind::Contract(ContractKind::When),
            field: "TIMEOUT",
            raw: "soon".to_string(),
        };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "error": "invalid_numeric_field",
                "node": 2,
                "block_kind": "contract_when",
                "field": "TIMEOUT",
                "raw": "soon"
            })
        );

        let json = serde_json::to_value(CompileError::MissingRoot).unwrap();
        assert_eq!(json, serde_json::json!({"error": "missing_root"}));
    }

    #[test]
    fn node_for_highlighting() {
        assert_eq!(CompileError::MissingRoot.node(), None);
        assert_eq!(
            CompileError::CyclicChain { at_node: NodeId(3) }.node(),
            Some(NodeId(3))
        );
    }
}
