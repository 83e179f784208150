//! The read-only view the compiler takes of a finished graph.
//!
//! [`BlockSource`] is the boundary between whatever produced the graph (the
//! visual editor, a workspace file, a test fixture) and the compiler. It
//! exposes exactly what a compile walk needs and nothing that mutates.
//! [`crate::graph::BlockGraph`] is the in-tree implementation.

use crate::id::NodeId;
use crate::kind::BlockKind;
use crate::node::FieldValue;

pub trait BlockSource {
    /// Blocks with no parent (no incoming slot or chain link), in a stable
    /// order.
    fn top_level(&self) -> Vec<NodeId>;

    /// The kind of `node`, or `None` if the id does not name a block.
    fn kind(&self, node: NodeId) -> Option<BlockKind>;

    /// A scalar field of `node`.
    fn field(&self, node: NodeId, name: &str) -> Option<&FieldValue>;

    /// The child plugged into the named slot of `node`.
    fn slot(&self, node: NodeId, name: &str) -> Option<NodeId>;

    /// The chain successor of `node`.
    fn next(&self, node: NodeId) -> Option<NodeId>;

    /// The editor's id for `node`, when it has one.
    fn block_id(&self, _node: NodeId) -> Option<&str> {
        None
    }
}
