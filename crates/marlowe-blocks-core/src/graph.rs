//! BlockGraph: the snapshot of a block workspace as a directed graph.
//!
//! Blocks are nodes of a petgraph `StableGraph`; slot connections and chain
//! links are edges. Node ids stay valid when other blocks are removed, which
//! keeps error locations stable while the editor keeps changing the graph.
//!
//! The builder methods validate names against the grammar table (a slot or
//! field the kind does not declare is rejected) but do not
//! validate categories: a graph may hold a `Value` block in a `Contract`
//! slot, exactly like an untrusted snapshot from the editor can. Category
//! checks belong to the compiler.

use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableGraph;
use petgraph::visit::EdgeRef;
use petgraph::{Directed, Direction};
use serde::{Deserialize, Serialize};

use crate::edge::BlockEdge;
use crate::error::CoreError;
use crate::id::NodeId;
use crate::kind::BlockKind;
use crate::node::{BlockNode, FieldValue};
use crate::source::BlockSource;

/// A graph of blocks connected through named slots and chain links.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockGraph {
    blocks: StableGraph<BlockNode, BlockEdge, Directed, u32>,
}

impl BlockGraph {
    pub fn new() -> Self {
        BlockGraph {
            blocks: StableGraph::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Node methods
    // -----------------------------------------------------------------------

    /// Adds an unconnected block with no fields set.
    pub fn add_block(&mut self, kind: BlockKind) -> NodeId {
        NodeId::from(self.blocks.add_node(BlockNode::new(kind)))
    }

    /// Adds a block carrying the editor's block id.
    pub fn add_block_with_id(&mut self, kind: BlockKind, block_id: impl Into<String>) -> NodeId {
        let mut node = BlockNode::new(kind);
        node.block_id = Some(block_id.into());
        NodeId::from(self.blocks.add_node(node))
    }

    /// Looks up a block by ID.
    pub fn get_block(&self, id: NodeId) -> Option<&BlockNode> {
        self.blocks.node_weight(id.into())
    }

    /// Removes a block and every edge touching it. Its former children become
    /// top-level blocks.
    pub fn remove_block(&mut self, id: NodeId) -> Result<BlockNode, CoreError> {
        self.blocks
            .remove_node(id.into())
            .ok_or(CoreError::NodeNotFound { id })
    }

    /// Sets a scalar field. The field must be declared by the block's kind.
    pub fn set_field(
        &mut self,
        id: NodeId,
        name: &str,
        value: impl Into<FieldValue>,
    ) -> Result<(), CoreError> {
        let node = self
            .blocks
            .node_weight_mut(id.into())
            .ok_or(CoreError::NodeNotFound { id })?;
        if node.kind.spec().field(name).is_none() {
            return Err(CoreError::UnknownField {
                kind: node.kind,
                field: name.to_string(),
            });
        }
        node.fields.insert(name.to_string(), value.into());
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Edge methods
    // -----------------------------------------------------------------------

    /// Plugs `child` into the named slot of `parent`, replacing whatever was
    /// connected there before.
    pub fn connect(&mut self, parent: NodeId, slot: &str, child: NodeId) -> Result<(), CoreError> {
        let kind = self.require(parent)?.kind;
        self.require(child)?;
        if kind.spec().slot(slot).is_none() {
            return Err(CoreError::UnknownSlot {
                kind,
                slot: slot.to_string(),
            });
        }
        self.disconnect(parent, slot);
        self.blocks.add_edge(
            parent.into(),
            child.into(),
            BlockEdge::Slot {
                name: slot.to_string(),
            },
        );
        Ok(())
    }

    /// Empties the named slot of `parent`, returning the detached child.
    pub fn disconnect(&mut self, parent: NodeId, slot: &str) -> Option<NodeId> {
        let edge = self
            .blocks
            .edges_directed(parent.into(), Direction::Outgoing)
            .find(|edge| edge.weight().is_slot(slot))
            .map(|edge| (edge.id(), edge.target()))?;
        self.blocks.remove_edge(edge.0);
        Some(NodeId::from(edge.1))
    }

    /// Links `next` after `node` in a chain, replacing any previous link.
    /// Only chain-link kinds (cases, bounds) accept a successor; the kind of
    /// the successor is not checked here.
    pub fn set_next(&mut self, node: NodeId, next: NodeId) -> Result<(), CoreError> {
        let kind = self.require(node)?.kind;
        self.require(next)?;
        if !kind.spec().is_chain_link() {
            return Err(CoreError::NotChainable { kind });
        }
        self.clear_next(node);
        self.blocks.add_edge(node.into(), next.into(), BlockEdge::Next);
        Ok(())
    }

    /// Removes the chain link leaving `node`, returning the former successor.
    pub fn clear_next(&mut self, node: NodeId) -> Option<NodeId> {
        let edge = self
            .blocks
            .edges_directed(node.into(), Direction::Outgoing)
            .find(|edge| edge.weight().is_next())
            .map(|edge| (edge.id(), edge.target()))?;
        self.blocks.remove_edge(edge.0);
        Some(NodeId::from(edge.1))
    }

    /// Links `nodes` into one chain in the given order.
    pub fn chain(&mut self, nodes: &[NodeId]) -> Result<(), CoreError> {
        for pair in nodes.windows(2) {
            self.set_next(pair[0], pair[1])?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// The child in the named slot of `node`.
    pub fn slot_target(&self, node: NodeId, slot: &str) -> Option<NodeId> {
        self.outgoing(node)
            .find(|(edge, _)| edge.is_slot(slot))
            .map(|(_, target)| target)
    }

    /// The chain successor of `node`.
    pub fn next_of(&self, node: NodeId) -> Option<NodeId> {
        self.outgoing(node)
            .find(|(edge, _)| edge.is_next())
            .map(|(_, target)| target)
    }

    /// Blocks with no incoming edge, in ascending id order.
    pub fn top_level_blocks(&self) -> Vec<NodeId> {
        self.blocks
            .node_indices()
            .filter(|&idx| {
                self.blocks
                    .edges_directed(idx, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .map(NodeId::from)
            .collect()
    }

    /// Returns the number of blocks.
    pub fn node_count(&self) -> usize {
        self.blocks.node_count()
    }

    /// Returns the number of slot connections plus chain links.
    pub fn edge_count(&self) -> usize {
        self.blocks.edge_count()
    }

    fn require(&self, id: NodeId) -> Result<&BlockNode, CoreError> {
        self.get_block(id).ok_or(CoreError::NodeNotFound { id })
    }

    fn outgoing(&self, node: NodeId) -> impl Iterator<Item = (&BlockEdge, NodeId)> + '_ {
        let idx: NodeIndex<u32> = node.into();
        self.blocks
            .edges_directed(idx, Direction::Outgoing)
            .map(|edge| (edge.weight(), NodeId::from(edge.target())))
    }
}

impl BlockSource for BlockGraph {
    fn top_level(&self) -> Vec<NodeId> {
        self.top_level_blocks()
    }

    fn kind(&self, node: NodeId) -> Option<BlockKind> {
        self.get_block(node).map(|block| block.kind)
    }

    fn field(&self, node: NodeId, name: &str) -> Option<&FieldValue> {
        self.get_block(node).and_then(|block| block.field(name))
    }

    fn slot(&self, node: NodeId, name: &str) -> Option<NodeId> {
        self.slot_target(node, name)
    }

    fn next(&self, node: NodeId) -> Option<NodeId> {
        self.next_of(node)
    }

    fn block_id(&self, node: NodeId) -> Option<&str> {
        self.get_block(node).and_then(|block| block.block_id.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::{ContractKind, ObservationKind, ValueKind};

    #[test]
    fn connect_and_query_slots() {
        let mut graph = BlockGraph::new();
        let root = graph.add_block(BlockKind::Root);
        let close = graph.add_block(BlockKind::Contract(ContractKind::Close));

        graph.connect(root, "CONTRACT", close).unwrap();

        assert_eq!(graph.slot_target(root, "CONTRACT"), Some(close));
        assert_eq!(graph.slot_target(root, "OTHER"), None);
        assert_eq!(graph.top_level_blocks(), vec![root]);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn connect_replaces_existing_child() {
        let mut graph = BlockGraph::new();
        let root = graph.add_block(BlockKind::Root);
        let first = graph.add_block(BlockKind::Contract(ContractKind::Close));
        let second = graph.add_block(BlockKind::Contract(ContractKind::Close));

        graph.connect(root, "CONTRACT", first).unwrap();
        graph.connect(root, "CONTRACT", second).unwrap();

        assert_eq!(graph.slot_target(root, "CONTRACT"), Some(second));
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.top_level_blocks(), vec![root, first]);
    }

    #[test]
    fn connect_does_not_check_categories() {
        let mut graph = BlockGraph::new();
        let root = graph.add_block(BlockKind::Root);
        let value = graph.add_block(BlockKind::Value(ValueKind::TimeIntervalEnd));
        assert!(graph.connect(root, "CONTRACT", value).is_ok());
    }

    #[test]
    fn undeclared_slot_is_rejected() {
        let mut graph = BlockGraph::new();
        let not = graph.add_block(BlockKind::Observation(ObservationKind::Not));
        let t = graph.add_block(BlockKind::Observation(ObservationKind::True));

        match graph.connect(not, "LHS", t) {
            Err(CoreError::UnknownSlot { kind, slot }) => {
                assert_eq!(kind, BlockKind::Observation(ObservationKind::Not));
                assert_eq!(slot, "LHS");
            }
            other => panic!("expected UnknownSlot, got {other:?}"),
        }
    }

    #[test]
    fn undeclared_field_is_rejected() {
        let mut graph = BlockGraph::new();
        let constant = graph.add_block(BlockKind::Value(ValueKind::Constant));
        assert!(graph.set_field(constant, "VALUE", 10i64).is_ok());
        assert!(matches!(
            graph.set_field(constant, "NAME", "x"),
            Err(CoreError::UnknownField { .. })
        ));
    }

    #[test]
    fn missing_node_errors() {
        let mut graph = BlockGraph::new();
        let root = graph.add_block(BlockKind::Root);
        match graph.connect(root, "CONTRACT", NodeId(99)) {
            Err(CoreError::NodeNotFound { id }) => assert_eq!(id, NodeId(99)),
            other => panic!("expected NodeNotFound, got {other:?}"),
        }
        assert!(graph.slot_target(NodeId(99), "CONTRACT").is_none());
        assert!(graph.next_of(NodeId(99)).is_none());
    }

    #[test]
    fn next_only_on_chain_links() {
        let mut graph = BlockGraph::new();
        let a = graph.add_block(BlockKind::Bound);
        let b = graph.add_block(BlockKind::Bound);
        let close = graph.add_block(BlockKind::Contract(ContractKind::Close));

        graph.set_next(a, b).unwrap();
        assert_eq!(graph.next_of(a), Some(b));
        assert_eq!(graph.top_level_blocks(), vec![a, close]);

        assert!(matches!(
            graph.set_next(close, a),
            Err(CoreError::NotChainable { .. })
        ));
    }

    #[test]
    fn chain_links_in_order() {
        let mut graph = BlockGraph::new();
        let cases: Vec<_> = (0..3).map(|_| graph.add_block(BlockKind::Case)).collect();
        graph.chain(&cases).unwrap();

        assert_eq!(graph.next_of(cases[0]), Some(cases[1]));
        assert_eq!(graph.next_of(cases[1]), Some(cases[2]));
        assert_eq!(graph.next_of(cases[2]), None);

        assert_eq!(graph.clear_next(cases[1]), Some(cases[2]));
        assert_eq!(graph.next_of(cases[1]), None);
    }

    #[test]
    fn remove_block_orphans_children() {
        let mut graph = BlockGraph::new();
        let root = graph.add_block(BlockKind::Root);
        let close = graph.add_block(BlockKind::Contract(ContractKind::Close));
        graph.connect(root, "CONTRACT", close).unwrap();

        let removed = graph.remove_block(root).unwrap();
        assert_eq!(removed.kind, BlockKind::Root);
        assert_eq!(graph.top_level_blocks(), vec![close]);
        assert!(graph.remove_block(root).is_err());
    }

    #[test]
    fn block_source_view() {
        let mut graph = BlockGraph::new();
        let role = graph.add_block_with_id(BlockKind::Party(crate::kind::PartyKind::Role), "blk-1");
        graph.set_field(role, "ROLE", "Buyer").unwrap();

        let source: &dyn BlockSource = &graph;
        assert_eq!(source.kind(role), Some(BlockKind::Party(crate::kind::PartyKind::Role)));
        assert_eq!(source.field(role, "ROLE"), Some(&FieldValue::from("Buyer")));
        assert_eq!(source.block_id(role), Some("blk-1"));
        assert_eq!(source.kind(NodeId(5)), None);
    }

    #[test]
    fn serde_roundtrip_preserves_structure() {
        let mut graph = BlockGraph::new();
        let root = graph.add_block(BlockKind::Root);
        let close = graph.add_block(BlockKind::Contract(ContractKind::Close));
        graph.connect(root, "CONTRACT", close).unwrap();

        let json = serde_json::to_string(&graph).unwrap();
        let back: BlockGraph = serde_json::from_str(&json).unwrap();
        assert_eq!(back.slot_target(root, "CONTRACT"), Some(close));
        assert_eq!(back.top_level_blocks(), vec![root]);
    }
}
