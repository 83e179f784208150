//! Import of the Blockly workspace serialization.
//!
//! The editor saves its canvas as nested JSON:
//!
//! ```json
//! {"blocks": {"languageVersion": 0, "blocks": [
//!   {"type": "contract_root", "id": "r", "x": 40, "y": 40,
//!    "inputs": {"CONTRACT": {"block": {"type": "contract_close"}}}}
//! ]}}
//! ```
//!
//! Each entry of the top-level list becomes a parentless block; `inputs`
//! become slot edges and `next` becomes a chain link. Canvas coordinates,
//! variables and other editor state are ignored.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::CoreError;
use crate::graph::BlockGraph;
use crate::id::NodeId;
use crate::kind::BlockKind;
use crate::node::FieldValue;

#[derive(Debug, Deserialize)]
struct WorkspaceState {
    #[serde(default)]
    blocks: Option<TopBlocks>,
}

#[derive(Debug, Deserialize)]
struct TopBlocks {
    #[serde(default)]
    blocks: Vec<BlockState>,
}

#[derive(Debug, Deserialize)]
struct BlockState {
    #[serde(rename = "type")]
    tag: String,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    fields: IndexMap<String, FieldValue>,
    #[serde(default)]
    inputs: IndexMap<String, ConnectionState>,
    #[serde(default)]
    next: Option<ConnectionState>,
}

#[derive(Debug, Deserialize)]
struct ConnectionState {
    #[serde(default)]
    block: Option<Box<BlockState>>,
    #[serde(default)]
    shadow: Option<Box<BlockState>>,
}

impl ConnectionState {
    /// The connected block, falling back to the shadow block.
    fn target(&self) -> Option<&BlockState> {
        self.block.as_deref().or(self.shadow.as_deref())
    }
}

impl BlockGraph {
    /// Builds a graph from a Blockly workspace JSON document.
    ///
    /// Every chain link and nested input adds JSON nesting, so the
    /// document is parsed without a nesting limit.
    pub fn from_workspace_json(text: &str) -> Result<BlockGraph, CoreError> {
        let mut parser = serde_json::Deserializer::from_str(text);
        parser.disable_recursion_limit();
        let state = WorkspaceState::deserialize(serde_stacker::Deserializer::new(&mut parser))?;
        parser.end()?;
        let mut graph = BlockGraph::new();
        for block in state.blocks.iter().flat_map(|top| top.blocks.iter()) {
            insert_block(&mut graph, block)?;
        }
        Ok(graph)
    }
}

/// Remaining stack below which import moves to a fresh segment.
const RED_ZONE: usize = 64 * 1024;

/// Size of each stack segment allocated for deeply nested workspaces.
const STACK_SEGMENT: usize = 1024 * 1024;

fn insert_block(graph: &mut BlockGraph, state: &BlockState) -> Result<NodeId, CoreError> {
    stacker::maybe_grow(RED_ZONE, STACK_SEGMENT, || insert_nested(graph, state))
}

fn insert_nested(graph: &mut BlockGraph, state: &BlockState) -> Result<NodeId, CoreError> {
    let kind: BlockKind = state.tag.parse()?;
    let node = match &state.id {
        Some(id) => graph.add_block_with_id(kind, id.clone()),
        None => graph.add_block(kind),
    };

    for (name, value) in &state.fields {
        graph.set_field(node, name, value.clone())?;
    }

    for (slot, connection) in &state.inputs {
        if kind.spec().slot(slot).is_none() {
            return Err(CoreError::UnknownSlot {
                kind,
                slot: slot.clone(),
            });
        }
        if let Some(child) = connection.target() {
            let child = insert_block(graph, child)?;
            graph.connect(node, slot, child)?;
        }
    }

    if let Some(next) = state.next.as_ref().and_then(ConnectionState::target) {
        let next = insert_block(graph, next)?;
        graph.set_next(node, next)?;
    }

    Ok(node)
}
