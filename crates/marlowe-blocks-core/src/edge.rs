//! Edge types of the block graph.
//!
//! A block reaches its children through named [`BlockEdge::Slot`] edges and
//! its chain successor through a single [`BlockEdge::Next`] edge. Parents are
//! never stored on the child; they are only recoverable as incoming edges.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockEdge {
    /// Child plugged into the named input of the source block.
    Slot { name: String },
    /// Following element of an ordered chain (cases, bounds).
    Next,
}

impl BlockEdge {
    pub fn is_slot(&self, slot: &str) -> bool {
        matches!(self, BlockEdge::Slot { name } if name == slot)
    }

    pub fn is_next(&self) -> bool {
        matches!(self, BlockEdge::Next)
    }
}
