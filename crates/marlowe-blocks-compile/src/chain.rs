//! Resolution of ordered block chains (the cases of a `When`, the bounds of
//! a choice).

use std::collections::HashSet;

use marlowe_blocks_core::{BlockSource, NodeId};

use crate::error::CompileError;

/// Follows `next` links from `start` and returns the chain in link order.
///
/// An absent `start` yields an empty chain. Revisiting a node fails with
/// [`CompileError::CyclicChain`] naming the revisited node. Kinds are not
/// checked here; the translator of the chain's category does that per
/// element.
pub fn collect_chain<S>(source: &S, start: Option<NodeId>) -> Result<Vec<NodeId>, CompileError>
where
    S: BlockSource + ?Sized,
{
    let mut chain = Vec::new();
    let mut seen = HashSet::new();
    let mut current = start;
    while let Some(node) = current {
        if !seen.insert(node) {
            return Err(CompileError::CyclicChain { at_node: node });
        }
        chain.push(node);
        current = source.next(node);
    }
    Ok(chain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use marlowe_blocks_core::{BlockGraph, BlockKind};

    #[test]
    fn absent_start_is_empty() {
        let graph = BlockGraph::new();
        assert_eq!(collect_chain(&graph, None).unwrap(), Vec::<NodeId>::new());
    }

    #[test]
    fn single_element() {
        let mut graph = BlockGraph::new();
        let only = graph.add_block(BlockKind::Bound);
        assert_eq!(collect_chain(&graph, Some(only)).unwrap(), vec![only]);
    }

    #[test]
    fn preserves_link_order_not_id_order() {
        let mut graph = BlockGraph::new();
        let a = graph.add_block(BlockKind::Case);
        let b = graph.add_block(BlockKind::Case);
        let c = graph.add_block(BlockKind::Case);
        graph.chain(&[c, a, b]).unwrap();

        assert_eq!(collect_chain(&graph, Some(c)).unwrap(), vec![c, a, b]);
        assert_eq!(collect_chain(&graph, Some(a)).unwrap(), vec![a, b]);
    }

    #[test]
    fn cycle_back_to_earlier_element() {
        let mut graph = BlockGraph::new();
        let first = graph.add_block(BlockKind::Bound);
        let second = graph.add_block(BlockKind::Bound);
        let third = graph.add_block(BlockKind::Bound);
        graph.chain(&[first, second, third]).unwrap();
        graph.set_next(third, second).unwrap();

        assert_eq!(
            collect_chain(&graph, Some(first)),
            Err(CompileError::CyclicChain { at_node: second })
        );
    }

    #[test]
    fn self_loop() {
        let mut graph = BlockGraph::new();
        let node = graph.add_block(BlockKind::Bound);
        graph.set_next(node, node).unwrap();

        assert_eq!(
            collect_chain(&graph, Some(node)),
            Err(CompileError::CyclicChain { at_node: node })
        );
    }
}
