//! Property tests for the block graph builder.

use std::collections::HashMap;

use proptest::prelude::*;

use marlowe_blocks_core::{BlockGraph, BlockKind, BlockSource, NodeId, ObservationKind};

proptest! {
    /// Chains are walked in link order whatever the order the blocks were
    /// created in, and only the head of a chain is top-level.
    #[test]
    fn chain_walk_follows_links(order in Just((0..8usize).collect::<Vec<_>>()).prop_shuffle()) {
        let mut graph = BlockGraph::new();
        let blocks: Vec<NodeId> = (0..order.len())
            .map(|_| graph.add_block(BlockKind::Case))
            .collect();
        let linked: Vec<NodeId> = order.iter().map(|&i| blocks[i]).collect();
        graph.chain(&linked).unwrap();

        let mut walked = vec![linked[0]];
        while let Some(next) = graph.next(*walked.last().unwrap()) {
            walked.push(next);
        }
        prop_assert_eq!(&walked, &linked);
        prop_assert_eq!(graph.top_level(), vec![linked[0]]);
    }

    /// A slot holds at most one child: the last one connected.
    #[test]
    fn connect_replaces_slot_child(pairs in prop::collection::vec((0..6usize, 0..6usize), 1..24)) {
        let mut graph = BlockGraph::new();
        let blocks: Vec<NodeId> = (0..6)
            .map(|_| graph.add_block(BlockKind::Observation(ObservationKind::Not)))
            .collect();

        let mut expected = HashMap::new();
        for &(parent, child) in &pairs {
            graph.connect(blocks[parent], "OBS", blocks[child]).unwrap();
            expected.insert(parent, child);
        }

        for (parent, &node) in blocks.iter().enumerate() {
            prop_assert_eq!(
                graph.slot_target(node, "OBS"),
                expected.get(&parent).map(|&child| blocks[child])
            );
        }
        prop_assert_eq!(graph.edge_count(), expected.len());
    }
}
