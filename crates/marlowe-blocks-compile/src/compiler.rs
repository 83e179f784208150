//! Compile entry points.
//!
//! [`compile`] locates the root block, then hands its `CONTRACT` child to
//! the [`Translator`]. Compilation is a pure function of the snapshot: no
//! caching, no mutation, identical input gives identical output.

use marlowe_blocks_core::{BlockKind, BlockSource, NodeId};

use crate::document::Contract;
use crate::error::CompileError;
use crate::serialize::serialize;
use crate::translate::Translator;

/// Compiles the graph reachable from its `contract_root` block.
///
/// The root must be a top-level block. With several top-level roots the
/// one with the lowest node id wins and the others are ignored. Blocks not
/// reachable from the root never affect the result.
pub fn compile<S>(source: &S) -> Result<Contract, CompileError>
where
    S: BlockSource + ?Sized,
{
    let root = find_root(source)?;
    tracing::debug!(%root, "compiling contract");
    let contract = source
        .slot(root, "CONTRACT")
        .ok_or(CompileError::MissingInput {
            node: root,
            block_kind: BlockKind::Root,
            slot: "CONTRACT",
        })?;

    let document = Translator::new(source).contract(contract)?;
    tracing::debug!(%root, size = document.size(), "compiled contract");
    Ok(document)
}

/// Compiles and serializes in one step.
pub fn compile_to_string<S>(source: &S) -> Result<String, CompileError>
where
    S: BlockSource + ?Sized,
{
    compile(source).map(|document| serialize(&document))
}

fn find_root<S>(source: &S) -> Result<NodeId, CompileError>
where
    S: BlockSource + ?Sized,
{
    let mut roots: Vec<NodeId> = source
        .top_level()
        .into_iter()
        .filter(|&node| source.kind(node) == Some(BlockKind::Root))
        .collect();
    roots.sort();

    match roots.as_slice() {
        [] => Err(CompileError::MissingRoot),
        [only] => Ok(*only),
        [first, rest @ ..] => {
            tracing::warn!(
                root = %first,
                ignored = rest.len(),
                "several contract_root blocks; compiling the first"
            );
            Ok(*first)
        }
    }
}
