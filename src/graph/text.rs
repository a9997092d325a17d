//! Flattening a block's descendant text.

use super::BlockGraph;
use crate::model::{Block, RelationshipType};
use std::collections::HashSet;

/// Deepest CHILD chain followed below the starting block.
pub const MAX_DEPTH: usize = 16;

/// Resolve the text of a block from its CHILD relationships.
///
/// Children are visited in relationship order, then target order. A child
/// with text contributes that text followed by one space; a child without
/// text is descended into. Ids that do not resolve are skipped. The result
/// is trimmed, so a block without CHILD relationships yields `""`.
///
/// Descent is bounded by [`MAX_DEPTH`] and never re-enters a block already on
/// the walk, so malformed cyclic input terminates.
pub fn resolve_text(graph: &BlockGraph, block: &Block) -> String {
    let mut out = String::new();
    let mut visited = HashSet::new();
    if let Some(id) = block.id() {
        visited.insert(id);
    }

    collect(graph, block, 0, &mut visited, &mut out);

    out.trim().to_string()
}

fn collect<'a>(
    graph: &'a BlockGraph,
    block: &'a Block,
    depth: usize,
    visited: &mut HashSet<&'a str>,
    out: &mut String,
) {
    if depth >= MAX_DEPTH {
        log::warn!(
            "Stopping text resolution at depth {} below block {:?}",
            depth,
            block.id()
        );
        return;
    }

    for id in block.related_ids(RelationshipType::Child) {
        let Some(child) = graph.lookup(id) else {
            log::debug!("Skipping unresolved child id {}", id);
            continue;
        };

        if let Some(text) = child.text.as_deref() {
            out.push_str(text);
            out.push(' ');
        } else if visited.insert(id) {
            collect(graph, child, depth + 1, visited, out);
        }
    }
}
