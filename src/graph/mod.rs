//! Indexed view over the blocks of one analysis result.
//!
//! A [`BlockGraph`] is built once from every page a job returned and is
//! read-only afterwards. Blocks keep their arrival order; lookups go through
//! an id index. References to ids that are not in the graph are treated as
//! absent by every consumer.

pub mod forms;
pub mod text;

pub use forms::{extract_pair_list, extract_pairs, KeyValuePair, KeyValuePairs};
pub use text::{resolve_text, MAX_DEPTH};

use crate::model::{Block, BlockType, ResultPage};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Immutable id-indexed collection of blocks.
#[derive(Debug, Clone, Default)]
pub struct BlockGraph {
    blocks: Vec<Block>,
    index: HashMap<String, usize>,
    skipped: usize,
}

impl BlockGraph {
    /// Build a graph from result pages, concatenating their blocks in order.
    pub fn build<I>(pages: I) -> Self
    where
        I: IntoIterator<Item = ResultPage>,
    {
        Self::from_blocks(pages.into_iter().flat_map(|page| page.blocks))
    }

    /// Build a graph from blocks in arrival order.
    ///
    /// Blocks without an id are skipped with a warning. When an id repeats,
    /// both blocks are kept in order and lookups resolve to the first one.
    pub fn from_blocks<I>(blocks: I) -> Self
    where
        I: IntoIterator<Item = Block>,
    {
        let mut graph = Self::default();

        for block in blocks {
            let Some(id) = block.id.clone() else {
                log::warn!(
                    "Skipping {} block without an id",
                    block.block_type.as_str()
                );
                graph.skipped += 1;
                continue;
            };

            let position = graph.blocks.len();
            match graph.index.entry(id) {
                Entry::Occupied(entry) => {
                    log::debug!(
                        "Duplicate block id {}, keeping the first occurrence",
                        entry.key()
                    );
                }
                Entry::Vacant(entry) => {
                    entry.insert(position);
                }
            }
            graph.blocks.push(block);
        }

        graph
    }

    /// Look up a block by id.
    pub fn lookup(&self, id: &str) -> Option<&Block> {
        self.index.get(id).map(|&position| &self.blocks[position])
    }

    /// Check if an id resolves.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Iterate over all blocks in arrival order.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }

    /// Iterate over blocks of one type in arrival order.
    pub fn blocks_of_type<'a>(
        &'a self,
        block_type: &'a BlockType,
    ) -> impl Iterator<Item = &'a Block> + 'a {
        self.blocks.iter().filter(move |b| b.is_type(block_type))
    }

    /// Text of every LINE block in arrival order.
    pub fn line_texts(&self) -> Vec<String> {
        self.blocks
            .iter()
            .filter(|b| b.is_line())
            .filter_map(|b| b.text.clone())
            .collect()
    }

    /// Flattened text of a block's children.
    pub fn text_of(&self, block: &Block) -> String {
        resolve_text(self, block)
    }

    /// Number of blocks in the graph.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Check if the graph has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Number of blocks dropped while building.
    pub fn skipped_count(&self) -> usize {
        self.skipped
    }
}

impl FromIterator<Block> for BlockGraph {
    fn from_iter<I: IntoIterator<Item = Block>>(iter: I) -> Self {
        Self::from_blocks(iter)
    }
}
