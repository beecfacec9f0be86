//! Lazy depth-first enumeration of stored keys.

use crate::state::TrieState;
use crate::trie::Trie;
use crate::TrieData;

/// Iterator over `(key, value)` pairs reachable from a start position.
///
/// Traversal is depth-first in ascending dense-symbol order; each branch
/// walks an independently cloned cursor, so sibling branches never disturb
/// each other. The iterator borrows the trie, which statically rules out
/// mutation while an enumeration is in flight; a fresh enumeration needs a
/// fresh call to [`Trie::iter`] or [`Trie::iter_from`].
pub struct TrieIter<'a> {
    trie: &'a Trie,
    stack: Vec<(TrieState, String)>,
}

impl<'a> TrieIter<'a> {
    pub(crate) fn new(trie: &'a Trie, start: TrieState) -> Self {
        Self {
            trie,
            stack: vec![(start, String::new())],
        }
    }
}

impl Iterator for TrieIter<'_> {
    type Item = (String, TrieData);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((state, key)) = self.stack.pop() {
            // Push children in reverse so the smallest symbol pops first.
            let symbols = state.walkable_indices(self.trie);
            for &c in symbols.iter().rev() {
                let Some(symbol) = self.trie.alpha.symbol_of(c) else {
                    continue;
                };
                let mut child = state.clone();
                if !child.walk_raw(self.trie, c) {
                    continue;
                }
                let mut child_key = key.clone();
                child_key.push(symbol);
                self.stack.push((child, child_key));
            }
            if let Some(value) = state.value_raw(self.trie) {
                return Some((key, value));
            }
        }
        None
    }
}

impl std::iter::FusedIterator for TrieIter<'_> {}
