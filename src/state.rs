//! Walkable cursor over a trie.
//!
//! A cursor is a detached value: it holds a state index and a generation
//! stamp rather than borrowing the trie, so callers may keep any number of
//! them while reading. Every accessor revalidates the stamp against the
//! owning trie; a cursor that outlives a structural mutation fails with
//! [`TrieError::InvalidCursor`] instead of walking freed cells.

use crate::alpha::TRIE_CHAR_TERM;
use crate::darray::ROOT;
use crate::error::{Result, TrieError};
use crate::trie::Trie;
use crate::{TrieChar, TrieData, TrieIndex};

/// A walk position inside a [`Trie`].
///
/// The position is either a double-array state or, once the walk passes a
/// separate state, an offset into a tail suffix. Cloning yields an
/// independent cursor; walks on one never affect the other.
#[derive(Debug, Clone)]
pub struct TrieState {
    /// Double-array state, or tail block index when `in_tail`.
    index: TrieIndex,
    /// Consumed prefix of the tail suffix.
    offset: usize,
    in_tail: bool,
    generation: u64,
}

impl TrieState {
    pub(crate) const fn at_root(generation: u64) -> Self {
        Self {
            index: ROOT,
            offset: 0,
            in_tail: false,
            generation,
        }
    }

    pub(crate) fn ensure_valid(&self, trie: &Trie) -> Result<()> {
        if trie.generation == self.generation {
            Ok(())
        } else {
            Err(TrieError::InvalidCursor)
        }
    }

    // -----------------------------------------------------------------------
    // Walking
    // -----------------------------------------------------------------------

    /// Attempts to follow the transition on `symbol`.
    ///
    /// On success the cursor advances and `true` is returned; on a missing
    /// transition (or a symbol outside the alphabet) the cursor is left
    /// unchanged and `false` is returned.
    ///
    /// # Errors
    ///
    /// Returns [`TrieError::InvalidCursor`] if the trie was mutated after
    /// this cursor was created.
    pub fn walk(&mut self, trie: &Trie, symbol: char) -> Result<bool> {
        self.ensure_valid(trie)?;
        let Ok(c) = trie.alpha.index_of(symbol) else {
            return Ok(false);
        };
        Ok(self.walk_raw(trie, c))
    }

    /// Resets the cursor to the root, revalidating it against the trie's
    /// current generation.
    pub fn rewind(&mut self, trie: &Trie) {
        *self = Self::at_root(trie.generation);
    }

    /// `true` iff [`walk`](Self::walk) on `symbol` would succeed.
    ///
    /// # Errors
    ///
    /// Returns [`TrieError::InvalidCursor`] for a stale cursor.
    pub fn is_walkable(&self, trie: &Trie, symbol: char) -> Result<bool> {
        self.ensure_valid(trie)?;
        let Ok(c) = trie.alpha.index_of(symbol) else {
            return Ok(false);
        };
        Ok(self.peek(trie, c))
    }

    /// Every symbol walkable from here, in ascending dense-index order.
    ///
    /// # Errors
    ///
    /// Returns [`TrieError::InvalidCursor`] for a stale cursor.
    pub fn walkable_symbols(&self, trie: &Trie) -> Result<Vec<char>> {
        self.ensure_valid(trie)?;
        Ok(self
            .walkable_indices(trie)
            .into_iter()
            .filter_map(|c| trie.alpha.symbol_of(c))
            .collect())
    }

    // -----------------------------------------------------------------------
    // Position queries
    // -----------------------------------------------------------------------

    /// `true` iff a key ends exactly at this position.
    ///
    /// # Errors
    ///
    /// Returns [`TrieError::InvalidCursor`] for a stale cursor.
    pub fn is_terminal(&self, trie: &Trie) -> Result<bool> {
        self.ensure_valid(trie)?;
        Ok(self.peek(trie, TRIE_CHAR_TERM))
    }

    /// `true` iff the position lies inside a tail suffix, where exactly one
    /// path continues.
    ///
    /// # Errors
    ///
    /// Returns [`TrieError::InvalidCursor`] for a stale cursor.
    pub fn is_single(&self, trie: &Trie) -> Result<bool> {
        self.ensure_valid(trie)?;
        Ok(self.in_tail)
    }

    /// `true` iff the position is a leaf: inside a tail suffix with a key
    /// ending here.
    ///
    /// # Errors
    ///
    /// Returns [`TrieError::InvalidCursor`] for a stale cursor.
    pub fn is_leaf(&self, trie: &Trie) -> Result<bool> {
        self.ensure_valid(trie)?;
        Ok(self.in_tail && self.peek(trie, TRIE_CHAR_TERM))
    }

    /// Payload of the key ending here, or `None` if this is not a terminal.
    ///
    /// # Errors
    ///
    /// Returns [`TrieError::InvalidCursor`] for a stale cursor.
    pub fn value(&self, trie: &Trie) -> Result<Option<TrieData>> {
        self.ensure_valid(trie)?;
        Ok(self.value_raw(trie))
    }

    // -----------------------------------------------------------------------
    // Generation-free internals, shared with the enumerator
    // -----------------------------------------------------------------------

    pub(crate) fn walk_raw(&mut self, trie: &Trie, c: TrieChar) -> bool {
        if self.in_tail {
            return trie.tail.walk_char(self.index, &mut self.offset, c);
        }
        let Some(t) = trie.da.transition(self.index, c) else {
            return false;
        };
        if trie.da.is_separate(t) {
            self.index = trie.da.tail_index(t);
            self.offset = 0;
            self.in_tail = true;
        } else {
            self.index = t;
        }
        true
    }

    fn peek(&self, trie: &Trie, c: TrieChar) -> bool {
        if self.in_tail {
            let suffix = trie.tail.suffix(self.index);
            suffix.get(self.offset).copied().unwrap_or(TRIE_CHAR_TERM) == c
        } else {
            trie.da.transition(self.index, c).is_some()
        }
    }

    pub(crate) fn walkable_indices(&self, trie: &Trie) -> Vec<TrieChar> {
        if self.in_tail {
            trie.tail
                .suffix(self.index)
                .get(self.offset)
                .map_or_else(Vec::new, |&c| vec![c])
        } else {
            trie.da
                .output_symbols(self.index)
                .into_iter()
                .filter(|&c| c != TRIE_CHAR_TERM)
                .collect()
        }
    }

    pub(crate) fn value_raw(&self, trie: &Trie) -> Option<TrieData> {
        if self.in_tail {
            if self.offset == trie.tail.suffix(self.index).len() {
                trie.values.get(self.index)
            } else {
                None
            }
        } else {
            let t = trie.da.transition(self.index, TRIE_CHAR_TERM)?;
            trie.values.get(trie.da.tail_index(t))
        }
    }
}
