//! Tail region: verbatim storage for unshared key suffixes.
//!
//! Once a key's path no longer branches, the remaining symbols are kept as
//! a single suffix block instead of one double-array cell per symbol.
//! Blocks are 1-based (a separate state stores the negated block index in
//! its `base`), and freed blocks are recycled through a free chain so live
//! block indices stay stable across mutations.

use std::io::{Read, Write};

use crate::error::{Result, TrieError};
use crate::serial;
use crate::{TrieChar, TrieIndex};
use crate::alpha::TRIE_CHAR_TERM;

#[derive(Debug, Clone)]
enum Slot {
    /// Recycled block; `next` chains to the following free block (0 = none).
    Free { next: TrieIndex },
    /// Live suffix, stored without the terminator.
    Used { suffix: Box<[TrieChar]> },
}

/// The tail block pool.
#[derive(Debug, Clone, Default)]
pub struct Tail {
    slots: Vec<Slot>,
    first_free: TrieIndex,
}

impl Tail {
    /// Creates an empty pool.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            first_free: 0,
        }
    }

    fn slot(&self, t: TrieIndex) -> Option<&Slot> {
        usize::try_from(t)
            .ok()
            .and_then(|i| i.checked_sub(1))
            .and_then(|i| self.slots.get(i))
    }

    /// Suffix stored in block `t`, empty for free or out-of-range blocks.
    #[must_use]
    pub fn suffix(&self, t: TrieIndex) -> &[TrieChar] {
        match self.slot(t) {
            Some(Slot::Used { suffix }) => suffix,
            _ => &[],
        }
    }

    /// Replaces the suffix of block `t`.
    pub fn set_suffix(&mut self, t: TrieIndex, suffix: Vec<TrieChar>) {
        if let Ok(i) = usize::try_from(t - 1) {
            if i < self.slots.len() {
                self.slots[i] = Slot::Used {
                    suffix: suffix.into_boxed_slice(),
                };
            }
        }
    }

    /// Stores a suffix in a recycled or fresh block and returns its index.
    pub fn alloc(&mut self, suffix: Vec<TrieChar>) -> TrieIndex {
        let slot = Slot::Used {
            suffix: suffix.into_boxed_slice(),
        };
        if self.first_free != 0 {
            let t = self.first_free;
            if let Some(Slot::Free { next }) = self.slot(t) {
                self.first_free = *next;
            }
            self.slots[(t - 1) as usize] = slot;
            t
        } else {
            self.slots.push(slot);
            self.slots.len() as TrieIndex
        }
    }

    /// Releases block `t` for reuse.
    pub fn free(&mut self, t: TrieIndex) {
        if let Ok(i) = usize::try_from(t - 1) {
            if i < self.slots.len() {
                self.slots[i] = Slot::Free {
                    next: self.first_free,
                };
                self.first_free = t;
            }
        }
    }

    /// `true` if `t` names a live block.
    #[must_use]
    pub fn is_used(&self, t: TrieIndex) -> bool {
        matches!(self.slot(t), Some(Slot::Used { .. }))
    }

    /// Matches one symbol of block `t` at `*offset`, advancing on success.
    ///
    /// The terminator matches exactly at end-of-suffix and does not advance.
    pub fn walk_char(&self, t: TrieIndex, offset: &mut usize, c: TrieChar) -> bool {
        let suffix = self.suffix(t);
        let cur = suffix.get(*offset).copied().unwrap_or(TRIE_CHAR_TERM);
        if cur != c {
            return false;
        }
        if c != TRIE_CHAR_TERM {
            *offset += 1;
        }
        true
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    pub(crate) fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        serial::write_u32(w, self.slots.len() as u32)?;
        for slot in &self.slots {
            match slot {
                Slot::Free { next } => {
                    serial::write_u8(w, 0)?;
                    serial::write_i32(w, *next)?;
                }
                Slot::Used { suffix } => {
                    serial::write_u8(w, 1)?;
                    serial::write_u32(w, suffix.len() as u32)?;
                    w.write_all(suffix)?;
                }
            }
        }
        serial::write_i32(w, self.first_free)?;
        Ok(())
    }

    pub(crate) fn read_from<R: Read>(r: &mut R) -> Result<Self> {
        let count = serial::read_u32(r)? as usize;
        let mut slots = Vec::with_capacity(count.min(serial::PREALLOC_LIMIT));
        for _ in 0..count {
            match serial::read_u8(r)? {
                0 => {
                    let next = serial::read_i32(r)?;
                    slots.push(Slot::Free { next });
                }
                1 => {
                    // Read through `take` so a crafted length fails at EOF
                    // instead of committing the full allocation up front.
                    let len = u64::from(serial::read_u32(r)?);
                    let mut suffix = Vec::new();
                    r.by_ref().take(len).read_to_end(&mut suffix)?;
                    if suffix.len() as u64 != len {
                        return Err(TrieError::CorruptFormat("truncated tail suffix"));
                    }
                    slots.push(Slot::Used {
                        suffix: suffix.into_boxed_slice(),
                    });
                }
                _ => return Err(TrieError::CorruptFormat("unknown tail slot tag")),
            }
        }
        let first_free = serial::read_i32(r)?;
        Ok(Self { slots, first_free })
    }

    /// Validates the free chain and suffix contents against the alphabet.
    pub(crate) fn validate(&self, symbol_count: u32) -> Result<()> {
        for slot in &self.slots {
            if let Slot::Used { suffix } = slot {
                if suffix
                    .iter()
                    .any(|&c| c == TRIE_CHAR_TERM || u32::from(c) > symbol_count)
                {
                    return Err(TrieError::CorruptFormat("tail symbol outside alphabet"));
                }
            }
        }
        let mut f = self.first_free;
        let mut hops = 0_usize;
        while f != 0 {
            match self.slot(f) {
                Some(Slot::Free { next }) => f = *next,
                _ => return Err(TrieError::CorruptFormat("tail free chain names a live block")),
            }
            hops += 1;
            if hops > self.slots.len() {
                return Err(TrieError::CorruptFormat("tail free chain cycles"));
            }
        }
        Ok(())
    }
}
