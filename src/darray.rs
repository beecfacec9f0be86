//! Double-array transition structure.
//!
//! States are cells in two parallel arrays. For a branch state `s`,
//! `base[s] + c` names the target of the transition on dense symbol `c`,
//! and the target's `check` records `s` so colliding candidates can be
//! told apart. A negative `base` marks a *separate* state: the rest of the
//! key lives verbatim in the tail region at block `-base[s]`.
//!
//! Cell 0 is reserved and anchors the free list (its `check` holds the
//! negated index of the first free cell); the root is cell 1. Free cells
//! chain through negated `check` values in ascending index order, which
//! makes free-base search deterministic.

use std::io::{Read, Write};

use crate::error::{Result, TrieError};
use crate::serial;
use crate::{TrieChar, TrieIndex};

/// Root state index.
pub const ROOT: TrieIndex = 1;

/// Smallest index a transition target may occupy (0 and 1 are reserved).
const FIRST_USABLE: TrieIndex = 2;

/// Initial physical size of the cell pool.
const INITIAL_CELLS: usize = 8;

#[derive(Debug, Clone, Copy)]
struct Cell {
    base: TrieIndex,
    check: TrieIndex,
}

/// The base/check cell pool.
#[derive(Debug, Clone)]
pub struct DArray {
    cells: Vec<Cell>,
}

impl DArray {
    /// Creates a pool holding only the reserved cell and an empty root.
    #[must_use]
    pub fn new() -> Self {
        let mut da = Self {
            cells: vec![Cell { base: 0, check: 0 }; 2],
        };
        // Root is occupied from the start; its self-parent check keeps it
        // off the free list without naming a real parent.
        da.cells[ROOT as usize] = Cell { base: 0, check: ROOT };
        da.extend_pool(INITIAL_CELLS);
        da
    }

    /// Number of cells in the pool.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    fn cell(&self, s: TrieIndex) -> Option<Cell> {
        usize::try_from(s).ok().and_then(|i| self.cells.get(i)).copied()
    }

    /// `base` of an existing state, 0 for out-of-range indices.
    #[must_use]
    pub fn base(&self, s: TrieIndex) -> TrieIndex {
        self.cell(s).map_or(0, |c| c.base)
    }

    /// `check` of an existing cell, 0 for out-of-range indices.
    #[must_use]
    pub fn check(&self, s: TrieIndex) -> TrieIndex {
        self.cell(s).map_or(0, |c| c.check)
    }

    fn set_base(&mut self, s: TrieIndex, base: TrieIndex) {
        self.cells[s as usize].base = base;
    }

    fn set_check(&mut self, s: TrieIndex, check: TrieIndex) {
        self.cells[s as usize].check = check;
    }

    /// `true` if `s` is a separate state (its `base` points into the tail).
    #[must_use]
    pub fn is_separate(&self, s: TrieIndex) -> bool {
        self.base(s) < 0
    }

    /// Tail block referenced by the separate state `s`.
    #[must_use]
    pub fn tail_index(&self, s: TrieIndex) -> TrieIndex {
        -self.base(s)
    }

    /// Turns `s` into a separate state referencing tail block `t`.
    pub fn set_tail_index(&mut self, s: TrieIndex, t: TrieIndex) {
        self.set_base(s, -t);
    }

    /// Clears the tail reference of `s`, leaving it childless.
    pub fn clear_tail_index(&mut self, s: TrieIndex) {
        self.set_base(s, 0);
    }

    fn is_vacant(&self, s: TrieIndex) -> bool {
        s >= FIRST_USABLE && self.cell(s).is_none_or(|c| c.check <= 0)
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// Follows the transition from `s` on dense symbol `c`.
    #[must_use]
    pub fn transition(&self, s: TrieIndex, c: TrieChar) -> Option<TrieIndex> {
        let base = self.base(s);
        if base <= 0 {
            return None;
        }
        let t = base.checked_add(TrieIndex::from(c))?;
        (self.check(t) == s).then_some(t)
    }

    /// Dense symbols with outgoing transitions from `s`, ascending.
    #[must_use]
    pub fn output_symbols(&self, s: TrieIndex) -> Vec<TrieChar> {
        let base = self.base(s);
        if base <= 0 {
            return Vec::new();
        }
        (TrieChar::MIN..=TrieChar::MAX)
            .filter(|&c| self.transition(s, c).is_some())
            .collect()
    }

    fn out_degree(&self, s: TrieIndex) -> usize {
        self.output_symbols(s).len()
    }

    // -----------------------------------------------------------------------
    // Insertion
    // -----------------------------------------------------------------------

    /// Ensures a transition from `s` on `c` exists, resolving collisions by
    /// relocating whichever conflicting state has fewer children (ties move
    /// `s`, the state currently being extended). Returns the target.
    ///
    /// Any prior tail reference of `s` is overwritten: callers converting a
    /// separate state must save its tail index first.
    ///
    /// # Errors
    ///
    /// Returns [`TrieError::Allocation`] if the index space is exhausted.
    pub fn insert_branch(&mut self, s: TrieIndex, c: TrieChar) -> Result<TrieIndex> {
        let base = self.base(s);
        if base > 0 {
            let t = base
                .checked_add(TrieIndex::from(c))
                .ok_or(TrieError::Allocation)?;
            if self.check(t) == s {
                return Ok(t);
            }
            if self.is_vacant(t) {
                self.occupy(t, s)?;
                return Ok(t);
            }
            self.resolve_collision(s, c)
        } else {
            // First child of this state: pick a fresh base for {c}.
            let new_base = self.find_free_base(&[c])?;
            self.set_base(s, new_base);
            let t = new_base + TrieIndex::from(c);
            self.occupy(t, s)?;
            Ok(t)
        }
    }

    /// The candidate slot for `s` on `c` is held by another state's child:
    /// move the cheaper of the two transition sets out of the way.
    fn resolve_collision(&mut self, s: TrieIndex, c: TrieChar) -> Result<TrieIndex> {
        let t = self.base(s) + TrieIndex::from(c);
        let other = self.check(t);

        let mut symbols = self.output_symbols(s);
        let at = symbols.partition_point(|&x| x < c);
        symbols.insert(at, c);

        let other_symbols = self.output_symbols(other);
        // Compare pre-insertion out-degrees: `symbols` already counts the
        // pending symbol, so `other` moves only when strictly smaller.
        if other != s && other_symbols.len() + 1 < symbols.len() {
            // The slot owner is smaller: rebase it and reuse the freed slot.
            // Relocation moves cells, so track `s` if it is a child of
            // `other`.
            let old_other_base = self.base(other);
            let s_offset = (self.check(s) == other).then(|| s - old_other_base);
            let new_other_base = self.find_free_base(&other_symbols)?;
            self.relocate(other, new_other_base)?;
            let s = s_offset.map_or(s, |off| new_other_base + off);
            let t = self.base(s) + TrieIndex::from(c);
            self.occupy(t, s)?;
            Ok(t)
        } else {
            let new_base = self.find_free_base(&symbols)?;
            self.relocate(s, new_base)?;
            let t = new_base + TrieIndex::from(c);
            self.occupy(t, s)?;
            Ok(t)
        }
    }

    /// Moves every child of `s` from its current base to `new_base`,
    /// re-parenting grandchildren and freeing the vacated cells.
    fn relocate(&mut self, s: TrieIndex, new_base: TrieIndex) -> Result<()> {
        let old_base = self.base(s);
        for c in self.output_symbols(s) {
            let old = old_base + TrieIndex::from(c);
            let new = new_base + TrieIndex::from(c);
            self.occupy(new, s)?;
            self.set_base(new, self.base(old));
            let child_base = self.base(old);
            if child_base > 0 {
                for d in TrieChar::MIN..=TrieChar::MAX {
                    if let Some(gc) = child_base.checked_add(TrieIndex::from(d)) {
                        if self.check(gc) == old {
                            self.set_check(gc, new);
                        }
                    }
                }
            }
            self.free_cell(old);
        }
        self.set_base(s, new_base);
        Ok(())
    }

    /// Finds a base such that every slot `base + c` for `c` in `symbols`
    /// is vacant. Prefers tracked free cells over extending the pool.
    fn find_free_base(&mut self, symbols: &[TrieChar]) -> Result<TrieIndex> {
        debug_assert!(!symbols.is_empty());
        let first = TrieIndex::from(symbols[0]);
        let last = TrieIndex::from(symbols[symbols.len() - 1]);

        let mut f = -self.check(0);
        while f != 0 {
            let base = f - first;
            if base >= FIRST_USABLE
                && base.checked_add(last).is_some()
                && symbols
                    .iter()
                    .all(|&c| self.is_vacant(base + TrieIndex::from(c)))
            {
                return Ok(base);
            }
            f = -self.check(f);
        }

        // No tracked free cell fits: place the block past the pool end.
        let end = TrieIndex::try_from(self.cells.len()).map_err(|_| TrieError::Allocation)?;
        let base = (end - first).max(FIRST_USABLE);
        base.checked_add(last).ok_or(TrieError::Allocation)?;
        Ok(base)
    }

    // -----------------------------------------------------------------------
    // Deletion
    // -----------------------------------------------------------------------

    /// Frees `s` and every ancestor that has lost its last child, stopping
    /// at the root or at the first state that still leads somewhere.
    pub fn prune(&mut self, mut s: TrieIndex) {
        while s != ROOT && !self.is_separate(s) && self.out_degree(s) == 0 {
            let parent = self.check(s);
            self.free_cell(s);
            s = parent;
        }
    }

    // -----------------------------------------------------------------------
    // Cell pool
    // -----------------------------------------------------------------------

    /// Claims the vacant cell `t` for parent `s`, growing the pool if `t`
    /// lies past its end.
    fn occupy(&mut self, t: TrieIndex, s: TrieIndex) -> Result<()> {
        let ti = usize::try_from(t).map_err(|_| TrieError::Allocation)?;
        if ti >= self.cells.len() {
            let doubled = self.cells.len().saturating_mul(2);
            self.extend_pool(doubled.max(ti + 1));
        }
        // Unlink from the ascending free chain.
        let mut prev = 0;
        loop {
            let next = -self.check(prev);
            if next == t {
                self.cells[prev as usize].check = self.cells[ti].check;
                break;
            }
            if next == 0 || next > t {
                debug_assert!(false, "occupying a cell not on the free list");
                break;
            }
            prev = next;
        }
        self.cells[ti] = Cell { base: 0, check: s };
        Ok(())
    }

    /// Returns a cell to the free chain, keeping it sorted by index.
    fn free_cell(&mut self, t: TrieIndex) {
        let mut prev = 0;
        loop {
            let next = -self.check(prev);
            if next == 0 || next > t {
                self.cells[t as usize] = Cell {
                    base: 0,
                    check: -next,
                };
                self.cells[prev as usize].check = -t;
                return;
            }
            prev = next;
        }
    }

    /// Grows the pool to `new_len`, chaining the fresh cells onto the end
    /// of the free list.
    fn extend_pool(&mut self, new_len: usize) {
        let old_len = self.cells.len();
        if new_len <= old_len {
            return;
        }
        self.cells.resize(new_len, Cell { base: 0, check: 0 });
        for i in old_len..new_len - 1 {
            self.cells[i].check = -TrieIndex::try_from(i + 1).unwrap_or(0);
        }
        // Fresh cells are the highest indices, so they append to the chain.
        let mut prev = 0;
        while -self.check(prev) != 0 {
            prev = -self.check(prev);
        }
        self.cells[prev as usize].check = -TrieIndex::try_from(old_len).unwrap_or(0);
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    pub(crate) fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        serial::write_u32(w, self.cells.len() as u32)?;
        for cell in &self.cells {
            serial::write_i32(w, cell.base)?;
            serial::write_i32(w, cell.check)?;
        }
        Ok(())
    }

    pub(crate) fn read_from<R: Read>(r: &mut R) -> Result<Self> {
        let count = serial::read_u32(r)? as usize;
        if count < FIRST_USABLE as usize {
            return Err(TrieError::CorruptFormat("cell pool too small"));
        }
        let mut cells = Vec::with_capacity(count.min(serial::PREALLOC_LIMIT));
        for _ in 0..count {
            let base = serial::read_i32(r)?;
            let check = serial::read_i32(r)?;
            cells.push(Cell { base, check });
        }
        Ok(Self { cells })
    }

    /// Structural validation of a freshly loaded pool against the alphabet
    /// size. Every occupied cell must be a plausible transition target and
    /// the free chain must be well formed.
    pub(crate) fn validate(&self, symbol_count: u32) -> Result<()> {
        let len = TrieIndex::try_from(self.cells.len())
            .map_err(|_| TrieError::CorruptFormat("cell pool too large"))?;
        if self.check(ROOT) != ROOT || self.base(ROOT) < 0 {
            return Err(TrieError::CorruptFormat("malformed root cell"));
        }
        for i in FIRST_USABLE..len {
            let parent = self.check(i);
            if parent <= 0 {
                continue;
            }
            if parent >= len || (parent != ROOT && self.check(parent) <= 0) {
                return Err(TrieError::CorruptFormat("check references a dead state"));
            }
            let base = self.base(parent);
            if base <= 0 || i - base < 0 || i - base > TrieIndex::from(symbol_count as u8) {
                return Err(TrieError::CorruptFormat("cell is not a transition target"));
            }
            // Every transition edge records its source in `check`, so a
            // cycle among states is a cycle in the parent chain. Walking
            // to the root within the pool size rules both out.
            let mut up = i;
            let mut hops: TrieIndex = 0;
            while up != ROOT {
                up = self.check(up);
                hops += 1;
                if hops > len {
                    return Err(TrieError::CorruptFormat("parent chain does not reach the root"));
                }
            }
        }
        // Free chain: ascending, in range, every hop vacant.
        let mut prev = 0;
        let mut f = -self.check(0);
        while f != 0 {
            if f <= prev || f >= len || self.check(f) > 0 {
                return Err(TrieError::CorruptFormat("malformed free chain"));
            }
            prev = f;
            f = -self.check(f);
        }
        Ok(())
    }

    /// Separate states in the pool, for cross-checking tail references.
    pub(crate) fn separate_states(&self) -> impl Iterator<Item = TrieIndex> + '_ {
        (ROOT..self.cells.len() as TrieIndex)
            .filter(|&s| self.check(s) > 0 && self.is_separate(s))
    }
}

impl Default for DArray {
    fn default() -> Self {
        Self::new()
    }
}
