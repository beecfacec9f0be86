//! The trie facade tying the double array, tail and value store together.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::alpha::{AlphaMap, TRIE_CHAR_TERM};
use crate::darray::{DArray, ROOT};
use crate::error::{Result, TrieError};
use crate::iter::TrieIter;
use crate::serial;
use crate::state::TrieState;
use crate::tail::Tail;
use crate::values::ValueStore;
use crate::{TrieChar, TrieData, TrieIndex};

/// File magic, `b"DATR"` on disk.
const MAGIC: u32 = 0x5254_4144;

/// Current format version.
const VERSION: u16 = 1;

/// A character-keyed associative index over a declared alphabet.
///
/// Keys are `&str` sequences of symbols from the alphabet declared at
/// construction time; payloads are [`TrieData`] integers. Lookup walks one
/// double-array transition per symbol; unshared suffixes are stored
/// verbatim in the tail region.
///
/// Structural mutation requires `&mut self`, so a single writer at a time
/// is enforced by the borrow checker. Detached [`TrieState`] cursors carry
/// a generation stamp instead of a borrow; a cursor used after any
/// mutation fails with [`TrieError::InvalidCursor`].
#[derive(Debug, Clone)]
pub struct Trie {
    pub(crate) alpha: AlphaMap,
    pub(crate) da: DArray,
    pub(crate) tail: Tail,
    pub(crate) values: ValueStore,
    pub(crate) generation: u64,
    dirty: bool,
}

impl Trie {
    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    /// Creates an empty trie over the given alphabet.
    #[must_use]
    pub fn new(alpha: AlphaMap) -> Self {
        Self {
            alpha,
            da: DArray::new(),
            tail: Tail::new(),
            values: ValueStore::new(),
            generation: 0,
            dirty: false,
        }
    }

    /// Creates an empty trie over the given inclusive symbol ranges.
    ///
    /// # Errors
    ///
    /// Returns [`TrieError::InvalidRange`] on inverted or overlapping
    /// ranges.
    pub fn from_ranges(ranges: &[(char, char)]) -> Result<Self> {
        let mut alpha = AlphaMap::new();
        for &(lower, upper) in ranges {
            alpha.add_range(lower, upper)?;
        }
        Ok(Self::new(alpha))
    }

    /// The alphabet this trie was built over.
    #[must_use]
    pub fn alpha_map(&self) -> &AlphaMap {
        &self.alpha
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// `true` if no keys are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Inserts `key` with `data`, overwriting any existing payload.
    ///
    /// # Errors
    ///
    /// Returns [`TrieError::UnmappedSymbol`] if `key` contains a symbol
    /// outside the alphabet, [`TrieError::Allocation`] if the index space
    /// is exhausted.
    pub fn store(&mut self, key: &str, data: TrieData) -> Result<bool> {
        self.store_impl(key, data, true)
    }

    /// Inserts `key` with `data` unless already present.
    ///
    /// Returns `false` and leaves the trie untouched (including the dirty
    /// flag) when `key` is already stored.
    ///
    /// # Errors
    ///
    /// Same as [`store`](Self::store).
    pub fn store_if_absent(&mut self, key: &str, data: TrieData) -> Result<bool> {
        self.store_impl(key, data, false)
    }

    fn store_impl(&mut self, key: &str, data: TrieData, overwrite: bool) -> Result<bool> {
        let codes = self.alpha.encode(key)?;

        // Walk the branch structure until a separate state or a dead end.
        let mut s = ROOT;
        let mut i = 0_usize;
        loop {
            if self.da.is_separate(s) {
                break;
            }
            let c = codes.get(i).copied().unwrap_or(TRIE_CHAR_TERM);
            let Some(t) = self.da.transition(s, c) else {
                return self.branch_in_branch(s, &codes[i..], data);
            };
            s = t;
            if c == TRIE_CHAR_TERM {
                break;
            }
            i += 1;
        }

        // Walk the remainder inside the tail suffix.
        let t = self.da.tail_index(s);
        let sep = i;
        let mut offset = 0_usize;
        loop {
            let c = codes.get(i).copied().unwrap_or(TRIE_CHAR_TERM);
            if !self.tail.walk_char(t, &mut offset, c) {
                return self.branch_in_tail(s, &codes[sep..], data);
            }
            if c == TRIE_CHAR_TERM {
                break;
            }
            i += 1;
        }

        // Key already present.
        if !overwrite {
            return Ok(false);
        }
        self.values.set(t, data);
        self.touch();
        Ok(true)
    }

    /// Attaches a new key at branch state `s`: the first unmatched symbol
    /// becomes a double-array transition, the remainder a tail suffix.
    fn branch_in_branch(&mut self, s: TrieIndex, suffix: &[TrieChar], data: TrieData) -> Result<bool> {
        let c = suffix.first().copied().unwrap_or(TRIE_CHAR_TERM);
        let new_da = self.da.insert_branch(s, c)?;
        let rest = if suffix.is_empty() {
            Vec::new()
        } else {
            suffix[1..].to_vec()
        };
        let new_tail = self.tail.alloc(rest);
        self.da.set_tail_index(new_da, new_tail);
        self.values.set(new_tail, data);
        self.touch();
        Ok(true)
    }

    /// Splits the tail entry of separate state `sep` where the new key
    /// diverges: the shared prefix is re-expanded into double-array states,
    /// the old suffix remainder is re-attached, and the new branch is
    /// inserted at the divergence point.
    ///
    /// `new_suffix` is the unconsumed part of the new key from the point
    /// the walk entered the tail.
    fn branch_in_tail(&mut self, sep: TrieIndex, new_suffix: &[TrieChar], data: TrieData) -> Result<bool> {
        let old_tail = self.da.tail_index(sep);
        let old_suffix = self.tail.suffix(old_tail).to_vec();

        let mut s = sep;
        let mut j = 0_usize;
        while j < old_suffix.len() && new_suffix.get(j) == Some(&old_suffix[j]) {
            s = self.da.insert_branch(s, old_suffix[j])?;
            j += 1;
        }

        let old_c = old_suffix.get(j).copied().unwrap_or(TRIE_CHAR_TERM);
        let old_da = self.da.insert_branch(s, old_c)?;
        let rest = if j < old_suffix.len() {
            old_suffix[j + 1..].to_vec()
        } else {
            Vec::new()
        };
        self.tail.set_suffix(old_tail, rest);
        self.da.set_tail_index(old_da, old_tail);

        self.branch_in_branch(s, &new_suffix[j..], data)
    }

    /// Removes `key`, reclaiming any states left without children.
    ///
    /// Returns `false` and leaves the trie unchanged if `key` is absent
    /// (including keys with unmapped symbols, which can never be stored).
    pub fn delete(&mut self, key: &str) -> bool {
        let Ok(codes) = self.alpha.encode(key) else {
            return false;
        };
        let Some((s, t)) = self.locate(&codes) else {
            return false;
        };
        self.values.clear(t);
        self.tail.free(t);
        self.da.clear_tail_index(s);
        self.da.prune(s);
        self.touch();
        true
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    /// Payload stored under `key`, or `None` if any walk step fails.
    #[must_use]
    pub fn retrieve(&self, key: &str) -> Option<TrieData> {
        let codes = self.alpha.encode(key).ok()?;
        let (_, t) = self.locate(&codes)?;
        self.values.get(t)
    }

    /// Walks a full key to its terminal, returning the separate state and
    /// its tail block.
    fn locate(&self, codes: &[TrieChar]) -> Option<(TrieIndex, TrieIndex)> {
        let mut s = ROOT;
        let mut i = 0_usize;
        loop {
            if self.da.is_separate(s) {
                break;
            }
            let c = codes.get(i).copied().unwrap_or(TRIE_CHAR_TERM);
            s = self.da.transition(s, c)?;
            if c == TRIE_CHAR_TERM {
                break;
            }
            i += 1;
        }
        let t = self.da.tail_index(s);
        let mut offset = 0_usize;
        loop {
            let c = codes.get(i).copied().unwrap_or(TRIE_CHAR_TERM);
            if !self.tail.walk_char(t, &mut offset, c) {
                return None;
            }
            if c == TRIE_CHAR_TERM {
                break;
            }
            i += 1;
        }
        Some((s, t))
    }

    // -----------------------------------------------------------------------
    // Cursors and enumeration
    // -----------------------------------------------------------------------

    /// A fresh cursor at the root, valid until the next mutation.
    #[must_use]
    pub fn root(&self) -> TrieState {
        TrieState::at_root(self.generation)
    }

    /// Lazily enumerates every stored `(key, value)` pair in ascending
    /// dense-symbol order.
    #[must_use]
    pub fn iter(&self) -> TrieIter<'_> {
        TrieIter::new(self, self.root())
    }

    /// Enumerates the `(suffix, value)` pairs reachable from `state`; keys
    /// are relative to the cursor's position.
    ///
    /// # Errors
    ///
    /// Returns [`TrieError::InvalidCursor`] if `state` predates the last
    /// mutation.
    pub fn iter_from(&self, state: &TrieState) -> Result<TrieIter<'_>> {
        state.ensure_valid(self)?;
        Ok(TrieIter::new(self, state.clone()))
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// `true` if the trie has unsaved mutations.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn touch(&mut self) {
        self.dirty = true;
        self.generation += 1;
    }

    /// Serializes the trie and clears the dirty flag on success.
    ///
    /// # Errors
    ///
    /// Returns [`TrieError::Io`] on write failure.
    pub fn write_to<W: Write>(&mut self, w: &mut W) -> Result<()> {
        serial::write_u32(w, MAGIC)?;
        serial::write_u16(w, VERSION)?;
        serial::write_u16(w, 0)?;
        self.alpha.write_to(w)?;
        self.da.write_to(w)?;
        self.tail.write_to(w)?;
        self.values.write_to(w)?;
        w.flush()?;
        self.dirty = false;
        Ok(())
    }

    /// Restores a trie persisted by [`write_to`](Self::write_to).
    ///
    /// The image is validated before any trie is returned: a header, index
    /// or cross-reference violation aborts the load with
    /// [`TrieError::CorruptFormat`], never a partially built trie.
    ///
    /// # Errors
    ///
    /// Returns [`TrieError::CorruptFormat`] on structural inconsistency,
    /// [`TrieError::Io`] on read failure.
    pub fn read_from<R: Read>(r: &mut R) -> Result<Self> {
        if serial::read_u32(r)? != MAGIC {
            return Err(TrieError::CorruptFormat("bad magic"));
        }
        if serial::read_u16(r)? != VERSION {
            return Err(TrieError::CorruptFormat("unsupported version"));
        }
        let _flags = serial::read_u16(r)?;

        let alpha = AlphaMap::read_from(r)?;
        let da = DArray::read_from(r)?;
        let tail = Tail::read_from(r)?;
        let values = ValueStore::read_from(r)?;

        let symbols = alpha.symbol_count();
        da.validate(symbols)?;
        tail.validate(symbols)?;

        // Cross-checks: separate states, tail blocks and payloads must
        // reference each other one-to-one.
        let mut terminals = 0_usize;
        for s in da.separate_states() {
            if !tail.is_used(da.tail_index(s)) {
                return Err(TrieError::CorruptFormat("state names a dead tail block"));
            }
            terminals += 1;
        }
        if terminals != values.len() {
            return Err(TrieError::CorruptFormat("payload count does not match terminals"));
        }
        for t in values.keys() {
            if !tail.is_used(t) {
                return Err(TrieError::CorruptFormat("payload names a dead tail block"));
            }
        }

        Ok(Self {
            alpha,
            da,
            tail,
            values,
            generation: 0,
            dirty: false,
        })
    }

    /// Saves the trie to a file.
    ///
    /// # Errors
    ///
    /// Same as [`write_to`](Self::write_to).
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let mut w = BufWriter::new(File::create(path)?);
        self.write_to(&mut w)
    }

    /// Loads a trie from a file.
    ///
    /// # Errors
    ///
    /// Same as [`read_from`](Self::read_from).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut r = BufReader::new(File::open(path)?);
        Self::read_from(&mut r)
    }
}
