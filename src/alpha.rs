//! Alphabet mapping between input symbols and the dense index space.
//!
//! The double array does not transition on raw code points: every symbol is
//! first translated to a dense index in `1..=255`, with index 0 reserved for
//! the end-of-key terminator. The mapping is declared up front as a set of
//! disjoint inclusive ranges and is immutable once a trie is built over it.

use std::io::{Read, Write};

use crate::error::{Result, TrieError};
use crate::serial;
use crate::TrieChar;

/// Dense index of the reserved end-of-key terminator.
pub const TRIE_CHAR_TERM: TrieChar = 0;

/// Number of dense indices available to mapped symbols (1..=255).
const DENSE_CAPACITY: u32 = 255;

/// Bidirectional mapping between `char` symbols and dense trie indices.
///
/// Ranges are kept sorted by lower bound, so index assignment is a function
/// of the declared ranges alone, not of the order they were added in.
#[derive(Debug, Clone, Default)]
pub struct AlphaMap {
    /// Disjoint inclusive ranges, sorted by lower bound.
    ranges: Vec<(char, char)>,
}

impl AlphaMap {
    /// Creates an empty alphabet.
    #[must_use]
    pub const fn new() -> Self {
        Self { ranges: Vec::new() }
    }

    /// Registers the inclusive symbol range `lower..=upper`.
    ///
    /// # Errors
    ///
    /// Returns [`TrieError::InvalidRange`] if the range is inverted, overlaps
    /// a previously added range, contains the terminator code point U+0000,
    /// or would push the total symbol count past the dense capacity of 255.
    pub fn add_range(&mut self, lower: char, upper: char) -> Result<()> {
        let reject = |reason| TrieError::InvalidRange {
            lower,
            upper,
            reason,
        };
        if lower > upper {
            return Err(reject("inverted bounds"));
        }
        if lower == '\0' {
            return Err(reject("range covers the reserved terminator"));
        }
        if self
            .ranges
            .iter()
            .any(|&(lo, hi)| lower <= hi && lo <= upper)
        {
            return Err(reject("overlaps an existing range"));
        }
        if self.symbol_count() + range_size(lower, upper) > DENSE_CAPACITY {
            return Err(reject("alphabet exceeds 255 symbols"));
        }
        let at = self.ranges.partition_point(|&(lo, _)| lo < lower);
        self.ranges.insert(at, (lower, upper));
        Ok(())
    }

    /// Returns the number of mapped symbols.
    #[must_use]
    pub fn symbol_count(&self) -> u32 {
        self.ranges
            .iter()
            .map(|&(lo, hi)| range_size(lo, hi))
            .sum()
    }

    /// Returns the dense index of `symbol`.
    ///
    /// # Errors
    ///
    /// Returns [`TrieError::UnmappedSymbol`] if no declared range covers
    /// `symbol`.
    pub fn index_of(&self, symbol: char) -> Result<TrieChar> {
        let mut offset = 1_u32;
        for &(lo, hi) in &self.ranges {
            if symbol >= lo && symbol <= hi {
                let idx = offset + (symbol as u32 - lo as u32);
                // Capacity check in add_range keeps idx <= 255.
                return Ok(idx as TrieChar);
            }
            offset += range_size(lo, hi);
        }
        Err(TrieError::UnmappedSymbol(symbol))
    }

    /// Returns the symbol mapped to the dense index, or `None` for the
    /// terminator and for indices past the alphabet.
    #[must_use]
    pub fn symbol_of(&self, index: TrieChar) -> Option<char> {
        if index == TRIE_CHAR_TERM {
            return None;
        }
        let mut offset = 1_u32;
        for &(lo, hi) in &self.ranges {
            let size = range_size(lo, hi);
            let idx = u32::from(index);
            if idx < offset + size {
                return char::from_u32(lo as u32 + (idx - offset));
            }
            offset += size;
        }
        None
    }

    /// Translates a key to dense indices, without a trailing terminator.
    ///
    /// # Errors
    ///
    /// Returns [`TrieError::UnmappedSymbol`] on the first uncovered symbol.
    pub fn encode(&self, key: &str) -> Result<Vec<TrieChar>> {
        key.chars().map(|ch| self.index_of(ch)).collect()
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    pub(crate) fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        serial::write_u32(w, self.ranges.len() as u32)?;
        for &(lo, hi) in &self.ranges {
            serial::write_u32(w, lo as u32)?;
            serial::write_u32(w, hi as u32)?;
        }
        Ok(())
    }

    pub(crate) fn read_from<R: Read>(r: &mut R) -> Result<Self> {
        let count = serial::read_u32(r)?;
        let mut map = Self::new();
        for _ in 0..count {
            let lo = decode_char(serial::read_u32(r)?)?;
            let hi = decode_char(serial::read_u32(r)?)?;
            map.add_range(lo, hi)
                .map_err(|_| TrieError::CorruptFormat("malformed alphabet range"))?;
        }
        Ok(map)
    }
}

/// Number of code points in `lo..=hi`, ignoring the surrogate gap.
///
/// Over-counting across the gap only makes the capacity check stricter.
fn range_size(lo: char, hi: char) -> u32 {
    hi as u32 - lo as u32 + 1
}

fn decode_char(cp: u32) -> Result<char> {
    char::from_u32(cp).ok_or(TrieError::CorruptFormat("range bound is not a code point"))
}
