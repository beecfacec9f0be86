//! Payloads attached to stored keys.
//!
//! Every stored key terminates in exactly one tail block, and tail block
//! indices are stable across double-array relocation, so the block index
//! doubles as the terminal's persistent identity. A `BTreeMap` keeps the
//! serialized entry order deterministic.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use crate::error::Result;
use crate::serial;
use crate::{TrieData, TrieIndex};

/// Map from terminal (tail block) index to its integer payload.
#[derive(Debug, Clone, Default)]
pub struct ValueStore {
    values: BTreeMap<TrieIndex, TrieData>,
}

impl ValueStore {
    /// Creates an empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    /// Number of stored payloads (one per key).
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// `true` if no payloads are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Attaches `value` to terminal `t`, replacing any previous payload.
    pub fn set(&mut self, t: TrieIndex, value: TrieData) {
        self.values.insert(t, value);
    }

    /// Payload of terminal `t`.
    #[must_use]
    pub fn get(&self, t: TrieIndex) -> Option<TrieData> {
        self.values.get(&t).copied()
    }

    /// Detaches the payload of terminal `t`.
    pub fn clear(&mut self, t: TrieIndex) {
        self.values.remove(&t);
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    pub(crate) fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        serial::write_u32(w, self.values.len() as u32)?;
        for (&t, &value) in &self.values {
            serial::write_i32(w, t)?;
            serial::write_i32(w, value)?;
        }
        Ok(())
    }

    pub(crate) fn read_from<R: Read>(r: &mut R) -> Result<Self> {
        let count = serial::read_u32(r)?;
        let mut values = BTreeMap::new();
        for _ in 0..count {
            let t = serial::read_i32(r)?;
            let value = serial::read_i32(r)?;
            values.insert(t, value);
        }
        Ok(Self { values })
    }

    pub(crate) fn keys(&self) -> impl Iterator<Item = TrieIndex> + '_ {
        self.values.keys().copied()
    }
}
