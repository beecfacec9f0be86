//! Error types for trie construction, mutation and persistence.

use thiserror::Error;

/// Errors reported by trie operations.
#[derive(Debug, Error)]
pub enum TrieError {
    /// An alphabet range is inverted, overlaps an existing range, or would
    /// exceed the dense index space.
    #[error("invalid alphabet range {lower:?}..={upper:?}: {reason}")]
    InvalidRange {
        /// Lower bound of the rejected range.
        lower: char,
        /// Upper bound of the rejected range.
        upper: char,
        /// Why the range was rejected.
        reason: &'static str,
    },

    /// A key contains a symbol outside the declared alphabet.
    #[error("symbol {0:?} is not covered by the alphabet")]
    UnmappedSymbol(char),

    /// A persisted image is structurally inconsistent.
    #[error("corrupt trie image: {0}")]
    CorruptFormat(&'static str),

    /// A cursor was used after a structural change to its trie.
    #[error("cursor position was invalidated by a structural change")]
    InvalidCursor,

    /// The double-array index space is exhausted; the structure must be
    /// discarded.
    #[error("double-array index space exhausted")]
    Allocation,

    /// An I/O failure during save or load.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, TrieError>;
