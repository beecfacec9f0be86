//! Double-array trie with tail compression.
//!
//! A character-keyed associative index for workloads where keys share long
//! common prefixes and both exact lookup and prefix walking matter, such as
//! lexical analyzers and spelling dictionaries.
//!
//! # Key properties
//!
//! - **O(1) transitions**: one base/check array probe per symbol
//! - **Tail compression**: unshared key suffixes stored verbatim, one
//!   array cell per *branching* symbol only
//! - **Incremental**: insert and delete without rebuilding, with eager
//!   reclamation of dead states
//! - **Persistent**: compact little-endian binary image, fully validated
//!   on load
//! - **Zero `unsafe`**: enforced by `#![forbid(unsafe_code)]`
//!
//! # Example
//!
//! ```
//! use datrie::Trie;
//!
//! let mut trie = Trie::from_ranges(&[('a', 'z')])?;
//! trie.store("prefix", 1)?;
//! trie.store("preview", 2)?;
//! assert_eq!(trie.retrieve("preview"), Some(2));
//! assert_eq!(trie.retrieve("pre"), None);
//!
//! let mut cursor = trie.root();
//! for ch in "pre".chars() {
//!     assert!(cursor.walk(&trie, ch)?);
//! }
//! assert_eq!(cursor.walkable_symbols(&trie)?, vec!['f', 'v']);
//! # Ok::<(), datrie::TrieError>(())
//! ```
//!
//! # References
//!
//! - Aoe, 1989: "An Efficient Digital Search Algorithm by Using a
//!   Double-Array Structure", IEEE TSE 15(9)
//! - Morita & Fuketa et al., 2001: trie compaction with suffix tails

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod alpha;
pub mod error;
pub mod iter;
pub mod state;
pub mod trie;

mod darray;
mod serial;
mod tail;
mod values;

#[cfg(test)]
mod tests;

pub use alpha::AlphaMap;
pub use error::{Result, TrieError};
pub use iter::TrieIter;
pub use state::TrieState;
pub use trie::Trie;

/// One symbol of a key in the dense index space the double array
/// transitions on. Index 0 is the reserved end-of-key terminator.
pub type TrieChar = u8;

/// Index of a double-array state or tail block.
pub type TrieIndex = i32;

/// Integer payload attached to a stored key.
pub type TrieData = i32;
