use crate::{AlphaMap, TrieError};

#[test]
fn empty_alphabet() {
    let map = AlphaMap::new();
    assert_eq!(map.symbol_count(), 0);
    assert!(matches!(map.index_of('a'), Err(TrieError::UnmappedSymbol('a'))));
}

#[test]
fn single_range_indices_are_dense() {
    let mut map = AlphaMap::new();
    map.add_range('a', 'z').unwrap();
    assert_eq!(map.symbol_count(), 26);
    assert_eq!(map.index_of('a').unwrap(), 1);
    assert_eq!(map.index_of('z').unwrap(), 26);
}

#[test]
fn indices_independent_of_insertion_order() {
    let mut fwd = AlphaMap::new();
    fwd.add_range('A', 'Z').unwrap();
    fwd.add_range('a', 'z').unwrap();

    let mut rev = AlphaMap::new();
    rev.add_range('a', 'z').unwrap();
    rev.add_range('A', 'Z').unwrap();

    for ch in ['A', 'M', 'Z', 'a', 'm', 'z'] {
        assert_eq!(fwd.index_of(ch).unwrap(), rev.index_of(ch).unwrap());
    }
}

#[test]
fn symbol_of_inverts_index_of() {
    let mut map = AlphaMap::new();
    map.add_range('a', 'z').unwrap();
    map.add_range('0', '9').unwrap();
    for ch in "abcxyz0159".chars() {
        let idx = map.index_of(ch).unwrap();
        assert_eq!(map.symbol_of(idx), Some(ch));
    }
}

#[test]
fn symbol_of_terminator_is_none() {
    let mut map = AlphaMap::new();
    map.add_range('a', 'z').unwrap();
    assert_eq!(map.symbol_of(0), None);
}

#[test]
fn symbol_of_past_alphabet_is_none() {
    let mut map = AlphaMap::new();
    map.add_range('a', 'c').unwrap();
    assert_eq!(map.symbol_of(4), None);
}

#[test]
fn inverted_range_rejected() {
    let mut map = AlphaMap::new();
    assert!(matches!(
        map.add_range('z', 'a'),
        Err(TrieError::InvalidRange { .. })
    ));
}

#[test]
fn overlapping_range_rejected() {
    let mut map = AlphaMap::new();
    map.add_range('a', 'm').unwrap();
    assert!(matches!(
        map.add_range('k', 'z'),
        Err(TrieError::InvalidRange { .. })
    ));
    // Fully contained overlap too.
    assert!(matches!(
        map.add_range('c', 'd'),
        Err(TrieError::InvalidRange { .. })
    ));
}

#[test]
fn adjacent_ranges_allowed() {
    let mut map = AlphaMap::new();
    map.add_range('a', 'm').unwrap();
    map.add_range('n', 'z').unwrap();
    assert_eq!(map.symbol_count(), 26);
}

#[test]
fn terminator_code_point_rejected() {
    let mut map = AlphaMap::new();
    assert!(matches!(
        map.add_range('\0', 'z'),
        Err(TrieError::InvalidRange { .. })
    ));
}

#[test]
fn oversized_alphabet_rejected() {
    let mut map = AlphaMap::new();
    map.add_range('\u{1}', '\u{ff}').unwrap();
    assert_eq!(map.symbol_count(), 255);
    assert!(matches!(
        map.add_range('\u{100}', '\u{100}'),
        Err(TrieError::InvalidRange { .. })
    ));
}

#[test]
fn encode_maps_every_symbol() {
    let mut map = AlphaMap::new();
    map.add_range('a', 'z').unwrap();
    assert_eq!(map.encode("abz").unwrap(), vec![1, 2, 26]);
    assert!(matches!(
        map.encode("abZ"),
        Err(TrieError::UnmappedSymbol('Z'))
    ));
}
