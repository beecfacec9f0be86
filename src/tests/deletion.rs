use crate::Trie;

fn sample() -> Trie {
    let mut trie = Trie::from_ranges(&[('a', 'z')]).unwrap();
    for (word, value) in [("pool", 0), ("prize", 1), ("preview", 2), ("pre", 3)] {
        trie.store(word, value).unwrap();
    }
    trie
}

#[test]
fn delete_existing_key() {
    let mut trie = sample();
    assert!(trie.delete("prize"));
    assert_eq!(trie.retrieve("prize"), None);
    assert_eq!(trie.len(), 3);
    for (word, value) in [("pool", 0), ("preview", 2), ("pre", 3)] {
        assert_eq!(trie.retrieve(word), Some(value));
    }
}

#[test]
fn delete_absent_key() {
    let mut trie = sample();
    assert!(!trie.delete("prig"));
    assert!(!trie.delete("p"));
    assert!(!trie.delete(""));
    assert_eq!(trie.len(), 4);
}

#[test]
fn delete_twice() {
    let mut trie = sample();
    assert!(trie.delete("pool"));
    assert!(!trie.delete("pool"));
    assert_eq!(trie.len(), 3);
}

#[test]
fn delete_prefix_keeps_extension() {
    let mut trie = sample();
    assert!(trie.delete("pre"));
    assert_eq!(trie.retrieve("pre"), None);
    assert_eq!(trie.retrieve("preview"), Some(2));
}

#[test]
fn delete_extension_keeps_prefix() {
    let mut trie = sample();
    assert!(trie.delete("preview"));
    assert_eq!(trie.retrieve("preview"), None);
    assert_eq!(trie.retrieve("pre"), Some(3));
}

#[test]
fn delete_all_then_reinsert() {
    let mut trie = sample();
    for word in ["pool", "prize", "preview", "pre"] {
        assert!(trie.delete(word), "failed to delete {word}");
    }
    assert!(trie.is_empty());
    assert_eq!(trie.iter().count(), 0);

    // Reclaimed cells and tail blocks are reused by fresh keys.
    trie.store("pool", 10).unwrap();
    trie.store("prize", 11).unwrap();
    assert_eq!(trie.retrieve("pool"), Some(10));
    assert_eq!(trie.retrieve("prize"), Some(11));
    assert_eq!(trie.len(), 2);
}

#[test]
fn delete_interleaved_with_store() {
    let mut trie = Trie::from_ranges(&[('a', 'z')]).unwrap();
    for i in 0..26 {
        let word: String = (0..3)
            .map(|j| char::from(b'a' + (i + j) % 26))
            .collect();
        trie.store(&word, i32::from(i)).unwrap();
    }
    for i in (0..26).step_by(2) {
        let word: String = (0..3)
            .map(|j| char::from(b'a' + (i + j) % 26))
            .collect();
        assert!(trie.delete(&word));
    }
    assert_eq!(trie.len(), 13);
    for i in 0..26 {
        let word: String = (0..3)
            .map(|j| char::from(b'a' + (i + j) % 26))
            .collect();
        let expected = (i % 2 == 1).then_some(i32::from(i));
        assert_eq!(trie.retrieve(&word), expected, "key {word}");
    }
}
