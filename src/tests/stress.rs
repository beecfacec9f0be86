use std::io::Cursor;

use crate::Trie;

/// Every string of length 1..=4 over {a, b, c, d}: 340 keys with heavy
/// prefix sharing, forcing repeated tail splits and state relocation.
fn dense_keys() -> Vec<String> {
    let mut keys = Vec::new();
    let mut frontier: Vec<String> = vec![String::new()];
    for _ in 0..4 {
        let mut next = Vec::new();
        for prefix in &frontier {
            for ch in ['a', 'b', 'c', 'd'] {
                let mut key = prefix.clone();
                key.push(ch);
                keys.push(key.clone());
                next.push(key);
            }
        }
        frontier = next;
    }
    keys
}

#[test]
fn dense_key_space() {
    let mut trie = Trie::from_ranges(&[('a', 'd')]).unwrap();
    let keys = dense_keys();
    for (i, key) in keys.iter().enumerate() {
        trie.store(key, i as i32).unwrap();
    }
    assert_eq!(trie.len(), keys.len());
    for (i, key) in keys.iter().enumerate() {
        assert_eq!(trie.retrieve(key), Some(i as i32), "missing {key}");
    }
    assert_eq!(trie.iter().count(), keys.len());
}

#[test]
fn delete_half_then_verify() {
    let mut trie = Trie::from_ranges(&[('a', 'd')]).unwrap();
    let keys = dense_keys();
    for (i, key) in keys.iter().enumerate() {
        trie.store(key, i as i32).unwrap();
    }
    for key in keys.iter().step_by(2) {
        assert!(trie.delete(key), "failed to delete {key}");
    }
    assert_eq!(trie.len(), keys.len() / 2);
    for (i, key) in keys.iter().enumerate() {
        let expected = (i % 2 == 1).then_some(i as i32);
        assert_eq!(trie.retrieve(key), expected, "key {key}");
    }
}

#[test]
fn churn_reuses_reclaimed_space() {
    let mut trie = Trie::from_ranges(&[('a', 'd')]).unwrap();
    let keys = dense_keys();
    for round in 0..3 {
        for (i, key) in keys.iter().enumerate() {
            trie.store(key, i as i32 + round).unwrap();
        }
        for key in &keys {
            assert!(trie.delete(key));
        }
        assert!(trie.is_empty());
    }
    trie.store("abcd", 7).unwrap();
    assert_eq!(trie.retrieve("abcd"), Some(7));
    assert_eq!(trie.len(), 1);
}

#[test]
fn round_trip_under_load() {
    let mut trie = Trie::from_ranges(&[('a', 'd')]).unwrap();
    let keys = dense_keys();
    for (i, key) in keys.iter().enumerate() {
        trie.store(key, i as i32).unwrap();
    }
    for key in keys.iter().step_by(3) {
        trie.delete(key);
    }

    let mut bytes = Vec::new();
    trie.write_to(&mut bytes).unwrap();
    let restored = Trie::read_from(&mut Cursor::new(&bytes)).unwrap();

    assert_eq!(restored.len(), trie.len());
    for key in &keys {
        assert_eq!(restored.retrieve(key), trie.retrieve(key), "key {key}");
    }

    let a: Vec<_> = trie.iter().collect();
    let b: Vec<_> = restored.iter().collect();
    assert_eq!(a, b);
}

#[test]
fn long_keys_share_tails() {
    let mut trie = Trie::from_ranges(&[('a', 'z')]).unwrap();
    let stem = "internationalization";
    for i in 0..stem.len() {
        trie.store(&stem[..=i], i as i32).unwrap();
    }
    for i in 0..stem.len() {
        assert_eq!(trie.retrieve(&stem[..=i]), Some(i as i32));
    }
    assert_eq!(trie.iter().count(), stem.len());
}
