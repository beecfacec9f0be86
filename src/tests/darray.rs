use crate::darray::{DArray, ROOT};

/// Two root children, one child each. Extending `s` with a second symbol
/// lands exactly on `other`'s child slot, forcing a collision between two
/// states of equal pre-insertion out-degree.
fn equal_out_degree_conflict() -> (DArray, i32, i32, i32) {
    let mut da = DArray::new();
    let s = da.insert_branch(ROOT, 1).unwrap();
    let other = da.insert_branch(ROOT, 2).unwrap();
    da.insert_branch(s, 1).unwrap();
    let other_child = da.insert_branch(other, 1).unwrap();
    assert_eq!(da.base(s) + 2, other_child, "collision not aligned");
    (da, s, other, other_child)
}

#[test]
fn out_degree_tie_relocates_the_extended_state() {
    let (mut da, s, other, other_child) = equal_out_degree_conflict();
    let s_base = da.base(s);
    let other_base = da.base(other);

    let t = da.insert_branch(s, 2).unwrap();

    // The slot owner keeps its place on an exact tie; `s` moves.
    assert_eq!(da.base(other), other_base);
    assert_eq!(da.transition(other, 1), Some(other_child));
    assert_ne!(da.base(s), s_base);
    assert_eq!(da.transition(s, 2), Some(t));
    assert!(da.transition(s, 1).is_some());
}

#[test]
fn smaller_conflicting_state_is_relocated() {
    let mut da = DArray::new();
    let s = da.insert_branch(ROOT, 1).unwrap();
    let other = da.insert_branch(ROOT, 2).unwrap();
    da.insert_branch(s, 1).unwrap();
    da.insert_branch(s, 2).unwrap();
    let other_child = da.insert_branch(other, 1).unwrap();
    assert_eq!(da.base(s) + 3, other_child, "collision not aligned");
    let s_base = da.base(s);
    let other_base = da.base(other);

    let t = da.insert_branch(s, 3).unwrap();

    // `other` has strictly fewer children, so it is the one rebased.
    assert_eq!(da.base(s), s_base);
    assert_ne!(da.base(other), other_base);
    assert_eq!(da.transition(s, 3), Some(t));
    assert!(da.transition(s, 1).is_some());
    assert!(da.transition(s, 2).is_some());
    assert!(da.transition(other, 1).is_some());
}
