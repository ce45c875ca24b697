//! Tests for label hashing
//!
//! Tests cover FNV-1a reference vectors, order independence, and hash_mod bounds.

use std::hash::Hasher;

use sroute_protocol::Label;

use crate::{Fnv1a32, hash_mod, label_hash};

fn fnv(input: &str) -> u32 {
    let mut h = Fnv1a32::new();
    h.write(input.as_bytes());
    h.sum32()
}

// =============================================================================
// Fnv1a32 tests
// =============================================================================

#[test]
fn test_fnv_empty_is_offset_basis() {
    assert_eq!(fnv(""), 0x811c_9dc5);
    assert_eq!(Fnv1a32::default().sum32(), 0x811c_9dc5);
}

#[test]
fn test_fnv_reference_vectors() {
    assert_eq!(fnv("a"), 0xe40c_292c);
    assert_eq!(fnv("foobar"), 0xbf9c_f968);
}

#[test]
fn test_fnv_incremental_writes_match_single_write() {
    let mut h = Fnv1a32::new();
    h.write(b"foo");
    h.write(b"bar");
    assert_eq!(h.sum32(), fnv("foobar"));
    assert_eq!(h.finish(), u64::from(fnv("foobar")));
}

// =============================================================================
// label_hash tests
// =============================================================================

#[test]
fn test_label_hash_sorts_all_strings() {
    // {job="a"} -> ["a", "job"] -> "ajob"
    let labels = vec![Label::new("job", "a")];
    assert_eq!(label_hash(&labels), fnv("ajob"));
}

#[test]
fn test_label_hash_order_independent() {
    let a = vec![
        Label::new("__name__", "up"),
        Label::new("job", "node"),
        Label::new("instance", "10.0.0.1:9100"),
    ];
    let mut b = a.clone();
    b.reverse();
    let c = vec![a[1].clone(), a[2].clone(), a[0].clone()];

    assert_eq!(label_hash(&a), label_hash(&b));
    assert_eq!(label_hash(&a), label_hash(&c));
}

#[test]
fn test_label_hash_distinguishes_values() {
    let a = vec![Label::new("job", "a")];
    let b = vec![Label::new("job", "b")];
    assert_ne!(label_hash(&a), label_hash(&b));
}

#[test]
fn test_label_hash_empty_set() {
    assert_eq!(label_hash(&[]), 0x811c_9dc5);
}

// =============================================================================
// hash_mod tests
// =============================================================================

#[test]
fn test_hash_mod_zero_and_one_collapse() {
    assert_eq!(hash_mod(0, 12345), 0);
    assert_eq!(hash_mod(1, 12345), 0);
    assert_eq!(hash_mod(0, u32::MAX), 0);
}

#[test]
fn test_hash_mod_is_remainder() {
    assert_eq!(hash_mod(4, 10), 2);
    assert_eq!(hash_mod(3, 9), 0);
    assert_eq!(hash_mod(7, u32::MAX), (u32::MAX % 7) as usize);
}

#[test]
fn test_hash_mod_always_in_range() {
    for key in [0, 1, 99, 0xdead_beef, u32::MAX] {
        for m in 2..20 {
            assert!(hash_mod(m, key) < m);
        }
    }
}
