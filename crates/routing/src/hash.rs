//! LabelHash - order-independent 32-bit label set hash

use std::hash::Hasher;

use sroute_protocol::Label;

const FNV32_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV32_PRIME: u32 = 0x0100_0193;

/// FNV-1a, 32-bit variant
///
/// Implements `Hasher` so it can drive any `Hash` type, but the relay only
/// feeds it raw bytes via `write`.
#[derive(Debug, Clone, Copy)]
pub struct Fnv1a32(u32);

impl Fnv1a32 {
    /// Create a hasher at the offset basis
    #[inline]
    pub const fn new() -> Self {
        Self(FNV32_OFFSET_BASIS)
    }

    /// Current 32-bit digest
    #[inline]
    pub const fn sum32(&self) -> u32 {
        self.0
    }
}

impl Default for Fnv1a32 {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for Fnv1a32 {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= u32::from(b);
            self.0 = self.0.wrapping_mul(FNV32_PRIME);
        }
    }

    #[inline]
    fn finish(&self) -> u64 {
        u64::from(self.0)
    }
}

/// Hash a label set independently of label order
///
/// Names and values are collected into one list of strings, sorted
/// lexicographically and written back to back (no separators) into FNV-1a 32.
pub fn label_hash(labels: &[Label]) -> u32 {
    let mut parts: Vec<&str> = Vec::with_capacity(labels.len() * 2);
    for label in labels {
        parts.push(&label.name);
        parts.push(&label.value);
    }
    parts.sort_unstable();

    let mut hasher = Fnv1a32::new();
    for part in parts {
        hasher.write(part.as_bytes());
    }
    hasher.sum32()
}

/// Reduce a hash into `0..m`
///
/// Returns 0 when `m <= 1`, so a zero modulus never panics.
#[inline]
pub fn hash_mod(m: usize, key: u32) -> usize {
    if m <= 1 {
        return 0;
    }
    (u64::from(key) % m as u64) as usize
}
