//! Bucket index functions.
//!
//! Every key type a table can hold implements [`BucketHash`], which maps it
//! onto `[0, capacity)`. The functions are deterministic and carry no state,
//! so an index computed today is the index computed after reloading a file.

use std::fmt::Display;

/// Maps a key onto a bucket of a table with `capacity` slots.
pub trait BucketHash {
    /// Must return a value in `[0, capacity)` for any `capacity > 0`,
    /// and 0 for a `capacity` of 0
    fn bucket_index(&self, capacity: usize) -> usize;
}

/// Folds the bytes of a non-negative integer together with XOR.
/// Negative numbers (and zero) fold to 0.
pub fn numeric_hash(key: i128, capacity: usize) -> usize {
    if capacity == 0 {
        return 0;
    }

    let mut key = key;
    let mut hash = 0;
    while key > 0 {
        hash ^= (key & 0xFF) as usize;
        key >>= 8;
    }
    hash % capacity
}

/// Byte sum of the key, pushed away from bucket 0 and, on even sized
/// tables, onto an odd bucket.
pub fn text_hash(key: &[u8], capacity: usize) -> usize {
    // `capacity - 1` would be a zero divisor
    if capacity < 2 {
        return 0;
    }

    let sum: usize = key.iter().map(|&b| b as usize).sum();
    let mut result = sum % (capacity - 1) + 1;
    if capacity % 2 == 0 && result % 2 == 0 {
        result += 1;
    }

    result % capacity
}

/// First byte of the printed key. Clusters badly, only meant for key types
/// without a dedicated hash.
pub fn display_hash<T: Display + ?Sized>(key: &T, capacity: usize) -> usize {
    if capacity == 0 {
        return 0;
    }
    key.to_string()
        .as_bytes()
        .first()
        .map_or(0, |&b| b as usize % capacity)
}

macro_rules! impl_numeric_hash {
    ( $( $t: ty ),* ) => {
        $(
            impl BucketHash for $t {
                #[inline]
                fn bucket_index(&self, capacity: usize) -> usize {
                    numeric_hash(*self as i128, capacity)
                }
            }
        )*
    };
}

impl_numeric_hash!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl BucketHash for str {
    #[inline]
    fn bucket_index(&self, capacity: usize) -> usize {
        text_hash(self.as_bytes(), capacity)
    }
}

impl BucketHash for String {
    #[inline]
    fn bucket_index(&self, capacity: usize) -> usize {
        text_hash(self.as_bytes(), capacity)
    }
}

impl<T: BucketHash + ?Sized> BucketHash for &T {
    #[inline]
    fn bucket_index(&self, capacity: usize) -> usize {
        (**self).bucket_index(capacity)
    }
}

/// Wraps any printable key so it can be stored in a table,
/// hashing on the first byte of its `Display` output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ByDisplay<T>(pub T);

impl<T: Display> BucketHash for ByDisplay<T> {
    fn bucket_index(&self, capacity: usize) -> usize {
        display_hash(&self.0, capacity)
    }
}

impl<T: Display> Display for ByDisplay<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl<T: std::str::FromStr> std::str::FromStr for ByDisplay<T> {
    type Err = T::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(ByDisplay)
    }
}
