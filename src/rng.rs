//! Deterministic string-seeded index selection.
//!
//! The tracker never uses a stateful PRNG: every "random" choice (trait
//! assignment, sentence phrasing) is an index derived from a stable semantic
//! seed string, so replaying the same donation log always produces the same
//! roster and the same narration.

/// Map a seed string to an index in `[0, bound)`.
///
/// Folds the seed's UTF-16 code units into a wrapping 32-bit polynomial
/// hash (`hash * 31 + unit` at each step) and reduces the result with
/// remainder semantics that keep the sign of the dividend before taking the
/// absolute value. The 32-bit wraparound at every step is load-bearing:
/// widening the accumulator would change which traits and sentences get
/// picked.
#[must_use]
pub fn hash_index(seed: &str, bound: usize) -> usize {
    let mut hash: i32 = 0;
    for unit in seed.encode_utf16() {
        hash = hash
            .wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit));
    }
    let Ok(bound) = i32::try_from(bound) else {
        return 0;
    };
    if bound <= 0 {
        return 0;
    }
    (hash.wrapping_add(1) % bound).unsigned_abs() as usize
}
