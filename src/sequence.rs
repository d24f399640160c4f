//! Random question sequences
//!
//! Sessions draw their questions as a uniform random sample without
//! replacement, presented in random order.

/// Shuffles a slice in place with the Fisher–Yates algorithm
///
/// Walks from the last index down to 1, swapping each element with a
/// uniformly chosen element at an index no greater than its own.
pub fn shuffle<T>(rng: &mut fastrand::Rng, items: &mut [T]) {
    for i in (1..items.len()).rev() {
        let j = rng.usize(..=i);
        items.swap(i, j);
    }
}

/// Draws `count` distinct indices from `0..total` in random order
///
/// The caller guarantees `count <= total`; a larger `count` is truncated
/// to `total`.
pub fn random_sequence(rng: &mut fastrand::Rng, total: usize, count: usize) -> Vec<usize> {
    let mut sequence: Vec<usize> = (0..total).collect();
    shuffle(rng, &mut sequence);
    sequence.truncate(count);
    sequence
}
