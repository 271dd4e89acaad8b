//! Random selection helpers. Every draw goes through the injected RNG so a
//! seed fully determines which candidate wins.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

/// Samples an index with probability proportional to its weight.
/// Returns `None` when no weight is positive.
pub fn pick_weighted(weights: &[f64], rng: &mut impl Rng) -> Option<usize> {
    let dist = WeightedIndex::new(weights).ok()?;
    Some(dist.sample(rng))
}

/// Removes and returns a uniformly chosen candidate, keeping the rest in order.
pub fn take_uniform<T>(candidates: &mut Vec<T>, rng: &mut impl Rng) -> Option<T> {
    if candidates.is_empty() {
        return None;
    }
    let idx = rng.gen_range(0..candidates.len());
    Some(candidates.remove(idx))
}
