//! Parent selection for the GA.
//!
//! All selection assumes **minimization** (lower fitness = better).
//!
//! # References
//!
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"
//! - Goldberg & Deb (1991), "A Comparative Analysis of Selection Schemes
//!   Used in Genetic Algorithms"

use super::types::Individual;
use rand::Rng;

/// Tournament selection: pick `k` individuals uniformly at random (with
/// replacement), return the index of the fittest.
///
/// Higher `k` = stronger selection pressure; `k = 3` is a moderate default.
///
/// # Complexity
/// O(k) per selection
///
/// # Panics
/// Panics if `population` is empty.
pub fn tournament<R: Rng>(population: &[Individual], k: usize, rng: &mut R) -> usize {
    assert!(!population.is_empty(), "cannot select from empty population");

    let k = k.max(1);
    let n = population.len();

    let mut best_idx = rng.random_range(0..n);
    for _ in 1..k {
        let idx = rng.random_range(0..n);
        if population[idx].fitness < population[best_idx].fitness {
            best_idx = idx;
        }
    }
    best_idx
}
