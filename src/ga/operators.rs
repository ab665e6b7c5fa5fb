//! Real-vector genetic operators.
//!
//! # Crossover
//!
//! - [`blend_crossover`] (BLX-α): Eshelman & Schaffer (1993). Each child
//!   gene is drawn uniformly from the parents' interval extended by
//!   `α · range` on both sides, then clamped to the axis bounds.
//!
//! # Mutation
//!
//! - [`gaussian_mutation`]: per-gene additive `N(0, σ²)` noise with
//!   probability `p`, clamped to the axis bounds.
//! - [`annealed_sigma`]: geometric σ schedule from `start · width` at
//!   generation 0 towards `end · width` at the end of the budget.
//!
//! # References
//!
//! - Eshelman & Schaffer (1993), "Real-Coded Genetic Algorithms and
//!   Interval-Schemata"
//! - Bäck & Schwefel (1993), "An Overview of Evolutionary Algorithms for
//!   Parameter Optimization"

use crate::problem::Bounds;
use rand::Rng;
use rand_distr::StandardNormal;

/// BLX-α crossover producing two children.
///
/// For each gene, with `lo = min(p1, p2)`, `hi = max(p1, p2)`,
/// `range = hi - lo`, both children draw independently from
/// `[lo - α·range, hi + α·range]` and are clamped to `bounds[i]`.
/// Identical parent genes are copied through.
///
/// # Panics
/// Panics if the parents and `bounds` differ in length.
pub fn blend_crossover<R: Rng>(
    parent1: &[f64],
    parent2: &[f64],
    bounds: &[Bounds],
    alpha: f64,
    rng: &mut R,
) -> (Vec<f64>, Vec<f64>) {
    let n = parent1.len();
    assert_eq!(n, parent2.len(), "parents must have equal length");
    assert_eq!(n, bounds.len(), "bounds must cover every gene");

    let mut child1 = Vec::with_capacity(n);
    let mut child2 = Vec::with_capacity(n);

    for i in 0..n {
        let lo = parent1[i].min(parent2[i]);
        let hi = parent1[i].max(parent2[i]);
        let range = hi - lo;
        if range <= f64::EPSILON * hi.abs().max(1.0) {
            child1.push(bounds[i].clamp(lo));
            child2.push(bounds[i].clamp(lo));
            continue;
        }
        let (a, b) = (lo - alpha * range, hi + alpha * range);
        child1.push(bounds[i].clamp(rng.random_range(a..=b)));
        child2.push(bounds[i].clamp(rng.random_range(a..=b)));
    }

    (child1, child2)
}

/// Mutation strength for `generation` of a `budget`-generation run on an
/// axis of `width`.
///
/// `σ = start·w · (end/start)^(generation/budget)`.
pub fn annealed_sigma(width: f64, start: f64, end: f64, generation: usize, budget: usize) -> f64 {
    let progress = if budget == 0 {
        1.0
    } else {
        (generation as f64 / budget as f64).min(1.0)
    };
    let s0 = start * width;
    let s1 = end * width;
    s0 * (s1 / s0).powf(progress)
}

/// Adds `N(0, σᵢ²)` noise to each gene with probability `probability`,
/// clamping to `bounds[i]`. `sigmas[i]` is the strength for gene `i`.
///
/// Returns the number of genes mutated.
pub fn gaussian_mutation<R: Rng>(
    genes: &mut [f64],
    bounds: &[Bounds],
    sigmas: &[f64],
    probability: f64,
    rng: &mut R,
) -> usize {
    let mut mutated = 0;
    for (i, gene) in genes.iter_mut().enumerate() {
        if rng.random_bool(probability) {
            let z: f64 = rng.sample(StandardNormal);
            *gene = bounds[i].clamp(*gene + z * sigmas[i]);
            mutated += 1;
        }
    }
    mutated
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn unit_bounds(n: usize) -> Vec<Bounds> {
        vec![Bounds::new(-5.0, 5.0); n]
    }

    // ---- Blend crossover ----

    #[test]
    fn test_blend_within_extended_interval() {
        let mut rng = StdRng::seed_from_u64(42);
        let p1 = [0.0, 1.0];
        let p2 = [1.0, 3.0];
        for _ in 0..200 {
            let (c1, c2) = blend_crossover(&p1, &p2, &unit_bounds(2), 0.5, &mut rng);
            for c in [&c1, &c2] {
                assert!((-0.5..=1.5).contains(&c[0]), "gene 0 out of BLX range: {}", c[0]);
                assert!((0.0..=4.0).contains(&c[1]), "gene 1 out of BLX range: {}", c[1]);
            }
        }
    }

    #[test]
    fn test_blend_clamps_to_domain() {
        let mut rng = StdRng::seed_from_u64(1);
        let p1 = [4.9];
        let p2 = [-4.9];
        for _ in 0..200 {
            let (c1, c2) = blend_crossover(&p1, &p2, &unit_bounds(1), 0.5, &mut rng);
            assert!((-5.0..=5.0).contains(&c1[0]));
            assert!((-5.0..=5.0).contains(&c2[0]));
        }
    }

    #[test]
    fn test_blend_identical_parents() {
        let mut rng = StdRng::seed_from_u64(3);
        let p = [1.25, -2.0];
        let (c1, c2) = blend_crossover(&p, &p, &unit_bounds(2), 0.5, &mut rng);
        assert_eq!(c1, p.to_vec());
        assert_eq!(c2, p.to_vec());
    }

    // ---- Sigma schedule ----

    #[test]
    fn test_annealed_sigma_endpoints() {
        let width = 10.0;
        let s0 = annealed_sigma(width, 0.1, 0.0001, 0, 100);
        let s_end = annealed_sigma(width, 0.1, 0.0001, 100, 100);
        assert!((s0 - 1.0).abs() < 1e-12);
        assert!((s_end - 0.001).abs() < 1e-12);
    }

    #[test]
    fn test_annealed_sigma_monotone() {
        let mut prev = f64::INFINITY;
        for g in 0..=50 {
            let s = annealed_sigma(4.0, 0.1, 0.0001, g, 50);
            assert!(s < prev);
            prev = s;
        }
    }

    // ---- Gaussian mutation ----

    #[test]
    fn test_mutation_probability_zero_is_noop() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut genes = vec![1.0, 2.0, 3.0];
        let n = gaussian_mutation(&mut genes, &unit_bounds(3), &[1.0; 3], 0.0, &mut rng);
        assert_eq!(n, 0);
        assert_eq!(genes, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_mutation_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(11);
        let bounds = unit_bounds(4);
        for _ in 0..200 {
            let mut genes = vec![4.99, -4.99, 0.0, 2.5];
            let n = gaussian_mutation(&mut genes, &bounds, &[5.0; 4], 1.0, &mut rng);
            assert_eq!(n, 4);
            assert!(genes.iter().all(|g| (-5.0..=5.0).contains(g)));
        }
    }
}
