//! GA configuration.
//!
//! [`GaConfig`] holds every parameter that controls one GA evaluation.

use crate::params::{self, ParamInfo, ParamValues};

/// Configuration for the real-vector Genetic Algorithm.
///
/// # Defaults
///
/// ```
/// use u_optsession::ga::GaConfig;
///
/// let config = GaConfig::default();
/// assert_eq!(config.population_size, 50);
/// assert_eq!(config.tournament_size, 3);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_optsession::ga::GaConfig;
///
/// let config = GaConfig::default()
///     .with_population_size(20)
///     .with_gene_count(5)
///     .with_mutation_probability(0.2)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GaConfig {
    /// Number of individuals per generation.
    pub population_size: usize,

    /// Dimensionality of each individual.
    pub gene_count: usize,

    /// Per-gene probability of Gaussian mutation (0.0–1.0).
    pub mutation_probability: f64,

    /// Probability that a parent pair is recombined rather than cloned (0.0–1.0).
    pub crossover_probability: f64,

    /// Generation budget. Drives the mutation-strength annealing schedule.
    pub max_generations: usize,

    /// Individuals drawn per tournament.
    pub tournament_size: usize,

    /// BLX-α extension factor.
    pub blend_alpha: f64,

    /// Mutation σ at generation 0, as a fraction of the axis width.
    pub sigma_start: f64,

    /// Mutation σ at the end of the budget, as a fraction of the axis width.
    pub sigma_end: f64,

    /// Random seed for reproducibility. `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            gene_count: 2,
            mutation_probability: 0.1,
            crossover_probability: 0.9,
            max_generations: 100,
            tournament_size: 3,
            blend_alpha: 0.5,
            sigma_start: 0.1,
            sigma_end: 0.0001,
            seed: None,
        }
    }
}

impl GaConfig {
    pub const POPULATION_SIZE: ParamInfo = ParamInfo {
        name: "populationSize",
        description: "Number of individuals in a generation",
        lower: 2.0,
        upper: 100_000.0,
        default: 50.0,
        integer: true,
    };

    pub const GENE_COUNT: ParamInfo = ParamInfo {
        name: "geneCount",
        description: "How many genes does one individual have",
        lower: 1.0,
        upper: 1_000.0,
        default: 2.0,
        integer: true,
    };

    pub const MUTATION_PROBABILITY: ParamInfo = ParamInfo {
        name: "mutationProbability",
        description: "Probability of mutating each gene of a child",
        lower: 0.0,
        upper: 1.0,
        default: 0.1,
        integer: false,
    };

    pub const CROSSOVER_PROBABILITY: ParamInfo = ParamInfo {
        name: "crossoverProbability",
        description: "Probability of crossing two individuals",
        lower: 0.0,
        upper: 1.0,
        default: 0.9,
        integer: false,
    };

    /// Parameter catalogue published for request validation.
    pub const PARAMS: &'static [ParamInfo] = &[
        Self::POPULATION_SIZE,
        Self::GENE_COUNT,
        Self::MUTATION_PROBABILITY,
        Self::CROSSOVER_PROBABILITY,
    ];

    /// Reads the catalogued parameters from `values`, falling back to
    /// defaults. `steps` becomes the generation budget.
    ///
    /// Bounds are not checked here; run [`params::validate`] first.
    pub fn from_params(values: &ParamValues, steps: usize) -> Self {
        Self {
            population_size: params::value_or_default(values, &Self::POPULATION_SIZE) as usize,
            gene_count: params::value_or_default(values, &Self::GENE_COUNT) as usize,
            mutation_probability: params::value_or_default(values, &Self::MUTATION_PROBABILITY),
            crossover_probability: params::value_or_default(values, &Self::CROSSOVER_PROBABILITY),
            max_generations: steps,
            seed: params::seed(values),
            ..Self::default()
        }
    }

    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the number of genes per individual.
    pub fn with_gene_count(mut self, n: usize) -> Self {
        self.gene_count = n;
        self
    }

    /// Sets the per-gene mutation probability.
    pub fn with_mutation_probability(mut self, p: f64) -> Self {
        self.mutation_probability = p.clamp(0.0, 1.0);
        self
    }

    /// Sets the crossover probability.
    pub fn with_crossover_probability(mut self, p: f64) -> Self {
        self.crossover_probability = p.clamp(0.0, 1.0);
        self
    }

    /// Sets the generation budget.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the tournament size.
    pub fn with_tournament_size(mut self, k: usize) -> Self {
        self.tournament_size = k;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    ///
    /// Returns `Err` with a description if any parameter is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.population_size < 2 {
            return Err("populationSize must be at least 2".into());
        }
        if self.gene_count == 0 {
            return Err("geneCount must be at least 1".into());
        }
        if self.max_generations == 0 {
            return Err("generation budget must be at least 1".into());
        }
        if self.tournament_size == 0 {
            return Err("tournament size must be at least 1".into());
        }
        if !(0.0..=1.0).contains(&self.mutation_probability) {
            return Err("mutationProbability must be within [0, 1]".into());
        }
        if !(0.0..=1.0).contains(&self.crossover_probability) {
            return Err("crossoverProbability must be within [0, 1]".into());
        }
        if !(self.sigma_start > 0.0 && self.sigma_end > 0.0) {
            return Err("mutation sigma ratios must be positive".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GaConfig::default();
        assert_eq!(config.population_size, 50);
        assert_eq!(config.gene_count, 2);
        assert_eq!(config.tournament_size, 3);
        assert!((config.blend_alpha - 0.5).abs() < 1e-12);
        assert!((config.sigma_start - 0.1).abs() < 1e-12);
        assert!((config.sigma_end - 0.0001).abs() < 1e-12);
        assert!(config.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = GaConfig::default()
            .with_population_size(20)
            .with_gene_count(5)
            .with_mutation_probability(0.3)
            .with_crossover_probability(0.7)
            .with_max_generations(10)
            .with_tournament_size(4)
            .with_seed(42);

        assert_eq!(config.population_size, 20);
        assert_eq!(config.gene_count, 5);
        assert!((config.mutation_probability - 0.3).abs() < 1e-12);
        assert!((config.crossover_probability - 0.7).abs() < 1e-12);
        assert_eq!(config.max_generations, 10);
        assert_eq!(config.tournament_size, 4);
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn test_clamp_probabilities() {
        let config = GaConfig::default()
            .with_mutation_probability(2.0)
            .with_crossover_probability(-1.0);
        assert!((config.mutation_probability - 1.0).abs() < 1e-12);
        assert!(config.crossover_probability.abs() < 1e-12);
    }

    #[test]
    fn test_validate_population_too_small() {
        assert!(GaConfig::default().with_population_size(1).validate().is_err());
    }

    #[test]
    fn test_validate_zero_generations() {
        assert!(GaConfig::default().with_max_generations(0).validate().is_err());
    }

    #[test]
    fn test_from_params() {
        let mut values = ParamValues::new();
        values.insert("populationSize".into(), 20.0);
        values.insert("GeneCount".into(), 3.0);
        values.insert("seed".into(), 9.0);

        let config = GaConfig::from_params(&values, 10);
        assert_eq!(config.population_size, 20);
        assert_eq!(config.gene_count, 3);
        assert_eq!(config.max_generations, 10);
        assert_eq!(config.seed, Some(9));
        assert!((config.mutation_probability - 0.1).abs() < 1e-12);
    }
}
