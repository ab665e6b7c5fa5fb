//! Generation-stepped real-vector GA.
//!
//! [`GeneticAlgorithm`] keeps its population between [`Solver::step`] calls:
//! elite → tournament selection → BLX-α crossover → Gaussian mutation →
//! evaluation, one generation per call.

use super::config::GaConfig;
use super::operators::{annealed_sigma, blend_crossover, gaussian_mutation};
use super::selection::tournament;
use super::types::Individual;
use crate::objective::Objective;
use crate::problem::{Argument, Bounds, Domain};
use crate::solver::{argmin, AlgorithmKind, Solver, SolverError, StepResult};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Real-vector Genetic Algorithm over a box-bounded domain.
///
/// The population is created lazily on the first [`Solver::step`]: seed
/// vectors first, then uniform random individuals up to the population size.
///
/// # Example
///
/// ```
/// use u_optsession::ga::{GaConfig, GeneticAlgorithm};
/// use u_optsession::objective::{sphere, FnObjective};
/// use u_optsession::problem::{Bounds, Domain};
/// use u_optsession::solver::Solver;
///
/// let config = GaConfig::default()
///     .with_population_size(20)
///     .with_max_generations(10)
///     .with_seed(42);
/// let mut ga = GeneticAlgorithm::new(config, Domain::new(Bounds::new(-5.0, 5.0)));
/// let objective = FnObjective::new("Sphere", 1, sphere);
///
/// let first = ga.step(&objective).unwrap();
/// assert_eq!(first.generation, 1);
/// assert_eq!(first.snapshot.len(), 20);
/// ```
pub struct GeneticAlgorithm {
    config: GaConfig,
    bounds: Vec<Bounds>,
    rng: StdRng,
    seeds: Vec<Vec<f64>>,
    population: Vec<Individual>,
    best: Option<Individual>,
    generation: usize,
    evaluations: usize,
}

impl GeneticAlgorithm {
    pub fn new(config: GaConfig, domain: Domain) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::random()),
        };
        let bounds = domain.per_axis(config.gene_count);
        Self {
            config,
            bounds,
            rng,
            seeds: Vec::new(),
            population: Vec::new(),
            best: None,
            generation: 0,
            evaluations: 0,
        }
    }

    /// Uses `seeds` as the first individuals of the initial population.
    ///
    /// Vectors of the wrong length are skipped; values are clamped to the
    /// domain. Extra seeds beyond the population size are ignored.
    pub fn with_seeds(mut self, seeds: &[Argument]) -> Self {
        let n = self.config.gene_count;
        self.seeds = seeds
            .iter()
            .filter(|arg| {
                let fits = arg.values.len() == n;
                if !fits {
                    debug!(
                        "skipping seed of length {} for {n}-gene GA",
                        arg.values.len()
                    );
                }
                fits
            })
            .take(self.config.population_size)
            .map(|arg| {
                arg.values
                    .iter()
                    .zip(&self.bounds)
                    .map(|(&v, b)| b.clamp(v))
                    .collect()
            })
            .collect();
        self
    }

    /// Offsets the generation counter, for resuming a run.
    pub fn with_start_generation(mut self, generation: usize) -> Self {
        self.generation = generation;
        self
    }

    /// Current population (empty before the first step).
    pub fn population(&self) -> &[Individual] {
        &self.population
    }

    pub fn config(&self) -> &GaConfig {
        &self.config
    }

    fn random_genes(&mut self) -> Vec<f64> {
        self.bounds
            .iter()
            .map(|b| self.rng.random_range(b.min..=b.max))
            .collect()
    }

    fn evaluate(
        &mut self,
        objective: &dyn Objective,
        genes: &[f64],
        generation: usize,
    ) -> Result<f64, SolverError> {
        let f = objective.evaluate(genes);
        self.evaluations += 1;
        if f.is_nan() {
            return Err(SolverError::NanFitness {
                objective: objective.name().to_string(),
                generation,
            });
        }
        Ok(f)
    }

    fn initialize(&mut self, objective: &dyn Objective, generation: usize) -> Result<(), SolverError> {
        let mut genes: Vec<Vec<f64>> = std::mem::take(&mut self.seeds);
        while genes.len() < self.config.population_size {
            let g = self.random_genes();
            genes.push(g);
        }

        let mut population = Vec::with_capacity(genes.len());
        for g in genes {
            let fitness = self.evaluate(objective, &g, generation)?;
            population.push(Individual { genes: g, fitness });
        }
        self.population = population;
        self.update_best();
        Ok(())
    }

    fn update_best(&mut self) {
        let Some((idx, fitness)) = argmin(self.population.iter().map(|i| i.fitness)) else {
            return;
        };
        let improved = match &self.best {
            Some(best) => fitness < best.fitness,
            None => true,
        };
        if improved {
            self.best = Some(self.population[idx].clone());
        }
    }

    fn next_generation(&mut self, objective: &dyn Objective, generation: usize) -> Result<(), SolverError> {
        let n = self.config.population_size;
        let sigmas: Vec<f64> = self
            .bounds
            .iter()
            .map(|b| {
                annealed_sigma(
                    b.width(),
                    self.config.sigma_start,
                    self.config.sigma_end,
                    generation - 1,
                    self.config.max_generations,
                )
            })
            .collect();

        // The elite survives unchanged and keeps its fitness.
        let mut next: Vec<Individual> = Vec::with_capacity(n);
        if let Some((idx, _)) = argmin(self.population.iter().map(|i| i.fitness)) {
            next.push(self.population[idx].clone());
        }
        let elite_count = next.len();

        while next.len() < n {
            let p1 = tournament(&self.population, self.config.tournament_size, &mut self.rng);
            let p2 = tournament(&self.population, self.config.tournament_size, &mut self.rng);

            let (c1, c2) = if self.rng.random_bool(self.config.crossover_probability) {
                blend_crossover(
                    &self.population[p1].genes,
                    &self.population[p2].genes,
                    &self.bounds,
                    self.config.blend_alpha,
                    &mut self.rng,
                )
            } else {
                (
                    self.population[p1].genes.clone(),
                    self.population[p2].genes.clone(),
                )
            };

            for mut child in [c1, c2] {
                if next.len() >= n {
                    break;
                }
                gaussian_mutation(
                    &mut child,
                    &self.bounds,
                    &sigmas,
                    self.config.mutation_probability,
                    &mut self.rng,
                );
                next.push(Individual::new(child));
            }
        }

        for ind in &mut next[elite_count..] {
            ind.fitness = self.evaluate(objective, &ind.genes, generation)?;
        }

        self.population = next;
        self.update_best();
        Ok(())
    }
}

impl Solver for GeneticAlgorithm {
    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::Genetic
    }

    fn step(&mut self, objective: &dyn Objective) -> Result<StepResult, SolverError> {
        if self.generation >= self.config.max_generations {
            return Err(SolverError::BudgetExhausted {
                budget: self.config.max_generations,
            });
        }

        let generation = self.generation + 1;
        let before = self.evaluations;

        if self.population.is_empty() {
            self.initialize(objective, generation)?;
        }
        self.next_generation(objective, generation)?;
        self.generation = generation;

        let (best_vector, best_fitness) = match &self.best {
            Some(best) => (best.genes.clone(), best.fitness),
            None => (Vec::new(), f64::INFINITY),
        };

        Ok(StepResult {
            generation,
            best_vector,
            best_fitness,
            evaluations_delta: self.evaluations - before,
            snapshot: self.population.iter().map(|i| i.genes.clone()).collect(),
        })
    }

    fn generation(&self) -> usize {
        self.generation
    }

    fn best(&self) -> Option<(&[f64], f64)> {
        self.best.as_ref().map(|b| (b.genes.as_slice(), b.fitness))
    }

    fn evaluations(&self) -> usize {
        self.evaluations
    }
}
