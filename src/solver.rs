//! Common contract for generation-stepped solvers.
//!
//! A [`Solver`] advances exactly one generation (GA) or iteration (PSO) per
//! [`Solver::step`] call and keeps its population, velocities, and
//! best-so-far between calls. Nothing runs to completion internally, so the
//! caller can pause or cancel between any two steps.
//!
//! [`SolverSpec`] is the validated, algorithm-specific configuration from
//! which a fresh solver is built for each objective function of a run.

use crate::ga::{GaConfig, GeneticAlgorithm};
use crate::objective::Objective;
use crate::params::{self, ParamInfo, ParamValues};
use crate::problem::{Argument, Domain};
use crate::pso::{ParticleSwarm, PsoConfig};
use std::fmt;
use thiserror::Error;

/// Outcome of a single generation/iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// 1-based generation index just completed.
    pub generation: usize,
    /// Running best position.
    pub best_vector: Vec<f64>,
    /// Running best fitness; non-increasing across steps.
    pub best_fitness: f64,
    /// Objective evaluations performed by this step.
    pub evaluations_delta: usize,
    /// Positions of every individual/particle after the step.
    pub snapshot: Vec<Vec<f64>>,
}

/// Failures inside a solver step.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    #[error("objective '{objective}' returned NaN at generation {generation}")]
    NanFitness { objective: String, generation: usize },

    #[error("generation budget of {budget} exhausted")]
    BudgetExhausted { budget: usize },
}

/// Generation-stepped optimizer.
pub trait Solver: Send {
    /// Which algorithm this is.
    fn kind(&self) -> AlgorithmKind;

    /// Advances one generation against `objective`.
    ///
    /// The first call also initializes and evaluates the starting
    /// population.
    fn step(&mut self, objective: &dyn Objective) -> Result<StepResult, SolverError>;

    /// Generations completed so far (including a resume offset).
    fn generation(&self) -> usize;

    /// Running best `(position, fitness)`, once the first step ran.
    fn best(&self) -> Option<(&[f64], f64)>;

    /// Cumulative objective evaluations.
    fn evaluations(&self) -> usize;
}

// ============================================================================
// Algorithm catalogue
// ============================================================================

/// The algorithms a request can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlgorithmKind {
    Genetic,
    ParticleSwarm,
}

impl AlgorithmKind {
    /// Resolves a client-supplied algorithm name, ignoring case.
    ///
    /// Accepts `GeneticAlgorithm`/`Genetic`/`GA` and
    /// `ParticleSwarmOptimization`/`ParticleSwarm`/`PSO`.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "geneticalgorithm" | "genetic" | "ga" | "genetic algorithm" => Some(Self::Genetic),
            "particleswarmoptimization" | "particleswarm" | "pso" | "particle swarm optimization" => {
                Some(Self::ParticleSwarm)
            }
            _ => None,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Genetic => "Genetic Algorithm",
            Self::ParticleSwarm => "Particle Swarm Optimization",
        }
    }

    /// Parameter metadata used to validate `ParamValues`.
    pub fn param_info(self) -> &'static [ParamInfo] {
        match self {
            Self::Genetic => GaConfig::PARAMS,
            Self::ParticleSwarm => PsoConfig::PARAMS,
        }
    }
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// ============================================================================
// Solver construction
// ============================================================================

/// Validated algorithm configuration.
#[derive(Debug, Clone)]
pub enum SolverSpec {
    Genetic(GaConfig),
    ParticleSwarm(PsoConfig),
}

impl SolverSpec {
    /// Builds the configuration for `kind` from client parameters.
    ///
    /// `steps` is the generation budget of the run.
    pub fn from_params(kind: AlgorithmKind, values: &ParamValues, steps: usize) -> Result<Self, String> {
        params::validate(kind.param_info(), values)?;
        let spec = match kind {
            AlgorithmKind::Genetic => Self::Genetic(GaConfig::from_params(values, steps)),
            AlgorithmKind::ParticleSwarm => Self::ParticleSwarm(PsoConfig::from_params(values, steps)),
        };
        spec.validate()?;
        Ok(spec)
    }

    pub fn kind(&self) -> AlgorithmKind {
        match self {
            Self::Genetic(_) => AlgorithmKind::Genetic,
            Self::ParticleSwarm(_) => AlgorithmKind::ParticleSwarm,
        }
    }

    /// Dimensionality of candidate vectors.
    pub fn dimensions(&self) -> usize {
        match self {
            Self::Genetic(c) => c.gene_count,
            Self::ParticleSwarm(c) => c.dimensions,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::Genetic(c) => c.validate(),
            Self::ParticleSwarm(c) => c.validate(),
        }
    }

    /// Builds a fresh solver over `domain`.
    ///
    /// `seeds` pre-populate the first individuals/particles; `start_generation`
    /// offsets the generation counter when resuming a run.
    pub fn build(&self, domain: Domain, seeds: &[Argument], start_generation: usize) -> Box<dyn Solver> {
        match self {
            Self::Genetic(c) => Box::new(
                GeneticAlgorithm::new(c.clone(), domain)
                    .with_seeds(seeds)
                    .with_start_generation(start_generation),
            ),
            Self::ParticleSwarm(c) => Box::new(
                ParticleSwarm::new(c.clone(), domain)
                    .with_seeds(seeds)
                    .with_start_generation(start_generation),
            ),
        }
    }
}

/// Index and value of the lowest fitness; ties keep the first.
///
/// NaNs must be rejected before calling.
pub(crate) fn argmin(fitness: impl Iterator<Item = f64>) -> Option<(usize, f64)> {
    fitness
        .enumerate()
        .fold(None, |best, (i, f)| match best {
            Some((_, bf)) if bf <= f => best,
            _ => Some((i, f)),
        })
}
