//! Real-coded Genetic Algorithm.
//!
//! A stepped GA over box-bounded continuous domains. Each call to
//! [`Solver::step`](crate::solver::Solver::step) runs one generation:
//! the single best individual is carried over unchanged, parents are drawn
//! by tournament, recombined with BLX-α, and perturbed by Gaussian noise
//! whose strength anneals over the generation budget.
//!
//! # Key Types
//!
//! - [`GaConfig`]: Algorithm parameters and the published parameter catalogue
//! - [`GeneticAlgorithm`]: The stepped solver
//! - [`Individual`]: One candidate and its fitness
//!
//! # Submodules
//!
//! - [`operators`]: BLX-α crossover, Gaussian mutation, σ schedule
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*
//! - De Jong (2006), *Evolutionary Computation: A Unified Approach*

mod config;
mod engine;
pub mod operators;
mod selection;
mod types;

pub use config::GaConfig;
pub use engine::GeneticAlgorithm;
pub use selection::tournament;
pub use types::Individual;
