//! Particle Swarm Optimization.
//!
//! Global-best PSO with inertia weight, stepped one iteration per
//! [`Solver::step`](crate::solver::Solver::step) call. Particles leaving
//! the domain are clamped to the violated bound and bounce back with half
//! their velocity.
//!
//! # References
//!
//! - Kennedy & Eberhart (1995), "Particle Swarm Optimization"
//! - Shi & Eberhart (1998), "A Modified Particle Swarm Optimizer"

mod config;
mod engine;
mod types;

pub use config::PsoConfig;
pub use engine::ParticleSwarm;
pub use types::Particle;
