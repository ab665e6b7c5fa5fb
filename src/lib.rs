//! Session-driven metaheuristic optimization.
//!
//! A client loads an optimization job (algorithm, objective functions,
//! parameters) over a persistent connection and drives it with lifecycle
//! commands while receiving streamed progress, log lines, and a final
//! structured report.
//!
//! - **Solvers**: a real-coded Genetic Algorithm ([`ga`]) and Particle Swarm
//!   Optimization ([`pso`]), both stepped one generation at a time through
//!   the [`solver::Solver`] trait so that a run can be paused or cancelled
//!   between any two generations.
//! - **Session**: the per-connection state machine ([`session`]) that
//!   decodes frames ([`protocol`]), validates requests ([`request`]), and
//!   owns the background [`worker`].
//! - **Control**: the pause gate and cancel token shared by the two sides
//!   ([`control`]).
//! - **Output**: events go through an injected [`sink::EventSink`]; the
//!   terminal [`report::Report`] mirrors the loaded request.
//!
//! # Architecture
//!
//! The foreground context applies inbound frames synchronously. At most one
//! worker thread per session runs the solvers, processing objective
//! functions (or algorithms) strictly in list order. The pause gate and the
//! cancel token are the only state touched from both sides.

pub mod control;
pub mod error;
pub mod ga;
pub mod objective;
pub mod params;
pub mod problem;
pub mod protocol;
pub mod pso;
pub mod report;
pub mod request;
pub mod session;
pub mod sink;
pub mod solver;
pub mod worker;

pub use error::{Result, SessionError};
