//! Per-connection session: lifecycle state, the loaded request, and the
//! active worker.
//!
//! # Key Types
//!
//! - [`Session`]: applies decoded frames, owns the worker
//! - [`SessionState`]: lifecycle state machine
//! - [`SessionConfig`]: event cadence and load limits

mod config;
mod dispatcher;
mod state;

pub use config::SessionConfig;
pub use dispatcher::Session;
pub use state::SessionState;
