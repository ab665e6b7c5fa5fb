//! Session lifecycle states.

use std::fmt;

/// Where a session is in its load → run → finish cycle.
///
/// ```text
/// Idle --load--> Loaded --start--> Running <--pause/resume--> Paused
///                  ^  |                \                     /
///                  |  +--load           +--> Completing <---+
///                  |                             |
///   AlgorithmError +                             v
///                                     Idle (or Errored, then Idle)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No request loaded.
    Idle,
    /// A validated request is waiting for `start`.
    Loaded,
    /// The worker is iterating.
    Running,
    /// The worker is parked at a generation boundary.
    Paused,
    /// The worker finished iterating and is emitting its terminal events.
    Completing,
    /// The worker failed; transient before returning to `Idle`.
    Errored,
}

impl SessionState {
    /// Whether a worker thread may be alive.
    pub fn has_worker(self) -> bool {
        matches!(self, Self::Running | Self::Paused | Self::Completing)
    }

    /// Whether a new request may be loaded.
    pub fn accepts_load(self) -> bool {
        matches!(self, Self::Idle | Self::Loaded)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Loaded => "loaded",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Completing => "completing",
            Self::Errored => "errored",
        })
    }
}
