//! Session configuration.

/// Knobs for event cadence and load-time limits.
///
/// # Builder Pattern
///
/// ```
/// use u_optsession::session::SessionConfig;
///
/// let config = SessionConfig::default()
///     .with_progress_interval(5)
///     .with_log_interval(20)
///     .with_max_steps(1_000);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Emit a `progress` event every N generations (and on the last one).
    pub progress_interval: usize,

    /// Emit a `[GEN n]` log line every N generations of an evaluation (and
    /// on its last one).
    pub log_interval: usize,

    /// Largest `Steps` value accepted at load.
    pub max_steps: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            progress_interval: 1,
            log_interval: 10,
            max_steps: 100_000,
        }
    }
}

impl SessionConfig {
    pub fn with_progress_interval(mut self, n: usize) -> Self {
        self.progress_interval = n;
        self
    }

    pub fn with_log_interval(mut self, n: usize) -> Self {
        self.log_interval = n;
        self
    }

    pub fn with_max_steps(mut self, n: usize) -> Self {
        self.max_steps = n;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.progress_interval == 0 {
            return Err("progress interval must be at least 1".into());
        }
        if self.log_interval == 0 {
            return Err("log interval must be at least 1".into());
        }
        if self.max_steps == 0 {
            return Err("max steps must be at least 1".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.progress_interval, 1);
        assert_eq!(config.log_interval, 10);
        assert_eq!(config.max_steps, 100_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero() {
        assert!(SessionConfig::default().with_progress_interval(0).validate().is_err());
        assert!(SessionConfig::default().with_log_interval(0).validate().is_err());
        assert!(SessionConfig::default().with_max_steps(0).validate().is_err());
    }
}
