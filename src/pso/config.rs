//! PSO configuration.

use crate::params::{self, ParamInfo, ParamValues};

/// Configuration for Particle Swarm Optimization.
///
/// # Builder Pattern
///
/// ```
/// use u_optsession::pso::PsoConfig;
///
/// let config = PsoConfig::default()
///     .with_swarm_size(40)
///     .with_dimensions(3)
///     .with_inertia(0.6)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PsoConfig {
    /// Number of particles.
    pub swarm_size: usize,

    /// Dimensionality of each position.
    pub dimensions: usize,

    /// Inertia weight `w`.
    pub inertia: f64,

    /// Cognitive coefficient `c1` (pull towards the personal best).
    pub cognitive: f64,

    /// Social coefficient `c2` (pull towards the global best).
    pub social: f64,

    /// Iteration budget.
    pub max_iterations: usize,

    /// Initial velocity bound, as a fraction of the axis width.
    pub initial_velocity: f64,

    /// Factor applied to the velocity after a bound violation.
    pub bounce_damping: f64,

    /// Random seed for reproducibility. `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl Default for PsoConfig {
    fn default() -> Self {
        Self {
            swarm_size: 30,
            dimensions: 2,
            inertia: 0.7,
            cognitive: 1.5,
            social: 1.5,
            max_iterations: 100,
            initial_velocity: 0.1,
            bounce_damping: -0.5,
            seed: None,
        }
    }
}

impl PsoConfig {
    pub const SWARM_SIZE: ParamInfo = ParamInfo {
        name: "swarmSize",
        description: "Number of particles in the swarm",
        lower: 1.0,
        upper: 10_000.0,
        default: 30.0,
        integer: true,
    };

    pub const DIMENSIONS: ParamInfo = ParamInfo {
        name: "dimensions",
        description: "Dimensionality of a particle position",
        lower: 1.0,
        upper: 1_000.0,
        default: 2.0,
        integer: true,
    };

    pub const INERTIA: ParamInfo = ParamInfo {
        name: "w",
        description: "Inertia weight",
        lower: 0.0,
        upper: 1.5,
        default: 0.7,
        integer: false,
    };

    pub const COGNITIVE: ParamInfo = ParamInfo {
        name: "c1",
        description: "Cognitive coefficient",
        lower: 0.0,
        upper: 4.0,
        default: 1.5,
        integer: false,
    };

    pub const SOCIAL: ParamInfo = ParamInfo {
        name: "c2",
        description: "Social coefficient",
        lower: 0.0,
        upper: 4.0,
        default: 1.5,
        integer: false,
    };

    /// Parameter catalogue published for request validation.
    pub const PARAMS: &'static [ParamInfo] = &[
        Self::SWARM_SIZE,
        Self::DIMENSIONS,
        Self::INERTIA,
        Self::COGNITIVE,
        Self::SOCIAL,
    ];

    /// Reads the catalogued parameters from `values`, falling back to
    /// defaults. `steps` becomes the iteration budget.
    pub fn from_params(values: &ParamValues, steps: usize) -> Self {
        Self {
            swarm_size: params::value_or_default(values, &Self::SWARM_SIZE) as usize,
            dimensions: params::value_or_default(values, &Self::DIMENSIONS) as usize,
            inertia: params::value_or_default(values, &Self::INERTIA),
            cognitive: params::value_or_default(values, &Self::COGNITIVE),
            social: params::value_or_default(values, &Self::SOCIAL),
            max_iterations: steps,
            seed: params::seed(values),
            ..Self::default()
        }
    }

    pub fn with_swarm_size(mut self, n: usize) -> Self {
        self.swarm_size = n;
        self
    }

    pub fn with_dimensions(mut self, n: usize) -> Self {
        self.dimensions = n;
        self
    }

    pub fn with_inertia(mut self, w: f64) -> Self {
        self.inertia = w;
        self
    }

    /// Sets `c1` and `c2`.
    pub fn with_coefficients(mut self, c1: f64, c2: f64) -> Self {
        self.cognitive = c1;
        self.social = c2;
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.swarm_size == 0 {
            return Err("swarmSize must be at least 1".into());
        }
        if self.dimensions == 0 {
            return Err("dimensions must be at least 1".into());
        }
        if self.max_iterations == 0 {
            return Err("iteration budget must be at least 1".into());
        }
        for (name, v) in [
            ("w", self.inertia),
            ("c1", self.cognitive),
            ("c2", self.social),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(format!("{name} must be a non-negative number"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PsoConfig::default();
        assert_eq!(config.swarm_size, 30);
        assert_eq!(config.dimensions, 2);
        assert!((config.inertia - 0.7).abs() < 1e-12);
        assert!((config.bounce_damping + 0.5).abs() < 1e-12);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_params() {
        let mut values = ParamValues::new();
        values.insert("SwarmSize".into(), 12.0);
        values.insert("w".into(), 0.4);
        values.insert("c2".into(), 2.0);
        let config = PsoConfig::from_params(&values, 25);
        assert_eq!(config.swarm_size, 12);
        assert_eq!(config.dimensions, 2);
        assert!((config.inertia - 0.4).abs() < 1e-12);
        assert!((config.cognitive - 1.5).abs() < 1e-12);
        assert!((config.social - 2.0).abs() < 1e-12);
        assert_eq!(config.max_iterations, 25);
    }

    #[test]
    fn test_validate() {
        assert!(PsoConfig::default().with_swarm_size(0).validate().is_err());
        assert!(PsoConfig::default().with_dimensions(0).validate().is_err());
        assert!(PsoConfig::default().with_max_iterations(0).validate().is_err());
        assert!(PsoConfig::default().with_inertia(-0.1).validate().is_err());
    }
}
