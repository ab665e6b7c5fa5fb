//! Objective functions and the registry that resolves them by name.
//!
//! Objectives are pure `&[f64] -> f64` maps; lower is better. The solvers
//! never look inside them.
//!
//! Built-ins: Sphere, Rastrigin, Rosenbrock, Beale, Bukin N.6. Names are
//! matched case-insensitively and an optional `Function` suffix is ignored,
//! so `"Sphere"`, `"sphere"`, and `"SphereFunction"` resolve identically.
//!
//! # References
//!
//! - Rastrigin (1974), *Systems of Extremal Control*
//! - Rosenbrock (1960), "An Automatic Method for Finding the Greatest or Least
//!   Value of a Function"
//! - Jamil & Yang (2013), "A Literature Survey of Benchmark Functions for
//!   Global Optimization Problems"

use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

/// A scalar objective to minimize.
pub trait Objective: Send + Sync {
    /// Display name.
    fn name(&self) -> &str;

    /// Evaluates the objective at `x`.
    fn evaluate(&self, x: &[f64]) -> f64;

    /// Smallest dimensionality the objective is defined for.
    fn min_dimensions(&self) -> usize {
        1
    }
}

/// An objective backed by a plain function pointer.
#[derive(Clone, Copy)]
pub struct FnObjective {
    name: &'static str,
    min_dimensions: usize,
    f: fn(&[f64]) -> f64,
}

impl FnObjective {
    pub const fn new(name: &'static str, min_dimensions: usize, f: fn(&[f64]) -> f64) -> Self {
        Self {
            name,
            min_dimensions,
            f,
        }
    }
}

impl fmt::Debug for FnObjective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnObjective")
            .field("name", &self.name)
            .field("min_dimensions", &self.min_dimensions)
            .finish()
    }
}

impl Objective for FnObjective {
    fn name(&self) -> &str {
        self.name
    }

    fn evaluate(&self, x: &[f64]) -> f64 {
        (self.f)(x)
    }

    fn min_dimensions(&self) -> usize {
        self.min_dimensions
    }
}

// ============================================================================
// Built-in benchmark functions
// ============================================================================

/// `f(x) = Σ xᵢ²`, minimum 0 at the origin.
pub fn sphere(x: &[f64]) -> f64 {
    x.iter().map(|v| v * v).sum()
}

/// `f(x) = 10n + Σ (xᵢ² - 10 cos(2π xᵢ))`, minimum 0 at the origin.
pub fn rastrigin(x: &[f64]) -> f64 {
    const A: f64 = 10.0;
    A * x.len() as f64
        + x.iter()
            .map(|v| v * v - A * (2.0 * PI * v).cos())
            .sum::<f64>()
}

/// Rosenbrock valley, minimum 0 at `(1, …, 1)`.
pub fn rosenbrock(x: &[f64]) -> f64 {
    x.windows(2)
        .map(|w| 100.0 * (w[1] - w[0] * w[0]).powi(2) + (1.0 - w[0]).powi(2))
        .sum()
}

/// Beale function on the first two coordinates, minimum 0 at `(3, 0.5)`.
pub fn beale(x: &[f64]) -> f64 {
    let (a, b) = (x[0], x[1]);
    (1.5 - a + a * b).powi(2) + (2.25 - a + a * b * b).powi(2) + (2.625 - a + a * b.powi(3)).powi(2)
}

/// Bukin N.6 on the first two coordinates, minimum 0 at `(-10, 1)`.
pub fn bukin(x: &[f64]) -> f64 {
    let (a, b) = (x[0], x[1]);
    100.0 * (b - 0.01 * a * a).abs().sqrt() + 0.01 * (a + 10.0).abs()
}

// ============================================================================
// Registry
// ============================================================================

/// Name → objective lookup.
///
/// Cheap to clone; entries are shared.
#[derive(Clone, Default)]
pub struct ObjectiveRegistry {
    entries: BTreeMap<String, Arc<dyn Objective>>,
}

impl fmt::Debug for ObjectiveRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

impl ObjectiveRegistry {
    /// An empty registry.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in benchmark catalogue.
    pub fn builtin() -> Self {
        Self::empty()
            .with(FnObjective::new("Sphere", 1, sphere))
            .with(FnObjective::new("Rastrigin", 1, rastrigin))
            .with_alias("Rastragin", "Rastrigin")
            .with(FnObjective::new("Rosenbrock", 2, rosenbrock))
            .with(FnObjective::new("Beale", 2, beale))
            .with(FnObjective::new("Bukin", 2, bukin))
    }

    /// Registers `objective` under its own name.
    pub fn with(mut self, objective: impl Objective + 'static) -> Self {
        self.register(Arc::new(objective));
        self
    }

    /// Registers an existing entry under another name. No-op if `target`
    /// is unknown.
    pub fn with_alias(mut self, alias: &str, target: &str) -> Self {
        if let Some(obj) = self.get(target) {
            self.entries.insert(normalize(alias), obj);
        }
        self
    }

    pub fn register(&mut self, objective: Arc<dyn Objective>) {
        self.entries.insert(normalize(objective.name()), objective);
    }

    /// Resolves `name`, ignoring case and a trailing `Function`.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Objective>> {
        self.entries.get(&normalize(name)).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

fn normalize(name: &str) -> String {
    let lower = name.trim().to_ascii_lowercase();
    match lower.strip_suffix("function") {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => lower,
    }
}
