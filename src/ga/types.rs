//! Population member for the real-vector GA.

/// A candidate solution: one gene per axis plus its fitness.
///
/// Fitness is `f64::INFINITY` until the individual has been evaluated.
/// Lower fitness is better (minimization).
#[derive(Debug, Clone, PartialEq)]
pub struct Individual {
    pub genes: Vec<f64>,
    pub fitness: f64,
}

impl Individual {
    /// An unevaluated individual.
    pub fn new(genes: Vec<f64>) -> Self {
        Self {
            genes,
            fitness: f64::INFINITY,
        }
    }

    pub fn is_evaluated(&self) -> bool {
        self.fitness.is_finite()
    }
}
