//! Swarm member.

/// One particle: current position and velocity plus the best position it
/// has visited.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Vec<f64>,
    pub velocity: Vec<f64>,
    pub fitness: f64,
    pub best_position: Vec<f64>,
    pub best_fitness: f64,
}

impl Particle {
    /// A particle at `position` whose personal best is its start point.
    pub fn new(position: Vec<f64>, velocity: Vec<f64>, fitness: f64) -> Self {
        Self {
            best_position: position.clone(),
            best_fitness: fitness,
            position,
            velocity,
            fitness,
        }
    }

    /// Records the current position as personal best on strict improvement.
    ///
    /// Returns `true` when the personal best moved.
    pub fn update_best(&mut self) -> bool {
        if self.fitness < self.best_fitness {
            self.best_fitness = self.fitness;
            self.best_position.clone_from(&self.position);
            true
        } else {
            false
        }
    }
}
