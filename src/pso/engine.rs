//! Stepped global-best PSO.

use super::config::PsoConfig;
use super::types::Particle;
use crate::objective::Objective;
use crate::problem::{Argument, Bounds, Domain};
use crate::solver::{argmin, AlgorithmKind, Solver, SolverError, StepResult};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Particle swarm over a box-bounded domain.
///
/// The swarm is created lazily on the first [`Solver::step`]. The global
/// best is refreshed once per iteration from the personal bests, so every
/// particle in an iteration steers towards the same attractor.
///
/// # Example
///
/// ```
/// use u_optsession::objective::{sphere, FnObjective};
/// use u_optsession::problem::{Bounds, Domain};
/// use u_optsession::pso::{ParticleSwarm, PsoConfig};
/// use u_optsession::solver::Solver;
///
/// let config = PsoConfig::default().with_max_iterations(5).with_seed(1);
/// let mut pso = ParticleSwarm::new(config, Domain::new(Bounds::new(-5.0, 5.0)));
/// let objective = FnObjective::new("Sphere", 1, sphere);
///
/// let mut last = f64::INFINITY;
/// for _ in 0..5 {
///     let r = pso.step(&objective).unwrap();
///     assert!(r.best_fitness <= last);
///     last = r.best_fitness;
/// }
/// ```
pub struct ParticleSwarm {
    config: PsoConfig,
    bounds: Vec<Bounds>,
    rng: StdRng,
    seeds: Vec<Vec<f64>>,
    swarm: Vec<Particle>,
    global_best: Option<(Vec<f64>, f64)>,
    iteration: usize,
    evaluations: usize,
}

impl ParticleSwarm {
    pub fn new(config: PsoConfig, domain: Domain) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::random()),
        };
        let bounds = domain.per_axis(config.dimensions);
        Self {
            config,
            bounds,
            rng,
            seeds: Vec::new(),
            swarm: Vec::new(),
            global_best: None,
            iteration: 0,
            evaluations: 0,
        }
    }

    /// Starts the first particles at `seeds`.
    ///
    /// Vectors of the wrong length are skipped; values are clamped to the
    /// domain. Extra seeds beyond the swarm size are ignored.
    pub fn with_seeds(mut self, seeds: &[Argument]) -> Self {
        let n = self.config.dimensions;
        self.seeds = seeds
            .iter()
            .filter(|arg| {
                if arg.values.len() != n {
                    debug!("skipping seed of length {} for {n}-D swarm", arg.values.len());
                    return false;
                }
                true
            })
            .take(self.config.swarm_size)
            .map(|arg| {
                arg.values
                    .iter()
                    .zip(&self.bounds)
                    .map(|(&v, b)| b.clamp(v))
                    .collect()
            })
            .collect();
        self
    }

    /// Offsets the iteration counter, for resuming a run.
    pub fn with_start_generation(mut self, iteration: usize) -> Self {
        self.iteration = iteration;
        self
    }

    /// Current swarm (empty before the first step).
    pub fn swarm(&self) -> &[Particle] {
        &self.swarm
    }

    pub fn config(&self) -> &PsoConfig {
        &self.config
    }

    fn evaluate(
        &mut self,
        objective: &dyn Objective,
        x: &[f64],
        iteration: usize,
    ) -> Result<f64, SolverError> {
        let f = objective.evaluate(x);
        self.evaluations += 1;
        if f.is_nan() {
            return Err(SolverError::NanFitness {
                objective: objective.name().to_string(),
                generation: iteration,
            });
        }
        Ok(f)
    }

    fn initialize(&mut self, objective: &dyn Objective, iteration: usize) -> Result<(), SolverError> {
        let mut positions = std::mem::take(&mut self.seeds);
        while positions.len() < self.config.swarm_size {
            let x = self
                .bounds
                .iter()
                .map(|b| self.rng.random_range(b.min..=b.max))
                .collect();
            positions.push(x);
        }

        let mut swarm = Vec::with_capacity(positions.len());
        for x in positions {
            let v = self
                .bounds
                .iter()
                .map(|b| {
                    let vmax = self.config.initial_velocity * b.width();
                    self.rng.random_range(-vmax..=vmax)
                })
                .collect();
            let f = self.evaluate(objective, &x, iteration)?;
            swarm.push(Particle::new(x, v, f));
        }
        self.swarm = swarm;
        self.update_global_best();
        Ok(())
    }

    fn update_global_best(&mut self) {
        let Some((idx, fitness)) = argmin(self.swarm.iter().map(|p| p.best_fitness)) else {
            return;
        };
        let improved = match &self.global_best {
            Some((_, best)) => fitness < *best,
            None => true,
        };
        if improved {
            self.global_best = Some((self.swarm[idx].best_position.clone(), fitness));
        }
    }

    fn iterate(&mut self, objective: &dyn Objective, iteration: usize) -> Result<(), SolverError> {
        let Some((gbest, _)) = self.global_best.clone() else {
            return Ok(());
        };
        let PsoConfig {
            inertia: w,
            cognitive: c1,
            social: c2,
            bounce_damping,
            ..
        } = self.config;

        for i in 0..self.swarm.len() {
            let p = &mut self.swarm[i];
            for d in 0..p.position.len() {
                let r1: f64 = self.rng.random();
                let r2: f64 = self.rng.random();
                p.velocity[d] = w * p.velocity[d]
                    + c1 * r1 * (p.best_position[d] - p.position[d])
                    + c2 * r2 * (gbest[d] - p.position[d]);
                p.position[d] += p.velocity[d];

                let b = self.bounds[d];
                if !b.contains(p.position[d]) {
                    p.position[d] = b.clamp(p.position[d]);
                    p.velocity[d] *= bounce_damping;
                }
            }

            let x = self.swarm[i].position.clone();
            let f = self.evaluate(objective, &x, iteration)?;
            let p = &mut self.swarm[i];
            p.fitness = f;
            p.update_best();
        }

        self.update_global_best();
        Ok(())
    }
}

impl Solver for ParticleSwarm {
    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::ParticleSwarm
    }

    fn step(&mut self, objective: &dyn Objective) -> Result<StepResult, SolverError> {
        if self.iteration >= self.config.max_iterations {
            return Err(SolverError::BudgetExhausted {
                budget: self.config.max_iterations,
            });
        }

        let iteration = self.iteration + 1;
        let before = self.evaluations;

        if self.swarm.is_empty() {
            self.initialize(objective, iteration)?;
        }
        self.iterate(objective, iteration)?;
        self.iteration = iteration;

        let (best_vector, best_fitness) = self
            .global_best
            .clone()
            .unwrap_or((Vec::new(), f64::INFINITY));

        Ok(StepResult {
            generation: iteration,
            best_vector,
            best_fitness,
            evaluations_delta: self.evaluations - before,
            snapshot: self.swarm.iter().map(|p| p.position.clone()).collect(),
        })
    }

    fn generation(&self) -> usize {
        self.iteration
    }

    fn best(&self) -> Option<(&[f64], f64)> {
        self.global_best.as_ref().map(|(x, f)| (x.as_slice(), *f))
    }

    fn evaluations(&self) -> usize {
        self.evaluations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objective::{rosenbrock, sphere, FnObjective};
    use proptest::prelude::*;

    const SPHERE: FnObjective = FnObjective::new("Sphere", 1, sphere);

    fn seeded(size: usize, dims: usize, iters: usize, seed: u64) -> ParticleSwarm {
        let config = PsoConfig::default()
            .with_swarm_size(size)
            .with_dimensions(dims)
            .with_max_iterations(iters)
            .with_seed(seed);
        ParticleSwarm::new(config, Domain::new(Bounds::new(-5.0, 5.0)))
    }

    #[test]
    fn test_lazy_initialization() {
        let mut pso = seeded(10, 2, 5, 1);
        assert!(pso.swarm().is_empty());
        let r = pso.step(&SPHERE).unwrap();
        assert_eq!(pso.swarm().len(), 10);
        // 10 initial evaluations + 10 after the first move.
        assert_eq!(r.evaluations_delta, 20);
        let r = pso.step(&SPHERE).unwrap();
        assert_eq!(r.evaluations_delta, 10);
        assert_eq!(r.generation, 2);
    }

    #[test]
    fn test_initial_velocity_bounded() {
        let config = PsoConfig::default()
            .with_swarm_size(50)
            .with_max_iterations(1)
            .with_inertia(1.0)
            .with_coefficients(0.0, 0.0)
            .with_seed(3);
        let mut pso = ParticleSwarm::new(config, Domain::new(Bounds::new(-5.0, 5.0)));
        pso.step(&SPHERE).unwrap();
        // w = 1 and c1 = c2 = 0 keep the initial velocity, or damp it on a
        // bounce. Either way it stays within 0.1 of the axis width.
        for p in pso.swarm() {
            assert!(p.velocity.iter().all(|v| v.abs() <= 1.0));
        }
    }

    #[test]
    fn test_global_best_is_min_personal_best() {
        let mut pso = seeded(20, 3, 10, 9);
        for _ in 0..10 {
            let r = pso.step(&SPHERE).unwrap();
            let min_pbest = pso
                .swarm()
                .iter()
                .map(|p| p.best_fitness)
                .fold(f64::INFINITY, f64::min);
            assert_eq!(r.best_fitness, min_pbest);
        }
    }

    #[test]
    fn test_seeds_used_first() {
        let seeds = vec![Argument::from(vec![0.0, 0.0]), Argument::from(vec![1.0])];
        let mut pso = seeded(5, 2, 3, 2).with_seeds(&seeds);
        let r = pso.step(&SPHERE).unwrap();
        assert_eq!(r.best_fitness, 0.0);
        assert_eq!(r.best_vector, vec![0.0, 0.0]);
    }

    #[test]
    fn test_budget_exhausted() {
        let mut pso = seeded(5, 2, 1, 2);
        pso.step(&SPHERE).unwrap();
        assert_eq!(
            pso.step(&SPHERE),
            Err(SolverError::BudgetExhausted { budget: 1 })
        );
    }

    #[test]
    fn test_nan_fitness() {
        let nan = FnObjective::new("Nan", 1, |_| f64::NAN);
        let mut pso = seeded(5, 2, 3, 1);
        assert!(matches!(
            pso.step(&nan),
            Err(SolverError::NanFitness { generation: 1, .. })
        ));
    }

    #[test]
    fn test_secondary_bounds_respected() {
        let config = PsoConfig::default()
            .with_swarm_size(30)
            .with_dimensions(2)
            .with_max_iterations(10)
            .with_seed(11);
        let domain = Domain::new(Bounds::new(-5.0, 5.0)).with_secondary(Bounds::new(0.0, 0.5));
        let mut pso = ParticleSwarm::new(config, domain);
        for _ in 0..10 {
            let r = pso.step(&SPHERE).unwrap();
            assert!(r.snapshot.iter().all(|x| (0.0..=0.5).contains(&x[1])));
            assert!(r.snapshot.iter().all(|x| (-5.0..=5.0).contains(&x[0])));
            assert!((0.0..=0.5).contains(&r.best_vector[1]));
        }
        for p in pso.swarm() {
            assert!((0.0..=0.5).contains(&p.best_position[1]));
        }
    }

    #[test]
    fn test_converges_on_rosenbrock() {
        let objective = FnObjective::new("Rosenbrock", 2, rosenbrock);
        let mut pso = seeded(30, 2, 100, 17);
        let first = pso.step(&objective).unwrap();
        let mut last = first.clone();
        for _ in 1..100 {
            last = pso.step(&objective).unwrap();
        }
        assert!(last.best_fitness < first.best_fitness || first.best_fitness == 0.0);
        assert!(last.best_fitness < 1.0, "got {}", last.best_fitness);
    }

    proptest! {
        #[test]
        fn prop_positions_stay_in_bounds(seed in 0u64..500, dims in 1usize..5) {
            let mut pso = seeded(8, dims, 10, seed);
            let mut prev = f64::INFINITY;
            for _ in 0..10 {
                let r = pso.step(&SPHERE).unwrap();
                prop_assert!(r.best_fitness <= prev);
                prev = r.best_fitness;
                for x in &r.snapshot {
                    prop_assert!(x.iter().all(|v| (-5.0..=5.0).contains(v)));
                }
            }
        }
    }
}
