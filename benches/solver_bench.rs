//! Criterion benchmarks for the stepped solvers.
//!
//! Runs whole evaluations on Sphere and Rastrigin to measure per-generation
//! overhead independent of any session plumbing.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use u_optsession::ga::{GaConfig, GeneticAlgorithm};
use u_optsession::objective::{rastrigin, sphere, FnObjective};
use u_optsession::problem::{Bounds, Domain};
use u_optsession::pso::{ParticleSwarm, PsoConfig};
use u_optsession::solver::Solver;

const SPHERE: FnObjective = FnObjective::new("Sphere", 1, sphere);
const RASTRIGIN: FnObjective = FnObjective::new("Rastrigin", 1, rastrigin);

fn domain() -> Domain {
    Domain::new(Bounds::new(-5.12, 5.12))
}

fn run_to_budget(solver: &mut dyn Solver, objective: &FnObjective, steps: usize) -> f64 {
    let mut best = f64::INFINITY;
    for _ in 0..steps {
        if let Ok(r) = solver.step(objective) {
            best = r.best_fitness;
        }
    }
    best
}

// ===========================================================================
// Benchmarks
// ===========================================================================

fn bench_ga_sphere(c: &mut Criterion) {
    let mut group = c.benchmark_group("ga_sphere");
    group.sample_size(10);

    for (dim, pop, gen) in [(10usize, 50usize, 50usize), (50, 100, 30), (100, 100, 20)] {
        let config = GaConfig {
            population_size: pop,
            gene_count: dim,
            max_generations: gen,
            seed: Some(42),
            ..GaConfig::default()
        };
        group.bench_with_input(
            BenchmarkId::new(format!("d{}_p{}_g{}", dim, pop, gen), dim),
            &config,
            |b, c| {
                b.iter(|| {
                    let mut ga = GeneticAlgorithm::new(c.clone(), domain());
                    black_box(run_to_budget(&mut ga, black_box(&SPHERE), gen))
                })
            },
        );
    }
    group.finish();
}

fn bench_pso_sphere(c: &mut Criterion) {
    let mut group = c.benchmark_group("pso_sphere");
    group.sample_size(10);

    for (dim, swarm, iters) in [(10usize, 30usize, 50usize), (50, 60, 30)] {
        let config = PsoConfig {
            swarm_size: swarm,
            dimensions: dim,
            max_iterations: iters,
            seed: Some(42),
            ..PsoConfig::default()
        };
        group.bench_with_input(
            BenchmarkId::new(format!("d{}_s{}_i{}", dim, swarm, iters), dim),
            &config,
            |b, c| {
                b.iter(|| {
                    let mut pso = ParticleSwarm::new(c.clone(), domain());
                    black_box(run_to_budget(&mut pso, black_box(&SPHERE), iters))
                })
            },
        );
    }
    group.finish();
}

fn bench_rastrigin_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("rastrigin_single_step");
    group.sample_size(20);

    group.bench_function("ga_d30_p100", |b| {
        let config = GaConfig::default()
            .with_population_size(100)
            .with_gene_count(30)
            .with_max_generations(1)
            .with_seed(7);
        b.iter(|| {
            let mut ga = GeneticAlgorithm::new(config.clone(), domain());
            black_box(ga.step(&RASTRIGIN).ok())
        })
    });
    group.bench_function("pso_d30_s100", |b| {
        let config = PsoConfig::default()
            .with_swarm_size(100)
            .with_dimensions(30)
            .with_max_iterations(1)
            .with_seed(7);
        b.iter(|| {
            let mut pso = ParticleSwarm::new(config.clone(), domain());
            black_box(pso.step(&RASTRIGIN).ok())
        })
    });
    group.finish();
}

criterion_group!(benches, bench_ga_sphere, bench_pso_sphere, bench_rastrigin_step);
criterion_main!(benches);
