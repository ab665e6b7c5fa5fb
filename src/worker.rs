//! Background execution of a loaded run.
//!
//! [`RunPlan::build`] resolves every algorithm and objective name up front,
//! so a bad name is reported before any thread starts. [`Worker::spawn`]
//! then drives one fresh solver per job on a dedicated thread, one
//! generation at a time, checking the pause gate and the cancel token at
//! every generation boundary.
//!
//! Whatever happens, a worker ends by emitting an optional `error`, the
//! report, and `done`, in that order.

use crate::control::{CancelToken, PauseGate};
use crate::error::{Result, SessionError};
use crate::objective::{Objective, ObjectiveRegistry};
use crate::problem::Argument;
use crate::report::Report;
use crate::request::{AlgorithmInfo, FunctionInfo, Request};
use crate::session::SessionConfig;
use crate::sink::{Event, EventSink};
use crate::solver::{AlgorithmKind, SolverSpec, StepResult};
use log::{error, info};
use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// One algorithm × objective evaluation.
pub struct Job {
    pub function: FunctionInfo,
    pub algorithm: AlgorithmInfo,
    pub objective: Arc<dyn Objective>,
    pub spec: SolverSpec,
}

impl Job {
    fn resolve(
        function: &FunctionInfo,
        algorithm: &AlgorithmInfo,
        steps: usize,
        registry: &ObjectiveRegistry,
    ) -> Result<Self> {
        let kind = AlgorithmKind::parse(&algorithm.algorithm_name).ok_or_else(|| {
            SessionError::algorithm(format!("Unknown algorithm '{}'", algorithm.algorithm_name))
        })?;
        let objective = registry.get(&function.function_name).ok_or_else(|| {
            SessionError::algorithm(format!("Unknown function '{}'", function.function_name))
        })?;
        let spec = SolverSpec::from_params(kind, &algorithm.param_values, steps)
            .map_err(SessionError::validation)?;
        if spec.dimensions() < objective.min_dimensions() {
            return Err(SessionError::algorithm(format!(
                "{} needs at least {} dimensions, {} has {}",
                objective.name(),
                objective.min_dimensions(),
                kind,
                spec.dimensions()
            )));
        }
        Ok(Self {
            function: function.clone(),
            algorithm: algorithm.clone(),
            objective,
            spec,
        })
    }

    fn label(&self) -> String {
        format!("{} on {}", self.spec.kind(), self.objective.name())
    }
}

/// Fully resolved run: jobs in list order plus shared run settings.
pub struct RunPlan {
    pub jobs: Vec<Job>,
    pub steps: usize,
    pub start_step: usize,
    pub arguments: Vec<Argument>,
}

impl RunPlan {
    /// Resolves every name in `request`. The request must already be
    /// validated.
    pub fn build(request: &Request, registry: &ObjectiveRegistry) -> Result<Self> {
        let steps = usize::try_from(request.steps())
            .map_err(|_| SessionError::validation("Steps must be positive"))?;
        let start_step = usize::try_from(request.start_step())
            .map_err(|_| SessionError::validation("Step must not be negative"))?;

        let jobs = match request {
            Request::Algorithm(r) => r
                .function_list
                .iter()
                .map(|f| Job::resolve(f, &r.algorithm, steps, registry))
                .collect::<Result<Vec<_>>>()?,
            Request::Function(r) => r
                .algorithms
                .iter()
                .map(|a| Job::resolve(&r.function, a, steps, registry))
                .collect::<Result<Vec<_>>>()?,
        };

        Ok(Self {
            jobs,
            steps,
            start_step,
            arguments: request.arguments().to_vec(),
        })
    }

    /// Generations the whole run will perform.
    pub fn total_generations(&self) -> usize {
        self.jobs.len() * self.steps.saturating_sub(self.start_step)
    }
}

/// How a worker ended.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerOutcome {
    Completed,
    Cancelled,
    Failed(SessionError),
}

enum Flow {
    Completed,
    Cancelled,
}

/// Handle to a running worker thread.
pub struct WorkerHandle {
    thread: JoinHandle<WorkerOutcome>,
    completing: Arc<AtomicBool>,
}

impl WorkerHandle {
    /// The thread has returned.
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Iteration is over and terminal events are being emitted.
    pub fn is_completing(&self) -> bool {
        self.completing.load(Ordering::SeqCst)
    }

    /// Blocks until the worker returns.
    pub fn join(self) -> WorkerOutcome {
        self.thread.join().unwrap_or_else(|payload| {
            WorkerOutcome::Failed(SessionError::runtime(format!(
                "worker thread panicked: {}",
                panic_message(payload.as_ref())
            )))
        })
    }
}

/// Drives a [`RunPlan`] on its own thread.
pub struct Worker {
    plan: RunPlan,
    report: Report,
    sink: Arc<dyn EventSink>,
    gate: PauseGate,
    cancel: CancelToken,
    config: SessionConfig,
    completing: Arc<AtomicBool>,
    total: usize,
    done: usize,
}

impl Worker {
    pub fn new(
        plan: RunPlan,
        report: Report,
        sink: Arc<dyn EventSink>,
        gate: PauseGate,
        cancel: CancelToken,
        config: SessionConfig,
    ) -> Self {
        Self {
            total: plan.total_generations(),
            plan,
            report,
            sink,
            gate,
            cancel,
            config,
            completing: Arc::new(AtomicBool::new(false)),
            done: 0,
        }
    }

    /// Starts the worker thread.
    pub fn spawn(self) -> io::Result<WorkerHandle> {
        let completing = Arc::clone(&self.completing);
        let thread = thread::Builder::new()
            .name("solver-worker".into())
            .spawn(move || self.run())?;
        Ok(WorkerHandle { thread, completing })
    }

    /// Runs every job, then emits the terminal events.
    pub fn run(mut self) -> WorkerOutcome {
        let outcome = match self.run_jobs() {
            Ok(Flow::Completed) => WorkerOutcome::Completed,
            Ok(Flow::Cancelled) => WorkerOutcome::Cancelled,
            Err(e) => WorkerOutcome::Failed(e),
        };
        self.completing.store(true, Ordering::SeqCst);

        match &outcome {
            WorkerOutcome::Completed => info!("run completed"),
            WorkerOutcome::Cancelled => info!("run cancelled after {} generations", self.done),
            WorkerOutcome::Failed(e) => {
                error!("run failed: {e}");
                self.sink.emit(Event::error(e.to_string()));
            }
        }
        self.sink.emit(Event::Report(self.report.clone()));
        self.sink.emit(Event::Done);
        outcome
    }

    fn run_jobs(&mut self) -> Result<Flow> {
        let jobs = std::mem::take(&mut self.plan.jobs);
        for job in &jobs {
            if let Flow::Cancelled = self.run_job(job)? {
                return Ok(Flow::Cancelled);
            }
        }
        Ok(Flow::Completed)
    }

    fn run_job(&mut self, job: &Job) -> Result<Flow> {
        self.gate.wait_open();
        if self.cancel.is_cancelled() {
            return Ok(Flow::Cancelled);
        }

        let label = job.label();
        info!("starting {label}");
        self.sink.emit(Event::log(format!("Starting {label}")));

        let (steps, start) = (self.plan.steps, self.plan.start_step);
        let index = self
            .report
            .create_evaluation(&job.function, &job.algorithm, start);
        let mut solver = job
            .spec
            .build(job.function.domain(), &self.plan.arguments, start);

        for _ in start..steps {
            self.gate.wait_open();
            if self.cancel.is_cancelled() {
                return Ok(Flow::Cancelled);
            }

            let objective = job.objective.as_ref();
            let result = panic::catch_unwind(AssertUnwindSafe(|| solver.step(objective)))
                .map_err(|payload| {
                    SessionError::runtime(format!(
                        "{label} panicked: {}",
                        panic_message(payload.as_ref())
                    ))
                })?
                .map_err(|e| SessionError::runtime(format!("{label}: {e}")))?;

            self.report.record(index, &result)?;
            self.done += 1;
            self.emit_progress(index, &result, steps);
        }

        if let Some((_, f)) = solver.best() {
            info!("finished {label}: FBest {f}, {} evaluations", solver.evaluations());
        }
        Ok(Flow::Completed)
    }

    fn emit_progress(&self, index: usize, result: &StepResult, steps: usize) {
        if self.done % self.config.progress_interval == 0 || self.done == self.total {
            let pct = 100.0 * self.done as f64 / self.total.max(1) as f64;
            self.sink.emit(Event::Progress(pct));
        }
        if result.generation % self.config.log_interval == 0 || result.generation == steps {
            let evaluations = self.report.evaluation_count(index).unwrap_or(0);
            self.sink.emit(Event::log(format!(
                "[GEN {}] FBest: {}, evaluations: {}",
                result.generation, result.best_fitness, evaluations
            )));
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
