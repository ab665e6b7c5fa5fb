//! The per-connection command dispatcher.

use super::config::SessionConfig;
use super::state::SessionState;
use crate::control::{self, CancelToken, PauseGate};
use crate::error::{Result, SessionError};
use crate::objective::ObjectiveRegistry;
use crate::protocol::{self, Action, Command};
use crate::report::Report;
use crate::request::Request;
use crate::sink::{Event, EventSink};
use crate::worker::{RunPlan, Worker, WorkerHandle, WorkerOutcome};
use log::{debug, error, info, warn};
use std::sync::Arc;

/// Owner of one connection's lifecycle.
///
/// All methods run on the foreground context; the only thing shared with
/// the worker thread is the pause gate, the cancel token, and the sink.
/// The worker is reaped lazily: every entry point first checks whether it
/// has finished.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use u_optsession::session::{Session, SessionState};
/// use u_optsession::sink::MemorySink;
///
/// let sink = Arc::new(MemorySink::new());
/// let mut session = Session::new(sink.clone());
/// session.handle_frame(r#"{
///     "MessageType": "REQUEST",
///     "Request": { "Type": "Algorithm", "Body": {
///         "AlgorithmName": "GeneticAlgorithm",
///         "ParamValues": { "populationSize": 10 },
///         "Steps": 3,
///         "FunctionList": [{ "FunctionName": "Sphere", "minValue": -5, "maxValue": 5 }]
///     } }
/// }"#);
/// assert_eq!(session.state(), SessionState::Loaded);
///
/// session.handle_frame(r#"{ "Command": { "RequestedState": "start" } }"#);
/// session.wait();
/// assert_eq!(session.state(), SessionState::Idle);
/// assert!(sink.last_report().is_some());
/// ```
pub struct Session {
    config: SessionConfig,
    registry: ObjectiveRegistry,
    sink: Arc<dyn EventSink>,
    state: SessionState,
    loaded: Option<(Request, Report)>,
    worker: Option<WorkerHandle>,
    gate: PauseGate,
    cancel: CancelToken,
    last_outcome: Option<WorkerOutcome>,
}

impl Session {
    /// A session with the built-in objectives and default configuration.
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self {
            config: SessionConfig::default(),
            registry: ObjectiveRegistry::builtin(),
            sink,
            state: SessionState::Idle,
            loaded: None,
            worker: None,
            gate: PauseGate::new(),
            cancel: CancelToken::new(),
            last_outcome: None,
        }
    }

    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the objective catalogue.
    pub fn with_registry(mut self, registry: ObjectiveRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Current state, after reaping a finished worker.
    pub fn state(&mut self) -> SessionState {
        self.reap();
        match (&self.worker, self.state) {
            (Some(w), SessionState::Running | SessionState::Paused) if w.is_completing() => {
                SessionState::Completing
            }
            (_, state) => state,
        }
    }

    /// The loaded request, if any.
    pub fn request(&self) -> Option<&Request> {
        self.loaded.as_ref().map(|(r, _)| r)
    }

    /// How the most recent run ended.
    pub fn last_outcome(&self) -> Option<&WorkerOutcome> {
        self.last_outcome.as_ref()
    }

    /// Decodes and applies one inbound frame. Failures become `error`
    /// events; none of them ends the session.
    pub fn handle_frame(&mut self, frame: &str) {
        let result = protocol::decode(frame).and_then(|action| self.apply(action));
        if let Err(e) = result {
            self.reject(&e);
        }
    }

    /// Like [`handle_frame`](Self::handle_frame) for a raw frame straight
    /// off the transport. Invalid UTF-8 becomes a protocol `error` event.
    pub fn handle_bytes(&mut self, frame: &[u8]) {
        match std::str::from_utf8(frame) {
            Ok(text) => self.handle_frame(text),
            Err(e) => self.reject(&SessionError::protocol(format!(
                "malformed frame: invalid UTF-8 at byte {}",
                e.valid_up_to()
            ))),
        }
    }

    pub fn apply(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Load(request) => self.load(request),
            Action::Issue(command) => self.command(command),
        }
    }

    /// Validates and stores `request`, replacing any previous one.
    pub fn load(&mut self, request: Request) -> Result<()> {
        if !self.state().accepts_load() {
            return Err(SessionError::validation("Algorithm already is started"));
        }
        request.validate(self.config.max_steps)?;

        let report = Report::skeleton(&request);
        info!(
            "loaded request: {} evaluation(s) of {} steps",
            request.job_count(),
            request.steps()
        );
        self.loaded = Some((request, report));
        self.transition(SessionState::Loaded);
        Ok(())
    }

    pub fn command(&mut self, command: Command) -> Result<()> {
        debug!("command {command} in state {}", self.state);
        match command {
            Command::Start => self.start(),
            Command::Pause => self.pause(),
            Command::Resume => self.resume(),
            Command::Stop => self.stop(),
        }
    }

    fn start(&mut self) -> Result<()> {
        match self.state() {
            SessionState::Loaded => {}
            SessionState::Idle | SessionState::Errored => {
                return Err(SessionError::validation("No request loaded"))
            }
            _ => return Err(SessionError::validation("Algorithm already is started")),
        }
        let Some((request, report)) = self.loaded.as_ref() else {
            return Err(SessionError::validation("No request loaded"));
        };

        // Name resolution failures leave the session Loaded.
        let plan = RunPlan::build(request, &self.registry)?;

        self.gate = PauseGate::new();
        self.cancel = CancelToken::new();
        let worker = Worker::new(
            plan,
            report.clone(),
            Arc::clone(&self.sink),
            self.gate.clone(),
            self.cancel.clone(),
            self.config.clone(),
        );
        let handle = worker
            .spawn()
            .map_err(|e| SessionError::runtime(format!("failed to start worker: {e}")))?;

        self.worker = Some(handle);
        self.last_outcome = None;
        self.transition(SessionState::Running);
        info!("algorithm started");
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        match self.state() {
            SessionState::Running => {
                self.gate.close();
                self.transition(SessionState::Paused);
                Ok(())
            }
            SessionState::Paused => Err(SessionError::validation("Algorithm is already paused")),
            SessionState::Completing => Err(SessionError::validation("Algorithm is completing")),
            _ => Err(SessionError::validation("Algorithm is not running")),
        }
    }

    fn resume(&mut self) -> Result<()> {
        match self.state() {
            SessionState::Paused => {
                self.gate.open();
                self.transition(SessionState::Running);
                Ok(())
            }
            SessionState::Completing => Err(SessionError::validation("Algorithm is completing")),
            _ => Err(SessionError::validation("Algorithm is not paused")),
        }
    }

    fn stop(&mut self) -> Result<()> {
        if !self.state().has_worker() {
            return Err(SessionError::validation("Algorithm is not running"));
        }
        let Some(worker) = self.worker.take() else {
            return Err(SessionError::validation("Algorithm is not running"));
        };
        control::stop(&self.cancel, &self.gate);
        let outcome = worker.join();
        info!("algorithm has stopped");
        self.finish(outcome);
        Ok(())
    }

    /// Blocks until the current worker, if any, has returned.
    pub fn wait(&mut self) {
        if let Some(worker) = self.worker.take() {
            let outcome = worker.join();
            self.finish(outcome);
        }
    }

    /// Cancels and joins any live worker. Called on disconnect and drop.
    pub fn shutdown(&mut self) {
        if let Some(worker) = self.worker.take() {
            debug!("shutting down live worker");
            control::stop(&self.cancel, &self.gate);
            let outcome = worker.join();
            self.finish(outcome);
        }
    }

    fn reap(&mut self) {
        if self.worker.as_ref().is_some_and(WorkerHandle::is_finished) {
            self.wait();
        }
    }

    fn finish(&mut self, outcome: WorkerOutcome) {
        match &outcome {
            WorkerOutcome::Completed => info!("run finished"),
            WorkerOutcome::Cancelled => info!("run cancelled"),
            WorkerOutcome::Failed(e) => {
                self.transition(SessionState::Errored);
                error!("worker failed ({} error): {e}", e.kind());
            }
        }
        self.loaded = None;
        self.last_outcome = Some(outcome);
        self.transition(SessionState::Idle);
    }

    fn transition(&mut self, next: SessionState) {
        if self.state != next {
            debug!("session {} -> {next}", self.state);
            self.state = next;
        }
    }

    fn reject(&self, e: &SessionError) {
        warn!("rejected frame ({} error): {e}", e.kind());
        self.sink.emit(Event::error(e.to_string()));
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.shutdown();
    }
}
