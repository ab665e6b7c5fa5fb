//! Run report accumulated by the worker.
//!
//! A [`Report`] mirrors the loaded [`Request`]: an algorithm sweep produces
//! an [`AlgorithmReport`] with one [`Evaluation`] per objective function, a
//! function sweep a [`FunctionReport`] with one per algorithm. Each
//! evaluation keeps the running best, the last population snapshot, and one
//! [`GenerationRecord`] per completed generation.
//!
//! The skeleton is built at load time so that a run cancelled before its
//! first generation still serializes to a well-formed report.

use crate::error::{Result, SessionError};
use crate::request::{AlgorithmInfo, FunctionInfo, Request};
use crate::solver::StepResult;
use serde::{Deserialize, Serialize};

/// Best-so-far after one generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    #[serde(rename = "Generation")]
    pub generation: usize,

    #[serde(rename = "FBest")]
    pub f_best: Option<f64>,

    #[serde(rename = "XBest")]
    pub x_best: Option<Vec<f64>>,
}

/// History of one solver instance on one objective.
///
/// `subject` names what varies across the report: the objective function for
/// an algorithm sweep, the algorithm for a function sweep. Its fields are
/// flattened into the evaluation object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation<S> {
    #[serde(flatten)]
    pub subject: S,

    /// Generation the evaluation started from.
    #[serde(rename = "Step")]
    pub step: usize,

    #[serde(rename = "FBest")]
    pub f_best: Option<f64>,

    #[serde(rename = "XBest")]
    pub x_best: Option<Vec<f64>>,

    /// Population or swarm positions after the last recorded generation.
    #[serde(rename = "XFinal", default)]
    pub x_final: Vec<Vec<f64>>,

    #[serde(rename = "EvaluationCount", default)]
    pub evaluation_count: usize,

    #[serde(rename = "Generations", default)]
    pub generations: Vec<GenerationRecord>,
}

impl<S> Evaluation<S> {
    fn new(subject: S, step: usize) -> Self {
        Self {
            subject,
            step,
            f_best: None,
            x_best: None,
            x_final: Vec::new(),
            evaluation_count: 0,
            generations: Vec::new(),
        }
    }

    /// Last generation recorded, or the starting step.
    pub fn last_generation(&self) -> usize {
        self.generations
            .last()
            .map_or(self.step, |g| g.generation)
    }

    fn record(&mut self, result: &StepResult) {
        let f_best = finite(result.best_fitness);
        let x_best = (!result.best_vector.is_empty()).then(|| result.best_vector.clone());
        self.generations.push(GenerationRecord {
            generation: result.generation,
            f_best,
            x_best: x_best.clone(),
        });
        self.f_best = f_best;
        self.x_best = x_best;
        self.x_final.clone_from(&result.snapshot);
        self.evaluation_count += result.evaluations_delta;
    }
}

/// JSON has no infinities; an unbounded best is reported as `null`.
fn finite(x: f64) -> Option<f64> {
    x.is_finite().then_some(x)
}

/// One algorithm across several objective functions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmReport {
    #[serde(rename = "AlgorithmInfo")]
    pub algorithm_info: AlgorithmInfo,

    #[serde(rename = "StepsCount")]
    pub steps_count: usize,

    #[serde(rename = "Evaluations")]
    pub evaluations: Vec<Evaluation<FunctionInfo>>,
}

/// One objective function across several algorithms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionReport {
    #[serde(rename = "FunctionInfo")]
    pub function_info: FunctionInfo,

    #[serde(rename = "StepsCount")]
    pub steps_count: usize,

    #[serde(rename = "Evaluations")]
    pub evaluations: Vec<Evaluation<AlgorithmInfo>>,
}

/// Terminal report of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Report {
    Algorithm(AlgorithmReport),
    Function(FunctionReport),
}

impl Report {
    /// Empty report shaped after `request`.
    pub fn skeleton(request: &Request) -> Self {
        let steps_count = request.steps().max(0) as usize;
        match request {
            Request::Algorithm(r) => Self::Algorithm(AlgorithmReport {
                algorithm_info: r.algorithm.clone(),
                steps_count,
                evaluations: Vec::new(),
            }),
            Request::Function(r) => Self::Function(FunctionReport {
                function_info: r.function.clone(),
                steps_count,
                evaluations: Vec::new(),
            }),
        }
    }

    pub fn steps_count(&self) -> usize {
        match self {
            Self::Algorithm(r) => r.steps_count,
            Self::Function(r) => r.steps_count,
        }
    }

    /// Number of evaluations created so far.
    pub fn len(&self) -> usize {
        match self {
            Self::Algorithm(r) => r.evaluations.len(),
            Self::Function(r) => r.evaluations.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends an evaluation for the `function` × `algorithm` pair and
    /// returns its index. Only the side that varies is stored.
    pub fn create_evaluation(
        &mut self,
        function: &FunctionInfo,
        algorithm: &AlgorithmInfo,
        step: usize,
    ) -> usize {
        match self {
            Self::Algorithm(r) => {
                r.evaluations.push(Evaluation::new(function.clone(), step));
                r.evaluations.len() - 1
            }
            Self::Function(r) => {
                r.evaluations.push(Evaluation::new(algorithm.clone(), step));
                r.evaluations.len() - 1
            }
        }
    }

    /// Records one generation of evaluation `index`.
    pub fn record(&mut self, index: usize, result: &StepResult) -> Result<()> {
        let steps_count = self.steps_count();
        if result.generation > steps_count {
            return Err(SessionError::runtime(format!(
                "generation {} exceeds the {steps_count}-step budget",
                result.generation
            )));
        }
        let missing = || SessionError::runtime(format!("no evaluation at index {index}"));
        match self {
            Self::Algorithm(r) => r.evaluations.get_mut(index).ok_or_else(missing)?.record(result),
            Self::Function(r) => r.evaluations.get_mut(index).ok_or_else(missing)?.record(result),
        }
        Ok(())
    }

    /// Generation records of evaluation `index`.
    pub fn generations(&self, index: usize) -> Option<&[GenerationRecord]> {
        match self {
            Self::Algorithm(r) => r.evaluations.get(index).map(|e| e.generations.as_slice()),
            Self::Function(r) => r.evaluations.get(index).map(|e| e.generations.as_slice()),
        }
    }

    /// Running best fitness of evaluation `index`.
    pub fn best_fitness(&self, index: usize) -> Option<f64> {
        match self {
            Self::Algorithm(r) => r.evaluations.get(index).and_then(|e| e.f_best),
            Self::Function(r) => r.evaluations.get(index).and_then(|e| e.f_best),
        }
    }

    /// Cumulative objective evaluations of evaluation `index`.
    pub fn evaluation_count(&self, index: usize) -> Option<usize> {
        match self {
            Self::Algorithm(r) => r.evaluations.get(index).map(|e| e.evaluation_count),
            Self::Function(r) => r.evaluations.get(index).map(|e| e.evaluation_count),
        }
    }

    pub fn serialize(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| SessionError::runtime(format!("report serialization failed: {e}")))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| SessionError::protocol(format!("malformed report: {e}")))
    }
}
