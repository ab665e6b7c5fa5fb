//! Job descriptions a client can load.
//!
//! [`Request`] is a closed sum type: a run either sweeps one algorithm over
//! several objective functions ([`AlgorithmRequest`]) or one objective over
//! several algorithms ([`FunctionRequest`]). Field names follow the wire
//! format (`AlgorithmName`, `FunctionList`, `minValue`, ...).

use crate::error::{Result, SessionError};
use crate::params::{self, ParamValues};
use crate::problem::{Argument, Bounds, Domain};
use crate::solver::AlgorithmKind;
use serde::{Deserialize, Serialize};

/// An algorithm name plus its tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmInfo {
    #[serde(rename = "AlgorithmName")]
    pub algorithm_name: String,

    #[serde(rename = "ParamValues", default)]
    pub param_values: ParamValues,
}

impl AlgorithmInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            algorithm_name: name.into(),
            param_values: ParamValues::new(),
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: f64) -> Self {
        self.param_values.insert(name.into(), value);
        self
    }

    /// Checks parameter values without resolving the algorithm name.
    ///
    /// Parameters of a recognised algorithm are also checked against its
    /// catalogue; unknown names are left for the worker to reject.
    pub fn validate(&self) -> std::result::Result<(), String> {
        match AlgorithmKind::parse(&self.algorithm_name) {
            Some(kind) => params::validate(kind.param_info(), &self.param_values),
            None => params::validate(&[], &self.param_values),
        }
    }
}

/// An objective function name plus its domain.
///
/// `YminValue`/`YmaxValue` bound the last axis of multi-dimensional problems
/// and must be given together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionInfo {
    #[serde(rename = "FunctionName")]
    pub function_name: String,

    #[serde(rename = "minValue")]
    pub min_value: f64,

    #[serde(rename = "maxValue")]
    pub max_value: f64,

    #[serde(rename = "YminValue", default, skip_serializing_if = "Option::is_none")]
    pub y_min_value: Option<f64>,

    #[serde(rename = "YmaxValue", default, skip_serializing_if = "Option::is_none")]
    pub y_max_value: Option<f64>,
}

impl FunctionInfo {
    pub fn new(name: impl Into<String>, min: f64, max: f64) -> Self {
        Self {
            function_name: name.into(),
            min_value: min,
            max_value: max,
            y_min_value: None,
            y_max_value: None,
        }
    }

    pub fn with_y_bounds(mut self, min: f64, max: f64) -> Self {
        self.y_min_value = Some(min);
        self.y_max_value = Some(max);
        self
    }

    pub fn domain(&self) -> Domain {
        let domain = Domain::new(Bounds::new(self.min_value, self.max_value));
        match (self.y_min_value, self.y_max_value) {
            (Some(min), Some(max)) => domain.with_secondary(Bounds::new(min, max)),
            _ => domain,
        }
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.y_min_value.is_some() != self.y_max_value.is_some() {
            return Err(format!(
                "function '{}': YminValue and YmaxValue must be given together",
                self.function_name
            ));
        }
        self.domain()
            .validate()
            .map_err(|e| format!("function '{}': {e}", self.function_name))
    }
}

/// One algorithm evaluated on every function of `FunctionList`, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmRequest {
    #[serde(flatten)]
    pub algorithm: AlgorithmInfo,

    #[serde(rename = "Steps")]
    pub steps: i64,

    /// Generation already reached when resuming a run.
    #[serde(rename = "Step", default, skip_serializing_if = "Option::is_none")]
    pub step: Option<i64>,

    #[serde(rename = "FunctionList")]
    pub function_list: Vec<FunctionInfo>,

    /// Seed vectors for the initial population.
    #[serde(rename = "Arguments", default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Vec<Argument>>,
}

/// Every algorithm of `Algorithms` evaluated on one function, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionRequest {
    #[serde(flatten)]
    pub function: FunctionInfo,

    #[serde(rename = "Steps")]
    pub steps: i64,

    #[serde(rename = "Step", default, skip_serializing_if = "Option::is_none")]
    pub step: Option<i64>,

    #[serde(rename = "Algorithms")]
    pub algorithms: Vec<AlgorithmInfo>,

    #[serde(rename = "Arguments", default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Vec<Argument>>,
}

/// A loaded job.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Algorithm(AlgorithmRequest),
    Function(FunctionRequest),
}

impl Request {
    /// Requested generation budget per evaluation.
    pub fn steps(&self) -> i64 {
        match self {
            Self::Algorithm(r) => r.steps,
            Self::Function(r) => r.steps,
        }
    }

    /// Generation to resume from; `0` for a fresh run.
    pub fn start_step(&self) -> i64 {
        let step = match self {
            Self::Algorithm(r) => r.step,
            Self::Function(r) => r.step,
        };
        step.unwrap_or(0)
    }

    pub fn arguments(&self) -> &[Argument] {
        let args = match self {
            Self::Algorithm(r) => r.arguments.as_deref(),
            Self::Function(r) => r.arguments.as_deref(),
        };
        args.unwrap_or(&[])
    }

    /// Number of evaluations the run will perform.
    pub fn job_count(&self) -> usize {
        match self {
            Self::Algorithm(r) => r.function_list.len(),
            Self::Function(r) => r.algorithms.len(),
        }
    }

    /// Structural checks done at load time.
    ///
    /// Algorithm and objective names are resolved later, at start.
    pub fn validate(&self, max_steps: usize) -> Result<()> {
        let steps = self.steps();
        if steps < 1 {
            return Err(SessionError::validation(format!(
                "Steps must be at least 1, got {steps}"
            )));
        }
        if steps as u64 > max_steps as u64 {
            return Err(SessionError::validation(format!(
                "Steps must not exceed {max_steps}, got {steps}"
            )));
        }

        let step = self.start_step();
        if step < 0 || step > steps {
            return Err(SessionError::validation(format!(
                "Step must be within [0, {steps}], got {step}"
            )));
        }
        if step > 0 && self.arguments().is_empty() {
            return Err(SessionError::validation(
                "Arguments are required when resuming from a Step",
            ));
        }
        for (i, arg) in self.arguments().iter().enumerate() {
            if arg.values.is_empty() || arg.values.iter().any(|v| !v.is_finite()) {
                return Err(SessionError::validation(format!(
                    "argument {i} must be a non-empty vector of finite numbers"
                )));
            }
        }

        match self {
            Self::Algorithm(r) => {
                r.algorithm.validate().map_err(SessionError::validation)?;
                if r.function_list.is_empty() {
                    return Err(SessionError::validation("FunctionList is empty"));
                }
                for f in &r.function_list {
                    f.validate().map_err(SessionError::validation)?;
                }
            }
            Self::Function(r) => {
                r.function.validate().map_err(SessionError::validation)?;
                if r.algorithms.is_empty() {
                    return Err(SessionError::validation("Algorithms is empty"));
                }
                for a in &r.algorithms {
                    a.validate().map_err(SessionError::validation)?;
                }
            }
        }
        Ok(())
    }
}
