//! Search-space description shared by both solvers.

use serde::{Deserialize, Serialize};

/// Closed interval `[min, max]` for one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    pub fn clamp(&self, x: f64) -> f64 {
        x.clamp(self.min, self.max)
    }

    pub fn contains(&self, x: f64) -> bool {
        x >= self.min && x <= self.max
    }

    /// Checks that both ends are finite, `min < max`, and that twice the
    /// width is still finite.
    ///
    /// Samplers draw from intervals up to `2 · width` wide (BLX-0.5 on
    /// parents at opposite ends), so a wider domain would overflow them.
    pub fn validate(&self) -> Result<(), String> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(format!(
                "domain bounds must be finite, got [{}, {}]",
                self.min, self.max
            ));
        }
        if self.min >= self.max {
            return Err(format!(
                "domain min must be smaller than max, got [{}, {}]",
                self.min, self.max
            ));
        }
        if !(2.0 * self.width()).is_finite() {
            return Err(format!(
                "domain is too wide, got [{}, {}]",
                self.min, self.max
            ));
        }
        Ok(())
    }
}

/// Problem domain: a primary interval for every axis, optionally overridden
/// on the last axis by a secondary interval.
///
/// The secondary interval only applies when there are at least two axes;
/// a one-dimensional problem always uses the primary interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Domain {
    pub primary: Bounds,
    pub secondary: Option<Bounds>,
}

impl Domain {
    pub fn new(primary: Bounds) -> Self {
        Self {
            primary,
            secondary: None,
        }
    }

    pub fn with_secondary(mut self, secondary: Bounds) -> Self {
        self.secondary = Some(secondary);
        self
    }

    /// Bounds for `axis` in a problem with `dims` axes.
    pub fn axis(&self, axis: usize, dims: usize) -> Bounds {
        match self.secondary {
            Some(y) if dims >= 2 && axis + 1 == dims => y,
            _ => self.primary,
        }
    }

    /// Per-axis bounds for a `dims`-dimensional problem.
    pub fn per_axis(&self, dims: usize) -> Vec<Bounds> {
        (0..dims).map(|axis| self.axis(axis, dims)).collect()
    }

    pub fn validate(&self) -> Result<(), String> {
        self.primary.validate()?;
        if let Some(y) = self.secondary {
            y.validate().map_err(|e| format!("secondary {e}"))?;
        }
        Ok(())
    }
}

/// A seed vector supplied by the client.
///
/// Accepts either a bare array `[1.0, 2.0]` or `{ "Values": [1.0, 2.0] }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ArgumentRepr", into = "Vec<f64>")]
pub struct Argument {
    pub values: Vec<f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ArgumentRepr {
    Plain(Vec<f64>),
    Wrapped {
        #[serde(rename = "Values")]
        values: Vec<f64>,
    },
}

impl From<ArgumentRepr> for Argument {
    fn from(repr: ArgumentRepr) -> Self {
        match repr {
            ArgumentRepr::Plain(values) | ArgumentRepr::Wrapped { values } => Self { values },
        }
    }
}

impl From<Argument> for Vec<f64> {
    fn from(arg: Argument) -> Self {
        arg.values
    }
}

impl From<Vec<f64>> for Argument {
    fn from(values: Vec<f64>) -> Self {
        Self { values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_validate() {
        assert!(Bounds::new(-5.0, 5.0).validate().is_ok());
        assert!(Bounds::new(5.0, 5.0).validate().is_err());
        assert!(Bounds::new(1.0, -1.0).validate().is_err());
        assert!(Bounds::new(f64::NEG_INFINITY, 0.0).validate().is_err());
        assert!(Bounds::new(0.0, f64::NAN).validate().is_err());
    }

    #[test]
    fn test_bounds_too_wide() {
        assert!(Bounds::new(-1e308, 1e308).validate().is_err());
        assert!(Bounds::new(-f64::MAX, f64::MAX).validate().is_err());
        assert!(Bounds::new(-8e307, 8e307).validate().is_err());
        assert!(Bounds::new(-1e307, 1e307).validate().is_ok());
    }

    #[test]
    fn test_secondary_axis_applies_to_last_axis_only() {
        let d = Domain::new(Bounds::new(-5.0, 5.0)).with_secondary(Bounds::new(-1.0, 1.0));
        let axes = d.per_axis(3);
        assert_eq!(axes[0], Bounds::new(-5.0, 5.0));
        assert_eq!(axes[1], Bounds::new(-5.0, 5.0));
        assert_eq!(axes[2], Bounds::new(-1.0, 1.0));
        assert_eq!(d.axis(0, 1), Bounds::new(-5.0, 5.0));
    }

    #[test]
    fn test_argument_accepts_both_shapes() {
        let a: Argument = serde_json::from_str("[1.0, 2.0]").unwrap();
        let b: Argument = serde_json::from_str(r#"{"Values": [1.0, 2.0]}"#).unwrap();
        assert_eq!(a, b);
        assert_eq!(serde_json::to_string(&a).unwrap(), "[1.0,2.0]");
    }
}
