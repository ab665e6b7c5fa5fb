//! Tunable-parameter metadata and lookups.
//!
//! Each algorithm publishes a static [`ParamInfo`] catalogue (name,
//! description, bounds, default, integrality). The session uses it only to
//! validate incoming `ParamValues`; solvers read their own typed configs.

use std::collections::BTreeMap;

/// Named numeric parameters as sent by the client.
///
/// A `BTreeMap` keeps serialization order deterministic.
pub type ParamValues = BTreeMap<String, f64>;

/// Metadata for one tunable parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub lower: f64,
    pub upper: f64,
    pub default: f64,
    pub integer: bool,
}

impl ParamInfo {
    /// Checks a single value against this parameter's bounds.
    pub fn check(&self, value: f64) -> Result<(), String> {
        if !value.is_finite() {
            return Err(format!("parameter '{}' must be finite", self.name));
        }
        if value < self.lower || value > self.upper {
            return Err(format!(
                "parameter '{}' must be within [{}, {}], got {}",
                self.name, self.lower, self.upper, value
            ));
        }
        if self.integer && value.fract() != 0.0 {
            return Err(format!(
                "parameter '{}' must be an integer, got {}",
                self.name, value
            ));
        }
        Ok(())
    }
}

/// Case-insensitive lookup of `name` in `values`.
pub fn lookup(values: &ParamValues, name: &str) -> Option<f64> {
    values.get(name).copied().or_else(|| {
        values
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| *v)
    })
}

/// Value of `info` in `values`, or its default when absent.
pub fn value_or_default(values: &ParamValues, info: &ParamInfo) -> f64 {
    lookup(values, info.name).unwrap_or(info.default)
}

/// Validates every catalogued parameter present in `values`.
///
/// Unknown keys are ignored: clients routinely send extra entries such as
/// `minValue`/`maxValue` that the domain descriptor already covers.
pub fn validate(catalog: &[ParamInfo], values: &ParamValues) -> Result<(), String> {
    for (key, value) in values {
        if !value.is_finite() {
            return Err(format!("parameter '{key}' must be finite"));
        }
    }
    for info in catalog {
        if let Some(v) = lookup(values, info.name) {
            info.check(v)?;
        }
    }
    Ok(())
}

/// Optional RNG seed carried in `ParamValues` under `seed`.
pub fn seed(values: &ParamValues) -> Option<u64> {
    lookup(values, "seed")
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: ParamInfo = ParamInfo {
        name: "populationSize",
        description: "Number of individuals",
        lower: 2.0,
        upper: 10_000.0,
        default: 50.0,
        integer: true,
    };

    fn values(pairs: &[(&str, f64)]) -> ParamValues {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_lookup_case_insensitive() {
        let v = values(&[("PopulationSize", 30.0)]);
        assert_eq!(lookup(&v, "populationSize"), Some(30.0));
        assert_eq!(value_or_default(&v, &SIZE), 30.0);
        assert_eq!(value_or_default(&ParamValues::new(), &SIZE), 50.0);
    }

    #[test]
    fn test_check_bounds_and_integrality() {
        assert!(SIZE.check(20.0).is_ok());
        assert!(SIZE.check(1.0).is_err());
        assert!(SIZE.check(20.5).is_err());
        assert!(SIZE.check(f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_ignores_unknown_keys() {
        let v = values(&[("populationSize", 20.0), ("minValue", -5.0)]);
        assert!(validate(&[SIZE], &v).is_ok());
        let bad = values(&[("populationSize", 0.0)]);
        assert!(validate(&[SIZE], &bad).is_err());
    }

    #[test]
    fn test_seed() {
        assert_eq!(seed(&values(&[("seed", 42.0)])), Some(42));
        assert_eq!(seed(&values(&[("seed", -1.0)])), None);
        assert_eq!(seed(&ParamValues::new()), None);
    }
}
