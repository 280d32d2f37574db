//! Error types shared by the whole simulation.

use thiserror::Error;

/// Errors raised while configuring or running a simulation.
///
/// None of these are recoverable mid-run: a frame either completes or the
/// whole run aborts.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Missing, mistyped or inconsistent settings.
    #[error("configuration error: {0}")]
    Config(String),

    /// A numeric attribute outside its valid interval.
    #[error("{field} value {value} not in [{min}, {max}] interval")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SimulationError {
    /// Shorthand for building a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, SimulationError>;

/// Fails with [`SimulationError::OutOfRange`] unless `min <= value <= max`.
pub fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<f64> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(SimulationError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_range_accepts_bounds() {
        assert_eq!(check_range("x", 0.0, 0.0, 1.0).unwrap(), 0.0);
        assert_eq!(check_range("x", 1.0, 0.0, 1.0).unwrap(), 1.0);
    }

    #[test]
    fn test_check_range_rejects_outside_and_nan() {
        assert!(check_range("x", -0.1, 0.0, 1.0).is_err());
        assert!(check_range("x", 1.1, 0.0, 1.0).is_err());
        assert!(check_range("x", f64::NAN, 0.0, 1.0).is_err());
    }

    #[test]
    fn test_out_of_range_message() {
        let err = check_range("death_threshold", 2.0, 0.0, 1.0).unwrap_err();
        assert_eq!(err.to_string(), "death_threshold value 2 not in [0, 1] interval");
    }
}
