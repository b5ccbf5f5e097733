//! Error types for the simulation kernel.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SimError>;

/// Errors raised by model construction, integration and trajectory export.
#[derive(Debug, Error)]
pub enum SimError {
    /// A model, integrator or config was built with a nonphysical parameter.
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f64,
        /// What the parameter must satisfy.
        reason: &'static str,
    },

    /// State, control or derivative length does not match what the model expects.
    #[error("incompatible dimension for {what}: expected {expected}, got {actual}")]
    IncompatibleDimension {
        /// Which vector was mismatched.
        what: &'static str,
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },

    /// A quaternion block drifted away from unit norm.
    #[error("quaternion at offset {offset} has norm {norm} (tolerance {tolerance})")]
    NonUnitQuaternion {
        /// Index of the scalar component inside the state vector.
        offset: usize,
        /// Measured norm.
        norm: f64,
        /// Allowed deviation from 1.
        tolerance: f64,
    },

    /// Writing a trajectory failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl SimError {
    /// Creates an invalid parameter error.
    #[must_use]
    pub const fn invalid_parameter(name: &'static str, value: f64, reason: &'static str) -> Self {
        Self::InvalidParameter {
            name,
            value,
            reason,
        }
    }

    /// Creates a dimension mismatch error.
    #[must_use]
    pub const fn incompatible_dimension(what: &'static str, expected: usize, actual: usize) -> Self {
        Self::IncompatibleDimension {
            what,
            expected,
            actual,
        }
    }

    /// Creates a quaternion drift error.
    #[must_use]
    pub const fn non_unit_quaternion(offset: usize, norm: f64, tolerance: f64) -> Self {
        Self::NonUnitQuaternion {
            offset,
            norm,
            tolerance,
        }
    }
}

/// Fails unless `value` is finite and strictly positive.
pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(SimError::invalid_parameter(name, value, "must be finite and > 0"))
    }
}

/// Fails unless `value` is finite and not negative.
pub(crate) fn require_non_negative(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(SimError::invalid_parameter(name, value, "must be finite and >= 0"))
    }
}

/// Fails unless `actual == expected`.
pub(crate) fn require_len(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(SimError::incompatible_dimension(what, expected, actual))
    }
}
