//! errors — unified error surface for differential layers.
//!
//! Purpose
//! -------
//! Collect every failure a differential layer can report into a single enum,
//! [`NdeError`], with the crate-wide alias [`NdeResult<T>`]. Construction-time
//! problems (bad shapes, missing configuration), model-side failures raised
//! from inside dynamics closures, and solver-defined integration failures all
//! travel through the same type so callers match on one surface.
//!
//! Key behaviors
//! -------------
//! - Report dimension problems (parameter vectors, differential-variable
//!   masks, mass matrices, noise prototypes) as [`NdeError::ShapeMismatch`].
//! - Report missing or malformed variant configuration (delay lags, history
//!   functions, DAE masks, initial derivatives) as
//!   [`NdeError::Configuration`].
//! - Wrap solver failures in [`IntegrationError`] and propagate them
//!   unchanged through [`NdeError::Integration`].
//!
//! Conventions
//! -----------
//! - Indices and lengths are 0-based `usize` values measured along the
//!   leading (state) axis.
//! - Errors are values, never panics; layers perform no retry or recovery.

use thiserror::Error;

/// Crate-wide result alias for differential-layer operations.
pub type NdeResult<T> = Result<T, NdeError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NdeError {
    // ---- Shapes ----
    /// A vector, mask, or matrix does not have the length it must have.
    #[error("Shape mismatch for {what}: expected {expected}, found {found}")]
    ShapeMismatch { what: &'static str, expected: usize, found: usize },

    // ---- Configuration ----
    /// A variant-specific setting is missing or malformed.
    #[error("Invalid configuration for '{field}': {reason}")]
    Configuration { field: &'static str, reason: &'static str },

    /// Solver options could not be parsed.
    #[error("Invalid solver options: {reason}")]
    InvalidOptions { reason: String },

    /// Unknown or malformed sensitivity algorithm name.
    #[error("Invalid sensitivity algorithm '{name}': {reason}")]
    InvalidSensitivity { name: String, reason: &'static str },

    /// Time span endpoints must be finite and distinct.
    #[error("Invalid time span ({t0}, {t1}): {reason}")]
    InvalidTimeSpan { t0: f64, t1: f64, reason: &'static str },

    // ---- Models ----
    /// A model failed while being evaluated.
    #[error("Model evaluation failed: {reason}")]
    Model { reason: String },

    // ---- Solver ----
    /// Failure reported by the external trajectory solver.
    #[error(transparent)]
    Integration(#[from] IntegrationError),
}

/// Category of a solver-side integration failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrationErrorKind {
    Divergence,
    StepSizeUnderflow,
    Stiffness,
    Other,
}

impl std::fmt::Display for IntegrationErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntegrationErrorKind::Divergence => write!(f, "divergence"),
            IntegrationErrorKind::StepSizeUnderflow => write!(f, "step-size underflow"),
            IntegrationErrorKind::Stiffness => write!(f, "stiffness"),
            IntegrationErrorKind::Other => write!(f, "integration failure"),
        }
    }
}

/// Failure raised by an external trajectory solver.
///
/// Layers never inspect or rewrite these; they surface to the caller exactly
/// as the solver produced them.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Integration failed ({kind}): {message}")]
pub struct IntegrationError {
    pub kind: IntegrationErrorKind,
    pub message: String,
}

impl IntegrationError {
    pub fn new(kind: IntegrationErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }
}

impl From<ndarray::ShapeError> for NdeError {
    fn from(err: ndarray::ShapeError) -> Self {
        NdeError::Model { reason: err.to_string() }
    }
}

impl From<serde_json::Error> for NdeError {
    fn from(err: serde_json::Error) -> Self {
        NdeError::InvalidOptions { reason: err.to_string() }
    }
}
