//! Validation helpers for variant-specific problem extras.
//!
//! Purpose
//! -------
//! Keep the dimension and configuration checks shared by the layer builders
//! and the problem factory in one place, so every entry point fails with the
//! same structured error.
//!
//! Key behaviors
//! -------------
//! - [`validate_mass_matrix`]: square matrix, checked at layer construction.
//! - [`validate_state_rows`]: a matrix or mask matches the state's leading
//!   axis, checked when a descriptor is first built.
//! - [`validate_lags`]: delay lags are present, finite, and positive.
//!
//! Conventions
//! -----------
//! - These helpers never panic and perform no logging.
use crate::{
    errors::{NdeError, NdeResult},
    types::Matrix,
};

/// Validate that a mass matrix is square.
///
/// Errors
/// ------
/// - `NdeError::ShapeMismatch`
///   - Returned when the column count differs from the row count.
pub fn validate_mass_matrix(mass_matrix: &Matrix) -> NdeResult<()> {
    let (rows, cols) = mass_matrix.dim();
    if rows != cols {
        return Err(NdeError::ShapeMismatch {
            what: "mass matrix columns",
            expected: rows,
            found: cols,
        });
    }
    Ok(())
}

/// Validate that `found` (a mask length or matrix row count) equals the
/// number of state rows.
///
/// Errors
/// ------
/// - `NdeError::ShapeMismatch` naming `what` when the counts differ.
pub fn validate_state_rows(what: &'static str, state_rows: usize, found: usize) -> NdeResult<()> {
    if state_rows != found {
        return Err(NdeError::ShapeMismatch { what, expected: state_rows, found });
    }
    Ok(())
}

/// Validate a constant-delay lag list.
///
/// Parameters
/// ----------
/// - `lags`: `&[f64]`
///   Offsets `τ_k` such that the dynamics read `h(p, t - τ_k)`.
///
/// Errors
/// ------
/// - `NdeError::Configuration { field: "lags", .. }`
///   - Returned if the list is empty or any lag is non-finite or ≤ 0.
pub fn validate_lags(lags: &[f64]) -> NdeResult<()> {
    if lags.is_empty() {
        return Err(NdeError::Configuration {
            field: "lags",
            reason: "Constant-delay layers need at least one lag.",
        });
    }
    if lags.iter().any(|lag| !lag.is_finite()) {
        return Err(NdeError::Configuration { field: "lags", reason: "Lags must be finite." });
    }
    if lags.iter().any(|&lag| lag <= 0.0) {
        return Err(NdeError::Configuration {
            field: "lags",
            reason: "Lags must be strictly positive.",
        });
    }
    Ok(())
}
