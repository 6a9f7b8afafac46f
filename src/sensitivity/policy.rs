//! policy — per-class default sensitivity and keyword overrides.
//!
//! Plain and mass-matrix ODEs default to [`SensitivityAlgorithm::InterpolatingAdjoint`]
//! because solvers provide dense output for them. SDE, delay, and masked-DAE
//! classes default to [`SensitivityAlgorithm::DirectAutodiff`]. A string
//! under the `"sensealg"` solver keyword replaces the default.
use crate::{
    errors::NdeResult,
    problem::types::EquationClass,
    sensitivity::algorithm::SensitivityAlgorithm,
    solver::options::SolverOptions,
};

pub fn default_sensitivity(class: EquationClass) -> SensitivityAlgorithm {
    match class {
        EquationClass::Ode | EquationClass::MassMatrixOde => {
            SensitivityAlgorithm::InterpolatingAdjoint
        }
        EquationClass::DiagonalNoiseSde
        | EquationClass::GeneralNoiseSde
        | EquationClass::ConstantDelay
        | EquationClass::MaskedDae => SensitivityAlgorithm::DirectAutodiff,
    }
}

/// Sensitivity for one solve: the `"sensealg"` override if present,
/// otherwise the class default.
///
/// # Errors
/// [`crate::errors::NdeError::InvalidSensitivity`] if the override is not a
/// recognised name.
pub fn resolve_sensitivity(
    class: EquationClass, options: &SolverOptions,
) -> NdeResult<SensitivityAlgorithm> {
    Ok(options.sensealg_override()?.unwrap_or_else(|| default_sensitivity(class)))
}
