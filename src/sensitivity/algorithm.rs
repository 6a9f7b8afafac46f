//! Gradient strategies a trajectory solver can be asked to use.
use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::NdeError;

/// How the solver differentiates a solve with respect to `p`.
///
/// Variants:
/// - `InterpolatingAdjoint` — continuous adjoint over a dense
///   (interpolated) forward trajectory.
/// - `BacksolveAdjoint` — continuous adjoint re-integrating the forward
///   state backwards; no dense output needed.
/// - `QuadratureAdjoint` — adjoint with the parameter integral computed by
///   quadrature over a dense trajectory.
/// - `ForwardSensitivity` — forward-mode sensitivity equations.
/// - `DirectAutodiff` — reverse-mode autodiff straight through the solver's
///   operations (also accepted as `"TrackerAdjoint"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensitivityAlgorithm {
    InterpolatingAdjoint,
    BacksolveAdjoint,
    QuadratureAdjoint,
    ForwardSensitivity,
    DirectAutodiff,
}

impl SensitivityAlgorithm {
    /// Whether the strategy needs a continuously reconstructed trajectory.
    pub fn requires_dense_output(&self) -> bool {
        matches!(
            self,
            SensitivityAlgorithm::InterpolatingAdjoint | SensitivityAlgorithm::QuadratureAdjoint
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            SensitivityAlgorithm::InterpolatingAdjoint => "InterpolatingAdjoint",
            SensitivityAlgorithm::BacksolveAdjoint => "BacksolveAdjoint",
            SensitivityAlgorithm::QuadratureAdjoint => "QuadratureAdjoint",
            SensitivityAlgorithm::ForwardSensitivity => "ForwardSensitivity",
            SensitivityAlgorithm::DirectAutodiff => "DirectAutodiff",
        }
    }
}

impl fmt::Display for SensitivityAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SensitivityAlgorithm {
    type Err = NdeError;

    /// Parse a sensitivity choice from a string (case-insensitive).
    ///
    /// Accepts the variant names in any case, plus `"TrackerAdjoint"` as an
    /// alias for `DirectAutodiff`. Any other value returns
    /// `NdeError::InvalidSensitivity`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "interpolatingadjoint" => Ok(SensitivityAlgorithm::InterpolatingAdjoint),
            "backsolveadjoint" => Ok(SensitivityAlgorithm::BacksolveAdjoint),
            "quadratureadjoint" => Ok(SensitivityAlgorithm::QuadratureAdjoint),
            "forwardsensitivity" => Ok(SensitivityAlgorithm::ForwardSensitivity),
            "directautodiff" | "trackeradjoint" => Ok(SensitivityAlgorithm::DirectAutodiff),
            _ => Err(NdeError::InvalidSensitivity {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'InterpolatingAdjoint', \
                         'BacksolveAdjoint', 'QuadratureAdjoint', 'ForwardSensitivity', \
                         'DirectAutodiff' or 'TrackerAdjoint'.",
            }),
        }
    }
}
