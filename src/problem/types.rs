//! Problem descriptors handed to an external trajectory solver.
//!
//! A descriptor is built fresh for every layer invocation, moved into
//! [`SolveRequest`](crate::solver::SolveRequest) and dropped when the solve
//! returns. Closures inside it borrow the layer (and the call's state cells),
//! which the `'a` lifetime records.
use std::fmt;

use ndarray::Axis;
use serde::{Deserialize, Serialize};

use crate::{
    dynamics::types::{DaeFn, DdeFn, HistoryFn, OdeFn},
    errors::{NdeError, NdeResult},
    types::{Matrix, Params, State},
};

/// Integration interval `(t0, t1)`.
///
/// `t1 < t0` is allowed and means integrating backwards in time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSpan {
    t0: f64,
    t1: f64,
}

impl TimeSpan {
    /// # Errors
    /// [`NdeError::InvalidTimeSpan`] when an endpoint is not finite or the
    /// endpoints coincide.
    pub fn new(t0: f64, t1: f64) -> NdeResult<Self> {
        if !t0.is_finite() || !t1.is_finite() {
            return Err(NdeError::InvalidTimeSpan {
                t0,
                t1,
                reason: "Time span endpoints must be finite.",
            });
        }
        if t0 == t1 {
            return Err(NdeError::InvalidTimeSpan {
                t0,
                t1,
                reason: "Time span endpoints must differ.",
            });
        }
        Ok(Self { t0, t1 })
    }

    pub fn t0(&self) -> f64 {
        self.t0
    }

    pub fn t1(&self) -> f64 {
        self.t1
    }

    /// Signed length `t1 - t0`.
    pub fn length(&self) -> f64 {
        self.t1 - self.t0
    }
}

/// The six equation classes a layer can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquationClass {
    Ode,
    DiagonalNoiseSde,
    GeneralNoiseSde,
    ConstantDelay,
    MaskedDae,
    MassMatrixOde,
}

impl fmt::Display for EquationClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EquationClass::Ode => "ODE",
            EquationClass::DiagonalNoiseSde => "diagonal-noise SDE",
            EquationClass::GeneralNoiseSde => "general-noise SDE",
            EquationClass::ConstantDelay => "constant-delay DDE",
            EquationClass::MaskedDae => "masked DAE",
            EquationClass::MassMatrixOde => "mass-matrix ODE",
        };
        f.write_str(name)
    }
}

/// Noise structure of an SDE descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum NoiseShape {
    /// One independent Wiener process per state coordinate.
    Diagonal,
    /// `nbrown` Wiener processes mixed by an `(n, nbrown)` diffusion matrix.
    General { nbrown: usize, noise_rate_prototype: Matrix },
}

impl NoiseShape {
    pub fn nbrown(&self) -> Option<usize> {
        match self {
            NoiseShape::Diagonal => None,
            NoiseShape::General { nbrown, .. } => Some(*nbrown),
        }
    }
}

pub struct OdeProblem<'a> {
    pub f: OdeFn<'a>,
    pub tgrad: OdeFn<'a>,
    pub u0: State,
    pub tspan: TimeSpan,
    pub p: Params,
}

/// `M · u' = f(u, p, t)`.
pub struct MassMatrixProblem<'a> {
    pub f: OdeFn<'a>,
    pub tgrad: OdeFn<'a>,
    pub mass_matrix: &'a Matrix,
    pub u0: State,
    pub tspan: TimeSpan,
    pub p: Params,
}

/// `du = f(u, p, t) dt + g(u, p, t) dW`.
pub struct SdeProblem<'a> {
    pub drift: OdeFn<'a>,
    pub diffusion: OdeFn<'a>,
    pub u0: State,
    pub tspan: TimeSpan,
    pub p: Params,
    pub noise: NoiseShape,
}

pub struct DdeProblem<'a> {
    pub f: DdeFn<'a>,
    pub tgrad: DdeFn<'a>,
    pub u0: State,
    /// State before `tspan.t0()`; must cover `t0 - max(constant_lags)`.
    pub history: HistoryFn,
    pub tspan: TimeSpan,
    pub p: Params,
    pub constant_lags: &'a [f64],
}

/// `F(du, u, p, t) = 0` with `differential_vars` marking derivative rows.
pub struct DaeProblem<'a> {
    pub f: DaeFn<'a>,
    pub du0: State,
    pub u0: State,
    pub tspan: TimeSpan,
    pub p: Params,
    pub differential_vars: &'a [bool],
}

/// Problem descriptor recognised by a [`TrajectorySolver`](crate::solver::TrajectorySolver).
pub enum Problem<'a> {
    Ode(OdeProblem<'a>),
    MassMatrix(MassMatrixProblem<'a>),
    Sde(SdeProblem<'a>),
    Dde(DdeProblem<'a>),
    Dae(DaeProblem<'a>),
}

impl<'a> Problem<'a> {
    pub fn class(&self) -> EquationClass {
        match self {
            Problem::Ode(_) => EquationClass::Ode,
            Problem::MassMatrix(_) => EquationClass::MassMatrixOde,
            Problem::Sde(sde) => match sde.noise {
                NoiseShape::Diagonal => EquationClass::DiagonalNoiseSde,
                NoiseShape::General { .. } => EquationClass::GeneralNoiseSde,
            },
            Problem::Dde(_) => EquationClass::ConstantDelay,
            Problem::Dae(_) => EquationClass::MaskedDae,
        }
    }

    pub fn u0(&self) -> &State {
        match self {
            Problem::Ode(p) => &p.u0,
            Problem::MassMatrix(p) => &p.u0,
            Problem::Sde(p) => &p.u0,
            Problem::Dde(p) => &p.u0,
            Problem::Dae(p) => &p.u0,
        }
    }

    pub fn tspan(&self) -> TimeSpan {
        match self {
            Problem::Ode(p) => p.tspan,
            Problem::MassMatrix(p) => p.tspan,
            Problem::Sde(p) => p.tspan,
            Problem::Dde(p) => p.tspan,
            Problem::Dae(p) => p.tspan,
        }
    }

    pub fn params(&self) -> &Params {
        match self {
            Problem::Ode(p) => &p.p,
            Problem::MassMatrix(p) => &p.p,
            Problem::Sde(p) => &p.p,
            Problem::Dde(p) => &p.p,
            Problem::Dae(p) => &p.p,
        }
    }

    /// Length of the leading (state) axis of `u0`.
    pub fn state_rows(&self) -> usize {
        let u0 = self.u0();
        if u0.ndim() == 0 {
            1
        } else {
            u0.len_of(Axis(0))
        }
    }
}

impl fmt::Debug for Problem<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Problem")
            .field("class", &self.class())
            .field("u0_shape", &self.u0().shape())
            .field("tspan", &self.tspan())
            .field("param_count", &self.params().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Verify time spans reject non-finite and degenerate endpoints but allow
    // backwards integration.
    fn time_span_validation() {
        assert!(TimeSpan::new(0.0, 1.0).is_ok());
        assert_eq!(TimeSpan::new(2.0, -1.0).unwrap().length(), -3.0);
        assert!(matches!(TimeSpan::new(1.0, 1.0), Err(NdeError::InvalidTimeSpan { .. })));
        assert!(matches!(
            TimeSpan::new(0.0, f64::INFINITY),
            Err(NdeError::InvalidTimeSpan { .. })
        ));
        assert!(matches!(TimeSpan::new(f64::NAN, 1.0), Err(NdeError::InvalidTimeSpan { .. })));
    }

    #[test]
    fn noise_shape_reports_nbrown() {
        assert_eq!(NoiseShape::Diagonal.nbrown(), None);
        let general = NoiseShape::General { nbrown: 3, noise_rate_prototype: Matrix::zeros((2, 3)) };
        assert_eq!(general.nbrown(), Some(3));
    }
}
