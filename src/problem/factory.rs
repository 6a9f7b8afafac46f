//! factory — one descriptor constructor per equation class.
//!
//! Purpose
//! -------
//! Wrap the dynamics closure(s) from [`crate::dynamics`], the initial state,
//! the time span, the current parameter vector, and class-specific extras
//! into a [`Problem`] an external solver can consume.
//!
//! Key behaviors
//! -------------
//! - ODE, mass-matrix, and delay descriptors get a zero `tgrad`.
//! - SDE descriptors are diagonal-noise unless `nbrown` is given, in which
//!   case they carry an `(n, nbrown)` zero noise-rate prototype, `n` being
//!   the flattened state length.
//! - Delay descriptors carry the lag list so the solver can schedule
//!   delay-aware stepping.
//! - Mass matrices and DAE masks are checked against the state here, the
//!   first point at which the state dimension is known.
use crate::{
    dynamics::{
        builders::{basic_dde_tgrad, basic_tgrad},
        types::{DaeFn, DdeFn, HistoryFn, OdeFn},
    },
    errors::{NdeError, NdeResult},
    problem::{
        types::{
            DaeProblem, DdeProblem, MassMatrixProblem, NoiseShape, OdeProblem, Problem, SdeProblem,
            TimeSpan,
        },
        validation::validate_state_rows,
    },
    types::{Matrix, Params, State},
};

pub fn ode_problem<'a>(f: OdeFn<'a>, u0: State, tspan: TimeSpan, p: Params) -> Problem<'a> {
    Problem::Ode(OdeProblem { f, tgrad: basic_tgrad(), u0, tspan, p })
}

/// Diagonal noise when `nbrown` is `None`, general noise otherwise.
///
/// # Errors
/// [`NdeError::Configuration`] for `nbrown == Some(0)`.
pub fn sde_problem<'a>(
    drift: OdeFn<'a>, diffusion: OdeFn<'a>, u0: State, tspan: TimeSpan, p: Params,
    nbrown: Option<usize>,
) -> NdeResult<Problem<'a>> {
    let noise = match nbrown {
        None => NoiseShape::Diagonal,
        Some(0) => {
            return Err(NdeError::Configuration {
                field: "nbrown",
                reason: "General-noise SDEs need at least one Wiener process.",
            })
        }
        Some(m) => NoiseShape::General { nbrown: m, noise_rate_prototype: Matrix::zeros((u0.len(), m)) },
    };
    Ok(Problem::Sde(SdeProblem { drift, diffusion, u0, tspan, p, noise }))
}

pub fn dde_problem<'a>(
    f: DdeFn<'a>, u0: State, history: HistoryFn, tspan: TimeSpan, p: Params,
    constant_lags: &'a [f64],
) -> Problem<'a> {
    Problem::Dde(DdeProblem { f, tgrad: basic_dde_tgrad(), u0, history, tspan, p, constant_lags })
}

/// # Errors
/// [`NdeError::ShapeMismatch`] when `du0` and `u0` differ in shape or the
/// mask length differs from the state's leading axis.
pub fn dae_problem<'a>(
    f: DaeFn<'a>, du0: State, u0: State, tspan: TimeSpan, p: Params,
    differential_vars: &'a [bool],
) -> NdeResult<Problem<'a>> {
    if du0.shape() != u0.shape() {
        return Err(NdeError::ShapeMismatch {
            what: "initial derivative",
            expected: u0.len(),
            found: du0.len(),
        });
    }
    let problem = Problem::Dae(DaeProblem { f, du0, u0, tspan, p, differential_vars });
    validate_state_rows("differential-variable mask", problem.state_rows(), differential_vars.len())?;
    Ok(problem)
}

/// # Errors
/// [`NdeError::ShapeMismatch`] when the mass matrix dimension differs from
/// the state's leading axis.
pub fn mass_matrix_problem<'a>(
    f: OdeFn<'a>, mass_matrix: &'a Matrix, u0: State, tspan: TimeSpan, p: Params,
) -> NdeResult<Problem<'a>> {
    let problem =
        Problem::MassMatrix(MassMatrixProblem { f, tgrad: basic_tgrad(), mass_matrix, u0, tspan, p });
    validate_state_rows("mass matrix rows", problem.state_rows(), mass_matrix.nrows())?;
    Ok(problem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::types::EquationClass;
    use ndarray::{array, Array1, Array2};
    use std::sync::Arc;

    fn zero_rhs<'a>() -> OdeFn<'a> {
        Box::new(|u, _p, _t| Ok(State::zeros(u.raw_dim())))
    }

    fn span() -> TimeSpan {
        TimeSpan::new(0.0, 1.0).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // Verify SDE noise shape selection and the noise-rate prototype.
    //
    // Given
    // -----
    // - A 3-dimensional state.
    //
    // Expect
    // ------
    // - nbrown = None → DiagonalNoiseSde.
    // - nbrown = Some(2) → GeneralNoiseSde with a (3, 2) zero prototype.
    // - nbrown = Some(0) → Configuration error.
    fn sde_noise_shape_follows_nbrown() {
        // Arrange
        let u0 = array![1.0, 2.0, 3.0].into_dyn();
        let p = Array1::zeros(0);

        // Act
        let diag = sde_problem(zero_rhs(), zero_rhs(), u0.clone(), span(), p.clone(), None).unwrap();
        let general = sde_problem(zero_rhs(), zero_rhs(), u0.clone(), span(), p.clone(), Some(2)).unwrap();
        let zero = sde_problem(zero_rhs(), zero_rhs(), u0, span(), p, Some(0));

        // Assert
        assert_eq!(diag.class(), EquationClass::DiagonalNoiseSde);
        assert_eq!(general.class(), EquationClass::GeneralNoiseSde);
        match general {
            Problem::Sde(SdeProblem {
                noise: NoiseShape::General { nbrown, noise_rate_prototype }, ..
            }) => {
                assert_eq!(nbrown, 2);
                assert_eq!(noise_rate_prototype, Array2::<f64>::zeros((3, 2)));
            }
            _ => panic!("expected a general-noise SDE"),
        }
        assert!(matches!(zero, Err(NdeError::Configuration { field: "nbrown", .. })));
    }

    #[test]
    fn delay_descriptor_carries_lags_and_zero_tgrad() {
        let lags = [0.5, 1.5];
        let history: HistoryFn = Arc::new(|_p, _t| Ok(array![0.0].into_dyn()));
        let f: DdeFn<'_> = Box::new(|u, _h, _p, _t| Ok(u.to_owned()));

        let problem = dde_problem(f, array![1.0].into_dyn(), history, span(), Array1::zeros(0), &lags);

        let Problem::Dde(dde) = problem else { panic!("expected a delay problem") };
        assert_eq!(dde.constant_lags, &[0.5, 1.5]);
        let z = (dde.tgrad)(dde.u0.view(), &*dde.history, dde.p.view(), 0.0).unwrap();
        assert_eq!(z, array![0.0].into_dyn());
    }

    #[test]
    fn dae_mask_must_cover_state_rows() {
        let mask = [true, false];
        let f: DaeFn<'_> = Box::new(|du, _u, _p, _t| Ok(du.to_owned()));
        let u0 = array![1.0, 0.0, 0.0].into_dyn();

        let err = dae_problem(f, u0.clone(), u0, span(), Array1::zeros(0), &mask).unwrap_err();

        assert_eq!(
            err,
            NdeError::ShapeMismatch { what: "differential-variable mask", expected: 3, found: 2 }
        );
    }

    #[test]
    fn dae_initial_derivative_must_match_state() {
        let mask = [true, false];
        let f: DaeFn<'_> = Box::new(|du, _u, _p, _t| Ok(du.to_owned()));

        let err = dae_problem(
            f,
            array![0.0].into_dyn(),
            array![1.0, 0.0].into_dyn(),
            span(),
            Array1::zeros(0),
            &mask,
        )
        .unwrap_err();

        assert!(matches!(err, NdeError::ShapeMismatch { what: "initial derivative", .. }));
    }

    #[test]
    fn mass_matrix_must_match_state_rows() {
        let m = Array2::eye(2);
        let ok = mass_matrix_problem(zero_rhs(), &m, array![1.0, 0.0].into_dyn(), span(), Array1::zeros(0));
        let bad = mass_matrix_problem(zero_rhs(), &m, array![1.0].into_dyn(), span(), Array1::zeros(0));

        assert_eq!(ok.unwrap().class(), EquationClass::MassMatrixOde);
        assert!(matches!(bad, Err(NdeError::ShapeMismatch { what: "mass matrix rows", .. })));
    }
}
