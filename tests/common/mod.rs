//! Shared fixtures for the layer integration tests.
//!
//! - [`ReferenceSolver`]: fixed-step stand-in for an external trajectory
//!   solver (RK4 for ODE and identity-mass problems, forward Euler for
//!   delay problems, zero-noise Euler–Maruyama for SDEs). Masked DAEs are
//!   reported as an integration failure.
//! - [`ProbeSolver`]: records each descriptor it receives, evaluates the
//!   right-hand side (or residual) once at `t0`, and returns a one-point
//!   trajectory.
//! - Small deterministic networks and an explicit model that counts calls.
#![allow(dead_code)]

use std::cell::RefCell;

use ndarray::{arr0, Array2};
use neural_de::{
    dynamics::types::{History, OdeFn},
    errors::{IntegrationError, IntegrationErrorKind, NdeError, NdeResult},
    models::{Activation, ExplicitModel, Mlp, ModelState},
    problem::{EquationClass, NoiseShape, Problem, TimeSpan},
    sensitivity::SensitivityAlgorithm,
    solver::{SolveRequest, SolverOptions, Trajectory, TrajectorySolver},
    types::{Params, ParamsView, State, StateView},
};

pub const DAE_UNSUPPORTED: &str = "reference solver does not integrate masked DAEs";

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn unit_span() -> TimeSpan {
    TimeSpan::new(0.0, 1.0).unwrap()
}

/// `dim → hidden → dim` network: tanh hidden layer, identity output.
pub fn tanh_mlp(dim: usize, hidden: usize) -> Mlp {
    Mlp::with_init(&[dim, hidden, dim], &[Activation::Tanh, Activation::Identity], |k, i, j| {
        0.1 * (k as f64 + 1.0) * (i as f64 - j as f64 + 0.5)
    })
    .unwrap()
}

/// Single linear layer with weights `w(i, j)` and zero bias.
pub fn linear<F: FnMut(usize, usize) -> f64>(inputs: usize, outputs: usize, mut w: F) -> Mlp {
    Mlp::with_init(&[inputs, outputs], &[Activation::Identity], |_, i, j| w(i, j)).unwrap()
}

/// An [`Mlp`] used as an explicit-state model that counts its evaluations
/// under the `"calls"` state key.
pub struct Counting(pub Mlp);

pub fn calls(state: &ModelState) -> f64 {
    state.get("calls").map(|a| a.sum()).unwrap_or(0.0)
}

pub fn calls_state(n: f64) -> ModelState {
    ModelState::new().with("calls", arr0(n).into_dyn())
}

impl ExplicitModel for Counting {
    fn param_count(&self) -> usize {
        self.0.param_count()
    }

    fn initial_params(&self) -> Params {
        self.0.flat()
    }

    fn initial_state(&self) -> ModelState {
        calls_state(0.0)
    }

    fn apply(
        &self, input: StateView<'_>, params: ParamsView<'_>, state: &ModelState,
    ) -> NdeResult<(State, ModelState)> {
        let (y, _) = self.0.apply(input, params, state)?;
        Ok((y, calls_state(calls(state) + 1.0)))
    }
}

fn check_finite(u: &State) -> NdeResult<()> {
    if u.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(IntegrationError::new(IntegrationErrorKind::Divergence, "non-finite state").into())
    }
}

fn grid(tspan: TimeSpan, steps: usize) -> (f64, Vec<f64>) {
    let dt = tspan.length() / steps as f64;
    let t = (0..=steps).map(|k| tspan.t0() + dt * k as f64).collect();
    (dt, t)
}

fn rk4(f: &OdeFn<'_>, u0: &State, tspan: TimeSpan, p: &Params, steps: usize) -> NdeResult<Trajectory> {
    let (dt, t) = grid(tspan, steps);
    let mut u = vec![u0.clone()];
    for k in 0..steps {
        let (tk, uk) = (t[k], &u[k]);
        let k1 = f(uk.view(), p.view(), tk)?;
        let k2 = f((uk + &(&k1 * (dt / 2.0))).view(), p.view(), tk + dt / 2.0)?;
        let k3 = f((uk + &(&k2 * (dt / 2.0))).view(), p.view(), tk + dt / 2.0)?;
        let k4 = f((uk + &(&k3 * dt)).view(), p.view(), tk + dt)?;
        let next = uk + &((&k1 + &(&k2 * 2.0) + &(&k3 * 2.0) + &k4) * (dt / 6.0));
        check_finite(&next)?;
        u.push(next);
    }
    Trajectory::new(t, u)
}

/// Pins a closure to the higher-ranked history signature.
fn as_history<F>(f: F) -> F
where
    F: Fn(ParamsView<'_>, f64) -> NdeResult<State>,
{
    f
}

/// Fixed-step test double for an external solver.
pub struct ReferenceSolver {
    pub steps: usize,
}

impl TrajectorySolver for ReferenceSolver {
    fn solve(&self, request: SolveRequest<'_>) -> NdeResult<Trajectory> {
        match request.problem {
            Problem::Ode(prob) => rk4(&prob.f, &prob.u0, prob.tspan, &prob.p, self.steps),
            Problem::MassMatrix(prob) => {
                let n = prob.mass_matrix.nrows();
                if *prob.mass_matrix != Array2::<f64>::eye(n) {
                    return Err(IntegrationError::new(
                        IntegrationErrorKind::Other,
                        "reference solver only handles identity mass matrices",
                    )
                    .into());
                }
                rk4(&prob.f, &prob.u0, prob.tspan, &prob.p, self.steps)
            }
            Problem::Sde(prob) => {
                let (dt, t) = grid(prob.tspan, self.steps);
                let mut u = vec![prob.u0.clone()];
                for k in 0..self.steps {
                    let drift = (prob.drift)(u[k].view(), prob.p.view(), t[k])?;
                    // Zero Wiener increments; evaluated so shape errors surface.
                    (prob.diffusion)(u[k].view(), prob.p.view(), t[k])?;
                    let next = &u[k] + &(drift * dt);
                    check_finite(&next)?;
                    u.push(next);
                }
                Trajectory::new(t, u)
            }
            Problem::Dde(prob) => {
                let (dt, t) = grid(prob.tspan, self.steps);
                let mut u = vec![prob.u0.clone()];
                for k in 0..self.steps {
                    let du = {
                        let (past_t, past_u) = (&t[..=k], &u[..]);
                        let h = as_history(|q, s| {
                            if s <= past_t[0] {
                                return (prob.history)(q, s);
                            }
                            let i = past_t.iter().rposition(|&ti| ti <= s).unwrap_or(0);
                            Ok(past_u[i].clone())
                        });
                        (prob.f)(u[k].view(), &h, prob.p.view(), t[k])?
                    };
                    let next = &u[k] + &(du * dt);
                    check_finite(&next)?;
                    u.push(next);
                }
                Trajectory::new(t, u)
            }
            Problem::Dae(_) => {
                Err(IntegrationError::new(IntegrationErrorKind::Other, DAE_UNSUPPORTED).into())
            }
        }
    }
}

/// What [`ProbeSolver`] saw for one request.
#[derive(Debug, Clone)]
pub struct Record {
    pub class: EquationClass,
    pub sensealg: SensitivityAlgorithm,
    pub param_count: usize,
    pub u0: State,
    /// Right-hand side (or DAE residual) evaluated at `(u0, p, t0)`.
    pub rhs: State,
    pub nbrown: Option<usize>,
    pub lags: Vec<f64>,
    pub options: SolverOptions,
}

#[derive(Default)]
pub struct ProbeSolver {
    pub records: RefCell<Vec<Record>>,
}

impl ProbeSolver {
    pub fn last(&self) -> Record {
        self.records.borrow().last().cloned().expect("no request recorded")
    }

    pub fn count(&self) -> usize {
        self.records.borrow().len()
    }
}

impl TrajectorySolver for ProbeSolver {
    fn solve(&self, request: SolveRequest<'_>) -> NdeResult<Trajectory> {
        let class = request.problem.class();
        let t0 = request.problem.tspan().t0();
        let u0 = request.problem.u0().clone();
        let param_count = request.problem.params().len();
        let (rhs, nbrown, lags) = match &request.problem {
            Problem::Ode(prob) => ((prob.f)(prob.u0.view(), prob.p.view(), t0)?, None, vec![]),
            Problem::MassMatrix(prob) => {
                ((prob.f)(prob.u0.view(), prob.p.view(), t0)?, None, vec![])
            }
            Problem::Sde(prob) => {
                let g = (prob.diffusion)(prob.u0.view(), prob.p.view(), t0)?;
                if let NoiseShape::General { noise_rate_prototype, .. } = &prob.noise {
                    if g.shape() != noise_rate_prototype.shape() {
                        return Err(NdeError::ShapeMismatch {
                            what: "probe diffusion",
                            expected: noise_rate_prototype.len(),
                            found: g.len(),
                        });
                    }
                }
                ((prob.drift)(prob.u0.view(), prob.p.view(), t0)?, prob.noise.nbrown(), vec![])
            }
            Problem::Dde(prob) => {
                let history: &History<'_> = &*prob.history;
                let rhs = (prob.f)(prob.u0.view(), history, prob.p.view(), t0)?;
                (rhs, None, prob.constant_lags.to_vec())
            }
            Problem::Dae(prob) => {
                ((prob.f)(prob.du0.view(), prob.u0.view(), prob.p.view(), t0)?, None, vec![])
            }
        };
        self.records.borrow_mut().push(Record {
            class,
            sensealg: request.sensealg,
            param_count,
            u0: u0.clone(),
            rhs,
            nbrown,
            lags,
            options: request.options.clone(),
        });
        Trajectory::new(vec![t0], vec![u0])
    }
}
