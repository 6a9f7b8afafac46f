//! core — bookkeeping shared by every layer variant.
//!
//! [`LayerCore`] owns the stored parameter vector, its layout, the time span
//! and the solver options. It resolves per-call parameters, builds one
//! state cell per explicit-state sub-model, and dispatches descriptors.
use crate::{
    errors::{NdeError, NdeResult},
    models::{capability::SubModel, state::{ModelState, StateCell}},
    params::ParamLayout,
    problem::types::{EquationClass, Problem, TimeSpan},
    sensitivity::policy::resolve_sensitivity,
    solver::{
        options::SolverOptions,
        traits::{SolveRequest, TrajectorySolver},
        trajectory::Trajectory,
    },
    types::{Params, State, StateView},
};

#[derive(Debug, Clone)]
pub(crate) struct LayerCore {
    pub(crate) class: EquationClass,
    pub(crate) p: Params,
    pub(crate) layout: ParamLayout,
    pub(crate) tspan: TimeSpan,
    pub(crate) options: SolverOptions,
}

impl LayerCore {
    pub(crate) fn new(
        class: EquationClass, p: Params, layout: ParamLayout, tspan: TimeSpan,
        options: SolverOptions,
    ) -> NdeResult<Self> {
        layout.check(p.view())?;
        Ok(Self { class, p, layout, tspan, options })
    }

    pub(crate) fn resolve_params(&self, override_p: Option<&Params>) -> NdeResult<Params> {
        self.layout.resolve(&self.p, override_p)
    }

    pub(crate) fn dispatch(
        &self, problem: Problem<'_>, overridden: bool, solver: &dyn TrajectorySolver,
    ) -> NdeResult<Trajectory> {
        let sensealg = resolve_sensitivity(self.class, &self.options)?;
        log::debug!(
            "solving {} problem: sensealg={}, params={}, override={}",
            self.class,
            sensealg,
            problem.params().len(),
            overridden
        );
        solver.solve(SolveRequest { problem, sensealg, options: &self.options })
    }
}

/// Check a sub-model's default vector against its parameter count.
pub(crate) fn check_model_params(
    what: &'static str, model: &SubModel, p: &Params,
) -> NdeResult<()> {
    if model.param_count() != p.len() {
        return Err(NdeError::ShapeMismatch { what, expected: model.param_count(), found: p.len() });
    }
    Ok(())
}

pub(crate) fn initial_state(x: StateView<'_>) -> NdeResult<State> {
    if x.ndim() == 0 {
        return Err(NdeError::ShapeMismatch { what: "layer input axes", expected: 1, found: 0 });
    }
    Ok(x.to_owned())
}

/// One cell per explicit-state sub-model, `None` for self-contained ones.
///
/// `states`, when given, supplies the explicit models' incoming states in
/// order; otherwise each model's `initial_state()` is used.
pub(crate) fn state_cells(
    models: &[&SubModel], states: Option<&Vec<ModelState>>,
) -> NdeResult<Vec<Option<StateCell>>> {
    let explicit = models.iter().filter(|m| m.initial_state().is_some()).count();
    if let Some(states) = states {
        if states.len() != explicit {
            return Err(NdeError::ShapeMismatch {
                what: "explicit model states",
                expected: explicit,
                found: states.len(),
            });
        }
    }
    let mut incoming = states.into_iter().flatten().cloned();
    Ok(models
        .iter()
        .map(|m| {
            m.initial_state()
                .map(|default| StateCell::new(incoming.next().unwrap_or(default)))
        })
        .collect())
}

/// Final states of the explicit-state cells, in sub-model order.
pub(crate) fn finish(cells: Vec<Option<StateCell>>) -> Vec<ModelState> {
    cells.into_iter().flatten().map(StateCell::into_inner).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{activations::Activation, mlp::Mlp};
    use ndarray::arr0;

    fn mlp() -> Mlp {
        Mlp::with_init(&[2, 2], &[Activation::Identity], |_, _, _| 1.0).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // Verify cells are only created for explicit-state models and that
    // supplied states replace the defaults in order.
    fn state_cells_follow_model_kinds() {
        let (explicit, _) = SubModel::explicit(mlp());
        let (contained, _) = SubModel::self_contained(&mlp());
        let seeded = ModelState::new().with("h", arr0(4.0).into_dyn());

        let cells = state_cells(&[&contained, &explicit], Some(&vec![seeded.clone()])).unwrap();

        assert!(cells[0].is_none());
        assert_eq!(finish(cells), vec![seeded]);
    }

    #[test]
    fn wrong_number_of_states_is_shape_mismatch() {
        let (explicit, _) = SubModel::explicit(mlp());
        let err = state_cells(&[&explicit], Some(&vec![])).unwrap_err();
        assert_eq!(
            err,
            NdeError::ShapeMismatch { what: "explicit model states", expected: 1, found: 0 }
        );
    }

    #[test]
    fn scalar_input_is_rejected() {
        assert!(initial_state(arr0(1.0).into_dyn().view()).is_err());
    }
}
