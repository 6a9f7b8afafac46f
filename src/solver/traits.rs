//! The external trajectory-solver contract.
//!
//! Integration and gradient computation live behind [`TrajectorySolver`];
//! this crate only builds what a solver consumes and returns what it
//! produces. Integration failures come back as
//! [`NdeError::Integration`](crate::errors::NdeError::Integration) and are
//! passed to the caller unchanged.
use crate::{
    errors::NdeResult,
    problem::types::Problem,
    sensitivity::algorithm::SensitivityAlgorithm,
    solver::{options::SolverOptions, trajectory::Trajectory},
};

/// Everything a solver receives for one layer invocation.
#[derive(Debug)]
pub struct SolveRequest<'a> {
    pub problem: Problem<'a>,
    pub sensealg: SensitivityAlgorithm,
    pub options: &'a SolverOptions,
}

pub trait TrajectorySolver {
    /// Integrate `request.problem` over its time span.
    ///
    /// Explicit-state models record their latest state while `solve` runs;
    /// the layer reads it back only after `solve` returns.
    fn solve(&self, request: SolveRequest<'_>) -> NdeResult<Trajectory>;
}
