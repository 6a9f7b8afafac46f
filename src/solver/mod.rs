//! solver — the boundary to an external trajectory solver.
//!
//! Purpose
//! -------
//! Specify the [`TrajectorySolver`] interface, the [`SolveRequest`] it
//! receives, the [`Trajectory`] it returns, and the opaque
//! [`SolverOptions`] layers pass through.
//!
//! Invariants & assumptions
//! ------------------------
//! - Solver options are never validated here apart from the reserved
//!   `"sensealg"` keyword.
//! - No retries, recovery, or partial-result caching: a solver error is the
//!   layer's error.

pub mod options;
pub mod traits;
pub mod trajectory;

pub use self::options::{SolverOptions, SENSEALG_KEY};
pub use self::traits::{SolveRequest, TrajectorySolver};
pub use self::trajectory::Trajectory;
