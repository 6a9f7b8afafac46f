//! Explicit model state and the single-slot cell threaded through dynamics.
//!
//! Explicit-state models never keep state inside themselves: each call takes
//! the incoming [`ModelState`] and returns the next one. While a trajectory
//! is being integrated the latest state lives in a caller-owned
//! [`StateCell`]; it is read back once the solver has returned.
use std::cell::RefCell;
use std::collections::BTreeMap;

use ndarray::ArrayD;

use crate::errors::NdeResult;

/// Named arrays carried between calls of an explicit-state model.
///
/// Stateless models use the empty state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelState {
    entries: BTreeMap<String, ArrayD<f64>>,
}

impl ModelState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: ArrayD<f64>) -> Self {
        self.entries.insert(key.into(), value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: ArrayD<f64>) -> Option<ArrayD<f64>> {
        self.entries.insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Option<&ArrayD<f64>> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ArrayD<f64>)> {
        self.entries.iter()
    }
}

/// StateCell — caller-owned single slot for the latest explicit model state.
///
/// Purpose
/// -------
/// Hold the state produced by the most recent model call while a solver is
/// driving the dynamics closure, so the final state can be returned to the
/// caller after integration.
///
/// Invariants
/// ----------
/// - Exactly one state is stored at any time; every model call replaces it.
/// - The cell is read with [`StateCell::into_inner`] only after the solve
///   call has returned and the closures borrowing it have been dropped.
/// - A cell belongs to one call site. It is `!Sync`, so two concurrent solves
///   can never share it.
#[derive(Debug, Default)]
pub struct StateCell {
    slot: RefCell<ModelState>,
}

impl StateCell {
    pub fn new(initial: ModelState) -> Self {
        Self { slot: RefCell::new(initial) }
    }

    /// Clone of the currently stored state.
    pub fn snapshot(&self) -> ModelState {
        self.slot.borrow().clone()
    }

    /// Run `step` against the stored state and store the state it returns.
    ///
    /// The borrow is released before the new state is written, so `step` may
    /// not re-enter the same cell.
    pub fn advance<T, F>(&self, step: F) -> NdeResult<T>
    where
        F: FnOnce(&ModelState) -> NdeResult<(T, ModelState)>,
    {
        let (out, next) = {
            let current = self.slot.borrow();
            step(&current)?
        };
        self.slot.replace(next);
        Ok(out)
    }

    pub fn into_inner(self) -> ModelState {
        self.slot.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::NdeError;
    use ndarray::arr0;

    #[test]
    // Purpose
    // -------
    // Verify that `advance` stores the returned state and passes the output
    // through.
    //
    // Given
    // -----
    // - A cell seeded with `count = 0`.
    // - Two `advance` calls that increment the counter.
    //
    // Expect
    // ------
    // - Outputs are the pre-increment counts.
    // - `into_inner` yields `count = 2`.
    fn advance_replaces_stored_state() {
        // Arrange
        let cell = StateCell::new(ModelState::new().with("count", arr0(0.0).into_dyn()));
        let bump = |st: &ModelState| {
            let c = st.get("count").map(|a| a.sum()).unwrap_or(0.0);
            Ok((c, ModelState::new().with("count", arr0(c + 1.0).into_dyn())))
        };

        // Act
        let first = cell.advance(bump).unwrap();
        let second = cell.advance(bump).unwrap();

        // Assert
        assert_eq!(first, 0.0);
        assert_eq!(second, 1.0);
        assert_eq!(cell.into_inner().get("count").unwrap().sum(), 2.0);
    }

    #[test]
    // Purpose
    // -------
    // Confirm a failing step leaves the previous state in place.
    fn advance_error_keeps_previous_state() {
        let initial = ModelState::new().with("k", arr0(3.0).into_dyn());
        let cell = StateCell::new(initial.clone());

        let result: NdeResult<()> =
            cell.advance(|_| Err(NdeError::Model { reason: "boom".to_string() }));

        assert!(result.is_err());
        assert_eq!(cell.snapshot(), initial);
    }
}
