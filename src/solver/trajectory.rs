//! Trajectory — sampled times and states returned by a solver.
use crate::{
    errors::{NdeError, NdeResult},
    types::State,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    t: Vec<f64>,
    u: Vec<State>,
}

impl Trajectory {
    /// # Errors
    /// [`NdeError::ShapeMismatch`] unless there is exactly one state per time.
    pub fn new(t: Vec<f64>, u: Vec<State>) -> NdeResult<Self> {
        if t.len() != u.len() {
            return Err(NdeError::ShapeMismatch {
                what: "trajectory states",
                expected: t.len(),
                found: u.len(),
            });
        }
        Ok(Self { t, u })
    }

    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    pub fn times(&self) -> &[f64] {
        &self.t
    }

    pub fn states(&self) -> &[State] {
        &self.u
    }

    pub fn state_at(&self, i: usize) -> Option<&State> {
        self.u.get(i)
    }

    pub fn first(&self) -> Option<(f64, &State)> {
        self.t.first().copied().zip(self.u.first())
    }

    pub fn last(&self) -> Option<(f64, &State)> {
        self.t.last().copied().zip(self.u.last())
    }

    pub fn into_parts(self) -> (Vec<f64>, Vec<State>) {
        (self.t, self.u)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn times_and_states_must_pair_up() {
        let err = Trajectory::new(vec![0.0, 1.0], vec![array![1.0].into_dyn()]).unwrap_err();
        assert_eq!(err, NdeError::ShapeMismatch { what: "trajectory states", expected: 2, found: 1 });
    }

    #[test]
    fn endpoints() {
        let traj = Trajectory::new(
            vec![0.0, 0.5],
            vec![array![1.0].into_dyn(), array![2.0].into_dyn()],
        )
        .unwrap();
        assert_eq!(traj.first().map(|(t, _)| t), Some(0.0));
        assert_eq!(traj.last().map(|(_, u)| u[[0]]), Some(2.0));
        assert!(traj.state_at(2).is_none());
    }
}
