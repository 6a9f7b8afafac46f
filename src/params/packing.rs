//! packing — flatten, concatenate, and slice flat parameter vectors.
//!
//! Purpose
//! -------
//! Own the bookkeeping between a layer's flat parameter vector and the
//! sub-models that consume it. Single-model layers use the whole vector;
//! dual-model layers store `p = concat(p1, p2)` with `len = p1.len()` and
//! hand `p[..len]` to the first model and `p[len..]` to the second.
//!
//! Key behaviors
//! -------------
//! - [`flatten`] turns a self-contained model into `(vector, rebuild)`.
//! - [`pack_pair`] concatenates two default vectors and records the split.
//! - [`ParamLayout::resolve`] picks the per-call vector (override or stored
//!   default) after checking its length against the recorded total.
//!
//! Invariants & assumptions
//! ------------------------
//! - `ParamLayout::total()` equals the sum of the sub-models' parameter
//!   counts.
//! - Lengths are checked before any slicing: explicit-state sub-models bypass
//!   `rebuild` and slice directly, so an unchecked slice would silently feed
//!   them the wrong weights.
//! - Overrides never mutate the stored default.
use ndarray::{concatenate, s, Axis};

use crate::{
    errors::{NdeError, NdeResult},
    models::capability::{Destructure, Restructure},
    types::{Params, ParamsView},
};

/// Flatten a self-contained model into its parameter vector and rebuild
/// function.
pub fn flatten<M: Destructure + ?Sized>(model: &M) -> (Params, Restructure) {
    model.destructure()
}

/// How a layer's flat vector splits across its sub-models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamLayout {
    /// One sub-model consumes the whole vector.
    Single { total: usize },
    /// `p[..len]` feeds the first sub-model, `p[len..]` the second.
    Split { len: usize, total: usize },
}

impl ParamLayout {
    pub fn single(total: usize) -> Self {
        ParamLayout::Single { total }
    }

    pub fn total(&self) -> usize {
        match *self {
            ParamLayout::Single { total } | ParamLayout::Split { total, .. } => total,
        }
    }

    /// Split offset for dual-model layouts.
    pub fn split_len(&self) -> Option<usize> {
        match *self {
            ParamLayout::Single { .. } => None,
            ParamLayout::Split { len, .. } => Some(len),
        }
    }

    /// Check that `p` has exactly `total()` entries.
    ///
    /// # Errors
    /// [`NdeError::ShapeMismatch`] when the lengths differ.
    pub fn check(&self, p: ParamsView<'_>) -> NdeResult<()> {
        if p.len() != self.total() {
            return Err(NdeError::ShapeMismatch {
                what: "parameter vector",
                expected: self.total(),
                found: p.len(),
            });
        }
        Ok(())
    }

    /// Parameter vector for one call: a checked copy of `override_p` when
    /// given, otherwise a copy of `stored`.
    pub fn resolve(&self, stored: &Params, override_p: Option<&Params>) -> NdeResult<Params> {
        match override_p {
            Some(p) => {
                self.check(p.view())?;
                Ok(p.clone())
            }
            None => {
                self.check(stored.view())?;
                Ok(stored.clone())
            }
        }
    }

    /// Slice consumed by the first (or only) sub-model.
    ///
    /// Callers check the length first; for a `Split` layout `p` must hold at
    /// least `len` entries.
    pub fn first<'a>(&self, p: ParamsView<'a>) -> ParamsView<'a> {
        match *self {
            ParamLayout::Single { .. } => p,
            ParamLayout::Split { len, .. } => p.slice_move(s![..len]),
        }
    }

    /// Slice consumed by the second sub-model, if any.
    pub fn second<'a>(&self, p: ParamsView<'a>) -> Option<ParamsView<'a>> {
        match *self {
            ParamLayout::Single { .. } => None,
            ParamLayout::Split { len, .. } => Some(p.slice_move(s![len..])),
        }
    }
}

/// Pack two default vectors as `concat(p1, p2)` and record `len = p1.len()`.
pub fn pack_pair(p1: &Params, p2: &Params) -> NdeResult<(Params, ParamLayout)> {
    let packed = concatenate(Axis(0), &[p1.view(), p2.view()])?;
    let layout = ParamLayout::Split { len: p1.len(), total: packed.len() };
    Ok((packed, layout))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Verify dual-model packing concatenates in order and that the recorded
    // split recovers both halves exactly.
    //
    // Given
    // -----
    // - p1 of length 3 and p2 of length 2.
    //
    // Expect
    // ------
    // - packed == concat(p1, p2), len == 3, total == 5.
    // - first(packed) == p1 and second(packed) == p2.
    fn pack_pair_round_trips_slices() {
        // Arrange
        let p1 = array![1.0, 2.0, 3.0];
        let p2 = array![-4.0, -5.0];

        // Act
        let (packed, layout) = pack_pair(&p1, &p2).unwrap();

        // Assert
        assert_eq!(packed, array![1.0, 2.0, 3.0, -4.0, -5.0]);
        assert_eq!(layout.split_len(), Some(3));
        assert_eq!(layout.total(), 5);
        assert_eq!(layout.first(packed.view()), p1.view());
        assert_eq!(layout.second(packed.view()).unwrap(), p2.view());
    }

    #[test]
    // Purpose
    // -------
    // Confirm an override with the wrong length is rejected before slicing
    // and the stored default is left untouched.
    fn resolve_rejects_wrong_length_override() {
        let stored = array![0.5, 0.25, 0.125];
        let layout = ParamLayout::Split { len: 2, total: 3 };

        let err = layout.resolve(&stored, Some(&array![1.0, 2.0])).unwrap_err();

        assert_eq!(
            err,
            NdeError::ShapeMismatch { what: "parameter vector", expected: 3, found: 2 }
        );
        assert_eq!(stored, array![0.5, 0.25, 0.125]);
    }

    #[test]
    fn resolve_prefers_override() {
        let stored = array![0.0, 0.0];
        let layout = ParamLayout::single(2);

        let p = layout.resolve(&stored, Some(&array![7.0, 8.0])).unwrap();

        assert_eq!(p, array![7.0, 8.0]);
        assert_eq!(layout.resolve(&stored, None).unwrap(), stored);
        assert!(layout.second(p.view()).is_none());
    }

    #[test]
    // Purpose
    // -------
    // Self-contained sub-models take their default vector from `flatten`.
    fn self_contained_sub_model_uses_flattened_vector() {
        use crate::models::{activations::Activation, capability::SubModel, mlp::Mlp};

        let mlp = Mlp::with_init(&[2, 1], &[Activation::Identity], |_, i, j| (i + 2 * j) as f64)
            .unwrap();
        let (p_flat, re) = flatten(&mlp);

        let (sub, p) = SubModel::self_contained(&mlp);

        assert_eq!(p, p_flat);
        assert_eq!(sub.param_count(), re.len());
    }
}
