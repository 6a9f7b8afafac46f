//! capability — the two model shapes a differential layer accepts.
//!
//! Purpose
//! -------
//! Describe what a layer needs from a network without caring how the network
//! is implemented. Two capabilities are supported:
//!
//! - **Self-contained** models own their weights. Flattening one through
//!   [`Destructure`] yields its parameter vector plus a [`Restructure`] that
//!   rebuilds an equivalent callable [`Model`] from any vector of the same
//!   length.
//! - **Explicit-state** models ([`ExplicitModel`]) own no weights or state;
//!   every call receives `(input, params, state)` and returns
//!   `(output, next_state)`.
//!
//! Key behaviors
//! -------------
//! - [`SubModel`] tags which capability a layer's sub-model has. Layers branch
//!   on the tag once when building their dynamics closures.
//! - [`Restructure::rebuild`] checks the vector length before delegating, so a
//!   wrong-sized slice is a [`NdeError::ShapeMismatch`] rather than a panic
//!   deep inside a model.
//!
//! Invariants & assumptions
//! ------------------------
//! - `Restructure::len()` equals the length of the vector returned alongside
//!   it by [`Destructure::destructure`].
//! - Rebuilt models are pure functions of the vector they were built from.
//! - `ExplicitModel::initial_params().len() == param_count()`.
use std::fmt;
use std::sync::Arc;

use crate::{
    errors::{NdeError, NdeResult},
    models::state::ModelState,
    params::flatten,
    types::{Params, ParamsView, State, StateView},
};

/// A callable network with its weights baked in.
pub trait Model {
    fn forward(&self, input: StateView<'_>) -> NdeResult<State>;
}

type RebuildFn = dyn Fn(ParamsView<'_>) -> NdeResult<Box<dyn Model>> + Send + Sync;

/// Rebuild function produced when a self-contained model is flattened.
#[derive(Clone)]
pub struct Restructure {
    len: usize,
    rebuild: Arc<RebuildFn>,
}

impl Restructure {
    pub fn new<F>(len: usize, rebuild: F) -> Self
    where
        F: Fn(ParamsView<'_>) -> NdeResult<Box<dyn Model>> + Send + Sync + 'static,
    {
        Self { len, rebuild: Arc::new(rebuild) }
    }

    /// Number of parameters the rebuilt model consumes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Build a callable model from `params`.
    ///
    /// # Errors
    /// - [`NdeError::ShapeMismatch`] if `params.len() != self.len()`.
    /// - Anything the underlying rebuild function reports.
    pub fn rebuild(&self, params: ParamsView<'_>) -> NdeResult<Box<dyn Model>> {
        if params.len() != self.len {
            return Err(NdeError::ShapeMismatch {
                what: "rebuild parameter slice",
                expected: self.len,
                found: params.len(),
            });
        }
        (self.rebuild)(params)
    }
}

impl fmt::Debug for Restructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Restructure").field("len", &self.len).finish_non_exhaustive()
    }
}

/// Flatten a self-contained model into `(vector, rebuild)`.
pub trait Destructure {
    fn destructure(&self) -> (Params, Restructure);
}

/// Model whose parameters and state are passed explicitly on every call.
pub trait ExplicitModel: Send + Sync {
    fn param_count(&self) -> usize;

    fn initial_params(&self) -> Params;

    /// State used when the caller supplies none.
    fn initial_state(&self) -> ModelState {
        ModelState::new()
    }

    fn apply(
        &self, input: StateView<'_>, params: ParamsView<'_>, state: &ModelState,
    ) -> NdeResult<(State, ModelState)>;
}

/// Capability tag of a sub-model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    SelfContained,
    ExplicitState,
}

/// SubModel — one network owned by a differential layer.
///
/// Constructed through [`SubModel::self_contained`] or
/// [`SubModel::explicit`], both of which also return the model's default
/// parameter vector for the layer to store.
#[derive(Clone)]
pub enum SubModel {
    SelfContained(Restructure),
    ExplicitState(Arc<dyn ExplicitModel>),
}

impl SubModel {
    /// Flatten a self-contained model.
    pub fn self_contained<M: Destructure + ?Sized>(model: &M) -> (Self, Params) {
        let (params, restructure) = flatten(model);
        (SubModel::SelfContained(restructure), params)
    }

    /// Wrap an explicit-state model.
    pub fn explicit<M: ExplicitModel + 'static>(model: M) -> (Self, Params) {
        let params = model.initial_params();
        (SubModel::ExplicitState(Arc::new(model)), params)
    }

    pub fn kind(&self) -> ModelKind {
        match self {
            SubModel::SelfContained(_) => ModelKind::SelfContained,
            SubModel::ExplicitState(_) => ModelKind::ExplicitState,
        }
    }

    pub fn param_count(&self) -> usize {
        match self {
            SubModel::SelfContained(re) => re.len(),
            SubModel::ExplicitState(model) => model.param_count(),
        }
    }

    /// Default state for explicit-state models; `None` for self-contained.
    pub fn initial_state(&self) -> Option<ModelState> {
        match self {
            SubModel::SelfContained(_) => None,
            SubModel::ExplicitState(model) => Some(model.initial_state()),
        }
    }
}

impl fmt::Debug for SubModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubModel")
            .field("kind", &self.kind())
            .field("param_count", &self.param_count())
            .finish()
    }
}
