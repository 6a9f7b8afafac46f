//! layers — differential layers and the augmentation wrapper.
//!
//! Purpose
//! -------
//! Store a layer's configuration once at construction and, on every
//! invocation, resolve parameters, rebuild the dynamics closure, assemble a
//! problem descriptor, attach a sensitivity, and hand it to a
//! [`TrajectorySolver`](crate::solver::TrajectorySolver).
//!
//! Key behaviors
//! -------------
//! - [`NeuralOde`]: plain ODE.
//! - [`NeuralDsde`] / [`NeuralSde`]: diagonal- and general-noise SDEs over
//!   a drift/diffusion model pair.
//! - [`NeuralCdde`]: constant-delay DDE, configured via
//!   [`NeuralCddeBuilder`].
//! - [`NeuralDae`]: masked DAE, configured via [`NeuralDaeBuilder`].
//! - [`NeuralOdeMm`]: mass-matrix ODE.
//! - [`AugmentedLayer`]: any of the above on a zero-lifted state.
//!
//! Invariants & assumptions
//! ------------------------
//! - The stored parameter vector always matches the sub-models; overrides
//!   are checked before any closure is built.
//! - Each invocation owns its closures, descriptor, and state cells; no
//!   state is shared across calls.
//! - Layers log once per invocation at `debug` level and never from inside
//!   dynamics closures.

pub mod augmented;
pub mod cdde;
mod core;
pub mod dae;
pub mod mm;
pub mod node;
pub mod sde;
pub mod traits;

pub use self::augmented::{augment, AugmentedLayer};
pub use self::cdde::{NeuralCdde, NeuralCddeBuilder};
pub use self::dae::{NeuralDae, NeuralDaeBuilder};
pub use self::mm::NeuralOdeMm;
pub use self::node::NeuralOde;
pub use self::sde::{NeuralDsde, NeuralSde};
pub use self::traits::{DiffEqLayer, ForwardArgs, Solution};

pub mod prelude {
    pub use super::augmented::AugmentedLayer;
    pub use super::cdde::NeuralCdde;
    pub use super::dae::NeuralDae;
    pub use super::mm::NeuralOdeMm;
    pub use super::node::NeuralOde;
    pub use super::sde::{NeuralDsde, NeuralSde};
    pub use super::traits::{DiffEqLayer, ForwardArgs, Solution};
}
