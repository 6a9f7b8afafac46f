//! sensitivity — gradient strategy selection per equation class.
//!
//! - [`algorithm`]: the [`SensitivityAlgorithm`] catalogue and its parser.
//! - [`policy`]: [`default_sensitivity`] and [`resolve_sensitivity`].

pub mod algorithm;
pub mod policy;

pub use self::algorithm::SensitivityAlgorithm;
pub use self::policy::{default_sensitivity, resolve_sensitivity};
