//! params — parameter packing for one- and two-model layers.
//!
//! Layers store one flat default vector. [`ParamLayout`] records how it
//! splits across sub-models; [`pack_pair`] builds the dual-model layout and
//! [`flatten`] exposes the self-contained model's `(vector, rebuild)` pair.

pub mod packing;

pub use self::packing::{flatten, pack_pair, ParamLayout};
