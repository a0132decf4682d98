//! SimView Scene - Batched rigid-body scene capture
//!
//! Ties the model and the frame recorder together:
//! - `SceneSerializer` flattens a model and its frames into one document
//! - `SimulationScene` owns both and enforces the recording lifecycle
//!
//! Lower layers are re-exported so callers only depend on this crate.

pub mod scene;
pub mod serializer;

pub use scene::*;
pub use serializer::*;

pub use simview_core::*;
pub use simview_model::*;
pub use simview_state::*;
pub use simview_wire::*;

#[cfg(test)]
mod integration;
