//! SimView Model - Static scene configuration
//!
//! This crate implements the scene model declared before recording starts:
//! - Terrain built from height and normal grids
//! - Dynamic bodies and their optional attribute declarations
//! - Static objects, shared or per batch element
//! - Cross-entity checks against the model batch size

pub mod body;
pub mod model;
pub mod static_object;
pub mod terrain;

pub use body::*;
pub use model::*;
pub use static_object::*;
pub use terrain::*;
