//! SimView Core - Fundamental types for batched scene recording
//!
//! This crate defines the types shared by every SimView layer:
//! - Errors and their categories
//! - Scene and save configuration
//! - Shape descriptors for bodies and static objects
//! - Optional body attribute kinds
//! - Batch broadcast policy

pub mod attribute;
pub mod config;
pub mod error;
pub mod policy;
pub mod shape;

pub use attribute::*;
pub use config::*;
pub use error::*;
pub use policy::*;
pub use shape::*;
