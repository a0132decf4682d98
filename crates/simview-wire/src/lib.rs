//! SimView Wire - Scene document format
//!
//! This crate implements the document handed to the viewer:
//! - Wire records (model, terrain, bodies, static objects, frames)
//! - JSON encoding and atomic file writes
//! - The viewer feed answering `model` / `states` requests

pub mod document;
pub mod feed;
pub mod io;

pub use document::*;
pub use feed::*;
pub use io::*;
