//! SimView State - Per-frame body state recording
//!
//! Frames are validated against a scene model before they are appended:
//! scalar channels, batch lengths, body names and optional attributes.

pub mod contacts;
pub mod frame;
pub mod recorder;
pub mod transform;
pub mod values;

pub use contacts::*;
pub use frame::*;
pub use recorder::*;
pub use transform::*;
pub use values::*;
