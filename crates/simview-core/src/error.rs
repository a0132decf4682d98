//! Error types for SimView scene recording

use std::path::PathBuf;

use thiserror::Error;

/// Error class, used by callers to decide which input to correct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Duplicate name, missing required field
    Construction,
    /// Batch-size, scalar-key or shape-rank mismatch
    Validation,
    /// Unrecognized attribute type or shape
    Format,
    /// Operation not allowed in the current lifecycle state
    State,
    /// Filesystem or encoding failure
    Io,
}

/// Core SimView errors
#[derive(Error, Debug)]
pub enum SceneError {
    // Construction errors
    #[error("Terrain already exists")]
    DuplicateTerrain,

    #[error("Dynamic body {0} already exists")]
    DuplicateBody(String),

    #[error("Static object {0} already exists")]
    DuplicateStaticObject(String),

    #[error("Scalar channel {0} declared twice")]
    DuplicateScalarName(String),

    #[error("Scalar channel name {0} is reserved by the frame layout")]
    ReservedScalarName(String),

    #[error("Batch size must be positive, got {0}")]
    InvalidBatchSize(usize),

    #[error("Shape {shape} requires field {field}")]
    MissingField { shape: &'static str, field: &'static str },

    #[error("Shape {shape} does not accept field {field}")]
    UnknownShapeField { shape: &'static str, field: String },

    #[error("Available attributes already set for body {0}")]
    AttributesAlreadySet(String),

    #[error("Batched static object {0} needs at least one shape")]
    EmptyStaticObject(String),

    // Validation errors
    #[error("{what}: expected {expected} batch elements, got {actual}")]
    BatchSizeMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },

    #[error("Terrain {grid} batch dimension {actual} must be 1 or {expected}")]
    BatchMismatch {
        grid: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Scalar keys do not match declared channels (missing {missing:?}, extra {extra:?})")]
    ScalarKeyMismatch {
        missing: Vec<String>,
        extra: Vec<String>,
    },

    #[error("Shape rank mismatch: {0}")]
    ShapeRankMismatch(String),

    #[error("Body {0} is not declared on the model")]
    UnknownBody(String),

    #[error("Body {0} appears twice in one frame")]
    DuplicateBodyState(String),

    #[error("Frame time {time} does not advance past {previous}")]
    NonMonotonicTime { time: f64, previous: f64 },

    #[error("Scalar channel {0} supplied twice in one frame")]
    DuplicateScalarKey(String),

    #[error("{what} contains a non-finite value")]
    NonFiniteValue { what: String },

    // Format errors
    #[error("Unknown shape type: {0}")]
    UnknownShape(String),

    #[error("Unknown optional attribute: {0}")]
    UnknownAttribute(String),

    #[error("Body {body} does not declare attribute {attribute}")]
    UndeclaredAttribute { body: String, attribute: &'static str },

    #[error("Invalid format for attribute {attribute}: {reason}")]
    InvalidAttributeFormat {
        attribute: &'static str,
        reason: String,
    },

    // Lifecycle errors
    #[error("Model is not complete: terrain is missing")]
    IncompleteModel,

    #[error("Model cannot change after recording started")]
    RecordingStarted,

    #[error("Scene was already saved and is sealed")]
    SceneSealed,

    #[error("Scene data was cleared")]
    SceneCleared,

    // I/O errors
    #[error("Scene document not found: {0}")]
    DocumentNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SceneError {
    /// Error class of this error
    pub fn category(&self) -> ErrorCategory {
        use SceneError::*;

        match self {
            DuplicateTerrain
            | DuplicateBody(_)
            | DuplicateStaticObject(_)
            | DuplicateScalarName(_)
            | ReservedScalarName(_)
            | InvalidBatchSize(_)
            | MissingField { .. }
            | UnknownShapeField { .. }
            | AttributesAlreadySet(_)
            | EmptyStaticObject(_) => ErrorCategory::Construction,

            BatchSizeMismatch { .. }
            | BatchMismatch { .. }
            | ScalarKeyMismatch { .. }
            | ShapeRankMismatch(_)
            | UnknownBody(_)
            | DuplicateBodyState(_)
            | NonMonotonicTime { .. }
            | DuplicateScalarKey(_)
            | NonFiniteValue { .. } => ErrorCategory::Validation,

            UnknownShape(_)
            | UnknownAttribute(_)
            | UndeclaredAttribute { .. }
            | InvalidAttributeFormat { .. } => ErrorCategory::Format,

            IncompleteModel | RecordingStarted | SceneSealed | SceneCleared => {
                ErrorCategory::State
            }

            DocumentNotFound(_) | Io(_) | Json(_) => ErrorCategory::Io,
        }
    }

    /// Fail with `NonFiniteValue` if any of `values` is NaN or infinite
    pub fn check_finite<'a, I>(what: impl FnOnce() -> String, values: I) -> SceneResult<()>
    where
        I: IntoIterator<Item = &'a f64>,
    {
        if values.into_iter().all(|v| v.is_finite()) {
            Ok(())
        } else {
            Err(SceneError::NonFiniteValue { what: what() })
        }
    }

    /// Shorthand for a batch length check failure
    pub fn batch_size(what: impl Into<String>, expected: usize, actual: usize) -> Self {
        SceneError::BatchSizeMismatch {
            what: what.into(),
            expected,
            actual,
        }
    }
}

/// Result type for SimView operations
pub type SceneResult<T> = Result<T, SceneError>;
