//! Batch broadcast policy

use crate::{SceneError, SceneResult};

/// How a batched entity maps onto the model's batch elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BroadcastPolicy {
    /// One shared instance, logically repeated for every batch element
    Singleton,
    /// One instance per batch element
    PerBatch,
}

impl BroadcastPolicy {
    /// Resolve the policy for data carrying `supplied` batch elements.
    ///
    /// A batch dimension of 1 always broadcasts; anything else must equal
    /// `batch_size`.
    pub fn resolve(grid: &'static str, supplied: usize, batch_size: usize) -> SceneResult<Self> {
        if supplied == 1 {
            Ok(BroadcastPolicy::Singleton)
        } else if supplied == batch_size {
            Ok(BroadcastPolicy::PerBatch)
        } else {
            Err(SceneError::BatchMismatch {
                grid,
                expected: batch_size,
                actual: supplied,
            })
        }
    }

    pub fn is_singleton(self) -> bool {
        self == BroadcastPolicy::Singleton
    }

    /// Number of instances actually stored
    pub fn stored_len(self, batch_size: usize) -> usize {
        match self {
            BroadcastPolicy::Singleton => 1,
            BroadcastPolicy::PerBatch => batch_size,
        }
    }
}
