//! Contact normalization
//!
//! Contacts arrive either as masks over a body's contact points or as index
//! lists. Both are stored as sorted index lists per batch element.

use simview_core::{AttributeKind, SceneError, SceneResult};

/// Contact data of a single batch element
#[derive(Debug, Clone, PartialEq)]
pub enum ContactLeaf {
    Mask(Vec<bool>),
    /// Non-zero entries count as active
    FloatMask(Vec<f64>),
    Indices(Vec<usize>),
}

impl ContactLeaf {
    fn into_indices(self) -> Vec<usize> {
        match self {
            ContactLeaf::Mask(mask) => active(mask.into_iter()),
            ContactLeaf::FloatMask(mask) => active(mask.into_iter().map(|v| v != 0.0)),
            ContactLeaf::Indices(indices) => indices,
        }
    }
}

/// Contact input for all batch elements of one body
#[derive(Debug, Clone, PartialEq)]
pub enum ContactInput {
    /// `[batch, points]` boolean mask
    Mask(Vec<Vec<bool>>),
    /// `[batch, points]` numeric mask
    FloatMask(Vec<Vec<f64>>),
    /// Active indices per batch element, passed through
    Indices(Vec<Vec<usize>>),
    /// One leaf per batch element, each a mask or an index list
    PerBatch(Vec<ContactLeaf>),
}

impl ContactInput {
    /// Active contact indices per batch element
    pub fn normalize(self) -> SceneResult<Vec<Vec<usize>>> {
        let normalized = match self {
            ContactInput::Mask(rows) => rows
                .into_iter()
                .map(|row| ContactLeaf::Mask(row).into_indices())
                .collect(),
            ContactInput::FloatMask(rows) => rows
                .into_iter()
                .map(|row| ContactLeaf::FloatMask(row).into_indices())
                .collect(),
            ContactInput::Indices(rows) => rows,
            ContactInput::PerBatch(leaves) => {
                if leaves.is_empty() {
                    return Err(SceneError::InvalidAttributeFormat {
                        attribute: AttributeKind::Contacts.wire_name(),
                        reason: "per-batch contact list is empty".into(),
                    });
                }
                leaves.into_iter().map(ContactLeaf::into_indices).collect()
            }
        };
        Ok(normalized)
    }

    /// Number of batch elements covered
    pub fn batch_len(&self) -> usize {
        match self {
            ContactInput::Mask(rows) => rows.len(),
            ContactInput::FloatMask(rows) => rows.len(),
            ContactInput::Indices(rows) => rows.len(),
            ContactInput::PerBatch(leaves) => leaves.len(),
        }
    }
}

fn active(mask: impl Iterator<Item = bool>) -> Vec<usize> {
    mask.enumerate()
        .filter_map(|(i, on)| on.then_some(i))
        .collect()
}
