//! Per-frame body transforms

use simview_core::{AttributeKind, SceneError, SceneResult};

use crate::AttributeValue;

/// Identity orientation, scalar first
pub const IDENTITY_QUATERNION: [f64; 4] = [1.0, 0.0, 0.0, 0.0];

/// How an attribute was named by the caller
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeKey {
    Kind(AttributeKind),
    /// Parsed when the frame is recorded
    Name(String),
}

impl AttributeKey {
    pub fn resolve(&self) -> SceneResult<AttributeKind> {
        match self {
            AttributeKey::Kind(kind) => Ok(*kind),
            AttributeKey::Name(name) => name.parse(),
        }
    }
}

/// Transform of one body across all batch elements, plus optional attributes
#[derive(Debug, Clone, PartialEq)]
pub struct BodyTransform {
    pub name: String,
    /// `[batch][x, y, z]`
    pub positions: Vec<[f64; 3]>,
    /// `[batch][w, x, y, z]`
    pub orientations: Vec<[f64; 4]>,
    pub attributes: Vec<(AttributeKey, AttributeValue)>,
}

impl BodyTransform {
    pub fn new(
        name: impl Into<String>,
        positions: Vec<[f64; 3]>,
        orientations: Vec<[f64; 4]>,
    ) -> Self {
        BodyTransform {
            name: name.into(),
            positions,
            orientations,
            attributes: Vec::new(),
        }
    }

    /// Transform with identity orientation in every batch element
    pub fn upright(name: impl Into<String>, positions: Vec<[f64; 3]>) -> Self {
        let orientations = vec![IDENTITY_QUATERNION; positions.len()];
        BodyTransform::new(name, positions, orientations)
    }

    /// Transform from untyped rows; positions must be N×3, orientations N×4
    pub fn from_rows(
        name: impl Into<String>,
        positions: &[Vec<f64>],
        orientations: &[Vec<f64>],
    ) -> SceneResult<Self> {
        let name = name.into();
        let positions = positions
            .iter()
            .map(|row| match row.as_slice() {
                [x, y, z] => Ok([*x, *y, *z]),
                _ => Err(SceneError::ShapeRankMismatch(format!(
                    "{name}: positions must have shape (N, 3)"
                ))),
            })
            .collect::<SceneResult<Vec<_>>>()?;
        let orientations = orientations
            .iter()
            .map(|row| match row.as_slice() {
                [w, x, y, z] => Ok([*w, *x, *y, *z]),
                _ => Err(SceneError::ShapeRankMismatch(format!(
                    "{name}: orientations must have shape (N, 4)"
                ))),
            })
            .collect::<SceneResult<Vec<_>>>()?;
        Ok(BodyTransform::new(name, positions, orientations))
    }

    pub fn with_attribute(mut self, kind: AttributeKind, value: impl Into<AttributeValue>) -> Self {
        self.attributes.push((AttributeKey::Kind(kind), value.into()));
        self
    }

    /// Attribute given by name, e.g. `"angular_velocity"`
    pub fn with_named_attribute(
        mut self,
        name: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Self {
        self.attributes
            .push((AttributeKey::Name(name.into()), value.into()));
        self
    }

    /// Merge positions and orientations into `[px, py, pz, qw, qx, qy, qz]`
    pub fn merged(&self) -> Vec<[f64; 7]> {
        self.positions
            .iter()
            .zip(&self.orientations)
            .map(|(p, q)| [p[0], p[1], p[2], q[0], q[1], q[2], q[3]])
            .collect()
    }
}
