//! Shape descriptors for dynamic bodies and static objects
//!
//! Every shape kind carries a fixed set of typed fields. Unrecognized fields
//! are rejected both when parsing a document and when building a shape from
//! named fields at runtime.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{SceneError, SceneResult};

/// Shape kind tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Box,
    Sphere,
    Cylinder,
    Mesh,
    Pointcloud,
}

impl ShapeKind {
    /// All shape kinds
    pub const ALL: [ShapeKind; 5] = [
        ShapeKind::Box,
        ShapeKind::Sphere,
        ShapeKind::Cylinder,
        ShapeKind::Mesh,
        ShapeKind::Pointcloud,
    ];

    /// Wire tag of this kind
    pub fn as_str(self) -> &'static str {
        match self {
            ShapeKind::Box => "box",
            ShapeKind::Sphere => "sphere",
            ShapeKind::Cylinder => "cylinder",
            ShapeKind::Mesh => "mesh",
            ShapeKind::Pointcloud => "pointcloud",
        }
    }

    /// Fields accepted by this kind, all of them required
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            ShapeKind::Box => &["hx", "hy", "hz"],
            ShapeKind::Sphere => &["radius"],
            ShapeKind::Cylinder => &["radius", "height"],
            ShapeKind::Mesh => &["vertices", "faces"],
            ShapeKind::Pointcloud => &["points"],
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShapeKind {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShapeKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| SceneError::UnknownShape(s.to_string()))
    }
}

/// Shape descriptor
///
/// Serialized as `{"type": "<kind>", ...fields}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", deny_unknown_fields)]
pub enum Shape {
    /// Box given by its half extents
    Box { hx: f64, hy: f64, hz: f64 },
    Sphere { radius: f64 },
    Cylinder { radius: f64, height: f64 },
    /// Triangle mesh; faces index into vertices
    Mesh {
        vertices: Vec<[f64; 3]>,
        faces: Vec<[u32; 3]>,
    },
    Pointcloud { points: Vec<[f64; 3]> },
}

/// Untyped field value used by [`Shape::from_fields`]
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeField {
    Scalar(f64),
    /// Rows of coordinates, expected N×3
    Points(Vec<Vec<f64>>),
    /// Rows of vertex indices, expected M×3
    Indices(Vec<Vec<u32>>),
}

impl From<f64> for ShapeField {
    fn from(v: f64) -> Self {
        ShapeField::Scalar(v)
    }
}

impl From<Vec<Vec<f64>>> for ShapeField {
    fn from(v: Vec<Vec<f64>>) -> Self {
        ShapeField::Points(v)
    }
}

impl From<Vec<Vec<u32>>> for ShapeField {
    fn from(v: Vec<Vec<u32>>) -> Self {
        ShapeField::Indices(v)
    }
}

impl Shape {
    pub fn cuboid(hx: f64, hy: f64, hz: f64) -> Self {
        Shape::Box { hx, hy, hz }
    }

    pub fn sphere(radius: f64) -> Self {
        Shape::Sphere { radius }
    }

    pub fn cylinder(radius: f64, height: f64) -> Self {
        Shape::Cylinder { radius, height }
    }

    pub fn mesh(vertices: Vec<[f64; 3]>, faces: Vec<[u32; 3]>) -> Self {
        Shape::Mesh { vertices, faces }
    }

    pub fn pointcloud(points: Vec<[f64; 3]>) -> Self {
        Shape::Pointcloud { points }
    }

    /// Kind tag of this shape
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Box { .. } => ShapeKind::Box,
            Shape::Sphere { .. } => ShapeKind::Sphere,
            Shape::Cylinder { .. } => ShapeKind::Cylinder,
            Shape::Mesh { .. } => ShapeKind::Mesh,
            Shape::Pointcloud { .. } => ShapeKind::Pointcloud,
        }
    }

    /// Build a shape from named fields.
    ///
    /// Fails with `UnknownShapeField` for a field the kind does not define,
    /// `MissingField` when a required field is absent and `ShapeRankMismatch`
    /// when a value has the wrong type or a vertex list is not N×3.
    pub fn from_fields<I, K>(kind: ShapeKind, fields: I) -> SceneResult<Shape>
    where
        I: IntoIterator<Item = (K, ShapeField)>,
        K: Into<String>,
    {
        let mut fields = FieldSet::collect(kind, fields)?;

        let shape = match kind {
            ShapeKind::Box => Shape::Box {
                hx: fields.scalar("hx")?,
                hy: fields.scalar("hy")?,
                hz: fields.scalar("hz")?,
            },
            ShapeKind::Sphere => Shape::Sphere {
                radius: fields.scalar("radius")?,
            },
            ShapeKind::Cylinder => Shape::Cylinder {
                radius: fields.scalar("radius")?,
                height: fields.scalar("height")?,
            },
            ShapeKind::Mesh => Shape::Mesh {
                vertices: fields.points("vertices")?,
                faces: fields.indices("faces")?,
            },
            ShapeKind::Pointcloud => Shape::Pointcloud {
                points: fields.points("points")?,
            },
        };

        Ok(shape)
    }
}

/// Named fields checked against a shape kind
struct FieldSet {
    kind: ShapeKind,
    values: HashMap<String, ShapeField>,
}

impl FieldSet {
    fn collect<I, K>(kind: ShapeKind, fields: I) -> SceneResult<Self>
    where
        I: IntoIterator<Item = (K, ShapeField)>,
        K: Into<String>,
    {
        let mut values = HashMap::new();
        for (name, value) in fields {
            let name = name.into();
            if !kind.fields().contains(&name.as_str()) {
                return Err(SceneError::UnknownShapeField {
                    shape: kind.as_str(),
                    field: name,
                });
            }
            values.insert(name, value);
        }
        Ok(FieldSet { kind, values })
    }

    fn take(&mut self, field: &'static str) -> SceneResult<ShapeField> {
        self.values.remove(field).ok_or(SceneError::MissingField {
            shape: self.kind.as_str(),
            field,
        })
    }

    fn scalar(&mut self, field: &'static str) -> SceneResult<f64> {
        match self.take(field)? {
            ShapeField::Scalar(v) => Ok(v),
            _ => Err(SceneError::ShapeRankMismatch(format!(
                "{}.{} must be a scalar",
                self.kind, field
            ))),
        }
    }

    fn points(&mut self, field: &'static str) -> SceneResult<Vec<[f64; 3]>> {
        let rows = match self.take(field)? {
            ShapeField::Points(rows) => rows,
            _ => {
                return Err(SceneError::ShapeRankMismatch(format!(
                    "{}.{} must be a list of coordinates",
                    self.kind, field
                )))
            }
        };
        rows.into_iter()
            .map(|row| match row.as_slice() {
                [x, y, z] => Ok([*x, *y, *z]),
                _ => Err(self.not_triplets(field)),
            })
            .collect()
    }

    fn indices(&mut self, field: &'static str) -> SceneResult<Vec<[u32; 3]>> {
        let rows = match self.take(field)? {
            ShapeField::Indices(rows) => rows,
            _ => {
                return Err(SceneError::ShapeRankMismatch(format!(
                    "{}.{} must be a list of vertex indices",
                    self.kind, field
                )))
            }
        };
        rows.into_iter()
            .map(|row| match row.as_slice() {
                [a, b, c] => Ok([*a, *b, *c]),
                _ => Err(self.not_triplets(field)),
            })
            .collect()
    }

    fn not_triplets(&self, field: &str) -> SceneError {
        SceneError::ShapeRankMismatch(format!("{}.{} must have shape (N, 3)", self.kind, field))
    }
}
