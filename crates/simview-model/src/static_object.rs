//! Static scenery

use simview_core::{Shape, ShapeField, ShapeKind, SceneError, SceneResult};
use simview_wire::StaticObjectRecord;

/// Shapes of a static object: one shared shape, or one per batch element
#[derive(Debug, Clone, PartialEq)]
pub enum StaticShapes {
    Singleton(Shape),
    Batched(Vec<Shape>),
}

/// A named piece of static scenery
#[derive(Debug, Clone, PartialEq)]
pub struct StaticObject {
    name: String,
    shapes: StaticShapes,
}

impl StaticObject {
    /// Object shared by every batch element
    pub fn singleton(name: impl Into<String>, shape: Shape) -> Self {
        StaticObject {
            name: name.into(),
            shapes: StaticShapes::Singleton(shape),
        }
    }

    /// Object with one shape per batch element, all of the same kind
    pub fn batched(name: impl Into<String>, shapes: Vec<Shape>) -> SceneResult<Self> {
        let name = name.into();
        let Some(first) = shapes.first() else {
            return Err(SceneError::EmptyStaticObject(name));
        };

        let kind = first.kind();
        if let Some(other) = shapes.iter().find(|s| s.kind() != kind) {
            return Err(SceneError::ShapeRankMismatch(format!(
                "batched static object {} mixes {} and {} shapes",
                name,
                kind,
                other.kind()
            )));
        }

        Ok(StaticObject {
            name,
            shapes: StaticShapes::Batched(shapes),
        })
    }

    /// Batched object built from per-element named fields of one shape kind
    pub fn batched_from_fields(
        name: impl Into<String>,
        kind: ShapeKind,
        fields: Vec<Vec<(String, ShapeField)>>,
    ) -> SceneResult<Self> {
        let shapes = fields
            .into_iter()
            .map(|f| Shape::from_fields(kind, f))
            .collect::<SceneResult<Vec<_>>>()?;
        StaticObject::batched(name, shapes)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shapes(&self) -> &StaticShapes {
        &self.shapes
    }

    pub fn is_singleton(&self) -> bool {
        matches!(self.shapes, StaticShapes::Singleton(_))
    }

    /// Number of stored shapes
    pub fn shape_count(&self) -> usize {
        match &self.shapes {
            StaticShapes::Singleton(_) => 1,
            StaticShapes::Batched(shapes) => shapes.len(),
        }
    }

    /// Shape seen by batch element `index`
    pub fn shape_for(&self, index: usize) -> Option<&Shape> {
        match &self.shapes {
            StaticShapes::Singleton(shape) => Some(shape),
            StaticShapes::Batched(shapes) => shapes.get(index),
        }
    }

    pub fn to_record(&self) -> StaticObjectRecord {
        let (shape, shapes) = match &self.shapes {
            StaticShapes::Singleton(shape) => (Some(shape.clone()), None),
            StaticShapes::Batched(shapes) => (None, Some(shapes.clone())),
        };
        StaticObjectRecord {
            name: self.name.clone(),
            is_singleton: self.is_singleton(),
            shape,
            shapes,
        }
    }
}
