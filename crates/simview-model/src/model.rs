//! Scene model - static configuration of one batched simulation

use std::collections::HashMap;

use simview_core::{
    AttributeKind, SceneConfig, SceneError, SceneResult, Shape, ShapeField, ShapeKind,
};
use simview_wire::ModelRecord;

use crate::{Body, GridData, StaticObject, Terrain, TerrainBuilder};

/// Scene model
///
/// Holds the batch size, scalar channels, terrain, dynamic bodies and static
/// objects. Bodies and static objects keep their insertion order, which is
/// the order they are written in.
#[derive(Debug, Clone)]
pub struct SceneModel {
    config: SceneConfig,
    terrain: Option<Terrain>,
    bodies: Vec<Body>,
    body_index: HashMap<String, usize>,
    static_objects: Vec<StaticObject>,
    static_index: HashMap<String, usize>,
}

impl SceneModel {
    /// Create an empty model after validating `config`
    pub fn new(config: SceneConfig) -> SceneResult<Self> {
        config.validate()?;
        Ok(SceneModel {
            config,
            terrain: None,
            bodies: Vec::new(),
            body_index: HashMap::new(),
            static_objects: Vec::new(),
            static_index: HashMap::new(),
        })
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn batch_size(&self) -> usize {
        self.config.batch_size
    }

    pub fn scalar_names(&self) -> &[String] {
        &self.config.scalar_names
    }

    pub fn dt(&self) -> f64 {
        self.config.dt
    }

    pub fn collapse(&self) -> bool {
        self.config.collapse
    }

    // ------------------------------------------------------------------
    // Terrain
    // ------------------------------------------------------------------

    /// Set the terrain. Allowed once.
    pub fn add_terrain(&mut self, terrain: Terrain) -> SceneResult<()> {
        if self.terrain.is_some() {
            return Err(SceneError::DuplicateTerrain);
        }
        if terrain.batch_size() != self.batch_size() {
            return Err(SceneError::batch_size(
                "terrain",
                self.batch_size(),
                terrain.batch_size(),
            ));
        }
        self.terrain = Some(terrain);
        Ok(())
    }

    /// Build terrain from grids with this model's batch size and set it
    pub fn create_terrain(
        &mut self,
        heights: &GridData,
        normals: &GridData,
        x_range: (f64, f64),
        y_range: (f64, f64),
    ) -> SceneResult<()> {
        if self.terrain.is_some() {
            return Err(SceneError::DuplicateTerrain);
        }
        let terrain =
            TerrainBuilder::new(self.batch_size()).create(heights, normals, x_range, y_range)?;
        self.add_terrain(terrain)
    }

    pub fn terrain(&self) -> Option<&Terrain> {
        self.terrain.as_ref()
    }

    // ------------------------------------------------------------------
    // Dynamic bodies
    // ------------------------------------------------------------------

    pub fn add_body(&mut self, body: Body) -> SceneResult<()> {
        if self.body_index.contains_key(body.name()) {
            return Err(SceneError::DuplicateBody(body.name().to_string()));
        }
        tracing::debug!("body {} registered as {}", body.name(), body.shape().kind());
        self.body_index.insert(body.name().to_string(), self.bodies.len());
        self.bodies.push(body);
        Ok(())
    }

    /// Create and register a body, optionally declaring its attributes
    pub fn create_body(
        &mut self,
        name: &str,
        shape: Shape,
        attributes: Option<Vec<AttributeKind>>,
    ) -> SceneResult<()> {
        if self.body_index.contains_key(name) {
            return Err(SceneError::DuplicateBody(name.to_string()));
        }
        let body = match attributes {
            Some(kinds) => Body::with_attributes(name, shape, kinds),
            None => Body::new(name, shape),
        };
        self.add_body(body)
    }

    /// Create and register a body from named shape fields
    pub fn create_body_from_fields<I, K>(
        &mut self,
        name: &str,
        kind: ShapeKind,
        fields: I,
        attributes: Option<Vec<AttributeKind>>,
    ) -> SceneResult<()>
    where
        I: IntoIterator<Item = (K, ShapeField)>,
        K: Into<String>,
    {
        if self.body_index.contains_key(name) {
            return Err(SceneError::DuplicateBody(name.to_string()));
        }
        let shape = Shape::from_fields(kind, fields)?;
        self.create_body(name, shape, attributes)
    }

    pub fn create_box(&mut self, name: &str, hx: f64, hy: f64, hz: f64) -> SceneResult<()> {
        self.create_body(name, Shape::cuboid(hx, hy, hz), None)
    }

    pub fn create_sphere(&mut self, name: &str, radius: f64) -> SceneResult<()> {
        self.create_body(name, Shape::sphere(radius), None)
    }

    pub fn create_cylinder(&mut self, name: &str, radius: f64, height: f64) -> SceneResult<()> {
        self.create_body(name, Shape::cylinder(radius, height), None)
    }

    pub fn create_mesh(
        &mut self,
        name: &str,
        vertices: Vec<[f64; 3]>,
        faces: Vec<[u32; 3]>,
    ) -> SceneResult<()> {
        self.create_body(name, Shape::mesh(vertices, faces), None)
    }

    pub fn create_pointcloud(&mut self, name: &str, points: Vec<[f64; 3]>) -> SceneResult<()> {
        self.create_body(name, Shape::pointcloud(points), None)
    }

    /// Declare the optional attributes of an already registered body
    pub fn set_body_attributes(
        &mut self,
        name: &str,
        kinds: Vec<AttributeKind>,
    ) -> SceneResult<()> {
        let index = *self
            .body_index
            .get(name)
            .ok_or_else(|| SceneError::UnknownBody(name.to_string()))?;
        self.bodies[index].set_available_attributes(kinds)
    }

    pub fn body(&self, name: &str) -> Option<&Body> {
        self.body_index.get(name).map(|&i| &self.bodies[i])
    }

    /// Bodies in insertion order
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    // ------------------------------------------------------------------
    // Static objects
    // ------------------------------------------------------------------

    pub fn add_static_object(&mut self, object: StaticObject) -> SceneResult<()> {
        if self.static_index.contains_key(object.name()) {
            return Err(SceneError::DuplicateStaticObject(object.name().to_string()));
        }
        if !object.is_singleton() && object.shape_count() != self.batch_size() {
            return Err(SceneError::batch_size(
                format!("batched static object {}", object.name()),
                self.batch_size(),
                object.shape_count(),
            ));
        }
        tracing::debug!(
            singleton = object.is_singleton(),
            "static object {} registered",
            object.name()
        );
        self.static_index
            .insert(object.name().to_string(), self.static_objects.len());
        self.static_objects.push(object);
        Ok(())
    }

    pub fn create_static_object_singleton(&mut self, name: &str, shape: Shape) -> SceneResult<()> {
        self.add_static_object(StaticObject::singleton(name, shape))
    }

    pub fn create_static_object_batched(
        &mut self,
        name: &str,
        shapes: Vec<Shape>,
    ) -> SceneResult<()> {
        if shapes.len() != self.batch_size() {
            return Err(SceneError::batch_size(
                format!("batched static object {name}"),
                self.batch_size(),
                shapes.len(),
            ));
        }
        self.add_static_object(StaticObject::batched(name, shapes)?)
    }

    pub fn static_object(&self, name: &str) -> Option<&StaticObject> {
        self.static_index.get(name).map(|&i| &self.static_objects[i])
    }

    /// Static objects in insertion order
    pub fn static_objects(&self) -> &[StaticObject] {
        &self.static_objects
    }

    // ------------------------------------------------------------------
    // Serialization
    // ------------------------------------------------------------------

    /// Drop terrain, bodies and static objects, keeping the configuration
    pub fn clear(&mut self) {
        self.terrain = None;
        self.bodies.clear();
        self.body_index.clear();
        self.static_objects.clear();
        self.static_index.clear();
    }

    /// A model is complete once it has terrain
    pub fn is_complete(&self) -> bool {
        self.terrain.is_some()
    }

    /// Wire record of the model
    pub fn serialize(&self) -> SceneResult<ModelRecord> {
        let terrain = self.terrain.as_ref().ok_or(SceneError::IncompleteModel)?;
        if self.bodies.is_empty() {
            tracing::warn!("no dynamic bodies defined in the model");
        }

        Ok(ModelRecord {
            sim_batches: self.batch_size(),
            scalar_names: self.config.scalar_names.clone(),
            dt: self.config.dt,
            collapse: self.config.collapse,
            terrain: terrain.to_record(),
            bodies: self.bodies.iter().map(Body::to_record).collect(),
            static_objects: self
                .static_objects
                .iter()
                .map(StaticObject::to_record)
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simview_core::ErrorCategory;

    fn model(batch_size: usize) -> SceneModel {
        SceneModel::new(SceneConfig::new(batch_size, ["energy"], 0.1)).unwrap()
    }

    fn flat_terrain(model: &mut SceneModel) {
        model
            .create_terrain(
                &GridData::filled(vec![4, 4], 0.0),
                &GridData::uniform_normals(4, 4, [0.0, 0.0, 1.0]),
                (-5.0, 5.0),
                (-5.0, 5.0),
            )
            .unwrap();
    }

    #[test]
    fn test_terrain_set_once() {
        let mut model = model(2);
        assert!(!model.is_complete());

        flat_terrain(&mut model);
        assert!(model.is_complete());

        let err = model
            .create_terrain(
                &GridData::filled(vec![4, 4], 1.0),
                &GridData::uniform_normals(4, 4, [0.0, 0.0, 1.0]),
                (0.0, 1.0),
                (0.0, 1.0),
            )
            .unwrap_err();
        assert!(matches!(err, SceneError::DuplicateTerrain));
        assert_eq!(err.category(), ErrorCategory::Construction);
        assert_eq!(model.terrain().unwrap().extent_x(), 10.0);
    }

    #[test]
    fn test_terrain_batch_size_must_match_model() {
        let terrain = TerrainBuilder::new(3)
            .create(
                &GridData::filled(vec![3, 2, 2], 0.0),
                &GridData::uniform_normals(2, 2, [0.0, 0.0, 1.0]),
                (0.0, 1.0),
                (0.0, 1.0),
            )
            .unwrap();

        let mut model = model(2);
        assert!(matches!(
            model.add_terrain(terrain),
            Err(SceneError::BatchSizeMismatch { .. })
        ));
        assert!(!model.is_complete());
    }

    #[test]
    fn test_duplicate_body() {
        let mut model = model(2);
        model.create_box("Box", 0.5, 0.5, 0.5).unwrap();

        let err = model.create_sphere("Box", 1.0).unwrap_err();
        assert!(matches!(err, SceneError::DuplicateBody(ref name) if name == "Box"));

        let err = model
            .add_body(Body::new("Box", Shape::sphere(1.0)))
            .unwrap_err();
        assert!(matches!(err, SceneError::DuplicateBody(_)));
        assert_eq!(model.bodies().len(), 1);
    }

    #[test]
    fn test_body_from_fields() {
        let mut model = model(1);
        model
            .create_body_from_fields(
                "ball",
                ShapeKind::Sphere,
                [("radius", ShapeField::Scalar(0.2))],
                Some(vec![AttributeKind::Velocity]),
            )
            .unwrap();

        let ball = model.body("ball").unwrap();
        assert_eq!(ball.shape(), &Shape::sphere(0.2));
        assert!(ball.declares(AttributeKind::Velocity));

        let err = model
            .create_body_from_fields("cube", ShapeKind::Box, [("hx", ShapeField::Scalar(1.0))], None)
            .unwrap_err();
        assert!(matches!(err, SceneError::MissingField { field: "hy", .. }));
        assert!(model.body("cube").is_none());
    }

    #[test]
    fn test_set_body_attributes() {
        let mut model = model(1);
        model.create_cylinder("wheel", 0.3, 0.1).unwrap();

        model
            .set_body_attributes("wheel", vec![AttributeKind::Contacts])
            .unwrap();
        assert!(matches!(
            model.set_body_attributes("wheel", vec![AttributeKind::Force]),
            Err(SceneError::AttributesAlreadySet(_))
        ));
        assert!(matches!(
            model.set_body_attributes("axle", vec![AttributeKind::Force]),
            Err(SceneError::UnknownBody(_))
        ));
    }

    #[test]
    fn test_static_objects() {
        let mut model = model(2);
        model
            .create_static_object_singleton("rock", Shape::sphere(0.4))
            .unwrap();
        model
            .create_static_object_batched(
                "walls",
                vec![Shape::cuboid(1.0, 0.1, 1.0), Shape::cuboid(2.0, 0.1, 1.0)],
            )
            .unwrap();

        assert!(matches!(
            model.create_static_object_singleton("rock", Shape::sphere(1.0)),
            Err(SceneError::DuplicateStaticObject(_))
        ));

        let err = model
            .create_static_object_batched("posts", vec![Shape::sphere(1.0)])
            .unwrap_err();
        assert!(matches!(
            err,
            SceneError::BatchSizeMismatch {
                expected: 2,
                actual: 1,
                ..
            }
        ));

        let three = StaticObject::batched("posts", vec![Shape::sphere(1.0); 3]).unwrap();
        assert!(model.add_static_object(three).is_err());
        assert!(model.static_object("posts").is_none());

        // Bodies and static objects live in separate namespaces
        model.create_sphere("rock", 0.1).unwrap();
        assert_eq!(model.static_objects().len(), 2);
    }

    #[test]
    fn test_serialize_requires_terrain() {
        let model = model(1);
        assert!(matches!(model.serialize(), Err(SceneError::IncompleteModel)));
    }

    #[test]
    fn test_serialize_keeps_insertion_order() {
        let mut model = model(2);
        flat_terrain(&mut model);
        for name in ["zeta", "alpha", "mid"] {
            model.create_sphere(name, 0.1).unwrap();
        }
        for name in ["z_wall", "a_wall"] {
            model
                .create_static_object_singleton(name, Shape::cuboid(1.0, 1.0, 1.0))
                .unwrap();
        }

        let record = model.serialize().unwrap();
        let bodies: Vec<_> = record.bodies.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(bodies, ["zeta", "alpha", "mid"]);
        let statics: Vec<_> = record.static_objects.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(statics, ["z_wall", "a_wall"]);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["simBatches"], serde_json::json!(2));
        assert_eq!(json["scalarNames"], serde_json::json!(["energy"]));
        assert_eq!(json["dt"], serde_json::json!(0.1));
        assert_eq!(json["collapse"], serde_json::json!(false));
        assert_eq!(json["terrain"]["isSingleton"], serde_json::json!(true));
    }
}
