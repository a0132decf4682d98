//! Simulation scene - one model, one recorder, one lifecycle
//!
//! The scene moves through three states. While `Recording`, the model may be
//! populated until the first frame is added and frames may be appended.
//! After a successful save the scene is `Saved` and only re-saving is
//! allowed. After `clear` every operation fails.

use std::path::Path;

use simview_core::{AttributeKind, SaveOptions, SceneConfig, SceneError, SceneResult, Shape};
use simview_model::{Body, GridData, SceneModel, StaticObject, Terrain};
use simview_state::{BodyStateRecorder, BodyTransform};
use simview_wire::SceneDocument;

use crate::SceneSerializer;

/// Lifecycle state of a [`SimulationScene`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneStatus {
    Recording,
    Saved,
    Cleared,
}

/// Batched simulation scene
#[derive(Debug, Clone)]
pub struct SimulationScene {
    model: SceneModel,
    recorder: BodyStateRecorder,
    save_options: SaveOptions,
    status: SceneStatus,
}

impl SimulationScene {
    pub fn new(config: SceneConfig) -> SceneResult<Self> {
        Ok(SimulationScene {
            model: SceneModel::new(config)?,
            recorder: BodyStateRecorder::new(),
            save_options: SaveOptions::default(),
            status: SceneStatus::Recording,
        })
    }

    /// Options used by [`SimulationScene::save`]
    pub fn with_save_options(mut self, options: SaveOptions) -> Self {
        self.save_options = options;
        self
    }

    pub fn status(&self) -> SceneStatus {
        self.status
    }

    pub fn model(&self) -> &SceneModel {
        &self.model
    }

    pub fn recorder(&self) -> &BodyStateRecorder {
        &self.recorder
    }

    pub fn batch_size(&self) -> usize {
        self.model.batch_size()
    }

    // ------------------------------------------------------------------
    // Model construction
    // ------------------------------------------------------------------

    pub fn create_terrain(
        &mut self,
        heights: &GridData,
        normals: &GridData,
        x_range: (f64, f64),
        y_range: (f64, f64),
    ) -> SceneResult<()> {
        self.check_model_mutable()?;
        self.model
            .create_terrain(heights, normals, x_range, y_range)
    }

    pub fn add_terrain(&mut self, terrain: Terrain) -> SceneResult<()> {
        self.check_model_mutable()?;
        self.model.add_terrain(terrain)
    }

    pub fn create_body(
        &mut self,
        name: &str,
        shape: Shape,
        attributes: Option<Vec<AttributeKind>>,
    ) -> SceneResult<()> {
        self.check_model_mutable()?;
        self.model.create_body(name, shape, attributes)
    }

    pub fn add_body(&mut self, body: Body) -> SceneResult<()> {
        self.check_model_mutable()?;
        self.model.add_body(body)
    }

    pub fn set_body_attributes(
        &mut self,
        name: &str,
        kinds: Vec<AttributeKind>,
    ) -> SceneResult<()> {
        self.check_model_mutable()?;
        self.model.set_body_attributes(name, kinds)
    }

    pub fn create_static_object_singleton(&mut self, name: &str, shape: Shape) -> SceneResult<()> {
        self.check_model_mutable()?;
        self.model.create_static_object_singleton(name, shape)
    }

    pub fn create_static_object_batched(
        &mut self,
        name: &str,
        shapes: Vec<Shape>,
    ) -> SceneResult<()> {
        self.check_model_mutable()?;
        self.model.create_static_object_batched(name, shapes)
    }

    pub fn add_static_object(&mut self, object: StaticObject) -> SceneResult<()> {
        self.check_model_mutable()?;
        self.model.add_static_object(object)
    }

    // ------------------------------------------------------------------
    // Recording
    // ------------------------------------------------------------------

    /// Record one frame
    pub fn add_state<I, K>(
        &mut self,
        time: f64,
        transforms: Vec<BodyTransform>,
        scalars: I,
    ) -> SceneResult<()>
    where
        I: IntoIterator<Item = (K, Vec<f64>)>,
        K: Into<String>,
    {
        self.check_open()?;
        self.recorder
            .add_state(&self.model, time, transforms, scalars)
    }

    // ------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------

    pub fn to_document(&self) -> SceneResult<SceneDocument> {
        self.check_not_cleared()?;
        self.serializer().to_document()
    }

    /// Save the scene to `path` and seal it
    pub fn save(&mut self, path: impl AsRef<Path>) -> SceneResult<()> {
        self.check_not_cleared()?;
        self.serializer().save(path, &self.save_options)?;
        self.status = SceneStatus::Saved;
        Ok(())
    }

    /// Release all scene data. Every later operation fails with
    /// `SceneCleared`.
    pub fn clear(&mut self) {
        self.model.clear();
        self.recorder.clear();
        self.status = SceneStatus::Cleared;
        tracing::debug!("scene cleared");
    }

    fn serializer(&self) -> SceneSerializer<'_> {
        SceneSerializer::new(&self.model, &self.recorder)
    }

    fn check_not_cleared(&self) -> SceneResult<()> {
        match self.status {
            SceneStatus::Cleared => Err(SceneError::SceneCleared),
            _ => Ok(()),
        }
    }

    fn check_open(&self) -> SceneResult<()> {
        match self.status {
            SceneStatus::Recording => Ok(()),
            SceneStatus::Saved => Err(SceneError::SceneSealed),
            SceneStatus::Cleared => Err(SceneError::SceneCleared),
        }
    }

    fn check_model_mutable(&self) -> SceneResult<()> {
        self.check_open()?;
        if !self.recorder.is_empty() {
            return Err(SceneError::RecordingStarted);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simview_core::ErrorCategory;

    fn scene() -> SimulationScene {
        let mut scene = SimulationScene::new(SceneConfig::new(2, ["energy"], 0.1)).unwrap();
        scene
            .create_terrain(
                &GridData::filled(vec![4, 4], 0.0),
                &GridData::uniform_normals(4, 4, [0.0, 0.0, 1.0]),
                (-1.0, 1.0),
                (-1.0, 1.0),
            )
            .unwrap();
        scene
            .create_body("Box", Shape::cuboid(0.5, 0.5, 0.5), None)
            .unwrap();
        scene
    }

    fn frame(scene: &mut SimulationScene, time: f64) -> SceneResult<()> {
        scene.add_state(
            time,
            vec![BodyTransform::upright(
                "Box",
                vec![[0.0, 0.0, 1.0], [2.0, 0.0, 1.0]],
            )],
            vec![("energy", vec![10.0, 5.0])],
        )
    }

    #[test]
    fn test_model_frozen_after_first_frame() {
        let mut scene = scene();
        frame(&mut scene, 0.0).unwrap();

        let err = scene.create_body("late", Shape::sphere(0.1), None).unwrap_err();
        assert!(matches!(err, SceneError::RecordingStarted));
        assert_eq!(err.category(), ErrorCategory::State);
        assert!(matches!(
            scene.create_static_object_singleton("rock", Shape::sphere(1.0)),
            Err(SceneError::RecordingStarted)
        ));

        frame(&mut scene, 0.1).unwrap();
        assert_eq!(scene.recorder().len(), 2);
    }

    #[test]
    fn test_sealed_after_save() {
        let mut scene = scene();
        frame(&mut scene, 0.0).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.json");
        scene.save(&path).unwrap();
        assert_eq!(scene.status(), SceneStatus::Saved);

        assert!(matches!(frame(&mut scene, 0.1), Err(SceneError::SceneSealed)));
        assert!(matches!(
            scene.create_body("late", Shape::sphere(0.1), None),
            Err(SceneError::SceneSealed)
        ));

        let first = std::fs::read_to_string(&path).unwrap();
        scene.save(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), first);
    }

    #[test]
    fn test_failed_save_keeps_recording() {
        let mut scene = SimulationScene::new(SceneConfig::default()).unwrap();
        let dir = tempfile::tempdir().unwrap();

        let err = scene.save(dir.path().join("scene.json")).unwrap_err();
        assert!(matches!(err, SceneError::IncompleteModel));
        assert_eq!(scene.status(), SceneStatus::Recording);

        scene.create_body("ball", Shape::sphere(0.2), None).unwrap();
    }

    #[test]
    fn test_cleared_scene_rejects_everything() {
        let mut scene = scene();
        frame(&mut scene, 0.0).unwrap();
        scene.clear();

        assert!(scene.recorder().is_empty());
        assert!(scene.model().bodies().is_empty());
        assert!(matches!(frame(&mut scene, 1.0), Err(SceneError::SceneCleared)));
        assert!(matches!(
            scene.create_body("Box", Shape::sphere(0.1), None),
            Err(SceneError::SceneCleared)
        ));
        assert!(matches!(scene.to_document(), Err(SceneError::SceneCleared)));

        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            scene.save(dir.path().join("scene.json")),
            Err(SceneError::SceneCleared)
        ));
    }

    #[test]
    fn test_compact_save_options() {
        let mut scene = scene().with_save_options(SaveOptions::compact());
        frame(&mut scene, 0.0).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.json");
        scene.save(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(!text.contains('\n'));
    }
}
