//! Scene serializer - model plus frames into one document

use std::path::Path;

use simview_core::{SaveOptions, SceneError, SceneResult};
use simview_model::SceneModel;
use simview_state::BodyStateRecorder;
use simview_wire::{encode_document, read_document, write_document, SceneDocument};

/// Flattens a model and its recorded frames into a [`SceneDocument`]
#[derive(Debug, Clone, Copy)]
pub struct SceneSerializer<'a> {
    model: &'a SceneModel,
    recorder: &'a BodyStateRecorder,
}

impl<'a> SceneSerializer<'a> {
    pub fn new(model: &'a SceneModel, recorder: &'a BodyStateRecorder) -> Self {
        SceneSerializer { model, recorder }
    }

    /// In-memory document. Fails with `IncompleteModel` without terrain.
    pub fn to_document(&self) -> SceneResult<SceneDocument> {
        if !self.model.is_complete() {
            return Err(SceneError::IncompleteModel);
        }
        Ok(SceneDocument {
            model: self.model.serialize()?,
            states: self.recorder.to_records(),
        })
    }

    pub fn to_json_string(&self, pretty: bool) -> SceneResult<String> {
        encode_document(&self.to_document()?, pretty)
    }

    /// Write the document to `path`
    pub fn save(&self, path: impl AsRef<Path>, options: &SaveOptions) -> SceneResult<()> {
        let path = path.as_ref();
        let document = self.to_document()?;
        write_document(path, &document, options)?;
        tracing::info!(
            frames = document.states.len(),
            bodies = document.model.bodies.len(),
            "scene saved to {}",
            path.display()
        );
        Ok(())
    }

    /// Parse a saved document
    pub fn load(path: impl AsRef<Path>) -> SceneResult<SceneDocument> {
        read_document(path.as_ref())
    }
}
