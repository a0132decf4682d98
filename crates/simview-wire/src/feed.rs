//! Viewer feed - answers viewer requests from a saved document
//!
//! The viewer pulls the `model` section and the `states` section with two
//! separate requests. Failures are reported as an `error` event instead of
//! being returned, since the viewer has no other error channel.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::{json, Value};

use simview_core::{SceneError, SceneResult};

/// Logical viewer request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerRequest {
    GetModel,
    GetStates,
}

impl ViewerRequest {
    /// Parse a request event name (`get_model`, `get_states`)
    pub fn from_event(name: &str) -> Option<Self> {
        match name {
            "get_model" => Some(ViewerRequest::GetModel),
            "get_states" => Some(ViewerRequest::GetStates),
            _ => None,
        }
    }

    /// Document section answering this request
    pub fn section(self) -> &'static str {
        match self {
            ViewerRequest::GetModel => "model",
            ViewerRequest::GetStates => "states",
        }
    }

    fn failure_message(self) -> &'static str {
        match self {
            ViewerRequest::GetModel => "Error loading model",
            ViewerRequest::GetStates => "Error loading states",
        }
    }
}

/// Event sent back to the viewer
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerEvent {
    /// `model`, `states` or `error`
    pub name: &'static str,
    pub payload: Value,
}

impl ViewerEvent {
    pub fn is_error(&self) -> bool {
        self.name == "error"
    }
}

/// Serves sections of a saved scene document
#[derive(Debug, Clone)]
pub struct DocumentFeed {
    path: PathBuf,
}

impl DocumentFeed {
    /// Open a feed over an existing document
    pub fn open(path: impl AsRef<Path>) -> SceneResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(SceneError::DocumentNotFound(path.to_path_buf()));
        }
        Ok(DocumentFeed {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Answer one request. The document is re-read every time and nothing is
    /// kept in memory between requests.
    pub fn respond(&self, request: ViewerRequest) -> ViewerEvent {
        match self.load_section(request.section()) {
            Ok(payload) => ViewerEvent {
                name: request.section(),
                payload,
            },
            Err(e) => {
                tracing::warn!("{}: {}", request.failure_message(), e);
                ViewerEvent {
                    name: "error",
                    payload: json!({ "message": request.failure_message() }),
                }
            }
        }
    }

    fn load_section(&self, section: &str) -> SceneResult<Value> {
        let text = fs::read_to_string(&self.path)?;
        let mut document: Value = serde_json::from_str(&text)?;
        document.get_mut(section).map(Value::take).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("document has no {section} section"),
            )
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.json");
        fs::write(&path, r#"{"model": {"simBatches": 2}, "states": [{"time": 0.0}]}"#).unwrap();

        let feed = DocumentFeed::open(&path).unwrap();

        let event = feed.respond(ViewerRequest::GetModel);
        assert_eq!(event.name, "model");
        assert_eq!(event.payload, json!({"simBatches": 2}));

        let event = feed.respond(ViewerRequest::GetStates);
        assert_eq!(event.name, "states");
        assert_eq!(event.payload, json!([{"time": 0.0}]));
    }

    #[test]
    fn test_feed_reports_errors_as_events() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.json");
        fs::write(&path, "{\"model\": ").unwrap();

        let feed = DocumentFeed::open(&path).unwrap();
        let event = feed.respond(ViewerRequest::GetModel);
        assert!(event.is_error());
        assert_eq!(event.payload, json!({"message": "Error loading model"}));

        fs::write(&path, r#"{"model": {}}"#).unwrap();
        let event = feed.respond(ViewerRequest::GetStates);
        assert_eq!(event.payload, json!({"message": "Error loading states"}));
    }

    #[test]
    fn test_feed_requires_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            DocumentFeed::open(dir.path().join("nope.json")),
            Err(SceneError::DocumentNotFound(_))
        ));
    }

    #[test]
    fn test_request_names() {
        assert_eq!(ViewerRequest::from_event("get_model"), Some(ViewerRequest::GetModel));
        assert_eq!(ViewerRequest::from_event("get_states"), Some(ViewerRequest::GetStates));
        assert_eq!(ViewerRequest::from_event("connect"), None);
    }
}
