//! Scene document file I/O

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use simview_core::{SaveOptions, SceneError, SceneResult};

use crate::SceneDocument;

/// Encode a document as JSON text
pub fn encode_document(document: &SceneDocument, pretty: bool) -> SceneResult<String> {
    let text = if pretty {
        serde_json::to_string_pretty(document)?
    } else {
        serde_json::to_string(document)?
    };
    Ok(text)
}

/// Write a document to `path`.
///
/// With `options.atomic` the document goes to a temporary sibling file that is
/// renamed over `path` once fully written, so readers never observe a partial
/// document.
pub fn write_document(path: &Path, document: &SceneDocument, options: &SaveOptions) -> SceneResult<()> {
    if options.create_dirs {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
    }

    if !options.atomic {
        return write_to(path, document, options.pretty);
    }

    let staging = staging_path(path);
    if let Err(e) = write_to(&staging, document, options.pretty) {
        let _ = fs::remove_file(&staging);
        return Err(e);
    }
    if let Err(e) = fs::rename(&staging, path) {
        let _ = fs::remove_file(&staging);
        return Err(e.into());
    }
    Ok(())
}

/// Read and parse a saved document
pub fn read_document(path: &Path) -> SceneResult<SceneDocument> {
    if !path.is_file() {
        return Err(SceneError::DocumentNotFound(path.to_path_buf()));
    }
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

fn write_to(path: &Path, document: &SceneDocument, pretty: bool) -> SceneResult<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    if pretty {
        serde_json::to_writer_pretty(&mut writer, document)?;
    } else {
        serde_json::to_writer(&mut writer, document)?;
    }
    writer.flush()?;
    writer.get_ref().sync_all()?;
    Ok(())
}

/// Hidden sibling of `path` used while an atomic write is in flight
fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "scene.json".to_string());
    path.with_file_name(format!(".{}.{}.tmp", name, std::process::id()))
}
