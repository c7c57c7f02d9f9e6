//! Document loading from the filesystem.
//!
//! `.json` files hold a document, an array of documents, or an object with a
//! `documents` array. Every other file is read as plain text: its stem is the
//! document id, its file name the title and its path the source.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use toolrag_core::{AppError, AppResult};
use toolrag_knowledge::Document;
use walkdir::WalkDir;

#[derive(Deserialize)]
#[serde(untagged)]
enum DocumentFile {
    Many(Vec<Document>),
    Wrapped { documents: Vec<Document> },
    One(Document),
}

/// Load documents from files and directories (walked recursively, hidden
/// entries skipped).
pub fn load_documents(paths: &[PathBuf]) -> AppResult<Vec<Document>> {
    let mut documents = Vec::new();

    for path in paths {
        if path.is_file() {
            documents.extend(load_file(path)?);
        } else if path.is_dir() {
            let walker = WalkDir::new(path)
                .follow_links(false)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.path()));

            for entry in walker.filter_map(|e| e.ok()) {
                if entry.file_type().is_file() {
                    documents.extend(load_file(entry.path())?);
                }
            }
        } else {
            return Err(AppError::Config(format!("Path does not exist: {:?}", path)));
        }
    }

    tracing::debug!("Loaded {} documents from {} paths", documents.len(), paths.len());
    Ok(documents)
}

fn load_file(path: &Path) -> AppResult<Vec<Document>> {
    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if is_json {
        let contents = std::fs::read_to_string(path)?;
        let parsed: DocumentFile = serde_json::from_str(&contents).map_err(|e| {
            AppError::Serialization(format!("Invalid document file {:?}: {}", path, e))
        })?;
        return Ok(match parsed {
            DocumentFile::Many(documents) | DocumentFile::Wrapped { documents } => documents,
            DocumentFile::One(document) => vec![document],
        });
    }

    let bytes = std::fs::read(path)?;
    let Ok(text) = String::from_utf8(bytes) else {
        tracing::warn!("Skipping non-UTF-8 file {:?}", path);
        return Ok(Vec::new());
    };

    let document_id = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string());
    let title = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| document_id.clone());

    Ok(vec![Document::new(
        document_id,
        title,
        path.to_string_lossy(),
        text,
    )])
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}
