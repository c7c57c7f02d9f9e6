//! Text chunking with configurable size and overlap.
//!
//! Text is normalized first, then cut into fixed-width character windows
//! that advance by `chunk_size - overlap`. Windows are measured in Unicode
//! scalar values so a multi-byte character is never split.

use crate::types::{Chunk, Document};
use toolrag_core::config::ChunkingConfig;
use toolrag_core::{AppError, AppResult};

/// Default window width in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// Default overlap between consecutive windows.
pub const DEFAULT_OVERLAP: usize = 100;

/// Splits documents into overlapping chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunker {
    chunk_size: usize,
    overlap: usize,
}

impl Default for Chunker {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_OVERLAP,
        }
    }
}

impl Chunker {
    /// Create a chunker.
    ///
    /// # Errors
    /// Returns `AppError::InvalidConfiguration` unless `chunk_size > 0` and
    /// `overlap < chunk_size`.
    pub fn new(chunk_size: usize, overlap: usize) -> AppResult<Self> {
        validate(chunk_size, overlap)?;
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    pub fn from_config(config: &ChunkingConfig) -> AppResult<Self> {
        Self::new(config.chunk_size, config.overlap)
    }

    /// Change the window settings. On error the chunker is left unchanged.
    pub fn configure(&mut self, chunk_size: usize, overlap: usize) -> AppResult<()> {
        validate(chunk_size, overlap)?;
        self.chunk_size = chunk_size;
        self.overlap = overlap;
        Ok(())
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Distance between the starts of consecutive windows.
    pub fn step(&self) -> usize {
        self.chunk_size.saturating_sub(self.overlap).max(1)
    }

    /// Split a document into chunks.
    pub fn chunk(&self, document: &Document) -> Vec<Chunk> {
        let normalized = normalize_text(&document.text);
        if normalized.is_empty() {
            return Vec::new();
        }

        let chars: Vec<char> = normalized.chars().collect();
        let step = self.step();
        let mut chunks = Vec::new();
        let mut start = 0;

        while start < chars.len() {
            let end = (start + self.chunk_size).min(chars.len());
            let window: String = chars[start..end].iter().collect();
            let text = window.trim();

            // Blank windows do not consume an index
            if !text.is_empty() {
                let chunk_index = chunks.len();
                chunks.push(Chunk {
                    chunk_id: Chunk::make_id(&document.document_id, chunk_index),
                    document_id: document.document_id.clone(),
                    document_title: document.title.clone(),
                    source: document.source.clone(),
                    chunk_index,
                    text: text.to_string(),
                });
            }

            start += step;
        }

        tracing::debug!(
            "Chunked document '{}' into {} chunks (size: {}, overlap: {})",
            document.document_id,
            chunks.len(),
            self.chunk_size,
            self.overlap
        );

        chunks
    }
}

fn validate(chunk_size: usize, overlap: usize) -> AppResult<()> {
    if chunk_size == 0 {
        return Err(AppError::InvalidConfiguration(
            "chunk_size must be greater than 0".to_string(),
        ));
    }
    if overlap >= chunk_size {
        return Err(AppError::InvalidConfiguration(format!(
            "overlap ({}) must be smaller than chunk_size ({})",
            overlap, chunk_size
        )));
    }
    Ok(())
}

/// Normalize whitespace.
///
/// CRLF becomes LF, runs of spaces and tabs collapse to one space, three or
/// more consecutive newlines collapse to two, and the result is trimmed.
pub fn normalize_text(text: &str) -> String {
    let text = text.replace("\r\n", "\n");
    let mut out = String::with_capacity(text.len());
    let mut in_blank_run = false;
    let mut newlines = 0usize;

    for c in text.chars() {
        match c {
            ' ' | '\t' => {
                in_blank_run = true;
            }
            '\n' => {
                if in_blank_run {
                    out.push(' ');
                    in_blank_run = false;
                    newlines = 0;
                }
                newlines += 1;
                if newlines <= 2 {
                    out.push('\n');
                }
            }
            _ => {
                if in_blank_run {
                    out.push(' ');
                    in_blank_run = false;
                }
                newlines = 0;
                out.push(c);
            }
        }
    }

    out.trim().to_string()
}
