//! Capabilities borrowed from the host site pipeline
//!
//! Parsing a source file into a [`Document`] and serializing a document to
//! the site output belong to the host. Revision handling only calls through
//! these traits. The passthrough implementations below are enough for the
//! command line tool and for tests.

use crate::config::SiteConfig;
use crate::document::{ContentKind, Document};
use crate::error::{PublishError, ReadError};
use crate::revisions::RevisionChain;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Parses a file on disk into a document
pub trait DocumentReader {
    fn read_document(
        &self,
        settings: &SiteConfig,
        file_path: &Path,
        kind: ContentKind,
        format: &str,
        context: &Value,
    ) -> Result<Document, ReadError>;
}

/// Everything the writer needs to emit one document
#[derive(Debug, Clone, Copy)]
pub struct WriteRequest<'a> {
    /// Output path relative to the site root
    pub name: &'a str,
    pub template: &'a str,
    pub kind: ContentKind,
    pub document: &'a Document,
    /// Chain as seen from this document: the live chain, or the view
    /// anchored at a historical revision
    pub chain: Option<&'a RevisionChain>,
    pub category: Option<&'a str>,
    pub relative_urls: bool,
    pub context: &'a Value,
}

/// Serializes documents to the site output
pub trait DocumentWriter {
    fn write_document(&mut self, request: WriteRequest<'_>) -> Result<(), PublishError>;
}

/// Reads a file as-is: content is the raw text, title is the first non-empty line
#[derive(Debug, Default, Clone)]
pub struct PassthroughReader;

impl DocumentReader for PassthroughReader {
    fn read_document(
        &self,
        settings: &SiteConfig,
        file_path: &Path,
        kind: ContentKind,
        format: &str,
        _context: &Value,
    ) -> Result<Document, ReadError> {
        if format.is_empty() {
            return Err(ReadError::UnsupportedFormat(file_path.display().to_string()));
        }
        let bytes = std::fs::read(file_path).map_err(|e| ReadError::ReadFailed {
            path: file_path.display().to_string(),
            reason: e.to_string(),
        })?;
        let content = String::from_utf8(bytes).map_err(|e| ReadError::ParseFailed {
            path: file_path.display().to_string(),
            reason: e.to_string(),
        })?;

        let mut document = Document::new(kind, file_path, "", "")
            .with_date_format(settings.date_format.clone());
        document.title = content
            .lines()
            .map(|line| line.trim().trim_start_matches('#').trim())
            .find(|line| !line.is_empty())
            .unwrap_or_default()
            .to_string();
        document.content = content;
        document
            .metadata
            .insert("format".to_string(), format.to_string());
        Ok(document)
    }
}

/// Writes each document's content verbatim below an output directory
#[derive(Debug, Clone)]
pub struct FileSystemWriter {
    output_path: PathBuf,
    written: Vec<PathBuf>,
}

impl FileSystemWriter {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
            written: Vec::new(),
        }
    }

    /// Files written so far, in write order
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl DocumentWriter for FileSystemWriter {
    fn write_document(&mut self, request: WriteRequest<'_>) -> Result<(), PublishError> {
        let target = self.output_path.join(request.name.trim_start_matches('/'));
        let fail = |e: std::io::Error| PublishError::WriteFailed {
            name: request.name.to_string(),
            reason: e.to_string(),
        };

        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(fail)?;
        }
        std::fs::write(&target, request.document.content.as_bytes()).map_err(fail)?;

        tracing::debug!("Wrote {} ({})", target.display(), request.kind.as_str());
        self.written.push(target);
        Ok(())
    }
}
