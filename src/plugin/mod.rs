//! Revision hook for a static-site pipeline
//!
//! The host calls [`RevisionPlugin::on_content_init`] once for each document
//! it has read, and [`RevisionPlugin::publish`] once per content kind after
//! its own writer has finished. Everything in between (repository lookup,
//! history, materialization and linking) happens inside those two calls.
//!
//! # Example
//!
//! ```no_run
//! use git_revisions::config::Config;
//! use git_revisions::document::{ContentKind, Document};
//! use git_revisions::host::{FileSystemWriter, PassthroughReader};
//! use git_revisions::plugin::RevisionPlugin;
//! use serde_json::Value;
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut plugin = RevisionPlugin::new(Config::new()?);
//!     let mut documents = vec![Document::new(
//!         ContentKind::Article,
//!         "content/post.md",
//!         "posts/post.html",
//!         "posts/post.html",
//!     )];
//!
//!     let report = plugin.process_documents(&mut documents, &PassthroughReader, &Value::Null)?;
//!     println!("{} documents gained revisions", report.attached);
//!
//!     let mut writer = FileSystemWriter::new("output");
//!     plugin.publish(ContentKind::Article, &documents, &mut writer, &Value::Null)?;
//!     Ok(())
//! }
//! ```

use crate::config::Config;
use crate::document::{ChainState, ContentKind, Document};
use crate::error::RevisionError;
use crate::git::{RepositoryLocator, RevisionStore};
use crate::host::{DocumentReader, DocumentWriter};
use crate::paths::repository_file_path;
use crate::revisions::{DateOptions, RevisionMaterializer, build_chain, publish_revisions};
use serde_json::Value;
use std::path::{Path, PathBuf};

#[cfg(test)]
mod tests;

/// A document whose chain could not be built
#[derive(Debug)]
pub struct DocumentFailure {
    pub source_path: PathBuf,
    pub error: RevisionError,
}

/// Outcome of running the hook over a batch of documents
#[derive(Debug, Default)]
pub struct ProcessReport {
    /// Documents that gained a chain
    pub attached: usize,
    /// Documents left as they were (static, untracked, no history, already processed)
    pub skipped: usize,
    pub failures: Vec<DocumentFailure>,
}

/// Attaches revision chains to documents and publishes them
#[derive(Debug)]
pub struct RevisionPlugin {
    config: Config,
    locator: RepositoryLocator,
}

impl RevisionPlugin {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            locator: RepositoryLocator::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn locator(&self) -> &RepositoryLocator {
        &self.locator
    }

    /// Per-document hook: attach a revision chain if the document has history
    ///
    /// Returns `Ok(false)` for static content, documents outside any
    /// repository, untracked documents and documents already processed.
    pub fn on_content_init<R>(
        &mut self,
        document: &mut Document,
        reader: &R,
        context: &Value,
    ) -> Result<bool, RevisionError>
    where
        R: DocumentReader + ?Sized,
    {
        if !self.config.revisions.enabled
            || document.kind == ContentKind::Static
            || !matches!(document.state, ChainState::Unprocessed)
        {
            return Ok(false);
        }

        let directory = document
            .source_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
            .to_path_buf();
        let Some(repository) = self.locator.locate(&directory) else {
            return Ok(false);
        };

        let Some(tracked_path) =
            repository_file_path(repository.working_dir(), &document.source_path)
        else {
            tracing::debug!(
                "{} is outside {}",
                document.source_path.display(),
                repository.working_dir().display()
            );
            return Ok(false);
        };

        let commits = repository.history_for(&tracked_path)?;
        if commits.is_empty() {
            tracing::debug!("No history for '{}'", tracked_path);
            return Ok(false);
        }

        let materializer =
            RevisionMaterializer::new(&*repository, reader, &self.config.site, context);
        build_chain(
            document,
            &tracked_path,
            &commits,
            DateOptions::from(&self.config.revisions),
            |commit, live| materializer.materialize(commit, &tracked_path, live),
        )
    }

    /// Run the hook over every document, isolating per-document failures
    ///
    /// Errors confined to one document are collected in the report and
    /// processing continues. Any other error aborts the batch.
    pub fn process_documents<R>(
        &mut self,
        documents: &mut [Document],
        reader: &R,
        context: &Value,
    ) -> Result<ProcessReport, RevisionError>
    where
        R: DocumentReader + ?Sized,
    {
        let mut report = ProcessReport::default();

        for document in documents.iter_mut() {
            match self.on_content_init(document, reader, context) {
                Ok(true) => report.attached += 1,
                Ok(false) => report.skipped += 1,
                Err(error) if error.is_per_document() => {
                    tracing::warn!(
                        "Skipping revisions of {}: {}",
                        document.source_path.display(),
                        error
                    );
                    report.failures.push(DocumentFailure {
                        source_path: document.source_path.clone(),
                        error,
                    });
                }
                Err(error) => return Err(error),
            }
        }

        tracing::info!(
            "Revision hook done: {} attached, {} skipped, {} failed",
            report.attached,
            report.skipped,
            report.failures.len()
        );
        Ok(report)
    }

    /// Write the historical revisions of every `kind` document
    pub fn publish<W>(
        &self,
        kind: ContentKind,
        documents: &[Document],
        writer: &mut W,
        context: &Value,
    ) -> Result<usize, RevisionError>
    where
        W: DocumentWriter + ?Sized,
    {
        let enabled = match kind {
            ContentKind::Article => self.config.revisions.publish_articles,
            ContentKind::Page => self.config.revisions.publish_pages,
            ContentKind::Static => false,
        };
        if !enabled {
            return Ok(0);
        }

        let written = publish_revisions(
            documents,
            kind,
            writer,
            self.config.site.relative_urls,
            context,
        )?;
        Ok(written)
    }
}
