//! Documents handed to us by the host site pipeline

use crate::error::RevisionError;
use crate::revisions::RevisionChain;
use chrono::{DateTime, Local, NaiveDateTime, Utc};
use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::PathBuf;

/// Kind of content a document was read as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Article,
    Page,
    /// Copied verbatim by the host, never given revisions
    Static,
}

impl ContentKind {
    /// Name the writer exposes the document under in templates
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Article => "article",
            ContentKind::Page => "page",
            ContentKind::Static => "static",
        }
    }
}

/// Where a document stands with respect to revision tracking
#[derive(Debug, Clone, Default)]
pub enum ChainState {
    /// Not yet seen by the revision hook
    #[default]
    Unprocessed,
    /// Live document carrying the full chain
    LiveWithChain(RevisionChain),
    /// Document materialized from a historical commit
    HistoricalRevision,
}

/// A rendered unit of content
#[derive(Debug, Clone)]
pub struct Document {
    pub kind: ContentKind,
    pub source_path: PathBuf,
    pub title: String,
    pub content: String,
    pub metadata: BTreeMap<String, String>,
    pub date: Option<NaiveDateTime>,
    pub locale_date: Option<String>,
    pub modified: Option<NaiveDateTime>,
    pub locale_modified: Option<String>,
    pub date_format: String,
    pub url: String,
    pub save_as: String,
    pub category: Option<String>,
    pub template: String,
    pub state: ChainState,
}

impl Document {
    /// Create an unprocessed document with empty content
    pub fn new(
        kind: ContentKind,
        source_path: impl Into<PathBuf>,
        url: impl Into<String>,
        save_as: impl Into<String>,
    ) -> Self {
        let template = match kind {
            ContentKind::Page => "page",
            _ => "article",
        };
        Self {
            kind,
            source_path: source_path.into(),
            title: String::new(),
            content: String::new(),
            metadata: BTreeMap::new(),
            date: None,
            locale_date: None,
            modified: None,
            locale_modified: None,
            date_format: "%a %d %B %Y".to_string(),
            url: url.into(),
            save_as: save_as.into(),
            category: None,
            template: template.to_string(),
            state: ChainState::Unprocessed,
        }
    }

    pub fn with_date_format(mut self, date_format: impl Into<String>) -> Self {
        self.date_format = date_format.into();
        self
    }

    /// Chain attached to a live document, if any
    pub fn chain(&self) -> Option<&RevisionChain> {
        match &self.state {
            ChainState::LiveWithChain(chain) => Some(chain),
            _ => None,
        }
    }

    pub fn is_revision(&self) -> bool {
        matches!(self.state, ChainState::HistoricalRevision)
    }

    /// Set `date` together with its localised string
    pub fn set_date(&mut self, date: NaiveDateTime) -> Result<(), RevisionError> {
        self.locale_date = Some(format_date(&date, &self.date_format)?);
        self.date = Some(date);
        Ok(())
    }

    /// Set `modified` together with its localised string
    pub fn set_modified(&mut self, modified: NaiveDateTime) -> Result<(), RevisionError> {
        self.locale_modified = Some(format_date(&modified, &self.date_format)?);
        self.modified = Some(modified);
        Ok(())
    }
}

/// Render a date with a strftime pattern
pub fn format_date(date: &NaiveDateTime, format: &str) -> Result<String, RevisionError> {
    let mut out = String::new();
    write!(out, "{}", date.format(format))
        .map_err(|_| RevisionError::DateFormat(format.to_string()))?;
    Ok(out)
}

/// Convert a commit timestamp (seconds since the epoch) to a naive date
pub fn timestamp_to_date(seconds: i64, use_utc: bool) -> Option<NaiveDateTime> {
    let utc = DateTime::<Utc>::from_timestamp(seconds, 0)?;
    if use_utc {
        Some(utc.naive_utc())
    } else {
        Some(utc.with_timezone(&Local).naive_local())
    }
}
