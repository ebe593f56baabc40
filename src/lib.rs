//! # git-revisions - Historical revision pages for static-site documents
//!
//! Every document a static-site generator renders from a git checkout has a
//! history. This crate turns that history into browsable pages: each
//! committed version of a document becomes a [`revisions::Revision`] with its
//! own output location, dated by its commit and linked to its neighbours.
//!
//! ## Overview
//!
//! For each live document the host pipeline hands over:
//!
//! 1. [`git::RepositoryLocator`] finds the enclosing repository (cached per directory)
//! 2. [`git::GitRepository`] lists the commits that touched the file, oldest first
//! 3. [`revisions::RevisionMaterializer`] reads the file at each commit through the
//!    host's [`host::DocumentReader`] and gives it a path keyed by the commit hash
//! 4. [`revisions::build_chain`] dates and links the revisions and attaches the
//!    chain to the live document
//! 5. [`revisions::publish_revisions`] later writes each revision through the
//!    host's [`host::DocumentWriter`]
//!
//! [`plugin::RevisionPlugin`] wires these steps into the two hooks a site
//! pipeline exposes: per-document initialization and post-write publishing.
//!
//! ## Chain shape
//!
//! ```text
//!  rev[0] <-> rev[1] <-> ... <-> rev[n-2] <-> rev[n-1]
//!                                   |
//!                                   +--next--> live document
//! ```
//!
//! The newest revision duplicates the live page, so navigation from the
//! second-newest revision goes straight to the live URL.
//!
//! ## Modules
//!
//! - [`plugin`]: Hook entry points and per-document failure isolation
//! - [`revisions`]: Chain types, builder, materializer and publisher
//! - [`git`]: Repository lookup, file history and blob extraction
//! - [`document`]: The document model shared with the host
//! - [`host`]: Reader/writer capabilities and their passthrough implementations
//! - [`config`]: Configuration management with environment variable support
//! - [`paths`]: POSIX URL helpers and repository-relative paths
//! - [`error`]: Error types

/// Configuration management with environment variable overrides
pub mod config;

/// Documents handed over by the host pipeline
pub mod document;

/// Error types and utilities
pub mod error;

/// Git repository lookup and file history
pub mod git;

/// Reader and writer capabilities borrowed from the host
pub mod host;

/// POSIX path helpers for URLs and repository-relative paths
pub mod paths;

/// Per-document hook and publishing entry points
pub mod plugin;

/// Revision chains: linking, materialization and publishing
pub mod revisions;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::Config;
pub use document::{ChainState, ContentKind, Document};
pub use error::RevisionError;
pub use plugin::RevisionPlugin;
pub use revisions::{NextLink, Revision, RevisionChain};
