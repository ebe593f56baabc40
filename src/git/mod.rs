//! Git history access for revision discovery
//!
//! Locates the repository enclosing a document, lists the commits that
//! touched it, and extracts the file's bytes at each of those commits.

/// Commit history and blob extraction for a single repository
pub mod history;
/// Cached lookup of the repository enclosing a path
pub mod locator;

pub use history::GitRepository;
pub use locator::RepositoryLocator;

use crate::error::GitError;
use serde::{Deserialize, Serialize};

/// Information about a git commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    /// Full commit SHA hash (40 characters)
    pub hash: String,
    /// Author timestamp (Unix epoch seconds)
    pub authored_timestamp: i64,
    /// Author's name
    pub author_name: String,
    /// Author's email address
    pub author_email: String,
    /// First line of the commit message
    pub summary: String,
}

/// Source of historical versions of tracked files
pub trait RevisionStore {
    /// Commits that modified `tracked_path`, oldest first
    ///
    /// An untracked path yields an empty list rather than an error.
    fn history_for(&self, tracked_path: &str) -> Result<Vec<CommitInfo>, GitError>;

    /// Bytes of `tracked_path` as of `commit`, or `None` if the path is absent
    fn blob_at(&self, commit: &CommitInfo, tracked_path: &str)
    -> Result<Option<Vec<u8>>, GitError>;
}
