/// Centralized error types for git-revisions using thiserror
///
/// Errors raised while building one document's revision chain are isolated to
/// that document; publishing errors propagate to the caller.
use thiserror::Error;

/// Main error type for revision discovery and publishing
#[derive(Error, Debug)]
pub enum RevisionError {
    #[error("Git error: {0}")]
    Git(#[from] GitError),

    #[error("Materialization error: {0}")]
    Materialize(#[from] MaterializeError),

    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid date format '{0}'")]
    DateFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Errors raised by the version-control layer
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Failed to open git repository: {0}")]
    OpenFailed(String),

    #[error("Repository at '{0}' has no working directory")]
    BareRepository(String),

    #[error("Failed to read history for '{path}': {reason}")]
    HistoryFailed { path: String, reason: String },

    #[error("Invalid commit hash: {0}")]
    InvalidCommitHash(String),

    #[error("Failed to read tree of commit {commit}: {reason}")]
    TreeFailed { commit: String, reason: String },

    #[error("Commit {commit} has an out of range timestamp {timestamp}")]
    TimestampOutOfRange { commit: String, timestamp: i64 },
}

/// Errors raised by the host document reader
#[derive(Error, Debug)]
pub enum ReadError {
    #[error("Failed to read '{path}': {reason}")]
    ReadFailed { path: String, reason: String },

    #[error("No reader for the format of '{0}'")]
    UnsupportedFormat(String),

    #[error("Failed to parse '{path}': {reason}")]
    ParseFailed { path: String, reason: String },
}

/// Errors raised while turning a historical blob into a revision document
#[derive(Error, Debug)]
pub enum MaterializeError {
    #[error("'{path}' does not exist in the tree of commit {commit}")]
    MissingBlob { commit: String, path: String },

    #[error("Failed to read revision of commit {commit}: {source}")]
    Read {
        commit: String,
        #[source]
        source: ReadError,
    },

    #[error("Failed to stage revision of commit {commit}: {reason}")]
    TempFile { commit: String, reason: String },

    #[error(transparent)]
    Git(#[from] GitError),
}

/// Errors raised by the host document writer
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Failed to write '{name}': {reason}")]
    WriteFailed { name: String, reason: String },
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration file: {0}")]
    LoadFailed(String),

    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    #[error("Invalid configuration value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),
}

impl From<anyhow::Error> for RevisionError {
    fn from(err: anyhow::Error) -> Self {
        RevisionError::Other(format!("{:#}", err))
    }
}

impl RevisionError {
    /// Create a new error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        RevisionError::Other(msg.into())
    }

    /// Whether this error only affects the document it was raised for
    ///
    /// Chain construction failures are reported and the host moves on to the
    /// next document. Publishing and configuration failures are not.
    pub fn is_per_document(&self) -> bool {
        matches!(
            self,
            RevisionError::Git(_) | RevisionError::Materialize(_) | RevisionError::DateFormat(_)
        )
    }

    /// Commit the error was raised for, when known
    pub fn commit(&self) -> Option<&str> {
        match self {
            RevisionError::Materialize(
                MaterializeError::MissingBlob { commit, .. }
                | MaterializeError::Read { commit, .. }
                | MaterializeError::TempFile { commit, .. },
            ) => Some(commit),
            RevisionError::Git(
                GitError::TreeFailed { commit, .. } | GitError::TimestampOutOfRange { commit, .. },
            ) => Some(commit),
            _ => None,
        }
    }
}
