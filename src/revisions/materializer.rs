use crate::config::SiteConfig;
use crate::document::{ChainState, Document};
use crate::error::MaterializeError;
use crate::git::{CommitInfo, RevisionStore};
use crate::host::DocumentReader;
use crate::paths::{basename, format_of, posix_join, split_ext, url_dirname};
use serde_json::Value;
use std::io::Write;

/// Output location and URL of the revision of a document at `commit_hash`
///
/// Revisions nest under the live document's own URL namespace:
/// `posts/my-post.html` becomes `posts/my-post/<hash>/index.html`, while a
/// document already published as a directory index (`posts/my-post/` saved
/// as `posts/my-post/index.html`) becomes `posts/my-post/<hash>/index.html`.
pub fn revision_output_paths(
    live_save_as: &str,
    live_url: &str,
    commit_hash: &str,
) -> (String, String) {
    let (root, extension) = split_ext(basename(live_save_as));
    let base = if live_url.ends_with('/') {
        live_url
    } else {
        url_dirname(live_url)
    };
    let segment = if root == "index" { "" } else { root };
    let index_name = format!("index{}", extension);

    let save_as = posix_join([base, segment, commit_hash, index_name.as_str()]);
    let url = url_dirname(&save_as).to_string();
    (save_as, url)
}

/// Turns the bytes of a tracked file at a commit into a revision document
pub struct RevisionMaterializer<'a, S: ?Sized, R: ?Sized> {
    store: &'a S,
    reader: &'a R,
    settings: &'a SiteConfig,
    context: &'a Value,
}

impl<'a, S, R> RevisionMaterializer<'a, S, R>
where
    S: RevisionStore + ?Sized,
    R: DocumentReader + ?Sized,
{
    pub fn new(store: &'a S, reader: &'a R, settings: &'a SiteConfig, context: &'a Value) -> Self {
        Self {
            store,
            reader,
            settings,
            context,
        }
    }

    /// Read `tracked_path` as of `commit` into a document shaped like `live`
    ///
    /// The result reports the live document's `source_path` and gets a
    /// `save_as`/`url` keyed by the commit hash.
    pub fn materialize(
        &self,
        commit: &CommitInfo,
        tracked_path: &str,
        live: &Document,
    ) -> Result<Document, MaterializeError> {
        let bytes = self
            .store
            .blob_at(commit, tracked_path)?
            .ok_or_else(|| MaterializeError::MissingBlob {
                commit: commit.hash.clone(),
                path: tracked_path.to_string(),
            })?;

        let format = format_of(tracked_path);
        let staged = self.stage(commit, format, &bytes)?;

        let mut document = self
            .reader
            .read_document(
                self.settings,
                staged.path(),
                live.kind,
                format,
                self.context,
            )
            .map_err(|source| MaterializeError::Read {
                commit: commit.hash.clone(),
                source,
            })?;

        document.source_path = live.source_path.clone();
        let (save_as, url) = revision_output_paths(&live.save_as, &live.url, &commit.hash);
        document.save_as = save_as;
        document.url = url;
        document.state = ChainState::HistoricalRevision;

        tracing::debug!(
            "Materialized '{}' at {} as {}",
            tracked_path,
            commit.hash,
            document.save_as
        );
        Ok(document)
    }

    /// Write the blob to a scratch file the reader can open; removed on drop
    fn stage(
        &self,
        commit: &CommitInfo,
        format: &str,
        bytes: &[u8],
    ) -> Result<tempfile::NamedTempFile, MaterializeError> {
        let fail = |e: std::io::Error| MaterializeError::TempFile {
            commit: commit.hash.clone(),
            reason: e.to_string(),
        };

        let suffix = if format.is_empty() {
            String::new()
        } else {
            format!(".{}", format)
        };
        let mut staged = tempfile::Builder::new()
            .prefix("revision-")
            .suffix(&suffix)
            .tempfile()
            .map_err(fail)?;
        staged.write_all(bytes).map_err(fail)?;
        staged.flush().map_err(fail)?;
        Ok(staged)
    }
}
