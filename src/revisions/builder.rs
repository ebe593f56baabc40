use super::{NextLink, Revision, RevisionChain};
use crate::config::RevisionsConfig;
use crate::document::{ChainState, Document, timestamp_to_date};
use crate::error::{GitError, MaterializeError, RevisionError};
use crate::git::CommitInfo;
use chrono::NaiveDateTime;

/// How commit timestamps become document dates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateOptions {
    /// Fill a missing live `date` from the first commit
    pub infer_date: bool,
    /// Fill a missing live `modified` from the latest commit
    pub infer_modified: bool,
    pub use_utc: bool,
}

impl Default for DateOptions {
    fn default() -> Self {
        Self {
            infer_date: true,
            infer_modified: true,
            use_utc: false,
        }
    }
}

impl From<&RevisionsConfig> for DateOptions {
    fn from(config: &RevisionsConfig) -> Self {
        Self {
            infer_date: config.infer_date,
            infer_modified: config.infer_modified,
            use_utc: config.use_utc,
        }
    }
}

fn commit_date(commit: &CommitInfo, use_utc: bool) -> Result<NaiveDateTime, RevisionError> {
    timestamp_to_date(commit.authored_timestamp, use_utc).ok_or_else(|| {
        GitError::TimestampOutOfRange {
            commit: commit.hash.clone(),
            timestamp: commit.authored_timestamp,
        }
        .into()
    })
}

/// Previous/next links for a chain of `count` revisions, oldest first
///
/// The second-newest revision links forward to the live document; the
/// newest links nowhere.
pub fn compute_links(count: usize) -> Vec<(Option<usize>, NextLink)> {
    (0..count)
        .map(|i| {
            let previous = i.checked_sub(1);
            let next = if count >= 2 && i == count - 2 {
                NextLink::Live
            } else if i + 1 < count {
                NextLink::Revision(i + 1)
            } else {
                NextLink::Terminal
            };
            (previous, next)
        })
        .collect()
}

/// Date the revision at `index` by its own commit
///
/// The revision before it learns only now when it was superseded, so its
/// `modified` is set to the same date. Running this again for the same
/// index changes nothing.
pub fn finalize_revision(
    revisions: &mut [Revision],
    index: usize,
    use_utc: bool,
) -> Result<(), RevisionError> {
    let len = revisions.len();
    let Some(revision) = revisions.get_mut(index) else {
        return Err(RevisionError::other(format!(
            "Revision index {} out of range for chain of {}",
            index, len
        )));
    };

    let created = commit_date(&revision.commit, use_utc)?;
    revision.document.set_date(created)?;

    if let Some(previous) = revision.previous
        && let Some(previous) = revisions.get_mut(previous)
    {
        previous.document.set_modified(created)?;
    }
    Ok(())
}

/// Attach a revision chain to a live document
///
/// `commits` must be oldest first. `materialize` produces the revision
/// document for one commit. Returns `Ok(false)` when there is no history or
/// the document was already processed. The live document is left untouched
/// if any commit fails to materialize.
pub fn build_chain<F>(
    live: &mut Document,
    tracked_path: &str,
    commits: &[CommitInfo],
    options: DateOptions,
    mut materialize: F,
) -> Result<bool, RevisionError>
where
    F: FnMut(&CommitInfo, &Document) -> Result<Document, MaterializeError>,
{
    if !matches!(live.state, ChainState::Unprocessed) {
        tracing::debug!(
            "{} already processed, not rebuilding its chain",
            live.source_path.display()
        );
        return Ok(false);
    }

    let (Some(first), Some(latest)) = (commits.first(), commits.last()) else {
        return Ok(false);
    };

    let mut revisions = Vec::with_capacity(commits.len());
    for (index, commit) in commits.iter().enumerate() {
        let document = materialize(commit, &*live)?;
        revisions.push(Revision {
            document,
            commit: commit.clone(),
            index,
            previous: None,
            next: NextLink::Terminal,
        });
    }

    for (revision, (previous, next)) in revisions.iter_mut().zip(compute_links(commits.len())) {
        revision.previous = previous;
        revision.next = next;
    }

    for index in 0..revisions.len() {
        finalize_revision(&mut revisions, index, options.use_utc)?;
    }

    if options.infer_date && live.date.is_none() {
        live.set_date(commit_date(first, options.use_utc)?)?;
    }
    if options.infer_modified && first.hash != latest.hash && live.modified.is_none() {
        live.set_modified(commit_date(latest, options.use_utc)?)?;
    }

    let previous = revisions.len().checked_sub(2);
    let count = revisions.len();
    live.state = ChainState::LiveWithChain(RevisionChain {
        anchor_commit: latest.clone(),
        tracked_path: tracked_path.to_string(),
        live_url: live.url.clone(),
        all_revisions: revisions.into(),
        previous,
        next: NextLink::Terminal,
    });

    tracing::info!(
        "Attached {} revisions to {}",
        count,
        live.source_path.display()
    );
    Ok(true)
}
