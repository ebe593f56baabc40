use super::{CommitInfo, RevisionStore};
use crate::error::GitError;
use git2::{ErrorCode, Oid, Repository, Tree};
use std::collections::{BinaryHeap, HashSet};
use std::path::{Path, PathBuf};

/// An opened git repository with a working directory
pub struct GitRepository {
    repo: Repository,
    working_dir: PathBuf,
}

impl std::fmt::Debug for GitRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitRepository")
            .field("working_dir", &self.working_dir)
            .finish()
    }
}

impl GitRepository {
    /// Open the repository rooted exactly at `root` (no upward search)
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self, GitError> {
        let root = root.as_ref();
        let repo = Repository::open(root)
            .map_err(|e| GitError::OpenFailed(format!("{}: {}", root.display(), e.message())))?;

        let working_dir = repo
            .workdir()
            .ok_or_else(|| GitError::BareRepository(root.display().to_string()))?
            .to_path_buf();

        Ok(Self { repo, working_dir })
    }

    /// Get the repository working directory
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Whether the repository has a HEAD commit
    pub fn has_commits(&self) -> bool {
        self.repo.head().is_ok()
    }

    fn extract_commit_info(commit: &git2::Commit) -> CommitInfo {
        let author = commit.author();
        CommitInfo {
            hash: commit.id().to_string(),
            authored_timestamp: author.when().seconds(),
            author_name: author.name().unwrap_or("Unknown").to_string(),
            author_email: author.email().unwrap_or("").to_string(),
            summary: commit.summary().unwrap_or("").to_string(),
        }
    }

    /// Object id of the entry at `path` within `tree`
    fn entry_id(tree: &Tree, path: &Path) -> Result<Option<Oid>, git2::Error> {
        match tree.get_path(path) {
            Ok(entry) => Ok(Some(entry.id())),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Simplify `commit` with respect to `path` the way `git log -- <path>` does
    ///
    /// Returns whether the commit touched the path and which parents the walk
    /// continues through. A commit whose entry matches some parent did not
    /// touch the path, and only that parent is followed, so edits on a side
    /// branch that a merge discarded never show up.
    fn simplify<'r>(
        commit: &git2::Commit<'r>,
        path: &Path,
    ) -> Result<(bool, Vec<git2::Commit<'r>>), git2::Error> {
        let current = Self::entry_id(&commit.tree()?, path)?;
        let mut parents: Vec<_> = commit.parents().collect();
        if parents.is_empty() {
            return Ok((current.is_some(), parents));
        }
        for i in 0..parents.len() {
            if Self::entry_id(&parents[i].tree()?, path)? == current {
                let same = parents.swap_remove(i);
                return Ok((false, vec![same]));
            }
        }
        Ok((true, parents))
    }
}

impl RevisionStore for GitRepository {
    fn history_for(&self, tracked_path: &str) -> Result<Vec<CommitInfo>, GitError> {
        let fail = |e: git2::Error| GitError::HistoryFailed {
            path: tracked_path.to_string(),
            reason: e.message().to_string(),
        };

        let head = match self.repo.head().and_then(|h| h.peel_to_commit()) {
            Ok(head) => head,
            Err(e) => {
                tracing::debug!(
                    "No HEAD in {}, treating '{}' as untracked: {}",
                    self.working_dir.display(),
                    tracked_path,
                    e.message()
                );
                return Ok(Vec::new());
            }
        };

        // Newest committer time first, like `Sort::TIME`
        let path = Path::new(tracked_path);
        let mut queue = BinaryHeap::new();
        let mut seen = HashSet::new();
        seen.insert(head.id());
        queue.push((head.time().seconds(), head.id()));

        let mut commits = Vec::new();
        while let Some((_, oid)) = queue.pop() {
            let commit = self.repo.find_commit(oid).map_err(fail)?;
            let (touched, follow) = Self::simplify(&commit, path).map_err(fail)?;
            if touched {
                commits.push(Self::extract_commit_info(&commit));
            }
            for parent in follow {
                if seen.insert(parent.id()) {
                    queue.push((parent.time().seconds(), parent.id()));
                }
            }
        }

        commits.reverse();

        tracing::debug!("Found {} commits for '{}'", commits.len(), tracked_path);
        Ok(commits)
    }

    fn blob_at(
        &self,
        commit: &CommitInfo,
        tracked_path: &str,
    ) -> Result<Option<Vec<u8>>, GitError> {
        let oid = Oid::from_str(&commit.hash)
            .map_err(|_| GitError::InvalidCommitHash(commit.hash.clone()))?;
        let fail = |e: git2::Error| GitError::TreeFailed {
            commit: commit.hash.clone(),
            reason: e.message().to_string(),
        };

        let tree = self
            .repo
            .find_commit(oid)
            .and_then(|c| c.tree())
            .map_err(fail)?;

        let entry = match tree.get_path(Path::new(tracked_path)) {
            Ok(entry) => entry,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(fail(e)),
        };

        let object = entry.to_object(&self.repo).map_err(fail)?;
        Ok(object.as_blob().map(|blob| blob.content().to_vec()))
    }
}
