use super::GitRepository;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Finds the repository enclosing a path, remembering every answer
///
/// Lookups are keyed by the exact path asked about, so repeated lookups for
/// files in the same directory never touch the filesystem again. Misses are
/// cached too.
#[derive(Debug, Default)]
pub struct RepositoryLocator {
    cache: HashMap<PathBuf, Option<Rc<GitRepository>>>,
}

impl RepositoryLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository rooted at `path` or its nearest ancestor
    pub fn locate(&mut self, path: &Path) -> Option<Rc<GitRepository>> {
        if let Some(cached) = self.cache.get(path) {
            return cached.clone();
        }

        let found = Self::walk_up(path);
        match &found {
            Some(repo) => tracing::debug!(
                "Located repository {} for {}",
                repo.working_dir().display(),
                path.display()
            ),
            None => tracing::debug!("No repository encloses {}", path.display()),
        }

        self.cache.insert(path.to_path_buf(), found.clone());
        found
    }

    /// Number of distinct paths looked up so far
    pub fn cached_paths(&self) -> usize {
        self.cache.len()
    }

    fn walk_up(path: &Path) -> Option<Rc<GitRepository>> {
        let start = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().ok()?.join(path)
        };

        for ancestor in start.ancestors() {
            if let Ok(repo) = GitRepository::open(ancestor) {
                return Some(Rc::new(repo));
            }
        }
        None
    }
}
