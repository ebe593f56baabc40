//! Helpers for building throwaway git repositories in tests

use git2::{Oid, Repository, Signature, Time};
use std::path::Path;

pub(crate) fn init_repo(dir: &Path) -> Repository {
    Repository::init(dir).unwrap()
}

fn signature(time: i64) -> Signature<'static> {
    Signature::new("Test Author", "test@example.com", &Time::new(time, 0)).unwrap()
}

fn commit_index(repo: &Repository, time: i64, message: &str) -> Oid {
    let mut index = repo.index().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let sig = signature(time);
    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .unwrap()
}

/// Write `content` to `rel` in the working tree and commit it at `time`
pub(crate) fn commit_file(
    repo: &Repository,
    rel: &str,
    content: &str,
    time: i64,
    message: &str,
) -> Oid {
    let workdir = repo.workdir().unwrap();
    let full = workdir.join(rel);
    if let Some(parent) = full.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&full, content).unwrap();

    let mut index = repo.index().unwrap();
    index.add_path(Path::new(rel)).unwrap();
    index.write().unwrap();
    commit_index(repo, time, message)
}

/// Delete `rel` from the working tree and commit the removal at `time`
pub(crate) fn remove_file(repo: &Repository, rel: &str, time: i64, message: &str) -> Oid {
    let workdir = repo.workdir().unwrap();
    std::fs::remove_file(workdir.join(rel)).unwrap();

    let mut index = repo.index().unwrap();
    index.remove_path(Path::new(rel)).unwrap();
    index.write().unwrap();
    commit_index(repo, time, message)
}

/// Commit `content` at top-level `name` on top of `parent` without moving HEAD
pub(crate) fn commit_on_branch(
    repo: &Repository,
    parent: Oid,
    name: &str,
    content: &str,
    time: i64,
    message: &str,
) -> Oid {
    let parent = repo.find_commit(parent).unwrap();
    let blob = repo.blob(content.as_bytes()).unwrap();
    let mut builder = repo.treebuilder(Some(&parent.tree().unwrap())).unwrap();
    builder.insert(name, blob, 0o100644).unwrap();
    let tree = repo.find_tree(builder.write().unwrap()).unwrap();
    let sig = signature(time);
    repo.commit(None, &sig, &sig, message, &tree, &[&parent])
        .unwrap()
}

/// Merge `other` into HEAD, taking the tree of `tree_from`
pub(crate) fn merge_into_head(
    repo: &Repository,
    other: Oid,
    tree_from: Oid,
    time: i64,
    message: &str,
) -> Oid {
    let head = repo.head().unwrap().peel_to_commit().unwrap();
    let other = repo.find_commit(other).unwrap();
    let tree = repo.find_commit(tree_from).unwrap().tree().unwrap();
    let sig = signature(time);
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &[&head, &other])
        .unwrap()
}
