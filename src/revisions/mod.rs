//! Historical revisions of a document and the chain linking them
//!
//! A live document that has git history carries a [`RevisionChain`]. The
//! chain owns every historical [`Revision`] (oldest first) behind an `Arc`,
//! so the live chain and each per-revision view share one sequence. Sibling
//! links are indices into that sequence. The only link that leaves it is
//! [`NextLink::Live`], which sends the second-newest revision to the live
//! page instead of to the newest revision that duplicates it.

/// Linking, date assignment and chain attachment
pub mod builder;
/// Historical blob to revision document, plus output locations
pub mod materializer;
/// Writing every historical revision through the host writer
pub mod publisher;


pub use builder::{DateOptions, build_chain, compute_links, finalize_revision};
pub use materializer::{RevisionMaterializer, revision_output_paths};
pub use publisher::publish_revisions;

use crate::document::Document;
use crate::git::CommitInfo;
use std::sync::Arc;

/// Where the "next" link of a chain node points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextLink {
    /// Another historical revision, by index
    Revision(usize),
    /// The live document
    Live,
    /// Nothing follows
    Terminal,
}

/// A resolved neighbour of a chain node
#[derive(Debug, Clone, Copy)]
pub enum Neighbor<'a> {
    Revision(&'a Revision),
    Live,
}

/// A document materialized from one historical commit
#[derive(Debug, Clone)]
pub struct Revision {
    pub document: Document,
    pub commit: CommitInfo,
    /// Position in the chain, oldest first
    pub index: usize,
    pub previous: Option<usize>,
    pub next: NextLink,
}

impl Revision {
    pub fn save_as(&self) -> &str {
        &self.document.save_as
    }

    pub fn url(&self) -> &str {
        &self.document.url
    }
}

/// A view of the chain from one node
#[derive(Debug, Clone)]
pub struct RevisionChain {
    /// Commit this view represents: the latest one for the live document
    pub anchor_commit: CommitInfo,
    /// Path of the file relative to the repository root
    pub tracked_path: String,
    /// URL of the live document, target of [`NextLink::Live`]
    pub live_url: String,
    pub all_revisions: Arc<[Revision]>,
    pub previous: Option<usize>,
    pub next: NextLink,
}

impl RevisionChain {
    pub fn len(&self) -> usize {
        self.all_revisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all_revisions.is_empty()
    }

    pub fn revisions(&self) -> &[Revision] {
        &self.all_revisions
    }

    pub fn get(&self, index: usize) -> Option<&Revision> {
        self.all_revisions.get(index)
    }

    pub fn previous_revision(&self) -> Option<&Revision> {
        self.previous.and_then(|i| self.all_revisions.get(i))
    }

    pub fn next_neighbor(&self) -> Option<Neighbor<'_>> {
        match self.next {
            NextLink::Revision(i) => self.all_revisions.get(i).map(Neighbor::Revision),
            NextLink::Live => Some(Neighbor::Live),
            NextLink::Terminal => None,
        }
    }

    /// URL of the following node, resolving the live link
    pub fn next_url(&self) -> Option<&str> {
        match self.next_neighbor()? {
            Neighbor::Revision(revision) => Some(revision.url()),
            Neighbor::Live => Some(&self.live_url),
        }
    }

    /// The chain as seen from the revision at `index`
    pub fn view(&self, index: usize) -> Option<RevisionChain> {
        let revision = self.all_revisions.get(index)?;
        Some(RevisionChain {
            anchor_commit: revision.commit.clone(),
            tracked_path: self.tracked_path.clone(),
            live_url: self.live_url.clone(),
            all_revisions: Arc::clone(&self.all_revisions),
            previous: revision.previous,
            next: revision.next,
        })
    }

    /// Whether both views are backed by the same revision sequence
    pub fn shares_revisions_with(&self, other: &RevisionChain) -> bool {
        Arc::ptr_eq(&self.all_revisions, &other.all_revisions)
    }
}
