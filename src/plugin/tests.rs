use super::*;
use crate::config::SiteConfig;
use crate::error::{MaterializeError, PublishError, ReadError};
use crate::host::{FileSystemWriter, PassthroughReader, WriteRequest};
use crate::revisions::NextLink;
use crate::test_utils::{commit_file, init_repo};
use std::sync::Arc;
use tempfile::TempDir;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const T0: i64 = 1_600_000_000;
const T1: i64 = 1_600_086_400;
const T2: i64 = 1_600_172_800;

fn test_config() -> Config {
    let mut config = Config::default();
    config.revisions.use_utc = true;
    config.site.date_format = DATE_FORMAT.to_string();
    config
}

fn live_document(dir: &TempDir, rel: &str) -> Document {
    Document::new(
        ContentKind::Article,
        dir.path().join(rel),
        "posts/post.html",
        "posts/post.html",
    )
    .with_date_format(DATE_FORMAT)
}

fn date_of(seconds: i64) -> chrono::NaiveDateTime {
    crate::document::timestamp_to_date(seconds, true).unwrap()
}

/// Repository with three commits of `content/post.md`
fn three_commit_repo() -> (TempDir, Vec<String>) {
    let dir = TempDir::new().unwrap();
    let repo = init_repo(dir.path());
    let hashes = vec![
        commit_file(&repo, "content/post.md", "# One\n", T0, "one").to_string(),
        commit_file(&repo, "content/post.md", "# Two\n", T1, "two").to_string(),
        commit_file(&repo, "content/post.md", "# Three\n", T2, "three").to_string(),
    ];
    (dir, hashes)
}

/// Rejects any file whose content mentions BROKEN
struct PickyReader;

impl DocumentReader for PickyReader {
    fn read_document(
        &self,
        settings: &SiteConfig,
        file_path: &Path,
        kind: ContentKind,
        format: &str,
        context: &Value,
    ) -> Result<Document, ReadError> {
        let document = PassthroughReader.read_document(settings, file_path, kind, format, context)?;
        if document.content.contains("BROKEN") {
            return Err(ReadError::ParseFailed {
                path: file_path.display().to_string(),
                reason: "broken markup".to_string(),
            });
        }
        Ok(document)
    }
}

// ===== Chain construction =====

#[test]
fn test_three_commits_builds_full_chain() {
    let (dir, hashes) = three_commit_repo();
    let mut plugin = RevisionPlugin::new(test_config());
    let mut live = live_document(&dir, "content/post.md");

    let attached = plugin
        .on_content_init(&mut live, &PassthroughReader, &Value::Null)
        .unwrap();
    assert!(attached);

    assert_eq!(live.date, Some(date_of(T0)));
    assert_eq!(live.modified, Some(date_of(T2)));
    assert_eq!(live.locale_date.as_deref(), Some("2020-09-13 12:26:40"));

    let chain = live.chain().expect("chain attached");
    assert_eq!(chain.len(), 3);
    assert_eq!(chain.tracked_path, "content/post.md");
    assert_eq!(chain.anchor_commit.hash, hashes[2]);
    assert_eq!(chain.previous, Some(1));
    assert_eq!(chain.next, NextLink::Terminal);

    let revisions = chain.revisions();
    assert_eq!(revisions[0].previous, None);
    assert_eq!(revisions[0].next, NextLink::Revision(1));
    assert_eq!(revisions[1].previous, Some(0));
    assert_eq!(revisions[1].next, NextLink::Live);
    assert_eq!(revisions[2].previous, Some(1));
    assert_eq!(revisions[2].next, NextLink::Terminal);

    for (revision, hash) in revisions.iter().zip(&hashes) {
        assert_eq!(revision.commit.hash, *hash);
        assert_eq!(revision.save_as(), format!("posts/post/{}/index.html", hash));
        assert_eq!(revision.url(), format!("posts/post/{}", hash));
        assert_eq!(revision.document.source_path, live.source_path);
        assert!(revision.document.is_revision());
    }
    assert_eq!(revisions[0].document.content, "# One\n");
    assert_eq!(revisions[2].document.title, "Three");
}

#[test]
fn test_revision_dates_and_back_patched_modified() {
    let (dir, _) = three_commit_repo();
    let mut plugin = RevisionPlugin::new(test_config());
    let mut live = live_document(&dir, "content/post.md");
    plugin
        .on_content_init(&mut live, &PassthroughReader, &Value::Null)
        .unwrap();

    let revisions = live.chain().unwrap().revisions();
    assert_eq!(revisions[0].document.date, Some(date_of(T0)));
    assert_eq!(revisions[1].document.date, Some(date_of(T1)));
    assert_eq!(revisions[2].document.date, Some(date_of(T2)));

    assert_eq!(revisions[0].document.modified, Some(date_of(T1)));
    assert_eq!(revisions[1].document.modified, Some(date_of(T2)));
    assert_eq!(revisions[2].document.modified, None);
    assert_eq!(
        revisions[0].document.locale_modified.as_deref(),
        Some("2020-09-14 12:26:40")
    );
}

#[test]
fn test_single_commit_chain() {
    let dir = TempDir::new().unwrap();
    let repo = init_repo(dir.path());
    let hash = commit_file(&repo, "post.md", "only", T0, "only").to_string();

    let mut plugin = RevisionPlugin::new(test_config());
    let mut live = live_document(&dir, "post.md");
    assert!(plugin
        .on_content_init(&mut live, &PassthroughReader, &Value::Null)
        .unwrap());

    assert_eq!(live.date, Some(date_of(T0)));
    assert_eq!(live.modified, None);

    let chain = live.chain().unwrap();
    assert_eq!(chain.len(), 1);
    assert_eq!(chain.previous, None);
    assert_eq!(chain.anchor_commit.hash, hash);

    let only = &chain.revisions()[0];
    assert_eq!(only.previous, None);
    assert_eq!(only.next, NextLink::Terminal);
    assert_eq!(only.document.modified, None);
}

#[test]
fn test_explicit_dates_are_kept() {
    let (dir, _) = three_commit_repo();
    let mut plugin = RevisionPlugin::new(test_config());
    let mut live = live_document(&dir, "content/post.md");
    let explicit = date_of(T0 - 86_400);
    live.set_date(explicit).unwrap();
    live.set_modified(explicit).unwrap();

    plugin
        .on_content_init(&mut live, &PassthroughReader, &Value::Null)
        .unwrap();
    assert_eq!(live.date, Some(explicit));
    assert_eq!(live.modified, Some(explicit));
    assert!(live.chain().is_some());
}

#[test]
fn test_date_inference_can_be_disabled() {
    let (dir, _) = three_commit_repo();
    let mut config = test_config();
    config.revisions.infer_date = false;
    config.revisions.infer_modified = false;
    let mut plugin = RevisionPlugin::new(config);
    let mut live = live_document(&dir, "content/post.md");

    plugin
        .on_content_init(&mut live, &PassthroughReader, &Value::Null)
        .unwrap();
    assert!(live.date.is_none());
    assert!(live.modified.is_none());
    // Revisions are always dated by their own commit
    assert_eq!(
        live.chain().unwrap().revisions()[1].document.date,
        Some(date_of(T1))
    );
}

#[test]
fn test_second_call_is_a_no_op() {
    let (dir, _) = three_commit_repo();
    let mut plugin = RevisionPlugin::new(test_config());
    let mut live = live_document(&dir, "content/post.md");
    plugin
        .on_content_init(&mut live, &PassthroughReader, &Value::Null)
        .unwrap();
    let before = Arc::clone(&live.chain().unwrap().all_revisions);

    let again = plugin
        .on_content_init(&mut live, &PassthroughReader, &Value::Null)
        .unwrap();
    assert!(!again);
    assert!(Arc::ptr_eq(&before, &live.chain().unwrap().all_revisions));
}

// ===== Skipped documents =====

#[test]
fn test_uncommitted_document_passes_through() {
    let dir = TempDir::new().unwrap();
    let repo = init_repo(dir.path());
    commit_file(&repo, "other.md", "x", T0, "other");
    std::fs::write(dir.path().join("draft.md"), "draft").unwrap();

    let mut plugin = RevisionPlugin::new(test_config());
    let mut live = live_document(&dir, "draft.md");
    let attached = plugin
        .on_content_init(&mut live, &PassthroughReader, &Value::Null)
        .unwrap();
    assert!(!attached);
    assert!(matches!(live.state, ChainState::Unprocessed));
    assert!(live.date.is_none());
}

#[test]
fn test_static_content_is_skipped() {
    let (dir, _) = three_commit_repo();
    let mut plugin = RevisionPlugin::new(test_config());
    let mut asset = Document::new(
        ContentKind::Static,
        dir.path().join("content/post.md"),
        "post.md",
        "post.md",
    );
    assert!(!plugin
        .on_content_init(&mut asset, &PassthroughReader, &Value::Null)
        .unwrap());
    assert!(asset.chain().is_none());
}

#[test]
fn test_disabled_plugin_does_nothing() {
    let (dir, _) = three_commit_repo();
    let mut config = test_config();
    config.revisions.enabled = false;
    let mut plugin = RevisionPlugin::new(config);
    let mut live = live_document(&dir, "content/post.md");
    assert!(!plugin
        .on_content_init(&mut live, &PassthroughReader, &Value::Null)
        .unwrap());
    assert!(live.chain().is_none());
}

// ===== Batches and failure isolation =====

#[test]
fn test_failures_are_isolated_per_document() {
    let dir = TempDir::new().unwrap();
    let repo = init_repo(dir.path());
    commit_file(&repo, "good.md", "fine", T0, "good");
    let bad_hash = commit_file(&repo, "bad.md", "BROKEN", T1, "bad").to_string();
    commit_file(&repo, "bad.md", "repaired", T2, "fix");

    let mut plugin = RevisionPlugin::new(test_config());
    let mut documents = vec![live_document(&dir, "bad.md"), live_document(&dir, "good.md")];

    let report = plugin
        .process_documents(&mut documents, &PickyReader, &Value::Null)
        .unwrap();
    assert_eq!(report.attached, 1);
    assert_eq!(report.skipped, 0);
    assert_eq!(report.failures.len(), 1);

    let failure = &report.failures[0];
    assert_eq!(failure.source_path, documents[0].source_path);
    assert_eq!(failure.error.commit(), Some(bad_hash.as_str()));
    assert!(matches!(
        failure.error,
        RevisionError::Materialize(MaterializeError::Read { .. })
    ));

    // Nothing partial is left on the failed document
    assert!(matches!(documents[0].state, ChainState::Unprocessed));
    assert!(documents[0].date.is_none());
    assert!(documents[1].chain().is_some());
}

#[test]
fn test_locator_reused_across_documents() {
    let dir = TempDir::new().unwrap();
    let repo = init_repo(dir.path());
    commit_file(&repo, "content/a.md", "a", T0, "a");
    commit_file(&repo, "content/b.md", "b", T1, "b");

    let mut plugin = RevisionPlugin::new(test_config());
    let mut documents = vec![
        live_document(&dir, "content/a.md"),
        live_document(&dir, "content/b.md"),
    ];
    let report = plugin
        .process_documents(&mut documents, &PassthroughReader, &Value::Null)
        .unwrap();
    assert_eq!(report.attached, 2);
    assert_eq!(plugin.locator().cached_paths(), 1);
}

// ===== Publishing =====

#[test]
fn test_publish_writes_every_revision() {
    let (dir, hashes) = three_commit_repo();
    let out = TempDir::new().unwrap();
    let mut plugin = RevisionPlugin::new(test_config());
    let mut documents = vec![live_document(&dir, "content/post.md")];
    plugin
        .process_documents(&mut documents, &PassthroughReader, &Value::Null)
        .unwrap();

    let mut writer = FileSystemWriter::new(out.path());
    let written = plugin
        .publish(ContentKind::Article, &documents, &mut writer, &Value::Null)
        .unwrap();
    assert_eq!(written, 3);

    let second = out
        .path()
        .join(format!("posts/post/{}/index.html", hashes[1]));
    assert_eq!(std::fs::read_to_string(second).unwrap(), "# Two\n");
}

/// What a template would see for one written revision
#[derive(Debug, PartialEq)]
struct WrittenLinks {
    name: String,
    anchor: String,
    previous_url: Option<String>,
    next_url: Option<String>,
}

#[derive(Default)]
struct RecordingWriter {
    writes: Vec<WrittenLinks>,
}

impl DocumentWriter for RecordingWriter {
    fn write_document(&mut self, request: WriteRequest<'_>) -> Result<(), PublishError> {
        let chain = request.chain.ok_or_else(|| PublishError::WriteFailed {
            name: request.name.to_string(),
            reason: "no chain".to_string(),
        })?;
        self.writes.push(WrittenLinks {
            name: request.name.to_string(),
            anchor: chain.anchor_commit.hash.clone(),
            previous_url: chain.previous_revision().map(|r| r.url().to_string()),
            next_url: chain.next_url().map(str::to_string),
        });
        Ok(())
    }
}

#[test]
fn test_published_revisions_carry_their_links() {
    let (dir, hashes) = three_commit_repo();
    let mut plugin = RevisionPlugin::new(test_config());
    let mut documents = vec![live_document(&dir, "content/post.md")];
    plugin
        .process_documents(&mut documents, &PassthroughReader, &Value::Null)
        .unwrap();

    let mut writer = RecordingWriter::default();
    plugin
        .publish(ContentKind::Article, &documents, &mut writer, &Value::Null)
        .unwrap();

    let url = |i: usize| format!("posts/post/{}", hashes[i]);
    assert_eq!(
        writer.writes,
        vec![
            WrittenLinks {
                name: format!("{}/index.html", url(0)),
                anchor: hashes[0].clone(),
                previous_url: None,
                next_url: Some(url(1)),
            },
            WrittenLinks {
                name: format!("{}/index.html", url(1)),
                anchor: hashes[1].clone(),
                previous_url: Some(url(0)),
                next_url: Some("posts/post.html".to_string()),
            },
            WrittenLinks {
                name: format!("{}/index.html", url(2)),
                anchor: hashes[2].clone(),
                previous_url: Some(url(1)),
                next_url: None,
            },
        ]
    );
}

#[test]
fn test_publish_respects_kind_toggles() {
    let (dir, _) = three_commit_repo();
    let out = TempDir::new().unwrap();
    let mut config = test_config();
    config.revisions.publish_articles = false;
    let mut plugin = RevisionPlugin::new(config);
    let mut documents = vec![live_document(&dir, "content/post.md")];
    plugin
        .process_documents(&mut documents, &PassthroughReader, &Value::Null)
        .unwrap();

    let mut writer = FileSystemWriter::new(out.path());
    let written = plugin
        .publish(ContentKind::Article, &documents, &mut writer, &Value::Null)
        .unwrap();
    assert_eq!(written, 0);

    // Articles are not pages
    let written = plugin
        .publish(ContentKind::Page, &documents, &mut writer, &Value::Null)
        .unwrap();
    assert_eq!(written, 0);
    assert!(writer.written().is_empty());
}
