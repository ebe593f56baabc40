use crate::document::{ContentKind, Document};
use crate::error::PublishError;
use crate::host::{DocumentWriter, WriteRequest};
use serde_json::Value;

/// Write every historical revision of every `kind` document that has a chain
///
/// Each revision goes through the writer exactly like a live document would,
/// under its own `save_as`, template and category, together with the chain
/// anchored at that revision so templates can link to its neighbours.
/// Documents without a chain are skipped. The first write failure is
/// returned immediately.
pub fn publish_revisions<W>(
    documents: &[Document],
    kind: ContentKind,
    writer: &mut W,
    relative_urls: bool,
    context: &Value,
) -> Result<usize, PublishError>
where
    W: DocumentWriter + ?Sized,
{
    let mut written = 0;

    for document in documents.iter().filter(|d| d.kind == kind) {
        let Some(chain) = document.chain() else {
            continue;
        };

        for (index, revision) in chain.revisions().iter().enumerate() {
            let view = chain.view(index);
            let revision = &revision.document;
            writer.write_document(WriteRequest {
                name: &revision.save_as,
                template: &revision.template,
                kind,
                document: revision,
                chain: view.as_ref(),
                category: revision.category.as_deref(),
                relative_urls,
                context,
            })?;
            written += 1;
        }
    }

    tracing::info!("Published {} {} revisions", written, kind.as_str());
    Ok(written)
}
