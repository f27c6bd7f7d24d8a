use crate::ids::AttachmentId;

use super::preview::PreviewRegistry;
use super::{AttachmentKind, AttachmentRecord, FileBlob};

/// Turns raw blobs into attachment records.
#[derive(Debug, Clone, Default)]
pub struct AttachmentIngestor {
    previews: PreviewRegistry,
}

impl AttachmentIngestor {
    pub fn new(previews: PreviewRegistry) -> Self {
        Self { previews }
    }

    pub fn previews(&self) -> &PreviewRegistry {
        &self.previews
    }

    /// Classifies each blob and allocates a preview for image and video kinds.
    ///
    /// Output order matches input order.
    pub fn ingest<I>(&self, blobs: I) -> Vec<AttachmentRecord>
    where
        I: IntoIterator<Item = FileBlob>,
    {
        blobs
            .into_iter()
            .map(|blob| self.ingest_one(blob))
            .collect()
    }

    fn ingest_one(&self, blob: FileBlob) -> AttachmentRecord {
        let kind = AttachmentKind::classify(&blob.mime_type);
        let preview = kind
            .wants_preview()
            .then(|| self.previews.allocate(blob.bytes.clone()));
        let record = AttachmentRecord::new(AttachmentId::new_v7(), blob, kind, preview);

        tracing::debug!(
            attachment_id = %record.id,
            kind = %record.kind,
            name = %record.source.name,
            size_bytes = record.source.size(),
            has_preview = record.preview_ref().is_some(),
            "ingested attachment"
        );
        record
    }
}

/// Ordered attachments waiting in the composer.
#[derive(Debug, Clone, Default)]
pub struct PendingAttachments {
    records: Vec<AttachmentRecord>,
}

impl PendingAttachments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends after the existing records.
    pub fn extend<I>(&mut self, records: I) -> &[AttachmentRecord]
    where
        I: IntoIterator<Item = AttachmentRecord>,
    {
        self.records.extend(records);
        &self.records
    }

    /// Drops the record with `id`, releasing its preview. Unknown ids leave the set unchanged.
    pub fn remove(&mut self, id: AttachmentId) -> &[AttachmentRecord] {
        let before = self.records.len();
        self.records.retain(|record| record.id != id);
        if self.records.len() == before {
            tracing::debug!(attachment_id = %id, "remove ignored for unknown attachment");
        } else {
            tracing::debug!(attachment_id = %id, "removed pending attachment");
        }
        &self.records
    }

    /// Moves every record out, leaving the set empty.
    pub fn take(&mut self) -> Vec<AttachmentRecord> {
        std::mem::take(&mut self.records)
    }

    pub fn as_slice(&self) -> &[AttachmentRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AttachmentRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
