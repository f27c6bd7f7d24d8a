//! Attachment pipeline: classification, preview handles and the pending set.

mod accept;
mod ingest;
mod preview;
mod size;

use std::fmt;
use std::sync::Arc;

use crate::ids::AttachmentId;

pub use accept::AcceptFilter;
pub use ingest::{AttachmentIngestor, PendingAttachments};
pub use preview::{PreviewLease, PreviewRef, PreviewRegistry};
pub use size::format_size;

/// Media kind derived from a blob's declared MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentKind {
    Image,
    Video,
    Audio,
    Other,
}

impl AttachmentKind {
    /// Classifies a MIME type by its top-level prefix.
    ///
    /// Total: anything that is not image, video or audio is `Other`.
    pub fn classify(mime_type: &str) -> Self {
        let mime_type = mime_type.trim();
        if has_prefix_ignore_case(mime_type, "image/") {
            Self::Image
        } else if has_prefix_ignore_case(mime_type, "video/") {
            Self::Video
        } else if has_prefix_ignore_case(mime_type, "audio/") {
            Self::Audio
        } else {
            Self::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Other => "other",
        }
    }

    /// Image and video are rendered inline from a preview handle.
    pub fn wants_preview(&self) -> bool {
        matches!(self, Self::Image | Self::Video)
    }
}

impl fmt::Display for AttachmentKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

fn has_prefix_ignore_case(value: &str, prefix: &str) -> bool {
    value
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Raw file selected by the user.
#[derive(Clone, PartialEq, Eq)]
pub struct FileBlob {
    pub name: String,
    pub mime_type: String,
    pub bytes: Arc<[u8]>,
}

impl FileBlob {
    pub fn new(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

impl fmt::Debug for FileBlob {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("FileBlob")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("size", &self.size())
            .finish()
    }
}

/// One ingested file, either pending in the composer or attached to a sent message.
///
/// Clones share the preview lease; the preview is revoked when the last clone drops.
#[derive(Debug, Clone)]
pub struct AttachmentRecord {
    pub id: AttachmentId,
    pub source: FileBlob,
    pub kind: AttachmentKind,
    preview: Option<Arc<PreviewLease>>,
}

impl AttachmentRecord {
    pub(crate) fn new(
        id: AttachmentId,
        source: FileBlob,
        kind: AttachmentKind,
        preview: Option<PreviewLease>,
    ) -> Self {
        Self {
            id,
            source,
            kind,
            preview: preview.map(Arc::new),
        }
    }

    pub fn preview_ref(&self) -> Option<&PreviewRef> {
        self.preview.as_deref().map(PreviewLease::reference)
    }

    pub fn name(&self) -> &str {
        &self.source.name
    }

    pub fn size_label(&self) -> String {
        format_size(self.source.size())
    }
}
