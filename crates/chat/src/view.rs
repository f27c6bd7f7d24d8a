//! Render model handed to a presentation layer.

use crate::attachment::{AttachmentKind, AttachmentRecord, FileBlob, PreviewRef};
use crate::conversation::ConversationState;
use crate::ids::{AttachmentId, MessageId};
use crate::message::{Message, Role};

/// How one attachment should be drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentPresentation {
    InlineImage(PreviewRef),
    InlineVideo(PreviewRef),
    /// Audio players bind to the raw blob rather than a preview handle.
    AudioPlayer(FileBlob),
    /// Name and size only.
    FileCard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentView {
    pub id: AttachmentId,
    pub name: String,
    pub size_label: String,
    pub kind: AttachmentKind,
    pub presentation: AttachmentPresentation,
}

impl AttachmentView {
    pub fn from_record(record: &AttachmentRecord) -> Self {
        let presentation = match (record.kind, record.preview_ref()) {
            (AttachmentKind::Image, Some(preview)) => {
                AttachmentPresentation::InlineImage(preview.clone())
            }
            (AttachmentKind::Video, Some(preview)) => {
                AttachmentPresentation::InlineVideo(preview.clone())
            }
            (AttachmentKind::Audio, _) => {
                AttachmentPresentation::AudioPlayer(record.source.clone())
            }
            _ => AttachmentPresentation::FileCard,
        };

        Self {
            id: record.id,
            name: record.name().to_string(),
            size_label: record.size_label(),
            kind: record.kind,
            presentation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageView {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    pub attachments: Vec<AttachmentView>,
}

impl MessageView {
    pub fn from_message(message: &Message) -> Self {
        Self {
            id: message.id,
            role: message.role,
            content: message.content.clone(),
            attachments: message
                .attachments
                .iter()
                .map(AttachmentView::from_record)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationView {
    pub messages: Vec<MessageView>,
    pub pending_attachments: Vec<AttachmentView>,
    pub composer_text: String,
    pub show_typing_indicator: bool,
    pub composer_disabled: bool,
    pub can_send: bool,
}

impl ConversationView {
    pub fn from_state(state: &ConversationState) -> Self {
        let composing = state.is_assistant_composing();
        let has_content = !state.composer_text().trim().is_empty()
            || !state.pending_attachments().is_empty();

        Self {
            messages: state.log().iter().map(MessageView::from_message).collect(),
            pending_attachments: state
                .pending_attachments()
                .iter()
                .map(AttachmentView::from_record)
                .collect(),
            composer_text: state.composer_text().to_string(),
            show_typing_indicator: composing,
            composer_disabled: composing,
            can_send: !composing && has_content,
        }
    }
}
