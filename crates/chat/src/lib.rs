#![deny(unsafe_code)]

//! Attachment-aware conversation core for the PrimeAI chat UI.
//!
//! The crate owns the message log, the pending attachments and the composing flag,
//! and exposes a render model for whatever presentation layer sits on top.

/// Attachment classification, preview handles and the pending set.
pub mod attachment;
pub mod composer;
/// Send/reply state machine and the reply backend seam.
pub mod conversation;
pub mod error;
pub mod ids;
pub mod message;
pub mod settings;
pub mod view;

pub use attachment::{
    AcceptFilter, AttachmentIngestor, AttachmentKind, AttachmentRecord, FileBlob,
    PendingAttachments, PreviewLease, PreviewRef, PreviewRegistry, format_size,
};
pub use composer::{ComposerAction, KeyPress};
pub use conversation::{
    ComposingPhase, ConversationController, ConversationState, KeyOutcome, ReplyBackend,
    ReplyError, ReplyOutcome, ReplyRequest, SendOutcome, SendRejection, SimulatedAssistant,
};
pub use error::{ChatError, ChatResult};
pub use ids::{AttachmentId, MessageId};
pub use message::{Message, Role};
pub use settings::{ChatSettings, SettingsStore};
pub use view::{AttachmentPresentation, AttachmentView, ConversationView, MessageView};
