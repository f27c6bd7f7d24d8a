use std::time::SystemTime;

use crate::attachment::AttachmentRecord;
use crate::ids::MessageId;

/// Chat speaker role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Assistant,
}

/// One entry of the conversation log. Never mutated after it is appended.
#[derive(Debug, Clone)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    pub created_at: SystemTime,
    pub attachments: Vec<AttachmentRecord>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>, attachments: Vec<AttachmentRecord>) -> Self {
        Self {
            id: MessageId::new_v7(),
            role,
            content: content.into(),
            created_at: SystemTime::now(),
            attachments,
        }
    }

    pub fn user(content: impl Into<String>, attachments: Vec<AttachmentRecord>) -> Self {
        Self::new(Role::User, content, attachments)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content, Vec::new())
    }

    pub fn is_from_user(&self) -> bool {
        matches!(self.role, Role::User)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attachment::{AttachmentIngestor, AttachmentKind, FileBlob};

    #[test]
    fn user_messages_keep_attachment_order() {
        let ingestor = AttachmentIngestor::default();
        let attachments = ingestor.ingest([
            FileBlob::new("a.png", "image/png", vec![1_u8]),
            FileBlob::new("b.ogg", "audio/ogg", vec![1_u8]),
            FileBlob::new("c.jpg", "image/jpeg", vec![1_u8]),
        ]);
        let message = Message::user("", attachments);

        assert!(message.is_from_user());
        let kinds = message
            .attachments
            .iter()
            .map(|record| record.kind)
            .collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![
                AttachmentKind::Image,
                AttachmentKind::Audio,
                AttachmentKind::Image,
            ]
        );
    }

    #[test]
    fn assistant_messages_carry_no_attachments() {
        let message = Message::assistant("hi");
        assert!(!message.is_from_user());
        assert!(message.attachments.is_empty());
    }
}
