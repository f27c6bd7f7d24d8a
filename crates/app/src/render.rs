use std::fmt::Write;

use primeai_chat::{AttachmentPresentation, AttachmentView, ConversationView, MessageView, Role};

pub fn banner(assistant_name: &str, tagline: &str) -> String {
    format!("== {assistant_name} ==\n{tagline}\n")
}

pub fn attachment_line(attachment: &AttachmentView) -> String {
    let label = match &attachment.presentation {
        AttachmentPresentation::InlineImage(preview) => format!("image {preview}"),
        AttachmentPresentation::InlineVideo(preview) => format!("video {preview}"),
        AttachmentPresentation::AudioPlayer(_) => "audio player".to_string(),
        AttachmentPresentation::FileCard => "file".to_string(),
    };
    format!("[{label}] {} ({})", attachment.name, attachment.size_label)
}

pub fn message_block(message: &MessageView, assistant_name: &str) -> String {
    let speaker = match message.role {
        Role::User => "you",
        Role::Assistant => assistant_name,
    };

    let mut block = String::new();
    let mut lines = message.content.lines();
    let first = lines.next().unwrap_or_default();
    let _ = writeln!(block, "{speaker}: {first}");
    for line in lines {
        let _ = writeln!(block, "    {line}");
    }
    for attachment in &message.attachments {
        let _ = writeln!(block, "    {}", attachment_line(attachment));
    }
    block
}

/// Pending attachments, typing indicator and composer state.
pub fn status(view: &ConversationView, assistant_name: &str) -> String {
    let mut output = String::new();

    if !view.pending_attachments.is_empty() {
        let _ = writeln!(output, "pending:");
        for attachment in &view.pending_attachments {
            let line = attachment_line(attachment);
            let _ = writeln!(output, "  {} {line}", attachment.id);
        }
    }
    if view.show_typing_indicator {
        let _ = writeln!(output, "{assistant_name} is typing...");
    }
    if !view.composer_text.is_empty() {
        let _ = writeln!(output, "draft: {:?}", view.composer_text);
    }

    output
}

pub fn conversation(view: &ConversationView, assistant_name: &str) -> String {
    let mut output = String::new();
    for message in &view.messages {
        output.push_str(&message_block(message, assistant_name));
    }
    output.push_str(&status(view, assistant_name));
    output
}

#[cfg(test)]
mod tests {
    use primeai_chat::{AttachmentIngestor, FileBlob, Message};

    use super::*;

    #[test]
    fn multi_line_messages_are_indented() {
        let message = MessageView::from_message(&Message::user("one\ntwo", Vec::new()));
        assert_eq!(message_block(&message, "PrimeAI"), "you: one\n    two\n");
    }

    #[test]
    fn attachments_render_with_size_labels() {
        let ingestor = AttachmentIngestor::default();
        let records = ingestor.ingest([
            FileBlob::new("song.mp3", "audio/mpeg", vec![0_u8; 1536]),
            FileBlob::new("cat.png", "image/png", vec![0_u8; 4]),
        ]);
        let message = MessageView::from_message(&Message::user("", records));
        let block = message_block(&message, "PrimeAI");

        assert!(block.starts_with("you: \n"));
        assert!(block.contains("[audio player] song.mp3 (1.5 KB)"));
        assert!(block.contains("[image preview:"));
        assert!(block.contains("] cat.png (4 Bytes)"));
    }

    #[test]
    fn assistant_messages_use_the_configured_name() {
        let message = MessageView::from_message(&Message::assistant("hi"));
        assert_eq!(message_block(&message, "Nova"), "Nova: hi\n");
    }
}
