use primeai_chat::{
    AcceptFilter, AttachmentId, ChatSettings, ConversationController, KeyOutcome, KeyPress,
    ReplyOutcome, SendOutcome, SendRejection,
};

use crate::command::{Command, HELP};
use crate::picker::{SkipReason, select_files};
use crate::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Terminal front-end state around one conversation.
pub struct Session {
    controller: ConversationController,
    accept: AcceptFilter,
    assistant_name: String,
    rendered_messages: usize,
}

impl Session {
    pub fn new(settings: &ChatSettings) -> Self {
        Self {
            controller: ConversationController::from_settings(settings),
            accept: settings.accept_filter(),
            assistant_name: settings.assistant_name.clone(),
            rendered_messages: 0,
        }
    }

    pub fn controller(&self) -> &ConversationController {
        &self.controller
    }

    pub fn is_waiting(&self) -> bool {
        self.controller.is_assistant_composing()
    }

    /// Renders messages appended since the last call, then the status block.
    pub fn updates(&mut self) -> String {
        let view = self.controller.view();
        let mut output = String::new();
        for message in view.messages.iter().skip(self.rendered_messages) {
            output.push_str(&render::message_block(message, &self.assistant_name));
        }
        self.rendered_messages = view.messages.len();
        output.push_str(&render::status(&view, &self.assistant_name));
        output
    }

    pub async fn wait_for_reply(&mut self) -> Option<ReplyOutcome> {
        self.controller.await_reply().await
    }

    pub fn on_reply(&mut self, outcome: Option<ReplyOutcome>) -> String {
        match outcome {
            Some(ReplyOutcome::Failed { message, .. }) => {
                let updates = self.updates();
                format!(
                    "{} could not answer: {message}\n{updates}",
                    self.assistant_name
                )
            }
            Some(ReplyOutcome::Appended { .. }) | None => self.updates(),
        }
    }

    pub async fn handle_line(&mut self, line: &str) -> (Flow, String) {
        match Command::parse(line) {
            Command::Compose { text, submit } => (Flow::Continue, self.compose(&text, submit)),
            Command::Attach(paths) => (Flow::Continue, self.attach(&paths).await),
            Command::Remove(raw) => (Flow::Continue, self.remove(&raw)),
            Command::View => {
                let view = self.controller.view();
                self.rendered_messages = view.messages.len();
                (
                    Flow::Continue,
                    render::conversation(&view, &self.assistant_name),
                )
            }
            Command::Help => (Flow::Continue, format!("{HELP}\n")),
            Command::Quit => (Flow::Quit, String::new()),
            Command::Unknown(name) => (
                Flow::Continue,
                format!("unknown command /{name}, try /help\n"),
            ),
        }
    }

    fn compose(&mut self, text: &str, submit: bool) -> String {
        for ch in text.chars() {
            self.controller.handle_key(KeyPress::Char(ch));
        }

        let outcome = match self.controller.handle_key(KeyPress::Enter { shift: !submit }) {
            KeyOutcome::Edited => return String::new(),
            KeyOutcome::Sent(outcome) => outcome,
        };

        match outcome {
            SendOutcome::Accepted { .. } => self.updates(),
            SendOutcome::Rejected(SendRejection::EmptyMessage) => String::new(),
            SendOutcome::Rejected(SendRejection::AssistantComposing) => {
                format!(
                    "{} is still typing, your draft is kept\n",
                    self.assistant_name
                )
            }
            SendOutcome::Rejected(SendRejection::BackendUnavailable(message)) => {
                format!("message not sent: {message}\n")
            }
        }
    }

    async fn attach(&mut self, paths: &[std::path::PathBuf]) -> String {
        if paths.is_empty() {
            return "usage: /attach <path>...\n".to_string();
        }

        let selection = select_files(paths, &self.accept).await;
        let mut output = String::new();
        for skipped in &selection.skipped {
            let reason = match &skipped.reason {
                SkipReason::Rejected { mime_type } => {
                    format!("{mime_type} is not accepted ({})", self.accept)
                }
                SkipReason::Unreadable(message) => message.clone(),
            };
            output.push_str(&format!("skipped {}: {reason}\n", skipped.path.display()));
        }

        self.controller.attach(selection.blobs);
        output.push_str(&self.updates());
        output
    }

    fn remove(&mut self, raw: &str) -> String {
        match AttachmentId::parse(raw) {
            Ok(id) => {
                self.controller.remove_attachment(id);
                self.updates()
            }
            Err(error) => format!("{error}\n"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> ChatSettings {
        ChatSettings {
            reply_delay_ms: 100,
            ..ChatSettings::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn greeting_is_rendered_first() {
        let mut session = Session::new(&settings());
        let output = session.updates();

        assert!(output.starts_with("PrimeAI: Hello! I'm PrimeAI"));
        assert_eq!(session.updates(), "");
    }

    #[tokio::test(start_paused = true)]
    async fn continued_lines_are_sent_as_one_message() {
        let mut session = Session::new(&settings());
        session.updates();

        let (flow, output) = session.handle_line("line one\\").await;
        assert_eq!(flow, Flow::Continue);
        assert!(output.is_empty());

        let (_, output) = session.handle_line("line two").await;
        assert!(output.contains("you: line one\n    line two\n"));
        assert!(output.contains("PrimeAI is typing..."));
        assert!(session.is_waiting());

        let (_, output) = session.handle_line("too soon").await;
        assert!(output.contains("still typing"));

        let outcome = session.wait_for_reply().await;
        let output = session.on_reply(outcome);
        assert!(output.starts_with("PrimeAI: I understand your message."));
        assert!(output.contains("draft: \"too soon\""));
        assert!(!session.is_waiting());
        assert_eq!(session.controller().log().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn attach_and_remove_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("cat.png");
        std::fs::write(&image, [9_u8; 10]).unwrap();

        let mut session = Session::new(&settings());
        session.updates();
        let output = session
            .handle_line(&format!("/attach {}", image.display()))
            .await
            .1;
        assert!(output.contains("pending:"));
        assert!(output.contains("cat.png (10 Bytes)"));

        let id = session.controller().pending_attachments()[0].id;
        let output = session.handle_line(&format!("/remove {id}")).await.1;
        assert!(!output.contains("pending:"));
        assert!(session.controller().pending_attachments().is_empty());

        let output = session.handle_line("/remove nonsense").await.1;
        assert!(output.contains("attachment-id"));
    }

    #[tokio::test(start_paused = true)]
    async fn quit_and_unknown_commands() {
        let mut session = Session::new(&settings());

        assert_eq!(session.handle_line("/quit").await.0, Flow::Quit);
        let output = session.handle_line("/nope").await.1;
        assert!(output.contains("unknown command /nope"));
    }
}
