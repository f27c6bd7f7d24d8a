//! Conversation state machine: user sends, the assistant composes, the reply lands.

mod phase;
mod reply;

use std::sync::Arc;

use crate::attachment::{
    AttachmentIngestor, AttachmentRecord, FileBlob, PendingAttachments, PreviewRegistry,
};
use crate::composer::{ComposerAction, KeyPress};
use crate::ids::{AttachmentId, MessageId};
use crate::message::Message;
use crate::settings::ChatSettings;
use crate::view::ConversationView;

pub use phase::{ComposingPhase, PhaseRejection, PhaseTransition, PhaseTransitionResult};
pub use reply::{
    AttachmentSummary, DEFAULT_ACKNOWLEDGMENT, DEFAULT_REPLY_DELAY, PendingReply, ReplyBackend,
    ReplyError, ReplyHandle, ReplyRequest, ReplyResult, ReplyWorker, SimulatedAssistant,
    synthesize_reply,
};

/// Everything the chat view renders. Only the controller mutates it.
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    log: Vec<Message>,
    pending_attachments: PendingAttachments,
    composer_text: String,
    phase: ComposingPhase,
    last_error: Option<String>,
}

impl ConversationState {
    pub fn log(&self) -> &[Message] {
        &self.log
    }

    pub fn pending_attachments(&self) -> &PendingAttachments {
        &self.pending_attachments
    }

    pub fn composer_text(&self) -> &str {
        &self.composer_text
    }

    pub fn phase(&self) -> ComposingPhase {
        self.phase
    }

    pub fn is_assistant_composing(&self) -> bool {
        self.phase.is_assistant_composing()
    }

    /// Error text of the most recent failed reply, cleared by the next accepted send.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Accepted { message_id: MessageId },
    Rejected(SendRejection),
}

impl SendOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// Why a send left the state untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendRejection {
    EmptyMessage,
    AssistantComposing,
    BackendUnavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    Appended { message_id: MessageId },
    Failed {
        in_reply_to: MessageId,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    Sent(SendOutcome),
    Edited,
}

/// Owns the conversation state and drives it through send and reply transitions.
///
/// Accepted sends spawn the reply worker on the current Tokio runtime. Without one the
/// send is refused with [`SendRejection::BackendUnavailable`].
pub struct ConversationController {
    state: ConversationState,
    ingestor: AttachmentIngestor,
    backend: Arc<dyn ReplyBackend>,
    pending_reply: Option<PendingReply>,
}

impl ConversationController {
    pub fn new(backend: Arc<dyn ReplyBackend>) -> Self {
        Self {
            state: ConversationState::default(),
            ingestor: AttachmentIngestor::new(PreviewRegistry::new()),
            backend,
            pending_reply: None,
        }
    }

    /// Builds a controller with the simulated assistant and optional greeting from settings.
    pub fn from_settings(settings: &ChatSettings) -> Self {
        let delay = settings.reply_delay();
        let backend = SimulatedAssistant::new(delay, settings.acknowledgment.clone());
        let controller = Self::new(Arc::new(backend));
        match settings.greeting.as_deref() {
            Some(greeting) => controller.with_greeting(greeting),
            None => controller,
        }
    }

    /// Seeds an empty log with an assistant greeting.
    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        let greeting = greeting.into();
        if self.state.log.is_empty() && !greeting.trim().is_empty() {
            self.state.log.push(Message::assistant(greeting));
        }
        self
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn log(&self) -> &[Message] {
        self.state.log()
    }

    pub fn pending_attachments(&self) -> &[AttachmentRecord] {
        self.state.pending_attachments.as_slice()
    }

    pub fn composer_text(&self) -> &str {
        self.state.composer_text()
    }

    pub fn is_assistant_composing(&self) -> bool {
        self.state.is_assistant_composing()
    }

    pub fn previews(&self) -> &PreviewRegistry {
        self.ingestor.previews()
    }

    pub fn view(&self) -> ConversationView {
        ConversationView::from_state(&self.state)
    }

    pub fn set_composer_text(&mut self, text: impl Into<String>) {
        self.state.composer_text = text.into();
    }

    pub fn handle_key(&mut self, key: KeyPress) -> KeyOutcome {
        let action = ComposerAction::from_key(key);
        if action.edit(&mut self.state.composer_text) {
            KeyOutcome::Edited
        } else {
            KeyOutcome::Sent(self.send())
        }
    }

    /// Ingests `blobs` and appends them to the pending attachments.
    pub fn attach<I>(&mut self, blobs: I) -> &[AttachmentRecord]
    where
        I: IntoIterator<Item = FileBlob>,
    {
        let records = self.ingestor.ingest(blobs);
        self.state.pending_attachments.extend(records)
    }

    pub fn remove_attachment(&mut self, id: AttachmentId) -> &[AttachmentRecord] {
        self.state.pending_attachments.remove(id)
    }

    /// Sends the composer text and pending attachments as one user message.
    ///
    /// Rejected sends leave the log, the composer and the pending attachments as they were;
    /// a refusal to start the reply also records `last_error`. An accepted send clears the
    /// composer, moves the pending attachments into the message and starts exactly one reply.
    pub fn send(&mut self) -> SendOutcome {
        let message_id = MessageId::new_v7();
        let next_phase = match self.state.phase.apply(PhaseTransition::Send(message_id)) {
            Ok(phase) => phase,
            Err(rejection) => {
                tracing::debug!(?rejection, "send rejected while assistant is composing");
                return SendOutcome::Rejected(SendRejection::AssistantComposing);
            }
        };

        let text = self.state.composer_text.trim();
        if text.is_empty() && self.state.pending_attachments.is_empty() {
            tracing::debug!("send rejected for empty message");
            return SendOutcome::Rejected(SendRejection::EmptyMessage);
        }

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(error) => {
                tracing::warn!(
                    message_id = %message_id,
                    error = %error,
                    "no async runtime to run the reply worker"
                );
                return self.refuse_send(error.to_string());
            }
        };

        let message = Message {
            id: message_id,
            ..Message::user(text, self.state.pending_attachments.as_slice().to_vec())
        };
        let handle = match self.backend.compose(ReplyRequest::from_message(&message)) {
            Ok(handle) => handle,
            Err(error) => {
                tracing::warn!(
                    message_id = %message_id,
                    backend = %self.backend.name(),
                    error = %error,
                    "reply backend refused the request"
                );
                return self.refuse_send(error.to_string());
            }
        };

        runtime.spawn(handle.worker);
        self.pending_reply = Some(handle.pending);

        tracing::info!(
            message_id = %message_id,
            attachment_count = message.attachments.len(),
            text_len = message.content.len(),
            "user message sent"
        );

        // The message holds clones of the records, so previews stay alive after take().
        drop(self.state.pending_attachments.take());
        self.state.log.push(message);
        self.state.composer_text.clear();
        self.state.phase = next_phase;
        self.state.last_error = None;

        SendOutcome::Accepted { message_id }
    }

    fn refuse_send(&mut self, message: String) -> SendOutcome {
        self.state.last_error = Some(message.clone());
        SendOutcome::Rejected(SendRejection::BackendUnavailable(message))
    }

    /// Applies the reply if it has already arrived.
    pub fn poll_reply(&mut self) -> Option<ReplyOutcome> {
        let pending = self.pending_reply.as_mut()?;
        let result = pending.try_recv()?;
        let in_reply_to = pending.in_reply_to();
        self.pending_reply = None;
        Some(self.settle_reply(in_reply_to, result))
    }

    /// Waits for the outstanding reply and applies it. Returns `None` when idle.
    ///
    /// Cancel safe: dropping the future keeps the reply pending.
    pub async fn await_reply(&mut self) -> Option<ReplyOutcome> {
        let pending = self.pending_reply.as_mut()?;
        let result = pending.recv().await;
        let in_reply_to = pending.in_reply_to();
        self.pending_reply = None;
        Some(self.settle_reply(in_reply_to, result))
    }

    fn settle_reply(
        &mut self,
        in_reply_to: MessageId,
        result: ReplyResult<String>,
    ) -> ReplyOutcome {
        let transition = match &result {
            Ok(_) => PhaseTransition::ReplyReady(in_reply_to),
            Err(_) => PhaseTransition::ReplyFailed(in_reply_to),
        };
        let settled = self.state.phase.apply(transition);
        self.state.phase = settled.unwrap_or_else(|rejection| {
            tracing::warn!(?rejection, message_id = %in_reply_to, "reply settled out of phase");
            ComposingPhase::Idle
        });

        match result {
            Ok(text) => {
                let message = Message::assistant(text);
                let message_id = message.id;
                self.state.log.push(message);
                tracing::info!(
                    message_id = %message_id,
                    in_reply_to = %in_reply_to,
                    "assistant reply appended"
                );
                ReplyOutcome::Appended { message_id }
            }
            Err(error) => {
                tracing::warn!(
                    in_reply_to = %in_reply_to,
                    error = %error,
                    "assistant reply failed"
                );
                let message = error.to_string();
                self.state.last_error = Some(message.clone());
                ReplyOutcome::Failed {
                    in_reply_to,
                    message,
                }
            }
        }
    }
}
