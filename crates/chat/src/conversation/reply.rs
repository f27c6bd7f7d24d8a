use std::time::Duration;

use futures::future::BoxFuture;
use snafu::Snafu;
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

use crate::attachment::AttachmentKind;
use crate::ids::MessageId;
use crate::message::Message;

pub const DEFAULT_REPLY_DELAY: Duration = Duration::from_millis(1500);
pub const DEFAULT_ACKNOWLEDGMENT: &str =
    "I understand your message. As PrimeAI, I'm here to help you with any questions or tasks you have. What would you like to know more about?";

pub type ReplyWorker = BoxFuture<'static, ()>;
pub type ReplyResult<T> = Result<T, ReplyError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ReplyError {
    #[snafu(display("reply to message {in_reply_to} was cancelled"))]
    Cancelled {
        stage: &'static str,
        in_reply_to: MessageId,
    },
    #[snafu(display("reply worker for message {in_reply_to} exited without a result"))]
    WorkerDropped {
        stage: &'static str,
        in_reply_to: MessageId,
    },
    #[snafu(display("reply backend failed on `{stage}`: {message}"))]
    Backend {
        stage: &'static str,
        message: String,
    },
}

/// Backend-facing view of one attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentSummary {
    pub kind: AttachmentKind,
    pub name: String,
    pub size_bytes: u64,
}

/// Everything a backend needs to answer one user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyRequest {
    pub in_reply_to: MessageId,
    pub text: String,
    pub attachments: Vec<AttachmentSummary>,
}

impl ReplyRequest {
    pub fn from_message(message: &Message) -> Self {
        Self {
            in_reply_to: message.id,
            text: message.content.clone(),
            attachments: message
                .attachments
                .iter()
                .map(|record| AttachmentSummary {
                    kind: record.kind,
                    name: record.source.name.clone(),
                    size_bytes: record.source.size(),
                })
                .collect(),
        }
    }

    /// Distinct attachment kinds in order of first appearance.
    pub fn distinct_kinds(&self) -> Vec<AttachmentKind> {
        let mut kinds = Vec::new();
        for summary in &self.attachments {
            if !kinds.contains(&summary.kind) {
                kinds.push(summary.kind);
            }
        }
        kinds
    }
}

/// Receiving half of an in-flight reply. Dropping it cancels the worker.
pub struct PendingReply {
    in_reply_to: MessageId,
    result_rx: oneshot::Receiver<ReplyResult<String>>,
    cancel_tx: Option<oneshot::Sender<()>>,
}

impl PendingReply {
    pub fn in_reply_to(&self) -> MessageId {
        self.in_reply_to
    }

    /// Waits for the reply. Cancel safe: dropping the future keeps the reply pending.
    pub async fn recv(&mut self) -> ReplyResult<String> {
        match (&mut self.result_rx).await {
            Ok(result) => result,
            Err(_) => Err(self.closed_error("pending-reply-recv")),
        }
    }

    pub fn try_recv(&mut self) -> Option<ReplyResult<String>> {
        match self.result_rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => Some(Err(self.closed_error("pending-reply-try-recv"))),
        }
    }

    /// Signals the worker to stop. Returns false when it already finished or was cancelled.
    fn cancel(&mut self) -> bool {
        self.cancel_tx
            .take()
            .is_some_and(|cancel_tx| cancel_tx.send(()).is_ok())
    }

    fn closed_error(&self, stage: &'static str) -> ReplyError {
        if self.cancel_tx.is_none() {
            ReplyError::Cancelled {
                stage,
                in_reply_to: self.in_reply_to,
            }
        } else {
            ReplyError::WorkerDropped {
                stage,
                in_reply_to: self.in_reply_to,
            }
        }
    }
}

impl Drop for PendingReply {
    fn drop(&mut self) {
        if self.cancel() {
            tracing::debug!(message_id = %self.in_reply_to, "cancelled in-flight reply");
        }
    }
}

/// A started reply: the caller spawns `worker` and keeps `pending`.
pub struct ReplyHandle {
    pub pending: PendingReply,
    pub worker: ReplyWorker,
}

pub trait ReplyBackend: Send + Sync {
    fn name(&self) -> &str;
    fn compose(&self, request: ReplyRequest) -> ReplyResult<ReplyHandle>;
}

pub(crate) fn make_reply_channel(
    in_reply_to: MessageId,
) -> (
    oneshot::Sender<ReplyResult<String>>,
    PendingReply,
    oneshot::Receiver<()>,
) {
    let (result_tx, result_rx) = oneshot::channel();
    let (cancel_tx, cancel_rx) = oneshot::channel();
    (
        result_tx,
        PendingReply {
            in_reply_to,
            result_rx,
            cancel_tx: Some(cancel_tx),
        },
        cancel_rx,
    )
}

/// Builds the demo reply text for `request`.
///
/// Without attachments this is the fixed acknowledgment; with attachments it reports the
/// count and the distinct kinds.
pub fn synthesize_reply(request: &ReplyRequest, acknowledgment: &str) -> String {
    if request.attachments.is_empty() {
        return acknowledgment.to_string();
    }

    let count = request.attachments.len();
    let (noun, pronoun) = if count == 1 {
        ("file", "it")
    } else {
        ("files", "them")
    };
    let kinds = request
        .distinct_kinds()
        .iter()
        .map(AttachmentKind::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "I received {count} {noun} ({kinds}). Analyzing file contents isn't supported in this demo mode, but feel free to ask me anything about {pronoun}!"
    )
}

/// Stand-in backend that answers after a fixed delay.
#[derive(Debug, Clone)]
pub struct SimulatedAssistant {
    delay: Duration,
    acknowledgment: String,
}

impl SimulatedAssistant {
    pub fn new(delay: Duration, acknowledgment: impl Into<String>) -> Self {
        Self {
            delay,
            acknowledgment: acknowledgment.into(),
        }
    }

    async fn run_worker(
        in_reply_to: MessageId,
        delay: Duration,
        text: String,
        result_tx: oneshot::Sender<ReplyResult<String>>,
        mut cancel_rx: oneshot::Receiver<()>,
    ) {
        tokio::select! {
            _ = &mut cancel_rx => {
                tracing::debug!(message_id = %in_reply_to, "simulated reply cancelled");
            }
            _ = tokio::time::sleep(delay) => {
                if result_tx.send(Ok(text)).is_err() {
                    tracing::debug!(
                        message_id = %in_reply_to,
                        "reply receiver went away before delivery"
                    );
                }
            }
        }
    }
}

impl Default for SimulatedAssistant {
    fn default() -> Self {
        Self::new(DEFAULT_REPLY_DELAY, DEFAULT_ACKNOWLEDGMENT)
    }
}

impl ReplyBackend for SimulatedAssistant {
    fn name(&self) -> &str {
        "simulated"
    }

    fn compose(&self, request: ReplyRequest) -> ReplyResult<ReplyHandle> {
        let text = synthesize_reply(&request, &self.acknowledgment);
        let (result_tx, pending, cancel_rx) = make_reply_channel(request.in_reply_to);

        tracing::debug!(
            message_id = %request.in_reply_to,
            attachment_count = request.attachments.len(),
            delay_ms = self.delay.as_millis() as u64,
            "scheduled simulated reply"
        );

        let worker: ReplyWorker = Box::pin(Self::run_worker(
            request.in_reply_to,
            self.delay,
            text,
            result_tx,
            cancel_rx,
        ));

        Ok(ReplyHandle { pending, worker })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(kinds: &[AttachmentKind]) -> ReplyRequest {
        ReplyRequest {
            in_reply_to: MessageId::new_v7(),
            text: String::new(),
            attachments: kinds
                .iter()
                .enumerate()
                .map(|(index, kind)| AttachmentSummary {
                    kind: *kind,
                    name: format!("file-{index}"),
                    size_bytes: 1,
                })
                .collect(),
        }
    }

    #[test]
    fn plain_text_gets_the_acknowledgment() {
        assert_eq!(synthesize_reply(&request(&[]), "ok!"), "ok!");
    }

    #[test]
    fn attachment_reply_reports_count_and_kinds_in_first_seen_order() {
        let text = synthesize_reply(
            &request(&[
                AttachmentKind::Image,
                AttachmentKind::Audio,
                AttachmentKind::Image,
            ]),
            DEFAULT_ACKNOWLEDGMENT,
        );

        assert!(text.contains("3 files"));
        assert!(text.contains("(image, audio)"));
        assert!(text.contains("demo mode"));
        assert!(text.contains("ask me anything about them"));
    }

    #[test]
    fn single_attachment_uses_singular_wording() {
        let text = synthesize_reply(&request(&[AttachmentKind::Other]), DEFAULT_ACKNOWLEDGMENT);
        assert!(text.starts_with("I received 1 file (other)."));
        assert!(text.ends_with("about it!"));
    }

    #[tokio::test(start_paused = true)]
    async fn simulated_reply_lands_after_the_delay() {
        let backend = SimulatedAssistant::new(Duration::from_millis(1500), "done");
        let ReplyHandle {
            mut pending,
            worker,
        } = backend.compose(request(&[])).unwrap();
        tokio::spawn(worker);

        let started = tokio::time::Instant::now();
        assert_eq!(pending.recv().await.unwrap(), "done");
        assert!(started.elapsed() >= Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn try_recv_is_empty_before_the_delay() {
        let backend = SimulatedAssistant::new(Duration::from_secs(5), "done");
        let ReplyHandle {
            mut pending,
            worker,
        } = backend.compose(request(&[])).unwrap();
        tokio::spawn(worker);

        tokio::task::yield_now().await;
        assert!(pending.try_recv().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_the_worker() {
        let backend = SimulatedAssistant::new(Duration::from_secs(60), "never");
        let ReplyHandle {
            mut pending,
            worker,
        } = backend.compose(request(&[])).unwrap();
        let join = tokio::spawn(worker);

        assert!(pending.cancel());
        join.await.unwrap();
        assert!(matches!(
            pending.recv().await,
            Err(ReplyError::Cancelled { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_pending_reply_cancels_the_worker() {
        let backend = SimulatedAssistant::new(Duration::from_secs(60), "never");
        let ReplyHandle { pending, worker } = backend.compose(request(&[])).unwrap();
        let join = tokio::spawn(worker);

        drop(pending);
        join.await.unwrap();
    }

    #[tokio::test]
    async fn worker_exit_without_result_is_reported() {
        let message_id = MessageId::new_v7();
        let (result_tx, mut pending, _cancel_rx) = make_reply_channel(message_id);
        drop(result_tx);

        assert!(matches!(
            pending.recv().await,
            Err(ReplyError::WorkerDropped { in_reply_to, .. }) if in_reply_to == message_id
        ));
    }
}
