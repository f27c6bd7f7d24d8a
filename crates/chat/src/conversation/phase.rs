use crate::ids::MessageId;

/// Whether the assistant is currently composing a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComposingPhase {
    #[default]
    Idle,
    AssistantComposing {
        in_reply_to: MessageId,
    },
}

/// State transition input for the composing lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseTransition {
    Send(MessageId),
    ReplyReady(MessageId),
    ReplyFailed(MessageId),
}

/// Rejection reason for illegal phase transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseRejection {
    AlreadyComposing {
        active: MessageId,
        attempted: MessageId,
    },
    NotComposing,
    ReplyMismatch {
        active: MessageId,
        attempted: MessageId,
    },
}

pub type PhaseTransitionResult = Result<ComposingPhase, PhaseRejection>;

impl ComposingPhase {
    pub fn is_assistant_composing(&self) -> bool {
        matches!(self, Self::AssistantComposing { .. })
    }

    /// Applies one transition deterministically.
    ///
    /// Only `Idle` accepts a send. Settling transitions must name the message the
    /// active reply belongs to.
    pub fn apply(&self, transition: PhaseTransition) -> PhaseTransitionResult {
        match transition {
            PhaseTransition::Send(message_id) => self.apply_send(message_id),
            PhaseTransition::ReplyReady(message_id) | PhaseTransition::ReplyFailed(message_id) => {
                self.apply_settle(message_id)
            }
        }
    }

    fn apply_send(&self, message_id: MessageId) -> PhaseTransitionResult {
        match self {
            Self::Idle => Ok(Self::AssistantComposing {
                in_reply_to: message_id,
            }),
            Self::AssistantComposing { in_reply_to } => Err(PhaseRejection::AlreadyComposing {
                active: *in_reply_to,
                attempted: message_id,
            }),
        }
    }

    fn apply_settle(&self, message_id: MessageId) -> PhaseTransitionResult {
        match self {
            Self::AssistantComposing { in_reply_to } if *in_reply_to == message_id => {
                Ok(Self::Idle)
            }
            Self::AssistantComposing { in_reply_to } => Err(PhaseRejection::ReplyMismatch {
                active: *in_reply_to,
                attempted: message_id,
            }),
            Self::Idle => Err(PhaseRejection::NotComposing),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_then_reply_round_trips_to_idle() {
        let message_id = MessageId::new_v7();
        let composing = ComposingPhase::Idle
            .apply(PhaseTransition::Send(message_id))
            .unwrap();

        assert!(composing.is_assistant_composing());
        assert_eq!(
            composing,
            ComposingPhase::AssistantComposing {
                in_reply_to: message_id,
            }
        );
        assert_eq!(
            composing.apply(PhaseTransition::ReplyReady(message_id)),
            Ok(ComposingPhase::Idle)
        );
        assert_eq!(
            composing.apply(PhaseTransition::ReplyFailed(message_id)),
            Ok(ComposingPhase::Idle)
        );
    }

    #[test]
    fn second_send_is_rejected_while_composing() {
        let active = MessageId::new_v7();
        let attempted = MessageId::new_v7();
        let composing = ComposingPhase::AssistantComposing {
            in_reply_to: active,
        };

        assert_eq!(
            composing.apply(PhaseTransition::Send(attempted)),
            Err(PhaseRejection::AlreadyComposing { active, attempted })
        );
    }

    #[test]
    fn settling_requires_the_matching_reply() {
        let active = MessageId::new_v7();
        let attempted = MessageId::new_v7();
        let composing = ComposingPhase::AssistantComposing {
            in_reply_to: active,
        };

        assert_eq!(
            composing.apply(PhaseTransition::ReplyReady(attempted)),
            Err(PhaseRejection::ReplyMismatch { active, attempted })
        );
        assert_eq!(
            ComposingPhase::Idle.apply(PhaseTransition::ReplyReady(active)),
            Err(PhaseRejection::NotComposing)
        );
    }
}
