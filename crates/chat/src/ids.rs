use std::fmt;
use std::str::FromStr;

use snafu::ResultExt;
use uuid::Uuid;

use super::error::{ChatError, ChatResult, InvalidIdSnafu};

// UUID v7 keeps ids time-ordered, so log order and id order agree within a session.
macro_rules! chat_id {
    ($(#[$meta:meta])* $name:ident => $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new_v7() -> Self {
                Self(Uuid::now_v7())
            }

            /// Parses the hyphenated form printed by `Display`, ignoring surrounding whitespace.
            pub fn parse(raw: &str) -> ChatResult<Self> {
                Uuid::parse_str(raw.trim())
                    .map(Self)
                    .context(InvalidIdSnafu {
                        stage: "parse-chat-id",
                        id_type: $label,
                        raw,
                    })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0.hyphenated(), formatter)
            }
        }

        impl FromStr for $name {
            type Err = ChatError;

            fn from_str(raw: &str) -> ChatResult<Self> {
                Self::parse(raw)
            }
        }
    };
}

chat_id!(
    /// Identity of one entry in the conversation log.
    MessageId => "message-id"
);
chat_id!(
    /// Identity of one ingested attachment, stable from the pending set into the log.
    AttachmentId => "attachment-id"
);
