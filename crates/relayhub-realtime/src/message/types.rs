//! Client-to-server and server-to-client message types.

use serde::{Deserialize, Serialize};

use relayhub_core::types::Identity;

/// Messages sent from client to server.
///
/// Field names follow the wire format; `isTyping` is camel-cased.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    /// Typing indicator toggle
    Typing {
        /// Whether the sender is typing
        #[serde(rename = "isTyping", default)]
        is_typing: bool,
    },
    /// Chat line
    Chat {
        /// Message body
        #[serde(default)]
        text: String,
    },
    /// Any other `type`; ignored
    #[serde(other)]
    Unknown,
}

/// Events pushed from server to client, encoded as
/// `{"type": ..., "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Sent once to a newly connected client: every online identity,
    /// including itself.
    OnlineList {
        /// Online identities
        users: Vec<Identity>,
    },
    /// An identity went from zero to one connection.
    UserJoined {
        /// Who joined
        user: Identity,
    },
    /// An identity's last connection closed.
    UserLeft {
        /// Who left
        user: Identity,
    },
    /// Relayed typing indicator.
    Typing {
        /// Who is typing
        user: Identity,
        /// Typing state
        #[serde(rename = "isTyping")]
        is_typing: bool,
    },
    /// Relayed chat line.
    Chat {
        /// Sender identity
        from: Identity,
        /// Message body
        text: String,
    },
    /// Error addressed to one connection.
    Error {
        /// Error code
        error: String,
    },
}

impl ServerEvent {
    /// The error frame sent to a client that exceeded its message budget.
    pub fn rate_limited() -> Self {
        Self::Error {
            error: "rate_limited".to_string(),
        }
    }

    /// Wire `type` tag of this event.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::OnlineList { .. } => "online_list",
            Self::UserJoined { .. } => "user_joined",
            Self::UserLeft { .. } => "user_left",
            Self::Typing { .. } => "typing",
            Self::Chat { .. } => "chat",
            Self::Error { .. } => "error",
        }
    }
}
