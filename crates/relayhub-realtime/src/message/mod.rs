//! WebSocket message protocol.

pub mod types;
pub mod validator;

pub use types::{InboundMessage, ServerEvent};
pub use validator::{InboundError, parse_inbound};
