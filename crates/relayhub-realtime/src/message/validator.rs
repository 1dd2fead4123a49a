//! Inbound frame validation.

use thiserror::Error;

use super::types::InboundMessage;

/// Why an inbound frame was dropped.
#[derive(Debug, Error)]
pub enum InboundError {
    /// Frame is larger than the configured limit.
    #[error("frame of {size} bytes exceeds limit of {limit} bytes")]
    Oversized {
        /// Frame size in bytes
        size: usize,
        /// Configured limit
        limit: usize,
    },
    /// Frame is not a JSON object with a usable `type`.
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Check the size of a text frame, then decode it.
pub fn parse_inbound(raw: &str, max_bytes: usize) -> Result<InboundMessage, InboundError> {
    if raw.len() > max_bytes {
        return Err(InboundError::Oversized {
            size: raw.len(),
            limit: max_bytes,
        });
    }
    Ok(serde_json::from_str(raw)?)
}
