//! Runtime messages exchanged with the coordinator

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Inbound message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    /// Flip the pipeline on or off
    Toggle,
    /// Report the current state without changing it
    State,
}

/// Reply to a [`Message`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Whether the pipeline is enabled after handling the message
    pub enabled: bool,
}

/// Parse a JSON message; unknown or malformed input yields `None`
pub fn parse_message(json: &str) -> Option<Message> {
    match serde_json::from_str(json) {
        Ok(message) => Some(message),
        Err(e) => {
            debug!("Ignoring message: {}", e);
            None
        }
    }
}
