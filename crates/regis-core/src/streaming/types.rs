use serde::{Deserialize, Serialize};

use crate::models::{Message, ThreadId};

/// Frame pushed by the server on the live channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PushEvent {
    NewMessage {
        #[serde(default)]
        thread_id: Option<ThreadId>,
        message: Message,
    },
    NewAnnouncement {
        title: String,
        #[serde(default)]
        body: Option<String>,
    },
    /// Any type this client does not know about
    #[serde(other)]
    Unknown,
}

impl PushEvent {
    /// Decode a text frame. Undecodable frames yield None.
    pub fn parse(text: &str) -> Option<Self> {
        match serde_json::from_str(text) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::debug!("Failed to parse push frame: {} - frame: {}", e, text);
                None
            }
        }
    }
}
