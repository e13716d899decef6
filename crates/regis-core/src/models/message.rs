use serde::{Deserialize, Serialize};

use super::{MessageId, ThreadId, UserId};

/// Author of a message as delivered by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    pub id: UserId,
    pub name: String,
}

/// File attached to a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub filename: String,
    pub file_size: u64,
    pub url: String,
}

/// A message in a thread.
///
/// Identity and sender never change after construction. The read flag is
/// the only mutable field and only ever goes from unread to read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// None on push payloads from backends that do not send ids
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<MessageId>,
    sender: Sender,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub body: String,
    /// Creation timestamp exactly as the server formatted it
    pub sent_at: String,
    #[serde(default, rename = "is_read")]
    read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<ThreadId>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl Message {
    pub fn new(
        id: Option<MessageId>,
        sender: Sender,
        body: impl Into<String>,
        sent_at: impl Into<String>,
    ) -> Self {
        Self {
            id,
            sender,
            recipient: None,
            subject: None,
            body: body.into(),
            sent_at: sent_at.into(),
            read: false,
            thread_id: None,
            attachments: Vec::new(),
        }
    }

    pub fn with_thread(mut self, thread_id: ThreadId) -> Self {
        self.thread_id = Some(thread_id);
        self
    }

    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = attachments;
        self
    }

    pub fn id(&self) -> Option<MessageId> {
        self.id
    }

    pub fn sender(&self) -> &Sender {
        &self.sender
    }

    pub fn is_read(&self) -> bool {
        self.read
    }

    /// Mark as read. Returns true only for the call that flipped the flag.
    pub fn mark_read(&mut self) -> bool {
        !std::mem::replace(&mut self.read, true)
    }

    /// Parsed creation time, when the server used RFC 3339
    pub fn created_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::parse_from_rfc3339(&self.sent_at)
            .ok()
            .map(|dt| dt.with_timezone(&chrono::Utc))
    }
}
