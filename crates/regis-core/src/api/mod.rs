//! REST backend seam.
//!
//! Components talk to the server only through `MessagingApi`, so tests and
//! alternative transports can stand in for `HttpMessagingApi`.

mod http;
#[cfg(test)]
pub(crate) mod testing;

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::constants::STATUS_SUCCESS;
use crate::error::ApiError;
use crate::models::{AnnouncementId, Message, MessageId, ThreadId};

pub use http::{extract_csrf_token, HttpMessagingApi};

/// JSON envelope returned by state-changing endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiStatus {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiStatus {
    pub fn success() -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}

/// A file selected in the compose form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub mime: Option<String>,
}

impl FileUpload {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
            mime: None,
        }
    }

    pub async fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ApiError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "attachment".to_string());
        Ok(Self::new(filename, bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Serialized compose form, ready to be posted as one multipart request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendMessageRequest {
    pub thread_id: ThreadId,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub files: Vec<FileUpload>,
}

#[async_trait]
pub trait MessagingApi: Send + Sync {
    /// POST the compose form to the send endpoint
    async fn send_message(&self, request: &SendMessageRequest) -> Result<ApiStatus, ApiError>;

    /// POST a read receipt. Idempotent on the server: repeating it for the
    /// same announcement succeeds without double-counting.
    async fn mark_announcement_read(
        &self,
        id: AnnouncementId,
        csrf_token: &str,
    ) -> Result<ApiStatus, ApiError>;

    /// Messages of a thread in server order, optionally only those after
    /// the given id
    async fn fetch_thread_messages(
        &self,
        thread_id: ThreadId,
        after: Option<MessageId>,
    ) -> Result<Vec<Message>, ApiError>;
}
