use serde::{Deserialize, Serialize};

use super::AnnouncementId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

/// School-wide announcement with the current user's read state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    pub id: AnnouncementId,
    pub title: String,
    pub body: String,
    pub created_at: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    #[serde(default, rename = "is_read")]
    read: bool,
}

impl Announcement {
    pub fn new(id: AnnouncementId, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            body: body.into(),
            created_at: String::new(),
            priority: Priority::default(),
            expires_at: None,
            read: false,
        }
    }

    /// Announcement that the user has already read
    pub fn read(mut self) -> Self {
        self.read = true;
        self
    }

    pub fn is_read(&self) -> bool {
        self.read
    }

    /// Mark as read. Returns true only for the call that flipped the flag.
    pub fn mark_read(&mut self) -> bool {
        !std::mem::replace(&mut self.read, true)
    }

    /// Whether the announcement expired before `now`. Timestamps that are
    /// not RFC 3339 never expire.
    pub fn is_expired(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        self.expires_at
            .as_deref()
            .and_then(|raw| chrono::DateTime::parse_from_rfc3339(raw).ok())
            .map(|expires| expires < now)
            .unwrap_or(false)
    }
}
