use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BASE_URL, MAX_RECONNECT_DELAY, RECONNECT_DELAY, SEND_MESSAGE_PATH};
use crate::error::ConfigError;
use crate::models::{ThreadId, UserId};
use crate::notify::Permission;
use crate::streaming::ReconnectPolicy;

/// Client configuration, loaded from a camelCase JSON file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreConfig {
    /// Backend origin, e.g. `https://school.example`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Push channel URL; the live channel is disabled without it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub socket_url: Option<String>,

    /// Id of the signed-in user, used to attribute sent/received messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_user_id: Option<UserId>,

    /// Anti-forgery token; scraped from the server when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csrf_token: Option<String>,

    /// Raw `Cookie` header value carrying the session
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_cookie: Option<String>,

    /// Send endpoint template with a `{thread_id}` placeholder
    #[serde(default = "default_send_path")]
    pub send_path: String,

    /// Notification permission as last decided by the user
    #[serde(default)]
    pub notification_permission: Permission,

    #[serde(default)]
    pub reconnect: ReconnectMode,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_send_path() -> String {
    SEND_MESSAGE_PATH.to_string()
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            socket_url: None,
            current_user_id: None,
            csrf_token: None,
            session_cookie: None,
            send_path: default_send_path(),
            notification_permission: Permission::default(),
            reconnect: ReconnectMode::default(),
        }
    }
}

impl CoreConfig {
    /// Load config from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Identity context for a live channel bound to `thread_id`.
    /// None when either the socket URL or the current user is unknown.
    pub fn channel_context(&self, thread_id: ThreadId) -> Option<ChannelContext> {
        Some(ChannelContext {
            thread_id,
            current_user_id: self.current_user_id?,
            socket_url: self.socket_url.clone()?,
        })
    }
}

/// How the live channel recovers after the push connection drops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconnectMode {
    /// Wait five seconds, re-fetch the whole thread, reconnect
    #[default]
    Reload,
    /// Reconnect with backoff and merge messages missed since the last seen id
    Resume,
}

impl ReconnectMode {
    pub fn policy(self) -> ReconnectPolicy {
        match self {
            ReconnectMode::Reload => ReconnectPolicy::FullReload {
                delay: RECONNECT_DELAY,
            },
            ReconnectMode::Resume => ReconnectPolicy::Resume {
                base: RECONNECT_DELAY,
                max: MAX_RECONNECT_DELAY,
            },
        }
    }
}

/// Explicit identity context for a mounted messaging view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelContext {
    pub thread_id: ThreadId,
    pub current_user_id: UserId,
    pub socket_url: String,
}

/// Feature flags resolved once at startup and injected into components
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub push_channel: bool,
    pub notifications: bool,
}

impl Capabilities {
    /// `notifications_available` reports whether the host has any way of
    /// surfacing OS-level notifications at all.
    pub fn resolve(config: &CoreConfig, notifications_available: bool) -> Self {
        let push_channel = config
            .socket_url
            .as_deref()
            .and_then(|raw| url::Url::parse(raw).ok())
            .map(|url| matches!(url.scheme(), "ws" | "wss"))
            .unwrap_or(false);

        Self {
            push_channel,
            notifications: notifications_available,
        }
    }
}

/// Upper bound for one backoff step, exposed for hosts that display it
pub fn backoff_delay(base: Duration, max: Duration, attempt: u32) -> Duration {
    base.saturating_mul(1 << attempt.min(6)).min(max)
}
