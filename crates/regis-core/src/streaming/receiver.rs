//! Connection state machine of the live channel, free of any I/O.
//!
//! The driver in `channel.rs` feeds it socket events and the current time
//! and performs whatever the returned values ask for.

use std::time::Duration;

use tokio::time::Instant;

use super::types::PushEvent;
use crate::config::{backoff_delay, ChannelContext};
use crate::constants::RECONNECT_DELAY;
use crate::models::{Message, MessageId, ThreadId};
use crate::view::{MessageList, RenderedMessage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
    Reconnecting,
}

/// What the channel does after the push connection drops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectPolicy {
    /// Wait `delay`, re-fetch the whole thread, then reconnect
    FullReload { delay: Duration },
    /// Reconnect with exponential backoff, then fetch and merge only the
    /// messages after the last one displayed
    Resume { base: Duration, max: Duration },
}

impl ReconnectPolicy {
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match *self {
            ReconnectPolicy::FullReload { delay } => delay,
            ReconnectPolicy::Resume { base, max } => backoff_delay(base, max, attempt),
        }
    }

    pub fn resumes(&self) -> bool {
        matches!(self, ReconnectPolicy::Resume { .. })
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        ReconnectPolicy::FullReload {
            delay: RECONNECT_DELAY,
        }
    }
}

/// Result of feeding one inbound frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    Appended(RenderedMessage),
    /// The message id is already displayed
    Duplicate(MessageId),
    /// A message for a thread other than the active one
    OtherThread(Option<ThreadId>),
    Announcement { title: String, body: Option<String> },
    /// Unknown type or undecodable frame
    Ignored,
}

/// Fetch the driver must run when recovering from a drop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoveryFetch {
    pub after: Option<MessageId>,
    /// Replace the list with the result instead of merging it
    pub replace: bool,
}

#[derive(Debug)]
pub struct LiveReceiver {
    context: ChannelContext,
    policy: ReconnectPolicy,
    state: ConnectionState,
    list: MessageList,
    reconnect_at: Option<Instant>,
    attempts: u32,
}

impl LiveReceiver {
    pub fn new(context: ChannelContext, policy: ReconnectPolicy) -> Self {
        let list = MessageList::new(context.current_user_id);
        Self {
            context,
            policy,
            state: ConnectionState::Disconnected,
            list,
            reconnect_at: None,
            attempts: 0,
        }
    }

    // ===== Getters =====

    pub fn context(&self) -> &ChannelContext {
        &self.context
    }

    pub fn policy(&self) -> ReconnectPolicy {
        self.policy
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn list(&self) -> &MessageList {
        &self.list
    }

    pub fn last_seen_id(&self) -> Option<MessageId> {
        self.list.last_seen_id()
    }

    /// Failed connection attempts since the last successful open
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn reconnect_deadline(&self) -> Option<Instant> {
        self.reconnect_at
    }

    // ===== Transitions =====

    pub fn on_open(&mut self) {
        self.state = ConnectionState::Connected;
        self.reconnect_at = None;
        self.attempts = 0;
    }

    pub fn on_frame(&mut self, text: &str) -> FrameOutcome {
        match PushEvent::parse(text) {
            Some(PushEvent::NewMessage { thread_id, message }) => {
                if thread_id != Some(self.context.thread_id) {
                    return FrameOutcome::OtherThread(thread_id);
                }
                match self.list.append(&message) {
                    Some(rendered) => FrameOutcome::Appended(rendered),
                    None => FrameOutcome::Duplicate(message.id().unwrap_or_default()),
                }
            }
            Some(PushEvent::NewAnnouncement { title, body }) => {
                FrameOutcome::Announcement { title, body }
            }
            Some(PushEvent::Unknown) | None => FrameOutcome::Ignored,
        }
    }

    /// Connection closed or failed to open. Arms the reconnect timer and
    /// returns its delay, or None when a reconnect is already pending.
    pub fn on_close(&mut self, now: Instant) -> Option<Duration> {
        self.state = ConnectionState::Disconnected;
        if self.reconnect_at.is_some() {
            return None;
        }
        let delay = self.policy.delay_for(self.attempts);
        self.reconnect_at = Some(now + delay);
        Some(delay)
    }

    /// True once when the reconnect timer has expired at `now`
    pub fn take_due_reconnect(&mut self, now: Instant) -> bool {
        match self.reconnect_at {
            Some(at) if at <= now => {
                self.reconnect_at = None;
                self.state = ConnectionState::Reconnecting;
                self.attempts = self.attempts.saturating_add(1);
                true
            }
            _ => false,
        }
    }

    pub fn recovery_fetch(&self) -> RecoveryFetch {
        if self.policy.resumes() {
            RecoveryFetch {
                after: self.last_seen_id(),
                replace: false,
            }
        } else {
            RecoveryFetch {
                after: None,
                replace: true,
            }
        }
    }

    /// Replace the list with a full server copy
    pub fn apply_reload(&mut self, messages: &[Message]) -> Vec<RenderedMessage> {
        self.list.replace_all(messages)
    }

    /// Append messages missed while disconnected
    pub fn apply_merge(&mut self, messages: &[Message]) -> Vec<RenderedMessage> {
        self.list.merge(messages)
    }
}
