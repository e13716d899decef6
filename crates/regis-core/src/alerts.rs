// User-visible feedback for failed actions.
// Components never surface errors any other way; hosts drain alerts from
// `ViewEvent::Alert` or `ChannelEvent::Alert` into an `AlertQueue` and
// render the current one.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Severity of an alert (higher = more important)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AlertLevel {
    Warning,
    Error,
}

impl AlertLevel {
    pub fn icon(&self) -> &'static str {
        match self {
            AlertLevel::Warning => "⚠",
            AlertLevel::Error => "✗",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub message: String,
    pub level: AlertLevel,
}

impl Alert {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: AlertLevel::Warning,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: AlertLevel::Error,
        }
    }
}

/// Alerts waiting to be shown, highest level first.
/// An identical message pushed again within two seconds is dropped.
#[derive(Debug, Default)]
pub struct AlertQueue {
    queue: VecDeque<Alert>,
    current: Option<Alert>,
    recent: Vec<(String, Instant)>,
}

impl AlertQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, alert: Alert) {
        let now = Instant::now();
        self.recent.retain(|(_, expiry)| *expiry > now);
        if self.recent.iter().any(|(message, _)| *message == alert.message) {
            return;
        }
        self.recent
            .push((alert.message.clone(), now + Duration::from_secs(2)));

        match self.current.take() {
            None => self.current = Some(alert),
            Some(current) if alert.level > current.level => {
                self.queue.push_front(current);
                self.current = Some(alert);
            }
            Some(current) => {
                self.current = Some(current);
                let pos = self
                    .queue
                    .iter()
                    .position(|queued| queued.level < alert.level)
                    .unwrap_or(self.queue.len());
                self.queue.insert(pos, alert);
            }
        }
    }

    pub fn current(&self) -> Option<&Alert> {
        self.current.as_ref()
    }

    pub fn dismiss(&mut self) {
        self.current = self.queue.pop_front();
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none() && self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len() + usize::from(self.current.is_some())
    }
}
