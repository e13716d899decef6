//! Display model of the active thread.
//!
//! `MessageList` plays the role of the page's message container:
//! it holds rendered messages in arrival order and a viewport. Every path
//! that adds messages calls `on_message_appended`, which is the single place
//! the viewport gets pinned to the bottom.

use std::collections::HashSet;
use std::fmt;

use crate::format::format_size;
use crate::models::{Message, MessageId, UserId};

/// Whether a message was written by the current user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Sent,
    Received,
}

impl Direction {
    pub fn style_class(&self) -> &'static str {
        match self {
            Direction::Sent => "message-sent",
            Direction::Received => "message-received",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedAttachment {
    pub filename: String,
    pub size_label: String,
    pub url: String,
}

/// A message as it appears in the list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub id: Option<MessageId>,
    pub direction: Direction,
    pub sender_name: String,
    pub sent_at: String,
    pub body: String,
    pub attachments: Vec<RenderedAttachment>,
}

impl RenderedMessage {
    pub fn render(message: &Message, current_user_id: UserId) -> Self {
        let direction = if message.sender().id == current_user_id {
            Direction::Sent
        } else {
            Direction::Received
        };

        let attachments = message
            .attachments
            .iter()
            .map(|att| RenderedAttachment {
                filename: att.filename.clone(),
                size_label: format_size(att.file_size),
                url: att.url.clone(),
            })
            .collect();

        Self {
            id: message.id(),
            direction,
            sender_name: message.sender().name.clone(),
            sent_at: message.sent_at.clone(),
            body: message.body.clone(),
            attachments,
        }
    }

    pub fn is_own(&self) -> bool {
        self.direction == Direction::Sent
    }
}

impl fmt::Display for RenderedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.is_own() { " (you)" } else { "" };
        writeln!(f, "[{}] {}{}", self.sent_at, self.sender_name, marker)?;
        write!(f, "  {}", self.body)?;
        if !self.attachments.is_empty() {
            write!(f, "\n  Attachments:")?;
            for att in &self.attachments {
                write!(f, "\n    📎 {} ({}) {}", att.filename, att.size_label, att.url)?;
            }
        }
        Ok(())
    }
}

/// Scroll state of the message list, measured in messages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    /// Index of the first message below the visible area
    pub scroll_offset: usize,
}

/// Ordered messages of the active thread
#[derive(Debug, Clone)]
pub struct MessageList {
    current_user_id: UserId,
    items: Vec<RenderedMessage>,
    seen_ids: HashSet<MessageId>,
    viewport: Viewport,
}

impl MessageList {
    pub fn new(current_user_id: UserId) -> Self {
        Self {
            current_user_id,
            items: Vec::new(),
            seen_ids: HashSet::new(),
            viewport: Viewport::default(),
        }
    }

    // ===== Getters =====

    pub fn items(&self) -> &[RenderedMessage] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: MessageId) -> bool {
        self.seen_ids.contains(&id)
    }

    /// Highest id currently displayed, used as the resume cursor
    pub fn last_seen_id(&self) -> Option<MessageId> {
        self.seen_ids.iter().copied().max()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn is_scrolled_to_bottom(&self) -> bool {
        self.viewport.scroll_offset == self.items.len()
    }

    // ===== Mutations =====

    /// Append at the end in arrival order. Messages whose id is already
    /// displayed are dropped and None is returned.
    pub fn append(&mut self, message: &Message) -> Option<RenderedMessage> {
        let rendered = self.push_rendered(message)?;
        self.on_message_appended();
        Some(rendered)
    }

    /// Append a batch in the order given, skipping displayed ids
    pub fn merge(&mut self, messages: &[Message]) -> Vec<RenderedMessage> {
        let added: Vec<_> = messages
            .iter()
            .filter_map(|m| self.push_rendered(m))
            .collect();
        if !added.is_empty() {
            self.on_message_appended();
        }
        added
    }

    /// Replace the whole list with a fresh server copy
    pub fn replace_all(&mut self, messages: &[Message]) -> Vec<RenderedMessage> {
        self.items.clear();
        self.seen_ids.clear();
        for message in messages {
            self.push_rendered(message);
        }
        self.on_message_appended();
        self.items.clone()
    }

    /// Manual scroll by the user, clamped to the list
    pub fn scroll_to(&mut self, offset: usize) {
        self.viewport.scroll_offset = offset.min(self.items.len());
    }

    /// Pin the viewport to the newest message
    pub fn on_message_appended(&mut self) {
        self.viewport.scroll_offset = self.items.len();
    }

    fn push_rendered(&mut self, message: &Message) -> Option<RenderedMessage> {
        if let Some(id) = message.id() {
            if !self.seen_ids.insert(id) {
                return None;
            }
        }
        let rendered = RenderedMessage::render(message, self.current_user_id);
        self.items.push(rendered.clone());
        Some(rendered)
    }
}
