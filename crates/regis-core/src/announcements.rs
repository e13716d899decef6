//! Announcement cards and read-state reconciliation with the server.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use crate::alerts::Alert;
use crate::api::MessagingApi;
use crate::constants::MARK_READ_FAILED_ALERT;
use crate::events::ViewEvent;
use crate::models::{Announcement, AnnouncementId};

/// Display state of one announcement.
///
/// Unread cards carry a mark-read affordance, an unread badge and a
/// highlight. Each is removed independently and removal of an absent
/// element is a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnouncementCard {
    announcement: Announcement,
    mark_read_button: bool,
    unread_badge: bool,
    highlighted: bool,
}

impl AnnouncementCard {
    pub fn new(announcement: Announcement) -> Self {
        let unread = !announcement.is_read();
        Self {
            announcement,
            mark_read_button: unread,
            unread_badge: unread,
            highlighted: unread,
        }
    }

    // ===== Getters =====

    pub fn id(&self) -> AnnouncementId {
        self.announcement.id
    }

    pub fn announcement(&self) -> &Announcement {
        &self.announcement
    }

    pub fn has_mark_read_button(&self) -> bool {
        self.mark_read_button
    }

    pub fn has_unread_badge(&self) -> bool {
        self.unread_badge
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    pub fn is_unread(&self) -> bool {
        !self.announcement.is_read()
    }

    // ===== Edits =====

    pub fn remove_mark_read_button(&mut self) -> bool {
        std::mem::replace(&mut self.mark_read_button, false)
    }

    pub fn remove_unread_badge(&mut self) -> bool {
        std::mem::replace(&mut self.unread_badge, false)
    }

    pub fn remove_highlight(&mut self) -> bool {
        std::mem::replace(&mut self.highlighted, false)
    }

    fn apply_read(&mut self) -> CardEdits {
        self.announcement.mark_read();
        CardEdits {
            button_removed: self.remove_mark_read_button(),
            badge_removed: self.remove_unread_badge(),
            highlight_removed: self.remove_highlight(),
        }
    }
}

/// Which card edits actually changed something
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CardEdits {
    pub button_removed: bool,
    pub badge_removed: bool,
    pub highlight_removed: bool,
}

impl CardEdits {
    pub fn is_noop(&self) -> bool {
        !(self.button_removed || self.badge_removed || self.highlight_removed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    Marked(CardEdits),
    /// The request failed; an alert was raised and the card left as it was
    Failed,
}

/// Sends read receipts and applies their result to cards
pub struct ReadReconciler {
    api: Arc<dyn MessagingApi>,
    csrf_token: String,
    events: mpsc::UnboundedSender<ViewEvent>,
}

impl ReadReconciler {
    pub fn new(
        api: Arc<dyn MessagingApi>,
        csrf_token: impl Into<String>,
        events: mpsc::UnboundedSender<ViewEvent>,
    ) -> Self {
        Self {
            api,
            csrf_token: csrf_token.into(),
            events,
        }
    }

    pub async fn mark_read(&self, card: &mut AnnouncementCard) -> ReadOutcome {
        let id = card.id();
        let failure = match self.api.mark_announcement_read(id, &self.csrf_token).await {
            Ok(status) if status.is_success() => {
                let edits = card.apply_read();
                tracing::debug!(id, ?edits, "announcement marked read");
                return ReadOutcome::Marked(edits);
            }
            Ok(status) => format!("server answered {}", status.status),
            Err(e) => e.to_string(),
        };

        tracing::warn!("Failed to mark announcement {} as read: {}", id, failure);
        let _ = self
            .events
            .send(ViewEvent::Alert(Alert::error(MARK_READ_FAILED_ALERT)));
        ReadOutcome::Failed
    }
}

/// Cards of the announcements page in server order
#[derive(Debug, Clone, Default)]
pub struct AnnouncementBoard {
    cards: Vec<AnnouncementCard>,
}

impl AnnouncementBoard {
    pub fn new(announcements: impl IntoIterator<Item = Announcement>) -> Self {
        Self {
            cards: announcements.into_iter().map(AnnouncementCard::new).collect(),
        }
    }

    pub fn cards(&self) -> &[AnnouncementCard] {
        &self.cards
    }

    pub fn card(&self, id: AnnouncementId) -> Option<&AnnouncementCard> {
        self.cards.iter().find(|c| c.id() == id)
    }

    pub fn unread_count(&self) -> usize {
        self.cards.iter().filter(|c| c.is_unread()).count()
    }

    /// Cards that have not expired at `now`
    pub fn visible(&self, now: DateTime<Utc>) -> impl Iterator<Item = &AnnouncementCard> {
        self.cards
            .iter()
            .filter(move |c| !c.announcement().is_expired(now))
    }

    /// Returns None when no card has this id
    pub async fn mark_read(
        &mut self,
        reconciler: &ReadReconciler,
        id: AnnouncementId,
    ) -> Option<ReadOutcome> {
        let card = self.cards.iter_mut().find(|c| c.id() == id)?;
        Some(reconciler.mark_read(card).await)
    }
}
