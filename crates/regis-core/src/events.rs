use std::time::Duration;

use crate::alerts::Alert;
use crate::streaming::ConnectionState;
use crate::view::RenderedMessage;

/// Requests from the submitter and the reconciler to their host view
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    /// The displayed message list must be re-fetched from the server.
    /// Hosts forward this to `LiveChannelHandle::reload`.
    ReloadMessages,
    Alert(Alert),
}

/// Everything a mounted live channel reports to its renderer, in the order
/// it happened
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    StateChanged(ConnectionState),
    /// A pushed message was appended at the bottom of the list
    MessageAppended(RenderedMessage),
    /// The whole list was replaced by a server reload
    MessagesReloaded(Vec<RenderedMessage>),
    /// Messages missed while disconnected, appended after a resume
    MessagesMerged(Vec<RenderedMessage>),
    /// The connection dropped; recovery starts after this delay
    ReconnectScheduled(Duration),
    /// An announcement arrived and was handed to the notification presenter
    Announcement { title: String },
    /// A thread fetch failed; the displayed list was left as it was
    Alert(Alert),
}
