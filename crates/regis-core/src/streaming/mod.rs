//! Live updates for the active thread.
//!
//! `LiveReceiver` holds the connection state machine and the message list;
//! `LiveChannel` drives it over a `PushTransport` on a spawned task.

mod channel;
mod receiver;
mod socket_client;
mod types;

use async_trait::async_trait;

use crate::error::ChannelError;

pub use channel::{LiveChannel, LiveChannelHandle};
pub use receiver::{ConnectionState, FrameOutcome, LiveReceiver, ReconnectPolicy, RecoveryFetch};
pub use socket_client::WebSocketTransport;
pub use types::PushEvent;

/// A connection that delivers text frames from the server
#[async_trait]
pub trait PushTransport: Send {
    async fn connect(&mut self, url: &str) -> Result<(), ChannelError>;

    /// Next text frame, or None once the connection is gone
    async fn next_frame(&mut self) -> Option<String>;

    async fn close(&mut self);
}
