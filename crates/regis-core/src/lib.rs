pub mod alerts;
pub mod announcements;
pub mod api;
pub mod compose;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod format;
pub mod models;
pub mod notify;
pub mod streaming;
pub mod tracing_setup;
pub mod view;

// Re-export the types a host needs to mount the messaging view
pub use announcements::{AnnouncementBoard, AnnouncementCard, ReadOutcome, ReadReconciler};
pub use api::{HttpMessagingApi, MessagingApi};
pub use compose::{ComposeForm, OutboundSubmitter, SubmitOutcome};
pub use config::{Capabilities, ChannelContext, CoreConfig};
pub use error::{ApiError, ChannelError};
pub use events::{ChannelEvent, ViewEvent};
pub use format::format_size;
pub use notify::{NotificationBackend, NotificationPresenter, NotifyOutcome, Permission};
pub use streaming::{
    ConnectionState, LiveChannel, LiveChannelHandle, LiveReceiver, PushTransport, ReconnectPolicy,
    WebSocketTransport,
};
