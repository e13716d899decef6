pub mod announcement;
pub mod message;
pub mod thread;

pub use announcement::{Announcement, Priority};
pub use message::{Attachment, Message, Sender};
pub use thread::{compare_messages, is_thread_ordered};

/// Server-assigned user id
pub type UserId = u64;
/// Server-assigned conversation id
pub type ThreadId = u64;
/// Server-assigned message id
pub type MessageId = u64;
/// Server-assigned announcement id
pub type AnnouncementId = u64;
