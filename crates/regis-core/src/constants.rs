//! Application-wide constants
//!
//! Endpoint paths, header names and user-facing strings shared by the
//! submitter, the reconciler and the live channel.

use std::time::Duration;

/// Default backend base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Send endpoint template; `{thread_id}` is substituted per request
pub const SEND_MESSAGE_PATH: &str = "/messaging/thread/{thread_id}/send/";

/// Thread messages endpoint template used by reload and resume
pub const THREAD_MESSAGES_PATH: &str = "/messaging/thread/{thread_id}/messages/";

/// Announcement read-receipt endpoint template
pub const ANNOUNCEMENT_READ_PATH: &str = "/messaging/announcements/{id}/read/";

/// Page scraped for the anti-forgery token when none is configured
pub const ANNOUNCEMENTS_PAGE_PATH: &str = "/messaging/announcements/";

/// Delay between a push-channel close and the full reload
pub const RECONNECT_DELAY: Duration = Duration::from_millis(5000);

/// Cap for the resume policy's exponential backoff
pub const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(60);

/// How long `LiveChannelHandle::stop` waits for the push connection to close
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

// Request headers
pub mod headers {
    /// Marks a request as programmatic rather than a navigation
    pub const REQUESTED_WITH: &str = "X-Requested-With";
    pub const REQUESTED_WITH_VALUE: &str = "XMLHttpRequest";
    /// Anti-forgery token header
    pub const CSRF_TOKEN: &str = "X-CSRFToken";
}

// Multipart field names of the compose form
pub mod fields {
    pub const RECIPIENT: &str = "recipient";
    pub const SUBJECT: &str = "subject";
    pub const BODY: &str = "body";
    pub const ATTACHMENTS: &str = "attachments";
    /// Hidden input carrying the anti-forgery token in server pages
    pub const CSRF_INPUT: &str = "csrfmiddlewaretoken";
}

// User-facing strings
pub const SENDING_LABEL: &str = "Sending...";
pub const DEFAULT_SUBMIT_LABEL: &str = "Send";
pub const SEND_FAILED_ALERT: &str = "Failed to send message. Please try again.";
pub const MARK_READ_FAILED_ALERT: &str = "Failed to mark announcement as read. Please try again.";
pub const LOAD_FAILED_ALERT: &str = "Failed to load messages. Please try again.";
pub const NEW_ANNOUNCEMENT_TITLE: &str = "New Announcement";

/// Status value the backend returns for a successful request
pub const STATUS_SUCCESS: &str = "success";
