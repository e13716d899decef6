use reqwest::StatusCode;

/// Failure of a single REST round trip.
///
/// Every variant is terminal at the component boundary: the submitter and
/// the reconciler turn it into a user-visible alert and never retry.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server responded with {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Failed to read attachment: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Failure to open or keep the push channel.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Push channel unavailable: {0}")]
    Unavailable(String),
}

/// Failure reported by a notification backend. Presenters swallow it.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Notification backend failed: {0}")]
    Backend(String),

    #[error("Notification I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure to load configuration from disk.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
