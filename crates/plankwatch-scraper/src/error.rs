use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("browser error: {0}")]
    Browser(#[from] chromiumoxide::error::CdpError),

    #[error("browser session error: {0}")]
    Session(String),

    #[error("blocked at {url} (status {status:?}, title {title:?})")]
    Blocked {
        url: String,
        status: Option<i64>,
        title: Option<String>,
    },

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("no catalog response captured for {context}")]
    MissingResponse { context: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ScrapeError {
    /// `true` when the error is the anti-bot block signature (HTTP 403/429 or
    /// a recognizably blocked page). Blocks back off on the slow schedule;
    /// everything else retries on the short one.
    #[must_use]
    pub fn is_blocked(&self) -> bool {
        matches!(self, ScrapeError::Blocked { .. })
    }
}
