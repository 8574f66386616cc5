use thiserror::Error;

/// Failure of a single geocoding or forecast request
#[derive(Error, Debug)]
pub enum FetchError {
    /// Connection, DNS, TLS or timeout failure
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-success status
    #[error("API returned HTTP {status}: {reason}")]
    Status { status: u16, reason: String },

    /// The body was not the JSON shape we expect
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl FetchError {
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::Transport(_))
    }
}
