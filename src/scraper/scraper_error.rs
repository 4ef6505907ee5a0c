use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrowseError {
    #[error("Navigation error: {0}")]
    Navigation(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("No page loaded")]
    NoPage,

    /// The browsing session itself is unusable; the run cannot continue.
    #[error("Browser session failed: {0}")]
    Session(String),

    #[error("Navigation cancelled")]
    Cancelled,
}

impl BrowseError {
    /// Session failures and cancellation end the run; everything else is skipped over.
    pub fn is_fatal(&self) -> bool {
        matches!(self, BrowseError::Session(_) | BrowseError::Cancelled)
    }
}

impl From<reqwest::Error> for BrowseError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BrowseError::Timeout(err.to_string())
        } else {
            BrowseError::Navigation(err.to_string())
        }
    }
}
