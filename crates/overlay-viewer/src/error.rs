use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ViewerError {
    #[error("Fetch failed: {0}")]
    FetchFailed(String),

    #[error("Failed to load document: {0}")]
    DecodeFailed(String),

    #[error("Render failed: {0}")]
    RenderFailed(String),

    #[error("Render cancelled")]
    RenderCancelled,

    #[error("Page out of range")]
    PageOutOfRange,

    #[error("Projection unavailable for page {0}")]
    ProjectionUnavailable(usize),

    #[error("Navigation target not found")]
    NavigationMiss,
}

impl ViewerError {
    /// Only fetch and decode failures reach the user; the rest represent
    /// normal races (stale render, unrendered page, missing sentence) and
    /// are swallowed by the caller.
    pub fn is_user_visible(&self) -> bool {
        matches!(self, Self::FetchFailed(_) | Self::DecodeFailed(_))
    }
}

pub type Result<T> = std::result::Result<T, ViewerError>;
