use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors that can occur while analysing an image or configuring the analysis.
///
/// An image where every pixel was excluded is not an error; it produces a report whose dominant outcome is
/// [`crate::Dominant::NoData`].
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The pixel buffer is empty or doesn't match the given dimensions
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// A threshold configuration is out of range or leaves a gap in the hue partition
    #[error("invalid thresholds: {reason}")]
    InvalidThresholds { reason: String },

    /// No palette entry matches the given id or key
    #[error("unknown palette entry: {0}")]
    UnknownPaletteEntry(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "serde")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The analysis was cancelled before it finished
    #[error("analysis was cancelled")]
    Cancelled,

    /// The background analysis task panicked or was aborted
    #[error("analysis task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl AnalysisError {
    pub(crate) fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput { reason: reason.into() }
    }

    pub(crate) fn invalid_thresholds(reason: impl Into<String>) -> Self {
        Self::InvalidThresholds { reason: reason.into() }
    }
}
