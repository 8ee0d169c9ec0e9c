use crate::detect::DetectTypeError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    DetectType(#[from] DetectTypeError),

    #[error("Unsupported series type: {series_type}")]
    UnsupportedSeries { series_type: String },

    #[error("Invalid funnel document: {message}")]
    InvalidDocument { message: String },

    #[error("Document JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
