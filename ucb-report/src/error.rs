use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("report io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv encoding failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("json encoding failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("pdf encoding failed: {0}")]
    Pdf(String),
}
