use thiserror::Error;

#[derive(Error, Debug)]
pub enum RentalMetricsError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Row {row} rejected: {reason}")]
    RowRejected { row: usize, reason: String },

    #[error("Unknown property for sheet tab: {0}")]
    UnknownProperty(String),

    #[error("Failed to fetch spreadsheet data: {0}")]
    FetchFailed(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "sheets")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, RentalMetricsError>;
