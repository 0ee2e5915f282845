use std::path::PathBuf;
use thiserror::Error;

/// Fatal problems with the sales file. Nothing here is coerced or skipped.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to open sales file '{0}'")]
    Open(PathBuf, #[source] std::io::Error),

    #[error("Failed to read sales CSV")]
    Csv(#[from] csv::Error),

    #[error("Sales file is missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("Line {line}: column '{column}' has a missing value")]
    MissingValue { line: u64, column: &'static str },

    #[error("Line {line}: invalid {column} value '{value}'")]
    InvalidValue {
        line: u64,
        column: &'static str,
        value: String,
    },

    #[error("Line {line}: unparseable order_date '{value}'")]
    InvalidDate { line: u64, value: String },
}

/// Failures talking to the customer directory service.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Network request to customer directory {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Customer directory {url} answered with status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Failed to decode customer list from {url}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Weather lookup failures.
///
/// Transport errors and non-200 statuses are absorbed by the enrichment engine.
/// A 200 response without the expected fields is malformed input and aborts the run.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Weather request failed")]
    Request(#[from] reqwest::Error),

    #[error("Weather service answered with status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Failed to decode weather response")]
    Decode(#[from] serde_json::Error),

    #[error("Weather response for {location} has an empty conditions list")]
    MissingConditions { location: String },
}

impl WeatherError {
    /// Whether the sale can be kept with empty weather fields.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, WeatherError::Request(_) | WeatherError::Status { .. })
    }
}
