use thiserror::Error;

/// Errors returned by a [`WeatherClient`](crate::WeatherClient).
#[derive(Debug, Error)]
pub enum WeatherError {
    /// Missing or unusable client configuration (API key, HTTP client setup).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The request could not be built (coordinate out of range, malformed URL).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Transport failure, including timeouts.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("Weather API request failed with status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Weather API returned an empty response")]
    EmptyResponse,

    /// The body did not match the expected schema.
    #[error("Failed to decode weather response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl WeatherError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }
}

/// Errors returned by the forecast history store.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// The forecast cannot be stored as given (non-finite reading, unstorable time).
    #[error("Invalid forecast: {0}")]
    InvalidRecord(String),

    /// The storage engine reported a read or write failure.
    #[error("Persistence error: {0}")]
    Persistence(#[from] rusqlite::Error),

    /// The database directory could not be created.
    #[error("Failed to prepare history location: {0}")]
    Io(#[from] std::io::Error),

    /// The blocking storage task panicked or was cancelled.
    #[error("History storage task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl HistoryError {
    pub fn invalid_record(message: impl Into<String>) -> Self {
        Self::InvalidRecord(message.into())
    }
}
