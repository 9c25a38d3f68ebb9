use thiserror::Error;

/// Failures that reach the user as an error banner.
#[derive(Debug, Error)]
pub enum InsightError {
    /// Malformed or empty JSON pasted or loaded from a file
    #[error("{0}")]
    Input(String),

    /// Transport failure, non-2xx status, or an `error` field in a server reply
    #[error("{0}")]
    Network(String),

    /// Insights missing, not a sequence, or empty
    #[error("{0}")]
    DataShape(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Clipboard unavailable: {0}")]
    Clipboard(String),
}

impl InsightError {
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input(message.into())
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn data_shape(message: impl Into<String>) -> Self {
        Self::DataShape(message.into())
    }
}

impl From<reqwest::Error> for InsightError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

impl From<csv::Error> for InsightError {
    fn from(err: csv::Error) -> Self {
        match err.into_kind() {
            csv::ErrorKind::Io(io) => Self::Io(io),
            other => Self::Io(std::io::Error::other(format!("{other:?}"))),
        }
    }
}
