use thiserror::Error;

/// A convenience `Result` alias using [`TourchatError`].
pub type TourchatResult<T> = Result<T, TourchatError>;

/// Top-level error type for the Tourchat workspace.
///
/// Each variant corresponds to a subsystem that can produce errors. The
/// widget never surfaces these to its host; it converts them into fallback
/// transcript content.
#[derive(Error, Debug)]
pub enum TourchatError {
    /// The backend rejected the bearer credential (HTTP 401).
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Transport failure, non-success status, or malformed response body.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Credential storage could not be read or cleared.
    #[error("Session error: {0}")]
    Session(String),

    /// Invalid configuration.
    #[error("Config error: {0}")]
    Config(String),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TourchatError {
    /// Returns `true` for [`TourchatError::Unauthorized`].
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, TourchatError::Unauthorized(_))
    }
}
