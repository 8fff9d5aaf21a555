use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;
pub type ConfigError = Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Upstream returned HTTP {0}")]
    UpstreamStatus(u16),

    #[error("Upstream request failed: {0}")]
    Upstream(String),

    #[error("Request timeout: {0}")]
    Timeout(String),

    #[error("Malformed upstream response: {0}")]
    MalformedResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl Error {
    /// Errors caused by caller input rather than upstream or internal failure.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidRequest(_) | Error::InvalidUrl(_) | Error::Config(_)
        )
    }

    pub fn is_temporary(&self) -> bool {
        matches!(
            self,
            Error::UpstreamStatus(_) | Error::Upstream(_) | Error::Timeout(_) | Error::Io(_)
        )
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Error::InvalidRequest(_) => "INVALID_REQUEST",
            Error::UpstreamStatus(_) => "UPSTREAM_STATUS",
            Error::Upstream(_) => "UPSTREAM",
            Error::Timeout(_) => "TIMEOUT",
            Error::MalformedResponse(_) => "MALFORMED_RESPONSE",
            Error::Config(_) => "CONFIG",
            Error::Io(_) => "IO_ERROR",
            Error::Serialization(_) => "SERIALIZATION",
            Error::InvalidUrl(_) => "INVALID_URL",
            Error::Internal(_) => "INTERNAL",
        }
    }
}
