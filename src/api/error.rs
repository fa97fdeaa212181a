//! Error taxonomy for the Finolog client
//!
//! Every public operation fails with exactly one of these kinds. Validation
//! failures are raised before any request leaves the process; everything else
//! is surfaced from the transport unchanged.

/// Boxed error produced by an HTTP capability
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by the Finolog client
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Caller-supplied arguments violate a schema or a domain rule
    #[error("validation failed: {message}")]
    Validation { message: String },

    /// The service reports that the addressed entity does not exist
    #[error("not found: {path}")]
    NotFound { path: String },

    /// Any other non-success HTTP status
    #[error("remote error {status}: {body}")]
    Remote { status: u16, body: String },

    /// The base URL or a request path does not form a valid URL
    #[error("invalid url {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Connection, timeout or cancellation failure from the HTTP capability
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),

    /// The response body was not the JSON shape we expected
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The manager behind a record has been dropped with its session
    #[error("session closed")]
    SessionClosed,
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// True for a 4xx remote status (caller fault)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Remote { status, .. } if (400..500).contains(status))
            || matches!(self, Self::NotFound { .. })
    }

    /// True for a 5xx remote status (service fault)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Remote { status, .. } if *status >= 500)
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            Self::NotFound { .. } => Some(404),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport(Box::new(error))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
