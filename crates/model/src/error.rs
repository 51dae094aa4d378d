use std::fmt::{self, Display};

/// The kind of error that occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The provider rejected the credentials.
    Unauthorized,
    /// The provider is rate limited.
    RateLimitExceeded,
    /// The provider failed internally (HTTP 5XX).
    ServerError,
    /// The provider answered with something that could not be decoded.
    InvalidResponse,
    /// Any other errors.
    Other,
}

impl ErrorKind {
    /// Maps an HTTP status code to an error kind.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => ErrorKind::Unauthorized,
            429 => ErrorKind::RateLimitExceeded,
            500..=599 => ErrorKind::ServerError,
            _ => ErrorKind::Other,
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::RateLimitExceeded => "rate limit exceeded",
            ErrorKind::ServerError => "server error",
            ErrorKind::InvalidResponse => "invalid response",
            ErrorKind::Other => "other error",
        };
        f.write_str(s)
    }
}
