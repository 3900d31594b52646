//! Error types for request dispatch.
//!
//! [`ClientError`] is what an [`HttpClient`](crate::http::HttpClient) reports when
//! it cannot complete an exchange. [`Error`] is what the dispatcher surfaces to
//! callers after classifying that failure.

use std::fmt;

/// Boxed error used to carry the original low-level cause.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure reported by an HTTP client while executing a request or reading a body.
#[derive(Debug)]
pub enum ClientError {
    /// The peer answered with something that is not valid HTTP.
    Protocol(BoxError),
    /// Connection, DNS, timeout or other I/O failure.
    Io(BoxError),
}

impl ClientError {
    /// Wraps a cause as a protocol failure.
    pub fn protocol(cause: impl Into<BoxError>) -> Self {
        ClientError::Protocol(cause.into())
    }

    /// Wraps a cause as an I/O failure.
    pub fn io(cause: impl Into<BoxError>) -> Self {
        ClientError::Io(cause.into())
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Protocol(cause) => write!(f, "protocol error: {}", cause),
            ClientError::Io(cause) => write!(f, "I/O error: {}", cause),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::Protocol(cause) | ClientError::Io(cause) => Some(cause.as_ref()),
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(e: std::io::Error) -> Self {
        ClientError::Io(Box::new(e))
    }
}

/// Errors raised by the dispatcher itself.
///
/// Errors produced by a content handler never pass through this type; they are
/// returned to the caller as they were produced.
#[derive(Debug)]
pub enum Error {
    /// The response could not be understood at the protocol level.
    Format { source: BoxError },
    /// The server could not be reached or the connection failed mid-exchange.
    Transport { message: String, source: BoxError },
}

impl Error {
    /// Classifies a client failure for a request sent to `uri`.
    ///
    /// The query string is stripped from `uri` before it goes into the message.
    pub fn from_client(error: ClientError, uri: &str) -> Self {
        match error {
            ClientError::Protocol(source) => Error::Format { source },
            ClientError::Io(source) => Error::Transport {
                message: format!(
                    "Cannot fetch data from {} : {}",
                    strip_query(uri),
                    describe(source.as_ref())
                ),
                source,
            },
        }
    }

    /// Returns the original low-level cause.
    pub fn cause(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        match self {
            Error::Format { source } | Error::Transport { source, .. } => source.as_ref(),
        }
    }

    /// Whether this is an [`Error::Format`].
    pub fn is_format(&self) -> bool {
        matches!(self, Error::Format { .. })
    }

    /// Whether this is an [`Error::Transport`].
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport { .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Format { source } => {
                write!(f, "Malformed HTTP response: {}", describe(source.as_ref()))
            }
            Error::Transport { message, .. } => f.write_str(message),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.cause())
    }
}

/// Joins `error` and its chain of sources with `": "`.
///
/// Causes whose text is already part of the previous message are skipped.
pub fn describe(error: &(dyn std::error::Error + 'static)) -> String {
    let mut description = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !description.ends_with(&text) {
            description.push_str(": ");
            description.push_str(&text);
        }
        source = cause.source();
    }
    description
}

/// Returns `uri` up to, not including, the first `?`.
pub fn strip_query(uri: &str) -> &str {
    match uri.find('?') {
        Some(index) => &uri[..index],
        None => uri,
    }
}
