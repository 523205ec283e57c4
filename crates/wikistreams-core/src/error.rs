//! Error types for the WikiStreams pipeline.
//!
//! Per-frame errors ([`FrameError`]) go to the caller's error callback and
//! never stop the stream. Connection-level errors ([`StreamError`]) end the
//! current `run` call and are returned from it.

use thiserror::Error;

/// An event carried a `schema_uri` other than the one its stream expects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("received event with schema_uri='{got}', '{want}' expected")]
pub struct UnexpectedSchemaError {
    got: String,
    want: String,
}

impl UnexpectedSchemaError {
    pub fn new(got: impl Into<String>, want: impl Into<String>) -> Self {
        Self {
            got: got.into(),
            want: want.into(),
        }
    }

    /// Schema identifier found in the event.
    pub fn got(&self) -> &str {
        &self.got
    }

    /// Schema identifier the stream was configured for.
    pub fn want(&self) -> &str {
        &self.want
    }
}

/// Errors raised while handling a single frame.
#[derive(Debug, Error)]
pub enum FrameError {
    /// Payload is not well-formed JSON for the target event type.
    #[error("failed to decode event: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    UnexpectedSchema(#[from] UnexpectedSchemaError),
}

impl FrameError {
    /// Returns `true` if the frame decoded but carried the wrong schema.
    pub fn is_schema_mismatch(&self) -> bool {
        matches!(self, Self::UnexpectedSchema(_))
    }
}

/// Origin filter pattern could not be compiled.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("invalid origin filter '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Terminal errors that end a `run` call.
#[derive(Debug, Error)]
pub enum StreamError {
    /// Connection could not be established (DNS, TLS, refused, timeout).
    #[error("connection to {url} failed: {reason}")]
    Connect { url: String, reason: String },

    /// Server answered with a non-success HTTP status.
    #[error("HTTP {status} from {url}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    /// The event stream broke mid-flight (read error, malformed framing).
    #[error("stream protocol error: {0}")]
    Protocol(String),

    #[error("{0}")]
    Other(String),
}

impl StreamError {
    /// Returns `true` if calling `run` again may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Connect { .. } | Self::Protocol(_) => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Other(_) => false,
        }
    }
}
