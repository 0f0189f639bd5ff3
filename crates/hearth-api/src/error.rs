use thiserror::Error;

use crate::sender::BoxError;

/// Top-level error type for the `hearth-api` crate.
///
/// Covers every failure mode across the transport, the REST helpers,
/// and the event stream. `hearth-core` maps these into its own error
/// type where it adds domain-level failures.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[source] BoxError),

    /// Every attempt in the retry budget failed at the transport level,
    /// or the budget was zero to begin with.
    #[error("retry budget exhausted after {attempts} attempts")]
    AttemptsExhausted { attempts: u32 },

    /// The hub answered with a non-success HTTP status.
    #[error("hub returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// URL parsing error.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS configuration or HTTP client construction failed.
    #[error("TLS error: {0}")]
    Tls(String),

    /// A credential contains bytes that cannot be carried in an HTTP header.
    #[error("invalid credential value: {0}")]
    Credential(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// A request body could not be serialized to JSON.
    #[error("failed to encode request body: {0}")]
    Encode(String),

    /// The hub reports its API as not running (`GET /api/` returned no
    /// message).
    #[error("hub API is not running")]
    ApiUnavailable,

    // ── Event stream ────────────────────────────────────────────────
    /// Connecting to the event stream did not complete within the deadline.
    #[error("event stream connect timed out after {timeout_secs}s")]
    ConnectTimeout { timeout_secs: u64 },

    /// A read on the event stream did not produce a qualifying frame
    /// within the caller's deadline. The stream itself may still be alive.
    #[error("event stream read timed out after {timeout_secs}s")]
    ReadTimeout { timeout_secs: u64 },

    /// The event stream failed mid-read; the connection is dead.
    #[error("event stream read failed: {0}")]
    Stream(#[source] BoxError),

    /// The event stream ended (server closed the connection), possibly
    /// mid-frame. The connection is dead and must be re-established.
    #[error("event stream closed")]
    StreamClosed,
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying with a
    /// fresh request or a fresh stream connection.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Transport(_)
                | Self::AttemptsExhausted { .. }
                | Self::ConnectTimeout { .. }
                | Self::Stream(_)
                | Self::StreamClosed
        )
    }

    /// Returns `true` if the stream (not the frame) is the problem and the
    /// caller should reconnect before reading again.
    pub fn is_stream_dead(&self) -> bool {
        matches!(self, Self::Stream(_) | Self::StreamClosed)
    }

    /// Returns `true` if this is a "not found" status from the hub.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(Box::new(e))
    }
}
