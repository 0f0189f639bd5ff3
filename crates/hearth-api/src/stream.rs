//! Server-push event stream.
//!
//! Opens one long-lived GET to the hub's `/api/stream` endpoint and reads
//! the line-oriented text event stream incrementally, surfacing only
//! `state_changed` events. Keep-alive pings and foreign event kinds are
//! consumed and skipped inside the read call.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut stream = client.events().await?;
//! loop {
//!     match stream.next_state_changed().await {
//!         Ok(event) => println!("{} changed", event.data.entity_id),
//!         Err(e) if e.is_stream_dead() => break, // reconnect via events()
//!         Err(e) => return Err(e),
//!     }
//! }
//! ```
//!
//! There is no auto-reconnect: a dead stream is reported once and the
//! caller decides whether to call [`Client::events`] again.

use std::time::Duration;

use bytes::{Bytes, BytesMut};
use chrono::{DateTime, Utc};
use futures_util::stream::BoxStream;
use futures_util::{StreamExt, TryStreamExt};
use reqwest::{Method, Request, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::client::Client;
use crate::error::Error;
use crate::sender::{BoxError, HttpSend};
use crate::states::State;

const STREAM_PATH: &str = "/api/stream";

/// Field prefix of a meaningful stream line. Lines without it (comments,
/// `event:`/`id:` fields, blanks) are noise to this reader — only the
/// single-data-line subset of the event-stream format is implemented.
const DATA_PREFIX: &[u8] = b"data: ";

/// Payload of the periodic liveness frame.
const KEEP_ALIVE: &[u8] = b"ping";

const STATE_CHANGED: &str = "state_changed";

/// Connect deadline applied by [`Client::events`] when the caller does not
/// supply one.
pub const DEFAULT_CONNECT_DEADLINE: Duration = Duration::from_secs(10);

// ── Event model ──────────────────────────────────────────────────────

/// A decoded `state_changed` push event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateChangedEvent {
    pub origin: String,
    pub event_type: String,
    pub time_fired: DateTime<Utc>,
    pub data: StateChange,
}

/// The before/after snapshots of the entity that changed.
///
/// `old_state` is `null` when the entity first appears; `new_state` is
/// `null` when it is removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateChange {
    pub entity_id: String,
    #[serde(default)]
    pub old_state: Option<State>,
    #[serde(default)]
    pub new_state: Option<State>,
}

/// Narrow first-pass decode: just enough to decide whether a frame is
/// worth decoding fully.
#[derive(Debug, Deserialize)]
struct EventKind {
    #[serde(default)]
    event_type: String,
}

// ── Connecting ───────────────────────────────────────────────────────

impl<S: HttpSend> Client<S> {
    /// Open the event stream with the default 10-second connect deadline.
    pub async fn events(&self) -> Result<EventStream, Error> {
        self.events_with_deadline(DEFAULT_CONNECT_DEADLINE).await
    }

    /// Open the event stream, bounding only the connect phase by `deadline`.
    ///
    /// `GET /api/stream` with the same credential headers as every other
    /// request. Once connected, reads are unbounded unless the caller uses
    /// [`EventStream::next_state_changed_timeout`].
    pub async fn events_with_deadline(&self, deadline: Duration) -> Result<EventStream, Error> {
        let url = self.api_url(STREAM_PATH)?;
        debug!(%url, "connecting event stream");

        // No per-request timeout here: the response body is read for the
        // lifetime of the stream.
        let mut request = Request::new(Method::GET, url);
        request.headers_mut().extend(self.credential_headers()?);

        let response = tokio::time::timeout(deadline, self.sender.send(request))
            .await
            .map_err(|_| Error::ConnectTimeout {
                timeout_secs: deadline.as_secs(),
            })?
            .map_err(Error::Transport)?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Status {
                status: status.as_u16(),
                body,
            });
        }

        debug!("event stream connected");
        Ok(EventStream::new(
            response.bytes_stream().map_err(BoxError::from).boxed(),
        ))
    }
}

// ── EventStream ──────────────────────────────────────────────────────

/// Handle to one open streaming connection.
///
/// Reads must not be shared: `next_state_changed` takes `&mut self`, so at
/// most one read is outstanding per stream. Independent streams from
/// separate [`Client::events`] calls do not interfere.
pub struct EventStream {
    chunks: BoxStream<'static, Result<Bytes, BoxError>>,
    buf: BytesMut,
}

impl std::fmt::Debug for EventStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStream")
            .field("buf", &self.buf)
            .finish_non_exhaustive()
    }
}

impl EventStream {
    pub(crate) fn new(chunks: BoxStream<'static, Result<Bytes, BoxError>>) -> Self {
        Self {
            chunks,
            buf: BytesMut::new(),
        }
    }

    /// Wait for the next `state_changed` event.
    ///
    /// Blocks (awaits) until a qualifying frame arrives, skipping
    /// keep-alive pings, non-`data:` lines, and foreign event kinds. A
    /// frame whose JSON does not parse fails the call; a read error or
    /// end-of-stream means the connection is dead and the caller must
    /// reconnect.
    pub async fn next_state_changed(&mut self) -> Result<StateChangedEvent, Error> {
        loop {
            while let Some(line) = self.split_line() {
                if let Some(event) = parse_frame(&line)? {
                    return Ok(event);
                }
            }
            match self.chunks.next().await {
                Some(Ok(chunk)) => self.buf.extend_from_slice(&chunk),
                Some(Err(e)) => return Err(Error::Stream(e)),
                // A partial line still buffered at EOF is a truncated
                // frame; it is dropped, not surfaced.
                None => return Err(Error::StreamClosed),
            }
        }
    }

    /// Like [`next_state_changed`](Self::next_state_changed), but gives up
    /// after `deadline` with [`Error::ReadTimeout`].
    ///
    /// A timeout does not invalidate the stream — buffered bytes are kept
    /// and the next read resumes where this one left off. Use this to keep
    /// a silent, non-closing hub from parking the caller forever.
    pub async fn next_state_changed_timeout(
        &mut self,
        deadline: Duration,
    ) -> Result<StateChangedEvent, Error> {
        tokio::time::timeout(deadline, self.next_state_changed())
            .await
            .map_err(|_| Error::ReadTimeout {
                timeout_secs: deadline.as_secs(),
            })?
    }

    /// Close the stream and release the connection.
    ///
    /// Consuming `self` makes read-after-close unrepresentable; dropping
    /// the handle without calling this releases the connection just the
    /// same.
    pub fn close(self) {
        drop(self);
    }

    /// Split one complete line off the front of the buffer, stripping the
    /// trailing `\n` (and `\r`, for CRLF hubs).
    fn split_line(&mut self) -> Option<Bytes> {
        let pos = self.buf.iter().position(|&b| b == b'\n')?;
        let mut line = self.buf.split_to(pos + 1);
        line.truncate(pos);
        if line.last() == Some(&b'\r') {
            line.truncate(line.len() - 1);
        }
        Some(line.freeze())
    }
}

// ── Frame parsing ────────────────────────────────────────────────────

/// Decide what one line means: `Ok(Some)` for a `state_changed` event,
/// `Ok(None)` for anything skippable, `Err` for a frame that should have
/// parsed but didn't.
fn parse_frame(line: &[u8]) -> Result<Option<StateChangedEvent>, Error> {
    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        trace!("skipping non-data line");
        return Ok(None);
    };

    if payload == KEEP_ALIVE {
        trace!("keep-alive ping");
        return Ok(None);
    }

    let kind: EventKind =
        serde_json::from_slice(payload).map_err(|e| deserialization_error(&e, payload))?;
    if kind.event_type != STATE_CHANGED {
        trace!(event_type = %kind.event_type, "skipping event");
        return Ok(None);
    }

    let event = serde_json::from_slice(payload).map_err(|e| deserialization_error(&e, payload))?;
    Ok(Some(event))
}

fn deserialization_error(e: &serde_json::Error, payload: &[u8]) -> Error {
    Error::Deserialization {
        message: e.to_string(),
        body: String::from_utf8_lossy(payload).into_owned(),
    }
}

// ── Tests ────────────────────────────────────────────────────────────
