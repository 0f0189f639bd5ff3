// Transport configuration and request policies.
//
// `TransportConfig` builds the underlying `reqwest::Client`; the two policy
// types govern how the `Client` drives individual requests. All of it is
// explicit configuration — there is no hidden process-wide default client
// or timeout.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::Error;

/// TLS verification mode for the hub connection.
#[derive(Debug, Clone)]
pub enum TlsMode {
    /// Use the system certificate store.
    System,
    /// Use a custom CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (for hubs with self-signed certs).
    DangerAcceptInvalid,
}

/// Configuration for building the HTTP client.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    /// Timeout applied per REST request by the [`Client`](crate::Client).
    /// Deliberately not set on the `reqwest::Client` itself: a client-level
    /// timeout would also cap the long-lived streaming request, killing the
    /// event stream after `timeout` regardless of activity.
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: Duration::from_secs(10),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    ///
    /// The returned client carries no client-level timeout; `timeout` is
    /// attached per request so the streaming connection stays exempt.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("hearth-api/", env!("CARGO_PKG_VERSION")));

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path)
                    .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}

// ── Request policies ─────────────────────────────────────────────────

/// Bounded immediate-retry policy for transport-level failures.
///
/// `attempts` is the total attempt budget, not a retry count: 3 means one
/// initial call plus two retries. There is no backoff between attempts —
/// the hub is on the local network and a failed connect is either instant
/// or already bounded by the transport timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { attempts: 3 }
    }
}

/// How POST responses are judged.
///
/// The hub's classic clients declare a write successful as soon as *any*
/// response arrives, even an HTTP error status. `Lenient` preserves that
/// contract for existing integrations; `Strict` fails non-2xx writes with
/// [`Error::Status`](crate::Error::Status) and is recommended for new code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteStatusPolicy {
    /// Any response counts as success; the status code is never inspected.
    #[default]
    Lenient,
    /// Non-2xx responses fail the write (without retrying — a status is a
    /// definitive answer, not a transport failure).
    Strict,
}
