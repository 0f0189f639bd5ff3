// Hub HTTP client
//
// Wraps an injected sender with credential header attachment, URL
// construction, and the bounded retry loop. All REST endpoint helpers
// (states, services, events) are implemented as inherent methods via
// separate files to keep this module focused on transport mechanics.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, Request, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::error::Error;
use crate::sender::HttpSend;
use crate::transport::{RetryPolicy, TransportConfig, WriteStatusPolicy};

/// Header carrying the legacy API password.
const HEADER_PASSWORD: &str = "x-ha-access";

/// Header carrying the supervisor API key (`X-HASSIO-KEY` on the wire;
/// header names are case-insensitive and `HeaderName` wants lowercase).
const HEADER_API_KEY: &str = "x-hassio-key";

/// Credentials attached to every outgoing request.
///
/// Any subset may be set; all present credentials are sent simultaneously
/// and the hub decides precedence. Values are kept in [`SecretString`] so
/// they never leak through `Debug` output.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    /// Legacy API password (`x-ha-access` header).
    pub password: Option<SecretString>,
    /// Supervisor API key (`X-HASSIO-KEY` header).
    pub api_key: Option<SecretString>,
    /// Long-lived access token (`Authorization: Bearer` header).
    pub bearer_token: Option<SecretString>,
}

impl Credentials {
    /// Credentials consisting of a single long-lived access token, the
    /// usual setup for modern hubs.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            bearer_token: Some(SecretString::from(token.into())),
            ..Self::default()
        }
    }
}

/// Client for the hub's REST API and event stream.
///
/// Generic over the [`HttpSend`] capability so tests can inject a scripted
/// sender; production code uses the `reqwest::Client` built by
/// [`TransportConfig::build_client`].
///
/// Sharing: `&Client` may issue any number of concurrent requests. The
/// credential mutators take `&mut self`, so the borrow checker already
/// rules out mutation while requests are in flight.
#[derive(Debug)]
pub struct Client<S = reqwest::Client> {
    pub(crate) base_url: Url,
    pub(crate) credentials: Credentials,
    pub(crate) retry: RetryPolicy,
    pub(crate) write_policy: WriteStatusPolicy,
    /// Per-request timeout for REST calls; the streaming request is exempt.
    pub(crate) timeout: Option<Duration>,
    pub(crate) sender: S,
}

impl Client {
    /// Create a client backed by a fresh `reqwest::Client` built from the
    /// given transport config.
    pub fn new(base_url: Url, config: &TransportConfig) -> Result<Self, Error> {
        let http = config.build_client()?;
        Ok(Self::with_sender(base_url, http).request_timeout(config.timeout))
    }
}

impl<S: HttpSend> Client<S> {
    /// Create a client from a caller-supplied sender.
    pub fn with_sender(base_url: Url, sender: S) -> Self {
        Self {
            base_url,
            credentials: Credentials::default(),
            retry: RetryPolicy::default(),
            write_policy: WriteStatusPolicy::default(),
            timeout: None,
            sender,
        }
    }

    /// Replace the full credential set.
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Override the transport retry policy.
    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Override how POST response statuses are judged.
    pub fn write_status_policy(mut self, policy: WriteStatusPolicy) -> Self {
        self.write_policy = policy;
        self
    }

    /// Bound every REST request by `timeout`. Streaming connections are
    /// deliberately exempt — their connect phase has its own deadline.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The hub base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Point the client at a different hub.
    pub fn set_base_url(&mut self, base_url: Url) {
        self.base_url = base_url;
    }

    /// Set (or clear) the legacy API password.
    pub fn set_password(&mut self, password: Option<String>) {
        self.credentials.password = password.map(SecretString::from);
    }

    /// Set (or clear) the supervisor API key.
    pub fn set_api_key(&mut self, api_key: Option<String>) {
        self.credentials.api_key = api_key.map(SecretString::from);
    }

    /// Set (or clear) the long-lived access token. The `Bearer ` prefix is
    /// added at request time; pass the bare token.
    pub fn set_bearer_token(&mut self, token: Option<String>) {
        self.credentials.bearer_token = token.map(SecretString::from);
    }

    // ── Request plumbing ─────────────────────────────────────────────

    /// Resolve an absolute API path (e.g. `/api/states`) against the base URL.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    /// Headers for every configured credential. All present credentials are
    /// attached; there is no precedence logic.
    pub(crate) fn credential_headers(&self) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        if let Some(password) = &self.credentials.password {
            headers.insert(HEADER_PASSWORD, secret_header(password)?);
        }
        if let Some(api_key) = &self.credentials.api_key {
            headers.insert(HEADER_API_KEY, secret_header(api_key)?);
        }
        if let Some(token) = &self.credentials.bearer_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|e| Error::Credential(e.to_string()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    fn build_request(
        &self,
        method: Method,
        url: Url,
        body: Option<&[u8]>,
    ) -> Result<Request, Error> {
        let mut request = Request::new(method, url);
        *request.timeout_mut() = self.timeout;
        request.headers_mut().extend(self.credential_headers()?);
        if let Some(bytes) = body {
            request
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            *request.body_mut() = Some(reqwest::Body::from(bytes.to_vec()));
        }
        Ok(request)
    }

    /// GET `path` and decode the 200 response body as JSON.
    ///
    /// Transport failures are retried immediately up to the attempt budget;
    /// if every attempt fails, the last transport error is returned. A
    /// response with any status other than 200 fails at once — a status is
    /// a definitive answer from the hub, not a transport fault — and its
    /// body is never JSON-decoded.
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.api_url(path)?;
        let mut last_err = None;

        for attempt in 1..=self.retry.attempts {
            debug!(%url, attempt, "GET");
            let request = self.build_request(Method::GET, url.clone(), None)?;

            let response = match self.sender.send(request).await {
                Ok(response) => response,
                Err(e) => {
                    warn!(%url, attempt, error = %e, "GET transport failure");
                    last_err = Some(Error::Transport(e));
                    continue;
                }
            };

            let status = response.status();
            if status != StatusCode::OK {
                let body = response.text().await.unwrap_or_default();
                return Err(Error::Status {
                    status: status.as_u16(),
                    body,
                });
            }

            let body = response.text().await?;
            return serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body,
            });
        }

        Err(last_err.unwrap_or(Error::AttemptsExhausted {
            attempts: self.retry.attempts,
        }))
    }

    /// POST `path` with an optional JSON body (`None` sends no body at all).
    ///
    /// Transport failures are retried like [`get`](Self::get). Once any
    /// response arrives the retry loop ends; whether its status can fail
    /// the call is decided by the configured [`WriteStatusPolicy`].
    pub(crate) async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<(), Error> {
        let url = self.api_url(path)?;
        let payload = match body {
            Some(b) => Some(serde_json::to_vec(b).map_err(|e| Error::Encode(e.to_string()))?),
            None => None,
        };
        let mut last_err = None;

        for attempt in 1..=self.retry.attempts {
            debug!(%url, attempt, "POST");
            let request = self.build_request(Method::POST, url.clone(), payload.as_deref())?;

            match self.sender.send(request).await {
                Ok(response) => {
                    let status = response.status();
                    return match self.write_policy {
                        WriteStatusPolicy::Lenient => Ok(()),
                        WriteStatusPolicy::Strict if status.is_success() => Ok(()),
                        WriteStatusPolicy::Strict => {
                            let body = response.text().await.unwrap_or_default();
                            Err(Error::Status {
                                status: status.as_u16(),
                                body,
                            })
                        }
                    };
                }
                Err(e) => {
                    warn!(%url, attempt, error = %e, "POST transport failure");
                    last_err = Some(Error::Transport(e));
                }
            }
        }

        Err(last_err.unwrap_or(Error::AttemptsExhausted {
            attempts: self.retry.attempts,
        }))
    }
}

fn secret_header(secret: &SecretString) -> Result<HeaderValue, Error> {
    let mut value = HeaderValue::from_str(secret.expose_secret())
        .map_err(|e| Error::Credential(e.to_string()))?;
    value.set_sensitive(true);
    Ok(value)
}

// ── Tests ────────────────────────────────────────────────────────────
