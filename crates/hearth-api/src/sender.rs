// HTTP sender capability
//
// The client never talks to reqwest's connection pool directly; it goes
// through this one-method seam so tests can substitute a scripted double
// and callers can wrap the real client (proxies, instrumentation, ...).

use futures_util::future::BoxFuture;

/// Boxed error carried by [`HttpSend`] implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Capability to execute one HTTP request and return its response.
///
/// Implemented for [`reqwest::Client`]; test suites implement it with a
/// scripted queue of responses and captured requests.
pub trait HttpSend: Send + Sync {
    fn send(&self, request: reqwest::Request)
    -> BoxFuture<'_, Result<reqwest::Response, BoxError>>;
}

impl HttpSend for reqwest::Client {
    fn send(
        &self,
        request: reqwest::Request,
    ) -> BoxFuture<'_, Result<reqwest::Response, BoxError>> {
        Box::pin(async move { self.execute(request).await.map_err(Into::into) })
    }
}
