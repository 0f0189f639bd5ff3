// Service and event endpoints
//
// Service invocation (/api/services) and event firing (/api/events),
// plus the API liveness probe.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::client::Client;
use crate::error::Error;
use crate::sender::HttpSend;

#[derive(Debug, Deserialize)]
struct ApiStatus {
    #[serde(default)]
    message: String,
}

impl<S: HttpSend> Client<S> {
    /// Check that the hub API is up and answering.
    ///
    /// `GET /api/` — returns `Err(Error::ApiUnavailable)` if the hub
    /// answers without its running-message.
    pub async fn check_api(&self) -> Result<(), Error> {
        let status: ApiStatus = self.get("/api/").await?;
        if status.message.is_empty() {
            return Err(Error::ApiUnavailable);
        }
        Ok(())
    }

    /// Call a service on a single entity.
    ///
    /// `POST /api/services/{domain}/{service}` with `{"entity_id": ...}`
    pub async fn call_service(
        &self,
        domain: &str,
        service: &str,
        entity_id: &str,
    ) -> Result<(), Error> {
        debug!(domain, service, entity_id, "calling service");
        self.call_service_with(domain, service, &json!({ "entity_id": entity_id }))
            .await
    }

    /// Call a service with a caller-supplied body.
    ///
    /// `POST /api/services/{domain}/{service}`
    pub async fn call_service_with<B: Serialize>(
        &self,
        domain: &str,
        service: &str,
        data: &B,
    ) -> Result<(), Error> {
        self.post(&format!("/api/services/{domain}/{service}"), Some(data))
            .await
    }

    /// Fire a custom event on the hub's event bus.
    ///
    /// `POST /api/events/{event_type}` — `data: None` sends no body.
    pub async fn fire_event<B: Serialize>(
        &self,
        event_type: &str,
        data: Option<&B>,
    ) -> Result<(), Error> {
        debug!(event_type, "firing event");
        self.post(&format!("/api/events/{event_type}"), data).await
    }
}
