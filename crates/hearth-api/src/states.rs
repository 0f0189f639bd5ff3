// Entity state model and endpoints
//
// Read and write entity states via /api/states. Listing, point reads,
// client-side domain filtering, and state overrides.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::client::Client;
use crate::error::Error;
use crate::sender::HttpSend;

/// Free-form attribute map carried by every entity state.
pub type StateAttributes = HashMap<String, serde_json::Value>;

/// A point-in-time snapshot of one entity's state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub entity_id: String,
    pub state: String,
    #[serde(default)]
    pub attributes: StateAttributes,
    pub last_changed: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl State {
    /// The domain prefix of the entity identifier (`light` for
    /// `light.kitchen`).
    pub fn domain(&self) -> &str {
        domain_of(&self.entity_id)
    }
}

/// Extract the domain prefix from an entity identifier.
pub(crate) fn domain_of(entity_id: &str) -> &str {
    entity_id.split('.').next().unwrap_or("")
}

impl<S: HttpSend> Client<S> {
    /// List the current state of every entity the hub knows about.
    ///
    /// `GET /api/states`
    pub async fn list_states(&self) -> Result<Vec<State>, Error> {
        debug!("listing states");
        self.get("/api/states").await
    }

    /// Get the state of a single entity.
    ///
    /// `GET /api/states/{entity_id}`
    pub async fn get_state(&self, entity_id: &str) -> Result<State, Error> {
        debug!(entity_id, "getting state");
        self.get(&format!("/api/states/{entity_id}")).await
    }

    /// List states, keeping only entities whose domain is in `domains`.
    ///
    /// Filtering happens client-side over [`list_states`](Self::list_states);
    /// the hub has no server-side domain filter on this endpoint.
    pub async fn filter_states(&self, domains: &[&str]) -> Result<Vec<State>, Error> {
        let mut states = self.list_states().await?;
        states.retain(|s| domains.contains(&s.domain()));
        Ok(states)
    }

    /// Override the recorded state of an entity.
    ///
    /// `POST /api/states/{entity_id}` with `{"state": ...}`
    ///
    /// This sets the state inside the hub's state machine without touching
    /// the physical device; use a service call to actually actuate it.
    pub async fn set_state(&self, entity_id: &str, state: &str) -> Result<(), Error> {
        debug!(entity_id, state, "setting state");
        self.post(
            &format!("/api/states/{entity_id}"),
            Some(&json!({ "state": state })),
        )
        .await
    }
}
