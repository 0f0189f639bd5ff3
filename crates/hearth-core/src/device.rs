// Device capability layer
//
// Maps an entity's domain prefix to a behavioral wrapper through a
// registration table. One `Device` value borrows the API client and turns
// capability calls into hub service calls.

use tracing::debug;

use hearth_api::{Client, HttpSend};

use crate::entity::EntityId;
use crate::error::CoreError;

/// Device categories with a registered capability implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    Light,
    Switch,
    Lock,
}

/// Registration table: domain prefix → capability.
const REGISTRY: &[(&str, DeviceKind)] = &[
    ("light", DeviceKind::Light),
    ("switch", DeviceKind::Switch),
    ("lock", DeviceKind::Lock),
];

fn registered(domain: &str) -> Option<DeviceKind> {
    REGISTRY
        .iter()
        .find(|(d, _)| *d == domain)
        .map(|(_, kind)| *kind)
}

/// Domains with a registered device capability.
pub fn supported_domains() -> Vec<&'static str> {
    REGISTRY.iter().map(|(domain, _)| *domain).collect()
}

/// Whether `entity_id`'s domain has a registered device capability.
pub fn is_supported(entity_id: &str) -> bool {
    registered(EntityId::from(entity_id).domain()).is_some()
}

/// A controllable device: an entity plus the capability implementation
/// selected by its domain.
#[derive(Debug)]
pub struct Device<'a, S> {
    client: &'a Client<S>,
    id: EntityId,
    kind: DeviceKind,
}

impl<'a, S: HttpSend> Device<'a, S> {
    /// Look up the capability for `id`'s domain.
    ///
    /// Unknown domains are rejected with
    /// [`CoreError::UnsupportedDomain`] carrying the offending domain.
    pub fn lookup(client: &'a Client<S>, id: impl Into<EntityId>) -> Result<Self, CoreError> {
        let id = id.into();
        let kind = registered(id.domain()).ok_or_else(|| CoreError::UnsupportedDomain {
            domain: id.domain().to_owned(),
        })?;
        Ok(Self { client, id, kind })
    }

    pub fn entity_id(&self) -> &str {
        self.id.as_str()
    }

    pub fn domain(&self) -> &str {
        self.id.domain()
    }

    pub fn kind(&self) -> DeviceKind {
        self.kind
    }

    /// Turn the device on (locks a lock).
    pub async fn turn_on(&self) -> Result<(), CoreError> {
        let service = match self.kind {
            DeviceKind::Light | DeviceKind::Switch => "turn_on",
            DeviceKind::Lock => "lock",
        };
        self.call(service).await
    }

    /// Turn the device off (unlocks a lock).
    pub async fn turn_off(&self) -> Result<(), CoreError> {
        let service = match self.kind {
            DeviceKind::Light | DeviceKind::Switch => "turn_off",
            DeviceKind::Lock => "unlock",
        };
        self.call(service).await
    }

    /// Toggle the device.
    ///
    /// Lights and switches have a native `toggle` service. Locks do not,
    /// so the current state is read and inverted: `locked` → unlock,
    /// anything else → lock.
    pub async fn toggle(&self) -> Result<(), CoreError> {
        match self.kind {
            DeviceKind::Light | DeviceKind::Switch => self.call("toggle").await,
            DeviceKind::Lock => {
                let state = self.client.get_state(self.id.as_str()).await?;
                if state.state == "locked" {
                    self.call("unlock").await
                } else {
                    self.call("lock").await
                }
            }
        }
    }

    async fn call(&self, service: &str) -> Result<(), CoreError> {
        debug!(entity_id = %self.id, service, "device service call");
        self.client
            .call_service(self.id.domain(), service, self.id.as_str())
            .await?;
        Ok(())
    }
}
