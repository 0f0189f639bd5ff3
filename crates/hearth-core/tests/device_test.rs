#![allow(clippy::unwrap_used)]
// Integration tests for the device capability layer using wiremock.

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hearth_api::Client;
use hearth_core::{CoreError, Device, DeviceKind};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Client) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = Client::with_sender(base_url, reqwest::Client::new());
    (server, client)
}

async fn mount_service(server: &MockServer, domain: &str, service: &str, entity_id: &str) {
    Mock::given(method("POST"))
        .and(path(format!("/api/services/{domain}/{service}")))
        .and(body_json(json!({ "entity_id": entity_id })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(server)
        .await;
}

fn lock_state(state: &str) -> serde_json::Value {
    json!({
        "entity_id": "lock.front_door",
        "state": state,
        "attributes": {},
        "last_changed": "2024-03-01T12:00:00+00:00",
        "last_updated": "2024-03-01T12:00:00+00:00"
    })
}

// ── Lookup ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_lookup_selects_capability_by_domain() {
    let (_server, client) = setup().await;

    let device = Device::lookup(&client, "light.kitchen").unwrap();
    assert_eq!(device.kind(), DeviceKind::Light);
    assert_eq!(device.entity_id(), "light.kitchen");
    assert_eq!(device.domain(), "light");
}

#[tokio::test]
async fn test_lookup_rejects_unknown_domain() {
    let (_server, client) = setup().await;

    let err = Device::lookup(&client, "camera.porch").unwrap_err();
    match err {
        CoreError::UnsupportedDomain { domain } => assert_eq!(domain, "camera"),
        other => panic!("expected UnsupportedDomain, got: {other}"),
    }
}

// ── Lights and switches ─────────────────────────────────────────────

#[tokio::test]
async fn test_light_turn_on_calls_light_service() {
    let (server, client) = setup().await;
    mount_service(&server, "light", "turn_on", "light.kitchen").await;

    let device = Device::lookup(&client, "light.kitchen").unwrap();
    device.turn_on().await.unwrap();
}

#[tokio::test]
async fn test_switch_toggle_uses_native_service() {
    let (server, client) = setup().await;
    mount_service(&server, "switch", "toggle", "switch.heater").await;

    let device = Device::lookup(&client, "switch.heater").unwrap();
    device.toggle().await.unwrap();
}

// ── Locks ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_lock_on_off_map_to_lock_unlock() {
    let (server, client) = setup().await;
    mount_service(&server, "lock", "lock", "lock.front_door").await;
    mount_service(&server, "lock", "unlock", "lock.front_door").await;

    let device = Device::lookup(&client, "lock.front_door").unwrap();
    device.turn_on().await.unwrap();
    device.turn_off().await.unwrap();
}

#[tokio::test]
async fn test_lock_toggle_inverts_reported_state() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/states/lock.front_door"))
        .respond_with(ResponseTemplate::new(200).set_body_json(lock_state("locked")))
        .expect(1)
        .mount(&server)
        .await;
    mount_service(&server, "lock", "unlock", "lock.front_door").await;

    let device = Device::lookup(&client, "lock.front_door").unwrap();
    device.toggle().await.unwrap();
}

#[tokio::test]
async fn test_lock_toggle_locks_when_unlocked() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/states/lock.front_door"))
        .respond_with(ResponseTemplate::new(200).set_body_json(lock_state("unlocked")))
        .expect(1)
        .mount(&server)
        .await;
    mount_service(&server, "lock", "lock", "lock.front_door").await;

    let device = Device::lookup(&client, "lock.front_door").unwrap();
    device.toggle().await.unwrap();
}
