#![allow(clippy::unwrap_used)]
// End-to-end event stream tests: connect over HTTP, read framed events.
//
// wiremock serves the whole stream body at once and then closes the
// connection, which is exactly the "hub went away" shape the reader has
// to survive.

use serde_json::json;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hearth_api::{Client, Credentials, Error};

async fn setup() -> (MockServer, Client) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = Client::with_sender(base_url, reqwest::Client::new());
    (server, client)
}

fn stream_body() -> String {
    let state_changed = json!({
        "origin": "LOCAL",
        "event_type": "state_changed",
        "time_fired": "2024-03-01T12:00:00+00:00",
        "data": {
            "entity_id": "lock.front_door",
            "old_state": {
                "entity_id": "lock.front_door",
                "state": "unlocked",
                "attributes": {},
                "last_changed": "2024-03-01T11:00:00+00:00",
                "last_updated": "2024-03-01T11:00:00+00:00"
            },
            "new_state": {
                "entity_id": "lock.front_door",
                "state": "locked",
                "attributes": {},
                "last_changed": "2024-03-01T12:00:00+00:00",
                "last_updated": "2024-03-01T12:00:00+00:00"
            }
        }
    });
    format!(
        "data: ping\ndata: {}\ndata: {}\n",
        json!({ "event_type": "call_service" }),
        state_changed
    )
}

#[tokio::test]
async fn test_stream_surfaces_only_state_changed() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/stream"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(stream_body().into_bytes(), "text/event-stream"),
        )
        .mount(&server)
        .await;

    let mut stream = client.events().await.unwrap();

    let event = stream.next_state_changed().await.unwrap();
    assert_eq!(event.data.entity_id, "lock.front_door");
    assert_eq!(event.data.old_state.unwrap().state, "unlocked");
    assert_eq!(event.data.new_state.unwrap().state, "locked");

    // The served body is exhausted; the connection is gone.
    let err = stream.next_state_changed().await.unwrap_err();
    assert!(matches!(err, Error::StreamClosed));
    assert!(err.is_stream_dead());

    stream.close();
}

#[tokio::test]
async fn test_stream_connect_sends_credentials() {
    let (server, client) = setup().await;
    let client = client.credentials(Credentials::bearer("llat-token"));

    Mock::given(method("GET"))
        .and(path("/api/stream"))
        .and(header("authorization", "Bearer llat-token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(b"data: ping\n".to_vec(), "text/event-stream"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut stream = client.events().await.unwrap();
    let err = stream.next_state_changed().await.unwrap_err();
    assert!(matches!(err, Error::StreamClosed));
}

#[tokio::test]
async fn test_stream_connect_rejected_status() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/stream"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .mount(&server)
        .await;

    let err = client.events().await.unwrap_err();
    assert!(matches!(err, Error::Status { status: 401, .. }));
}
