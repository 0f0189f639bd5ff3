// Watch state changes from a live hub.
//
//   HEARTH_URL=http://homeassistant.local:8123 HEARTH_TOKEN=... \
//     cargo run --example watch

use std::time::Duration;

use url::Url;

use hearth_api::{Client, Credentials, TransportConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let host = std::env::var("HEARTH_URL")
        .unwrap_or_else(|_| "http://homeassistant.local:8123".to_owned());
    let token = std::env::var("HEARTH_TOKEN")?;

    let client = Client::new(Url::parse(&host)?, &TransportConfig::default())?
        .credentials(Credentials::bearer(token));
    client.check_api().await?;

    let mut stream = client.events().await?;
    loop {
        match stream
            .next_state_changed_timeout(Duration::from_secs(60))
            .await
        {
            Ok(event) => {
                let new_state = event
                    .data
                    .new_state
                    .map_or_else(|| "(removed)".to_owned(), |s| s.state);
                println!("{} -> {new_state}", event.data.entity_id);
            }
            Err(e) if e.is_stream_dead() => {
                eprintln!("stream dropped ({e}), reconnecting");
                stream = client.events().await?;
            }
            // A quiet minute is fine; go around again.
            Err(hearth_api::Error::ReadTimeout { .. }) => {}
            Err(e) => return Err(e.into()),
        }
    }
}
