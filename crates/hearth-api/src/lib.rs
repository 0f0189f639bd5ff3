// hearth-api: Async Rust client for the Home Assistant REST + event stream APIs

pub mod client;
pub mod error;
pub mod sender;
pub mod services;
pub mod states;
pub mod stream;
pub mod transport;

pub use client::{Client, Credentials};
pub use error::Error;
pub use sender::{BoxError, HttpSend};
pub use states::{State, StateAttributes};
pub use stream::{EventStream, StateChange, StateChangedEvent};
pub use transport::{RetryPolicy, TlsMode, TransportConfig, WriteStatusPolicy};
