//! Device-level ergonomics over [`hearth_api`].
//!
//! `hearth-api` speaks the hub's wire protocol; this crate adds the thin
//! domain layer consumers actually want to hold:
//!
//! - **[`EntityId`]** — typed `<domain>.<object_id>` identifier with
//!   domain/object accessors.
//! - **[`Device`]** — a capability wrapper (`turn_on` / `turn_off` /
//!   `toggle`) selected by domain prefix from a registration table.
//!   Unknown domains are rejected with a typed
//!   [`CoreError::UnsupportedDomain`], not a stringly error.

pub mod device;
pub mod entity;
pub mod error;

pub use device::{Device, DeviceKind, is_supported, supported_domains};
pub use entity::EntityId;
pub use error::CoreError;
