//! # deckhand-adapter-hass-ws
//!
//! WebSocket transport adapter for a Home-Assistant-style remote store.
//!
//! ## Responsibilities
//! - Connect and run the auth handshake (`auth_required` → `auth` →
//!   `auth_ok`)
//! - Fetch the initial entity snapshot (`get_states`) for store seeding
//! - Subscribe to `state_changed` events and pump them into the session
//! - Deliver service calls ([`CommandSink`](deckhand_app::ports::CommandSink))
//!
//! Reconnect and keepalive policy are deliberately absent: when the stream
//! ends, [`EventPump::next_change`] returns and the composition root decides
//! what to do.
//!
//! ## Dependency rule
//! Depends on `deckhand-app` (port traits) and `deckhand-domain` only.

mod client;
mod error;
mod protocol;

pub use client::{HassClient, EventPump, WsConfig, connect};
pub use error::WsError;
