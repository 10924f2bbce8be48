//! # deckhand-app
//!
//! The dispatch core — everything between raw input events and the port
//! boundaries.
//!
//! ## Responsibilities
//! - Define **port traits** that adapters implement (driven/outbound ports):
//!   - `CommandSink` — fire-and-forget service calls to the remote store
//!   - `RenderSink` — page/control redraw requests
//! - Own the **session state** behind one mutual-exclusion domain:
//!   - `Navigator` — home rotation index + detached-page slot
//!   - `StateStore` — in-memory mirror of the remote entity store
//!   - `InactivityState` — generation-counted return-to-home arming
//! - Dispatch hardware events (`handle_key`, `handle_dial`, `handle_touch`)
//!   and remote state changes (`handle_state_changed`) through
//!   [`session::DeckSession`]
//!
//! ## Dependency rule
//! Depends on `deckhand-domain` only (plus `tokio::sync`/`tokio::time`).
//! Never imports adapter crates. Adapters depend on *this* crate, not the
//! reverse.

pub mod dispatch;
pub mod inactivity;
pub mod navigator;
pub mod ports;
pub mod session;
pub mod store;
