//! # deckhand-domain
//!
//! Pure domain model for the deckhand control-surface daemon.
//!
//! ## Responsibilities
//! - Foundational types: entity identifiers, error conventions, timestamps
//! - Define **Controls** (buttons, dials with bounded turn state, pages)
//! - Define the **Layout** (the validated page graph a deck session runs)
//! - Define **Entity state** (the remote store's state + attribute model)
//! - Define **Service calls** (outbound commands to the remote store)
//! - Define **Events** (hardware input and remote state-change records)
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod control;
pub mod entity;
pub mod error;
pub mod event;
pub mod id;
pub mod layout;
pub mod service;
pub mod time;
