//! # deckhandd — deckhand daemon
//!
//! Composition root that wires the transport, session, and renderer together.
//!
//! ## Responsibilities
//! - Parse configuration (`deckhand.toml` + env vars) and the YAML layout
//! - Connect and authenticate against the remote store
//! - Construct the deck session, seed it with the entity snapshot
//! - Pump state-change events into the session until shutdown
//! - Handle graceful shutdown (SIGINT): cancel timers, stop callbacks
//!
//! The hardware driver is an external collaborator: its callbacks call
//! `handle_key` / `handle_dial` / `handle_touch` on a clone of the session
//! handle. Demo mode (`demo.enabled`) replays a scripted interaction through
//! the virtual adapter instead, which exercises the same entry points
//! without hardware or a remote store.
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no dispatch logic belongs here.

mod config;
mod layout;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use deckhand_adapter_hass_ws::{WsConfig, connect};
use deckhand_adapter_virtual::{DeckInput, RecordingCommandSink, ScriptedDeck, TraceRenderer};
use deckhand_app::session::DeckSession;
use deckhand_domain::event::{TouchEvent, TouchPoint};
use deckhand_domain::layout::Layout;

use config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("loading configuration")?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    let layout = layout::load(&config.layout.path)
        .with_context(|| format!("loading layout from {}", config.layout.path))?;
    info!(
        pages = layout.pages.len(),
        anonymous = layout.anonymous_pages.len(),
        "layout loaded"
    );

    if config.demo.enabled {
        return run_demo(layout).await;
    }

    let ws = WsConfig {
        url: config.connection.url.clone(),
        access_token: config.connection.token.clone(),
    };
    let (client, mut pump, snapshot) =
        connect(&ws).await.context("connecting to remote store")?;

    let session = DeckSession::new(layout, client, TraceRenderer)?;
    session.seed_states(snapshot).await;

    loop {
        tokio::select! {
            change = pump.next_change() => match change.context("event stream failed")? {
                Some(change) => session.handle_state_changed(change).await,
                None => {
                    warn!("event stream ended");
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                break;
            }
        }
    }

    session.shutdown().await;
    Ok(())
}

/// Replay a scripted interaction against the layout: drag once around the
/// home rotation, then step the first dial of the first page.
async fn run_demo(layout: Layout) -> anyhow::Result<()> {
    info!("running in demo mode, no remote store contacted");
    let sink = Arc::new(RecordingCommandSink::default());
    let session = DeckSession::new(layout.clone(), Arc::clone(&sink), TraceRenderer)?;
    session.seed_states(Vec::new()).await;

    let mut inputs = Vec::new();
    for _ in 0..layout.pages.len() {
        inputs.push(DeckInput::Touch(TouchEvent::Drag {
            from: TouchPoint::new(100, 50),
            to: TouchPoint::new(300, 50),
        }));
        inputs.push(DeckInput::Wait(Duration::from_millis(250)));
    }
    let script = ScriptedDeck::new(inputs).turn(0, 1).wait(Duration::from_millis(250));

    if let Err(err) = script.drive(&session).await {
        warn!(%err, "demo script stopped early");
    }

    let page = session.current_page_name().await;
    info!(%page, commands = sink.calls().len(), "demo finished");
    session.shutdown().await;
    Ok(())
}
