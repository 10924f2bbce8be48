//! # deckhand-adapter-virtual
//!
//! Simulated control surface standing in for real hardware.
//!
//! ## Provided pieces
//!
//! | Piece | Stands in for | Behaviour |
//! |-------|---------------|-----------|
//! | [`ScriptedDeck`] | the hardware driver | replays a scripted event sequence into a session |
//! | [`RecordingCommandSink`] | the remote store | records service calls, always succeeds |
//! | [`RecordingRenderer`] | the renderer | records render frames |
//! | [`TraceRenderer`] | the renderer | logs render frames via `tracing` |
//!
//! Demos and the integration tests run entire sessions against these
//! without a deck plugged in or a remote store reachable.
//!
//! ## Dependency rule
//!
//! Depends on `deckhand-app` (port traits) and `deckhand-domain` only.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use tracing::info;

use deckhand_app::ports::{CommandSink, DirtySet, RenderFrame, RenderSink};
use deckhand_app::session::DeckSession;
use deckhand_domain::error::{DeckError, RemoteCommandError};
use deckhand_domain::event::{DialEvent, TouchEvent};
use deckhand_domain::service::ServiceCall;

/// One scripted input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckInput {
    /// A key going down or up.
    Key { key: u8, pressed: bool },
    /// A dial rotation or press.
    Dial { index: usize, event: DialEvent },
    /// A touch-strip gesture.
    Touch(TouchEvent),
    /// Idle time between inputs.
    Wait(Duration),
}

/// A hardware driver replaced by a script.
///
/// Replays its inputs in order against a session, the way the real driver
/// would invoke the session's callbacks.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDeck {
    inputs: Vec<DeckInput>,
}

impl ScriptedDeck {
    /// Build a deck from a script.
    #[must_use]
    pub fn new(inputs: Vec<DeckInput>) -> Self {
        Self { inputs }
    }

    /// Append a press-and-release of `key`.
    #[must_use]
    pub fn tap(mut self, key: u8) -> Self {
        self.inputs.push(DeckInput::Key { key, pressed: true });
        self.inputs.push(DeckInput::Key { key, pressed: false });
        self
    }

    /// Append a dial rotation.
    #[must_use]
    pub fn turn(mut self, index: usize, detents: i32) -> Self {
        self.inputs.push(DeckInput::Dial {
            index,
            event: DialEvent::Turn(detents),
        });
        self
    }

    /// Append idle time.
    #[must_use]
    pub fn wait(mut self, duration: Duration) -> Self {
        self.inputs.push(DeckInput::Wait(duration));
        self
    }

    /// Replay the script into `session`.
    ///
    /// # Errors
    ///
    /// Stops at the first dispatch error and returns it, the way a driver
    /// callback would surface it.
    pub async fn drive<C, R>(&self, session: &DeckSession<C, R>) -> Result<(), DeckError>
    where
        C: CommandSink + Send + Sync + 'static,
        R: RenderSink + Send + Sync + 'static,
    {
        for input in &self.inputs {
            match *input {
                DeckInput::Key { key, pressed } => session.handle_key(key, pressed).await?,
                DeckInput::Dial { index, event } => session.handle_dial(index, event).await?,
                DeckInput::Touch(event) => session.handle_touch(event).await?,
                DeckInput::Wait(duration) => tokio::time::sleep(duration).await,
            }
        }
        Ok(())
    }
}

/// A remote store that swallows service calls and records them.
#[derive(Debug, Default)]
pub struct RecordingCommandSink {
    calls: Mutex<Vec<ServiceCall>>,
}

impl RecordingCommandSink {
    /// All calls received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<ServiceCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl CommandSink for RecordingCommandSink {
    fn call_service(
        &self,
        call: ServiceCall,
    ) -> impl Future<Output = Result<(), RemoteCommandError>> + Send {
        self.calls.lock().unwrap().push(call);
        async { Ok(()) }
    }
}

/// A renderer that records every frame.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    frames: Mutex<Vec<RenderFrame>>,
}

impl RecordingRenderer {
    /// All frames received so far.
    #[must_use]
    pub fn frames(&self) -> Vec<RenderFrame> {
        self.frames.lock().unwrap().clone()
    }
}

impl RenderSink for RecordingRenderer {
    fn render_page(&self, frame: RenderFrame) -> impl Future<Output = ()> + Send {
        self.frames.lock().unwrap().push(frame);
        async {}
    }
}

/// A renderer that logs what it would draw.
///
/// Used by the daemon until a real pixel pipeline is wired in.
#[derive(Debug, Clone, Copy, Default)]
pub struct TraceRenderer;

impl RenderSink for TraceRenderer {
    fn render_page(&self, frame: RenderFrame) -> impl Future<Output = ()> + Send {
        match &frame.dirty {
            DirtySet::Full => info!(
                page = %frame.page.name,
                buttons = frame.page.buttons.len(),
                dials = frame.page.dials.len(),
                "render full page"
            ),
            DirtySet::Controls { buttons, dials } => info!(
                page = %frame.page.name,
                ?buttons,
                ?dials,
                "render dirty controls"
            ),
        }
        async {}
    }
}
