//! Deck session — the single mutual-exclusion domain for navigation, entity
//! state, and timers.
//!
//! Hardware callbacks, the remote receive loop, and return-to-home wakeups
//! all funnel through one `tokio::sync::Mutex`. Each callback body runs to
//! completion under the lock, snapshots whatever rendering needs, then
//! releases; rendering and outbound commands proceed outside the lock so a
//! slow renderer or remote store never blocks input.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use deckhand_domain::control::{Button, SpecialType};
use deckhand_domain::entity::EntityState;
use deckhand_domain::error::{DeckError, LayoutError, NavigationError, UnboundEntityError};
use deckhand_domain::event::{DialEvent, StateChanged, TouchEvent};
use deckhand_domain::id::EntityId;
use deckhand_domain::layout::Layout;
use deckhand_domain::service::ServiceCall;

use crate::dispatch::{DragDirection, dial_zone, drag_direction};
use crate::inactivity::{InactivityState, page_arms_timer};
use crate::navigator::Navigator;
use crate::ports::{CommandSink, DirtySet, RenderFrame, RenderSink};
use crate::store::StateStore;

/// Everything the lock guards.
struct SessionState {
    navigator: Navigator,
    store: StateStore,
    inactivity: InactivityState,
    pressed: HashMap<u8, PressRecord>,
    closed: bool,
}

/// A key currently held down.
///
/// The button is captured at press time: a press that switches pages must
/// not resolve its release against whatever sits at the same key index on
/// the new page.
struct PressRecord {
    at: Instant,
    button: Button,
    acted: bool,
}

impl SessionState {
    /// Re-hydrate the visible page's dials from the entity store.
    fn rehydrate_current(&mut self) {
        let page = self.navigator.current_page_mut();
        for dial in &mut page.dials {
            let Some(entity_id) = dial.entity_id.clone() else {
                continue;
            };
            if let Some(state) = self.store.get(&entity_id) {
                dial.rehydrate(state);
            }
        }
    }

    /// Full-page redraw snapshot of the visible page.
    fn full_frame(&self) -> RenderFrame {
        RenderFrame::full(self.navigator.current_page().clone())
    }

    /// Feed the any-activity transition: re-arm the timer when the page now
    /// visible is eligible, otherwise leave any armed timer running.
    fn arm_if_eligible(&mut self) -> Option<(u64, Duration)> {
        let detached = self.navigator.is_detached();
        if page_arms_timer(detached, self.navigator.current_page()) {
            self.inactivity.arm()
        } else {
            None
        }
    }
}

/// Run a special-type button, returning the redraw it caused (if any).
fn apply_special(
    state: &mut SessionState,
    special: &SpecialType,
) -> Result<Option<RenderFrame>, NavigationError> {
    let frame = match special {
        SpecialType::GoToPage(target) => {
            state.navigator.to_page(target)?;
            state.rehydrate_current();
            Some(state.full_frame())
        }
        SpecialType::ClosePage => {
            if state.navigator.close_detached() {
                state.rehydrate_current();
                Some(state.full_frame())
            } else {
                None
            }
        }
        SpecialType::NextPage => {
            state.navigator.next_page();
            state.rehydrate_current();
            Some(state.full_frame())
        }
        SpecialType::PreviousPage => {
            state.navigator.previous_page();
            state.rehydrate_current();
            Some(state.full_frame())
        }
        SpecialType::Reload => {
            state.rehydrate_current();
            Some(state.full_frame())
        }
        SpecialType::TurnOff | SpecialType::Empty => None,
    };
    Ok(frame)
}

/// Handle to one device session.
///
/// Cheap to clone; every clone shares the same lock, command sink, and
/// renderer. Hardware drivers call `handle_key`/`handle_dial`/`handle_touch`,
/// the transport's receive loop calls `handle_state_changed`.
pub struct DeckSession<C, R> {
    state: Arc<Mutex<SessionState>>,
    commands: Arc<C>,
    renderer: Arc<R>,
}

impl<C, R> Clone for DeckSession<C, R> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            commands: Arc::clone(&self.commands),
            renderer: Arc::clone(&self.renderer),
        }
    }
}

impl<C, R> DeckSession<C, R>
where
    C: CommandSink + Send + Sync + 'static,
    R: RenderSink + Send + Sync + 'static,
{
    /// Validate the layout and build a session starting on the first home
    /// page with an empty entity store.
    ///
    /// # Errors
    ///
    /// Returns the [`LayoutError`] that makes the layout unusable; this is
    /// the only failure class that should abort startup.
    pub fn new(layout: Layout, commands: C, renderer: R) -> Result<Self, LayoutError> {
        let inactivity = InactivityState::new(layout.return_to_home.clone());
        let navigator = Navigator::new(layout)?;
        Ok(Self {
            state: Arc::new(Mutex::new(SessionState {
                navigator,
                store: StateStore::new(),
                inactivity,
                pressed: HashMap::new(),
                closed: false,
            })),
            commands: Arc::new(commands),
            renderer: Arc::new(renderer),
        })
    }

    /// Bulk-load an entity snapshot (connect time), re-hydrate the visible
    /// page, and draw it.
    pub async fn seed_states(&self, entries: impl IntoIterator<Item = (EntityId, EntityState)>) {
        let frame = {
            let mut state = self.state.lock().await;
            if state.closed {
                return;
            }
            state.store.seed(entries);
            state.rehydrate_current();
            state.full_frame()
        };
        self.renderer.render_page(frame).await;
    }

    /// Dispatch a key press or release.
    ///
    /// Special-type buttons without a hold threshold act on press-down;
    /// command buttons act on release so holding a key cannot double-fire.
    /// Buttons with a `delay` act on release only when held at least that
    /// long. Releases resolve against the button captured at press time, so
    /// a press that switched pages stays inert on release; a release with no
    /// matching press is ignored.
    ///
    /// # Errors
    ///
    /// Returns a typed error for keys without a button, unknown page
    /// targets, or command buttons with nothing to call; the session state
    /// is left untouched in every error case.
    pub async fn handle_key(&self, key: u8, is_pressed: bool) -> Result<(), DeckError> {
        let mut guard = self.state.lock().await;
        if guard.closed {
            debug!(key, "session closed, ignoring key event");
            return Ok(());
        }
        let state = &mut *guard;

        if is_pressed {
            let button = state.navigator.current_page().button(usize::from(key))?.clone();
            let mut acted = false;
            let frame = match &button.special_type {
                Some(special) if button.delay.is_none() => {
                    acted = true;
                    apply_special(state, special)?
                }
                _ => None,
            };
            state.pressed.insert(
                key,
                PressRecord {
                    at: Instant::now(),
                    button,
                    acted,
                },
            );
            drop(guard);
            if let Some(frame) = frame {
                self.renderer.render_page(frame).await;
            }
            return Ok(());
        }

        let Some(record) = state.pressed.remove(&key) else {
            // Release without a matching press.
            return Ok(());
        };
        let held = record.at.elapsed();
        let button = record.button;

        let mut frame = None;
        let mut command = None;
        if record.acted {
            // The special action already ran on press-down; the release
            // completes the press and only feeds the tracker.
        } else if let Some(delay) = button.delay
            && held.as_secs_f64() < delay
        {
            debug!(
                key,
                held_ms = u64::try_from(held.as_millis()).unwrap_or(u64::MAX),
                "press released under hold threshold, ignored"
            );
        } else {
            match &button.special_type {
                Some(special) => frame = apply_special(state, special)?,
                None => command = Some(button.service_call()?),
            }
        }
        let armed = state.arm_if_eligible();
        drop(guard);

        if let Some(frame) = frame {
            self.renderer.render_page(frame).await;
        }
        if let Some(call) = command {
            self.spawn_command(call);
        }
        self.schedule_fire(armed);
        Ok(())
    }

    /// Dispatch a dial rotation or press.
    ///
    /// Rotations step the dial's bounded value by `detents × step`, clamp,
    /// apply the result optimistically for immediate feedback, and issue the
    /// set-value command. Presses issue the push service call unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ControlIndexError`](deckhand_domain::error::ControlIndexError)
    /// for positions without a dial and [`UnboundEntityError`] for actions on
    /// dials without an entity; no state is mutated on either.
    pub async fn handle_dial(&self, index: usize, event: DialEvent) -> Result<(), DeckError> {
        let mut guard = self.state.lock().await;
        if guard.closed {
            debug!(index, "session closed, ignoring dial event");
            return Ok(());
        }
        let state = &mut *guard;

        let page = state.navigator.current_page_mut();
        let dial = page.dial_mut(index)?;
        let entity_id = dial.entity_id.clone();

        let mut command = None;
        let mut turned = false;
        match event {
            DialEvent::Turn(detents) => match dial.turn.as_mut() {
                Some(turn) => {
                    let entity_id =
                        entity_id.ok_or(UnboundEntityError { action: "dial turn" })?;
                    let value = turn.properties.apply_detents(f64::from(detents));
                    command = Some(turn.set_value_call(&entity_id, value));
                    turned = true;
                }
                None => debug!(index, "dial has no turn action, ignoring rotation"),
            },
            DialEvent::Push => match &dial.push {
                Some(push) => {
                    let entity_id =
                        entity_id.ok_or(UnboundEntityError { action: "dial push" })?;
                    command = Some(push.call(&entity_id));
                }
                None => debug!(index, "dial has no push action, ignoring press"),
            },
        }

        let frame = turned.then(|| RenderFrame {
            page: state.navigator.current_page().clone(),
            dirty: DirtySet::Controls {
                buttons: Vec::new(),
                dials: vec![index],
            },
        });
        let armed = state.arm_if_eligible();
        drop(guard);

        if let Some(frame) = frame {
            self.renderer.render_page(frame).await;
        }
        if let Some(call) = command {
            self.spawn_command(call);
        }
        self.schedule_fire(armed);
        Ok(())
    }

    /// Dispatch a touch-strip gesture.
    ///
    /// Drags past the navigation threshold move the home rotation; taps map
    /// to the dial zone under the touch and drive the dial to its minimum
    /// (short tap) or maximum (long press), gated on the dial's
    /// `allow_touchscreen_events` flag.
    ///
    /// # Errors
    ///
    /// Returns [`UnboundEntityError`] for a tap on a touch-enabled dial
    /// without an entity. Gestures outside all zones are ignored.
    pub async fn handle_touch(&self, event: TouchEvent) -> Result<(), DeckError> {
        let mut guard = self.state.lock().await;
        if guard.closed {
            debug!("session closed, ignoring touch event");
            return Ok(());
        }
        let state = &mut *guard;

        let mut command = None;
        let mut frame = None;
        match event {
            TouchEvent::Drag { from, to } => match drag_direction(from, to) {
                Some(DragDirection::Next) => {
                    state.navigator.next_page();
                    state.rehydrate_current();
                    frame = Some(state.full_frame());
                }
                Some(DragDirection::Previous) => {
                    state.navigator.previous_page();
                    state.rehydrate_current();
                    frame = Some(state.full_frame());
                }
                None => debug!("drag under navigation threshold, ignored"),
            },
            TouchEvent::ShortTap(point) | TouchEvent::LongPress(point) => {
                let to_max = matches!(event, TouchEvent::LongPress(_));
                let mut dirty_dial = None;
                let page = state.navigator.current_page_mut();
                if let Some(zone) = dial_zone(point.x, page.dials.len()) {
                    let dial = &mut page.dials[zone];
                    let entity_id = dial.entity_id.clone();
                    if !dial.allow_touchscreen_events {
                        debug!(zone, "touch events disabled for dial");
                    } else if let Some(turn) = dial.turn.as_mut() {
                        let entity_id =
                            entity_id.ok_or(UnboundEntityError { action: "touch gesture" })?;
                        let target = if to_max {
                            turn.properties.max()
                        } else {
                            turn.properties.min()
                        };
                        let value = turn.properties.set_value(target);
                        command = Some(turn.set_value_call(&entity_id, value));
                        dirty_dial = Some(zone);
                    } else {
                        debug!(zone, "touched dial has no turn action");
                    }
                } else {
                    debug!(x = point.x, "touch outside dial zones, ignored");
                }
                if let Some(zone) = dirty_dial {
                    frame = Some(RenderFrame {
                        page: state.navigator.current_page().clone(),
                        dirty: DirtySet::Controls {
                            buttons: Vec::new(),
                            dials: vec![zone],
                        },
                    });
                }
            }
        }

        let armed = state.arm_if_eligible();
        drop(guard);

        if let Some(frame) = frame {
            self.renderer.render_page(frame).await;
        }
        if let Some(call) = command {
            self.spawn_command(call);
        }
        self.schedule_fire(armed);
        Ok(())
    }

    /// Apply one authoritative state change from the remote store.
    ///
    /// The store entry is overwritten unconditionally — the remote store
    /// always wins over local optimism, regardless of arrival order. Dials
    /// on the visible page bound to the entity are re-hydrated and the
    /// affected controls redrawn.
    pub async fn handle_state_changed(&self, change: StateChanged) {
        let mut guard = self.state.lock().await;
        if guard.closed {
            return;
        }
        let state = &mut *guard;

        state
            .store
            .set(change.entity_id.clone(), change.new_state);
        let (buttons, dials) = state
            .navigator
            .current_page()
            .controls_bound_to(&change.entity_id);
        if buttons.is_empty() && dials.is_empty() {
            return;
        }

        let page = state.navigator.current_page_mut();
        if let Some(entity_state) = state.store.get(&change.entity_id) {
            for &index in &dials {
                page.dials[index].rehydrate(entity_state);
            }
        }
        let frame = RenderFrame {
            page: state.navigator.current_page().clone(),
            dirty: DirtySet::Controls { buttons, dials },
        };
        drop(guard);
        self.renderer.render_page(frame).await;
    }

    /// Stop accepting callbacks and suppress any pending return-to-home
    /// fire, including one already in flight.
    pub async fn shutdown(&self) {
        let mut state = self.state.lock().await;
        state.closed = true;
        state.inactivity.cancel();
        debug!("deck session shut down");
    }

    /// Name of the currently visible page.
    pub async fn current_page_name(&self) -> String {
        self.state.lock().await.navigator.current_page().name.clone()
    }

    /// Whether an anonymous page is currently detached over the home index.
    pub async fn is_detached(&self) -> bool {
        self.state.lock().await.navigator.is_detached()
    }

    /// Current (possibly optimistic) turn value of the dial at `index`.
    pub async fn dial_value(&self, index: usize) -> Option<f64> {
        let state = self.state.lock().await;
        state
            .navigator
            .current_page()
            .dials
            .get(index)
            .and_then(|dial| dial.turn.as_ref())
            .map(|turn| turn.properties.value())
    }

    /// Issue a command without blocking dispatch. Failures are logged and
    /// left for the next authoritative state change to correct.
    fn spawn_command(&self, call: ServiceCall) {
        let commands = Arc::clone(&self.commands);
        tokio::spawn(async move {
            let service = call.service.clone();
            if let Err(err) = commands.call_service(call).await {
                warn!(%err, %service, "outbound command failed, awaiting next remote sync");
            }
        });
    }

    /// Schedule the return-to-home fire for a freshly armed generation.
    fn schedule_fire(&self, armed: Option<(u64, Duration)>) {
        let Some((generation, window)) = armed else {
            return;
        };
        let session = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(window).await;
            session.fire_return(generation).await;
        });
    }

    /// The timer wakeup: act only when still the latest-armed generation,
    /// then close the detached page or return to the configured home page,
    /// re-reading navigation state at fire time.
    async fn fire_return(&self, generation: u64) {
        let mut guard = self.state.lock().await;
        if guard.closed || !guard.inactivity.is_current(generation) {
            return;
        }
        let state = &mut *guard;
        state.inactivity.cancel();

        let frame = if state.navigator.close_detached() {
            debug!("inactivity timer closed detached page");
            state.rehydrate_current();
            Some(state.full_frame())
        } else {
            let Some(home) = state.inactivity.home_page().map(String::from) else {
                return;
            };
            match state.navigator.to_page_named(&home) {
                Ok(()) => {
                    debug!(%home, "inactivity timer returned to home page");
                    state.rehydrate_current();
                    Some(state.full_frame())
                }
                Err(err) => {
                    // Unreachable on a validated layout; degrade to a no-op.
                    warn!(%err, "return-to-home target missing");
                    None
                }
            }
        };
        drop(guard);
        if let Some(frame) = frame {
            self.renderer.render_page(frame).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::sync::Mutex as StdMutex;

    use deckhand_domain::control::{
        Button, Dial, DialPush, DialTurn, Page, PageTarget, TurnProperties,
    };
    use deckhand_domain::entity::AttributeValue;
    use deckhand_domain::event::TouchPoint;
    use deckhand_domain::layout::ReturnToHome;

    // ── Recording port doubles ─────────────────────────────────────

    #[derive(Default)]
    struct RecordingSink {
        calls: StdMutex<Vec<ServiceCall>>,
    }

    impl RecordingSink {
        fn calls(&self) -> Vec<ServiceCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl CommandSink for RecordingSink {
        fn call_service(
            &self,
            call: ServiceCall,
        ) -> impl Future<Output = Result<(), deckhand_domain::error::RemoteCommandError>> + Send
        {
            self.calls.lock().unwrap().push(call);
            async { Ok(()) }
        }
    }

    #[derive(Default)]
    struct RecordingRenderer {
        frames: StdMutex<Vec<RenderFrame>>,
    }

    impl RecordingRenderer {
        fn frames(&self) -> Vec<RenderFrame> {
            self.frames.lock().unwrap().clone()
        }
    }

    impl RenderSink for RecordingRenderer {
        fn render_page(&self, frame: RenderFrame) -> impl Future<Output = ()> + Send {
            self.frames.lock().unwrap().push(frame);
            async {}
        }
    }

    type TestSession = DeckSession<Arc<RecordingSink>, Arc<RecordingRenderer>>;

    // ── Fixtures ───────────────────────────────────────────────────

    fn number_dial(value: f64, max: f64, step: f64, touch: bool) -> Dial {
        let mut properties = TurnProperties::new(0.0, max, step, "value").unwrap();
        properties.set_value(value);
        Dial {
            entity_id: Some(EntityId::new("input_number.streamdeck")),
            turn: Some(DialTurn {
                service: "input_number.set_value".to_string(),
                service_data: None,
                properties,
            }),
            push: Some(DialPush {
                service: "input_number.increment".to_string(),
                service_data: None,
            }),
            text: None,
            allow_touchscreen_events: touch,
        }
    }

    fn go_to(name: &str) -> Button {
        Button {
            special_type: Some(SpecialType::GoToPage(PageTarget::Name(name.to_string()))),
            ..Button::default()
        }
    }

    fn layout() -> Layout {
        let mut home = Page::new("home");
        home.buttons = vec![
            go_to("second"),
            go_to("overlay"),
            go_to("stay"),
            Button {
                entity_id: Some(EntityId::new("switch.fan")),
                ..Button::default()
            },
            Button {
                entity_id: Some(EntityId::new("switch.fan")),
                delay: Some(0.5),
                ..Button::default()
            },
        ];
        home.dials = vec![number_dial(0.0, 200.0, 5.0, true)];

        let mut second = Page::new("second");
        second.buttons = vec![Button {
            special_type: Some(SpecialType::Empty),
            ..Button::default()
        }];
        second.dials = vec![
            number_dial(0.0, 200.0, 5.0, true),
            number_dial(50.0, 100.0, 1.0, false),
        ];

        let mut stay = Page::new("stay");
        stay.close_on_inactivity_timer = false;
        stay.buttons = vec![Button {
            special_type: Some(SpecialType::Empty),
            ..Button::default()
        }];

        let mut overlay = Page::new("overlay");
        overlay.buttons = vec![Button {
            special_type: Some(SpecialType::ClosePage),
            ..Button::default()
        }];

        Layout {
            pages: vec![Page::new("zero"), home, second, stay],
            anonymous_pages: vec![overlay],
            return_to_home: Some(ReturnToHome {
                home_page: "home".to_string(),
                duration: 0.8,
            }),
        }
    }

    fn session_with(layout: Layout) -> (TestSession, Arc<RecordingSink>, Arc<RecordingRenderer>) {
        let sink = Arc::new(RecordingSink::default());
        let renderer = Arc::new(RecordingRenderer::default());
        let session =
            DeckSession::new(layout, Arc::clone(&sink), Arc::clone(&renderer)).unwrap();
        (session, sink, renderer)
    }

    async fn session_on_home() -> (TestSession, Arc<RecordingSink>, Arc<RecordingRenderer>) {
        let (session, sink, renderer) = session_with(layout());
        session
            .jump_to("home")
            .await;
        (session, sink, renderer)
    }

    impl TestSession {
        /// Test helper: jump straight to a page by name.
        async fn jump_to(&self, name: &str) {
            let mut state = self.state.lock().await;
            state.navigator.to_page_named(name).unwrap();
        }
    }

    async fn press_and_release(session: &TestSession, key: u8) {
        session.handle_key(key, true).await.unwrap();
        session.handle_key(key, false).await.unwrap();
    }

    /// Let spawned fire-and-forget tasks run on the current-thread runtime.
    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    // ── Key dispatch ───────────────────────────────────────────────

    #[tokio::test]
    async fn should_switch_page_within_one_dispatch_when_go_to_page_pressed() {
        let (session, sink, _renderer) = session_on_home().await;

        press_and_release(&session, 0).await;

        assert_eq!(session.current_page_name().await, "second");
        assert!(!session.is_detached().await);
        assert!(sink.calls().is_empty());
    }

    #[tokio::test]
    async fn should_detach_anonymous_page_and_close_it_again() {
        let (session, _sink, _renderer) = session_on_home().await;

        press_and_release(&session, 1).await;
        assert!(session.is_detached().await);
        assert_eq!(session.current_page_name().await, "overlay");

        // The overlay's close-page button restores the home view.
        press_and_release(&session, 0).await;
        assert!(!session.is_detached().await);
        assert_eq!(session.current_page_name().await, "home");
    }

    #[tokio::test]
    async fn should_issue_command_on_release_only() {
        let (session, sink, _renderer) = session_on_home().await;

        session.handle_key(3, true).await.unwrap();
        settle().await;
        assert!(sink.calls().is_empty());

        session.handle_key(3, false).await.unwrap();
        settle().await;
        let calls = sink.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].service, "homeassistant.toggle");
        assert_eq!(calls[0].target, Some(EntityId::new("switch.fan")));
    }

    #[tokio::test(start_paused = true)]
    async fn should_ignore_press_released_under_hold_threshold() {
        let (session, sink, _renderer) = session_on_home().await;

        session.handle_key(4, true).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        session.handle_key(4, false).await.unwrap();
        settle().await;

        assert!(sink.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn should_fire_action_when_held_past_threshold() {
        let (session, sink, _renderer) = session_on_home().await;

        session.handle_key(4, true).await.unwrap();
        tokio::time::sleep(Duration::from_millis(600)).await;
        session.handle_key(4, false).await.unwrap();
        settle().await;

        let calls = sink.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].service, "homeassistant.toggle");
    }

    #[tokio::test]
    async fn should_report_missing_button_without_mutating() {
        let (session, sink, _renderer) = session_on_home().await;

        let result = session.handle_key(7, true).await;
        assert!(matches!(result, Err(DeckError::ControlIndex(_))));
        assert_eq!(session.current_page_name().await, "home");
        assert!(sink.calls().is_empty());
    }

    #[tokio::test]
    async fn should_report_unknown_page_target_without_mutating() {
        let mut overlay = Page::new("home");
        overlay.buttons = vec![go_to("garage")];
        let layout = Layout {
            pages: vec![overlay],
            anonymous_pages: Vec::new(),
            return_to_home: None,
        };
        let (session, _sink, _renderer) = session_with(layout);

        let result = session.handle_key(0, true).await;
        assert!(matches!(
            result,
            Err(DeckError::Navigation(NavigationError::UnknownName(_)))
        ));
        assert_eq!(session.current_page_name().await, "home");
    }

    // ── Dial dispatch ──────────────────────────────────────────────

    #[tokio::test]
    async fn should_step_dial_and_issue_clamped_value() {
        let (session, sink, _renderer) = session_on_home().await;

        session.handle_dial(0, DialEvent::Turn(1)).await.unwrap();
        settle().await;

        assert_eq!(session.dial_value(0).await, Some(5.0));
        let calls = sink.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].service, "input_number.set_value");
        assert_eq!(calls[0].data["value"], serde_json::json!(5.0));
        assert_eq!(
            calls[0].target,
            Some(EntityId::new("input_number.streamdeck"))
        );
    }

    #[tokio::test]
    async fn should_clamp_turn_exactly_at_maximum() {
        let mut page = Page::new("home");
        page.dials = vec![number_dial(98.0, 100.0, 5.0, false)];
        let layout = Layout {
            pages: vec![page],
            anonymous_pages: Vec::new(),
            return_to_home: None,
        };
        let (session, sink, _renderer) = session_with(layout);

        session.handle_dial(0, DialEvent::Turn(1)).await.unwrap();
        settle().await;

        assert_eq!(session.dial_value(0).await, Some(100.0));
        assert_eq!(sink.calls()[0].data["value"], serde_json::json!(100.0));
    }

    #[tokio::test]
    async fn should_issue_push_service_without_value_change() {
        let (session, sink, _renderer) = session_on_home().await;

        session.handle_dial(0, DialEvent::Push).await.unwrap();
        settle().await;

        assert_eq!(session.dial_value(0).await, Some(0.0));
        let calls = sink.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].service, "input_number.increment");
    }

    #[tokio::test]
    async fn should_report_missing_dial_without_mutating() {
        let (session, sink, _renderer) = session_on_home().await;

        let result = session.handle_dial(5, DialEvent::Turn(1)).await;
        assert!(matches!(result, Err(DeckError::ControlIndex(_))));
        assert!(sink.calls().is_empty());
    }

    #[tokio::test]
    async fn should_report_unbound_entity_for_entityless_dial_turn() {
        let mut page = Page::new("home");
        let mut dial = number_dial(0.0, 100.0, 1.0, false);
        dial.entity_id = None;
        page.dials = vec![dial];
        let layout = Layout {
            pages: vec![page],
            anonymous_pages: Vec::new(),
            return_to_home: None,
        };
        let (session, sink, _renderer) = session_with(layout);

        let result = session.handle_dial(0, DialEvent::Turn(1)).await;
        assert!(matches!(result, Err(DeckError::UnboundEntity(_))));
        // The optimistic value must not move on an error path.
        assert_eq!(session.dial_value(0).await, Some(0.0));
        assert!(sink.calls().is_empty());
    }

    // ── Touch dispatch ─────────────────────────────────────────────

    #[tokio::test]
    async fn should_set_dial_to_minimum_on_short_tap() {
        let (session, sink, _renderer) = session_on_home().await;
        session.handle_dial(0, DialEvent::Turn(4)).await.unwrap();

        session
            .handle_touch(TouchEvent::ShortTap(TouchPoint::new(100, 50)))
            .await
            .unwrap();
        settle().await;

        assert_eq!(session.dial_value(0).await, Some(0.0));
        let calls = sink.calls();
        assert_eq!(calls.last().unwrap().data["value"], serde_json::json!(0.0));
    }

    #[tokio::test]
    async fn should_set_dial_to_maximum_on_long_press() {
        let (session, sink, _renderer) = session_on_home().await;

        session
            .handle_touch(TouchEvent::LongPress(TouchPoint::new(100, 50)))
            .await
            .unwrap();
        settle().await;

        assert_eq!(session.dial_value(0).await, Some(200.0));
        assert_eq!(
            sink.calls().last().unwrap().data["value"],
            serde_json::json!(200.0)
        );
    }

    #[tokio::test]
    async fn should_ignore_taps_on_touch_disabled_dials() {
        let (session, sink, _renderer) = session_on_home().await;
        session.jump_to("second").await;

        // Zone 1 of two dials starts at x = 400; dial 1 has touch disabled.
        session
            .handle_touch(TouchEvent::ShortTap(TouchPoint::new(500, 50)))
            .await
            .unwrap();
        settle().await;

        assert_eq!(session.dial_value(1).await, Some(50.0));
        assert!(sink.calls().is_empty());
    }

    #[tokio::test]
    async fn should_navigate_next_on_rightward_drag() {
        let (session, _sink, _renderer) = session_on_home().await;

        session
            .handle_touch(TouchEvent::Drag {
                from: TouchPoint::new(0, 0),
                to: TouchPoint::new(100, 0),
            })
            .await
            .unwrap();

        assert_eq!(session.current_page_name().await, "second");
    }

    #[tokio::test]
    async fn should_navigate_previous_on_leftward_drag_with_wrap() {
        let (session, _sink, _renderer) = session_with(layout());
        assert_eq!(session.current_page_name().await, "zero");

        session
            .handle_touch(TouchEvent::Drag {
                from: TouchPoint::new(300, 0),
                to: TouchPoint::new(100, 0),
            })
            .await
            .unwrap();

        assert_eq!(session.current_page_name().await, "stay");
    }

    #[tokio::test]
    async fn should_ignore_drag_under_threshold() {
        let (session, _sink, _renderer) = session_on_home().await;

        session
            .handle_touch(TouchEvent::Drag {
                from: TouchPoint::new(100, 0),
                to: TouchPoint::new(130, 0),
            })
            .await
            .unwrap();

        assert_eq!(session.current_page_name().await, "home");
    }

    // ── Remote state synchronization ───────────────────────────────

    #[tokio::test]
    async fn should_let_authoritative_state_overwrite_optimistic_value() {
        let (session, _sink, renderer) = session_on_home().await;

        session.handle_dial(0, DialEvent::Turn(1)).await.unwrap();
        assert_eq!(session.dial_value(0).await, Some(5.0));

        let change = StateChanged {
            entity_id: EntityId::new("input_number.streamdeck"),
            old_state: None,
            new_state: EntityState::new("1")
                .with_attribute("min", AttributeValue::Int(0))
                .with_attribute("max", AttributeValue::Int(200))
                .with_attribute("step", AttributeValue::Int(5)),
        };
        session.handle_state_changed(change).await;

        assert_eq!(session.dial_value(0).await, Some(1.0));
        let frames = renderer.frames();
        assert!(matches!(
            frames.last().unwrap().dirty,
            DirtySet::Controls { ref dials, .. } if dials == &[0]
        ));
    }

    #[tokio::test]
    async fn should_not_render_for_entities_off_the_visible_page() {
        let (session, _sink, renderer) = session_on_home().await;
        let frames_before = renderer.frames().len();

        session
            .handle_state_changed(StateChanged {
                entity_id: EntityId::new("sensor.outside_temperature"),
                old_state: None,
                new_state: EntityState::new("21.5"),
            })
            .await;

        assert_eq!(renderer.frames().len(), frames_before);
    }

    #[tokio::test]
    async fn should_rehydrate_dials_when_switching_pages() {
        let (session, _sink, _renderer) = session_on_home().await;

        session
            .handle_state_changed(StateChanged {
                entity_id: EntityId::new("input_number.streamdeck"),
                old_state: None,
                new_state: EntityState::new("42"),
            })
            .await;

        // "second" binds the same entity; its dial picks the stored value up
        // on switch instead of keeping its configured one.
        press_and_release(&session, 0).await;
        assert_eq!(session.current_page_name().await, "second");
        assert_eq!(session.dial_value(0).await, Some(42.0));
    }

    // ── Return-to-home timer ───────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn should_return_home_after_idle_window() {
        let (session, _sink, _renderer) = session_on_home().await;

        press_and_release(&session, 0).await;
        assert_eq!(session.current_page_name().await, "second");

        tokio::time::sleep(Duration::from_millis(900)).await;
        assert_eq!(session.current_page_name().await, "home");
    }

    #[tokio::test(start_paused = true)]
    async fn should_close_detached_page_on_fire() {
        let (session, _sink, _renderer) = session_on_home().await;

        press_and_release(&session, 1).await;
        assert!(session.is_detached().await);

        tokio::time::sleep(Duration::from_millis(900)).await;
        assert!(!session.is_detached().await);
        assert_eq!(session.current_page_name().await, "home");
    }

    #[tokio::test(start_paused = true)]
    async fn should_debounce_rearm_to_last_activity_plus_window() {
        let (session, _sink, _renderer) = session_on_home().await;

        press_and_release(&session, 0).await;
        tokio::time::sleep(Duration::from_millis(500)).await;
        session.handle_dial(0, DialEvent::Turn(1)).await.unwrap();

        // Past the first deadline but inside the re-armed one.
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(session.current_page_name().await, "second");

        // Past last-activity + window.
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(session.current_page_name().await, "home");
    }

    #[tokio::test(start_paused = true)]
    async fn should_not_arm_on_pages_with_timer_disabled() {
        let (session, _sink, _renderer) = session_on_home().await;

        press_and_release(&session, 2).await;
        assert_eq!(session.current_page_name().await, "stay");

        tokio::time::sleep(Duration::from_millis(2_000)).await;
        assert_eq!(session.current_page_name().await, "stay");
    }

    #[tokio::test(start_paused = true)]
    async fn should_let_armed_timer_fire_across_ineligible_pages() {
        let (session, _sink, _renderer) = session_on_home().await;

        // Activity on an eligible page arms the timer…
        session.handle_dial(0, DialEvent::Turn(1)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;

        // …then the display moves to a timer-exempt page, which neither
        // cancels nor extends the armed deadline.
        session.jump_to("stay").await;
        tokio::time::sleep(Duration::from_millis(700)).await;

        assert_eq!(session.current_page_name().await, "home");
    }

    #[tokio::test(start_paused = true)]
    async fn should_arm_on_detached_pages_regardless_of_flag() {
        let mut overlay = Page::new("overlay");
        overlay.close_on_inactivity_timer = false;
        overlay.buttons = vec![Button {
            special_type: Some(SpecialType::Empty),
            ..Button::default()
        }];
        let mut home = Page::new("home");
        home.buttons = vec![go_to("overlay")];
        let layout = Layout {
            pages: vec![home],
            anonymous_pages: vec![overlay],
            return_to_home: Some(ReturnToHome {
                home_page: "home".to_string(),
                duration: 0.8,
            }),
        };
        let (session, _sink, _renderer) = session_with(layout);

        press_and_release(&session, 0).await;
        assert!(session.is_detached().await);

        tokio::time::sleep(Duration::from_millis(900)).await;
        assert!(!session.is_detached().await);
        assert_eq!(session.current_page_name().await, "home");
    }

    #[tokio::test(start_paused = true)]
    async fn should_keep_timer_idle_when_disabled_globally() {
        let mut layout = layout();
        layout.return_to_home = None;
        let (session, _sink, _renderer) = session_with(layout);
        session.jump_to("home").await;

        press_and_release(&session, 0).await;
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(session.current_page_name().await, "second");
    }

    // ── Shutdown ───────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn should_suppress_pending_fire_on_shutdown() {
        let (session, _sink, _renderer) = session_on_home().await;

        press_and_release(&session, 0).await;
        session.shutdown().await;

        tokio::time::sleep(Duration::from_millis(2_000)).await;
        assert_eq!(session.current_page_name().await, "second");
    }

    #[tokio::test]
    async fn should_ignore_events_after_shutdown() {
        let (session, sink, _renderer) = session_on_home().await;
        session.shutdown().await;

        session.handle_key(0, true).await.unwrap();
        session.handle_dial(0, DialEvent::Turn(1)).await.unwrap();
        settle().await;

        assert_eq!(session.current_page_name().await, "home");
        assert!(sink.calls().is_empty());
    }
}
