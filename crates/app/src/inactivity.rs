//! Return-to-home timing — generation-counted arming.
//!
//! Arming bumps a generation counter and hands the new generation to a
//! sleeping task; when the task wakes it presents its generation, and only
//! the latest one may act. Cancel is another bump. This keeps arm, cancel,
//! and fire mutually atomic under the session lock without holding the lock
//! across the sleep.

use std::time::Duration;

use deckhand_domain::control::Page;
use deckhand_domain::layout::ReturnToHome;

/// Per-session arming state. Lives inside the session lock.
#[derive(Debug)]
pub struct InactivityState {
    rule: Option<ReturnToHome>,
    generation: u64,
}

impl InactivityState {
    /// Build from the layout's auto-return rule; `None` disables the timer
    /// globally and the state stays idle forever.
    #[must_use]
    pub fn new(rule: Option<ReturnToHome>) -> Self {
        Self {
            rule,
            generation: 0,
        }
    }

    /// Name of the configured home page, when auto-return is enabled.
    #[must_use]
    pub fn home_page(&self) -> Option<&str> {
        self.rule.as_ref().map(|rule| rule.home_page.as_str())
    }

    /// Arm (or re-arm) the timer: invalidates any pending fire and returns
    /// the generation plus idle window the replacement task must carry.
    /// Returns `None` when auto-return is disabled.
    pub fn arm(&mut self) -> Option<(u64, Duration)> {
        let window = self.rule.as_ref()?.idle_window();
        self.generation += 1;
        Some((self.generation, window))
    }

    /// Invalidate any pending fire without scheduling a replacement.
    pub fn cancel(&mut self) {
        self.generation += 1;
    }

    /// Whether a waking task still holds the latest armed generation.
    #[must_use]
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }
}

/// Whether activity on this page arms (or extends) the timer. Detached
/// pages are always eligible; home pages opt out via their flag.
#[must_use]
pub fn page_arms_timer(detached: bool, page: &Page) -> bool {
    detached || page.close_on_inactivity_timer
}
