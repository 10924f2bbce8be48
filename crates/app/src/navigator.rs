//! Page navigator — the home rotation index and the detached-page slot.
//!
//! All mutable navigation state lives here, owned by the session and only
//! ever touched under its lock. Exactly one of {home index, detached page}
//! resolves as the current page at any time.

use deckhand_domain::control::{Page, PageTarget};
use deckhand_domain::error::{LayoutError, NavigationError};
use deckhand_domain::layout::Layout;

/// Navigation state over a validated [`Layout`].
///
/// The detached slot holds the index of an open anonymous page; while set,
/// it overrides the home index in `current_page()`.
#[derive(Debug)]
pub struct Navigator {
    layout: Layout,
    home_index: usize,
    detached: Option<usize>,
}

impl Navigator {
    /// Validate the layout and start on the first home page.
    ///
    /// # Errors
    ///
    /// Returns the [`LayoutError`] that makes the layout unusable. This is
    /// the construction-time guarantee that `current_page()` can never fail.
    pub fn new(layout: Layout) -> Result<Self, LayoutError> {
        layout.validate()?;
        Ok(Self {
            layout,
            home_index: 0,
            detached: None,
        })
    }

    /// The layout this navigator runs.
    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Whether an anonymous page is currently detached over the home index.
    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.detached.is_some()
    }

    /// The currently visible page: the detached page if set, else the page
    /// at the home index.
    #[must_use]
    pub fn current_page(&self) -> &Page {
        match self.detached {
            Some(index) => &self.layout.anonymous_pages[index],
            None => &self.layout.pages[self.home_index],
        }
    }

    /// Mutable access to the currently visible page (dial re-hydration and
    /// optimistic turn values).
    pub fn current_page_mut(&mut self) -> &mut Page {
        match self.detached {
            Some(index) => &mut self.layout.anonymous_pages[index],
            None => &mut self.layout.pages[self.home_index],
        }
    }

    /// Switch to a page: home targets set the home index and clear the
    /// detached slot; anonymous targets set the detached slot.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError`] when the target matches neither set; the
    /// navigation state is left untouched.
    pub fn to_page(&mut self, target: &PageTarget) -> Result<(), NavigationError> {
        match target {
            PageTarget::Index(index) => {
                if *index >= self.layout.pages.len() {
                    return Err(NavigationError::IndexOutOfRange {
                        index: *index,
                        len: self.layout.pages.len(),
                    });
                }
                self.home_index = *index;
                self.detached = None;
                Ok(())
            }
            PageTarget::Name(name) => self.to_page_named(name),
        }
    }

    /// Switch to a page by name, home pages taking precedence.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError::UnknownName`] when no page carries `name`.
    pub fn to_page_named(&mut self, name: &str) -> Result<(), NavigationError> {
        if let Some(index) = self.layout.pages.iter().position(|page| page.name == name) {
            self.home_index = index;
            self.detached = None;
            return Ok(());
        }
        if let Some(index) = self
            .layout
            .anonymous_pages
            .iter()
            .position(|page| page.name == name)
        {
            self.detached = Some(index);
            return Ok(());
        }
        Err(NavigationError::UnknownName(name.to_string()))
    }

    /// Clear the detached slot, restoring the home index.
    pub fn go_to_home(&mut self) {
        self.detached = None;
    }

    /// Close the detached page if one is open. Returns whether one was.
    pub fn close_detached(&mut self) -> bool {
        self.detached.take().is_some()
    }

    /// Advance the home rotation, wrapping; closes any detached page.
    pub fn next_page(&mut self) {
        self.detached = None;
        self.home_index = (self.home_index + 1) % self.layout.pages.len();
    }

    /// Step the home rotation back, wrapping; closes any detached page.
    pub fn previous_page(&mut self) {
        self.detached = None;
        self.home_index = (self.home_index + self.layout.pages.len() - 1) % self.layout.pages.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn navigator() -> Navigator {
        let layout = Layout {
            pages: vec![Page::new("home"), Page::new("second"), Page::new("third")],
            anonymous_pages: vec![Page::new("overlay")],
            return_to_home: None,
        };
        Navigator::new(layout).unwrap()
    }

    #[test]
    fn should_start_on_first_home_page() {
        let nav = navigator();
        assert_eq!(nav.current_page().name, "home");
        assert!(!nav.is_detached());
    }

    #[test]
    fn should_reject_unvalidatable_layout() {
        assert!(matches!(
            Navigator::new(Layout::default()),
            Err(LayoutError::NoHomePages)
        ));
    }

    #[test]
    fn should_switch_home_page_by_name() {
        let mut nav = navigator();
        nav.to_page_named("second").unwrap();
        assert_eq!(nav.current_page().name, "second");
        assert!(!nav.is_detached());
    }

    #[test]
    fn should_switch_home_page_by_index() {
        let mut nav = navigator();
        nav.to_page(&PageTarget::Index(2)).unwrap();
        assert_eq!(nav.current_page().name, "third");
    }

    #[test]
    fn should_reject_index_beyond_rotation() {
        let mut nav = navigator();
        let err = nav.to_page(&PageTarget::Index(9)).unwrap_err();
        assert_eq!(err, NavigationError::IndexOutOfRange { index: 9, len: 3 });
        assert_eq!(nav.current_page().name, "home");
    }

    #[test]
    fn should_detach_anonymous_page_over_home_index() {
        let mut nav = navigator();
        nav.to_page_named("second").unwrap();
        nav.to_page_named("overlay").unwrap();
        assert!(nav.is_detached());
        assert_eq!(nav.current_page().name, "overlay");

        // The home index is preserved underneath.
        assert!(nav.close_detached());
        assert_eq!(nav.current_page().name, "second");
    }

    #[test]
    fn should_report_unknown_page_without_mutating() {
        let mut nav = navigator();
        let err = nav.to_page_named("garage").unwrap_err();
        assert_eq!(err, NavigationError::UnknownName("garage".to_string()));
        assert_eq!(nav.current_page().name, "home");
    }

    #[test]
    fn should_treat_close_detached_as_noop_when_nothing_detached() {
        let mut nav = navigator();
        assert!(!nav.close_detached());
        assert_eq!(nav.current_page().name, "home");
    }

    #[test]
    fn should_wrap_forward_through_home_rotation() {
        let mut nav = navigator();
        nav.next_page();
        nav.next_page();
        nav.next_page();
        assert_eq!(nav.current_page().name, "home");
    }

    #[test]
    fn should_wrap_backward_through_home_rotation() {
        let mut nav = navigator();
        nav.previous_page();
        assert_eq!(nav.current_page().name, "third");
    }

    #[test]
    fn should_close_detached_page_on_rotation_moves() {
        let mut nav = navigator();
        nav.to_page_named("overlay").unwrap();
        nav.next_page();
        assert!(!nav.is_detached());
        assert_eq!(nav.current_page().name, "second");
    }

    #[test]
    fn should_hold_exactly_one_view_after_any_sequence() {
        let mut nav = navigator();
        let moves: &[fn(&mut Navigator)] = &[
            |n| n.to_page_named("overlay").unwrap(),
            |n| n.next_page(),
            |n| n.to_page_named("overlay").unwrap(),
            |n| n.go_to_home(),
            |n| n.previous_page(),
            |n| {
                n.close_detached();
            },
        ];
        for step in moves {
            step(&mut nav);
            // Resolution never panics and detachment is single-slot.
            let _ = nav.current_page();
        }
        assert!(!nav.is_detached());
    }
}
