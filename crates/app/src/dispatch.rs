//! Event→target resolution rules for the touch strip.
//!
//! Pure policy: no session state. The constants are pinned by the
//! acceptance tests; changing them changes which dial a touch lands on and
//! how far a drag must travel to flip pages.

use deckhand_domain::event::TouchPoint;

/// Touch strip width in pixels.
pub const TOUCH_STRIP_WIDTH: u16 = 800;

/// Net horizontal displacement, in pixels, a drag must exceed to navigate.
pub const DRAG_NAV_THRESHOLD: i32 = 50;

/// Direction a drag navigates the home rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragDirection {
    /// Rightward drag: next page.
    Next,
    /// Leftward drag: previous page.
    Previous,
}

/// Map an x coordinate to a dial zone: the strip divides into `dial_count`
/// equal zones. Returns `None` for coordinates off the strip or when the
/// page has no dials.
#[must_use]
pub fn dial_zone(x: u16, dial_count: usize) -> Option<usize> {
    if dial_count == 0 || x >= TOUCH_STRIP_WIDTH {
        return None;
    }
    let zone = usize::from(x) * dial_count / usize::from(TOUCH_STRIP_WIDTH);
    Some(zone.min(dial_count - 1))
}

/// Classify a drag by its net horizontal displacement, or `None` when it
/// stays under the navigation threshold.
#[must_use]
pub fn drag_direction(from: TouchPoint, to: TouchPoint) -> Option<DragDirection> {
    let dx = i32::from(to.x) - i32::from(from.x);
    if dx > DRAG_NAV_THRESHOLD {
        Some(DragDirection::Next)
    } else if dx < -DRAG_NAV_THRESHOLD {
        Some(DragDirection::Previous)
    } else {
        None
    }
}
