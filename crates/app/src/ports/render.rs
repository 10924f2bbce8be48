//! Render port — redraw requests for the control surface.

use std::future::Future;

use deckhand_domain::control::Page;

/// Which controls changed since the last render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirtySet {
    /// Redraw every control on the page (page switch, reload, seeding).
    Full,
    /// Redraw only the listed control indices.
    Controls {
        buttons: Vec<usize>,
        dials: Vec<usize>,
    },
}

/// One redraw request: a snapshot of the visible page plus the dirty set.
///
/// The snapshot is taken under the session lock and handed out by value, so
/// rendering proceeds without holding up event dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub page: Page,
    pub dirty: DirtySet,
}

impl RenderFrame {
    /// A full-page redraw of `page`.
    #[must_use]
    pub fn full(page: Page) -> Self {
        Self {
            page,
            dirty: DirtySet::Full,
        }
    }
}

/// Receives redraw requests after every visible mutation.
pub trait RenderSink {
    /// Render one frame. Rendering failures are the renderer's to handle;
    /// the core has nothing useful to do with them.
    fn render_page(&self, frame: RenderFrame) -> impl Future<Output = ()> + Send;
}

impl<T: RenderSink + Send + Sync> RenderSink for std::sync::Arc<T> {
    fn render_page(&self, frame: RenderFrame) -> impl Future<Output = ()> + Send {
        (**self).render_page(frame)
    }
}
