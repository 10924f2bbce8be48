//! Error taxonomy for the dispatch core.
//!
//! Per-event errors ([`NavigationError`], [`ControlIndexError`],
//! [`UnboundEntityError`]) are surfaced to the dispatching caller and never
//! mutate session state. [`RemoteCommandError`] is recovered where the
//! command is issued. [`LayoutError`] is the only class that aborts startup.

/// Umbrella error for the dispatch core.
#[derive(Debug, thiserror::Error)]
pub enum DeckError {
    /// A page target that matches neither home nor anonymous pages.
    #[error(transparent)]
    Navigation(#[from] NavigationError),

    /// A button or dial index out of range for the current page.
    #[error(transparent)]
    ControlIndex(#[from] ControlIndexError),

    /// An action that needs an entity identifier, configured without one.
    #[error(transparent)]
    UnboundEntity(#[from] UnboundEntityError),

    /// An outbound command rejected by the remote store or its transport.
    #[error(transparent)]
    RemoteCommand(#[from] RemoteCommandError),

    /// A page graph that fails construction-time validation.
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// An unknown page target.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    /// No home or anonymous page carries this name.
    #[error("no page named '{0}'")]
    UnknownName(String),

    /// A numeric target beyond the home rotation.
    #[error("home page index {index} out of range ({len} home pages)")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of configured home pages.
        len: usize,
    },
}

/// A control index that the current page does not populate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControlIndexError {
    /// Key index beyond the page's button list.
    #[error("key {index} has no button on page '{page}'")]
    Button {
        /// Page the lookup ran against.
        page: String,
        /// The requested key index.
        index: usize,
    },

    /// Dial index beyond the page's dial list.
    #[error("dial {index} is not configured on page '{page}'")]
    Dial {
        /// Page the lookup ran against.
        page: String,
        /// The requested dial index.
        index: usize,
    },
}

/// An action that requires a bound entity, dispatched on a control without one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{action} requires a bound entity")]
pub struct UnboundEntityError {
    /// Human-readable name of the action that failed.
    pub action: &'static str,
}

/// An outbound command that the remote store rejected or never received.
///
/// Always recovered locally: the optimistic local value stays in place and
/// the next authoritative state change corrects it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteCommandError {
    /// The transport could not deliver the command.
    #[error("remote store unreachable: {0}")]
    Unreachable(String),

    /// The remote store received the command and refused it.
    #[error("remote store rejected '{service}': {reason}")]
    Rejected {
        /// Service identifier of the rejected call.
        service: String,
        /// Reason reported by the remote store.
        reason: String,
    },
}

/// A page graph that cannot be run.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    /// The home rotation is empty.
    #[error("layout defines no home pages")]
    NoHomePages,

    /// Two pages (home or anonymous) share a name.
    #[error("duplicate page name '{0}'")]
    DuplicatePageName(String),

    /// The return-to-home target names a missing or anonymous page.
    #[error("return-to-home page '{0}' is not a home page")]
    UnknownHomePage(String),

    /// The return-to-home duration is zero or negative.
    #[error("return-to-home duration must be positive, got {0}")]
    NonPositiveDuration(f64),

    /// A dial turn step of zero or below.
    #[error("turn step must be positive, got {0}")]
    NonPositiveStep(f64),

    /// A turn range whose minimum exceeds its maximum.
    #[error("turn minimum {min} exceeds maximum {max}")]
    InvertedRange {
        /// Configured minimum.
        min: f64,
        /// Configured maximum.
        max: f64,
    },
}
