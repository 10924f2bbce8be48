//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the dispatch core and the outside world.
//! They are defined here (in `app`) so that both the session and the adapter
//! layer can depend on them without creating circular dependencies.

pub mod command;
pub mod render;

pub use command::CommandSink;
pub use render::{DirtySet, RenderFrame, RenderSink};
