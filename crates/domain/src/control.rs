//! Controls — the physical buttons and dials a page binds to entities.

mod button;
mod dial;
mod page;

pub use button::{Button, PageTarget, SpecialType};
pub use dial::{Dial, DialPush, DialTurn, TurnProperties};
pub use page::Page;
