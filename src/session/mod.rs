/// Session store for in-progress dialogs
///
/// This module owns every user's dialog session: which flow they are in,
/// which step they are on, and the input gathered so far. Nothing else
/// mutates sessions except through a locked `SessionSlot`.

pub mod state;
pub mod store;

pub use state::*;
pub use store::*;
