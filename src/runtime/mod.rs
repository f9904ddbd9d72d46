//! Runtime orchestration.

pub mod controller;
pub mod recovery;
pub(crate) mod timers;
pub(crate) mod toasts;

pub use controller::{CloseRequest, OpenResult, OverlayController};
