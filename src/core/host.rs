//! Host collaborator contracts.
//!
//! Everything environment-specific is behind one of these traits; the
//! controller is parameterized with an implementation set at construction
//! time. Process defaults live in `crate::platform`, tests supply recording
//! doubles.

use std::time::Instant;

use crate::core::failure::{ErrorContext, SurfaceError};
use crate::core::toast::ToastId;
use crate::registry::SurfaceId;

/// Error sink accepting `(error, context)` pairs.
pub trait ErrorLogger {
    fn report(&self, error: &SurfaceError, context: &ErrorContext);
}

/// Offline-status detector plus its one-shot warning side effect.
pub trait ConnectivityProbe {
    fn is_offline(&self) -> bool;

    /// Shown instead of an error toast while the user is offline.
    fn show_offline_warning(&self);
}

/// Reports which of the tracked modals is currently displayed.
pub trait ModalFocusTracker {
    /// `tracked` is insertion-ordered (oldest first). Returning an id not in
    /// `tracked` displays nothing, same as `None`.
    fn focused(&self, tracked: &[SurfaceId]) -> Option<SurfaceId>;
}

/// Unique-id generator for toast entries.
pub trait ToastIdSource {
    fn next_toast_id(&self) -> ToastId;
}

/// Time source for the controller's timer queue.
pub trait Clock {
    fn now(&self) -> Instant;
}
