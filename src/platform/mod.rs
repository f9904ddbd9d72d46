//! Process-default host collaborators.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::core::failure::{ErrorContext, SurfaceError};
use crate::core::host::{Clock, ConnectivityProbe, ErrorLogger, ModalFocusTracker, ToastIdSource};
use crate::core::toast::ToastId;
use crate::registry::SurfaceId;

/// Reports errors through `tracing` at error level.
#[derive(Debug, Default)]
pub struct TracingErrorLogger;

impl ErrorLogger for TracingErrorLogger {
    fn report(&self, error: &SurfaceError, context: &ErrorContext) {
        tracing::error!(
            error = %error,
            surface = ?context.surface,
            kind = ?context.kind,
            site = context.site,
            "surface error"
        );
    }
}

/// Connectivity probe for hosts without an offline notion.
#[derive(Debug, Default)]
pub struct AlwaysOnline;

impl ConnectivityProbe for AlwaysOnline {
    fn is_offline(&self) -> bool {
        false
    }

    fn show_offline_warning(&self) {
        tracing::warn!("offline warning requested on an always-online host");
    }
}

/// Displays the most recently opened tracked modal.
#[derive(Debug, Default)]
pub struct MostRecentFocus;

impl ModalFocusTracker for MostRecentFocus {
    fn focused(&self, tracked: &[SurfaceId]) -> Option<SurfaceId> {
        tracked.last().copied()
    }
}

/// Fresh UUID v4 per toast.
#[derive(Debug, Default)]
pub struct UuidToastIds;

impl ToastIdSource for UuidToastIds {
    fn next_toast_id(&self) -> ToastId {
        ToastId::from_uuid(Uuid::new_v4())
    }
}

/// Reads the process monotonic clock.
#[derive(Debug, Default)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually driven clock for tests and deterministic hosts.
///
/// Clones share the same underlying instant.
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}
