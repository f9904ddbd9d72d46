//! Controller tuning knobs.

use std::time::Duration;

/// Fixed policy values for the toast lane.
///
/// The defaults match the product behavior this core was written for; hosts
/// override them per session, never at runtime (config is read-only once the
/// controller is constructed).
#[derive(Clone, Debug)]
pub struct OverlazyConfig {
    /// Maximum toasts stacked at once; inserting beyond this dismisses the
    /// oldest excess entries.
    pub max_stacked_toasts: usize,
    /// Delay before an auto-closing toast dismisses itself.
    pub toast_auto_close: Duration,
    /// Grace period between a toast turning invisible and its removal from
    /// the sequence (animation window).
    pub toast_removal_grace: Duration,
}

impl Default for OverlazyConfig {
    fn default() -> Self {
        Self {
            max_stacked_toasts: 3,
            toast_auto_close: Duration::from_millis(10_000),
            toast_removal_grace: Duration::from_millis(300),
        }
    }
}

impl OverlazyConfig {
    pub fn with_max_stacked_toasts(mut self, cap: usize) -> Self {
        self.max_stacked_toasts = cap;
        self
    }

    pub fn with_toast_auto_close(mut self, delay: Duration) -> Self {
        self.toast_auto_close = delay;
        self
    }

    pub fn with_toast_removal_grace(mut self, grace: Duration) -> Self {
        self.toast_removal_grace = grace;
        self
    }
}
