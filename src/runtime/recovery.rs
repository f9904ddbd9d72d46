//! Per-mount crash isolation and recovery.
//!
//! Every consequence of a crash is routed through the controller: the
//! boundary closes the slot it captured at mount time and queues the
//! kind-appropriate follow-up. Its own empty fallback is only a safety net;
//! the render layer unmounts the instance as soon as the closed slot leaves the
//! snapshot.

use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::core::component::SurfaceComponent;
use crate::core::failure::{ErrorContext, SurfaceError, SurfaceFailure};
use crate::core::props::SurfaceProps;
use crate::core::toast::ToastId;
use crate::registry::{SurfaceId, SurfaceKind};
use crate::runtime::controller::{CloseRequest, OverlayController};

/// Close-and-reopen information captured when a surface mounts.
#[derive(Clone, Debug)]
pub struct MountOrigin {
    pub id: SurfaceId,
    pub kind: SurfaceKind,
    /// Human-readable title from the registry descriptor.
    pub label: &'static str,
    /// Props the surface was opened with (reopen uses these, not any later
    /// partial updates).
    pub props: SurfaceProps,
    /// Set for toast mounts; toasts close by toast id, not surface id.
    pub toast: Option<ToastId>,
}

impl MountOrigin {
    fn close_request(&self) -> CloseRequest {
        match self.kind {
            SurfaceKind::Drawer => CloseRequest::Drawer,
            SurfaceKind::StickyDrawer => CloseRequest::StickyDrawer,
            SurfaceKind::Modal => CloseRequest::Modal(self.id),
            SurfaceKind::Tab => CloseRequest::Tab(self.id),
            SurfaceKind::Toast => {
                CloseRequest::Toast(self.toast.expect("toast mount is missing its toast id"))
            }
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum BoundaryPhase {
    Healthy,
    Failed,
}

/// Crash boundary wrapping one mounted surface instance.
///
/// `Healthy → Failed` is terminal for the instance; a reopened surface gets a
/// fresh boundary with its mount.
pub struct RecoveryBoundary {
    origin: MountOrigin,
    phase: BoundaryPhase,
}

impl RecoveryBoundary {
    pub fn new(origin: MountOrigin) -> Self {
        Self {
            origin,
            phase: BoundaryPhase::Healthy,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.phase == BoundaryPhase::Failed
    }

    /// Renders the wrapped component, isolating a panic.
    ///
    /// On a crash the slot is closed immediately; the follow-up surface (the
    /// retry-capable failure drawer for drawers, the generic failure toast
    /// for everything else) opens on the controller's next tick so the close
    /// settles first.
    pub fn render(
        &mut self,
        controller: &OverlayController,
        component: &mut dyn SurfaceComponent,
        props: &SurfaceProps,
        width: usize,
    ) -> Vec<String> {
        if self.phase == BoundaryPhase::Failed {
            return Vec::new();
        }

        // AssertUnwindSafe: the component may be left torn after a panic, but
        // a failed mount is never rendered again, it is unmounted wholesale.
        match catch_unwind(AssertUnwindSafe(|| component.render(props, width))) {
            Ok(lines) => lines,
            Err(payload) => {
                let failure = SurfaceFailure::from_panic(payload);
                let error = SurfaceError::RenderCrash {
                    id: self.origin.id,
                    kind: self.origin.kind,
                    message: failure.message().to_string(),
                };
                self.fail(controller, error, failure);
                Vec::new()
            }
        }
    }

    /// Escalates a component-load failure through the same transition as a
    /// render crash.
    pub fn fail_load(&mut self, controller: &OverlayController, message: String) {
        if self.phase == BoundaryPhase::Failed {
            return;
        }
        let error = SurfaceError::LoadFailed {
            id: self.origin.id,
            kind: self.origin.kind,
            message: message.clone(),
        };
        self.fail(controller, error, SurfaceFailure::new(message));
    }

    fn fail(
        &mut self,
        controller: &OverlayController,
        error: SurfaceError,
        mut failure: SurfaceFailure,
    ) {
        self.phase = BoundaryPhase::Failed;
        tracing::warn!(surface = %self.origin.id, kind = %self.origin.kind, "surface failed, closing its slot");
        controller.close(self.origin.close_request());

        if self.origin.kind == SurfaceKind::Drawer {
            controller.report(
                &error,
                &ErrorContext::surface(self.origin.id, self.origin.kind, "render"),
            );
            controller.escalate_drawer_crash(
                self.origin.id,
                self.origin.props.clone(),
                self.origin.label,
                failure.message().to_string(),
                failure.take_retry(),
            );
        } else {
            controller.escalate_generic_crash(self.origin.label);
        }
    }
}
