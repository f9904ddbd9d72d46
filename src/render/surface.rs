//! Reactive projection of controller state into mounted components.
//!
//! The render surface is purely a function of the controller snapshot: it
//! reconciles a mount set against the snapshot on every render, mounts new
//! slots by invoking the registry loader, and unmounts slots that left the
//! snapshot, which drops their recovery boundary (the reset-on-reopen
//! behavior the boundary's state machine relies on).

use std::rc::Rc;

use crate::core::component::{ComponentLoad, LoadPoll, PendingLoad, SurfaceComponent};
use crate::core::props::SurfaceProps;
use crate::core::toast::ToastId;
use crate::registry::{SurfaceId, SurfaceKind};
use crate::runtime::controller::{OverlayController, OverlaysSnapshot};
use crate::runtime::recovery::{MountOrigin, RecoveryBoundary};

/// Identity of a mount point, used for reconciliation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum SlotKey {
    Drawer,
    StickyDrawer,
    Modal(SurfaceId),
    Tab(SurfaceId),
    Toast(ToastId),
}

struct DesiredMount {
    key: SlotKey,
    surface: SurfaceId,
    kind: SurfaceKind,
    props: SurfaceProps,
    visible: bool,
    toast: Option<ToastId>,
}

enum MountState {
    Loading(PendingLoad),
    Ready(Box<dyn SurfaceComponent>),
}

struct Mount {
    key: SlotKey,
    surface: SurfaceId,
    state: MountState,
    boundary: RecoveryBoundary,
}

/// Mounts and renders the zero-or-more active surfaces.
///
/// Render order is fixed: sticky drawer, drawer, focused modal, tabs in
/// insertion order, then visible toasts oldest-first.
pub struct RenderSurface {
    controller: OverlayController,
    mounts: Vec<Mount>,
    load_waker: Rc<dyn Fn()>,
}

impl RenderSurface {
    /// `on_load_settled` is invoked whenever a pending component load
    /// resolves, so the host can schedule a re-render.
    pub fn new(controller: OverlayController, on_load_settled: impl Fn() + 'static) -> Self {
        Self {
            controller,
            mounts: Vec::new(),
            load_waker: Rc::new(on_load_settled),
        }
    }

    /// Reconciles mounts against the current snapshot and renders every
    /// visible surface to lines. Surfaces whose component is still loading
    /// produce nothing (neutral empty state).
    pub fn render(&mut self, width: usize) -> Vec<String> {
        let snapshot = self.controller.snapshot();
        let desired = desired_mounts(&snapshot);
        self.reconcile(&desired);

        let mut lines = Vec::new();
        for want in &desired {
            let Some(mount) = self.mounts.iter_mut().find(|mount| mount.key == want.key) else {
                continue;
            };
            if !want.visible {
                continue;
            }

            if let MountState::Loading(pending) = &mount.state {
                match pending.poll() {
                    LoadPoll::Pending => continue,
                    LoadPoll::Ready(component) => mount.state = MountState::Ready(component),
                    LoadPoll::Failed(message) => {
                        mount.boundary.fail_load(&self.controller, message);
                        continue;
                    }
                }
            }

            if let MountState::Ready(component) = &mut mount.state {
                lines.extend(mount.boundary.render(
                    &self.controller,
                    component.as_mut(),
                    &want.props,
                    width,
                ));
            }
        }
        lines
    }

    /// Surfaces currently mounted, in render order.
    pub fn mounted_surfaces(&self) -> Vec<SurfaceId> {
        self.mounts.iter().map(|mount| mount.surface).collect()
    }

    fn reconcile(&mut self, desired: &[DesiredMount]) {
        // Unmount anything that left the snapshot (or changed occupant).
        // Dropping a mount drops its boundary and any in-flight load; a load
        // resolving afterwards is discarded unrendered.
        let mut previous = std::mem::take(&mut self.mounts);
        for want in desired {
            // A failed mount is never reused, even for the same occupant: a
            // reopened surface always starts with a fresh boundary.
            let existing = previous.iter().position(|mount| {
                mount.key == want.key
                    && mount.surface == want.surface
                    && !mount.boundary.is_failed()
            });
            let mount = match existing {
                Some(index) => previous.swap_remove(index),
                None => self.mount(want),
            };
            self.mounts.push(mount);
        }
    }

    fn mount(&self, want: &DesiredMount) -> Mount {
        let descriptor = self.controller.registry().descriptor(want.surface);
        let origin = MountOrigin {
            id: want.surface,
            kind: want.kind,
            label: descriptor.label(),
            props: want.props.clone(),
            toast: want.toast,
        };
        let state = match descriptor.load() {
            ComponentLoad::Ready(component) => MountState::Ready(component),
            ComponentLoad::Pending(pending) => {
                pending.set_waker(Rc::clone(&self.load_waker));
                MountState::Loading(pending)
            }
        };
        Mount {
            key: want.key,
            surface: want.surface,
            state,
            boundary: RecoveryBoundary::new(origin),
        }
    }
}

fn desired_mounts(snapshot: &OverlaysSnapshot) -> Vec<DesiredMount> {
    let mut desired = Vec::new();
    if let Some(surface) = &snapshot.sticky_drawer {
        desired.push(DesiredMount {
            key: SlotKey::StickyDrawer,
            surface: surface.id,
            kind: SurfaceKind::StickyDrawer,
            props: surface.props.clone(),
            visible: true,
            toast: None,
        });
    }
    if let Some(surface) = &snapshot.drawer {
        desired.push(DesiredMount {
            key: SlotKey::Drawer,
            surface: surface.id,
            kind: SurfaceKind::Drawer,
            props: surface.props.clone(),
            visible: true,
            toast: None,
        });
    }
    if let Some(surface) = &snapshot.focused_modal {
        desired.push(DesiredMount {
            key: SlotKey::Modal(surface.id),
            surface: surface.id,
            kind: SurfaceKind::Modal,
            props: surface.props.clone(),
            visible: true,
            toast: None,
        });
    }
    for surface in &snapshot.tabs {
        desired.push(DesiredMount {
            key: SlotKey::Tab(surface.id),
            surface: surface.id,
            kind: SurfaceKind::Tab,
            props: surface.props.clone(),
            visible: true,
            toast: None,
        });
    }
    for toast in &snapshot.toasts {
        desired.push(DesiredMount {
            key: SlotKey::Toast(toast.id),
            surface: toast.surface,
            kind: SurfaceKind::Toast,
            props: toast.props.clone(),
            visible: toast.visible,
            toast: Some(toast.id),
        });
    }
    desired
}
