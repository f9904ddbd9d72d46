//! Orchestration controller.
//!
//! Invariant: single writer: every mutation of controller state goes through
//! the methods here; the render layer and host collaborators only ever read
//! snapshots. Listener callbacks, dismiss callbacks, and retry hooks are
//! always invoked after internal borrows are released, so they may re-enter
//! controller methods freely.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Instant;

use serde_json::Value;

use crate::config::OverlazyConfig;
use crate::core::failure::{ErrorContext, RetryHook, SurfaceError};
use crate::core::host::{Clock, ConnectivityProbe, ErrorLogger, ModalFocusTracker, ToastIdSource};
use crate::core::props::SurfaceProps;
use crate::core::toast::{DismissCallback, ToastId, ToastKind, ToastPayload};
use crate::platform::{AlwaysOnline, MonotonicClock, MostRecentFocus, TracingErrorLogger, UuidToastIds};
use crate::registry::{SurfaceId, SurfaceKind, SurfaceRegistry};
use crate::runtime::timers::TimerQueue;
use crate::runtime::toasts::{ToastEntry, ToastLane};

/// Host collaborator set the controller is constructed with.
pub struct HostAdapters {
    pub error_logger: Box<dyn ErrorLogger>,
    pub connectivity: Box<dyn ConnectivityProbe>,
    pub modal_focus: Box<dyn ModalFocusTracker>,
    pub toast_ids: Box<dyn ToastIdSource>,
    pub clock: Box<dyn Clock>,
}

impl Default for HostAdapters {
    fn default() -> Self {
        Self {
            error_logger: Box::new(TracingErrorLogger),
            connectivity: Box::new(AlwaysOnline),
            modal_focus: Box::new(MostRecentFocus),
            toast_ids: Box::new(UuidToastIds),
            clock: Box::new(MonotonicClock),
        }
    }
}

/// Outcome of an `open` call.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OpenResult {
    /// A non-toast surface is now active.
    Opened,
    /// The toast was enqueued under this id.
    Toast(ToastId),
    /// An error toast was suppressed because the user is offline.
    SuppressedOffline,
}

/// Kind-plus-discriminator addressing for `close`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CloseRequest {
    Drawer,
    StickyDrawer,
    Modal(SurfaceId),
    Tab(SurfaceId),
    Toast(ToastId),
}

/// A currently open surface with its props.
#[derive(Clone, Debug, PartialEq)]
pub struct ActiveSurface {
    pub id: SurfaceId,
    pub props: SurfaceProps,
}

/// Read-only toast projection for the render layer.
#[derive(Clone, Debug)]
pub struct ToastView {
    pub id: ToastId,
    pub surface: SurfaceId,
    pub kind: ToastKind,
    pub visible: bool,
    pub props: SurfaceProps,
}

/// Read-only projection of controller state.
#[derive(Clone, Debug)]
pub struct OverlaysSnapshot {
    pub drawer: Option<ActiveSurface>,
    pub sticky_drawer: Option<ActiveSurface>,
    /// The one tracked modal the focus collaborator reports as displayed.
    pub focused_modal: Option<ActiveSurface>,
    pub tabs: Vec<ActiveSurface>,
    pub toasts: Vec<ToastView>,
    pub version: u64,
}

/// Pending crash-recovery information (drawer crashes only).
#[derive(Clone, Copy, Debug)]
pub struct RecoveryInfo {
    pub failed: SurfaceId,
    pub title: &'static str,
    pub retry_available: bool,
}

struct RecoveryPlan {
    failed: SurfaceId,
    props: SurfaceProps,
    title: &'static str,
    retry: Option<RetryHook>,
}

enum TimerAction {
    DismissToast(ToastId),
    RemoveToast(ToastId),
}

enum DeferredAction {
    OpenFailureDrawer { plan: RecoveryPlan, message: String },
    OpenFailureToast { title: &'static str },
}

struct ControllerState {
    config: OverlazyConfig,
    drawer: Option<ActiveSurface>,
    sticky_drawer: Option<ActiveSurface>,
    modals: Vec<ActiveSurface>,
    tabs: Vec<ActiveSurface>,
    toasts: ToastLane,
    timers: TimerQueue<TimerAction>,
    deferred: Vec<DeferredAction>,
    recovery: Option<RecoveryPlan>,
    listeners: Vec<(u64, Rc<dyn Fn()>)>,
    next_listener: u64,
    version: u64,
}

/// The orchestration controller.
///
/// A cheap-clone handle over session-lived shared state: clones address the
/// same controller. One instance is constructed per application session and
/// passed explicitly to whoever needs it; there is no global.
pub struct OverlayController {
    registry: Rc<SurfaceRegistry>,
    hosts: Rc<HostAdapters>,
    state: Rc<RefCell<ControllerState>>,
}

impl Clone for OverlayController {
    fn clone(&self) -> Self {
        Self {
            registry: Rc::clone(&self.registry),
            hosts: Rc::clone(&self.hosts),
            state: Rc::clone(&self.state),
        }
    }
}

/// Listener registration; dropping it unregisters the listener.
pub struct Subscription {
    id: u64,
    state: Weak<RefCell<ControllerState>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(state) = self.state.upgrade() {
            let mut state = state.borrow_mut();
            state.listeners.retain(|(id, _)| *id != self.id);
        }
    }
}

impl OverlayController {
    pub fn new(registry: Rc<SurfaceRegistry>, config: OverlazyConfig, hosts: HostAdapters) -> Self {
        Self {
            registry,
            hosts: Rc::new(hosts),
            state: Rc::new(RefCell::new(ControllerState {
                config,
                drawer: None,
                sticky_drawer: None,
                modals: Vec::new(),
                tabs: Vec::new(),
                toasts: ToastLane::default(),
                timers: TimerQueue::new(),
                deferred: Vec::new(),
                recovery: None,
                listeners: Vec::new(),
                next_listener: 0,
                version: 0,
            })),
        }
    }

    pub fn with_defaults(registry: Rc<SurfaceRegistry>) -> Self {
        Self::new(registry, OverlazyConfig::default(), HostAdapters::default())
    }

    pub fn registry(&self) -> &Rc<SurfaceRegistry> {
        &self.registry
    }

    /// Opens a surface, replacing or inserting according to its kind's
    /// multiplicity rule. Panics on an unregistered id.
    ///
    /// For toast-kind surfaces the payload is derived from well-known props
    /// keys (see [`ToastPayload::from_props`]); use [`Self::open_toast`] to
    /// attach callbacks.
    pub fn open(&self, id: SurfaceId, props: SurfaceProps) -> OpenResult {
        let kind = self.registry.kind_of(id);
        tracing::debug!(surface = %id, %kind, "open surface");
        match kind {
            SurfaceKind::Drawer => {
                {
                    let mut state = self.state.borrow_mut();
                    if id != self.registry.recovery().failure_drawer {
                        state.recovery = None;
                    }
                    state.drawer = Some(ActiveSurface { id, props });
                    state.version += 1;
                }
                self.notify();
                OpenResult::Opened
            }
            SurfaceKind::StickyDrawer => {
                {
                    let mut state = self.state.borrow_mut();
                    state.sticky_drawer = Some(ActiveSurface { id, props });
                    state.version += 1;
                }
                self.notify();
                OpenResult::Opened
            }
            SurfaceKind::Modal => {
                {
                    let mut state = self.state.borrow_mut();
                    upsert(&mut state.modals, id, props);
                    state.version += 1;
                }
                self.notify();
                OpenResult::Opened
            }
            SurfaceKind::Tab => {
                {
                    let mut state = self.state.borrow_mut();
                    upsert(&mut state.tabs, id, props);
                    state.version += 1;
                }
                self.notify();
                OpenResult::Opened
            }
            SurfaceKind::Toast => self.open_toast(id, ToastPayload::from_props(props)),
        }
    }

    /// Enqueues a toast for the given toast-kind surface.
    ///
    /// Error toasts are suppressed while offline (an offline warning fires
    /// instead) and otherwise reported to the error logger before display.
    /// Inserting beyond the configured capacity dismisses the oldest excess
    /// entries through the regular dismissal path.
    pub fn open_toast(&self, surface: SurfaceId, payload: ToastPayload) -> OpenResult {
        let kind = self.registry.kind_of(surface);
        assert_eq!(
            kind,
            SurfaceKind::Toast,
            "open_toast called for '{surface}', which is registered as a {kind}"
        );

        if payload.kind == ToastKind::Error {
            if self.hosts.connectivity.is_offline() {
                tracing::debug!(surface = %surface, "error toast suppressed while offline");
                self.hosts.connectivity.show_offline_warning();
                return OpenResult::SuppressedOffline;
            }
            self.hosts.error_logger.report(
                &SurfaceError::ErrorToast {
                    message: payload.message.clone(),
                },
                &ErrorContext::surface(surface, SurfaceKind::Toast, "toast-display"),
            );
        }

        let id = self.hosts.toast_ids.next_toast_id();
        let now = self.hosts.clock.now();
        let callbacks = {
            let mut state = self.state.borrow_mut();
            let auto_close = if payload.do_not_auto_close {
                None
            } else {
                let due = now + state.config.toast_auto_close;
                Some(state.timers.schedule(due, TimerAction::DismissToast(id)))
            };
            state.toasts.push(ToastEntry::new(id, surface, payload, auto_close));
            state.version += 1;
            tracing::debug!(surface = %surface, stacked = state.toasts.len(), "toast enqueued");

            let overflow = state.toasts.overflow(state.config.max_stacked_toasts);
            let mut callbacks = Vec::new();
            for evicted in overflow {
                tracing::debug!(toast = ?evicted, "toast evicted by capacity");
                if let Some(callback) = dismiss_toast_locked(&mut state, evicted, now).flatten() {
                    callbacks.push(callback);
                }
            }
            callbacks
        };

        for callback in callbacks {
            callback();
        }
        self.notify();
        OpenResult::Toast(id)
    }

    /// Closes a surface. Symmetric to `open` per kind; closing something
    /// already gone is a no-op.
    pub fn close(&self, request: CloseRequest) {
        match request {
            CloseRequest::Drawer => {
                let changed = {
                    let mut state = self.state.borrow_mut();
                    state.recovery = None;
                    let closed = state.drawer.take();
                    if closed.is_some() {
                        state.version += 1;
                    }
                    closed.is_some()
                };
                if changed {
                    tracing::debug!("drawer closed");
                    self.notify();
                }
            }
            CloseRequest::StickyDrawer => {
                let changed = {
                    let mut state = self.state.borrow_mut();
                    let closed = state.sticky_drawer.take();
                    if closed.is_some() {
                        state.version += 1;
                    }
                    closed.is_some()
                };
                if changed {
                    tracing::debug!("sticky drawer closed");
                    self.notify();
                }
            }
            CloseRequest::Modal(id) => {
                let kind = self.registry.kind_of(id);
                assert_eq!(
                    kind,
                    SurfaceKind::Modal,
                    "close(Modal) called for '{id}', which is registered as a {kind}"
                );
                let changed = {
                    let mut state = self.state.borrow_mut();
                    let changed = remove_keyed(&mut state.modals, id);
                    if changed {
                        state.version += 1;
                    }
                    changed
                };
                if changed {
                    tracing::debug!(surface = %id, "modal closed");
                    self.notify();
                }
            }
            CloseRequest::Tab(id) => {
                let kind = self.registry.kind_of(id);
                assert_eq!(
                    kind,
                    SurfaceKind::Tab,
                    "close(Tab) called for '{id}', which is registered as a {kind}"
                );
                let changed = {
                    let mut state = self.state.borrow_mut();
                    let changed = remove_keyed(&mut state.tabs, id);
                    if changed {
                        state.version += 1;
                    }
                    changed
                };
                if changed {
                    tracing::debug!(surface = %id, "tab closed");
                    self.notify();
                }
            }
            CloseRequest::Toast(id) => {
                let now = self.hosts.clock.now();
                let outcome = {
                    let mut state = self.state.borrow_mut();
                    dismiss_toast_locked(&mut state, id, now)
                };
                match outcome {
                    None => {}
                    Some(callback) => {
                        if let Some(callback) = callback {
                            callback();
                        }
                        self.notify();
                    }
                }
            }
        }
    }

    /// Merges `patch` into the props of `id` if it is currently active.
    ///
    /// No-op (not an error) when inactive, with one asymmetry preserved from
    /// the product this core was written for: updating an inactive tab opens
    /// it with the patch as its props (tabs behave as upsert surfaces).
    /// Toast-kind ids are a no-op: the toast sequence is keyed by [`ToastId`],
    /// not surface id.
    pub fn update_props(&self, id: SurfaceId, patch: SurfaceProps) {
        let kind = self.registry.kind_of(id);
        let changed = {
            let mut state = self.state.borrow_mut();
            let changed = match kind {
                SurfaceKind::Drawer => merge_slot(&mut state.drawer, id, patch),
                SurfaceKind::StickyDrawer => merge_slot(&mut state.sticky_drawer, id, patch),
                SurfaceKind::Modal => merge_keyed(&mut state.modals, id, patch),
                SurfaceKind::Tab => {
                    if !merge_keyed(&mut state.tabs, id, patch.clone()) {
                        tracing::debug!(surface = %id, "tab auto-opened by props update");
                        state.tabs.push(ActiveSurface { id, props: patch });
                    }
                    true
                }
                SurfaceKind::Toast => false,
            };
            if changed {
                state.version += 1;
            }
            changed
        };
        if changed {
            self.notify();
        }
    }

    /// Fires due timers, then drains the deferred-action queue.
    ///
    /// Hosts call this once per event-loop turn (and after
    /// [`Self::next_deadline`] elapses). All timer-driven toast transitions
    /// and crash-recovery follow-ups happen here.
    pub fn tick(&self) {
        let now = self.hosts.clock.now();

        let (callbacks, fired) = {
            let mut state = self.state.borrow_mut();
            let actions = state.timers.take_due(now);
            let fired = !actions.is_empty();
            let mut callbacks = Vec::new();
            for action in actions {
                match action {
                    TimerAction::DismissToast(id) => {
                        if let Some(callback) = dismiss_toast_locked(&mut state, id, now).flatten() {
                            callbacks.push(callback);
                        }
                    }
                    TimerAction::RemoveToast(id) => {
                        state.toasts.remove(id);
                        state.version += 1;
                    }
                }
            }
            (callbacks, fired)
        };
        for callback in callbacks {
            callback();
        }
        if fired {
            self.notify();
        }

        let deferred = {
            let mut state = self.state.borrow_mut();
            std::mem::take(&mut state.deferred)
        };
        for action in deferred {
            match action {
                DeferredAction::OpenFailureDrawer { plan, message } => {
                    let mut props = SurfaceProps::new();
                    props.set("failed_title", Value::String(plan.title.to_string()));
                    props.set("message", Value::String(message));
                    {
                        let mut state = self.state.borrow_mut();
                        state.recovery = Some(plan);
                    }
                    self.open(self.registry.recovery().failure_drawer, props);
                }
                DeferredAction::OpenFailureToast { title } => {
                    self.open_toast(
                        self.registry.recovery().failure_toast,
                        ToastPayload::error(format!("{title} failed to display")),
                    );
                }
            }
        }
    }

    /// Earliest pending timer deadline, for event-loop hosts.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.state.borrow().timers.next_deadline()
    }

    /// Whether deferred work is waiting for the next [`Self::tick`].
    pub fn needs_tick(&self) -> bool {
        let state = self.state.borrow();
        !state.deferred.is_empty() || !state.timers.is_empty()
    }

    /// Registers a change listener, invoked after every settled mutation.
    pub fn subscribe(&self, listener: impl Fn() + 'static) -> Subscription {
        let mut state = self.state.borrow_mut();
        let id = state.next_listener;
        state.next_listener += 1;
        state.listeners.push((id, Rc::new(listener)));
        Subscription {
            id,
            state: Rc::downgrade(&self.state),
        }
    }

    /// Monotonic state version, for polling observers.
    pub fn version(&self) -> u64 {
        self.state.borrow().version
    }

    /// Projects the current state for the render layer.
    pub fn snapshot(&self) -> OverlaysSnapshot {
        let (drawer, sticky_drawer, modals, tabs, toasts, version) = {
            let state = self.state.borrow();
            (
                state.drawer.clone(),
                state.sticky_drawer.clone(),
                state.modals.clone(),
                state.tabs.clone(),
                state
                    .toasts
                    .iter()
                    .map(|entry| ToastView {
                        id: entry.id,
                        surface: entry.surface,
                        kind: entry.kind,
                        visible: entry.visible,
                        props: entry.render_props(),
                    })
                    .collect::<Vec<_>>(),
                state.version,
            )
        };

        let tracked: Vec<SurfaceId> = modals.iter().map(|surface| surface.id).collect();
        let focused_modal = self
            .hosts
            .modal_focus
            .focused(&tracked)
            .and_then(|id| modals.into_iter().find(|surface| surface.id == id));

        OverlaysSnapshot {
            drawer,
            sticky_drawer,
            focused_modal,
            tabs,
            toasts,
            version,
        }
    }

    /// Pending drawer-crash recovery, if the failure drawer is showing one.
    pub fn pending_recovery(&self) -> Option<RecoveryInfo> {
        let state = self.state.borrow();
        state.recovery.as_ref().map(|plan| RecoveryInfo {
            failed: plan.failed,
            title: plan.title,
            retry_available: plan.retry.is_some(),
        })
    }

    /// Retries the crashed drawer: runs the failure's retry hook (if any),
    /// closes the failure drawer, and reopens the original surface with its
    /// original props. Returns `false` when no recovery is pending.
    pub fn retry_failed(&self) -> bool {
        let plan = {
            let mut state = self.state.borrow_mut();
            state.recovery.take()
        };
        let Some(plan) = plan else {
            return false;
        };
        tracing::debug!(surface = %plan.failed, "retrying crashed drawer");
        if let Some(retry) = plan.retry {
            retry();
        }
        self.close(CloseRequest::Drawer);
        self.open(plan.failed, plan.props);
        true
    }

    pub(crate) fn report(&self, error: &SurfaceError, context: &ErrorContext) {
        self.hosts.error_logger.report(error, context);
    }

    /// Queues the retry-capable failure drawer for the next tick.
    pub(crate) fn escalate_drawer_crash(
        &self,
        failed: SurfaceId,
        props: SurfaceProps,
        title: &'static str,
        message: String,
        retry: Option<RetryHook>,
    ) {
        {
            let mut state = self.state.borrow_mut();
            state.deferred.push(DeferredAction::OpenFailureDrawer {
                plan: RecoveryPlan {
                    failed,
                    props,
                    title,
                    retry,
                },
                message,
            });
            state.version += 1;
        }
        self.notify();
    }

    /// Queues the generic failure toast for the next tick.
    pub(crate) fn escalate_generic_crash(&self, title: &'static str) {
        {
            let mut state = self.state.borrow_mut();
            state
                .deferred
                .push(DeferredAction::OpenFailureToast { title });
            state.version += 1;
        }
        self.notify();
    }

    fn notify(&self) {
        let listeners: Vec<Rc<dyn Fn()>> = {
            let state = self.state.borrow();
            state
                .listeners
                .iter()
                .map(|(_, listener)| Rc::clone(listener))
                .collect()
        };
        for listener in listeners {
            listener();
        }
    }
}

fn remove_keyed(entries: &mut Vec<ActiveSurface>, id: SurfaceId) -> bool {
    let before = entries.len();
    entries.retain(|surface| surface.id != id);
    entries.len() != before
}

fn upsert(entries: &mut Vec<ActiveSurface>, id: SurfaceId, props: SurfaceProps) {
    match entries.iter_mut().find(|surface| surface.id == id) {
        Some(surface) => surface.props = props,
        None => entries.push(ActiveSurface { id, props }),
    }
}

fn merge_slot(slot: &mut Option<ActiveSurface>, id: SurfaceId, patch: SurfaceProps) -> bool {
    match slot {
        Some(surface) if surface.id == id => {
            surface.props.merge(patch);
            true
        }
        _ => false,
    }
}

fn merge_keyed(entries: &mut [ActiveSurface], id: SurfaceId, patch: SurfaceProps) -> bool {
    match entries.iter_mut().find(|surface| surface.id == id) {
        Some(surface) => {
            surface.props.merge(patch);
            true
        }
        None => false,
    }
}

/// Shared dismissal routine (manual close, auto-close, capacity eviction).
///
/// Returns `None` when the toast is absent or already dismissing (idempotent
/// double-dismissal), `Some(callback)` when this call performed the
/// dismissal. The 300 ms removal is scheduled here; the entry stays in the
/// sequence, invisible, until it fires.
fn dismiss_toast_locked(
    state: &mut ControllerState,
    id: ToastId,
    now: Instant,
) -> Option<Option<DismissCallback>> {
    let grace = state.config.toast_removal_grace;
    let (callback, auto_close) = {
        let entry = state.toasts.get_mut(id)?;
        if !entry.visible {
            return None;
        }
        entry.visible = false;
        (entry.on_dismissed.take(), entry.auto_close.take())
    };
    if let Some(timer) = auto_close {
        state.timers.cancel(timer);
    }
    state.timers.schedule(now + grace, TimerAction::RemoveToast(id));
    state.version += 1;
    Some(callback)
}
