
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use fixture::{
    harness, Static, AGENDA_STICKY, EDIT_DRAWER, NOTES_TAB, PROFILE_MODAL, SETTINGS_MODAL,
    STATUS_TOAST,
};
use overlazy::{
    CloseRequest, ComponentLoad, LoadHandle, OverlayController, RecoverySurfaces, RenderSurface,
    SurfaceComponent, SurfaceDescriptor, SurfaceId, SurfaceKind, SurfaceProps, SurfaceRegistry,
    ToastPayload,
};
use pretty_assertions::assert_eq;
use serde_json::json;

const LAZY_DRAWER: SurfaceId = SurfaceId::new("lazy-report");
const ECHO_DRAWER: SurfaceId = SurfaceId::new("echo");
const LOCAL_FAILURE_DRAWER: SurfaceId = SurfaceId::new("failure-drawer");
const LOCAL_FAILURE_TOAST: SurfaceId = SurfaceId::new("failure-toast");

/// Renders the `label` prop, so prop updates are observable in output.
struct Echo;

impl SurfaceComponent for Echo {
    fn render(&mut self, props: &SurfaceProps, _width: usize) -> Vec<String> {
        let label = props
            .get("label")
            .and_then(|value| value.as_str())
            .unwrap_or("");
        vec![format!("echo:{label}")]
    }
}

fn local_registry(handles: &Rc<RefCell<Vec<LoadHandle>>>) -> Rc<SurfaceRegistry> {
    let sink = Rc::clone(handles);
    Rc::new(SurfaceRegistry::build(
        vec![
            SurfaceDescriptor::new(LAZY_DRAWER, SurfaceKind::Drawer, "Lazy report", move || {
                let (load, handle) = ComponentLoad::pending();
                sink.borrow_mut().push(handle);
                load
            }),
            SurfaceDescriptor::new(ECHO_DRAWER, SurfaceKind::StickyDrawer, "Echo", || {
                ComponentLoad::ready(Echo)
            }),
            SurfaceDescriptor::new(
                LOCAL_FAILURE_DRAWER,
                SurfaceKind::Drawer,
                "Something went wrong",
                || ComponentLoad::ready(Static("failure-drawer")),
            ),
            SurfaceDescriptor::new(LOCAL_FAILURE_TOAST, SurfaceKind::Toast, "Failure", || {
                ComponentLoad::ready(Static("failure-toast"))
            }),
        ],
        RecoverySurfaces {
            failure_drawer: LOCAL_FAILURE_DRAWER,
            failure_toast: LOCAL_FAILURE_TOAST,
        },
    ))
}

#[test]
fn renders_every_active_surface_in_documented_order() {
    let h = harness();
    let mut surface = RenderSurface::new(h.overlays.clone(), || {});

    h.overlays.open(EDIT_DRAWER, SurfaceProps::new());
    h.overlays.open(AGENDA_STICKY, SurfaceProps::new());
    h.overlays.open(SETTINGS_MODAL, SurfaceProps::new());
    h.overlays.open(NOTES_TAB, SurfaceProps::new());
    h.overlays.open_toast(STATUS_TOAST, ToastPayload::info("hello"));

    assert_eq!(
        surface.render(80),
        vec![
            "agenda-sticky".to_string(),
            "edit-meeting-drawer".to_string(),
            "settings-modal".to_string(),
            "notes-tab".to_string(),
            "status-toast".to_string(),
        ]
    );
}

#[test]
fn only_the_focused_modal_is_mounted() {
    let h = harness();
    let mut surface = RenderSurface::new(h.overlays.clone(), || {});

    h.overlays.open(SETTINGS_MODAL, SurfaceProps::new());
    h.overlays.open(PROFILE_MODAL, SurfaceProps::new());

    assert_eq!(surface.render(80), vec!["profile-modal".to_string()]);
    assert_eq!(surface.mounted_surfaces(), vec![PROFILE_MODAL]);
}

#[test]
fn a_loading_surface_shows_a_neutral_empty_state_until_fulfilled() {
    let handles = Rc::new(RefCell::new(Vec::new()));
    let overlays = OverlayController::with_defaults(local_registry(&handles));
    let woken = Rc::new(Cell::new(0usize));
    let counter = Rc::clone(&woken);
    let mut surface = RenderSurface::new(overlays.clone(), move || {
        counter.set(counter.get() + 1)
    });

    overlays.open(LAZY_DRAWER, SurfaceProps::new());
    assert!(surface.render(80).is_empty());
    assert_eq!(surface.mounted_surfaces(), vec![LAZY_DRAWER]);

    let handle = handles.borrow_mut().pop().expect("loader invoked once");
    handle.fulfill(Static("lazy-report-drawer"));
    assert_eq!(woken.get(), 1, "load settlement requests a re-render");

    assert_eq!(surface.render(80), vec!["lazy-report-drawer".to_string()]);
}

#[test]
fn a_surface_closed_while_loading_discards_the_late_resolution() {
    let handles = Rc::new(RefCell::new(Vec::new()));
    let overlays = OverlayController::with_defaults(local_registry(&handles));
    let mut surface = RenderSurface::new(overlays.clone(), || {});

    overlays.open(LAZY_DRAWER, SurfaceProps::new());
    surface.render(80);
    overlays.close(CloseRequest::Drawer);
    surface.render(80);

    assert!(surface.mounted_surfaces().is_empty());

    // The mount point is gone; fulfillment is a silent no-op.
    let handle = handles.borrow_mut().pop().expect("loader invoked once");
    assert!(!handle.is_wanted());
    handle.fulfill(Static("too-late"));
    assert!(surface.render(80).is_empty());
}

#[test]
fn dismissed_toasts_stop_rendering_before_removal() {
    let h = harness();
    let mut surface = RenderSurface::new(h.overlays.clone(), || {});

    h.overlays.open_toast(STATUS_TOAST, ToastPayload::info("going"));
    assert_eq!(surface.render(80), vec!["status-toast".to_string()]);

    h.clock.advance(Duration::from_millis(10_000));
    h.overlays.tick();

    // Invisible but still in the sequence during the grace period.
    assert!(surface.render(80).is_empty());
    assert_eq!(h.overlays.snapshot().toasts.len(), 1);

    h.clock.advance(Duration::from_millis(300));
    h.overlays.tick();
    assert!(surface.render(80).is_empty());
    assert!(h.overlays.snapshot().toasts.is_empty());
}

#[test]
fn prop_updates_flow_into_the_next_render() {
    let handles = Rc::new(RefCell::new(Vec::new()));
    let overlays = OverlayController::with_defaults(local_registry(&handles));
    let mut surface = RenderSurface::new(overlays.clone(), || {});

    overlays.open(ECHO_DRAWER, SurfaceProps::from_value(json!({"label": "one"})));
    assert_eq!(surface.render(80), vec!["echo:one".to_string()]);

    overlays.update_props(ECHO_DRAWER, SurfaceProps::from_value(json!({"label": "two"})));
    assert_eq!(surface.render(80), vec!["echo:two".to_string()]);
}

#[test]
fn unmounting_follows_the_snapshot() {
    let h = harness();
    let mut surface = RenderSurface::new(h.overlays.clone(), || {});

    h.overlays.open(NOTES_TAB, SurfaceProps::new());
    h.overlays.open(EDIT_DRAWER, SurfaceProps::new());
    surface.render(80);
    assert_eq!(surface.mounted_surfaces(), vec![EDIT_DRAWER, NOTES_TAB]);

    h.overlays.close(CloseRequest::Tab(NOTES_TAB));
    surface.render(80);
    assert_eq!(surface.mounted_surfaces(), vec![EDIT_DRAWER]);
}
