
use assert_matches::assert_matches;
use fixture::{
    harness, AGENDA_STICKY, CREATE_DRAWER, EDIT_DRAWER, METRICS_TAB, NOTES_TAB, PROFILE_MODAL,
    SETTINGS_MODAL,
};
use overlazy::{CloseRequest, OpenResult, SurfaceProps};
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn opening_a_second_drawer_replaces_the_first() {
    let h = harness();
    h.overlays.open(
        EDIT_DRAWER,
        SurfaceProps::from_value(json!({"meeting_id": 7})),
    );
    h.overlays.open(CREATE_DRAWER, SurfaceProps::new());

    let snapshot = h.overlays.snapshot();
    let drawer = snapshot.drawer.expect("drawer slot occupied");
    assert_eq!(drawer.id, CREATE_DRAWER);
    assert!(drawer.props.is_empty(), "replaced slot keeps nothing of the old drawer");
}

#[test]
fn sticky_drawer_is_independent_of_the_drawer_slot() {
    let h = harness();
    h.overlays.open(AGENDA_STICKY, SurfaceProps::new());
    h.overlays.open(EDIT_DRAWER, SurfaceProps::new());
    h.overlays.close(CloseRequest::Drawer);

    let snapshot = h.overlays.snapshot();
    assert!(snapshot.drawer.is_none());
    assert_eq!(
        snapshot.sticky_drawer.expect("sticky stays").id,
        AGENDA_STICKY
    );
}

#[test]
fn modals_are_tracked_beyond_the_focused_one() {
    let h = harness();
    h.overlays.open(
        SETTINGS_MODAL,
        SurfaceProps::from_value(json!({"tab": "billing"})),
    );
    h.overlays.open(PROFILE_MODAL, SurfaceProps::new());

    // Most-recently-opened focus policy: profile is displayed.
    let snapshot = h.overlays.snapshot();
    assert_eq!(snapshot.focused_modal.as_ref().map(|m| m.id), Some(PROFILE_MODAL));

    // The unfocused modal kept its props; re-focusing does not lose state.
    h.overlays.close(CloseRequest::Modal(PROFILE_MODAL));
    let snapshot = h.overlays.snapshot();
    let focused = snapshot.focused_modal.expect("settings regains focus");
    assert_eq!(focused.id, SETTINGS_MODAL);
    assert_eq!(focused.props.get("tab"), Some(&json!("billing")));
}

#[test]
fn tabs_open_and_close_independently() {
    let h = harness();
    h.overlays.open(NOTES_TAB, SurfaceProps::new());
    h.overlays.open(METRICS_TAB, SurfaceProps::new());
    h.overlays.close(CloseRequest::Tab(NOTES_TAB));

    let snapshot = h.overlays.snapshot();
    let open: Vec<_> = snapshot.tabs.iter().map(|tab| tab.id).collect();
    assert_eq!(open, vec![METRICS_TAB]);
}

#[test]
fn update_props_merges_into_the_active_drawer() {
    let h = harness();
    h.overlays.open(
        EDIT_DRAWER,
        SurfaceProps::from_value(json!({"meeting_id": 7, "readonly": false})),
    );
    h.overlays.update_props(
        EDIT_DRAWER,
        SurfaceProps::from_value(json!({"readonly": true})),
    );

    let drawer = h.overlays.snapshot().drawer.expect("drawer open");
    assert_eq!(drawer.props.get("meeting_id"), Some(&json!(7)));
    assert_eq!(drawer.props.get("readonly"), Some(&json!(true)));
}

#[test]
fn update_props_on_an_inactive_modal_is_a_no_op() {
    let h = harness();
    let version = h.overlays.version();
    h.overlays.update_props(SETTINGS_MODAL, SurfaceProps::from_value(json!({"x": 1})));

    assert!(h.overlays.snapshot().focused_modal.is_none());
    assert_eq!(h.overlays.version(), version);
}

// Tabs are upsert surfaces: updating an inactive tab opens it. The asymmetry
// with modals/drawers is deliberate product behavior.
#[test]
fn update_props_on_an_inactive_tab_opens_it() {
    let h = harness();
    h.overlays.update_props(NOTES_TAB, SurfaceProps::from_value(json!({"x": 1})));

    let snapshot = h.overlays.snapshot();
    assert_eq!(snapshot.tabs.len(), 1);
    assert_eq!(snapshot.tabs[0].id, NOTES_TAB);
    assert_eq!(snapshot.tabs[0].props.get("x"), Some(&json!(1)));
}

#[test]
fn open_returns_opened_for_slot_surfaces() {
    let h = harness();
    assert_matches!(
        h.overlays.open(EDIT_DRAWER, SurfaceProps::new()),
        OpenResult::Opened
    );
}

#[test]
fn closing_something_already_gone_is_a_no_op() {
    let h = harness();
    let version = h.overlays.version();
    h.overlays.close(CloseRequest::Drawer);
    h.overlays.close(CloseRequest::Modal(SETTINGS_MODAL));
    h.overlays.close(CloseRequest::Tab(NOTES_TAB));
    assert_eq!(h.overlays.version(), version);
}

#[test]
fn listeners_observe_every_settled_mutation() {
    use std::cell::Cell;
    use std::rc::Rc;

    let h = harness();
    let seen = Rc::new(Cell::new(0usize));
    let probe = Rc::clone(&seen);
    let _subscription = h.overlays.subscribe(move || probe.set(probe.get() + 1));

    h.overlays.open(EDIT_DRAWER, SurfaceProps::new());
    h.overlays.update_props(EDIT_DRAWER, SurfaceProps::from_value(json!({"a": 1})));
    h.overlays.close(CloseRequest::Drawer);

    assert_eq!(seen.get(), 3);
}

#[test]
#[should_panic(expected = "is not registered")]
fn update_props_for_an_unknown_id_is_a_defect() {
    let h = harness();
    h.overlays.update_props(
        overlazy::SurfaceId::new("nope"),
        SurfaceProps::new(),
    );
}
