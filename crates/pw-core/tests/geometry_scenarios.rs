//! Integration tests: project file → widget tree → resolved geometry.

use pretty_assertions::assert_eq;
use pw_core::layout::Surface;
use pw_core::snapshot::Snapshot;
use pw_core::{EdgeAnchors, ResolvedBounds, WidgetId, WidgetKind, WidgetTree};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn load_fixture() -> WidgetTree {
    init_logging();
    let snapshot = Snapshot::from_json(include_str!("fixtures/login_form.json")).unwrap();
    WidgetTree::from_snapshot(snapshot).unwrap()
}

fn id(s: &str) -> WidgetId {
    WidgetId::intern(s)
}

// ─── Fixture geometry ───────────────────────────────────────────────────

#[test]
fn fixture_resolves_every_widget() {
    let tree = load_fixture();
    assert_eq!(tree.bounds(id("panel1")), Some(ResolvedBounds::new(200.0, 150.0, 400.0, 300.0)));
    assert_eq!(tree.bounds(id("title")), Some(ResolvedBounds::new(300.0, 166.0, 200.0, 30.0)));
    assert_eq!(
        tree.bounds(id("textinput1")),
        Some(ResolvedBounds::new(220.0, 230.0, 360.0, 32.0))
    );
    assert_eq!(tree.absolute(id("button3")), Some((460.0, 390.0)));
    assert_eq!(tree.absolute(id("footer")), Some((10.0, 570.0)));
}

#[test]
fn fixture_surface_aliases_are_top_level() {
    let tree = load_fixture();
    assert_eq!(tree.get(id("panel1")).unwrap().parent_id, None);
    assert_eq!(tree.get(id("footer")).unwrap().parent_id, None);
    assert_eq!(tree.top_level(), vec![id("panel1"), id("footer"), id("orphan_hint")]);
}

#[test]
fn content_box_honours_padding() {
    let tree = load_fixture();
    assert_eq!(
        tree.content_bounds(id("panel1")),
        Some(ResolvedBounds::new(208.0, 158.0, 384.0, 284.0))
    );
}

// ─── Dangling parents ───────────────────────────────────────────────────

#[test]
fn dangling_parent_is_top_level_in_every_query() {
    let tree = load_fixture();
    let orphan = id("orphan_hint");

    // The stored reference is kept, but nothing resolves through it.
    assert_eq!(tree.get(orphan).unwrap().parent_id, Some(id("deleted_panel")));
    assert_eq!(tree.absolute(orphan), Some((40.0, 40.0)));
    assert_eq!(tree.local(orphan), Some((40.0, 40.0)));
    assert_eq!(tree.container_of(orphan), Some(Surface::default().bounds()));
    assert_eq!(tree.parent_of(orphan), None);
    assert_eq!(tree.depth(orphan), 0);
    assert_eq!(tree.path(orphan).as_slice(), &[orphan]);
}

#[test]
fn dangling_parent_moves_against_surface() {
    let mut tree = load_fixture();
    let orphan = id("orphan_hint");
    // No clamping against a missing container.
    tree.commit_move(orphan, 790.0, 20.0).unwrap();
    assert_eq!(tree.absolute(orphan), Some((790.0, 20.0)));
}

#[test]
fn deleting_a_parent_leaves_no_dangling_children() {
    let mut tree = load_fixture();
    let removed = tree.delete(id("panel1")).unwrap();
    assert_eq!(
        removed,
        vec![id("panel1"), id("title"), id("textinput1"), id("button3")]
    );
    assert!(tree.iter().all(|w| w.parent_id != Some(id("panel1"))));
}

// ─── Documented scenarios ───────────────────────────────────────────────

#[test]
fn panel_button_scenario() {
    init_logging();
    let mut tree = WidgetTree::new();
    let p = tree.create_widget(WidgetKind::Panel, 0.0, 0.0, None).id;
    let b = tree.create_widget(WidgetKind::Button, 10.0, 10.0, Some(p)).id;
    tree.edit(p, |w| {
        w.width = 300.0;
        w.height = 200.0;
    })
    .unwrap();
    tree.edit(b, |w| {
        w.width = 100.0;
        w.height = 30.0;
    })
    .unwrap();
    assert_eq!(tree.absolute(b), Some((10.0, 10.0)));

    tree.edit(p, |w| {
        w.x = 50.0;
        w.y = 50.0;
    })
    .unwrap();
    assert_eq!(tree.absolute(b), Some((60.0, 60.0)));

    tree.set_edge_anchors(
        b,
        EdgeAnchors {
            right: true,
            ..EdgeAnchors::default()
        },
    )
    .unwrap();
    assert_eq!(tree.get(b).unwrap().design_margin_right, 190.0);

    tree.edit(p, |w| w.width = 250.0).unwrap();
    let bounds = tree.bounds(b).unwrap();
    assert_eq!((bounds.width, bounds.height), (50.0, 30.0));
}

#[test]
fn responsive_size_ignores_base_width() {
    init_logging();
    let mut tree = WidgetTree::new();
    let p = tree.create_widget(WidgetKind::Panel, 0.0, 0.0, None).id;
    let b = tree.create_widget(WidgetKind::Button, 10.0, 10.0, Some(p)).id;
    tree.set_edge_anchors(
        b,
        EdgeAnchors {
            right: true,
            ..EdgeAnchors::default()
        },
    )
    .unwrap();
    let margin = tree.get(b).unwrap().design_margin_right;

    for base in [1.0, 120.0, 5000.0] {
        tree.edit(b, |w| w.width = base).unwrap();
        assert_eq!(tree.bounds(b).unwrap().width, 300.0 - 10.0 - margin);
    }

    // Shrinking the panel below the margin collapses to zero, never negative.
    tree.edit(p, |w| w.width = 100.0).unwrap();
    assert_eq!(tree.bounds(b).unwrap().width, 0.0);
}

#[test]
fn anchored_right_top_scenario() {
    let mut tree = WidgetTree::new();
    let p = tree.create_widget(WidgetKind::Panel, 0.0, 0.0, None).id;
    let b = tree.create_widget(WidgetKind::Button, 0.0, 0.0, Some(p)).id;
    tree.set_anchor(b, pw_core::AnchorX::Right, pw_core::AnchorY::Top).unwrap();
    tree.edit(b, |w| {
        w.position_mode = pw_core::PositionMode::Anchored;
        w.offset_x = -20.0;
        w.offset_y = 10.0;
    })
    .unwrap();
    assert_eq!(tree.local(b), Some((280.0, 10.0)));
}
