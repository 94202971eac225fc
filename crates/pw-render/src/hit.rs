//! Hit testing: point → widget lookup.
//!
//! Walks the paint list back to front, so the widget drawn last is the one
//! under the pointer. Bounds are edge-inclusive and come from
//! [`display_bounds`], so a widget mid-drag is hit where it is drawn.
//! Hidden and non-interactive widgets are still hit: the editor has to be
//! able to select them.

use crate::paint::{Overlay, display_bounds, paint_order};
use pw_core::{WidgetId, WidgetTree};

/// Every widget, topmost first: the exact reverse of [`paint_order`].
pub fn hit_test_order(tree: &WidgetTree) -> Vec<WidgetId> {
    let mut order = paint_order(tree);
    order.reverse();
    order
}

/// Find the topmost widget at `(px, py)`.
/// Returns `None` on empty surface.
pub fn hit_test(tree: &WidgetTree, overlay: &Overlay, px: f32, py: f32) -> Option<WidgetId> {
    hit_test_order(tree)
        .into_iter()
        .find(|&id| display_bounds(tree, overlay, id).is_some_and(|b| b.contains(px, py)))
}

/// Topmost container at `(px, py)` that `dragged` could be dropped into:
/// a container kind that is neither `dragged` nor one of its descendants.
pub fn drop_target(tree: &WidgetTree, px: f32, py: f32, dragged: WidgetId) -> Option<WidgetId> {
    hit_test_order(tree).into_iter().find(|&id| {
        id != dragged
            && !tree.is_ancestor_of(dragged, id)
            && tree.get(id).is_some_and(|w| w.kind.is_container())
            && tree.bounds(id).is_some_and(|b| b.contains(px, py))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pw_core::WidgetKind;

    #[test]
    fn topmost_by_z_wins() {
        let mut tree = WidgetTree::new();
        let low = tree.create_widget(WidgetKind::Button, 0.0, 0.0, None).id;
        let high = tree.create_widget(WidgetKind::Button, 50.0, 0.0, None).id;
        tree.edit(low, |w| w.z_index = 1).unwrap();
        let overlay = Overlay::new();

        // Overlap region [50, 120]: low has the higher z.
        assert_eq!(hit_test(&tree, &overlay, 60.0, 10.0), Some(low));
        assert_eq!(hit_test(&tree, &overlay, 150.0, 10.0), Some(high));
        assert_eq!(hit_test(&tree, &overlay, 500.0, 500.0), None);
    }

    #[test]
    fn ties_go_to_the_later_widget() {
        let mut tree = WidgetTree::new();
        tree.create_widget(WidgetKind::Button, 0.0, 0.0, None);
        let second = tree.create_widget(WidgetKind::Button, 0.0, 0.0, None).id;
        assert_eq!(hit_test(&tree, &Overlay::new(), 0.0, 0.0), Some(second));
        assert_eq!(hit_test_order(&tree)[0], second);
    }

    #[test]
    fn edges_are_inclusive() {
        let mut tree = WidgetTree::new();
        let b = tree.create_widget(WidgetKind::Button, 10.0, 10.0, None).id;
        let overlay = Overlay::new();
        assert_eq!(hit_test(&tree, &overlay, 130.0, 50.0), Some(b));
        assert_eq!(hit_test(&tree, &overlay, 130.5, 50.0), None);
    }

    #[test]
    fn hidden_widgets_are_still_hit() {
        let mut tree = WidgetTree::new();
        let b = tree.create_widget(WidgetKind::Button, 0.0, 0.0, None).id;
        tree.edit(b, |w| {
            w.visible = false;
            w.interactive = false;
        })
        .unwrap();
        assert_eq!(hit_test(&tree, &Overlay::new(), 5.0, 5.0), Some(b));
    }

    #[test]
    fn dragged_widget_is_hit_at_live_position() {
        let mut tree = WidgetTree::new();
        let b = tree.create_widget(WidgetKind::Button, 0.0, 0.0, None).id;
        let mut overlay = Overlay::new();
        overlay.set_position(b, 300.0, 300.0);
        assert_eq!(hit_test(&tree, &overlay, 5.0, 5.0), None);
        assert_eq!(hit_test(&tree, &overlay, 310.0, 310.0), Some(b));
    }

    #[test]
    fn drop_target_skips_self_descendants_and_leaves() {
        let mut tree = WidgetTree::new();
        let outer = tree.create_widget(WidgetKind::Panel, 0.0, 0.0, None).id;
        let inner = tree.create_widget(WidgetKind::Panel, 10.0, 10.0, Some(outer)).id;
        let label = tree.create_widget(WidgetKind::Label, 20.0, 20.0, None).id;

        assert_eq!(drop_target(&tree, 25.0, 25.0, label), Some(inner));
        assert_eq!(drop_target(&tree, 25.0, 25.0, inner), Some(outer));
        assert_eq!(drop_target(&tree, 25.0, 25.0, outer), None);
        assert_eq!(drop_target(&tree, 700.0, 500.0, label), None);
    }
}
