//! Widget tree → paint list.
//!
//! Produces the globally z-sorted list of widgets with display bounds and
//! preview opacity. Pixel work (borders, images, text) happens downstream;
//! a painter only ever reads the geometry computed here, never raw
//! `x/y/width/height`.

use pw_core::{ResolvedBounds, WidgetId, WidgetTree};
use smallvec::SmallVec;

/// Live geometry for one widget mid-gesture, in absolute surface units.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Ephemeral {
    pub position: Option<(f32, f32)>,
    pub size: Option<(f32, f32)>,
}

/// Ephemeral render geometry keyed by widget id.
///
/// Held apart from the canonical model: writing here never touches a
/// widget, and clearing it restores the committed appearance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overlay {
    entries: SmallVec<[(WidgetId, Ephemeral); 2]>,
}

impl Overlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: WidgetId) -> Option<&Ephemeral> {
        self.entries.iter().find(|(k, _)| *k == id).map(|(_, e)| e)
    }

    fn entry(&mut self, id: WidgetId) -> &mut Ephemeral {
        let pos = match self.entries.iter().position(|(k, _)| *k == id) {
            Some(pos) => pos,
            None => {
                self.entries.push((id, Ephemeral::default()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[pos].1
    }

    pub fn set_position(&mut self, id: WidgetId, x: f32, y: f32) {
        self.entry(id).position = Some((x, y));
    }

    pub fn set_size(&mut self, id: WidgetId, width: f32, height: f32) {
        self.entry(id).size = Some((width, height));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Where `id` should be drawn right now.
///
/// Its own overlay entry wins. Otherwise, if an ancestor is being dragged,
/// the widget moves along with it by the same delta.
pub fn display_bounds(tree: &WidgetTree, overlay: &Overlay, id: WidgetId) -> Option<ResolvedBounds> {
    let mut bounds = tree.bounds(id)?;
    if overlay.is_empty() {
        return Some(bounds);
    }

    if let Some(live) = overlay.get(id) {
        if let Some((w, h)) = live.size {
            bounds.width = w;
            bounds.height = h;
        }
        if let Some((x, y)) = live.position {
            bounds.x = x;
            bounds.y = y;
            return Some(bounds);
        }
    }

    for ancestor in tree.ancestors(id) {
        if let Some((x, y)) = overlay.get(ancestor).and_then(|e| e.position) {
            let committed = tree.bounds(ancestor)?;
            bounds.x += x - committed.x;
            bounds.y += y - committed.y;
            break;
        }
    }
    Some(bounds)
}

/// Every widget sorted by ascending `z_index`, ties in insertion order.
///
/// One flat list for the whole project: a child with a low z can end up
/// behind an unrelated widget that sits under its parent.
pub fn paint_order(tree: &WidgetTree) -> Vec<WidgetId> {
    let mut order: Vec<(i32, WidgetId)> = tree.iter().map(|w| (w.z_index, w.id)).collect();
    order.sort_by_key(|&(z, _)| z);
    order.into_iter().map(|(_, id)| id).collect()
}

/// Product of own opacities along the parent chain, 0.0..=1.0.
pub fn effective_opacity(tree: &WidgetTree, id: WidgetId) -> Option<f32> {
    let path = tree.path(id);
    if path.is_empty() {
        return None;
    }
    Some(
        path.iter()
            .filter_map(|&p| tree.get(p))
            .map(|w| w.opacity_factor())
            .product(),
    )
}

/// Opacity the editor preview uses.
///
/// Same chain as [`effective_opacity`], except every hidden widget on the
/// path contributes its own opacity times `hidden_factor`. Two hidden levels
/// at 100% with a 0.3 factor preview at 0.09.
pub fn preview_opacity(tree: &WidgetTree, id: WidgetId, hidden_factor: f32) -> Option<f32> {
    let path = tree.path(id);
    if path.is_empty() {
        return None;
    }
    Some(
        path.iter()
            .filter_map(|&p| tree.get(p))
            .map(|w| {
                let own = w.opacity_factor();
                if w.visible { own } else { own * hidden_factor }
            })
            .product(),
    )
}

/// One entry of the paint list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaintItem {
    pub id: WidgetId,
    pub bounds: ResolvedBounds,
    pub opacity: f32,
    pub hidden: bool,
}

/// Back-to-front list of everything the painter should draw this frame.
pub fn paint_list(tree: &WidgetTree, overlay: &Overlay, hidden_factor: f32) -> Vec<PaintItem> {
    let mut items = Vec::with_capacity(tree.len());
    for id in paint_order(tree) {
        let (Some(bounds), Some(opacity), Some(widget)) = (
            display_bounds(tree, overlay, id),
            preview_opacity(tree, id, hidden_factor),
            tree.get(id),
        ) else {
            continue;
        };
        log::trace!(
            "paint {id}: ({}, {}) {}×{} α={opacity}",
            bounds.x,
            bounds.y,
            bounds.width,
            bounds.height
        );
        items.push(PaintItem {
            id,
            bounds,
            opacity,
            hidden: !widget.visible,
        });
    }
    items
}
