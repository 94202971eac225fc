//! Geometry resolver.
//!
//! Turns a widget's stored position/size fields plus its ancestor chain into
//! absolute design-surface bounds. Everything here is a pure function of the
//! model: nothing is cached, so a property edit is visible on the very next
//! query. Each query costs O(depth of the widget).
//!
//! Dangling parent references are not errors. A widget whose `parent_id`
//! does not resolve is laid out against the design surface, in every query.

use crate::id::WidgetId;
use crate::model::*;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;

/// The design surface top-level widgets are laid out against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    pub width: f32,
    pub height: f32,
}

impl Default for Surface {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

impl Surface {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn bounds(&self) -> ResolvedBounds {
        ResolvedBounds::new(0.0, 0.0, self.width, self.height)
    }
}

/// Id → widget lookup the resolver walks parent chains through.
pub trait WidgetLookup {
    fn widget(&self, id: WidgetId) -> Option<&Widget>;
}

impl WidgetLookup for HashMap<WidgetId, Widget> {
    fn widget(&self, id: WidgetId) -> Option<&Widget> {
        self.get(&id)
    }
}

// ─── Local resolution ────────────────────────────────────────────────────

/// The anchor point of `(anchor_x, anchor_y)` on a `cw × ch` container.
pub fn anchor_point(anchor_x: AnchorX, anchor_y: AnchorY, cw: f32, ch: f32) -> (f32, f32) {
    (anchor_x.resolve(cw), anchor_y.resolve(ch))
}

/// Position of `widget` relative to its container's origin.
pub fn resolve_local(widget: &Widget, cw: f32, ch: f32) -> (f32, f32) {
    match widget.position_mode {
        PositionMode::Absolute => (widget.x, widget.y),
        PositionMode::Anchored => {
            let (ax, ay) = anchor_point(widget.anchor_x, widget.anchor_y, cw, ch);
            (ax + widget.offset_x, ay + widget.offset_y)
        }
    }
}

/// Effective size of `widget` at local `(lx, ly)` inside a `cw × ch` container.
///
/// Right/bottom edge anchors stretch the widget so its gap to that edge
/// stays equal to the design margin. Degenerate results clamp to zero.
pub fn resolve_size(widget: &Widget, cw: f32, ch: f32, lx: f32, ly: f32) -> (f32, f32) {
    let width = if widget.anchor_right {
        (cw - lx - widget.design_margin_right).max(0.0)
    } else {
        widget.width
    };
    let height = if widget.anchor_bottom {
        (ch - ly - widget.design_margin_bottom).max(0.0)
    } else {
        widget.height
    };
    (width, height)
}

/// Offsets that place a widget at local `(lx, ly)` under the given anchors.
///
/// Inverse of the anchored branch of [`resolve_local`].
pub fn offsets_for_local(
    anchor_x: AnchorX,
    anchor_y: AnchorY,
    lx: f32,
    ly: f32,
    cw: f32,
    ch: f32,
) -> (f32, f32) {
    let (ax, ay) = anchor_point(anchor_x, anchor_y, cw, ch);
    (lx - ax, ly - ay)
}

/// Bounds of `widget` inside an already-resolved `container`.
pub fn resolve_in(widget: &Widget, container: ResolvedBounds) -> ResolvedBounds {
    let (lx, ly) = resolve_local(widget, container.width, container.height);
    let (width, height) = resolve_size(widget, container.width, container.height, lx, ly);
    ResolvedBounds::new(container.x + lx, container.y + ly, width, height)
}

// ─── Absolute resolution ─────────────────────────────────────────────────

/// Ancestors of `widget`, outermost first.
///
/// The walk stops at the first parent reference that does not resolve, and
/// at the first widget already seen, so corrupt data containing a parent
/// cycle still yields a finite chain.
pub fn ancestor_chain<'a, L>(lookup: &'a L, widget: &'a Widget) -> SmallVec<[&'a Widget; 8]>
where
    L: WidgetLookup + ?Sized,
{
    let mut chain: SmallVec<[&'a Widget; 8]> = SmallVec::new();
    let mut current = widget;
    while let Some(parent) = current.parent_id.and_then(|pid| lookup.widget(pid)) {
        if parent.id == widget.id || chain.iter().any(|w| w.id == parent.id) {
            log::warn!("parent cycle through `{}`, treating as top-level", parent.id);
            break;
        }
        chain.push(parent);
        current = parent;
    }
    chain.reverse();
    chain
}

/// The rectangle `widget` is laid out against: its parent's resolved
/// bounds, or the surface when it is top-level or its parent is missing.
pub fn resolve_container<L>(lookup: &L, surface: Surface, widget: &Widget) -> ResolvedBounds
where
    L: WidgetLookup + ?Sized,
{
    ancestor_chain(lookup, widget)
        .iter()
        .fold(surface.bounds(), |container, ancestor| resolve_in(ancestor, container))
}

/// Absolute bounds of `widget` on the design surface.
pub fn resolve_bounds<L>(lookup: &L, surface: Surface, widget: &Widget) -> ResolvedBounds
where
    L: WidgetLookup + ?Sized,
{
    resolve_in(widget, resolve_container(lookup, surface, widget))
}

/// Absolute origin of `widget` on the design surface.
pub fn resolve_absolute<L>(lookup: &L, surface: Surface, widget: &Widget) -> (f32, f32)
where
    L: WidgetLookup + ?Sized,
{
    let b = resolve_bounds(lookup, surface, widget);
    (b.x, b.y)
}

/// Bounds a child of `parent` would be laid out against.
pub fn container_bounds<L>(lookup: &L, surface: Surface, parent: Option<WidgetId>) -> ResolvedBounds
where
    L: WidgetLookup + ?Sized,
{
    match parent.and_then(|pid| lookup.widget(pid)) {
        Some(p) => resolve_bounds(lookup, surface, p),
        None => surface.bounds(),
    }
}

// ─── Re-basing ───────────────────────────────────────────────────────────

/// New values for whichever position fields are authoritative on a widget.
///
/// Computed in full before anything is written, then applied in one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    Absolute { x: f32, y: f32 },
    Anchored { offset_x: f32, offset_y: f32 },
}

impl Placement {
    pub fn apply(self, widget: &mut Widget) {
        match self {
            Placement::Absolute { x, y } => {
                widget.position_mode = PositionMode::Absolute;
                widget.x = x;
                widget.y = y;
            }
            Placement::Anchored { offset_x, offset_y } => {
                widget.position_mode = PositionMode::Anchored;
                widget.offset_x = offset_x;
                widget.offset_y = offset_y;
            }
        }
    }
}

fn clamp_axis(local: f32, container_extent: f32, extent: f32) -> f32 {
    local.min(container_extent - extent).max(0.0)
}

/// Express the absolute rectangle `target` in `widget`'s own position
/// model, relative to `container`.
///
/// `target` carries the resolved size, so edge-anchored widgets clamp
/// against what is drawn rather than their base size. Absolute-mode widgets
/// get `(x, y)`; with `clamp` they are kept inside the container
/// (`0..=container - size` per axis, pinned to 0 when the widget is larger).
/// Anchored widgets keep their anchor choice and get new offsets.
pub fn place_at(
    widget: &Widget,
    target: ResolvedBounds,
    container: ResolvedBounds,
    clamp: bool,
) -> Placement {
    let lx = target.x - container.x;
    let ly = target.y - container.y;
    match widget.position_mode {
        PositionMode::Absolute if clamp => Placement::Absolute {
            x: clamp_axis(lx, container.width, target.width),
            y: clamp_axis(ly, container.height, target.height),
        },
        PositionMode::Absolute => Placement::Absolute { x: lx, y: ly },
        PositionMode::Anchored => {
            let (offset_x, offset_y) = offsets_for_local(
                widget.anchor_x,
                widget.anchor_y,
                lx,
                ly,
                container.width,
                container.height,
            );
            Placement::Anchored { offset_x, offset_y }
        }
    }
}

/// Placement that switches `widget` to `mode` without moving it.
pub fn convert_mode(widget: &Widget, mode: PositionMode, container: ResolvedBounds) -> Placement {
    let (lx, ly) = resolve_local(widget, container.width, container.height);
    match mode {
        PositionMode::Absolute => Placement::Absolute { x: lx, y: ly },
        PositionMode::Anchored => {
            let (offset_x, offset_y) = offsets_for_local(
                widget.anchor_x,
                widget.anchor_y,
                lx,
                ly,
                container.width,
                container.height,
            );
            Placement::Anchored { offset_x, offset_y }
        }
    }
}

/// Current gaps from `widget` to the container's right and bottom edges.
pub fn design_margins(widget: &Widget, container: ResolvedBounds) -> (f32, f32) {
    let (lx, ly) = resolve_local(widget, container.width, container.height);
    let (w, h) = resolve_size(widget, container.width, container.height, lx, ly);
    (container.width - lx - w, container.height - ly - h)
}
