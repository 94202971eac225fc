//! Hierarchy manager.
//!
//! [`WidgetTree`] owns every widget of a project in a flat, insertion-ordered
//! list with an id index. Parent/child structure is never stored as owned
//! child lists; it is derived from `parent_id` back-references whenever a
//! query needs it.
//!
//! Every mutating operation validates first and writes second, so a rejected
//! call leaves the tree exactly as it was.

use crate::config::LayoutConfig;
use crate::error::{HierarchyError, Result};
use crate::id::{IdCounters, WidgetId, generated_id};
use crate::layout::{self, Surface, WidgetLookup};
use crate::model::*;
use petgraph::graphmap::DiGraphMap;
use petgraph::visit::Dfs;
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};

/// Log a rejected mutation and hand the error back.
fn rejected<T>(err: HierarchyError) -> Result<T> {
    log::warn!("rejected: {err}");
    Err(err)
}

/// Normalize a requested parent: surface aliases mean "top-level".
fn normalize_parent(parent: Option<WidgetId>) -> Option<WidgetId> {
    parent.filter(|p| !p.is_surface_alias())
}

#[derive(Debug, Clone, Default)]
pub struct WidgetTree {
    widgets: Vec<Widget>,
    id_index: HashMap<WidgetId, usize>,
    counters: IdCounters,
    surface: Surface,
}

impl WidgetLookup for WidgetTree {
    fn widget(&self, id: WidgetId) -> Option<&Widget> {
        self.get(id)
    }
}

impl WidgetTree {
    /// An empty tree on the default 800×600 surface.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_surface(surface: Surface) -> Self {
        Self {
            surface,
            ..Self::default()
        }
    }

    pub fn with_config(config: &LayoutConfig) -> Self {
        Self::with_surface(config.surface)
    }

    pub fn surface(&self) -> Surface {
        self.surface
    }

    /// Resize the design surface. Top-level anchored and edge-anchored
    /// widgets follow on the next geometry query.
    pub fn set_surface(&mut self, surface: Surface) {
        log::debug!("surface resized to {}×{}", surface.width, surface.height);
        self.surface = surface;
    }

    pub fn counters(&self) -> &IdCounters {
        &self.counters
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Widgets in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Widget> {
        self.widgets.iter()
    }

    pub fn get(&self, id: WidgetId) -> Option<&Widget> {
        self.id_index.get(&id).map(|&i| &self.widgets[i])
    }

    pub fn contains(&self, id: WidgetId) -> bool {
        self.id_index.contains_key(&id)
    }

    /// Insertion position of `id`, used to break z-order ties.
    pub fn index_of(&self, id: WidgetId) -> Option<usize> {
        self.id_index.get(&id).copied()
    }

    fn get_mut(&mut self, id: WidgetId) -> Option<&mut Widget> {
        self.id_index.get(&id).copied().map(|i| &mut self.widgets[i])
    }

    fn require(&self, id: WidgetId) -> Result<&Widget> {
        match self.get(id) {
            Some(w) => Ok(w),
            None => rejected(HierarchyError::UnknownWidget(id)),
        }
    }

    /// Whether following stored parent references up from `start` arrives
    /// at `target`. Dangling references count, so a widget can be checked
    /// before it is inserted or renamed.
    fn chain_reaches(&self, start: Option<WidgetId>, target: WidgetId) -> bool {
        let mut seen = HashSet::new();
        let mut cursor = start;
        while let Some(p) = cursor {
            if p == target {
                return true;
            }
            if !seen.insert(p) {
                return false;
            }
            cursor = self.get(p).and_then(|w| w.parent_id);
        }
        false
    }

    /// A generated id for `kind` that is unused and would not close a
    /// parent cycle under `parent`.
    fn fresh_id(&mut self, kind: WidgetKind, parent: Option<WidgetId>) -> WidgetId {
        while let Some(id) = self.counters.allocate(kind) {
            if !self.contains(id) && !self.chain_reaches(parent, id) {
                return id;
            }
        }
        // Counter exhausted: fall back to the lowest free suffix.
        let mut n = 1;
        loop {
            let id = generated_id(kind, n);
            if !self.contains(id) && !self.chain_reaches(parent, id) {
                log::warn!("{} ids exhausted, reusing {id}", kind.type_name());
                return id;
            }
            n += 1;
        }
    }

    fn rebuild_index(&mut self) {
        self.id_index = self
            .widgets
            .iter()
            .enumerate()
            .map(|(i, w)| (w.id, i))
            .collect();
    }

    // ─── Creation and identity ───────────────────────────────────────────

    /// Create a widget of `kind` at local `(x, y)` with a generated id.
    ///
    /// The parent is a weak reference and is stored as given; an unknown
    /// parent simply makes the widget behave as top-level.
    pub fn create_widget(
        &mut self,
        kind: WidgetKind,
        x: f32,
        y: f32,
        parent: Option<WidgetId>,
    ) -> &Widget {
        let parent = normalize_parent(parent);
        let id = self.fresh_id(kind, parent);
        let mut widget = Widget::new(id, kind, x, y);
        widget.parent_id = parent;
        log::debug!("create {id} ({}) under {:?}", kind.type_name(), widget.parent_id);

        let index = self.widgets.len();
        self.widgets.push(widget);
        self.id_index.insert(id, index);
        &self.widgets[index]
    }

    /// Insert a fully formed widget, keeping its id.
    ///
    /// Used when loading or pasting. Advances the id counters past the
    /// widget's id when it follows the generated `<kind><n>` shape.
    pub fn insert_widget(&mut self, mut widget: Widget) -> Result<()> {
        if widget.id.is_empty() {
            return rejected(HierarchyError::EmptyId);
        }
        if self.contains(widget.id) {
            return rejected(HierarchyError::IdCollision(widget.id));
        }
        widget.parent_id = normalize_parent(widget.parent_id);
        if let Some(parent) = widget.parent_id {
            if parent == widget.id {
                return rejected(HierarchyError::SelfParent(widget.id));
            }
            if self.chain_reaches(Some(parent), widget.id) {
                return rejected(HierarchyError::Cycle {
                    widget: widget.id,
                    target: parent,
                });
            }
        }
        self.counters.observe(widget.id);
        log::debug!("insert {}", widget.id);

        self.id_index.insert(widget.id, self.widgets.len());
        self.widgets.push(widget);
        Ok(())
    }

    /// Rename `old` to `new`, rewriting every child's parent reference.
    pub fn rename_id(&mut self, old: WidgetId, new: WidgetId) -> Result<()> {
        if new.is_empty() {
            return rejected(HierarchyError::EmptyId);
        }
        self.require(old)?;
        if old == new {
            return Ok(());
        }
        if self.contains(new) {
            return rejected(HierarchyError::IdCollision(new));
        }
        // A dangling reference up the chain may already name `new`.
        let parent = self.get(old).and_then(|w| w.parent_id);
        if parent == Some(new) {
            return rejected(HierarchyError::SelfParent(new));
        }
        if let Some(target) = parent
            && self.chain_reaches(Some(target), new)
        {
            return rejected(HierarchyError::Cycle { widget: new, target });
        }

        for w in &mut self.widgets {
            if w.id == old {
                w.id = new;
            }
            if w.parent_id == Some(old) {
                w.parent_id = Some(new);
            }
        }
        if let Some(index) = self.id_index.remove(&old) {
            self.id_index.insert(new, index);
        }
        self.counters.observe(new);
        log::debug!("rename {old} -> {new}");
        Ok(())
    }

    /// Reseed the id counters from the ids currently in the tree.
    pub fn reseed_counters(&mut self) {
        let ids: Vec<WidgetId> = self.widgets.iter().map(|w| w.id).collect();
        self.counters.reseed(ids);
    }

    // ─── Structure queries ───────────────────────────────────────────────

    /// The parent of `id` if it resolves to a widget in this tree.
    ///
    /// Dangling references and self-references read as `None`.
    pub fn parent_of(&self, id: WidgetId) -> Option<WidgetId> {
        self.get(id)?
            .parent_id
            .filter(|&p| p != id && self.contains(p))
    }

    /// Derived parent → child index over every widget, edges in insertion
    /// order of the children.
    pub fn child_index(&self) -> DiGraphMap<WidgetId, ()> {
        let mut graph = DiGraphMap::with_capacity(self.widgets.len(), self.widgets.len());
        for w in &self.widgets {
            graph.add_node(w.id);
        }
        for w in &self.widgets {
            if let Some(parent) = self.parent_of(w.id) {
                graph.add_edge(parent, w.id, ());
            }
        }
        graph
    }

    /// Direct children of `id`, in insertion order.
    pub fn children(&self, id: WidgetId) -> SmallVec<[WidgetId; 8]> {
        self.widgets
            .iter()
            .filter(|w| w.id != id && w.parent_id == Some(id))
            .map(|w| w.id)
            .collect()
    }

    /// Every transitive descendant of `id`, excluding `id`, in insertion
    /// order.
    pub fn descendants(&self, id: WidgetId) -> Vec<WidgetId> {
        if !self.contains(id) {
            return Vec::new();
        }
        let graph = self.child_index();
        let mut dfs = Dfs::new(&graph, id);
        let mut reached = HashSet::new();
        while let Some(next) = dfs.next(&graph) {
            reached.insert(next);
        }
        self.widgets
            .iter()
            .filter(|w| w.id != id && reached.contains(&w.id))
            .map(|w| w.id)
            .collect()
    }

    /// Whether `ancestor` appears on the parent chain of `descendant`.
    pub fn is_ancestor_of(&self, ancestor: WidgetId, descendant: WidgetId) -> bool {
        self.ancestors(descendant).contains(&ancestor)
    }

    /// Parent chain of `id`, nearest first. Stops at dangling references
    /// and on any repeated widget.
    pub fn ancestors(&self, id: WidgetId) -> SmallVec<[WidgetId; 8]> {
        let Some(widget) = self.get(id) else {
            return SmallVec::new();
        };
        layout::ancestor_chain(self, widget)
            .iter()
            .rev()
            .map(|w| w.id)
            .collect()
    }

    /// Number of ancestors; top-level widgets have depth 0.
    pub fn depth(&self, id: WidgetId) -> usize {
        self.ancestors(id).len()
    }

    /// Ids from the outermost ancestor down to `id` itself.
    pub fn path(&self, id: WidgetId) -> SmallVec<[WidgetId; 8]> {
        if !self.contains(id) {
            return SmallVec::new();
        }
        let mut path = self.ancestors(id);
        path.reverse();
        path.push(id);
        path
    }

    /// Other widgets sharing the effective parent of `id`.
    pub fn siblings(&self, id: WidgetId) -> SmallVec<[WidgetId; 8]> {
        if !self.contains(id) {
            return SmallVec::new();
        }
        let parent = self.parent_of(id);
        self.widgets
            .iter()
            .filter(|w| w.id != id && self.parent_of(w.id) == parent)
            .map(|w| w.id)
            .collect()
    }

    /// Widgets laid out directly against the surface, including orphans.
    pub fn top_level(&self) -> Vec<WidgetId> {
        self.widgets
            .iter()
            .filter(|w| self.parent_of(w.id).is_none())
            .map(|w| w.id)
            .collect()
    }

    // ─── Geometry queries ────────────────────────────────────────────────

    /// Resolved absolute bounds of `id`.
    pub fn bounds(&self, id: WidgetId) -> Option<ResolvedBounds> {
        let w = self.get(id)?;
        Some(layout::resolve_bounds(self, self.surface, w))
    }

    pub fn absolute(&self, id: WidgetId) -> Option<(f32, f32)> {
        self.bounds(id).map(|b| (b.x, b.y))
    }

    /// Position of `id` relative to its container.
    pub fn local(&self, id: WidgetId) -> Option<(f32, f32)> {
        let w = self.get(id)?;
        let c = layout::resolve_container(self, self.surface, w);
        Some(layout::resolve_local(w, c.width, c.height))
    }

    /// Bounds of the rectangle `id` is laid out against.
    pub fn container_of(&self, id: WidgetId) -> Option<ResolvedBounds> {
        let w = self.get(id)?;
        Some(layout::resolve_container(self, self.surface, w))
    }

    /// Resolved bounds minus padding.
    pub fn content_bounds(&self, id: WidgetId) -> Option<ResolvedBounds> {
        let padding = self.get(id)?.padding;
        self.bounds(id).map(|b| b.inset(padding))
    }

    /// Resolved bounds plus margin.
    pub fn outer_bounds(&self, id: WidgetId) -> Option<ResolvedBounds> {
        let margin = self.get(id)?.margin;
        self.bounds(id).map(|b| b.outset(margin))
    }

    // ─── Mutation ────────────────────────────────────────────────────────

    /// Move `id` under `new_parent` (or the surface for `None`) without
    /// changing where it appears, as far as the new container allows.
    ///
    /// Absolute-mode widgets are clamped into a real parent container but
    /// never into the surface. Anchored widgets keep their anchor choice and
    /// get recomputed offsets.
    pub fn reparent(&mut self, id: WidgetId, new_parent: Option<WidgetId>) -> Result<()> {
        self.require(id)?;
        let new_parent = normalize_parent(new_parent);

        if let Some(target) = new_parent {
            if target == id {
                return rejected(HierarchyError::SelfParent(id));
            }
            let target_kind = self.require(target)?.kind;
            if self.descendants(id).contains(&target) {
                return rejected(HierarchyError::Cycle { widget: id, target });
            }
            if !target_kind.is_container() {
                return rejected(HierarchyError::NotAContainer(target));
            }
        }

        let widget = self.require(id)?;
        let current = layout::resolve_bounds(self, self.surface, widget);
        let container = layout::container_bounds(self, self.surface, new_parent);
        let placement = layout::place_at(widget, current, container, new_parent.is_some());
        log::debug!("reparent {id} -> {new_parent:?} as {placement:?}");

        if let Some(w) = self.get_mut(id) {
            w.parent_id = new_parent;
            placement.apply(w);
        }
        Ok(())
    }

    /// Remove `id` and every transitive descendant. Returns the removed ids
    /// in insertion order.
    pub fn delete(&mut self, id: WidgetId) -> Result<Vec<WidgetId>> {
        self.require(id)?;
        let mut doomed: HashSet<WidgetId> = self.descendants(id).into_iter().collect();
        doomed.insert(id);

        let removed: Vec<WidgetId> = self
            .widgets
            .iter()
            .filter(|w| doomed.contains(&w.id))
            .map(|w| w.id)
            .collect();
        self.widgets.retain(|w| !doomed.contains(&w.id));
        self.rebuild_index();
        log::debug!("delete {id} ({} widgets)", removed.len());
        Ok(removed)
    }

    /// Commit a drag: place `id` at absolute `(abs_x, abs_y)` against its
    /// current container, in the widget's own position model.
    pub fn commit_move(&mut self, id: WidgetId, abs_x: f32, abs_y: f32) -> Result<()> {
        let widget = self.require(id)?;
        let container = layout::resolve_container(self, self.surface, widget);
        let current = layout::resolve_bounds(self, self.surface, widget);
        let target = ResolvedBounds::new(abs_x, abs_y, current.width, current.height);
        let has_parent = self.parent_of(id).is_some();
        let placement = layout::place_at(widget, target, container, has_parent);
        log::debug!("commit move {id}: {placement:?}");

        if let Some(w) = self.get_mut(id) {
            placement.apply(w);
        }
        Ok(())
    }

    /// Commit a resize. On edge-anchored axes the design margin is taken
    /// again so the resolved size equals the committed one.
    pub fn commit_resize(&mut self, id: WidgetId, width: f32, height: f32) -> Result<()> {
        let widget = self.require(id)?;
        let container = layout::resolve_container(self, self.surface, widget);
        let (lx, ly) = layout::resolve_local(widget, container.width, container.height);
        let margin_right = container.width - lx - width;
        let margin_bottom = container.height - ly - height;
        log::debug!("commit resize {id}: {width}×{height}");

        if let Some(w) = self.get_mut(id) {
            w.width = width;
            w.height = height;
            if w.anchor_right {
                w.design_margin_right = margin_right;
            }
            if w.anchor_bottom {
                w.design_margin_bottom = margin_bottom;
            }
        }
        Ok(())
    }

    /// Replace the edge-anchor flags of `id`. Turning right or bottom on
    /// snapshots the current gap to that container edge.
    pub fn set_edge_anchors(&mut self, id: WidgetId, anchors: EdgeAnchors) -> Result<()> {
        let widget = self.require(id)?;
        let container = layout::resolve_container(self, self.surface, widget);
        let (margin_right, margin_bottom) = layout::design_margins(widget, container);
        let snap_right = anchors.right && !widget.anchor_right;
        let snap_bottom = anchors.bottom && !widget.anchor_bottom;

        if let Some(w) = self.get_mut(id) {
            w.anchor_left = anchors.left;
            w.anchor_right = anchors.right;
            w.anchor_top = anchors.top;
            w.anchor_bottom = anchors.bottom;
            if snap_right {
                w.design_margin_right = margin_right;
            }
            if snap_bottom {
                w.design_margin_bottom = margin_bottom;
            }
        }
        Ok(())
    }

    /// Switch `id` to `mode`, recomputing the newly authoritative fields
    /// from the current position.
    pub fn set_position_mode(&mut self, id: WidgetId, mode: PositionMode) -> Result<()> {
        let widget = self.require(id)?;
        if widget.position_mode == mode {
            return Ok(());
        }
        let container = layout::resolve_container(self, self.surface, widget);
        let placement = layout::convert_mode(widget, mode, container);

        if let Some(w) = self.get_mut(id) {
            placement.apply(w);
        }
        Ok(())
    }

    /// Pick a new anchor point. Anchored widgets keep their position.
    pub fn set_anchor(&mut self, id: WidgetId, anchor_x: AnchorX, anchor_y: AnchorY) -> Result<()> {
        let widget = self.require(id)?;
        let container = layout::resolve_container(self, self.surface, widget);
        let (lx, ly) = layout::resolve_local(widget, container.width, container.height);
        let offsets = layout::offsets_for_local(anchor_x, anchor_y, lx, ly, container.width, container.height);

        if let Some(w) = self.get_mut(id) {
            w.anchor_x = anchor_x;
            w.anchor_y = anchor_y;
            if w.position_mode == PositionMode::Anchored {
                (w.offset_x, w.offset_y) = offsets;
            }
        }
        Ok(())
    }

    /// Raise `id` above every widget in the project. Returns the new z.
    pub fn bring_to_front(&mut self, id: WidgetId) -> Result<i32> {
        self.require(id)?;
        let top = self.widgets.iter().map(|w| w.z_index).fold(0, i32::max);
        let z = top.saturating_add(1);
        if let Some(w) = self.get_mut(id) {
            w.z_index = z;
        }
        Ok(z)
    }

    /// Lower `id` beneath every widget in the project. Returns the new z.
    pub fn send_to_back(&mut self, id: WidgetId) -> Result<i32> {
        self.require(id)?;
        let bottom = self.widgets.iter().map(|w| w.z_index).fold(0, i32::min);
        let z = bottom.saturating_sub(1);
        if let Some(w) = self.get_mut(id) {
            w.z_index = z;
        }
        Ok(z)
    }

    /// Apply a property edit. Identity and hierarchy fields are restored
    /// afterwards: use [`rename_id`](Self::rename_id) and
    /// [`reparent`](Self::reparent) for those.
    ///
    /// An edit that turns `anchor_right` or `anchor_bottom` on snapshots the
    /// design margin from the geometry before the edit, as
    /// [`set_edge_anchors`](Self::set_edge_anchors) does.
    pub fn edit(&mut self, id: WidgetId, f: impl FnOnce(&mut Widget)) -> Result<()> {
        let widget = self.require(id)?;
        let container = layout::resolve_container(self, self.surface, widget);
        let (margin_right, margin_bottom) = layout::design_margins(widget, container);

        if let Some(w) = self.get_mut(id) {
            let (id, kind, parent_id) = (w.id, w.kind, w.parent_id);
            let (was_right, was_bottom) = (w.anchor_right, w.anchor_bottom);
            f(w);
            w.id = id;
            w.kind = kind;
            w.parent_id = parent_id;
            w.opacity = w.opacity.min(100);
            if w.anchor_right && !was_right {
                w.design_margin_right = margin_right;
            }
            if w.anchor_bottom && !was_bottom {
                w.design_margin_bottom = margin_bottom;
            }
        }
        Ok(())
    }
}
