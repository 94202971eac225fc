//! Editor session: the widget tree plus the manipulation controller.
//!
//! The session is the single owner of the canonical model. Pointer events go
//! through the controller and come back as commits; structural requests from
//! the hierarchy panel (re-parent, delete, rename) go straight to the tree.
//! Either way every write to the model happens here, synchronously, between
//! render ticks.

use crate::input::InputEvent;
use crate::tools::{Commit, CursorShape, ManipulationController};
use pw_core::{
    AnchorX, AnchorY, EdgeAnchors, LayoutConfig, PositionMode, Result, Snapshot, SnapshotError,
    Surface, Widget, WidgetId, WidgetKind, WidgetTree,
};
use pw_render::{PaintItem, drop_target, paint_list};

pub struct EditorSession {
    tree: WidgetTree,
    controller: ManipulationController,
    config: LayoutConfig,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

impl EditorSession {
    /// An empty project.
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            tree: WidgetTree::with_config(&config),
            controller: ManipulationController::new(&config),
            config,
        }
    }

    /// Open a project snapshot. The snapshot's canvas size replaces the
    /// configured surface.
    pub fn open(snapshot: Snapshot, mut config: LayoutConfig) -> std::result::Result<Self, SnapshotError> {
        let tree = WidgetTree::from_snapshot(snapshot)?;
        config.surface = tree.surface();
        Ok(Self {
            controller: ManipulationController::new(&config),
            tree,
            config,
        })
    }

    pub fn tree(&self) -> &WidgetTree {
        &self.tree
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn controller(&self) -> &ManipulationController {
        &self.controller
    }

    pub fn snapshot(&self) -> Snapshot {
        self.tree.snapshot()
    }

    pub fn selected(&self) -> Option<WidgetId> {
        self.controller.selected()
    }

    pub fn cursor(&self) -> CursorShape {
        self.controller.cursor()
    }

    /// Select from outside the canvas. Unknown ids clear the selection.
    pub fn select(&mut self, id: Option<WidgetId>) {
        let id = id.filter(|&id| self.tree.contains(id));
        self.controller.select(id);
    }

    // ─── Canvas input ────────────────────────────────────────────────────

    /// Feed one pointer event. When it finishes a gesture, the commit is
    /// applied to the tree and returned.
    pub fn handle_input(&mut self, event: &InputEvent) -> Result<Option<Commit>> {
        let Some(commit) = self.controller.handle(event, &self.tree) else {
            return Ok(None);
        };
        commit.apply(&mut self.tree)?;
        Ok(Some(commit))
    }

    /// What the painter should draw this frame, back to front.
    pub fn paint_list(&self) -> Vec<PaintItem> {
        paint_list(&self.tree, self.controller.overlay(), self.config.hidden_opacity_factor)
    }

    // ─── Structural edits ────────────────────────────────────────────────

    /// Drop the running gesture if it targets any of `ids`.
    fn cancel_gesture_on(&mut self, ids: &[WidgetId]) {
        if let Some(active) = self.controller.gesture().widget()
            && ids.contains(&active)
        {
            self.controller.cancel();
        }
    }

    pub fn create_widget(
        &mut self,
        kind: WidgetKind,
        x: f32,
        y: f32,
        parent: Option<WidgetId>,
    ) -> WidgetId {
        self.tree.create_widget(kind, x, y, parent).id
    }

    /// Paste or load a widget with its own id.
    pub fn insert_widget(&mut self, widget: Widget) -> Result<()> {
        self.tree.insert_widget(widget)
    }

    pub fn rename(&mut self, old: WidgetId, new: WidgetId) -> Result<()> {
        self.tree.rename_id(old, new)?;
        if old == new {
            return Ok(());
        }
        self.cancel_gesture_on(&[old]);
        if self.controller.selected() == Some(old) {
            self.controller.select(Some(new));
        }
        Ok(())
    }

    /// Move `id` under `parent` (or the surface), keeping its position.
    /// A gesture on the widget or anything inside it is cancelled.
    pub fn reparent(&mut self, id: WidgetId, parent: Option<WidgetId>) -> Result<()> {
        self.tree.reparent(id, parent)?;
        let mut affected = self.tree.descendants(id);
        affected.push(id);
        self.cancel_gesture_on(&affected);
        Ok(())
    }

    /// Re-parent `id` into whatever container is under `(px, py)`, or onto
    /// the surface when there is none. Returns the new parent.
    pub fn drop_at(&mut self, id: WidgetId, px: f32, py: f32) -> Result<Option<WidgetId>> {
        let target = drop_target(&self.tree, px, py, id);
        self.reparent(id, target)?;
        Ok(target)
    }

    /// Delete `id` and its subtree. Returns the removed ids.
    pub fn delete(&mut self, id: WidgetId) -> Result<Vec<WidgetId>> {
        let removed = self.tree.delete(id)?;
        self.cancel_gesture_on(&removed);
        if self
            .controller
            .selected()
            .is_some_and(|sel| removed.contains(&sel))
        {
            self.controller.select(None);
        }
        Ok(removed)
    }

    /// Property edit from the inspector. A gesture on the widget or anything
    /// inside it is cancelled, since its grab geometry may no longer hold.
    pub fn edit(&mut self, id: WidgetId, f: impl FnOnce(&mut Widget)) -> Result<()> {
        self.tree.edit(id, f)?;
        let mut affected = self.tree.descendants(id);
        affected.push(id);
        self.cancel_gesture_on(&affected);
        Ok(())
    }

    pub fn set_edge_anchors(&mut self, id: WidgetId, anchors: EdgeAnchors) -> Result<()> {
        self.tree.set_edge_anchors(id, anchors)
    }

    pub fn set_position_mode(&mut self, id: WidgetId, mode: PositionMode) -> Result<()> {
        self.tree.set_position_mode(id, mode)
    }

    pub fn set_anchor(&mut self, id: WidgetId, anchor_x: AnchorX, anchor_y: AnchorY) -> Result<()> {
        self.tree.set_anchor(id, anchor_x, anchor_y)
    }

    /// Resize the design surface. Drops any running gesture, whose surface
    /// clamp was computed against the old size.
    pub fn set_surface(&mut self, surface: Surface) {
        self.controller.cancel();
        self.config.surface = surface;
        self.tree.set_surface(surface);
    }

    pub fn bring_to_front(&mut self, id: WidgetId) -> Result<i32> {
        self.tree.bring_to_front(id)
    }

    pub fn send_to_back(&mut self, id: WidgetId) -> Result<i32> {
        self.tree.send_to_back(id)
    }
}
