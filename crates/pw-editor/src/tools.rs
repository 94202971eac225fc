//! Manipulation controller for canvas interactions.
//!
//! Translates pointer events into live feedback and, on release, a single
//! [`Commit`] for the hierarchy manager to apply.
//!
//! | State | Enter | Move | Release |
//! |-------|-------|------|---------|
//! | Idle | default | hover cursor only | n/a |
//! | Dragging | press inside a widget (topmost wins) | ephemeral position, clamped to surface | `Commit::Move` |
//! | Resizing | press on a handle of the selected widget | ephemeral size, floored at the minimum | `Commit::Resize` |
//!
//! While a gesture runs, only the [`Overlay`] changes. The tree is read,
//! never written.

use crate::input::InputEvent;
use pw_core::{LayoutConfig, ResolvedBounds, WidgetId, WidgetTree};
use pw_render::{Overlay, hit_test};

/// Pointer cursor to show over the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorShape {
    #[default]
    Default,
    Move,
    EwResize,
    NsResize,
    NwseResize,
}

/// Grab points on the selected widget's right and bottom edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeHandle {
    East,
    South,
    SouthEast,
}

impl ResizeHandle {
    /// The handle of `bounds` under `(px, py)`, if any. The corner wins
    /// over both edges.
    pub fn at(bounds: ResolvedBounds, px: f32, py: f32, tolerance: f32) -> Option<Self> {
        let near_right = (px - bounds.right()).abs() < tolerance;
        let near_bottom = (py - bounds.bottom()).abs() < tolerance;
        let within_x = px >= bounds.x && px <= bounds.right();
        let within_y = py >= bounds.y && py <= bounds.bottom();

        if near_right && near_bottom {
            Some(ResizeHandle::SouthEast)
        } else if near_right && within_y {
            Some(ResizeHandle::East)
        } else if near_bottom && within_x {
            Some(ResizeHandle::South)
        } else {
            None
        }
    }

    pub fn cursor(self) -> CursorShape {
        match self {
            ResizeHandle::East => CursorShape::EwResize,
            ResizeHandle::South => CursorShape::NsResize,
            ResizeHandle::SouthEast => CursorShape::NwseResize,
        }
    }

    fn resizes_width(self) -> bool {
        matches!(self, ResizeHandle::East | ResizeHandle::SouthEast)
    }

    fn resizes_height(self) -> bool {
        matches!(self, ResizeHandle::South | ResizeHandle::SouthEast)
    }
}

/// The gesture in progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Idle,
    Dragging {
        id: WidgetId,
        /// Pointer position minus the widget's origin at press time.
        grab: (f32, f32),
        /// Resolved size at press time, used for surface clamping.
        size: (f32, f32),
        /// Current ephemeral absolute origin.
        live: (f32, f32),
        moved: bool,
    },
    Resizing {
        id: WidgetId,
        handle: ResizeHandle,
        /// Absolute origin, fixed for the whole gesture.
        origin: (f32, f32),
        /// Current ephemeral size.
        live: (f32, f32),
        moved: bool,
    },
}

impl Gesture {
    pub fn widget(&self) -> Option<WidgetId> {
        match self {
            Gesture::Idle => None,
            Gesture::Dragging { id, .. } | Gesture::Resizing { id, .. } => Some(*id),
        }
    }
}

/// The model change a finished gesture asks for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Commit {
    /// Place the widget's origin at this absolute position.
    Move { id: WidgetId, x: f32, y: f32 },
    /// Set the widget's size.
    Resize { id: WidgetId, width: f32, height: f32 },
}

impl Commit {
    /// Write this commit into `tree` through the hierarchy manager.
    pub fn apply(self, tree: &mut WidgetTree) -> pw_core::Result<()> {
        match self {
            Commit::Move { id, x, y } => tree.commit_move(id, x, y),
            Commit::Resize { id, width, height } => tree.commit_resize(id, width, height),
        }
    }
}

pub struct ManipulationController {
    min_size: f32,
    handle_size: f32,
    clamp_to_surface: bool,
    selected: Option<WidgetId>,
    gesture: Gesture,
    overlay: Overlay,
    cursor: CursorShape,
}

impl Default for ManipulationController {
    fn default() -> Self {
        Self::new(&LayoutConfig::default())
    }
}

impl ManipulationController {
    pub fn new(config: &LayoutConfig) -> Self {
        Self {
            min_size: config.min_widget_size,
            handle_size: config.handle_size,
            clamp_to_surface: config.clamp_drag_to_surface,
            selected: None,
            gesture: Gesture::Idle,
            overlay: Overlay::new(),
            cursor: CursorShape::Default,
        }
    }

    pub fn selected(&self) -> Option<WidgetId> {
        self.selected
    }

    /// Change the selection from outside the canvas (hierarchy panel,
    /// inspector). Any running gesture is dropped.
    pub fn select(&mut self, id: Option<WidgetId>) {
        if self.selected != id {
            self.cancel();
        }
        self.selected = id;
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.gesture, Gesture::Idle)
    }

    /// Live geometry for painting and hit-testing.
    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn cursor(&self) -> CursorShape {
        self.cursor
    }

    /// Abandon the current gesture. The model is left as it was before the
    /// press.
    pub fn cancel(&mut self) {
        if let Some(id) = self.gesture.widget() {
            log::debug!("gesture on {id} cancelled");
        }
        self.gesture = Gesture::Idle;
        self.overlay.clear();
    }

    /// Handle a pointer event against the current model.
    ///
    /// Returns a commit only on the release that ends a gesture in which
    /// the pointer actually moved; a plain click selects without writing.
    pub fn handle(&mut self, event: &InputEvent, tree: &WidgetTree) -> Option<Commit> {
        match *event {
            InputEvent::PointerDown { x, y } => {
                self.press(tree, x, y);
                None
            }
            InputEvent::PointerMove { x, y } => {
                self.drag_to(tree, x, y);
                None
            }
            InputEvent::PointerUp { x, y } => {
                let commit = self.release();
                self.cursor = self.hover_cursor(tree, x, y);
                commit
            }
            InputEvent::PointerCancel => {
                self.cancel();
                None
            }
        }
    }

    fn press(&mut self, tree: &WidgetTree, x: f32, y: f32) {
        // Hit-testing and handle checks use committed geometry.
        self.cancel();

        if let Some(id) = self.selected
            && let Some(bounds) = tree.bounds(id)
            && let Some(handle) = ResizeHandle::at(bounds, x, y, self.handle_size)
        {
            log::debug!("resize {id} via {handle:?}");
            self.gesture = Gesture::Resizing {
                id,
                handle,
                origin: (bounds.x, bounds.y),
                live: (bounds.width, bounds.height),
                moved: false,
            };
            self.cursor = handle.cursor();
            return;
        }

        match hit_test(tree, &self.overlay, x, y).and_then(|id| Some((id, tree.bounds(id)?))) {
            Some((id, bounds)) => {
                log::debug!("drag {id} from ({x}, {y})");
                self.selected = Some(id);
                self.gesture = Gesture::Dragging {
                    id,
                    grab: (x - bounds.x, y - bounds.y),
                    size: (bounds.width, bounds.height),
                    live: (bounds.x, bounds.y),
                    moved: false,
                };
                self.cursor = CursorShape::Move;
            }
            None => {
                self.selected = None;
                self.cursor = CursorShape::Default;
            }
        }
    }

    fn drag_to(&mut self, tree: &WidgetTree, x: f32, y: f32) {
        if let Some(id) = self.gesture.widget()
            && !tree.contains(id)
        {
            log::warn!("gesture target {id} vanished");
            self.cancel();
        }

        if self.is_idle() {
            self.cursor = self.hover_cursor(tree, x, y);
            return;
        }

        let surface = tree.surface();
        let (clamp, min_size) = (self.clamp_to_surface, self.min_size);
        match &mut self.gesture {
            Gesture::Idle => {}
            Gesture::Dragging {
                id,
                grab,
                size,
                live,
                moved,
            } => {
                let mut nx = x - grab.0;
                let mut ny = y - grab.1;
                if clamp {
                    nx = nx.min(surface.width - size.0).max(0.0);
                    ny = ny.min(surface.height - size.1).max(0.0);
                }
                *live = (nx, ny);
                *moved = true;
                self.overlay.set_position(*id, nx, ny);
            }
            Gesture::Resizing {
                id,
                handle,
                origin,
                live,
                moved,
            } => {
                if handle.resizes_width() {
                    live.0 = (x - origin.0).max(min_size);
                }
                if handle.resizes_height() {
                    live.1 = (y - origin.1).max(min_size);
                }
                *moved = true;
                self.overlay.set_size(*id, live.0, live.1);
            }
        }
    }

    fn release(&mut self) -> Option<Commit> {
        let commit = match self.gesture {
            Gesture::Dragging {
                id,
                live,
                moved: true,
                ..
            } => Some(Commit::Move {
                id,
                x: live.0,
                y: live.1,
            }),
            Gesture::Resizing {
                id,
                live,
                moved: true,
                ..
            } => Some(Commit::Resize {
                id,
                width: live.0,
                height: live.1,
            }),
            _ => None,
        };
        if let Some(commit) = &commit {
            log::debug!("gesture finished: {commit:?}");
        }
        self.gesture = Gesture::Idle;
        self.overlay.clear();
        commit
    }

    /// Resize cursor over a handle of the selection, move cursor over any
    /// widget, default elsewhere.
    pub fn hover_cursor(&self, tree: &WidgetTree, x: f32, y: f32) -> CursorShape {
        if let Some(handle) = self
            .selected
            .and_then(|id| tree.bounds(id))
            .and_then(|b| ResizeHandle::at(b, x, y, self.handle_size))
        {
            return handle.cursor();
        }
        if hit_test(tree, &self.overlay, x, y).is_some() {
            CursorShape::Move
        } else {
            CursorShape::Default
        }
    }
}
