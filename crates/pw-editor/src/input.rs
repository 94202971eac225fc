//! Input abstraction layer.
//!
//! Pointer events in design-surface coordinates, already divided by the
//! view zoom. Move and up events keep arriving while a gesture is active
//! even when the pointer leaves the surface.

/// A normalized pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Primary button pressed.
    PointerDown { x: f32, y: f32 },

    /// Pointer moved, pressed or not.
    PointerMove { x: f32, y: f32 },

    /// Primary button released.
    PointerUp { x: f32, y: f32 },

    /// The gesture was interrupted (focus loss, Escape, capture lost).
    PointerCancel,
}

impl InputEvent {
    /// Extract position if this event carries one.
    pub fn position(&self) -> Option<(f32, f32)> {
        match self {
            Self::PointerDown { x, y } | Self::PointerMove { x, y } | Self::PointerUp { x, y } => {
                Some((*x, *y))
            }
            Self::PointerCancel => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions() {
        assert_eq!(InputEvent::PointerDown { x: 1.0, y: 2.0 }.position(), Some((1.0, 2.0)));
        assert_eq!(InputEvent::PointerUp { x: 3.0, y: 4.0 }.position(), Some((3.0, 4.0)));
        assert_eq!(InputEvent::PointerCancel.position(), None);
    }
}
