pub mod input;
pub mod session;
pub mod tools;

pub use input::InputEvent;
pub use session::EditorSession;
pub use tools::{Commit, CursorShape, Gesture, ManipulationController, ResizeHandle};
