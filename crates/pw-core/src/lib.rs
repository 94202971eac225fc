pub mod config;
pub mod error;
pub mod id;
pub mod layout;
pub mod model;
pub mod snapshot;
pub mod tree;

pub use config::LayoutConfig;
pub use error::{HierarchyError, Result, SnapshotError};
pub use id::{IdCounters, WidgetId, generated_id};
pub use layout::{Placement, Surface, WidgetLookup};
pub use model::*;
pub use snapshot::Snapshot;
pub use tree::WidgetTree;
