//! Persistence boundary.
//!
//! A [`Snapshot`] is the full, order-stable state of a widget tree: the
//! surface size plus the flat widget list, hierarchy carried only by each
//! widget's `parentId`. JSON is the project-file form; MessagePack is the
//! compact form used for clipboard payloads and quick saves.
//!
//! Other top-level keys a project file may carry (resource tables and the
//! like) are ignored on load.

use crate::error::SnapshotError;
use crate::layout::Surface;
use crate::model::Widget;
use crate::tree::WidgetTree;
use serde::{Deserialize, Serialize};

pub const FORMAT_VERSION: &str = "1.0";

fn default_version() -> String {
    FORMAT_VERSION.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub canvas: Surface,
    #[serde(default)]
    pub widgets: Vec<Widget>,
}

impl Snapshot {
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(text)?)
    }

    /// MessagePack with field names, so older readers skip unknown fields.
    pub fn to_msgpack(&self) -> Result<Vec<u8>, SnapshotError> {
        Ok(rmp_serde::to_vec_named(self)?)
    }

    pub fn from_msgpack(bytes: &[u8]) -> Result<Self, SnapshotError> {
        Ok(rmp_serde::from_slice(bytes)?)
    }
}

impl WidgetTree {
    /// Capture the tree in insertion order.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            version: default_version(),
            canvas: self.surface(),
            widgets: self.iter().cloned().collect(),
        }
    }

    /// Rebuild a tree from a snapshot and reseed the id counters from the
    /// loaded ids.
    ///
    /// # Errors
    /// Rejects empty or duplicate ids and parent cycles; nothing is
    /// partially loaded.
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self, SnapshotError> {
        let mut tree = WidgetTree::with_surface(snapshot.canvas);
        for widget in snapshot.widgets {
            tree.insert_widget(widget)?;
        }
        tree.reseed_counters();
        log::debug!("loaded {} widgets", tree.len());
        Ok(tree)
    }
}
