use crate::id::WidgetId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, HierarchyError>;

/// Rejections from hierarchy mutations. Every variant is raised before any
/// widget field is written.
#[derive(PartialEq, Eq, Error, Debug, Clone)]
pub enum HierarchyError {
    #[error("widget id must not be empty")]
    EmptyId,
    #[error("widget id `{0}` is already in use")]
    IdCollision(WidgetId),
    #[error("no widget with id `{0}`")]
    UnknownWidget(WidgetId),
    #[error("widget `{0}` cannot be its own parent")]
    SelfParent(WidgetId),
    #[error("cannot move `{widget}` into its own descendant `{target}`")]
    Cycle { widget: WidgetId, target: WidgetId },
    #[error("widget `{0}` cannot contain children")]
    NotAContainer(WidgetId),
}

/// Failures at the persistence boundary.
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("snapshot json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot encode: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
    #[error("snapshot decode: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
    #[error("snapshot rejected: {0}")]
    Hierarchy(#[from] HierarchyError),
}
