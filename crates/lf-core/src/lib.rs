pub mod config;
pub mod error;
pub mod id;
pub mod model;
pub mod persist;
pub mod snap;
pub mod template;

pub use config::EngineConfig;
pub use error::{LayoutError, Result};
pub use id::{GroupId, ItemId, RoomId};
pub use model::*;
pub use persist::{LayoutDocument, LayoutRepository, MemoryRepository};
pub use snap::{
    DistanceLabel, GridMode, Guide, GuideAxis, PlacedItem, SnapResult, compute_snap,
};
pub use template::{default_layout, merge_with_defaults};
