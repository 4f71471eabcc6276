pub mod hit;
pub mod project;

pub use hit::{hit_test, hit_test_rect};
pub use project::{DistanceBadge, RoomFrame, TileFrame, project_room};
