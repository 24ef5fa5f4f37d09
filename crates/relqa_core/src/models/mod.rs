//! Data models shared by the matcher, persistence and comparison layers.
//!
//! - `MediaItem`: descriptor of one physical file
//! - `MatchGroup` / `MatchPlan`: correspondences between two sides

mod media;
mod plan;

pub use media::{file_name_of, MediaItem, TrackKind, TrackLayout};
pub use plan::{
    EnabledFlag, GroupMember, GroupSide, MatchGroup, MatchPlan, SIDE_A_TAG, SIDE_B_TAG,
    UNMATCHED_GROUP_ID,
};
