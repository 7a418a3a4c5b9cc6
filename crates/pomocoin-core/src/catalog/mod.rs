//! Built-in shop catalogs.
//!
//! The catalogs are compiled in; only ownership lives in the database.

mod music;
mod rooms;

pub use music::{all_tracks, track_by_id, tracks_by_type, MusicTrack, TRACK_PRICE};
pub use rooms::{all_items, item_by_id, items_by_room, RoomItem, RoomType};
