//! Main-room classification by size relative to the candidate mean.

use crate::error::GenerationError;
use crate::types::RoomId;

use super::model::RoomArena;

/// Minimum width and height a room needs to qualify as a main room.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SizeCutoff {
    pub width: i32,
    pub height: i32,
}

impl SizeCutoff {
    /// `floor(mean * threshold)` per axis over every candidate.
    pub fn from_rooms(rooms: &RoomArena, threshold: f32) -> Self {
        if rooms.is_empty() {
            return Self { width: 0, height: 0 };
        }
        let count = rooms.len() as f32;
        let mean_width = rooms.values().map(|room| room.width as f32).sum::<f32>() / count;
        let mean_height = rooms.values().map(|room| room.height as f32).sum::<f32>() / count;
        Self {
            width: (mean_width * threshold).floor() as i32,
            height: (mean_height * threshold).floor() as i32,
        }
    }

    pub fn admits(self, width: i32, height: i32) -> bool {
        width >= self.width && height >= self.height
    }
}

/// First `wanted` qualifying rooms in sampling order.
///
/// The arena must still be in sampling order (no removals since sampling).
/// Pure: the same arena and parameters always select the same ids.
pub fn select_main_rooms(
    rooms: &RoomArena,
    threshold: f32,
    wanted: usize,
) -> Result<Vec<RoomId>, GenerationError> {
    let cutoff = SizeCutoff::from_rooms(rooms, threshold);
    let selected: Vec<RoomId> = rooms
        .values()
        .filter(|room| cutoff.admits(room.width, room.height))
        .map(|room| room.id)
        .take(wanted)
        .collect();

    if selected.len() < wanted {
        return Err(GenerationError::InsufficientMainRooms { wanted, found: selected.len() });
    }
    Ok(selected)
}
