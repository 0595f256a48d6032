//! Support-room detection and removal of every unused candidate room.

use std::collections::{BTreeMap, BTreeSet};

use crate::types::{GridPos, RoomId};

use super::carve::CORRIDOR_HALF_WIDTH;
use super::corridor::CorridorSegment;
use super::model::RoomArena;

/// Point query over candidate room footprints, padded so a corridor's full
/// width is covered when walking its centerline.
#[derive(Clone, Debug, Default)]
pub struct FootprintIndex {
    cells: BTreeMap<GridPos, Vec<RoomId>>,
}

impl FootprintIndex {
    pub fn build(rooms: &RoomArena, exclude: &BTreeSet<RoomId>, padding: i32) -> Self {
        let mut cells: BTreeMap<GridPos, Vec<RoomId>> = BTreeMap::new();
        for room in rooms.values().filter(|room| !exclude.contains(&room.id)) {
            for pos in room.padded_footprint(padding).cells() {
                cells.entry(pos).or_default().push(room.id);
            }
        }
        Self { cells }
    }

    pub fn rooms_at(&self, pos: GridPos) -> &[RoomId] {
        self.cells.get(&pos).map_or(&[], Vec::as_slice)
    }
}

/// Non-main rooms crossed by any segment, in discovery order.
pub fn find_support_rooms(
    rooms: &RoomArena,
    main_rooms: &[RoomId],
    segments: &[CorridorSegment],
) -> Vec<RoomId> {
    let main: BTreeSet<RoomId> = main_rooms.iter().copied().collect();
    let index = FootprintIndex::build(rooms, &main, CORRIDOR_HALF_WIDTH);

    let mut seen = BTreeSet::new();
    let mut support = Vec::new();
    for segment in segments {
        for pos in segment.cells() {
            for &id in index.rooms_at(pos) {
                if seen.insert(id) {
                    support.push(id);
                }
            }
        }
    }
    support
}

/// Drops every room that is neither main nor support. Returns how many went.
pub fn prune_rooms(rooms: &mut RoomArena, main_rooms: &[RoomId], support_rooms: &[RoomId]) -> usize {
    let keep: BTreeSet<RoomId> = main_rooms.iter().chain(support_rooms).copied().collect();
    let before = rooms.len();
    rooms.retain(|id, _| keep.contains(&id));
    before - rooms.len()
}
