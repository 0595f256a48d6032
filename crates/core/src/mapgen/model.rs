//! Public data models for rooms, corridors, and finished dungeons.

use std::collections::BTreeSet;

use slotmap::SlotMap;
use xxhash_rust::xxh3::xxh3_64;

use crate::types::{CorridorId, GridPos, RoomId, RoomKind, TileOwner, TileRole, Vec2};

use super::corridor::CorridorSegment;
use super::doors::Door;
use super::graph::RoomGraph;
use super::grid::CellRect;
use super::tiles::TileMap;

pub type RoomArena = SlotMap<RoomId, Room>;

#[derive(Clone, Debug, PartialEq)]
pub struct Room {
    pub id: RoomId,
    pub center: Vec2,
    /// Cell count, always odd.
    pub width: i32,
    /// Cell count, always odd.
    pub height: i32,
    pub kind: RoomKind,
    pub connected_ids: BTreeSet<RoomId>,
    pub is_enclosed: bool,
}

impl Room {
    pub fn new(center: Vec2, width: i32, height: i32) -> Self {
        Self {
            id: RoomId::default(),
            center,
            width,
            height,
            kind: RoomKind::Unassigned,
            connected_ids: BTreeSet::new(),
            is_enclosed: true,
        }
    }

    pub fn grid_center(&self) -> GridPos {
        GridPos { x: self.center.x.round() as i32, y: self.center.y.round() as i32 }
    }

    pub fn half_width(&self) -> i32 {
        self.width / 2
    }

    pub fn half_height(&self) -> i32 {
        self.height / 2
    }

    /// Cells covered by the room's walls and floor.
    pub fn footprint(&self) -> CellRect {
        CellRect::centered(self.grid_center(), self.half_width(), self.half_height())
    }

    pub fn padded_footprint(&self, padding: i32) -> CellRect {
        self.footprint().expanded(padding)
    }

    /// Floor cells inside the wall ring.
    pub fn interior(&self) -> CellRect {
        self.footprint().expanded(-1)
    }
}

/// Inserts `room` and writes the arena key back into its `id`.
pub fn insert_room(rooms: &mut RoomArena, room: Room) -> RoomId {
    let id = rooms.insert(room);
    rooms[id].id = id;
    id
}

/// Corridor-derived room: one per routed segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Corridor {
    pub id: CorridorId,
    pub segment: CorridorSegment,
    pub center: Vec2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutPiece {
    Room(RoomId),
    Corridor(CorridorId),
}

#[derive(Clone, Debug)]
pub struct GeneratedDungeon {
    pub seed: u64,
    pub attempt: u32,
    pub rooms: RoomArena,
    pub main_rooms: Vec<RoomId>,
    pub support_rooms: Vec<RoomId>,
    pub corridors: Vec<Corridor>,
    pub graph: RoomGraph,
    pub tiles: TileMap,
    pub doors: Vec<Door>,
}

impl GeneratedDungeon {
    /// Main rooms, then support rooms, then corridor-derived rooms.
    pub fn room_order(&self) -> Vec<LayoutPiece> {
        self.main_rooms
            .iter()
            .chain(&self.support_rooms)
            .map(|&id| LayoutPiece::Room(id))
            .chain(self.corridors.iter().map(|corridor| LayoutPiece::Corridor(corridor.id)))
            .collect()
    }

    pub fn special_room(&self, kind: RoomKind) -> Option<RoomId> {
        self.main_rooms.iter().copied().find(|&id| self.rooms[id].kind == kind)
    }

    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        let room_index = |id: RoomId| -> u32 {
            self.main_rooms
                .iter()
                .chain(&self.support_rooms)
                .position(|&other| other == id)
                .map_or(u32::MAX, |index| index as u32)
        };

        bytes.extend((self.main_rooms.len() as u32).to_le_bytes());
        bytes.extend((self.support_rooms.len() as u32).to_le_bytes());
        for &id in self.main_rooms.iter().chain(&self.support_rooms) {
            let room = &self.rooms[id];
            let center = room.grid_center();
            bytes.extend(center.x.to_le_bytes());
            bytes.extend(center.y.to_le_bytes());
            bytes.extend(room.width.to_le_bytes());
            bytes.extend(room.height.to_le_bytes());
            bytes.push(match room.kind {
                RoomKind::Unassigned => 0,
                RoomKind::Entry => 1,
                RoomKind::Boss => 2,
                RoomKind::Shop => 3,
                RoomKind::MiniBoss => 4,
            });
            bytes.push(u8::from(room.is_enclosed));
            bytes.extend((room.connected_ids.len() as u32).to_le_bytes());
            for &other in &room.connected_ids {
                bytes.extend(room_index(other).to_le_bytes());
            }
        }

        bytes.extend((self.corridors.len() as u32).to_le_bytes());
        for corridor in &self.corridors {
            for pos in [corridor.segment.start, corridor.segment.end] {
                bytes.extend(pos.x.to_le_bytes());
                bytes.extend(pos.y.to_le_bytes());
            }
        }

        bytes.extend((self.tiles.len() as u32).to_le_bytes());
        for tile in self.tiles.iter() {
            bytes.extend(tile.pos.x.to_le_bytes());
            bytes.extend(tile.pos.y.to_le_bytes());
            bytes.push(match tile.role {
                TileRole::Floor => 0,
                TileRole::Wall => 1,
                TileRole::Door => 2,
            });
            match tile.owner {
                TileOwner::Room(id) => {
                    bytes.push(0);
                    bytes.extend(room_index(id).to_le_bytes());
                }
                TileOwner::Corridor(id) => {
                    bytes.push(1);
                    bytes.extend(id.0.to_le_bytes());
                }
            }
        }

        bytes
    }

    pub fn fingerprint(&self) -> u64 {
        xxh3_64(&self.canonical_bytes())
    }

    /// `#` wall, `.` floor, `+` door, special-room letters at their centers.
    pub fn render_ascii(&self) -> String {
        let Some((min, max)) = self.tiles.bounds() else {
            return String::new();
        };

        let mut out = String::new();
        for y in (min.y..=max.y).rev() {
            for x in min.x..=max.x {
                let pos = GridPos { x, y };
                let special = self
                    .main_rooms
                    .iter()
                    .map(|&id| &self.rooms[id])
                    .find(|room| room.grid_center() == pos)
                    .and_then(|room| room.kind.glyph());
                let glyph = match (special, self.tiles.get(pos)) {
                    (Some(letter), _) => letter,
                    (None, Some(tile)) => match tile.role {
                        TileRole::Floor => '.',
                        TileRole::Wall => '#',
                        TileRole::Door => '+',
                    },
                    (None, None) => ' ',
                };
                out.push(glyph);
            }
            let trimmed = out.trim_end_matches(' ').len();
            out.truncate(trimmed);
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn footprint_spans_half_extents_around_the_snapped_center() {
        let room = Room::new(Vec2::new(4.0, -2.0), 5, 3);
        let footprint = room.footprint();
        assert_eq!(footprint.min, GridPos::new(2, -3));
        assert_eq!(footprint.max, GridPos::new(6, -1));
        assert_eq!(room.padded_footprint(2).min, GridPos::new(0, -5));
    }

    #[test]
    fn inserted_rooms_know_their_arena_key() {
        let mut rooms = RoomArena::with_key();
        let id = insert_room(&mut rooms, Room::new(Vec2::ZERO, 3, 3));
        assert_eq!(rooms[id].id, id);
        assert!(rooms[id].is_enclosed);
        assert_eq!(rooms[id].kind, RoomKind::Unassigned);
    }
}
