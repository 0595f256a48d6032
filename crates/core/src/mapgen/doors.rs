//! Door adjacency classification.
//!
//! Each door tile looks at its four neighbors. Sides holding a wall and sides
//! holding another door are packed into two [`Sides`] masks, and the door mask
//! is looked up in [`SHAPE_TABLE`] to decide how the doorway is drawn.

use bitflags::bitflags;

use crate::types::{Axis, GridPos, RoomId, TileRole};

use super::tiles::TileMap;

bitflags! {
    /// Set of cardinal neighbors.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Sides: u8 {
        const NORTH = 0b0001;
        const SOUTH = 0b0010;
        const EAST  = 0b0100;
        const WEST  = 0b1000;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    North,
    South,
    East,
    West,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::North, Side::South, Side::East, Side::West];

    pub fn flag(self) -> Sides {
        match self {
            Side::North => Sides::NORTH,
            Side::South => Sides::SOUTH,
            Side::East => Sides::EAST,
            Side::West => Sides::WEST,
        }
    }

    pub fn neighbor(self, pos: GridPos) -> GridPos {
        match self {
            Side::North => pos.offset(0, 1),
            Side::South => pos.offset(0, -1),
            Side::East => pos.offset(1, 0),
            Side::West => pos.offset(-1, 0),
        }
    }
}

/// What surrounds a door tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct DoorNeighborhood {
    pub walls: Sides,
    pub doors: Sides,
}

impl DoorNeighborhood {
    pub fn of(tiles: &TileMap, pos: GridPos) -> Self {
        let mut neighborhood = Self::default();
        for side in Side::ALL {
            match tiles.role_at(side.neighbor(pos)) {
                Some(TileRole::Wall) => neighborhood.walls |= side.flag(),
                Some(TileRole::Door) => neighborhood.doors |= side.flag(),
                Some(TileRole::Floor) | None => {}
            }
        }
        neighborhood
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DoorShape {
    /// No neighboring door.
    Single,
    /// End of a doorway; the only neighboring door lies on this side.
    EndCap(Side),
    /// Middle of a doorway; walking through it moves along this axis.
    Through(Axis),
    /// Doors on perpendicular sides; only happens where two doorways touch.
    Junction,
}

/// Door-neighbor mask to shape. Masks not listed are junctions.
pub const SHAPE_TABLE: [(Sides, DoorShape); 7] = [
    (Sides::empty(), DoorShape::Single),
    (Sides::NORTH, DoorShape::EndCap(Side::North)),
    (Sides::SOUTH, DoorShape::EndCap(Side::South)),
    (Sides::EAST, DoorShape::EndCap(Side::East)),
    (Sides::WEST, DoorShape::EndCap(Side::West)),
    (Sides::NORTH.union(Sides::SOUTH), DoorShape::Through(Axis::Horizontal)),
    (Sides::EAST.union(Sides::WEST), DoorShape::Through(Axis::Vertical)),
];

pub fn shape_for(doors: Sides) -> DoorShape {
    SHAPE_TABLE
        .iter()
        .find(|(mask, _)| *mask == doors)
        .map_or(DoorShape::Junction, |&(_, shape)| shape)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Door {
    pub pos: GridPos,
    pub room: RoomId,
    pub shape: DoorShape,
    pub neighborhood: DoorNeighborhood,
}

/// Every door tile owned by a room, in `(x, y)` order.
pub fn classify_doors(tiles: &TileMap) -> Vec<Door> {
    tiles
        .iter()
        .filter(|tile| tile.role == TileRole::Door)
        .filter_map(|tile| {
            let room = tile.owner.room()?;
            let neighborhood = DoorNeighborhood::of(tiles, tile.pos);
            Some(Door { pos: tile.pos, room, shape: shape_for(neighborhood.doors), neighborhood })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapgen::model::{Room, RoomArena, insert_room};
    use crate::types::{CorridorId, TileOwner, Vec2};

    #[test]
    fn table_covers_single_end_caps_and_throughs() {
        assert_eq!(shape_for(Sides::empty()), DoorShape::Single);
        assert_eq!(shape_for(Sides::WEST), DoorShape::EndCap(Side::West));
        assert_eq!(shape_for(Sides::NORTH | Sides::SOUTH), DoorShape::Through(Axis::Horizontal));
        assert_eq!(shape_for(Sides::EAST | Sides::WEST), DoorShape::Through(Axis::Vertical));
        assert_eq!(shape_for(Sides::NORTH | Sides::EAST), DoorShape::Junction);
        assert_eq!(shape_for(Sides::all()), DoorShape::Junction);
    }

    #[test]
    fn vertical_doorway_has_end_caps_around_a_through_door() {
        let mut rooms = RoomArena::with_key();
        let id = insert_room(&mut rooms, Room::new(Vec2::new(6.0, 0.0), 3, 5));
        let mut tiles = TileMap::new();
        tiles.stamp_room(&rooms[id]);
        for y in -1..=1 {
            tiles.set(GridPos::new(5, y), TileRole::Door, TileOwner::Room(id));
            tiles.set(GridPos::new(4, y), TileRole::Floor, TileOwner::Corridor(CorridorId(0)));
        }

        let doors = classify_doors(&tiles);
        let shapes: Vec<_> = doors.iter().map(|door| (door.pos, door.shape)).collect();
        assert_eq!(
            shapes,
            vec![
                (GridPos::new(5, -1), DoorShape::EndCap(Side::North)),
                (GridPos::new(5, 0), DoorShape::Through(Axis::Horizontal)),
                (GridPos::new(5, 1), DoorShape::EndCap(Side::South)),
            ]
        );
        assert!(doors.iter().all(|door| door.room == id));
        assert_eq!(doors[0].neighborhood.walls, Sides::SOUTH);
        assert_eq!(doors[1].neighborhood.walls, Sides::empty());
    }

    #[test]
    fn door_owned_by_a_corridor_is_ignored() {
        let mut tiles = TileMap::new();
        tiles.set(GridPos::new(0, 0), TileRole::Door, TileOwner::Corridor(CorridorId(3)));
        assert!(classify_doors(&tiles).is_empty());
    }
}
