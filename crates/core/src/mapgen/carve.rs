//! Materializes rooms and corridor segments into the tile map.
//!
//! A corridor is five cells wide: a wall on each side and three floor cells in
//! between. Carving walks the long axis from two cells before the segment to
//! two cells after it. The last column on each end is solid wall so corners
//! and dead ends stay sealed. Floor cells replace room walls anywhere before
//! that column, and corridor walls only inside the segment; when all three
//! land on the wall of one main room they become that room's doorway instead.
//!
//! Tiles are always single cells. `grid_size` only quantizes where segments
//! start and end, so carving walks the segment one cell at a time.

use std::collections::BTreeSet;

use crate::types::{GridPos, RoomId, TileOwner, TileRole};

use super::corridor::CorridorSegment;
use super::model::{Corridor, RoomArena};
use super::tiles::TileMap;

/// Cells from the centerline to the corridor's side walls.
pub const CORRIDOR_HALF_WIDTH: i32 = 2;
const FLOOR_HALF_WIDTH: i32 = 1;

pub fn stamp_rooms(tiles: &mut TileMap, rooms: &RoomArena, ids: &[RoomId]) {
    for &id in ids {
        if let Some(room) = rooms.get(id) {
            tiles.stamp_room(room);
        }
    }
}

/// Main room whose wall covers all three floor cells of column `t`, if any.
fn doorway_owner(
    tiles: &TileMap,
    segment: &CorridorSegment,
    t: i32,
    main_rooms: &BTreeSet<RoomId>,
) -> Option<RoomId> {
    let mut owner = None;
    for offset in -FLOOR_HALF_WIDTH..=FLOOR_HALF_WIDTH {
        let tile = tiles.get(segment.at(t, offset))?;
        let room = match (tile.role, tile.owner) {
            (TileRole::Wall, TileOwner::Room(room)) if main_rooms.contains(&room) => room,
            _ => return None,
        };
        match owner {
            None => owner = Some(room),
            Some(existing) if existing != room => return None,
            Some(_) => {}
        }
    }
    owner
}

fn fill_if_empty(tiles: &mut TileMap, pos: GridPos, role: TileRole, owner: TileOwner) {
    if tiles.get(pos).is_none() {
        tiles.set(pos, role, owner);
    }
}

/// Carves one corridor. Returns the number of door tiles it placed.
pub fn carve_corridor(
    tiles: &mut TileMap,
    rooms: &mut RoomArena,
    main_rooms: &BTreeSet<RoomId>,
    corridor: &Corridor,
) -> usize {
    let segment = &corridor.segment;
    let owner = TileOwner::Corridor(corridor.id);
    let (from, to) = segment.long_span();
    let mut doors = 0;

    for t in (from - CORRIDOR_HALF_WIDTH)..=(to + CORRIDOR_HALF_WIDTH) {
        if t == from - CORRIDOR_HALF_WIDTH || t == to + CORRIDOR_HALF_WIDTH {
            for offset in -CORRIDOR_HALF_WIDTH..=CORRIDOR_HALF_WIDTH {
                fill_if_empty(tiles, segment.at(t, offset), TileRole::Wall, owner);
            }
            continue;
        }

        for offset in [-CORRIDOR_HALF_WIDTH, CORRIDOR_HALF_WIDTH] {
            fill_if_empty(tiles, segment.at(t, offset), TileRole::Wall, owner);
        }

        let extension = t < from || t > to;
        if let Some(room) = doorway_owner(tiles, segment, t, main_rooms) {
            for offset in -FLOOR_HALF_WIDTH..=FLOOR_HALF_WIDTH {
                tiles.set(segment.at(t, offset), TileRole::Door, TileOwner::Room(room));
            }
            if let Some(room) = rooms.get_mut(room) {
                room.is_enclosed = false;
            }
            doors += (2 * FLOOR_HALF_WIDTH + 1) as usize;
            continue;
        }

        for offset in -FLOOR_HALF_WIDTH..=FLOOR_HALF_WIDTH {
            let pos = segment.at(t, offset);
            match tiles.get(pos).copied() {
                None => {
                    tiles.set(pos, TileRole::Floor, owner);
                }
                Some(existing)
                    if existing.role == TileRole::Wall
                        && (!extension || existing.owner.room().is_some()) =>
                {
                    tiles.set(pos, TileRole::Floor, owner);
                    if let Some(room) = existing.owner.room().and_then(|id| rooms.get_mut(id)) {
                        room.is_enclosed = false;
                    }
                }
                Some(_) => {}
            }
        }
    }
    doors
}

/// Carves every corridor in order. Returns the total door tiles placed.
pub fn carve_corridors(
    tiles: &mut TileMap,
    rooms: &mut RoomArena,
    main_rooms: &[RoomId],
    corridors: &[Corridor],
) -> usize {
    let main_rooms: BTreeSet<RoomId> = main_rooms.iter().copied().collect();
    corridors.iter().map(|corridor| carve_corridor(tiles, rooms, &main_rooms, corridor)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapgen::model::{Room, insert_room};
    use crate::types::{CorridorId, Vec2};

    fn corridor(id: u32, a: (i32, i32), b: (i32, i32)) -> Corridor {
        let segment = CorridorSegment::new(GridPos::new(a.0, a.1), GridPos::new(b.0, b.1))
            .expect("axis aligned");
        Corridor { id: CorridorId(id), segment, center: segment.midpoint() }
    }

    fn two_rooms() -> (RoomArena, Vec<RoomId>, TileMap) {
        let mut rooms = RoomArena::with_key();
        let ids = vec![
            insert_room(&mut rooms, Room::new(Vec2::new(0.0, 0.0), 3, 3)),
            insert_room(&mut rooms, Room::new(Vec2::new(6.0, 0.0), 3, 3)),
        ];
        let mut tiles = TileMap::new();
        stamp_rooms(&mut tiles, &rooms, &ids);
        (rooms, ids, tiles)
    }

    #[test]
    fn corridor_between_facing_rooms_opens_doors_on_both_walls() {
        let (mut rooms, ids, mut tiles) = two_rooms();
        let doors = carve_corridors(&mut tiles, &mut rooms, &ids, &[corridor(0, (1, 0), (5, 0))]);
        assert_eq!(doors, 6);

        for y in -1..=1 {
            let left = tiles.get(GridPos::new(1, y)).expect("door");
            assert_eq!((left.role, left.owner), (TileRole::Door, TileOwner::Room(ids[0])));
            let right = tiles.get(GridPos::new(5, y)).expect("door");
            assert_eq!((right.role, right.owner), (TileRole::Door, TileOwner::Room(ids[1])));
            for x in 2..=4 {
                assert_eq!(tiles.role_at(GridPos::new(x, y)), Some(TileRole::Floor));
            }
        }
        for x in 2..=4 {
            assert_eq!(tiles.role_at(GridPos::new(x, 2)), Some(TileRole::Wall));
            assert_eq!(tiles.role_at(GridPos::new(x, -2)), Some(TileRole::Wall));
        }
        // The rooms behind the doorways keep their walls.
        assert_eq!(tiles.role_at(GridPos::new(-1, 0)), Some(TileRole::Wall));
        assert_eq!(tiles.role_at(GridPos::new(7, 0)), Some(TileRole::Wall));
        assert!(rooms.values().all(|room| !room.is_enclosed));
    }

    #[test]
    fn corridor_through_a_support_room_breaches_it_without_doors() {
        let mut rooms = RoomArena::with_key();
        let support = insert_room(&mut rooms, Room::new(Vec2::new(10.0, 0.0), 5, 7));
        let mut tiles = TileMap::new();
        stamp_rooms(&mut tiles, &rooms, &[support]);

        let doors = carve_corridors(&mut tiles, &mut rooms, &[], &[corridor(0, (0, 0), (20, 0))]);
        assert_eq!(doors, 0);
        assert_eq!(tiles.count_role(TileRole::Door), 0);
        assert!(!rooms[support].is_enclosed);
        for y in -1..=1 {
            let breach = tiles.get(GridPos::new(8, y)).expect("tile");
            assert_eq!((breach.role, breach.owner), (TileRole::Floor, TileOwner::Corridor(CorridorId(0))));
        }
        // The room's own floor is left to the room.
        assert_eq!(tiles.get(GridPos::new(10, 0)).map(|tile| tile.owner), Some(TileOwner::Room(support)));
    }

    #[test]
    fn segment_ending_short_of_a_room_still_opens_its_wall() {
        let mut rooms = RoomArena::with_key();
        let main = insert_room(&mut rooms, Room::new(Vec2::new(0.0, 0.0), 5, 5));
        let support = insert_room(&mut rooms, Room::new(Vec2::new(14.0, 0.0), 5, 5));
        let mut tiles = TileMap::new();
        stamp_rooms(&mut tiles, &rooms, &[main, support]);

        // Walls sit at x = 2 and x = 12; the segment stops one cell short of each.
        let doors = carve_corridors(&mut tiles, &mut rooms, &[main], &[corridor(0, (3, 0), (11, 0))]);
        assert_eq!(doors, 3);
        for y in -1..=1 {
            assert_eq!(
                tiles.get(GridPos::new(2, y)).map(|tile| (tile.role, tile.owner)),
                Some((TileRole::Door, TileOwner::Room(main)))
            );
            assert_eq!(tiles.role_at(GridPos::new(12, y)), Some(TileRole::Floor));
        }
        assert!(!rooms[main].is_enclosed && !rooms[support].is_enclosed);
        assert!(tiles.reachable_from(GridPos::new(0, 0)).contains(&GridPos::new(14, 0)));
        // End caps land inside the rooms and leave their floor alone.
        assert_eq!(tiles.role_at(GridPos::new(1, 0)), Some(TileRole::Floor));
        assert_eq!(tiles.role_at(GridPos::new(13, 0)), Some(TileRole::Floor));
    }

    #[test]
    fn l_corner_is_open_inside_and_sealed_outside() {
        let mut rooms = RoomArena::with_key();
        let mut tiles = TileMap::new();
        let corridors = [corridor(0, (0, 0), (0, 10)), corridor(1, (0, 10), (10, 10))];
        carve_corridors(&mut tiles, &mut rooms, &[], &corridors);

        for x in -1..=1 {
            for y in 9..=11 {
                assert_eq!(tiles.role_at(GridPos::new(x, y)), Some(TileRole::Floor), "({x}, {y})");
            }
        }
        for pos in [GridPos::new(-2, 10), GridPos::new(0, 12), GridPos::new(-2, 12), GridPos::new(0, -2)] {
            assert_eq!(tiles.role_at(pos), Some(TileRole::Wall), "{pos}");
        }
        assert_eq!(tiles.role_at(GridPos::new(2, 10)), Some(TileRole::Floor));
    }

    #[test]
    fn carving_order_does_not_change_an_l_corner() {
        let legs = [corridor(0, (0, 0), (0, 10)), corridor(1, (0, 10), (10, 10))];
        let mut rooms = RoomArena::with_key();

        let mut forward = TileMap::new();
        carve_corridors(&mut forward, &mut rooms, &[], &legs);
        let mut backward = TileMap::new();
        carve_corridors(&mut backward, &mut rooms, &[], &[legs[1], legs[0]]);

        let roles = |tiles: &TileMap| tiles.iter().map(|tile| (tile.pos, tile.role)).collect::<Vec<_>>();
        assert_eq!(roles(&forward), roles(&backward));
    }
}
