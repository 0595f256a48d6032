//! Sparse grid-to-tile index; at most one tile per cell.

use std::collections::btree_map::Values;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::types::{GridPos, RoomId, Tile, TileOwner, TileRole};

use super::model::Room;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TileMap {
    cells: BTreeMap<GridPos, Tile>,
}

impl TileMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, pos: GridPos) -> Option<&Tile> {
        self.cells.get(&pos)
    }

    pub fn role_at(&self, pos: GridPos) -> Option<TileRole> {
        self.cells.get(&pos).map(|tile| tile.role)
    }

    /// Places a tile, returning whatever occupied the cell before.
    pub fn set(&mut self, pos: GridPos, role: TileRole, owner: TileOwner) -> Option<Tile> {
        self.cells.insert(pos, Tile { pos, role, owner })
    }

    pub fn remove(&mut self, pos: GridPos) -> Option<Tile> {
        self.cells.remove(&pos)
    }

    /// Tiles in `(x, y)` order.
    pub fn iter(&self) -> Values<'_, GridPos, Tile> {
        self.cells.values()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Inclusive bounding box of every occupied cell.
    pub fn bounds(&self) -> Option<(GridPos, GridPos)> {
        let mut positions = self.cells.keys();
        let first = *positions.next()?;
        let (mut min, mut max) = (first, first);
        for pos in positions {
            min.x = min.x.min(pos.x);
            min.y = min.y.min(pos.y);
            max.x = max.x.max(pos.x);
            max.y = max.y.max(pos.y);
        }
        Some((min, max))
    }

    pub fn count_role(&self, role: TileRole) -> usize {
        self.cells.values().filter(|tile| tile.role == role).count()
    }

    pub fn tiles_owned_by(&self, room: RoomId) -> impl Iterator<Item = &Tile> + '_ {
        self.cells.values().filter(move |tile| tile.owner == TileOwner::Room(room))
    }

    pub fn is_walkable(&self, pos: GridPos) -> bool {
        matches!(self.role_at(pos), Some(TileRole::Floor | TileRole::Door))
    }

    /// Floor and door cells connected to `start` through orthogonal steps.
    /// Empty when `start` itself is not walkable.
    pub fn reachable_from(&self, start: GridPos) -> BTreeSet<GridPos> {
        let mut seen = BTreeSet::new();
        if !self.is_walkable(start) {
            return seen;
        }
        let mut queue = VecDeque::from([start]);
        seen.insert(start);
        while let Some(pos) = queue.pop_front() {
            for next in [pos.offset(1, 0), pos.offset(-1, 0), pos.offset(0, 1), pos.offset(0, -1)] {
                if self.is_walkable(next) && seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        seen
    }

    /// Border cells (corners included) become walls and the inside floor.
    pub fn stamp_room(&mut self, room: &Room) {
        let footprint = room.footprint();
        for pos in footprint.cells() {
            let role = if footprint.is_border(pos) { TileRole::Wall } else { TileRole::Floor };
            self.set(pos, role, TileOwner::Room(room.id));
        }
    }
}

impl<'a> IntoIterator for &'a TileMap {
    type Item = &'a Tile;
    type IntoIter = Values<'a, GridPos, Tile>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
