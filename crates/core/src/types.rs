use std::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    pub struct RoomId;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CorridorId(pub u32);

/// Integer grid cell. Ordering is lexicographic on `(x, y)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self { x: self.x + dx, y: self.y + dy }
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(self, other: Self) -> f32 {
        (self - other).length()
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RoomKind {
    #[default]
    Unassigned,
    Entry,
    Boss,
    Shop,
    MiniBoss,
}

impl RoomKind {
    pub const SPECIAL: [RoomKind; 4] =
        [RoomKind::Entry, RoomKind::Boss, RoomKind::Shop, RoomKind::MiniBoss];

    pub fn glyph(self) -> Option<char> {
        match self {
            RoomKind::Unassigned => None,
            RoomKind::Entry => Some('E'),
            RoomKind::Boss => Some('B'),
            RoomKind::Shop => Some('S'),
            RoomKind::MiniBoss => Some('M'),
        }
    }
}

impl fmt::Display for RoomKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RoomKind::Unassigned => "unassigned",
            RoomKind::Entry => "entry",
            RoomKind::Boss => "boss",
            RoomKind::Shop => "shop",
            RoomKind::MiniBoss => "mini-boss",
        };
        f.write_str(label)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TileRole {
    Floor,
    Wall,
    Door,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TileOwner {
    Room(RoomId),
    Corridor(CorridorId),
}

impl TileOwner {
    pub fn room(self) -> Option<RoomId> {
        match self {
            TileOwner::Room(id) => Some(id),
            TileOwner::Corridor(_) => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Tile {
    pub pos: GridPos,
    pub role: TileRole,
    pub owner: TileOwner,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}
