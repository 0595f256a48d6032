pub mod config;
pub mod error;
pub mod mapgen;
pub mod rng;
pub mod types;

pub use config::{DungeonConfig, IntRange};
pub use error::{ConfigError, GenerationError};
pub use mapgen::{
    AdvanceResult, Corridor, Door, DoorShape, DungeonGenerator, GeneratedDungeon,
    GenerationStatus, LayoutPiece, Room, RoomArena, RoomGraph, Side, Sides, TileMap,
    generate_dungeon,
};
pub use rng::{DungeonRng, Stage};
pub use types::*;
