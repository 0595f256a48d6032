//! Procedural dungeon generation split into one submodule per pipeline stage.

pub mod carve;
pub mod connectivity;
pub mod corridor;
pub mod doors;
pub mod graph;
pub mod grid;
pub mod physics;
pub mod placement;
pub mod prune;
pub mod sampler;
pub mod selection;
pub mod tiles;
pub mod triangulation;

mod generator;
mod model;

pub use corridor::CorridorSegment;
pub use doors::{Door, DoorShape, Side, Sides};
pub use generator::{AdvanceResult, DungeonGenerator, GenerationStatus};
pub use graph::RoomGraph;
pub use model::{Corridor, GeneratedDungeon, LayoutPiece, Room, RoomArena, insert_room};
pub use tiles::TileMap;

use crate::config::DungeonConfig;
use crate::error::GenerationError;

/// Runs the whole pipeline for `seed`, regenerating on recoverable failures.
pub fn generate_dungeon(
    config: &DungeonConfig,
    seed: u64,
) -> Result<GeneratedDungeon, GenerationError> {
    DungeonGenerator::new(config.clone(), seed)?.run_to_completion()
}
