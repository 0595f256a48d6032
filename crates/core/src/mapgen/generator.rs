//! Step-wise orchestration of the generation pipeline.
//!
//! Overlap resolution is the only stage whose length depends on the input, so
//! [`DungeonGenerator::advance`] hands control back to the caller after a
//! bounded number of resolver steps. Once the rooms settle, every remaining
//! stage runs synchronously within the same call.

use std::mem;

use crate::config::DungeonConfig;
use crate::error::GenerationError;
use crate::rng::{DungeonRng, Stage};
use crate::types::CorridorId;

use super::carve::{carve_corridors, stamp_rooms};
use super::connectivity::connect_main_rooms;
use super::corridor::route_corridors;
use super::doors::classify_doors;
use super::model::{Corridor, GeneratedDungeon, RoomArena};
use super::physics::{OverlapSimulation, SimulationStatus};
use super::placement::place_special_rooms;
use super::prune::{find_support_rooms, prune_rooms};
use super::sampler::{SamplingParams, sample_rooms};
use super::selection::select_main_rooms;
use super::tiles::TileMap;

#[derive(Clone, Debug, PartialEq)]
pub enum GenerationStatus {
    InProgress,
    Finished,
    /// Recoverable failure; call [`DungeonGenerator::regenerate`].
    RegenerationNeeded(GenerationError),
    Failed(GenerationError),
}

impl GenerationStatus {
    fn from_error(err: GenerationError) -> Self {
        if err.is_recoverable() {
            GenerationStatus::RegenerationNeeded(err)
        } else {
            GenerationStatus::Failed(err)
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AdvanceResult {
    pub simulated_steps: u32,
    pub status: GenerationStatus,
}

enum Phase {
    Sampling,
    Resolving(OverlapSimulation),
    Finished(Box<GeneratedDungeon>),
    Stopped(GenerationError),
}

pub struct DungeonGenerator {
    config: DungeonConfig,
    seed: u64,
    attempt: u32,
    rooms: RoomArena,
    phase: Phase,
}

impl DungeonGenerator {
    pub fn new(config: DungeonConfig, seed: u64) -> Result<Self, GenerationError> {
        config.validate()?;
        Ok(Self { config, seed, attempt: 0, rooms: RoomArena::with_key(), phase: Phase::Sampling })
    }

    pub fn config(&self) -> &DungeonConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Candidate rooms of the current attempt, for hosts that draw progress.
    pub fn rooms(&self) -> &RoomArena {
        &self.rooms
    }

    pub fn is_generation_finished(&self) -> bool {
        matches!(self.phase, Phase::Finished(_))
    }

    pub fn generation_failed(&self) -> bool {
        matches!(&self.phase, Phase::Stopped(err) if !err.is_recoverable())
    }

    pub fn needs_regeneration(&self) -> bool {
        matches!(&self.phase, Phase::Stopped(err) if err.is_recoverable())
    }

    pub fn dungeon(&self) -> Option<&GeneratedDungeon> {
        match &self.phase {
            Phase::Finished(dungeon) => Some(dungeon.as_ref()),
            _ => None,
        }
    }

    pub fn into_dungeon(self) -> Option<GeneratedDungeon> {
        match self.phase {
            Phase::Finished(dungeon) => Some(*dungeon),
            _ => None,
        }
    }

    pub fn status(&self) -> GenerationStatus {
        match &self.phase {
            Phase::Sampling | Phase::Resolving(_) => GenerationStatus::InProgress,
            Phase::Finished(_) => GenerationStatus::Finished,
            Phase::Stopped(err) => GenerationStatus::from_error(err.clone()),
        }
    }

    /// Runs at most `max_steps` resolver steps, then the rest of the pipeline
    /// once the rooms have settled.
    pub fn advance(&mut self, max_steps: u32) -> AdvanceResult {
        if matches!(self.phase, Phase::Sampling) {
            self.begin_attempt();
        }

        let mut steps = 0;
        let outcome = match &mut self.phase {
            Phase::Resolving(simulation) => loop {
                if steps >= max_steps {
                    break None;
                }
                match simulation.step() {
                    Ok(SimulationStatus::Moving) => steps += 1,
                    Ok(SimulationStatus::Settled) => {
                        steps += 1;
                        log::debug!("rooms settled after {} resolver steps", simulation.steps());
                        simulation.apply_snapped(&mut self.rooms, self.config.grid_size);
                        break Some(Ok(()));
                    }
                    Err(err) => break Some(Err(err)),
                }
            },
            Phase::Sampling | Phase::Finished(_) | Phase::Stopped(_) => None,
        };

        match outcome {
            Some(Ok(())) => match self.build_dungeon() {
                Ok(dungeon) => {
                    log::info!(
                        "generated dungeon seed={} attempt={} fingerprint={:016x}",
                        self.seed,
                        self.attempt,
                        dungeon.fingerprint()
                    );
                    self.phase = Phase::Finished(Box::new(dungeon));
                }
                Err(err) => self.stop(err),
            },
            Some(Err(err)) => self.stop(err),
            None => {}
        }

        AdvanceResult { simulated_steps: steps, status: self.status() }
    }

    fn stop(&mut self, err: GenerationError) {
        log::warn!("attempt {} stopped: {err}", self.attempt);
        self.phase = Phase::Stopped(err);
    }

    /// Discards every room, tile and graph of the current attempt and starts
    /// over with fresh stage seeds.
    pub fn regenerate(&mut self) {
        self.attempt += 1;
        self.rooms = RoomArena::with_key();
        self.phase = Phase::Sampling;
        log::warn!("regenerating dungeon seed={} attempt={}", self.seed, self.attempt);
    }

    /// Advances until done, regenerating on recoverable failures up to the
    /// configured limit.
    pub fn run_to_completion(mut self) -> Result<GeneratedDungeon, GenerationError> {
        loop {
            match self.advance(u32::MAX).status {
                GenerationStatus::InProgress => {}
                GenerationStatus::Finished => {
                    if let Phase::Finished(dungeon) = mem::replace(&mut self.phase, Phase::Sampling) {
                        return Ok(*dungeon);
                    }
                }
                GenerationStatus::RegenerationNeeded(err) => {
                    if self.attempt >= self.config.max_regenerations {
                        return Err(err);
                    }
                    self.regenerate();
                }
                GenerationStatus::Failed(err) => return Err(err),
            }
        }
    }

    fn stage_rng(&self, stage: Stage) -> DungeonRng {
        DungeonRng::for_stage(self.seed, self.attempt, stage)
    }

    fn begin_attempt(&mut self) {
        let params = SamplingParams::from_config(&self.config);
        self.rooms = sample_rooms(&params, &mut self.stage_rng(Stage::Sampling));
        log::debug!("attempt {}: sampled {} candidate rooms", self.attempt, self.rooms.len());
        self.phase = Phase::Resolving(OverlapSimulation::new(
            &self.rooms,
            self.config.room_padding,
            self.config.max_resolver_steps,
            self.config.sleep_threshold,
        ));
    }

    fn build_dungeon(&mut self) -> Result<GeneratedDungeon, GenerationError> {
        let config = &self.config;
        let mut rooms = mem::take(&mut self.rooms);

        let wanted = self.stage_rng(Stage::Selection).range_inclusive(config.main_room_count);
        let main_rooms = select_main_rooms(&rooms, config.main_room_threshold, wanted as usize)?;
        log::debug!("selected {} main rooms", main_rooms.len());

        let connectivity = connect_main_rooms(
            &mut rooms,
            &main_rooms,
            config.edge_add_back_ratio,
            &mut self.stage_rng(Stage::BackEdges),
        );
        let mut graph = connectivity.graph;

        let segments =
            route_corridors(&mut graph, &rooms, config.grid_size, &mut self.stage_rng(Stage::Corridors))?;
        let support_rooms = find_support_rooms(&rooms, &main_rooms, &segments);
        let pruned = prune_rooms(&mut rooms, &main_rooms, &support_rooms);
        log::debug!("kept {} support rooms, pruned {}", support_rooms.len(), pruned);

        let corridors: Vec<Corridor> = segments
            .iter()
            .enumerate()
            .map(|(index, &segment)| Corridor {
                id: CorridorId(index as u32),
                segment,
                center: segment.midpoint(),
            })
            .collect();

        let mut tiles = TileMap::new();
        stamp_rooms(&mut tiles, &rooms, &main_rooms);
        stamp_rooms(&mut tiles, &rooms, &support_rooms);
        let door_tiles = carve_corridors(&mut tiles, &mut rooms, &main_rooms, &corridors);
        let doors = classify_doors(&tiles);
        log::debug!("carved {} tiles with {} door tiles", tiles.len(), door_tiles);

        place_special_rooms(
            &mut rooms,
            &main_rooms,
            config.max_placement_attempts,
            &mut self.stage_rng(Stage::Placement),
        )?;

        Ok(GeneratedDungeon {
            seed: self.seed,
            attempt: self.attempt,
            rooms,
            main_rooms,
            support_rooms,
            corridors,
            graph,
            tiles,
            doors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IntRange;
    use crate::types::RoomKind;

    fn small_config() -> DungeonConfig {
        DungeonConfig {
            room_count: IntRange::new(20, 30),
            main_room_count: IntRange::new(4, 6),
            ..DungeonConfig::default()
        }
    }

    #[test]
    fn advance_yields_after_the_requested_step_budget() {
        let mut generator = DungeonGenerator::new(small_config(), 17).expect("valid config");
        let result = generator.advance(1);
        assert_eq!(result.simulated_steps, 1);
        assert_eq!(result.status, GenerationStatus::InProgress);
        assert!(!generator.is_generation_finished());
        assert!(generator.dungeon().is_none());
        assert!(!generator.rooms().is_empty());
    }

    #[test]
    fn repeated_advance_reaches_a_terminal_status() {
        let mut generator = DungeonGenerator::new(small_config(), 5).expect("valid config");
        let mut total = 0;
        let status = loop {
            let result = generator.advance(25);
            total += result.simulated_steps;
            if result.status != GenerationStatus::InProgress {
                break result.status;
            }
        };
        assert!(total <= generator.config().max_resolver_steps);
        match status {
            GenerationStatus::Finished => {
                let dungeon = generator.dungeon().expect("finished generator holds a dungeon");
                assert!(dungeon.main_rooms.len() >= 4);
                assert_eq!(generator.advance(10).simulated_steps, 0);
            }
            GenerationStatus::RegenerationNeeded(_) => assert!(generator.needs_regeneration()),
            other => panic!("unexpected status {other:?}"),
        }
    }

    #[test]
    fn impossible_main_room_target_asks_for_regeneration() {
        let config = DungeonConfig {
            room_count: IntRange::fixed(6),
            room_width: IntRange::fixed(5),
            room_height: IntRange::fixed(5),
            main_room_threshold: 1.5,
            main_room_count: IntRange::fixed(4),
            ..DungeonConfig::default()
        };
        let mut generator = DungeonGenerator::new(config, 1).expect("valid config");
        let result = generator.advance(u32::MAX);
        assert_eq!(
            result.status,
            GenerationStatus::RegenerationNeeded(GenerationError::InsufficientMainRooms {
                wanted: 4,
                found: 0
            })
        );
        assert!(generator.needs_regeneration());
        assert!(!generator.generation_failed());

        generator.regenerate();
        assert_eq!(generator.attempt(), 1);
        assert!(generator.rooms().is_empty());
        assert_eq!(generator.status(), GenerationStatus::InProgress);
    }

    #[test]
    fn exhausted_regenerations_surface_the_last_error() {
        let config = DungeonConfig {
            room_count: IntRange::fixed(6),
            room_width: IntRange::fixed(5),
            room_height: IntRange::fixed(5),
            main_room_threshold: 1.5,
            main_room_count: IntRange::fixed(4),
            max_regenerations: 2,
            ..DungeonConfig::default()
        };
        let generator = DungeonGenerator::new(config, 1).expect("valid config");
        assert_eq!(
            generator.run_to_completion().map(|dungeon| dungeon.attempt),
            Err(GenerationError::InsufficientMainRooms { wanted: 4, found: 0 })
        );
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let config = DungeonConfig { grid_size: 0, ..DungeonConfig::default() };
        assert!(matches!(DungeonGenerator::new(config, 0), Err(GenerationError::Config(_))));
    }

    #[test]
    fn completed_dungeon_has_every_special_room_once() {
        let dungeon = DungeonGenerator::new(small_config(), 99)
            .expect("valid config")
            .run_to_completion()
            .expect("generation succeeds within the regeneration budget");
        for kind in RoomKind::SPECIAL {
            let holders = dungeon.rooms.values().filter(|room| room.kind == kind).count();
            assert_eq!(holders, 1, "{kind}");
            assert!(dungeon.special_room(kind).is_some());
        }
    }
}
