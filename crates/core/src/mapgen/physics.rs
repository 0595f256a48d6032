//! Step-wise rigid-body repulsion that pushes overlapping rooms apart.
//!
//! Each room is an axis-aligned box covering its footprint plus padding on
//! every side. A step visits every overlapping pair in a fixed order and moves
//! both bodies apart along the axis of least penetration, half the depth each.
//! The simulation settles once no body moved more than the sleep threshold
//! during a step. Snapping to the grid happens only after settling.

use crate::error::GenerationError;
use crate::types::{RoomId, Vec2};

use super::grid::round_to_grid;
use super::model::RoomArena;

/// Extra clearance per side so grid snapping can never re-introduce overlap.
const SNAP_SLOP: f32 = 0.5;
const PUSH_SHARE: f32 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimulationStatus {
    Moving,
    Settled,
}

#[derive(Clone, Debug)]
struct Body {
    room: RoomId,
    position: Vec2,
    half_extents: Vec2,
    displacement: f32,
}

#[derive(Clone, Debug)]
pub struct OverlapSimulation {
    bodies: Vec<Body>,
    steps: u32,
    max_steps: u32,
    sleep_threshold: f32,
    settled: bool,
}

impl OverlapSimulation {
    pub fn new(rooms: &RoomArena, padding: i32, max_steps: u32, sleep_threshold: f32) -> Self {
        let bodies = rooms
            .values()
            .map(|room| Body {
                room: room.id,
                position: room.center,
                half_extents: Vec2 {
                    x: room.width as f32 / 2.0 + padding as f32 + SNAP_SLOP,
                    y: room.height as f32 / 2.0 + padding as f32 + SNAP_SLOP,
                },
                displacement: 0.0,
            })
            .collect();
        Self { bodies, steps: 0, max_steps, sleep_threshold, settled: false }
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Largest distance any body travelled during the last step.
    pub fn peak_displacement(&self) -> f32 {
        self.bodies.iter().map(|body| body.displacement).fold(0.0, f32::max)
    }

    pub fn step(&mut self) -> Result<SimulationStatus, GenerationError> {
        if self.settled {
            return Ok(SimulationStatus::Settled);
        }
        if self.steps >= self.max_steps {
            return Err(GenerationError::ConvergenceTimeout { steps: self.steps });
        }

        for body in &mut self.bodies {
            body.displacement = 0.0;
        }
        for i in 0..self.bodies.len() {
            for j in (i + 1)..self.bodies.len() {
                self.separate_pair(i, j);
            }
        }
        self.steps += 1;

        if self.peak_displacement() < self.sleep_threshold {
            self.settled = true;
            Ok(SimulationStatus::Settled)
        } else {
            Ok(SimulationStatus::Moving)
        }
    }

    /// Steps until settled or the budget runs out; returns the steps taken.
    pub fn run(&mut self) -> Result<u32, GenerationError> {
        while self.step()? == SimulationStatus::Moving {}
        Ok(self.steps)
    }

    /// Writes grid-snapped centers back into the arena.
    pub fn apply_snapped(&self, rooms: &mut RoomArena, grid_size: i32) {
        for body in &self.bodies {
            if let Some(room) = rooms.get_mut(body.room) {
                room.center = Vec2 {
                    x: round_to_grid(body.position.x, grid_size) as f32,
                    y: round_to_grid(body.position.y, grid_size) as f32,
                };
            }
        }
    }

    fn separate_pair(&mut self, i: usize, j: usize) {
        let (a, b) = (&self.bodies[i], &self.bodies[j]);
        let delta = b.position - a.position;
        let overlap_x = a.half_extents.x + b.half_extents.x - delta.x.abs();
        let overlap_y = a.half_extents.y + b.half_extents.y - delta.y.abs();
        if overlap_x <= 0.0 || overlap_y <= 0.0 {
            return;
        }

        // Coincident centers push the later body toward positive x / y.
        let push = if overlap_x <= overlap_y {
            let direction = if delta.x < 0.0 { -1.0 } else { 1.0 };
            Vec2 { x: direction * overlap_x * PUSH_SHARE, y: 0.0 }
        } else {
            let direction = if delta.y < 0.0 { -1.0 } else { 1.0 };
            Vec2 { x: 0.0, y: direction * overlap_y * PUSH_SHARE }
        };

        let distance = push.length();
        self.bodies[i].position = self.bodies[i].position - push;
        self.bodies[i].displacement += distance;
        self.bodies[j].position = self.bodies[j].position + push;
        self.bodies[j].displacement += distance;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapgen::model::{Room, insert_room};

    fn arena(rooms: &[(f32, f32, i32, i32)]) -> RoomArena {
        let mut arena = RoomArena::with_key();
        for &(x, y, width, height) in rooms {
            insert_room(&mut arena, Room::new(Vec2::new(x, y), width, height));
        }
        arena
    }

    fn assert_no_padded_overlap(rooms: &RoomArena, padding: i32) {
        let all: Vec<_> = rooms.values().collect();
        for (index, left) in all.iter().enumerate() {
            for right in &all[index + 1..] {
                assert!(
                    !left.padded_footprint(padding).intersects(&right.padded_footprint(padding)),
                    "rooms overlap: {left:?} vs {right:?}"
                );
            }
        }
    }

    #[test]
    fn already_separated_rooms_settle_on_first_step() {
        let rooms = arena(&[(0.0, 0.0, 3, 3), (50.0, 0.0, 3, 3)]);
        let mut simulation = OverlapSimulation::new(&rooms, 2, 100, 0.001);
        assert_eq!(simulation.step(), Ok(SimulationStatus::Settled));
        assert_eq!(simulation.steps(), 1);
    }

    #[test]
    fn coincident_rooms_are_pushed_apart_and_snapped_without_overlap() {
        let mut rooms = arena(&[(0.0, 0.0, 5, 5), (0.0, 0.0, 5, 5), (0.3, 0.1, 3, 7)]);
        let mut simulation = OverlapSimulation::new(&rooms, 2, 1_000, 0.001);
        simulation.run().expect("three rooms should settle");
        simulation.apply_snapped(&mut rooms, 1);
        assert_no_padded_overlap(&rooms, 2);
        for room in rooms.values() {
            assert_eq!(room.center.x.fract(), 0.0);
            assert_eq!(room.center.y.fract(), 0.0);
        }
    }

    #[test]
    fn dense_cluster_settles_and_keeps_padding() {
        let mut specs = Vec::new();
        for index in 0..30 {
            let offset = index as f32 * 0.37;
            specs.push((offset.sin() * 4.0, offset.cos() * 2.0, 3 + 2 * (index % 4), 5));
        }
        let mut rooms = arena(&specs);
        let mut simulation = OverlapSimulation::new(&rooms, 2, 20_000, 0.001);
        simulation.run().expect("cluster should settle");
        simulation.apply_snapped(&mut rooms, 1);
        assert_no_padded_overlap(&rooms, 2);
    }

    #[test]
    fn exhausted_step_budget_reports_convergence_timeout() {
        let rooms = arena(&[(0.0, 0.0, 9, 9), (0.5, 0.5, 9, 9), (1.0, 0.0, 9, 9)]);
        let mut simulation = OverlapSimulation::new(&rooms, 2, 1, 0.001);
        assert_eq!(simulation.step(), Ok(SimulationStatus::Moving));
        assert_eq!(simulation.step(), Err(GenerationError::ConvergenceTimeout { steps: 1 }));
    }

    #[test]
    fn identical_inputs_settle_identically() {
        let specs = [(0.0, 0.0, 7, 3), (1.0, 1.0, 5, 5), (-1.0, 0.5, 3, 9), (0.2, -0.7, 5, 3)];
        let mut first = arena(&specs);
        let mut second = arena(&specs);
        let mut sim_a = OverlapSimulation::new(&first, 2, 5_000, 0.001);
        let mut sim_b = OverlapSimulation::new(&second, 2, 5_000, 0.001);
        assert_eq!(sim_a.run(), sim_b.run());
        sim_a.apply_snapped(&mut first, 1);
        sim_b.apply_snapped(&mut second, 1);
        let centers = |rooms: &RoomArena| rooms.values().map(|room| room.center).collect::<Vec<_>>();
        assert_eq!(centers(&first), centers(&second));
    }
}
