//! Candidate room sampling inside a density-preserving ellipse.

use std::f32::consts::TAU;

use crate::config::{DungeonConfig, IntRange};
use crate::rng::DungeonRng;
use crate::types::Vec2;

use super::model::{Room, RoomArena, insert_room};

/// Bounds and spread used to draw candidate rooms.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SamplingParams {
    pub count: IntRange,
    pub width: IntRange,
    pub height: IntRange,
    pub spread_factor: f32,
    pub x_scale: f32,
    pub y_scale: f32,
}

impl SamplingParams {
    pub fn from_config(config: &DungeonConfig) -> Self {
        Self {
            count: config.room_count,
            width: config.room_width,
            height: config.room_height,
            spread_factor: config.layout_spread_factor,
            x_scale: config.ellipse_x_scale,
            y_scale: config.ellipse_y_scale,
        }
    }

    /// Scales with `sqrt(count)` so initial density does not depend on room count.
    pub fn layout_radius(&self, count: i32) -> f32 {
        (count as f32).sqrt() * (self.width.max + self.height.max) as f32 / 6.0
            * self.spread_factor
    }
}

/// Rooms in sampling order with raw (unsnapped) centers and no connections.
pub fn sample_rooms(params: &SamplingParams, rng: &mut DungeonRng) -> RoomArena {
    let count = rng.range_inclusive(params.count).max(0);
    let radius = params.layout_radius(count);

    let mut rooms = RoomArena::with_capacity_and_key(count as usize);
    for _ in 0..count {
        let width = rng.odd_in(params.width);
        let height = rng.odd_in(params.height);
        let center = random_point_in_ellipse(rng, radius, params.x_scale, params.y_scale);
        insert_room(&mut rooms, Room::new(center, width, height));
    }
    rooms
}

/// Triangular radial density: points cluster toward the middle but reach the rim.
fn random_point_in_circle(rng: &mut DungeonRng, radius: f32) -> Vec2 {
    let theta = TAU * rng.unit_f32();
    let u = rng.unit_f32() + rng.unit_f32();
    let r = if u > 1.0 { 2.0 - u } else { u };
    Vec2 { x: radius * r * theta.cos(), y: radius * r * theta.sin() }
}

fn random_point_in_ellipse(rng: &mut DungeonRng, radius: f32, x_scale: f32, y_scale: f32) -> Vec2 {
    let point = random_point_in_circle(rng, radius);
    Vec2 { x: point.x * x_scale, y: point.y * y_scale }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(count: IntRange, width: IntRange, height: IntRange) -> SamplingParams {
        SamplingParams { count, width, height, spread_factor: 1.0, x_scale: 2.0, y_scale: 1.0 }
    }

    #[test]
    fn fixed_ranges_produce_exact_room_count_and_sizes() {
        let params = params(IntRange::fixed(5), IntRange::fixed(3), IntRange::fixed(3));
        let rooms = sample_rooms(&params, &mut DungeonRng::seed_from_u64(1));
        assert_eq!(rooms.len(), 5);
        for room in rooms.values() {
            assert_eq!((room.width, room.height), (3, 3));
        }
    }

    #[test]
    fn sampled_sizes_are_odd_and_inside_configured_ranges() {
        let params = params(IntRange::new(10, 40), IntRange::new(3, 10), IntRange::new(4, 9));
        let rooms = sample_rooms(&params, &mut DungeonRng::seed_from_u64(77));
        assert!((10..=40).contains(&rooms.len()));
        for room in rooms.values() {
            assert!(room.width % 2 == 1 && (3..=10).contains(&room.width));
            assert!(room.height % 2 == 1 && (4..=9).contains(&room.height));
            assert!(room.connected_ids.is_empty());
            assert!(room.is_enclosed);
        }
    }

    #[test]
    fn centers_stay_inside_the_scaled_ellipse() {
        let params = params(IntRange::fixed(60), IntRange::fixed(5), IntRange::fixed(7));
        let radius = params.layout_radius(60);
        let rooms = sample_rooms(&params, &mut DungeonRng::seed_from_u64(3));
        for room in rooms.values() {
            let nx = room.center.x / (radius * params.x_scale);
            let ny = room.center.y / (radius * params.y_scale);
            assert!(nx * nx + ny * ny <= 1.0 + 1e-4, "{:?} escapes the ellipse", room.center);
        }
    }

    #[test]
    fn same_seed_reproduces_the_same_rooms() {
        let params = params(IntRange::new(8, 12), IntRange::new(3, 9), IntRange::new(3, 9));
        let first = sample_rooms(&params, &mut DungeonRng::seed_from_u64(9));
        let second = sample_rooms(&params, &mut DungeonRng::seed_from_u64(9));
        let first: Vec<_> = first.values().map(|room| (room.center, room.width)).collect();
        let second: Vec<_> = second.values().map(|room| (room.center, room.width)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn radius_grows_with_square_root_of_count() {
        let params = params(IntRange::fixed(4), IntRange::fixed(9), IntRange::fixed(9));
        assert_eq!(params.layout_radius(4), 6.0);
        assert_eq!(params.layout_radius(16), 12.0);
    }
}
