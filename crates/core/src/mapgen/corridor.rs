//! Corridor routing: graph edges become straight or L-shaped grid segments.

use crate::error::GenerationError;
use crate::rng::DungeonRng;
use crate::types::{Axis, GridPos, RoomId, Vec2};

use super::graph::{PROCESSED_EDGE_WEIGHT, RoomGraph, UNPROCESSED_EDGE_WEIGHT};
use super::grid::round_to_grid;
use super::model::{Room, RoomArena};

/// Cells subtracted from the combined half extents before two rooms count as
/// aligned enough for a straight corridor.
pub const ALIGNMENT_MARGIN: f32 = 1.0;

/// Axis-aligned corridor centerline with `start <= end` lexicographically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CorridorSegment {
    pub start: GridPos,
    pub end: GridPos,
    pub axis: Axis,
}

impl CorridorSegment {
    pub fn new(a: GridPos, b: GridPos) -> Result<Self, GenerationError> {
        let (start, end) = if a <= b { (a, b) } else { (b, a) };
        let axis = if start.y == end.y {
            Axis::Horizontal
        } else if start.x == end.x {
            Axis::Vertical
        } else {
            return Err(GenerationError::MalformedLine { start, end });
        };
        Ok(Self { start, end, axis })
    }

    /// Cell count along the long axis.
    pub fn cell_count(&self) -> i32 {
        let (from, to) = self.long_span();
        to - from + 1
    }

    /// Centerline cells from `start` to `end` inclusive.
    pub fn cells(&self) -> impl Iterator<Item = GridPos> + '_ {
        let (from, to) = self.long_span();
        (from..=to).map(|t| self.at(t, 0))
    }

    /// Inclusive range of the long-axis coordinate.
    pub fn long_span(&self) -> (i32, i32) {
        match self.axis {
            Axis::Horizontal => (self.start.x, self.end.x),
            Axis::Vertical => (self.start.y, self.end.y),
        }
    }

    /// Cell at long-axis coordinate `t`, shifted `offset` across the axis.
    pub fn at(&self, t: i32, offset: i32) -> GridPos {
        match self.axis {
            Axis::Horizontal => GridPos { x: t, y: self.start.y + offset },
            Axis::Vertical => GridPos { x: self.start.x + offset, y: t },
        }
    }

    pub fn midpoint(&self) -> Vec2 {
        Vec2 {
            x: (self.start.x + self.end.x) as f32 / 2.0,
            y: (self.start.y + self.end.y) as f32 / 2.0,
        }
    }
}

fn snap(x: i32, y: i32, grid_size: i32) -> GridPos {
    GridPos { x: round_to_grid(x as f32, grid_size), y: round_to_grid(y as f32, grid_size) }
}

/// Grid line nearest `midpoint` that lies in both inclusive spans, so a
/// straight corridor along it opens into the interior of each room.
fn shared_lane(first: (i32, i32), second: (i32, i32), midpoint: f32, grid_size: i32) -> Option<i32> {
    let (low, high) = (first.0.max(second.0), first.1.min(second.1));
    if low > high {
        return None;
    }
    let preferred = round_to_grid(midpoint, grid_size).clamp(low, high);
    let snapped = round_to_grid(preferred as f32, grid_size);
    [snapped, snapped - grid_size].into_iter().find(|lane| (low..=high).contains(lane))
}

/// Segments joining `first` and `second`: one when their interiors share a
/// lane on either axis, otherwise two legs meeting at a jittered corner.
pub fn route_edge(
    first: &Room,
    second: &Room,
    grid_size: i32,
    rng: &mut DungeonRng,
) -> Result<Vec<CorridorSegment>, GenerationError> {
    let (c1, c2) = (first.grid_center(), second.grid_center());
    let dx = (c2.x - c1.x).abs() as f32;
    let dy = (c2.y - c1.y).abs() as f32;

    let (inner1, inner2) = (first.interior(), second.interior());

    if dx < (first.width + second.width) as f32 / 2.0 - ALIGNMENT_MARGIN
        && let Some(x) = shared_lane(
            (inner1.min.x, inner1.max.x),
            (inner2.min.x, inner2.max.x),
            (c1.x + c2.x) as f32 / 2.0,
            grid_size,
        )
    {
        let (lower, upper) = if c1.y <= c2.y { (first, second) } else { (second, first) };
        let from = snap(x, lower.grid_center().y + lower.half_height(), grid_size);
        let to = snap(x, upper.grid_center().y - upper.half_height(), grid_size);
        return Ok(vec![CorridorSegment::new(from, to)?]);
    }

    if dy < (first.height + second.height) as f32 / 2.0 - ALIGNMENT_MARGIN
        && let Some(y) = shared_lane(
            (inner1.min.y, inner1.max.y),
            (inner2.min.y, inner2.max.y),
            (c1.y + c2.y) as f32 / 2.0,
            grid_size,
        )
    {
        let (left, right) = if c1.x <= c2.x { (first, second) } else { (second, first) };
        let from = snap(left.grid_center().x + left.half_width(), y, grid_size);
        let to = snap(right.grid_center().x - right.half_width(), y, grid_size);
        return Ok(vec![CorridorSegment::new(from, to)?]);
    }

    let corner_x = c1.x + rng.jitter() * grid_size;
    let corner_y = c2.y + rng.jitter() * grid_size;
    let corner = snap(corner_x, corner_y, grid_size);

    let leaving_y = if corner_y > c1.y { c1.y + first.half_height() } else { c1.y - first.half_height() };
    let entering_x = if corner_x > c2.x { c2.x + second.half_width() } else { c2.x - second.half_width() };

    let vertical = CorridorSegment::new(snap(corner_x, leaving_y, grid_size), corner)?;
    let horizontal = CorridorSegment::new(snap(entering_x, corner_y, grid_size), corner)?;
    Ok(vec![vertical, horizontal])
}

/// Routes every unprocessed edge once and marks it processed both ways.
pub fn route_corridors(
    graph: &mut RoomGraph,
    rooms: &RoomArena,
    grid_size: i32,
    rng: &mut DungeonRng,
) -> Result<Vec<CorridorSegment>, GenerationError> {
    let pending: Vec<(RoomId, RoomId)> = graph
        .nodes()
        .flat_map(|node| graph.neighbors(node).map(move |(neighbor, weight)| (node, neighbor, weight)))
        .filter(|&(_, _, weight)| weight == UNPROCESSED_EDGE_WEIGHT)
        .map(|(node, neighbor, _)| (node, neighbor))
        .collect();

    let mut segments = Vec::new();
    for (from, to) in pending {
        if graph.weight(from, to) != Some(UNPROCESSED_EDGE_WEIGHT) {
            continue;
        }
        let (Some(first), Some(second)) = (rooms.get(from), rooms.get(to)) else {
            continue;
        };
        segments.extend(route_edge(first, second, grid_size, rng)?);
        graph.set_weight(from, to, PROCESSED_EDGE_WEIGHT);
        graph.set_weight(to, from, PROCESSED_EDGE_WEIGHT);
    }

    log::debug!("routed {} corridor segments", segments.len());
    Ok(segments)
}
