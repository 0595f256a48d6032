//! Delaunay triangulation of main-room centers.
//!
//! Centers are converted to fixed point and every predicate is evaluated
//! exactly in integer arithmetic, so collinear and cocircular inputs never
//! depend on floating-point rounding. Main-room counts are small, which makes
//! direct enumeration of empty-circumcircle triangles affordable:
//!
//! 1. every counter-clockwise, non-degenerate triple whose circumcircle holds
//!    no other point strictly inside is a candidate;
//! 2. candidates are accepted in index order unless they overlap an already
//!    accepted triangle, which picks one diagonal for each cocircular group.
//!
//! When every point is collinear there is no triangle at all; the points are
//! then chained along the line so the connectivity graph still spans them.

use crate::types::{RoomId, Vec2};

/// Fixed-point scale applied before rounding centers to integers.
const FIXED_POINT_SCALE: f32 = 256.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriangulationVertex {
    pub room: RoomId,
    pub position: Vec2,
}

/// Vertices in counter-clockwise order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    pub vertices: [TriangulationVertex; 3],
}

impl Triangle {
    pub fn rooms(&self) -> [RoomId; 3] {
        self.vertices.map(|vertex| vertex.room)
    }

    pub fn edges(&self) -> [(TriangulationVertex, TriangulationVertex); 3] {
        let [a, b, c] = self.vertices;
        [(a, b), (b, c), (c, a)]
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Triangulation {
    pub triangles: Vec<Triangle>,
    /// Edges used instead of triangles when the input is degenerate.
    pub chain: Vec<(TriangulationVertex, TriangulationVertex)>,
}

impl Triangulation {
    /// Distinct undirected edges in first-seen order.
    pub fn edges(&self) -> Vec<(TriangulationVertex, TriangulationVertex)> {
        let mut seen = Vec::new();
        let mut edges = Vec::new();
        let all = self.triangles.iter().flat_map(Triangle::edges).chain(self.chain.iter().copied());
        for (a, b) in all {
            let key = if a.room <= b.room { (a.room, b.room) } else { (b.room, a.room) };
            if !seen.contains(&key) {
                seen.push(key);
                edges.push((a, b));
            }
        }
        edges
    }

    pub fn is_degenerate(&self) -> bool {
        self.triangles.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct FixedPoint {
    x: i64,
    y: i64,
}

impl FixedPoint {
    fn from_vec2(position: Vec2) -> Self {
        Self {
            x: (position.x * FIXED_POINT_SCALE).round() as i64,
            y: (position.y * FIXED_POINT_SCALE).round() as i64,
        }
    }
}

/// Twice the signed area of `abc`; positive when counter-clockwise.
fn orient(a: FixedPoint, b: FixedPoint, c: FixedPoint) -> i128 {
    let (abx, aby) = (i128::from(b.x - a.x), i128::from(b.y - a.y));
    let (acx, acy) = (i128::from(c.x - a.x), i128::from(c.y - a.y));
    abx * acy - aby * acx
}

/// Positive when `d` lies strictly inside the circumcircle of the
/// counter-clockwise triangle `abc`.
fn in_circle(a: FixedPoint, b: FixedPoint, c: FixedPoint, d: FixedPoint) -> i128 {
    let (adx, ady) = (i128::from(a.x - d.x), i128::from(a.y - d.y));
    let (bdx, bdy) = (i128::from(b.x - d.x), i128::from(b.y - d.y));
    let (cdx, cdy) = (i128::from(c.x - d.x), i128::from(c.y - d.y));
    let ad = adx * adx + ady * ady;
    let bd = bdx * bdx + bdy * bdy;
    let cd = cdx * cdx + cdy * cdy;
    ad * (bdx * cdy - cdx * bdy) - bd * (adx * cdy - cdx * ady) + cd * (adx * bdy - bdx * ady)
}

fn segments_cross(p1: FixedPoint, p2: FixedPoint, q1: FixedPoint, q2: FixedPoint) -> bool {
    let d1 = orient(p1, p2, q1).signum();
    let d2 = orient(p1, p2, q2).signum();
    let d3 = orient(q1, q2, p1).signum();
    let d4 = orient(q1, q2, p2).signum();
    d1 * d2 < 0 && d3 * d4 < 0
}

fn strictly_inside(tri: [FixedPoint; 3], point: FixedPoint) -> bool {
    let [a, b, c] = tri;
    orient(a, b, point) > 0 && orient(b, c, point) > 0 && orient(c, a, point) > 0
}

fn triangles_overlap(left: [FixedPoint; 3], right: [FixedPoint; 3]) -> bool {
    let mut sorted_left = left;
    let mut sorted_right = right;
    sorted_left.sort_unstable();
    sorted_right.sort_unstable();
    if sorted_left == sorted_right {
        return true;
    }
    for i in 0..3 {
        for j in 0..3 {
            if segments_cross(left[i], left[(i + 1) % 3], right[j], right[(j + 1) % 3]) {
                return true;
            }
        }
    }
    left.iter().any(|&point| strictly_inside(right, point))
        || right.iter().any(|&point| strictly_inside(left, point))
}

/// Triangulates room centers. Fewer than two distinct points yield nothing.
pub fn triangulate(vertices: &[TriangulationVertex]) -> Triangulation {
    let mut points: Vec<(FixedPoint, TriangulationVertex)> = Vec::with_capacity(vertices.len());
    for &vertex in vertices {
        let fixed = FixedPoint::from_vec2(vertex.position);
        if points.iter().all(|&(other, _)| other != fixed) {
            points.push((fixed, vertex));
        }
    }

    let mut accepted: Vec<[usize; 3]> = Vec::new();
    let n = points.len();
    for i in 0..n {
        for j in (i + 1)..n {
            for k in (j + 1)..n {
                let (a, b, c) = (points[i].0, points[j].0, points[k].0);
                let tri = match orient(a, b, c).signum() {
                    0 => continue,
                    1 => [i, j, k],
                    _ => [i, k, j],
                };
                let fixed = tri.map(|index| points[index].0);
                let empty = (0..n).filter(|index| !tri.contains(index)).all(|index| {
                    in_circle(fixed[0], fixed[1], fixed[2], points[index].0) <= 0
                });
                if !empty {
                    continue;
                }
                let overlaps = accepted
                    .iter()
                    .any(|other| triangles_overlap(fixed, other.map(|index| points[index].0)));
                if !overlaps {
                    accepted.push(tri);
                }
            }
        }
    }

    let triangles: Vec<Triangle> = accepted
        .iter()
        .map(|tri| Triangle { vertices: tri.map(|index| points[index].1) })
        .collect();

    let chain = if triangles.is_empty() && n >= 2 {
        let mut along_line = points.clone();
        along_line.sort_by_key(|&(fixed, _)| fixed);
        along_line.windows(2).map(|pair| (pair[0].1, pair[1].1)).collect()
    } else {
        Vec::new()
    };

    Triangulation { triangles, chain }
}
