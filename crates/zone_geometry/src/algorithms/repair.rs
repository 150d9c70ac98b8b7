use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::Contains;
use geo_types::{Coord, Line};

use crate::{
    traits::PolygonRepair,
    types::{dedup_ring, ring_area, Vertex, ZonePolygon},
};

/// Repairs rings by cutting them at their self-intersections.
///
/// Each ring is cleaned of duplicate points and collinear spikes, then split
/// at every crossing into simple loops. The loop enclosing the most area is
/// kept (the first one found wins a tie). Holes are repaired the same way and
/// dropped when they fail or fall outside the repaired exterior.
#[derive(Debug, Clone, Default)]
pub struct SplitLoopRepair;

impl PolygonRepair for SplitLoopRepair {
    fn is_valid(&self, polygon: &ZonePolygon) -> bool {
        is_simple_ring(&polygon.exterior) && polygon.holes.iter().all(|hole| is_simple_ring(hole))
    }

    fn repair(&self, polygon: ZonePolygon) -> Option<ZonePolygon> {
        if self.is_valid(&polygon) {
            return Some(polygon);
        }

        let exterior = repair_ring(&polygon.exterior)?;
        let shell = ZonePolygon::new(exterior.clone(), vec![]).to_geo_polygon();

        let holes = polygon
            .holes
            .iter()
            .filter_map(|hole| repair_ring(hole))
            .filter(|hole| shell.contains(&ZonePolygon::new(hole.clone(), vec![]).to_geo_polygon()))
            .collect();

        Some(ZonePolygon { exterior, holes })
    }
}

/// At least three distinct vertices, positive area, no spikes and no
/// contact between non-adjacent edges.
pub fn is_simple_ring(ring: &[Vertex]) -> bool {
    let n = ring.len();
    if n < 3 || dedup_ring(ring).len() != n {
        return false;
    }
    if ring_area(ring) == 0.0 {
        return false;
    }
    if (0..n).any(|i| is_spike(ring, i)) {
        return false;
    }
    first_crossing(ring).is_none()
}

/// Largest simple loop hidden in `ring`, `None` if nothing with area is left.
pub fn repair_ring(ring: &[Vertex]) -> Option<Vec<Vertex>> {
    let mut best: Option<(Vec<Vertex>, f64)> = None;

    for candidate in split_into_loops(ring) {
        let area = ring_area(&candidate);
        let better = match &best {
            Some((_, best_area)) => area > *best_area,
            None => area > 0.0,
        };
        if better {
            best = Some((candidate, area));
        }
    }

    best.map(|(ring, _)| ring)
}

fn split_into_loops(ring: &[Vertex]) -> Vec<Vec<Vertex>> {
    let mut loops = Vec::new();
    let mut pending = vec![ring.to_vec()];

    while let Some(ring) = pending.pop() {
        let ring = clean_ring(&ring);
        if ring.len() < 3 {
            continue;
        }

        match first_crossing(&ring) {
            None => loops.push(ring),
            Some((i, j, point)) => {
                // both halves are strictly shorter than `ring`
                let mut inner = vec![point];
                inner.extend_from_slice(&ring[i + 1..=j]);

                let mut outer = ring[..=i].to_vec();
                outer.push(point);
                outer.extend_from_slice(&ring[j + 1..]);

                pending.push(inner);
                pending.push(outer);
            }
        }
    }

    loops
}

/// Remove duplicates and every vertex collinear with its neighbours.
fn clean_ring(ring: &[Vertex]) -> Vec<Vertex> {
    let mut ring = dedup_ring(ring);

    while ring.len() >= 3 {
        let Some(i) = (0..ring.len()).find(|&i| turn(&ring, i).0 == 0) else {
            break;
        };
        ring.remove(i);
        ring = dedup_ring(&ring);
    }

    ring
}

/// (cross, dot) of the two edges meeting at vertex `i`.
fn turn(ring: &[Vertex], i: usize) -> (i64, i64) {
    let n = ring.len();
    let prev = ring[(i + n - 1) % n];
    let cur = ring[i];
    let next = ring[(i + 1) % n];
    let (ax, ay) = ((cur[0] - prev[0]) as i64, (cur[1] - prev[1]) as i64);
    let (bx, by) = ((next[0] - cur[0]) as i64, (next[1] - cur[1]) as i64);
    (ax * by - ay * bx, ax * bx + ay * by)
}

fn is_spike(ring: &[Vertex], i: usize) -> bool {
    let (cross, dot) = turn(ring, i);
    cross == 0 && dot <= 0
}

/// First pair of non-adjacent edges `(i, j)`, `i < j`, that touch, with the
/// contact point snapped to the pixel grid.
fn first_crossing(ring: &[Vertex]) -> Option<(usize, usize, Vertex)> {
    let n = ring.len();
    let to_coord = |[x, y]: Vertex| Coord { x: x as f64, y: y as f64 };
    let edge = |i: usize| Line::new(to_coord(ring[i]), to_coord(ring[(i + 1) % n]));

    for i in 0..n {
        for j in (i + 2)..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            let Some(hit) = line_intersection(edge(i), edge(j)) else {
                continue;
            };
            let point = match hit {
                LineIntersection::SinglePoint { intersection, .. } => intersection,
                LineIntersection::Collinear { intersection } => intersection.start,
            };
            return Some((i, j, [point.x.round() as i32, point.y.round() as i32]));
        }
    }

    None
}
