use imageproc::contours::{find_contours, BorderType};

use crate::{
    traits::ContourTracer,
    types::{Contour, Mask, Vertex},
};

/// Imageproc-based contour tracer.
///
/// Keeps top-level outer borders only and compresses straight runs down to
/// their end points.
#[derive(Debug, Clone, Default)]
pub struct ImageprocContourTracer;

impl ContourTracer for ImageprocContourTracer {
    fn external_contours(&self, binary: &Mask) -> Vec<Contour> {
        find_contours::<i32>(binary)
            .into_iter()
            .filter(|contour| matches!(contour.border_type, BorderType::Outer) && contour.parent.is_none())
            .map(|contour| {
                let points: Vec<Vertex> = contour.points.iter().map(|p| [p.x, p.y]).collect();
                Contour(compress_straight_runs(&points))
            })
            .collect()
    }
}

/// Drop every point that continues the direction of the previous step.
pub fn compress_straight_runs(points: &[Vertex]) -> Vec<Vertex> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let cur = points[i];
            let next = points[(i + 1) % n];
            let (ax, ay) = (cur[0] - prev[0], cur[1] - prev[1]);
            let (bx, by) = (next[0] - cur[0], next[1] - cur[1]);
            let cross = ax as i64 * by as i64 - ay as i64 * bx as i64;
            let dot = ax as i64 * bx as i64 + ay as i64 * by as i64;
            !(cross == 0 && dot > 0)
        })
        .map(|i| points[i])
        .collect()
}
