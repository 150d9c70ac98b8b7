use image::Luma;
use imageproc::{drawing::draw_polygon_mut, point::Point};

use crate::{
    traits::RingRasterizer,
    types::{dedup_ring, Mask, Vertex},
};

/// Imageproc-based scanline fill, boundary pixels included
#[derive(Debug, Clone, Default)]
pub struct ImageprocRasterizer;

impl RingRasterizer for ImageprocRasterizer {
    fn fill_ring(&self, mask: &mut Mask, ring: &[Vertex], value: u8) {
        if mask.width() == 0 || mask.height() == 0 {
            return;
        }

        // draw_polygon_mut rejects a repeated closing point
        let ring = dedup_ring(ring);
        if ring.len() < 3 {
            return;
        }

        let points: Vec<Point<i32>> = ring.iter().map(|&[x, y]| Point::new(x, y)).collect();
        draw_polygon_mut(mask, &points, Luma([value]));
    }
}
