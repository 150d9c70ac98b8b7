use crate::types::{Contour, Mask, Vertex, ZonePolygon};

/// Trait for filling a closed ring into a raster
pub trait RingRasterizer: Send + Sync {
    /// Set every pixel inside `ring` (boundary included) to `value`.
    ///
    /// Rings with fewer than three distinct vertices enclose nothing and
    /// leave the mask untouched.
    fn fill_ring(&self, mask: &mut Mask, ring: &[Vertex], value: u8);
}

/// Trait for boundary extraction from a binary raster
pub trait ContourTracer: Send + Sync {
    /// Outer boundaries of every foreground component, in discovery order.
    fn external_contours(&self, binary: &Mask) -> Vec<Contour>;
}

/// Trait for turning an invalid polygon into a valid one
pub trait PolygonRepair: Send + Sync {
    /// Whether `polygon` is already valid.
    fn is_valid(&self, polygon: &ZonePolygon) -> bool;

    /// Nearest valid polygon, or `None` when nothing with area survives.
    fn repair(&self, polygon: ZonePolygon) -> Option<ZonePolygon>;
}
