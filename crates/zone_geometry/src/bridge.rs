//! Conversions between rectangles, polygons, masks and contours.
//!
//! Polygon-producing operations depend on the polygon backend and report
//! [`Conversion::Unavailable`] when it is missing; raster and contour
//! operations always work.

use std::sync::OnceLock;

use image::Luma;
use tracing::{trace, warn};

use crate::{
    algorithms::{ImageprocContourTracer, ImageprocRasterizer},
    backend,
    traits::{ContourTracer, PolygonRepair, RingRasterizer},
    types::{open_ring, Contour, Conversion, Mask, Rect, ZonePolygon},
};

/// Foreground value written by [`polygon_to_mask`] unless told otherwise.
pub const DEFAULT_FILL_VALUE: u8 = 255;

/// Binarization threshold used by [`mask_to_polygon`] unless told otherwise.
pub const DEFAULT_THRESHOLD: u8 = 127;

/// Stateless conversion engine with pluggable raster and polygon primitives.
pub struct GeometryBridge {
    rasterizer: Box<dyn RingRasterizer>,
    tracer: Box<dyn ContourTracer>,
    backend: Option<Box<dyn PolygonRepair>>,
}

impl GeometryBridge {
    /// Bridge with the default primitives, honouring the process-wide
    /// backend probe.
    pub fn new() -> Self {
        if backend::is_polygon_backend_available() {
            Self::with_components(ImageprocRasterizer, ImageprocContourTracer, default_backend())
        } else {
            Self::without_polygon_backend()
        }
    }

    /// Bridge that behaves as if no polygon library were installed.
    pub fn without_polygon_backend() -> Self {
        Self {
            rasterizer: Box::new(ImageprocRasterizer),
            tracer: Box::new(ImageprocContourTracer),
            backend: None,
        }
    }

    /// Bridge built from explicit primitives; `backend: None` disables
    /// polygon output.
    pub fn with_components<R, T>(
        rasterizer: R,
        tracer: T,
        backend: Option<Box<dyn PolygonRepair>>,
    ) -> Self
    where
        R: RingRasterizer + 'static,
        T: ContourTracer + 'static,
    {
        Self {
            rasterizer: Box::new(rasterizer),
            tracer: Box::new(tracer),
            backend,
        }
    }

    /// Shared bridge for the free functions of this module.
    pub fn global() -> &'static GeometryBridge {
        static GLOBAL: OnceLock<GeometryBridge> = OnceLock::new();
        GLOBAL.get_or_init(GeometryBridge::new)
    }

    pub fn is_polygon_backend_available(&self) -> bool {
        self.backend.is_some()
    }

    /// The four-corner polygon of `rect`.
    pub fn rect_to_polygon(&self, rect: Rect) -> Conversion<ZonePolygon> {
        if !self.is_polygon_backend_available() {
            return Conversion::Unavailable;
        }

        let Rect { x1, y1, x2, y2 } = rect;
        Conversion::Converted(ZonePolygon::new(
            vec![[x1, y1], [x2, y1], [x2, y2], [x1, y2]],
            vec![],
        ))
    }

    /// Rasterize `polygon` into a fresh `width x height` mask.
    pub fn polygon_to_mask(
        &self,
        polygon: Option<&ZonePolygon>,
        width: u32,
        height: u32,
        fill_value: u8,
    ) -> Mask {
        let mut mask = Mask::new(width, height);
        self.polygon_to_mask_into(polygon, &mut mask, fill_value);
        mask
    }

    /// Rasterize `polygon` into a caller-owned buffer.
    ///
    /// The buffer is cleared first; its previous content never leaks through.
    pub fn polygon_to_mask_into(&self, polygon: Option<&ZonePolygon>, mask: &mut Mask, fill_value: u8) {
        mask.pixels_mut().for_each(|pixel| *pixel = Luma([0]));

        let Some(polygon) = polygon.filter(|polygon| !polygon.is_empty()) else {
            return;
        };

        self.rasterizer.fill_ring(mask, &polygon.exterior, fill_value);
        for hole in &polygon.holes {
            self.rasterizer.fill_ring(mask, hole, 0);
        }
    }

    /// Outline of the largest foreground blob of `mask`.
    ///
    /// Pixels strictly above `threshold` count as foreground. Ties on area go
    /// to the blob found first.
    pub fn mask_to_polygon(&self, mask: &Mask, threshold: u8) -> Conversion<ZonePolygon> {
        if !self.is_polygon_backend_available() {
            return Conversion::Unavailable;
        }

        let binary = imageproc::contrast::threshold(mask, threshold);
        let contours = self.tracer.external_contours(&binary);
        trace!(count = contours.len(), threshold, "extracted external contours");

        let largest = contours.into_iter().fold(None, |best: Option<Contour>, contour| match best {
            Some(best) if best.area() >= contour.area() => Some(best),
            _ => Some(contour),
        });

        match largest {
            Some(contour) => self.contour_to_polygon(&contour),
            None => Conversion::Invalid,
        }
    }

    /// Exterior ring of `polygon` without a closing duplicate.
    pub fn polygon_to_contour(&self, polygon: Option<&ZonePolygon>) -> Contour {
        match polygon {
            Some(polygon) if !polygon.is_empty() => Contour(open_ring(polygon.exterior.clone())),
            _ => Contour::default(),
        }
    }

    /// Polygon through the points of `contour`, repaired when it
    /// self-intersects.
    pub fn contour_to_polygon(&self, contour: &Contour) -> Conversion<ZonePolygon> {
        let Some(backend) = &self.backend else {
            return Conversion::Unavailable;
        };

        if contour.len() < 3 {
            return Conversion::Invalid;
        }

        repair_with(backend.as_ref(), ZonePolygon::new(contour.0.clone(), vec![]))
    }

    /// `polygon` itself when valid, otherwise its repaired form.
    pub fn repair_polygon(&self, polygon: ZonePolygon) -> Conversion<ZonePolygon> {
        match &self.backend {
            Some(backend) => repair_with(backend.as_ref(), polygon),
            None => Conversion::Unavailable,
        }
    }
}

impl Default for GeometryBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for GeometryBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeometryBridge")
            .field("polygon_backend", &self.is_polygon_backend_available())
            .finish_non_exhaustive()
    }
}

fn repair_with(backend: &dyn PolygonRepair, polygon: ZonePolygon) -> Conversion<ZonePolygon> {
    if backend.is_valid(&polygon) {
        return Conversion::Converted(polygon);
    }

    let vertices = polygon.exterior.len();
    trace!(vertices, "repairing invalid polygon");
    match backend.repair(polygon) {
        Some(repaired) => Conversion::Converted(repaired),
        None => {
            warn!(vertices, "polygon could not be repaired");
            Conversion::Invalid
        }
    }
}

#[cfg(feature = "polygon")]
fn default_backend() -> Option<Box<dyn PolygonRepair>> {
    Some(Box::new(crate::algorithms::SplitLoopRepair))
}

#[cfg(not(feature = "polygon"))]
fn default_backend() -> Option<Box<dyn PolygonRepair>> {
    None
}

pub fn rect_to_polygon(rect: Rect) -> Conversion<ZonePolygon> {
    GeometryBridge::global().rect_to_polygon(rect)
}

pub fn polygon_to_mask(polygon: Option<&ZonePolygon>, width: u32, height: u32, fill_value: u8) -> Mask {
    GeometryBridge::global().polygon_to_mask(polygon, width, height, fill_value)
}

pub fn mask_to_polygon(mask: &Mask, threshold: u8) -> Conversion<ZonePolygon> {
    GeometryBridge::global().mask_to_polygon(mask, threshold)
}

pub fn polygon_to_contour(polygon: Option<&ZonePolygon>) -> Contour {
    GeometryBridge::global().polygon_to_contour(polygon)
}

pub fn contour_to_polygon(contour: &Contour) -> Conversion<ZonePolygon> {
    GeometryBridge::global().contour_to_polygon(contour)
}
