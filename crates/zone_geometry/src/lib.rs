//! # Zone Geometry
//!
//! Geometry primitives for selecting regions of a document page image: the
//! parts that may be erased and the parts that must be left alone.
//!
//! ## Core Features
//!
//! - **Rectangle algebra**: area, overlap, IoU, expansion and clipping of
//!   axis-aligned boxes
//! - **Conversion bridge**: rectangles, polygons, binary masks and contours,
//!   backed by pluggable rasterizer, tracer and repair traits
//! - **Optional polygon backend**: enabled by the `polygon` feature and the
//!   `ZONE_GEOMETRY_DISABLE_POLYGON` environment switch
//! - **Protected regions**: detector output parsing, filtering and
//!   class-aware overlap suppression
//! - **Safe zones**: user zones minus protected regions and a margin
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use zone_geometry::{mask_to_polygon, polygon_to_mask, rect_to_polygon, Rect};
//!
//! let polygon = rect_to_polygon(Rect::new(10, 10, 50, 40)).ok();
//! let mask = polygon_to_mask(polygon.as_ref(), 100, 100, 255);
//! let traced = mask_to_polygon(&mask, 127);
//! println!("{traced:?}");
//! ```
//!
//! ## Safe Zones
//!
//! ```rust,no_run
//! use zone_geometry::{parse_regions, Rect, SafeZoneOptimizer};
//!
//! let regions = parse_regions(r#"[{"bbox": [40, 0, 60, 100], "label": "table", "confidence": 0.9}]"#)?;
//! let optimizer = SafeZoneOptimizer::builder().margin(5).build()?;
//! if let Some(zones) = optimizer.optimize(Rect::new(0, 0, 100, 100), &regions).ok() {
//!     for zone in zones {
//!         println!("{:?} covers {:.0}%", zone.bbox(), zone.coverage * 100.0);
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Core modules
pub mod error;
pub mod types;
pub mod rect;
pub mod traits;
pub mod algorithms;
pub mod backend;
pub mod bridge;
pub mod regions;
pub mod optimizer;

// Re-exports for convenience
pub use error::{Result, ZoneError};
pub use types::{mask_from_raw, Contour, Conversion, Mask, Rect, Vertex, ZonePolygon};
pub use traits::*;
pub use bridge::{
    contour_to_polygon, mask_to_polygon, polygon_to_contour, polygon_to_mask, rect_to_polygon,
    GeometryBridge, DEFAULT_FILL_VALUE, DEFAULT_THRESHOLD,
};
pub use backend::is_polygon_backend_available;
pub use regions::{
    filter_by_confidence, filter_by_labels, parse_regions, regions_at_point, regions_in_zone,
    suppress_overlaps, OverlapMetric, ProtectedRegion, DEFAULT_PROTECTED_LABELS,
};
pub use optimizer::{optimize_zone, SafeZone, SafeZoneConfig, SafeZoneOptimizer, SafeZoneOptimizerBuilder};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_mask_round_trip() {
        let bridge = GeometryBridge::new();
        let polygon = bridge.rect_to_polygon(Rect::new(20, 20, 80, 60));
        if !bridge.is_polygon_backend_available() {
            assert!(polygon.is_unavailable());
            return;
        }

        let polygon = polygon.ok().unwrap();
        let mask = bridge.polygon_to_mask(Some(&polygon), 100, 100, DEFAULT_FILL_VALUE);
        let traced = bridge.mask_to_polygon(&mask, DEFAULT_THRESHOLD).ok().unwrap();
        assert_eq!(traced.bounding_rect(), Some(Rect::new(20, 20, 80, 60)));
    }

    #[test]
    fn test_free_functions_share_global_capability() {
        assert_eq!(is_polygon_backend_available(), GeometryBridge::global().is_polygon_backend_available());
    }
}
