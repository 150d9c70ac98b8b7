//! Safe zones: the parts of a user zone left after cutting out every
//! protected region plus a safety margin.

pub mod builder;

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    bridge::{GeometryBridge, DEFAULT_FILL_VALUE},
    error::{Result, ZoneError},
    rect,
    regions::ProtectedRegion,
    types::{Contour, Conversion, Mask, Rect, Vertex, ZonePolygon},
};

pub use builder::SafeZoneOptimizerBuilder;

/// Tuning knobs of [`SafeZoneOptimizer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SafeZoneConfig {
    #[schemars(description = "Safety margin around protected regions, in pixels")]
    pub margin: u32,
    #[schemars(description = "Douglas-Peucker tolerance applied to every safe zone")]
    pub simplify_tolerance: f64,
    #[schemars(description = "Safe zones smaller than this area (pixels^2) are dropped")]
    pub min_area: f64,
}

impl Default for SafeZoneConfig {
    fn default() -> Self {
        Self {
            margin: 5,
            simplify_tolerance: 2.0,
            min_area: 100.0,
        }
    }
}

impl SafeZoneConfig {
    /// JSON schema of the configuration
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(SafeZoneConfig)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.simplify_tolerance.is_finite() || self.simplify_tolerance < 0.0 {
            return Err(ZoneError::InvalidConfig(format!(
                "simplify_tolerance must be a finite, non-negative number, got {}",
                self.simplify_tolerance
            )));
        }
        if !self.min_area.is_finite() || self.min_area < 0.0 {
            return Err(ZoneError::InvalidConfig(format!(
                "min_area must be a finite, non-negative number, got {}",
                self.min_area
            )));
        }
        Ok(())
    }
}

/// A region of the user zone free of protected content.
#[derive(Debug, Clone, PartialEq)]
pub struct SafeZone {
    pub polygon: ZonePolygon,
    /// The zone the user asked for
    pub original_zone: Rect,
    /// Share of `original_zone` covered by this safe zone (0.0 - 1.0)
    pub coverage: f64,
}

impl SafeZone {
    pub fn bbox(&self) -> Rect {
        self.polygon.bounding_rect().unwrap_or_default()
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.polygon.exterior
    }

    pub fn area(&self) -> f64 {
        self.polygon.area()
    }

    /// Rasterize through `bridge`, usually [`SafeZoneOptimizer::bridge`].
    pub fn to_mask(&self, bridge: &GeometryBridge, width: u32, height: u32) -> Mask {
        bridge.polygon_to_mask(Some(&self.polygon), width, height, DEFAULT_FILL_VALUE)
    }

    pub fn to_contour(&self, bridge: &GeometryBridge) -> Contour {
        bridge.polygon_to_contour(Some(&self.polygon))
    }
}

/// Subtracts protected regions from user zones.
#[derive(Debug, Clone)]
pub struct SafeZoneOptimizer {
    config: SafeZoneConfig,
    bridge: Arc<GeometryBridge>,
}

impl SafeZoneOptimizer {
    pub fn builder() -> SafeZoneOptimizerBuilder {
        SafeZoneOptimizerBuilder::new()
    }

    pub fn config(&self) -> &SafeZoneConfig {
        &self.config
    }

    /// The bridge every conversion of this optimizer goes through.
    pub fn bridge(&self) -> &GeometryBridge {
        &self.bridge
    }

    /// Safe zones inside `user_zone`.
    ///
    /// A zone with no area yields no safe zones; a zone touched by no region
    /// is returned whole with coverage 1.0.
    pub fn optimize(&self, user_zone: Rect, regions: &[ProtectedRegion]) -> Conversion<Vec<SafeZone>> {
        if !self.bridge.is_polygon_backend_available() {
            return Conversion::Unavailable;
        }

        debug!(
            ?user_zone,
            regions = regions.len(),
            margin = self.config.margin,
            "optimizing zone"
        );
        self.optimize_with_backend(user_zone, regions)
    }

    pub fn optimize_multiple(
        &self,
        zones: &[Rect],
        regions: &[ProtectedRegion],
    ) -> Conversion<Vec<Vec<SafeZone>>> {
        let mut results = Vec::with_capacity(zones.len());
        for &zone in zones {
            match self.optimize(zone, regions) {
                Conversion::Converted(safe_zones) => results.push(safe_zones),
                Conversion::Unavailable => return Conversion::Unavailable,
                Conversion::Invalid => return Conversion::Invalid,
            }
        }
        Conversion::Converted(results)
    }

    #[cfg(feature = "polygon")]
    fn whole_zone(&self, user_zone: Rect) -> Conversion<Vec<SafeZone>> {
        self.bridge.rect_to_polygon(user_zone).map(|polygon| {
            vec![SafeZone {
                polygon,
                original_zone: user_zone,
                coverage: 1.0,
            }]
        })
    }

    #[cfg(feature = "polygon")]
    fn optimize_with_backend(&self, user_zone: Rect, regions: &[ProtectedRegion]) -> Conversion<Vec<SafeZone>> {
        use geo::BooleanOps;
        use geo_types::{Coord, MultiPolygon, Polygon};

        let to_polygon = |r: Rect| -> Polygon<f64> {
            geo_types::Rect::new(
                Coord { x: r.x1 as f64, y: r.y1 as f64 },
                Coord { x: r.x2 as f64, y: r.y2 as f64 },
            )
            .to_polygon()
        };

        let zone_area = rect::area(user_zone);
        if zone_area == 0 {
            debug!("zone has no area");
            return Conversion::Converted(vec![]);
        }

        let relevant = crate::regions::regions_in_zone(user_zone, regions);
        for region in &relevant {
            debug!(label = %region.label, bbox = ?region.bbox, "region intersects zone");
        }

        let margin = i32::try_from(self.config.margin).unwrap_or(i32::MAX);
        let buffers: Vec<Polygon<f64>> = relevant
            .iter()
            .map(|region| rect::expand_rect(region.bbox, margin, None, None))
            .filter(|buffer| rect::area(*buffer) > 0)
            .map(to_polygon)
            .collect();

        if buffers.is_empty() {
            debug!("no protected region in zone, keeping it whole");
            return self.whole_zone(user_zone);
        }

        let protection = buffers
            .into_iter()
            .fold(MultiPolygon::new(vec![]), |merged, buffer| {
                merged.union(&MultiPolygon::new(vec![buffer]))
            });
        let remaining = MultiPolygon::new(vec![to_polygon(user_zone)]).difference(&protection);

        let mut safe_zones = Vec::new();
        for piece in &remaining {
            let simplified = simplify_preserving_rings(piece, self.config.simplify_tolerance);
            let polygon = match self.bridge.repair_polygon(ZonePolygon::from_geo_polygon(&simplified)) {
                Conversion::Converted(polygon) => polygon,
                Conversion::Unavailable | Conversion::Invalid => continue,
            };

            let area = polygon.area();
            if area <= 0.0 || area < self.config.min_area {
                continue;
            }

            safe_zones.push(SafeZone {
                polygon,
                original_zone: user_zone,
                coverage: area / zone_area as f64,
            });
        }

        debug!(count = safe_zones.len(), "computed safe zones");
        Conversion::Converted(safe_zones)
    }

    #[cfg(not(feature = "polygon"))]
    fn optimize_with_backend(&self, _user_zone: Rect, _regions: &[ProtectedRegion]) -> Conversion<Vec<SafeZone>> {
        Conversion::Unavailable
    }
}

/// Douglas-Peucker on every ring, keeping a ring unsimplified when it would
/// collapse below four vertices.
#[cfg(feature = "polygon")]
fn simplify_preserving_rings(polygon: &geo_types::Polygon<f64>, tolerance: f64) -> geo_types::Polygon<f64> {
    use geo::Simplify;
    use geo_types::{LineString, Polygon};

    // closed rings repeat their first coordinate
    let vertices = |ring: &LineString<f64>| ring.0.len().saturating_sub(1);
    let simplify_ring = |ring: &LineString<f64>| {
        let simplified = ring.simplify(&tolerance);
        if vertices(&simplified) < 4 && vertices(ring) >= 4 {
            ring.clone()
        } else {
            simplified
        }
    };

    Polygon::new(
        simplify_ring(polygon.exterior()),
        polygon.interiors().iter().map(simplify_ring).collect(),
    )
}

/// Safe zones of one zone with an otherwise default optimizer.
pub fn optimize_zone(user_zone: Rect, regions: &[ProtectedRegion], margin: u32) -> Conversion<Vec<SafeZone>> {
    match SafeZoneOptimizer::builder().margin(margin).build() {
        Ok(optimizer) => optimizer.optimize(user_zone, regions),
        Err(_) => Conversion::Invalid,
    }
}

#[cfg(all(test, feature = "polygon"))]
mod tests {
    use super::*;

    fn region(bbox: (i32, i32, i32, i32)) -> ProtectedRegion {
        ProtectedRegion::new(bbox, "plain_text", 0.9)
    }

    fn optimizer(margin: u32, min_area: f64) -> SafeZoneOptimizer {
        SafeZoneOptimizer::builder()
            .margin(margin)
            .min_area(min_area)
            .with_bridge(GeometryBridge::with_components(
                crate::algorithms::ImageprocRasterizer,
                crate::algorithms::ImageprocContourTracer,
                Some(Box::new(crate::algorithms::SplitLoopRepair)),
            ))
            .build()
            .unwrap()
    }

    fn areas(zones: &[SafeZone]) -> Vec<f64> {
        let mut areas: Vec<f64> = zones.iter().map(SafeZone::area).collect();
        areas.sort_by(f64::total_cmp);
        areas
    }

    #[test]
    fn test_untouched_zone_is_kept_whole() {
        let zone = Rect::new(10, 10, 110, 60);
        let safe = optimizer(5, 100.0)
            .optimize(zone, &[region((300, 300, 400, 400))])
            .ok()
            .unwrap();
        assert_eq!(safe.len(), 1);
        assert_eq!(safe[0].coverage, 1.0);
        assert_eq!(safe[0].bbox(), zone);
        assert_eq!(safe[0].original_zone, zone);
    }

    #[test]
    fn test_empty_zone_has_no_safe_zone() {
        let safe = optimizer(5, 100.0)
            .optimize(Rect::new(10, 10, 10, 50), &[region((0, 0, 20, 20))])
            .ok()
            .unwrap();
        assert!(safe.is_empty());
    }

    #[test]
    fn test_margin_is_subtracted() {
        let zone = Rect::new(10, 10, 110, 110);
        let safe = optimizer(5, 100.0)
            .optimize(zone, &[region((0, 0, 50, 120))])
            .ok()
            .unwrap();
        assert_eq!(safe.len(), 1);
        assert_eq!(safe[0].bbox(), Rect::new(55, 10, 110, 110));
        assert_eq!(safe[0].area(), 5500.0);
        assert!((safe[0].coverage - 0.55).abs() < 1e-9);
    }

    #[test]
    fn test_inner_region_becomes_hole() {
        let zone = Rect::new(10, 10, 110, 110);
        let safe = optimizer(0, 100.0)
            .optimize(zone, &[region((50, 50, 70, 70))])
            .ok()
            .unwrap();
        assert_eq!(safe.len(), 1);
        assert_eq!(safe[0].polygon.holes.len(), 1);
        assert_eq!(safe[0].area(), 9600.0);
    }

    #[test]
    fn test_region_splits_zone() {
        let zone = Rect::new(10, 10, 110, 110);
        let safe = optimizer(0, 100.0)
            .optimize(zone, &[region((50, 0, 70, 120))])
            .ok()
            .unwrap();
        assert_eq!(areas(&safe), vec![4000.0, 4000.0]);
    }

    #[test]
    fn test_small_pieces_are_dropped() {
        let zone = Rect::new(10, 10, 110, 110);
        let regions = [region((0, 0, 100, 120))];
        assert_eq!(areas(&optimizer(0, 100.0).optimize(zone, &regions).ok().unwrap()), vec![1000.0]);
        assert!(optimizer(0, 1500.0).optimize(zone, &regions).ok().unwrap().is_empty());
    }

    #[test]
    fn test_optimize_multiple() {
        let zones = [Rect::new(10, 10, 110, 110), Rect::new(500, 500, 600, 600)];
        let results = optimizer(0, 100.0)
            .optimize_multiple(&zones, &[region((50, 0, 70, 120))])
            .ok()
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].len(), 2);
        assert_eq!(results[1][0].coverage, 1.0);
    }

    #[test]
    fn test_unavailable_without_backend() {
        let optimizer = SafeZoneOptimizer::builder()
            .with_bridge(GeometryBridge::without_polygon_backend())
            .build()
            .unwrap();
        let result = optimizer.optimize(Rect::new(0, 0, 10, 10), &[]);
        assert!(result.is_unavailable());
    }

    #[test]
    fn test_safe_zone_raster_forms() {
        let zone = Rect::new(2, 2, 11, 11);
        let safe = optimizer(0, 0.0).optimize(zone, &[]).ok().unwrap();
        let mask = safe[0].to_mask(GeometryBridge::global(), 20, 20);
        assert_eq!(mask.pixels().filter(|p| p[0] == 255).count(), 100);
        assert_eq!(safe[0].to_contour(GeometryBridge::global()).len(), 4);
        assert_eq!(safe[0].vertices().len(), 4);
    }

    #[test]
    fn test_config_schema_and_defaults() {
        let config: SafeZoneConfig = serde_json::from_str(r#"{"margin": 8}"#).unwrap();
        assert_eq!(config.margin, 8);
        assert_eq!(config.min_area, 100.0);

        let schema = serde_json::to_value(SafeZoneConfig::schema()).unwrap();
        assert!(schema["properties"]["simplify_tolerance"].is_object());
    }

    #[test]
    fn test_thin_strips_survive_simplification() {
        let zone = Rect::new(0, 0, 100, 100);
        let regions = [region((0, 2, 100, 98))];

        let safe = optimizer(0, 100.0).optimize(zone, &regions).ok().unwrap();
        assert_eq!(areas(&safe), vec![200.0, 200.0]);
        assert!(safe.iter().all(|zone| (zone.coverage - 0.02).abs() < 1e-9));

        let safe = optimizer(0, 150.0).optimize(zone, &regions).ok().unwrap();
        assert_eq!(safe.len(), 2);
    }

    #[test]
    fn test_simplify_still_drops_small_detail() {
        // a 1px notch disappears, the ring keeps its four corners
        let ring = geo_types::LineString::from(vec![
            (0.0, 0.0), (50.0, 0.0), (50.0, 1.0), (51.0, 1.0), (51.0, 0.0),
            (100.0, 0.0), (100.0, 20.0), (0.0, 20.0), (0.0, 0.0),
        ]);
        let polygon = geo_types::Polygon::new(ring, vec![]);
        let simplified = simplify_preserving_rings(&polygon, 2.0);
        assert_eq!(simplified.exterior().0.len(), 5);
    }

    #[test]
    fn test_safe_zone_rasters_through_given_bridge() {
        struct BlankRasterizer;

        impl crate::traits::RingRasterizer for BlankRasterizer {
            fn fill_ring(&self, _mask: &mut Mask, _ring: &[Vertex], _value: u8) {}
        }

        let optimizer = SafeZoneOptimizer::builder()
            .min_area(0.0)
            .with_bridge(GeometryBridge::with_components(
                BlankRasterizer,
                crate::algorithms::ImageprocContourTracer,
                Some(Box::new(crate::algorithms::SplitLoopRepair)),
            ))
            .build()
            .unwrap();
        let safe = optimizer.optimize(Rect::new(2, 2, 11, 11), &[]).ok().unwrap();

        let mask = safe[0].to_mask(optimizer.bridge(), 20, 20);
        assert!(mask.pixels().all(|p| p[0] == 0));
        assert_eq!(safe[0].to_contour(optimizer.bridge()).len(), 4);
    }
}
