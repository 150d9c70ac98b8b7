//! Walks a synthetic page through the zone geometry toolkit: rectangle
//! algebra, mask round trips, overlap suppression and safe zones.
//!
//! Set `RUST_LOG=zone_geometry=debug` to see the library's own events.

use color_eyre::eyre::{eyre, Result};
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};
use zone_geometry::{
    filter_by_confidence, filter_by_labels, parse_regions, rect, suppress_overlaps, Conversion,
    GeometryBridge, OverlapMetric, Rect, SafeZoneOptimizer, DEFAULT_FILL_VALUE,
    DEFAULT_PROTECTED_LABELS, DEFAULT_THRESHOLD,
};

const PAGE_WIDTH: u32 = 600;
const PAGE_HEIGHT: u32 = 800;

const DETECTIONS: &str = r#"[
    {"bbox": [40, 30, 560, 90], "label": "title", "confidence": 0.97},
    {"bbox": [40, 120, 560, 360], "label": "plain_text", "confidence": 0.91},
    {"bbox": [45, 125, 555, 355], "label": "plain_text", "confidence": 0.62},
    {"bbox": [60, 420, 300, 700], "label": "figure", "confidence": 0.88},
    {"bbox": [320, 420, 560, 640], "label": "table", "confidence": 0.84},
    {"bbox": [500, 740, 560, 780], "label": "abandon", "confidence": 0.31}
]"#;

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .finish()
        .init();

    let bridge = GeometryBridge::new();
    tracing::info!(polygon_backend = bridge.is_polygon_backend_available(), "starting zone demo");

    rect_algebra();
    mask_round_trip(&bridge)?;

    let regions = parse_regions(DETECTIONS)?;
    let regions = filter_by_confidence(&regions, 0.5);
    let regions = filter_by_labels(&regions, DEFAULT_PROTECTED_LABELS);
    let regions = suppress_overlaps(&regions, OverlapMetric::Iou, 0.5);
    for region in &regions {
        tracing::info!(label = %region.label, bbox = ?region.bbox, confidence = region.confidence, "protected region");
    }

    let optimizer = SafeZoneOptimizer::builder().margin(8).build()?;
    let user_zone = Rect::new(20, 100, 580, 720);
    match optimizer.optimize(user_zone, &regions) {
        Conversion::Converted(zones) => {
            for zone in zones {
                tracing::info!(
                    bbox = ?zone.bbox(),
                    area = zone.area(),
                    coverage = %format!("{:.1}%", zone.coverage * 100.0),
                    holes = zone.polygon.holes.len(),
                    "safe zone"
                );
            }
        }
        Conversion::Unavailable => tracing::warn!("polygon backend unavailable, no safe zones computed"),
        Conversion::Invalid => tracing::warn!(?user_zone, "zone produced no usable geometry"),
    }

    tracing::info!("zone demo finished");
    Ok(())
}

fn rect_algebra() {
    let a = Rect::new(0, 0, 100, 100);
    let b = Rect::new(50, 50, 150, 150);

    tracing::info!(
        area = rect::area(a),
        intersection = rect::intersection_area(a, b),
        iou = rect::iou(a, b),
        overlap_ratio = rect::overlap_ratio(a, b),
        merged = ?rect::merge_rects(&[a, b]),
        clipped = ?rect::clip_rect_to_bounds(rect::expand_rect(b, 80, None, None), 200, 200),
        "rectangle algebra"
    );
}

fn mask_round_trip(bridge: &GeometryBridge) -> Result<()> {
    let zone = Rect::new(100, 150, 400, 500);
    let polygon = match bridge.rect_to_polygon(zone) {
        Conversion::Converted(polygon) => polygon,
        Conversion::Unavailable => {
            tracing::warn!("skipping mask round trip without polygon backend");
            return Ok(());
        }
        Conversion::Invalid => return Err(eyre!("{zone:?} has no polygon")),
    };

    let mask = bridge.polygon_to_mask(Some(&polygon), PAGE_WIDTH, PAGE_HEIGHT, DEFAULT_FILL_VALUE);
    let filled = mask.pixels().filter(|p| p[0] == DEFAULT_FILL_VALUE).count();
    let traced = bridge
        .mask_to_polygon(&mask, DEFAULT_THRESHOLD)
        .ok()
        .ok_or_else(|| eyre!("mask of {zone:?} did not trace back to a polygon"))?;

    tracing::info!(
        filled,
        traced_bbox = ?traced.bounding_rect(),
        contour_points = bridge.polygon_to_contour(Some(&traced)).len(),
        "mask round trip"
    );
    Ok(())
}
