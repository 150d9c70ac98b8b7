//! Labeled rectangles coming from a layout detector, and the filters callers
//! run over them.
//!
//! Labels and confidences are opaque here: every helper passes them through
//! untouched.

use std::collections::HashSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr, VariantNames};

use crate::{
    bridge::GeometryBridge,
    error::Result,
    rect::{self, iou, overlap_ratio, point_in_rect, rects_intersect},
    types::{Conversion, Rect, ZonePolygon},
};

/// Layout labels protected from erasure unless the caller says otherwise.
pub const DEFAULT_PROTECTED_LABELS: &[&str] = &[
    "title",
    "plain_text",
    "table",
    "table_caption",
    "table_footnote",
    "figure_caption",
    "isolate_formula",
    "formula_caption",
];

/// A detected region that must not be touched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtectedRegion {
    /// `[x1, y1, x2, y2]` in page pixels
    pub bbox: Rect,
    pub label: String,
    pub confidence: f32,
}

impl ProtectedRegion {
    pub fn new(bbox: impl Into<Rect>, label: impl Into<String>, confidence: f32) -> Self {
        Self {
            bbox: bbox.into(),
            label: label.into(),
            confidence,
        }
    }

    pub fn width(&self) -> i32 {
        self.bbox.width()
    }

    pub fn height(&self) -> i32 {
        self.bbox.height()
    }

    pub fn area(&self) -> i64 {
        rect::area(self.bbox)
    }

    pub fn to_polygon(&self, bridge: &GeometryBridge) -> Conversion<ZonePolygon> {
        bridge.rect_to_polygon(self.bbox)
    }
}

/// Which overlap measure a filter compares against its threshold.
#[derive(
    Debug, Clone, Copy, Default,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
    PartialEq, Eq
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OverlapMetric {
    /// Intersection over union
    #[default]
    Iou,
    /// Intersection over the smaller area
    OverlapRatio,
}

impl OverlapMetric {
    pub fn measure(self, a: Rect, b: Rect) -> f64 {
        match self {
            Self::Iou => iou(a, b),
            Self::OverlapRatio => overlap_ratio(a, b),
        }
    }
}

/// Parse the detection service payload: a JSON array of regions.
pub fn parse_regions(json: &str) -> Result<Vec<ProtectedRegion>> {
    Ok(serde_json::from_str(json)?)
}

pub fn filter_by_confidence(regions: &[ProtectedRegion], min_confidence: f32) -> Vec<ProtectedRegion> {
    regions
        .iter()
        .filter(|region| region.confidence >= min_confidence)
        .cloned()
        .collect()
}

pub fn filter_by_labels<S: AsRef<str>>(regions: &[ProtectedRegion], labels: &[S]) -> Vec<ProtectedRegion> {
    let labels: HashSet<&str> = labels.iter().map(|label| label.as_ref()).collect();
    regions
        .iter()
        .filter(|region| labels.contains(region.label.as_str()))
        .cloned()
        .collect()
}

/// Regions sharing a positive area with `zone`.
pub fn regions_in_zone(zone: Rect, regions: &[ProtectedRegion]) -> Vec<ProtectedRegion> {
    regions
        .iter()
        .filter(|region| rects_intersect(zone, region.bbox))
        .cloned()
        .collect()
}

/// Regions whose box contains `point`, edges included.
pub fn regions_at_point(point: (i32, i32), regions: &[ProtectedRegion]) -> Vec<ProtectedRegion> {
    regions
        .iter()
        .filter(|region| point_in_rect(point, region.bbox))
        .cloned()
        .collect()
}

/// Class-aware non-maximum suppression.
///
/// Regions are visited by descending confidence (stable for equal scores). A
/// region is dropped when an already kept region with the same label reaches
/// `threshold` under `metric`.
pub fn suppress_overlaps(
    regions: &[ProtectedRegion],
    metric: OverlapMetric,
    threshold: f64,
) -> Vec<ProtectedRegion> {
    let mut ordered: Vec<&ProtectedRegion> = regions.iter().collect();
    ordered.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut kept: Vec<ProtectedRegion> = Vec::with_capacity(ordered.len());
    for candidate in ordered {
        let suppressed = kept.iter().any(|winner| {
            winner.label == candidate.label && metric.measure(winner.bbox, candidate.bbox) >= threshold
        });
        if !suppressed {
            kept.push(candidate.clone());
        }
    }

    tracing::trace!(input = regions.len(), kept = kept.len(), %metric, threshold, "suppressed overlaps");
    kept
}
