use geo_types::{Coord, LineString, Polygon};
use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ZoneError};

/// Dense single-channel raster, `0` is background.
pub type Mask = GrayImage;

/// Integer pixel vertex `[x, y]`.
pub type Vertex = [i32; 2];

/// Axis-aligned rectangle in pixel space, stored as `(x1, y1, x2, y2)`.
///
/// Orientation (`x1 <= x2`, `y1 <= y2`) is expected but not enforced; every
/// operation in [`crate::rect`] treats inverted extents as zero-sized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct Rect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Rect {
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Signed width, negative for inverted rectangles.
    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    /// Signed height, negative for inverted rectangles.
    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }

    /// True when the rectangle encloses no area.
    pub fn is_empty(&self) -> bool {
        self.x2 <= self.x1 || self.y2 <= self.y1
    }

    pub fn to_tuple(self) -> (i32, i32, i32, i32) {
        (self.x1, self.y1, self.x2, self.y2)
    }
}

impl From<(i32, i32, i32, i32)> for Rect {
    fn from((x1, y1, x2, y2): (i32, i32, i32, i32)) -> Self {
        Self::new(x1, y1, x2, y2)
    }
}

impl From<[i32; 4]> for Rect {
    fn from([x1, y1, x2, y2]: [i32; 4]) -> Self {
        Self::new(x1, y1, x2, y2)
    }
}

impl From<Rect> for [i32; 4] {
    fn from(rect: Rect) -> Self {
        [rect.x1, rect.y1, rect.x2, rect.y2]
    }
}

/// Polygon with an exterior ring and optional holes, in pixel space.
///
/// Rings are kept open: the closing vertex is never repeated.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ZonePolygon {
    /// The exterior boundary of the shape
    pub exterior: Vec<Vertex>,
    /// Interior boundaries (holes within the shape)
    pub holes: Vec<Vec<Vertex>>,
}

impl ZonePolygon {
    /// Build a polygon from rings that may or may not repeat their first vertex.
    pub fn new(exterior: Vec<Vertex>, holes: Vec<Vec<Vertex>>) -> Self {
        Self {
            exterior: open_ring(exterior),
            holes: holes.into_iter().map(open_ring).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.exterior.is_empty()
    }

    pub fn has_holes(&self) -> bool {
        !self.holes.is_empty()
    }

    /// Enclosed area: exterior minus holes, never negative.
    pub fn area(&self) -> f64 {
        let holes: f64 = self.holes.iter().map(|hole| ring_area(hole)).sum();
        (ring_area(&self.exterior) - holes).max(0.0)
    }

    /// Bounding box of the exterior ring, `None` for an empty polygon.
    pub fn bounding_rect(&self) -> Option<Rect> {
        let first = self.exterior.first()?;
        let init = Rect::new(first[0], first[1], first[0], first[1]);
        Some(self.exterior.iter().fold(init, |acc, &[x, y]| Rect {
            x1: acc.x1.min(x),
            y1: acc.y1.min(y),
            x2: acc.x2.max(x),
            y2: acc.y2.max(y),
        }))
    }

    /// Convert to geo-types Polygon for geometric operations
    pub fn to_geo_polygon(&self) -> Polygon<f64> {
        let to_line_string = |ring: &[Vertex]| {
            LineString::new(
                ring.iter()
                    .map(|&[x, y]| Coord { x: x as f64, y: y as f64 })
                    .collect(),
            )
        };

        Polygon::new(
            to_line_string(&self.exterior),
            self.holes.iter().map(|hole| to_line_string(hole)).collect(),
        )
    }

    /// Convert from a geo-types Polygon, rounding to the pixel grid.
    pub fn from_geo_polygon(polygon: &Polygon<f64>) -> Self {
        let to_ring = |line: &LineString<f64>| {
            let mut ring: Vec<Vertex> = Vec::with_capacity(line.0.len());
            for coord in line.coords() {
                let vertex = [coord.x.round() as i32, coord.y.round() as i32];
                if ring.last() != Some(&vertex) {
                    ring.push(vertex);
                }
            }
            open_ring(ring)
        };

        Self {
            exterior: to_ring(polygon.exterior()),
            holes: polygon
                .interiors()
                .iter()
                .map(to_ring)
                .filter(|ring| !ring.is_empty())
                .collect(),
        }
    }
}

/// Ordered boundary points extracted from a mask, no closing duplicate.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Contour(pub Vec<Vertex>);

impl Contour {
    pub fn points(&self) -> &[Vertex] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Area enclosed by the point loop (shoelace).
    pub fn area(&self) -> f64 {
        ring_area(&self.0)
    }
}

impl From<Vec<Vertex>> for Contour {
    fn from(points: Vec<Vertex>) -> Self {
        Self(points)
    }
}

/// Outcome of a conversion that depends on the polygon backend.
///
/// `Unavailable` means the capability is missing in this process;
/// `Invalid` means the input carried no usable geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum Conversion<T> {
    Converted(T),
    Unavailable,
    Invalid,
}

impl<T> Conversion<T> {
    pub fn ok(self) -> Option<T> {
        match self {
            Self::Converted(value) => Some(value),
            Self::Unavailable | Self::Invalid => None,
        }
    }

    pub fn is_converted(&self) -> bool {
        matches!(self, Self::Converted(_))
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable)
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid)
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Conversion<U> {
        match self {
            Self::Converted(value) => Conversion::Converted(f(value)),
            Self::Unavailable => Conversion::Unavailable,
            Self::Invalid => Conversion::Invalid,
        }
    }

    /// `Invalid` when `value` is `None`.
    pub fn from_option(value: Option<T>) -> Self {
        value.map_or(Self::Invalid, Self::Converted)
    }
}

/// Wrap a caller-owned row-major buffer as a mask.
pub fn mask_from_raw(width: u32, height: u32, bytes: Vec<u8>) -> Result<Mask> {
    let expected = width as usize * height as usize;
    let actual = bytes.len();
    let mismatch = ZoneError::MaskDimensions {
        width,
        height,
        expected,
        actual,
    };
    // from_raw accepts oversized buffers
    if actual != expected {
        return Err(mismatch);
    }
    GrayImage::from_raw(width, height, bytes).ok_or(mismatch)
}

/// Collapse consecutive duplicates and drop a repeated closing vertex.
pub(crate) fn dedup_ring(ring: &[Vertex]) -> Vec<Vertex> {
    let mut deduped: Vec<Vertex> = Vec::with_capacity(ring.len());
    for &vertex in ring {
        if deduped.last() != Some(&vertex) {
            deduped.push(vertex);
        }
    }
    open_ring(deduped)
}

/// Drop a repeated closing vertex, if any.
pub(crate) fn open_ring(mut ring: Vec<Vertex>) -> Vec<Vertex> {
    if ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    ring
}

/// Unsigned shoelace area of an open ring.
pub(crate) fn ring_area(ring: &[Vertex]) -> f64 {
    signed_ring_area(ring).abs()
}

pub(crate) fn signed_ring_area(ring: &[Vertex]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let twice: i64 = ring
        .iter()
        .zip(ring.iter().cycle().skip(1))
        .map(|(a, b)| a[0] as i64 * b[1] as i64 - b[0] as i64 * a[1] as i64)
        .sum();
    twice as f64 / 2.0
}
