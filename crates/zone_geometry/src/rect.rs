//! Rectangle algebra over [`Rect`].
//!
//! Every function is total: inverted or zero-sized input yields zero areas,
//! zero ratios or degenerate rectangles, never an error.

use crate::types::Rect;

/// `max(0, w) * max(0, h)`, independent of position.
pub fn area(r: Rect) -> i64 {
    let width = (r.x2 as i64 - r.x1 as i64).max(0);
    let height = (r.y2 as i64 - r.y1 as i64).max(0);
    width * height
}

/// Integer midpoint, rounding toward negative infinity.
pub fn center(r: Rect) -> (i32, i32) {
    (
        (r.x1 as i64 + r.x2 as i64).div_euclid(2) as i32,
        (r.y1 as i64 + r.y2 as i64).div_euclid(2) as i32,
    )
}

/// Inclusive on all four edges.
pub fn point_in_rect((x, y): (i32, i32), r: Rect) -> bool {
    r.x1 <= x && x <= r.x2 && r.y1 <= y && y <= r.y2
}

/// Area shared by both rectangles; every overlap metric builds on this.
pub fn intersection_area(a: Rect, b: Rect) -> i64 {
    let ix1 = a.x1.max(b.x1);
    let iy1 = a.y1.max(b.y1);
    let ix2 = a.x2.min(b.x2);
    let iy2 = a.y2.min(b.y2);

    if ix1 >= ix2 || iy1 >= iy2 {
        return 0;
    }

    (ix2 as i64 - ix1 as i64) * (iy2 as i64 - iy1 as i64)
}

pub fn rects_intersect(a: Rect, b: Rect) -> bool {
    intersection_area(a, b) > 0
}

/// Fraction of the smaller rectangle covered by the other one.
///
/// Answers "is one zone (nearly) inside the other", unlike [`iou`].
pub fn overlap_ratio(a: Rect, b: Rect) -> f64 {
    let intersection = intersection_area(a, b);
    if intersection == 0 {
        return 0.0;
    }

    let min_area = area(a).min(area(b));
    if min_area == 0 {
        return 0.0;
    }

    intersection as f64 / min_area as f64
}

/// Intersection over union.
pub fn iou(a: Rect, b: Rect) -> f64 {
    let intersection = intersection_area(a, b);
    if intersection == 0 {
        return 0.0;
    }

    let union = area(a) + area(b) - intersection;
    if union <= 0 {
        return 0.0;
    }

    intersection as f64 / union as f64
}

/// Grow every side by `margin`.
///
/// The lower corner always clamps at 0; the upper corner clamps only when a
/// maximum is supplied.
pub fn expand_rect(r: Rect, margin: i32, max_width: Option<i32>, max_height: Option<i32>) -> Rect {
    let mut x2 = r.x2.saturating_add(margin);
    let mut y2 = r.y2.saturating_add(margin);

    if let Some(max_width) = max_width {
        x2 = x2.min(max_width);
    }
    if let Some(max_height) = max_height {
        y2 = y2.min(max_height);
    }

    Rect {
        x1: r.x1.saturating_sub(margin).max(0),
        y1: r.y1.saturating_sub(margin).max(0),
        x2,
        y2,
    }
}

/// Shrink every side by `margin`, collapsing to a point rather than inverting.
pub fn shrink_rect(r: Rect, margin: i32) -> Rect {
    let x1 = r.x1.saturating_add(margin);
    let y1 = r.y1.saturating_add(margin);

    Rect {
        x1,
        y1,
        x2: r.x2.saturating_sub(margin).max(x1),
        y2: r.y2.saturating_sub(margin).max(y1),
    }
}

/// Bounding box of all inputs; `(0, 0, 0, 0)` for an empty slice.
pub fn merge_rects(rects: &[Rect]) -> Rect {
    let Some((first, rest)) = rects.split_first() else {
        return Rect::default();
    };

    rest.iter().fold(*first, |acc, r| Rect {
        x1: acc.x1.min(r.x1),
        y1: acc.y1.min(r.y1),
        x2: acc.x2.max(r.x2),
        y2: acc.y2.max(r.y2),
    })
}

/// Clamp each coordinate independently into `[0, width] x [0, height]`.
///
/// The result can still be degenerate; check [`area`] when that matters.
pub fn clip_rect_to_bounds(r: Rect, width: i32, height: i32) -> Rect {
    let clamp_x = |v: i32| v.min(width).max(0);
    let clamp_y = |v: i32| v.min(height).max(0);

    Rect {
        x1: clamp_x(r.x1),
        y1: clamp_y(r.y1),
        x2: clamp_x(r.x2),
        y2: clamp_y(r.y2),
    }
}
