use zone_geometry::{
    mask_from_raw, Contour, GeometryBridge, Mask, Rect, ZoneError, ZonePolygon, DEFAULT_FILL_VALUE,
    DEFAULT_THRESHOLD,
};

fn foreground(mask: &Mask) -> Vec<bool> {
    mask.pixels().map(|p| p[0] > DEFAULT_THRESHOLD).collect()
}

fn mask_iou(a: &Mask, b: &Mask) -> f64 {
    let (a, b) = (foreground(a), foreground(b));
    let intersection = a.iter().zip(&b).filter(|(x, y)| **x && **y).count();
    let union = a.iter().zip(&b).filter(|(x, y)| **x || **y).count();
    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}

#[test]
fn test_mask_from_raw_checks_length() {
    let mask = mask_from_raw(4, 3, vec![0; 12]).unwrap();
    assert_eq!(mask.dimensions(), (4, 3));

    for len in [11, 13] {
        let err = mask_from_raw(4, 3, vec![0; len]).unwrap_err();
        assert!(matches!(err, ZoneError::MaskDimensions { expected: 12, .. }));
    }
}

#[test]
fn test_degraded_bridge_never_panics() {
    let bridge = GeometryBridge::without_polygon_backend();
    let polygon = ZonePolygon::new(vec![[2, 2], [8, 2], [8, 8], [2, 8]], vec![]);

    assert!(!bridge.is_polygon_backend_available());
    assert!(bridge.rect_to_polygon(Rect::new(0, 0, 10, 10)).is_unavailable());
    assert!(bridge.repair_polygon(polygon.clone()).is_unavailable());
    assert!(bridge.contour_to_polygon(&Contour::from(polygon.exterior.clone())).is_unavailable());

    // raster and contour paths keep working
    let mask = bridge.polygon_to_mask(Some(&polygon), 10, 10, DEFAULT_FILL_VALUE);
    assert_eq!(foreground(&mask).iter().filter(|&&on| on).count(), 49);
    assert!(bridge.mask_to_polygon(&mask, DEFAULT_THRESHOLD).is_unavailable());
    assert_eq!(bridge.polygon_to_contour(Some(&polygon)).points(), polygon.exterior.as_slice());
    assert!(bridge.polygon_to_contour(None).is_empty());
}

#[test]
fn test_mask_into_reuses_buffer() {
    let bridge = GeometryBridge::without_polygon_backend();
    let mut mask = Mask::from_pixel(10, 10, image::Luma([9]));

    bridge.polygon_to_mask_into(None, &mut mask, DEFAULT_FILL_VALUE);
    assert!(mask.pixels().all(|p| p[0] == 0));

    let polygon = ZonePolygon::new(vec![[0, 0], [4, 0], [4, 4], [0, 4]], vec![]);
    bridge.polygon_to_mask_into(Some(&polygon), &mut mask, 200);
    assert_eq!(mask.pixels().filter(|p| p[0] == 200).count(), 25);
}

#[cfg(feature = "polygon")]
mod with_backend {
    use super::*;
    use zone_geometry::algorithms::{ImageprocContourTracer, ImageprocRasterizer, SplitLoopRepair};

    fn bridge() -> GeometryBridge {
        GeometryBridge::with_components(
            ImageprocRasterizer,
            ImageprocContourTracer,
            Some(Box::new(SplitLoopRepair)),
        )
    }

    fn assert_round_trip(polygon: &ZonePolygon) {
        let bridge = bridge();
        let mask = bridge.polygon_to_mask(Some(polygon), 100, 100, DEFAULT_FILL_VALUE);
        let traced = bridge.mask_to_polygon(&mask, DEFAULT_THRESHOLD).ok().unwrap();
        let redrawn = bridge.polygon_to_mask(Some(&traced), 100, 100, DEFAULT_FILL_VALUE);

        let iou = mask_iou(&mask, &redrawn);
        assert!(iou >= 0.95, "round trip IoU {iou} for {polygon:?}");
    }

    #[test]
    fn test_rectangle_round_trip() {
        let polygon = bridge().rect_to_polygon(Rect::new(15, 25, 85, 70)).ok().unwrap();
        assert_round_trip(&polygon);
    }

    #[test]
    fn test_octagon_round_trip() {
        let octagon = ZonePolygon::new(
            vec![[30, 10], [70, 10], [90, 30], [90, 70], [70, 90], [30, 90], [10, 70], [10, 30]],
            vec![],
        );
        assert_round_trip(&octagon);
    }

    #[test]
    fn test_largest_blob_is_traced() {
        let bridge = bridge();
        let mut mask = Mask::new(100, 100);
        let small = ZonePolygon::new(vec![[5, 5], [15, 5], [15, 15], [5, 15]], vec![]);
        let large = ZonePolygon::new(vec![[40, 40], [90, 40], [90, 90], [40, 90]], vec![]);
        for polygon in [&small, &large] {
            let layer = bridge.polygon_to_mask(Some(polygon), 100, 100, DEFAULT_FILL_VALUE);
            for (dst, src) in mask.pixels_mut().zip(layer.pixels()) {
                dst[0] = dst[0].max(src[0]);
            }
        }

        let traced = bridge.mask_to_polygon(&mask, DEFAULT_THRESHOLD).ok().unwrap();
        assert_eq!(traced.bounding_rect(), Some(Rect::new(40, 40, 90, 90)));
    }

    #[test]
    fn test_equal_blobs_keep_first_in_raster_order() {
        let mut mask = Mask::new(60, 60);
        // drawn lower blob first; the upper one comes first in scan order
        for (x0, y0) in [(10u32, 30u32), (40, 5)] {
            for y in y0..y0 + 10 {
                for x in x0..x0 + 10 {
                    mask.put_pixel(x, y, image::Luma([255]));
                }
            }
        }

        let traced = bridge().mask_to_polygon(&mask, DEFAULT_THRESHOLD).ok().unwrap();
        assert_eq!(traced.bounding_rect(), Some(Rect::new(40, 5, 49, 14)));
    }

    #[test]
    fn test_empty_mask_is_invalid() {
        assert!(bridge().mask_to_polygon(&Mask::new(20, 20), DEFAULT_THRESHOLD).is_invalid());
    }

    #[test]
    fn test_contour_round_trip() {
        let bridge = bridge();
        let polygon = ZonePolygon::new(vec![[0, 0], [30, 0], [30, 10], [10, 10], [10, 30], [0, 30]], vec![]);

        let contour = bridge.polygon_to_contour(Some(&polygon));
        assert_eq!(contour.len(), 6);
        assert_eq!(bridge.contour_to_polygon(&contour).ok(), Some(polygon));
    }

    #[test]
    fn test_short_contour_is_invalid() {
        let contour = Contour::from(vec![[0, 0], [5, 5]]);
        assert!(bridge().contour_to_polygon(&contour).is_invalid());
    }

    #[test]
    fn test_self_intersecting_contour_is_repaired() {
        let bowtie = Contour::from(vec![[0, 0], [10, 10], [10, 0], [0, 10]]);
        let repaired = bridge().contour_to_polygon(&bowtie).ok().unwrap();
        assert_eq!(repaired.area(), 25.0);
    }
}
