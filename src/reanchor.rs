/// Re-anchoring of YOLO boxes to a cropped region of interest
///
/// A box survives iff its center lands inside the ROI. Surviving boxes are
/// re-expressed relative to the ROI size; their width and height are not
/// clamped, so a box near the ROI border may report `w` or `h` beyond what
/// fits in the crop.
use log::debug;

use crate::geometry::{normalize, NormalizedBox};
use crate::roi::Roi;

/// Re-anchor a single box. `None` when its center falls outside `roi`.
pub fn reanchor_box(nbox: &NormalizedBox, roi: &Roi, width: u32, height: u32) -> Option<NormalizedBox> {
    let abs = nbox.to_absolute(width, height);

    let roi_width = roi.width() as f64;
    let roi_height = roi.height() as f64;

    let local_cx = abs.cx - roi.x_min() as f64;
    let local_cy = abs.cy - roi.y_min() as f64;

    let cx = normalize(local_cx, roi_width);
    let cy = normalize(local_cy, roi_height);

    if !((0.0..=1.0).contains(&cx) && (0.0..=1.0).contains(&cy)) {
        return None;
    }

    Some(NormalizedBox {
        class_id: nbox.class_id,
        cx,
        cy,
        w: normalize(abs.w, roi_width),
        h: normalize(abs.h, roi_height),
    })
}

/// Re-anchor every box of one image, keeping input order.
pub fn reanchor_boxes(boxes: &[NormalizedBox], roi: &Roi, width: u32, height: u32) -> Vec<NormalizedBox> {
    let kept: Vec<NormalizedBox> = boxes
        .iter()
        .filter_map(|nbox| reanchor_box(nbox, roi, width, height))
        .collect();

    if kept.len() < boxes.len() {
        debug!(
            "Dropped {} of {} box(es) centered outside ROI {}",
            boxes.len() - kept.len(),
            boxes.len(),
            roi
        );
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-6, "{a} != {b}");
    }

    #[test]
    fn test_box_inside_roi() {
        let roi = Roi::new(400, 300, 700, 600).unwrap();
        let boxes = vec![NormalizedBox::new(0, 0.5, 0.5, 0.1, 0.1)];

        let out = reanchor_boxes(&boxes, &roi, 1000, 800);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].class_id, 0);
        assert_close(out[0].cx, 0.333333);
        assert_close(out[0].cy, 0.333333);
        assert_close(out[0].w, 0.333333);
        assert_close(out[0].h, 0.266667);
    }

    #[test]
    fn test_box_outside_roi_is_dropped() {
        let roi = Roi::new(400, 300, 700, 600).unwrap();
        // center at (100, 100) px
        let boxes = vec![NormalizedBox::new(0, 0.1, 0.125, 0.1, 0.1)];
        assert!(reanchor_boxes(&boxes, &roi, 1000, 800).is_empty());
    }

    #[test]
    fn test_full_image_roi_is_identity() {
        let roi = Roi::full(640, 480).unwrap();
        let boxes = vec![
            NormalizedBox::new(0, 0.5, 0.5, 0.1, 0.1),
            NormalizedBox::new(1, 0.0, 1.0, 0.3, 0.7),
            NormalizedBox::new(7, 0.123456, 0.654321, 0.05, 0.9),
        ];
        let out = reanchor_boxes(&boxes, &roi, 640, 480);
        assert_eq!(out.len(), boxes.len());
        for (a, b) in out.iter().zip(&boxes) {
            assert_eq!(a.class_id, b.class_id);
            assert_close(a.cx, b.cx);
            assert_close(a.cy, b.cy);
            assert_close(a.w, b.w);
            assert_close(a.h, b.h);
        }
    }

    #[test]
    fn test_inclusion_follows_absolute_center() {
        let roi = Roi::new(100, 50, 300, 250).unwrap();
        let (width, height) = (400u32, 400u32);

        // Sweep centers across the image on a 10 px grid
        for ix in 0..=40 {
            for iy in 0..=40 {
                let (px, py) = (ix as f64 * 10.0, iy as f64 * 10.0);
                let nbox = NormalizedBox::new(1, px / width as f64, py / height as f64, 0.05, 0.05);
                let inside = (100.0..=300.0).contains(&px) && (50.0..=250.0).contains(&py);
                assert_eq!(
                    reanchor_box(&nbox, &roi, width, height).is_some(),
                    inside,
                    "center ({px}, {py})"
                );
            }
        }
    }

    #[test]
    fn test_size_is_not_clamped() {
        let roi = Roi::new(0, 0, 100, 100).unwrap();
        // 400 px wide box centered at the ROI edge
        let nbox = NormalizedBox::new(5, 0.25, 0.25, 1.0, 0.5);
        let out = reanchor_box(&nbox, &roi, 400, 400).unwrap();
        assert_close(out.cx, 1.0);
        assert_close(out.w, 4.0);
        assert_close(out.h, 2.0);
    }

    #[test]
    fn test_order_is_preserved() {
        let roi = Roi::new(0, 0, 50, 50).unwrap();
        let boxes = vec![
            NormalizedBox::new(3, 0.1, 0.1, 0.1, 0.1),
            NormalizedBox::new(9, 0.9, 0.9, 0.1, 0.1),
            NormalizedBox::new(4, 0.2, 0.2, 0.1, 0.1),
        ];
        let ids: Vec<u32> = reanchor_boxes(&boxes, &roi, 100, 100)
            .iter()
            .map(|b| b.class_id)
            .collect();
        assert_eq!(ids, vec![3, 4]);
    }
}
