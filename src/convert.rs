/// Polygon to mask + YOLO box conversion
///
/// Each polygon whose label is in the catalog yields one mask and one
/// normalized box. The mask and the box are computed independently from the
/// same points, so either can be used on its own.
use std::collections::HashMap;

use image::GrayImage;
use log::debug;

use crate::catalog::LabelCatalog;
use crate::errors::{LabelError, Result};
use crate::geometry::{bounding_box_from_points, NormalizedBox};
use crate::labelme::Polygon;
use crate::mask::rasterize_polygon;

/// Output for one polygon instance
#[derive(Debug, Clone)]
pub struct InstanceMask {
    pub label: String,
    pub mask: GrayImage,
    pub bbox: NormalizedBox,
}

/// Binary mask of `polygon` on a `width` x `height` image.
pub fn polygon_mask(polygon: &Polygon, width: u32, height: u32) -> GrayImage {
    rasterize_polygon(&polygon.points, width, height)
}

/// YOLO box around `polygon`, normalized to the full image size.
/// `None` if the polygon has no points.
pub fn polygon_box(polygon: &Polygon, class_id: u32, width: u32, height: u32) -> Option<NormalizedBox> {
    bounding_box_from_points(&polygon.points).map(|bounds| bounds.normalized(class_id, width, height))
}

/// Convert every catalogued polygon of one image, in source order.
///
/// Polygons with labels outside the catalog are skipped. A catalogued
/// polygon without points is a malformed annotation for the whole image.
pub fn convert_polygons(
    polygons: &[Polygon],
    catalog: &LabelCatalog,
    width: u32,
    height: u32,
    origin: &str,
) -> Result<Vec<InstanceMask>> {
    let mut instances = Vec::new();

    for (idx, polygon) in polygons.iter().enumerate() {
        let Some(class_id) = catalog.class_id(&polygon.label) else {
            debug!("{}: skipping shape #{} with unlisted label '{}'", origin, idx, polygon.label);
            continue;
        };

        let bbox = polygon_box(polygon, class_id, width, height).ok_or_else(|| {
            LabelError::malformed(origin, None, format!("shape #{} ('{}') has no points", idx, polygon.label))
        })?;

        instances.push(InstanceMask {
            label: polygon.label.clone(),
            mask: polygon_mask(polygon, width, height),
            bbox,
        });
    }

    Ok(instances)
}

/// File names for the masks of one image: `<stem>_<label>.png`, then
/// `<stem>_<label>_1.png`, `<stem>_<label>_2.png`, ... for repeated labels.
pub fn mask_file_names(stem: &str, instances: &[InstanceMask]) -> Vec<String> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    instances
        .iter()
        .map(|instance| {
            let count = seen.entry(instance.label.as_str()).or_insert(0);
            let name = if *count == 0 {
                format!("{}_{}.png", stem, instance.label)
            } else {
                format!("{}_{}_{}.png", stem, instance.label, count)
            };
            *count += 1;
            name
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::MASK_ON;

    fn polygon(label: &str, points: &[(i32, i32)]) -> Polygon {
        Polygon {
            label: label.to_string(),
            points: points.to_vec(),
        }
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn test_square_instance() {
        let catalog = LabelCatalog::new(["human", "dog", "cat"]).unwrap();
        let shapes = vec![polygon("cat", &[(10, 10), (10, 50), (50, 50), (50, 10)])];

        let out = convert_polygons(&shapes, &catalog, 100, 100, "img.json").unwrap();
        assert_eq!(out.len(), 1);
        let bbox = out[0].bbox;
        assert_eq!(bbox.class_id, 2);
        assert_close(bbox.cx, 0.3);
        assert_close(bbox.cy, 0.3);
        assert_close(bbox.w, 0.4);
        assert_close(bbox.h, 0.4);

        let mask = &out[0].mask;
        assert_eq!(mask.get_pixel(30, 30).0[0], MASK_ON);
        assert_eq!(mask.get_pixel(10, 50).0[0], MASK_ON);
        assert_eq!(mask.get_pixel(51, 30).0[0], 0);
    }

    #[test]
    fn test_unlisted_labels_are_skipped() {
        let catalog = LabelCatalog::new(["dog"]).unwrap();
        let dog = polygon("dog", &[(0, 0), (20, 0), (20, 20)]);
        let tree = polygon("tree", &[(30, 30), (40, 30), (40, 40)]);

        let alone = convert_polygons(&[dog.clone()], &catalog, 64, 64, "a").unwrap();
        let mixed = convert_polygons(&[tree.clone(), dog, tree], &catalog, 64, 64, "a").unwrap();

        assert_eq!(mixed.len(), 1);
        assert_eq!(mixed[0].bbox, alone[0].bbox);
        assert_eq!(mixed[0].mask, alone[0].mask);
    }

    #[test]
    fn test_repeated_labels_stay_separate() {
        let catalog = LabelCatalog::new(["dog"]).unwrap();
        let shapes = vec![
            polygon("dog", &[(0, 0), (10, 0), (10, 10)]),
            polygon("dog", &[(20, 20), (30, 20), (30, 30)]),
        ];
        let out = convert_polygons(&shapes, &catalog, 40, 40, "a").unwrap();
        assert_eq!(out.len(), 2);
        assert_ne!(out[0].mask, out[1].mask);
        assert!(out[0].bbox.cx < out[1].bbox.cx);

        let names = mask_file_names("img_001", &out);
        assert_eq!(names, vec!["img_001_dog.png", "img_001_dog_1.png"]);
    }

    #[test]
    fn test_empty_polygon_is_malformed() {
        let catalog = LabelCatalog::new(["dog"]).unwrap();
        let err = convert_polygons(&[polygon("dog", &[])], &catalog, 10, 10, "a.json").unwrap_err();
        assert!(matches!(err, LabelError::MalformedAnnotation { .. }));

        // Unlisted empty shapes never reach the geometry
        let catalog = LabelCatalog::new(["cat"]).unwrap();
        assert!(convert_polygons(&[polygon("dog", &[])], &catalog, 10, 10, "a.json").unwrap().is_empty());
    }

    #[test]
    fn test_far_away_points_convert() {
        let json = r#"{"shapes": [{"label": "dog", "points": [[-3e9, 5], [3e9, 5], [10, 20]]}]}"#;
        let doc = crate::labelme::LabelMeDocument::from_str(json, std::path::Path::new("far.json")).unwrap();
        let catalog = LabelCatalog::new(["dog"]).unwrap();

        let out = convert_polygons(&doc.polygons(), &catalog, 64, 64, "far.json").unwrap();
        assert_eq!(out.len(), 1);
        assert!(out[0].bbox.w > 1.0);
        assert_close(out[0].bbox.h, 15.0 / 64.0);
        assert_eq!(out[0].mask.get_pixel(0, 5).0[0], MASK_ON);
        assert_eq!(out[0].mask.get_pixel(63, 5).0[0], MASK_ON);
    }

    #[test]
    fn test_degenerate_polygon_is_not_an_error() {
        let catalog = LabelCatalog::new(["dog"]).unwrap();
        let out = convert_polygons(&[polygon("dog", &[(5, 5), (5, 5), (5, 5)])], &catalog, 10, 10, "a").unwrap();
        assert_eq!(out[0].bbox.w, 0.0);
        assert_eq!(out[0].bbox.h, 0.0);
        assert_close(out[0].bbox.cx, 0.5);
    }
}
