/// LabelMe JSON parser
///
/// Only the parts of the LabelMe document needed for mask generation are
/// modelled; unknown keys (`imageData`, `flags`, `version`, ...) are ignored.
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{LabelError, Result};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LabelMeDocument {
    pub shapes: Vec<LabelMeShape>,
    #[serde(rename = "imageWidth", default)]
    pub image_width: Option<u32>,
    #[serde(rename = "imageHeight", default)]
    pub image_height: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LabelMeShape {
    pub label: String,
    pub points: Vec<[f64; 2]>,
    #[serde(default = "default_shape_type")]
    pub shape_type: String,
}

fn default_shape_type() -> String {
    "polygon".to_string()
}

/// A labeled outline in integer pixel coordinates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polygon {
    pub label: String,
    pub points: Vec<(i32, i32)>,
}

impl LabelMeDocument {
    /// Parse a LabelMe document. `origin` names the source in errors.
    ///
    /// Invalid JSON is reported as [`LabelError::Json`]; valid JSON with the
    /// wrong structure (missing `label`, a point that is not a pair of
    /// numbers, ...) is a malformed annotation.
    pub fn from_str(content: &str, origin: &Path) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(content).map_err(|e| LabelError::Json {
            path: origin.to_path_buf(),
            source: e,
        })?;

        serde_json::from_value(value)
            .map_err(|e| LabelError::malformed(origin.display().to_string(), None, e.to_string()))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| LabelError::io(path, e))?;
        Self::from_str(&content, path)
    }

    /// All shapes as integer polygons, in document order
    pub fn polygons(&self) -> Vec<Polygon> {
        self.shapes.iter().map(LabelMeShape::to_polygon).collect()
    }
}

impl LabelMeShape {
    /// Truncate points toward zero. Two-point rectangles are expanded to
    /// their four corners so they rasterize as filled boxes.
    pub fn to_polygon(&self) -> Polygon {
        let mut points: Vec<(i32, i32)> = self
            .points
            .iter()
            .map(|&[x, y]| (x.trunc() as i32, y.trunc() as i32))
            .collect();

        if self.shape_type == "rectangle" && points.len() == 2 {
            let (x0, y0) = points[0];
            let (x1, y1) = points[1];
            points = vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1)];
        }

        Polygon {
            label: self.label.clone(),
            points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "version": "5.2.1",
        "flags": {},
        "shapes": [
            {
                "label": "dog",
                "points": [[10.9, 10.2], [10.0, 50.7], [50.5, 50.0], [50.0, 10.0]],
                "group_id": null,
                "shape_type": "polygon",
                "flags": {}
            },
            {
                "label": "cat",
                "points": [[1.5, 2.5], [8.9, 6.1]],
                "shape_type": "rectangle"
            }
        ],
        "imagePath": "img_001.jpg",
        "imageData": null,
        "imageHeight": 100,
        "imageWidth": 120
    }"#;

    #[test]
    fn test_parse_document() {
        let doc = LabelMeDocument::from_str(SAMPLE, Path::new("img_001.json")).unwrap();
        assert_eq!(doc.shapes.len(), 2);
        assert_eq!(doc.image_width, Some(120));
        assert_eq!(doc.image_height, Some(100));

        let polygons = doc.polygons();
        assert_eq!(polygons[0].label, "dog");
        assert_eq!(polygons[0].points, vec![(10, 10), (10, 50), (50, 50), (50, 10)]);
    }

    #[test]
    fn test_rectangle_expands_to_corners() {
        let doc = LabelMeDocument::from_str(SAMPLE, Path::new("img_001.json")).unwrap();
        let rect = &doc.polygons()[1];
        assert_eq!(rect.points, vec![(1, 2), (8, 2), (8, 6), (1, 6)]);
    }

    #[test]
    fn test_truncates_toward_zero() {
        let shape = LabelMeShape {
            label: "x".to_string(),
            points: vec![[-0.7, 3.99], [2.2, -1.5]],
            shape_type: "polygon".to_string(),
        };
        assert_eq!(shape.to_polygon().points, vec![(0, 3), (2, -1)]);
    }

    #[test]
    fn test_errors() {
        let path = Path::new("broken.json");

        let err = LabelMeDocument::from_str("{\"shapes\": [", path).unwrap_err();
        assert!(matches!(err, LabelError::Json { .. }));

        let bad_point = r#"{"shapes": [{"label": "dog", "points": [[1.0, 2.0, 3.0]]}]}"#;
        let err = LabelMeDocument::from_str(bad_point, path).unwrap_err();
        assert!(matches!(err, LabelError::MalformedAnnotation { .. }));

        let no_label = r#"{"shapes": [{"points": [[1.0, 2.0]]}]}"#;
        let err = LabelMeDocument::from_str(no_label, path).unwrap_err();
        assert!(matches!(err, LabelError::MalformedAnnotation { .. }));
    }
}
