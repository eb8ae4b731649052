//! Coordinate transforms shared by the re-anchoring and mask pipelines
//!
//! Boxes travel in two spaces: normalized (YOLO style, fractions of the image
//! size, center based) and absolute (pixels of the full image). Polygons are
//! always absolute integer pixels.

/// A box in YOLO form: center and size as fractions of the image extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedBox {
    pub class_id: u32,
    pub cx: f64,
    pub cy: f64,
    pub w: f64,
    pub h: f64,
}

/// Same box measured in pixels of the full image. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbsoluteBox {
    pub class_id: u32,
    pub cx: f64,
    pub cy: f64,
    pub w: f64,
    pub h: f64,
}

/// Axis-aligned extent of a point set, in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelBounds {
    pub x_min: i32,
    pub y_min: i32,
    pub width: i64,
    pub height: i64,
    pub center_x: f64,
    pub center_y: f64,
}

impl NormalizedBox {
    pub fn new(class_id: u32, cx: f64, cy: f64, w: f64, h: f64) -> Self {
        Self { class_id, cx, cy, w, h }
    }

    pub fn to_absolute(&self, width: u32, height: u32) -> AbsoluteBox {
        to_absolute(self, width, height)
    }
}

impl PixelBounds {
    /// Express these bounds as a YOLO box of an image of `width` x `height`
    pub fn normalized(&self, class_id: u32, width: u32, height: u32) -> NormalizedBox {
        let (w, h) = (width as f64, height as f64);
        NormalizedBox {
            class_id,
            cx: normalize(self.center_x, w),
            cy: normalize(self.center_y, h),
            w: normalize(self.width as f64, w),
            h: normalize(self.height as f64, h),
        }
    }
}

/// Scale a normalized box up to pixels of an image of `width` x `height`.
pub fn to_absolute(nbox: &NormalizedBox, width: u32, height: u32) -> AbsoluteBox {
    let (w, h) = (width as f64, height as f64);
    AbsoluteBox {
        class_id: nbox.class_id,
        cx: nbox.cx * w,
        cy: nbox.cy * h,
        w: nbox.w * w,
        h: nbox.h * h,
    }
}

/// Derive the axis-aligned bounds of `points`.
///
/// Returns `None` for an empty slice. A set of identical points gives a
/// zero-size box centered on that point.
pub fn bounding_box_from_points(points: &[(i32, i32)]) -> Option<PixelBounds> {
    let (&(x0, y0), rest) = points.split_first()?;

    let (x_min, x_max, y_min, y_max) = rest.iter().fold(
        (x0, x0, y0, y0),
        |(x_min, x_max, y_min, y_max), &(x, y)| {
            (x_min.min(x), x_max.max(x), y_min.min(y), y_max.max(y))
        },
    );

    // i64 so extents of saturated coordinates cannot overflow
    let width = x_max as i64 - x_min as i64;
    let height = y_max as i64 - y_min as i64;

    Some(PixelBounds {
        x_min,
        y_min,
        width,
        height,
        center_x: x_min as f64 + width as f64 / 2.0,
        center_y: y_min as f64 + height as f64 / 2.0,
    })
}

/// `value / extent`. The caller guarantees `extent > 0`.
pub fn normalize(value: f64, extent: f64) -> f64 {
    value / extent
}
