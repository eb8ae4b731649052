/// Region of interest used to crop images and re-scope their labels
use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::errors::{LabelError, Result};

/// Pixel rectangle `[x_min, x_max) x [y_min, y_max)` of the source image.
///
/// Only constructible through [`Roi::new`], so a value of this type always
/// has a positive width and height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "[u32; 4]", into = "[u32; 4]")]
pub struct Roi {
    x_min: u32,
    y_min: u32,
    x_max: u32,
    y_max: u32,
}

impl Roi {
    pub fn new(x_min: u32, y_min: u32, x_max: u32, y_max: u32) -> Result<Self> {
        if x_min >= x_max || y_min >= y_max {
            return Err(LabelError::config(format!(
                "degenerate ROI ({x_min}, {y_min}, {x_max}, {y_max}): \
                 x_min must be < x_max and y_min must be < y_max"
            )));
        }
        Ok(Self { x_min, y_min, x_max, y_max })
    }

    /// ROI covering a whole `width` x `height` image
    pub fn full(width: u32, height: u32) -> Result<Self> {
        Self::new(0, 0, width, height)
    }

    pub fn x_min(&self) -> u32 {
        self.x_min
    }

    pub fn y_min(&self) -> u32 {
        self.y_min
    }

    pub fn x_max(&self) -> u32 {
        self.x_max
    }

    pub fn y_max(&self) -> u32 {
        self.y_max
    }

    pub fn width(&self) -> u32 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> u32 {
        self.y_max - self.y_min
    }

    /// Fail if this ROI does not fit inside a `width` x `height` image.
    pub fn check_within(&self, width: u32, height: u32) -> Result<()> {
        if self.x_max > width || self.y_max > height {
            return Err(LabelError::config(format!(
                "ROI ({}, {}, {}, {}) exceeds image bounds {}x{}",
                self.x_min, self.y_min, self.x_max, self.y_max, width, height
            )));
        }
        Ok(())
    }

    /// Cut the ROI out of `image`. Call [`Roi::check_within`] first; pixels
    /// outside the image are not padded.
    pub fn crop(&self, image: &DynamicImage) -> DynamicImage {
        image.crop_imm(self.x_min, self.y_min, self.width(), self.height())
    }
}

impl TryFrom<[u32; 4]> for Roi {
    type Error = LabelError;

    fn try_from(value: [u32; 4]) -> Result<Self> {
        let [x_min, y_min, x_max, y_max] = value;
        Self::new(x_min, y_min, x_max, y_max)
    }
}

impl From<Roi> for [u32; 4] {
    fn from(roi: Roi) -> Self {
        [roi.x_min, roi.y_min, roi.x_max, roi.y_max]
    }
}

impl std::fmt::Display for Roi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {}, {})", self.x_min, self.y_min, self.x_max, self.y_max)
    }
}
