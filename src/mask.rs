/// Polygon rasterization into single-channel masks
///
/// Masks are `GrayImage`s the size of the source image with background 0
/// and foreground 255. A polygon covers its even-odd interior plus its
/// outline, so edge pixels are always part of the mask.
use image::{GrayImage, Luma};

pub const MASK_ON: u8 = 255;
pub const MASK_OFF: u8 = 0;

/// Drawing surface for one mask. Drawing never fails; call
/// [`MaskCanvas::finish`] to get the pixel buffer.
pub struct MaskCanvas {
    image: GrayImage,
}

impl MaskCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: GrayImage::from_pixel(width, height, Luma([MASK_OFF])),
        }
    }

    /// Fill the even-odd interior of a closed polygon and stroke its outline.
    pub fn draw_polygon(&mut self, points: &[(i32, i32)]) {
        if points.len() >= 3 {
            self.fill_interior(points);
        }
        self.stroke_outline(points);
    }

    pub fn finish(self) -> GrayImage {
        self.image
    }

    fn fill_interior(&mut self, points: &[(i32, i32)]) {
        let (w, h) = self.image.dimensions();
        if w == 0 || h == 0 {
            return;
        }

        let y_lo = points.iter().map(|p| p.1).min().unwrap_or(0).max(0);
        let y_hi = points.iter().map(|p| p.1).max().unwrap_or(0).min(h as i32 - 1);

        let mut crossings: Vec<f64> = Vec::with_capacity(points.len());
        for y in y_lo..=y_hi {
            let yf = y as f64;
            crossings.clear();

            for (i, &(x0, y0)) in points.iter().enumerate() {
                let (x1, y1) = points[(i + 1) % points.len()];
                if y0 == y1 {
                    continue; // horizontal edges are covered by the outline
                }
                let (top, bottom) = (y0.min(y1) as f64, y0.max(y1) as f64);
                // Half-open so a shared vertex is counted once
                if yf >= top && yf < bottom {
                    let t = (yf - y0 as f64) / (y1 as f64 - y0 as f64);
                    crossings.push(x0 as f64 + t * (x1 as f64 - x0 as f64));
                }
            }

            crossings.sort_by(|a, b| a.total_cmp(b));
            for span in crossings.chunks_exact(2) {
                let start = span[0].ceil().max(0.0);
                let end = span[1].floor().min(w as f64 - 1.0);
                if start > end {
                    continue;
                }
                for x in start as u32..=end as u32 {
                    self.image.put_pixel(x, y as u32, Luma([MASK_ON]));
                }
            }
        }
    }

    fn stroke_outline(&mut self, points: &[(i32, i32)]) {
        match points.len() {
            0 => {}
            1 => self.plot(points[0].0 as i64, points[0].1 as i64),
            n => {
                for i in 0..n {
                    self.draw_segment(points[i], points[(i + 1) % n]);
                }
            }
        }
    }

    fn draw_segment(&mut self, from: (i32, i32), to: (i32, i32)) {
        let Some(((x0, y0), (x1, y1))) = self.clip_segment(from, to) else {
            return;
        };

        // Bresenham
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);

        loop {
            self.plot(x, y);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Liang-Barsky clip of a segment against the canvas. Segments already
    /// inside are returned unchanged so their pixels stay exact.
    fn clip_segment(&self, from: (i32, i32), to: (i32, i32)) -> Option<((i64, i64), (i64, i64))> {
        let (w, h) = self.image.dimensions();
        if w == 0 || h == 0 {
            return None;
        }
        let inside = |(x, y): (i32, i32)| x >= 0 && y >= 0 && (x as i64) < w as i64 && (y as i64) < h as i64;
        if inside(from) && inside(to) {
            return Some(((from.0 as i64, from.1 as i64), (to.0 as i64, to.1 as i64)));
        }

        let (x0, y0) = (from.0 as f64, from.1 as f64);
        let (dx, dy) = (to.0 as f64 - x0, to.1 as f64 - y0);
        let (x_max, y_max) = ((w - 1) as f64, (h - 1) as f64);

        let mut t0 = 0.0f64;
        let mut t1 = 1.0f64;
        for (p, q) in [(-dx, x0), (dx, x_max - x0), (-dy, y0), (dy, y_max - y0)] {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                t0 = t0.max(r);
            } else {
                t1 = t1.min(r);
            }
            if t0 > t1 {
                return None;
            }
        }

        let start = ((x0 + t0 * dx).round() as i64, (y0 + t0 * dy).round() as i64);
        let end = ((x0 + t1 * dx).round() as i64, (y0 + t1 * dy).round() as i64);
        Some((start, end))
    }

    fn plot(&mut self, x: i64, y: i64) {
        let (w, h) = self.image.dimensions();
        if x >= 0 && y >= 0 && x < w as i64 && y < h as i64 {
            self.image.put_pixel(x as u32, y as u32, Luma([MASK_ON]));
        }
    }
}

/// Rasterize one polygon into a fresh `width` x `height` mask.
pub fn rasterize_polygon(points: &[(i32, i32)], width: u32, height: u32) -> GrayImage {
    let mut canvas = MaskCanvas::new(width, height);
    canvas.draw_polygon(points);
    canvas.finish()
}
