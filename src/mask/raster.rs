//! Exclusively-owned 8-bit mask buffer.

use crate::error::ViewError;
use crate::geometry::SurfacePoint;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, GrayImage, ImageEncoder, Luma};

/// Value of pixels the backend should repaint.
pub const PAINT: u8 = 255;
/// Value of pixels the backend must keep.
pub const PRESERVE: u8 = 0;

/// Axis-aligned pixel region of a raster, in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    /// Smallest rectangle covering both.
    pub fn union(self, other: PixelRect) -> PixelRect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = (self.x + self.width).max(other.x + other.width);
        let bottom = (self.y + self.height).max(other.y + other.height);
        PixelRect {
            x,
            y,
            width: right - x,
            height: bottom - y,
        }
    }
}

/// The persistent raster behind the mask surface. Strokes are rasterized
/// immediately; no vector history is kept.
#[derive(Debug, Clone)]
pub struct MaskRaster {
    pixels: GrayImage,
}

impl MaskRaster {
    /// A raster of the given size, entirely in the preserve color.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: GrayImage::from_pixel(width, height, Luma([PRESERVE])),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn value_at(&self, x: u32, y: u32) -> Option<u8> {
        (x < self.width() && y < self.height()).then(|| self.pixels.get_pixel(x, y)[0])
    }

    pub fn is_painted(&self, x: u32, y: u32) -> bool {
        self.value_at(x, y) == Some(PAINT)
    }

    pub fn painted_count(&self) -> usize {
        self.pixels.as_raw().iter().filter(|&&v| v == PAINT).count()
    }

    pub fn as_gray(&self) -> &GrayImage {
        &self.pixels
    }

    /// Stroke a polyline with round caps and joins.
    ///
    /// A single-point path strokes nothing; a repeated point paints a dot.
    pub fn paint_stroke(&mut self, path: &[SurfacePoint], width: f32) {
        for pair in path.windows(2) {
            let _ = self.paint_segment(pair[0], pair[1], width);
        }
    }

    /// Paint every pixel whose center lies within `width / 2` of the segment.
    ///
    /// Returns the clipped region that was scanned, if any.
    pub fn paint_segment(
        &mut self,
        from: SurfacePoint,
        to: SurfacePoint,
        width: f32,
    ) -> Option<PixelRect> {
        if !(width > 0.0) || self.width() == 0 || self.height() == 0 {
            return None;
        }
        let radius = width / 2.0;

        let min_x = (from.x.min(to.x) - radius).floor().max(0.0);
        let min_y = (from.y.min(to.y) - radius).floor().max(0.0);
        let max_x = (from.x.max(to.x) + radius).ceil().min(self.width() as f32 - 1.0);
        let max_y = (from.y.max(to.y) + radius).ceil().min(self.height() as f32 - 1.0);
        if max_x < min_x || max_y < min_y {
            return None;
        }

        for py in min_y as u32..=max_y as u32 {
            for px in min_x as u32..=max_x as u32 {
                let center = SurfacePoint::new(px as f32 + 0.5, py as f32 + 0.5);
                if distance_to_segment(center, from, to) <= radius {
                    self.pixels.put_pixel(px, py, Luma([PAINT]));
                }
            }
        }
        Some(PixelRect {
            x: min_x as u32,
            y: min_y as u32,
            width: max_x as u32 - min_x as u32 + 1,
            height: max_y as u32 - min_y as u32 + 1,
        })
    }

    /// Encode the whole raster as an 8-bit grayscale PNG.
    pub fn serialize(&self) -> Result<Vec<u8>, ViewError> {
        let mut out = Vec::new();
        PngEncoder::new(&mut out).write_image(
            self.pixels.as_raw(),
            self.width(),
            self.height(),
            ExtendedColorType::L8,
        )?;
        Ok(out)
    }
}

fn distance_to_segment(p: SurfacePoint, a: SurfacePoint, b: SurfacePoint) -> f32 {
    let abx = b.x - a.x;
    let aby = b.y - a.y;
    let len2 = abx * abx + aby * aby;
    if len2 == 0.0 {
        return p.distance_to(a);
    }
    let t = (((p.x - a.x) * abx + (p.y - a.y) * aby) / len2).clamp(0.0, 1.0);
    p.distance_to(SurfacePoint::new(a.x + t * abx, a.y + t * aby))
}
