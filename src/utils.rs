//! Conversions between decoded images and Slint images.

use image::RgbaImage;
use lumina::mask::{MaskRaster, PAINT, PixelRect};
use slint::{Rgba8Pixel, SharedPixelBuffer};

/// Create a placeholder checkerboard image for when nothing is loaded yet
pub fn placeholder_image() -> slint::Image {
    let width = 64u32;
    let height = 64u32;
    let mut buffer = SharedPixelBuffer::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let v = if (x / 8 + y / 8) % 2 == 0 { 20 } else { 34 };
            let i = ((y * width + x) * 3) as usize;
            let data = buffer.make_mut_bytes();
            data[i] = v;
            data[i + 1] = v;
            data[i + 2] = v;
        }
    }
    slint::Image::from_rgb8(buffer)
}

pub fn image_from_rgba(pixels: &RgbaImage) -> slint::Image {
    let buffer = SharedPixelBuffer::<Rgba8Pixel>::clone_from_slice(
        pixels.as_raw(),
        pixels.width(),
        pixels.height(),
    );
    slint::Image::from_rgba8(buffer)
}

const OVERLAY_PAINT: Rgba8Pixel = Rgba8Pixel {
    r: 255,
    g: 255,
    b: 255,
    a: 150,
};

/// Painted pixels as translucent white, everything else transparent.
pub fn mask_overlay_buffer(raster: &MaskRaster) -> SharedPixelBuffer<Rgba8Pixel> {
    let mut buffer = SharedPixelBuffer::<Rgba8Pixel>::new(raster.width(), raster.height());
    for (dst, &value) in buffer
        .make_mut_slice()
        .iter_mut()
        .zip(raster.as_gray().as_raw())
    {
        if value == PAINT {
            *dst = OVERLAY_PAINT;
        }
    }
    buffer
}

/// Copy one region of the raster into an overlay built by [`mask_overlay_buffer`].
pub fn update_overlay_region(
    buffer: &mut SharedPixelBuffer<Rgba8Pixel>,
    raster: &MaskRaster,
    region: PixelRect,
) {
    let width = buffer.width() as usize;
    let right = (region.x + region.width).min(raster.width());
    let bottom = (region.y + region.height).min(raster.height());
    let pixels = buffer.make_mut_slice();
    for y in region.y..bottom {
        for x in region.x..right {
            if raster.is_painted(x, y) {
                pixels[y as usize * width + x as usize] = OVERLAY_PAINT;
            }
        }
    }
}

/// Parse a hex color string (e.g., "#ff0000") to a Slint Color
pub fn parse_color(hex: &str) -> Option<slint::Color> {
    let hex = hex.trim_start_matches('#');
    if hex.len() == 6 {
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(slint::Color::from_rgb_u8(r, g, b))
    } else {
        None
    }
}
