//! Mask Authoring Surface: freehand painting over the current result to mark
//! the region the inpainting backend should change.

mod raster;
mod surface;

pub use raster::{MaskRaster, PAINT, PRESERVE, PixelRect};
pub use surface::*;
