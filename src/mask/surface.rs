//! The modal painting session that produces an inpainting mask.

use super::raster::{MaskRaster, PixelRect};
use crate::error::ViewError;
use crate::geometry::{DisplayScale, SurfacePoint};
use crate::model::ImageRef;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Allowed brush widths, in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrushSettings {
    pub default_width: f32,
    pub min_width: f32,
    pub max_width: f32,
}

impl BrushSettings {
    pub fn clamp(&self, width: f32) -> f32 {
        if width.is_nan() {
            return self.default_width;
        }
        width.clamp(self.min_width, self.max_width)
    }
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            default_width: 20.0,
            min_width: 5.0,
            max_width: 50.0,
        }
    }
}

/// The serialized mask handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskArtifact {
    /// Grayscale PNG: white where painted, black elsewhere.
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PaintState {
    Idle,
    Painting { last: SurfacePoint },
}

#[derive(Debug)]
enum Phase {
    /// Waiting for the reference image's natural size.
    Loading,
    Ready {
        raster: MaskRaster,
        paint: PaintState,
        scale: DisplayScale,
        /// Pixels changed since the last [`MaskSurface::take_dirty`].
        dirty: Option<PixelRect>,
    },
    Closed,
}

#[derive(Debug)]
pub struct MaskSurface {
    image_src: ImageRef,
    brush: BrushSettings,
    brush_width: f32,
    phase: Phase,
}

impl MaskSurface {
    pub fn new(image_src: ImageRef, brush: BrushSettings) -> Self {
        Self {
            image_src,
            brush,
            brush_width: brush.clamp(brush.default_width),
            phase: Phase::Loading,
        }
    }

    pub fn image_src(&self) -> &ImageRef {
        &self.image_src
    }

    /// One-shot load notification. Sizes the surface to the image's natural
    /// dimensions and fills it with the preserve color. Later calls are ignored.
    pub fn image_loaded(&mut self, width: u32, height: u32) -> bool {
        if !matches!(self.phase, Phase::Loading) {
            return false;
        }
        info!(width, height, "mask surface initialized");
        self.phase = Phase::Ready {
            raster: MaskRaster::new(width, height),
            paint: PaintState::Idle,
            scale: DisplayScale::natural(width, height),
            dirty: None,
        };
        true
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.phase, Phase::Ready { .. })
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.phase, Phase::Closed)
    }

    /// Surface size in pixels, once initialized.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.raster().map(|r| (r.width(), r.height()))
    }

    pub fn raster(&self) -> Option<&MaskRaster> {
        match &self.phase {
            Phase::Ready { raster, .. } => Some(raster),
            _ => None,
        }
    }

    pub fn paint_state(&self) -> Option<PaintState> {
        match &self.phase {
            Phase::Ready { paint, .. } => Some(*paint),
            _ => None,
        }
    }

    /// Record how large the surface is drawn on screen, so pointer positions
    /// can be mapped back onto the natural pixel grid.
    pub fn set_display_size(&mut self, width: f32, height: f32) {
        if let Phase::Ready { raster, scale, .. } = &mut self.phase {
            *scale = DisplayScale::new(width, height, raster.width(), raster.height());
        }
    }

    pub fn brush_width(&self) -> f32 {
        self.brush_width
    }

    /// Applies to the next stroke segment; already painted pixels are untouched.
    pub fn set_brush_width(&mut self, width: f32) {
        self.brush_width = self.brush.clamp(width);
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        if let Phase::Ready { paint, scale, .. } = &mut self.phase {
            let last = scale.to_surface(x, y);
            *paint = PaintState::Painting { last };
        }
    }

    /// Extend the current stroke and commit the new segment to the raster.
    /// Returns `true` when pixels may have changed.
    pub fn pointer_move(&mut self, x: f32, y: f32) -> bool {
        let width = self.brush_width;
        let Phase::Ready {
            raster,
            paint,
            scale,
            dirty,
        } = &mut self.phase
        else {
            return false;
        };
        let PaintState::Painting { last } = *paint else {
            return false;
        };
        let next = scale.to_surface(x, y);
        if let Some(region) = raster.paint_segment(last, next, width) {
            *dirty = Some(dirty.map_or(region, |d| d.union(region)));
        }
        *paint = PaintState::Painting { last: next };
        true
    }

    /// Region painted since the previous call, for incremental redraws.
    pub fn take_dirty(&mut self) -> Option<PixelRect> {
        match &mut self.phase {
            Phase::Ready { dirty, .. } => dirty.take(),
            _ => None,
        }
    }

    pub fn pointer_up(&mut self) {
        if let Phase::Ready { paint, .. } = &mut self.phase {
            *paint = PaintState::Idle;
        }
    }

    /// Serialize the raster and close the session.
    ///
    /// The surface closes itself once the artifact is produced; the drawing
    /// state is discarded.
    pub fn validate(&mut self) -> Result<MaskArtifact, ViewError> {
        let Phase::Ready { raster, .. } = &self.phase else {
            return Err(ViewError::InputNotReady);
        };
        let artifact = MaskArtifact {
            png: raster.serialize()?,
            width: raster.width(),
            height: raster.height(),
        };
        debug!(
            width = artifact.width,
            height = artifact.height,
            bytes = artifact.png.len(),
            "mask validated"
        );
        self.phase = Phase::Closed;
        Ok(artifact)
    }

    /// Discard everything without producing an artifact.
    pub fn cancel(&mut self) {
        debug!("mask session cancelled");
        self.phase = Phase::Closed;
    }
}
