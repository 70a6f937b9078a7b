//! Coordinate spaces used by the two interactive views.
//!
//! The comparison viewport works in *normalized percent space* (0–100 on both
//! axes, independent of rendered size) while the mask surface works in
//! *surface pixel space* (the natural pixel grid of the annotated image).
//! They are separate types on purpose and there is no conversion between them.

use serde::{Deserialize, Serialize};

/// A point in normalized percent space, as delivered by object detection.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PercentPoint {
    pub x: f32,
    pub y: f32,
}

impl PercentPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A point on the mask surface, in pixels of the source image.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfacePoint {
    pub x: f32,
    pub y: f32,
}

impl SurfacePoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: SurfacePoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Bounding box of the viewport, expressed in the same space as pointer
/// coordinates (client coordinates for mouse and touch input).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl FrameRect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Frame anchored at the origin, for toolkits that report local coordinates.
    pub fn local(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left
            && x <= self.left + self.width
            && y >= self.top
            && y <= self.top + self.height
    }

    /// Horizontal pointer position as a percentage of the frame width,
    /// clamped to `[0, 100]`. A degenerate frame maps everything to 0.
    pub fn horizontal_percent(&self, pointer_x: f32) -> f32 {
        if self.width <= 0.0 || !self.width.is_finite() {
            return 0.0;
        }
        ((pointer_x - self.left) / self.width * 100.0).clamp(0.0, 100.0)
    }
}

/// Maps coordinates local to the on-screen mask display onto the surface,
/// whose size is the natural size of the source image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayScale {
    pub display_width: f32,
    pub display_height: f32,
    pub surface_width: u32,
    pub surface_height: u32,
}

impl DisplayScale {
    pub fn new(display_width: f32, display_height: f32, surface_width: u32, surface_height: u32) -> Self {
        Self {
            display_width,
            display_height,
            surface_width,
            surface_height,
        }
    }

    /// Identity mapping: the surface is displayed at its natural size.
    pub fn natural(surface_width: u32, surface_height: u32) -> Self {
        Self::new(
            surface_width as f32,
            surface_height as f32,
            surface_width,
            surface_height,
        )
    }

    pub fn to_surface(&self, display_x: f32, display_y: f32) -> SurfacePoint {
        let sx = if self.display_width > 0.0 {
            self.surface_width as f32 / self.display_width
        } else {
            1.0
        };
        let sy = if self.display_height > 0.0 {
            self.surface_height as f32 / self.display_height
        } else {
            1.0
        };
        SurfacePoint::new(display_x * sx, display_y * sy)
    }
}
