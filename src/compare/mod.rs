//! Comparison Viewport: original and result in one frame, split by a
//! draggable divider, with clickable markers over the result.

mod slider;
mod view;

pub use slider::*;
pub use view::*;
