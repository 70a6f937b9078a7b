//! The before/after comparison viewport and its render model.

use super::slider::{Divider, DragState, PointerEvent, SliderPosition};
use crate::geometry::{FrameRect, PercentPoint};
use crate::model::{DetectedObject, ImageRef};
use tracing::debug;

/// Hit radius of a detected-object marker, in pointer units.
pub const MARKER_RADIUS: f32 = 12.0;

/// Scale of the after image while its result is pending.
pub const PENDING_ZOOM: f32 = 1.1;

/// Data owned by the hosting application and passed down on every update.
#[derive(Debug, Clone, Copy)]
pub struct CompareProps<'a> {
    pub before_image: Option<&'a ImageRef>,
    pub after_image: Option<&'a ImageRef>,
    pub is_generating: bool,
    pub detected_objects: &'a [DetectedObject],
}

/// Output produced by the viewport for its host.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewportOutput {
    ObjectClicked(DetectedObject),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AfterLayer {
    pub source: Option<ImageRef>,
    /// Rendered dimmed and scaled up while an operation is pending.
    pub pending: bool,
}

impl AfterLayer {
    /// Scale factor around the frame center.
    pub fn zoom(&self) -> f32 {
        if self.pending { PENDING_ZOOM } else { 1.0 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BeforeLayer {
    pub source: Option<ImageRef>,
    /// The layer covers `[0, clip_right]` percent of the frame width.
    pub clip_right: SliderPosition,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerView {
    /// Index into `detected_objects`.
    pub index: usize,
    pub label: String,
    pub position: PercentPoint,
    pub visible: bool,
}

/// Everything needed to draw the viewport for one set of props.
#[derive(Debug, Clone, PartialEq)]
pub struct CompareFrame {
    pub after: AfterLayer,
    pub before: Option<BeforeLayer>,
    pub handle: Option<SliderPosition>,
    pub markers: Vec<MarkerView>,
    pub busy_overlay: bool,
}

/// A marker is shown only where the divider has revealed the "after" image.
pub fn marker_visible(slider: SliderPosition, object: &DetectedObject) -> bool {
    slider.percent() < object.position.x
}

#[derive(Debug, Clone, Default)]
pub struct CompareViewport {
    divider: Divider,
}

impl CompareViewport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slider_position(&self) -> SliderPosition {
        self.divider.position()
    }

    pub fn drag_state(&self) -> DragState {
        self.divider.drag_state()
    }

    /// Route a pointer event through marker hit testing, then to the divider.
    ///
    /// A press that lands on a visible marker is the marker's click: it is
    /// reported once and never reaches the divider.
    pub fn handle(
        &mut self,
        props: &CompareProps<'_>,
        frame: &FrameRect,
        event: &PointerEvent,
    ) -> Option<ViewportOutput> {
        if let PointerEvent::Down { x, y, .. } = *event {
            if let Some(index) = self.marker_at(props, frame, x, y) {
                return self.click_marker(props, index);
            }
        }
        self.divider.handle(frame, event);
        None
    }

    /// Direct marker activation, for toolkits that route clicks to the marker
    /// element themselves. Leaves the drag state untouched.
    pub fn click_marker(&self, props: &CompareProps<'_>, index: usize) -> Option<ViewportOutput> {
        if props.is_generating {
            return None;
        }
        let object = props.detected_objects.get(index)?;
        if !marker_visible(self.slider_position(), object) {
            return None;
        }
        debug!(label = %object.label, index, "detected object clicked");
        Some(ViewportOutput::ObjectClicked(object.clone()))
    }

    /// Topmost visible marker under the pointer.
    pub fn marker_at(
        &self,
        props: &CompareProps<'_>,
        frame: &FrameRect,
        x: f32,
        y: f32,
    ) -> Option<usize> {
        if props.is_generating {
            return None;
        }
        let slider = self.slider_position();
        props
            .detected_objects
            .iter()
            .enumerate()
            .rev()
            .filter(|(_, obj)| marker_visible(slider, obj))
            .find(|(_, obj)| {
                let mx = frame.left + frame.width * obj.position.x / 100.0;
                let my = frame.top + frame.height * obj.position.y / 100.0;
                let dx = x - mx;
                let dy = y - my;
                (dx * dx + dy * dy).sqrt() <= MARKER_RADIUS
            })
            .map(|(i, _)| i)
    }

    pub fn frame(&self, props: &CompareProps<'_>) -> CompareFrame {
        let slider = self.slider_position();
        let generating = props.is_generating;

        let markers = if generating {
            Vec::new()
        } else {
            props
                .detected_objects
                .iter()
                .enumerate()
                .map(|(index, obj)| MarkerView {
                    index,
                    label: obj.label.clone(),
                    position: obj.position,
                    visible: marker_visible(slider, obj),
                })
                .collect()
        };

        CompareFrame {
            after: AfterLayer {
                source: props.after_image.cloned(),
                pending: generating,
            },
            before: (!generating).then(|| BeforeLayer {
                source: props.before_image.cloned(),
                clip_right: slider,
            }),
            handle: (!generating).then_some(slider),
            markers,
            busy_overlay: generating,
        }
    }
}
