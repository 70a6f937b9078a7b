//! Divider position and its drag lifecycle.

use crate::geometry::FrameRect;
use tracing::trace;

/// Horizontal divider position, as a percentage of the viewport width.
///
/// Always within `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct SliderPosition(f32);

impl SliderPosition {
    pub const MIN: f32 = 0.0;
    pub const MAX: f32 = 100.0;

    pub fn new(percent: f32) -> Self {
        if percent.is_nan() {
            return Self(Self::MIN);
        }
        Self(percent.clamp(Self::MIN, Self::MAX))
    }

    pub fn percent(self) -> f32 {
        self.0
    }
}

impl Default for SliderPosition {
    fn default() -> Self {
        Self(50.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Raw pointer input delivered to the viewport, in the coordinate space of
/// its [`FrameRect`].
#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
    Down { x: f32, y: f32, button: PointerButton },
    MouseMove { x: f32, y: f32 },
    /// Active touch points; only the first one is used.
    TouchMove { touches: Vec<(f32, f32)> },
    Up,
    Leave,
}

/// The draggable divider: its position plus the `Idle`/`Dragging` machine.
#[derive(Debug, Clone, Default)]
pub struct Divider {
    position: SliderPosition,
    drag: DragState,
}

impl Divider {
    pub fn position(&self) -> SliderPosition {
        self.position
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    /// Feed one pointer event. Returns `true` when the position changed.
    pub fn handle(&mut self, frame: &FrameRect, event: &PointerEvent) -> bool {
        match *event {
            PointerEvent::Down { x, y, button } => {
                if button == PointerButton::Primary && frame.contains(x, y) {
                    self.drag = DragState::Dragging;
                }
                false
            }
            PointerEvent::MouseMove { x, y } => {
                if self.drag != DragState::Dragging {
                    return false;
                }
                let changed = self.move_to(frame, x);
                // The pointer crossed the edge: apply the clamped position, then leave.
                if !frame.contains(x, y) {
                    self.drag = DragState::Idle;
                }
                changed
            }
            PointerEvent::TouchMove { ref touches } => {
                if self.drag != DragState::Dragging {
                    return false;
                }
                match touches.first() {
                    Some(&(x, _)) => self.move_to(frame, x),
                    None => false,
                }
            }
            PointerEvent::Up | PointerEvent::Leave => {
                self.drag = DragState::Idle;
                false
            }
        }
    }

    fn move_to(&mut self, frame: &FrameRect, pointer_x: f32) -> bool {
        let next = SliderPosition::new(frame.horizontal_percent(pointer_x));
        if next == self.position {
            return false;
        }
        trace!(from = self.position.percent(), to = next.percent(), "divider moved");
        self.position = next;
        true
    }
}
