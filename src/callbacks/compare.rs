//! Comparison viewport callbacks.
//!
//! Handles: compare_pointer_down, compare_pointer_move, compare_pointer_up, compare_pointer_leave

use crate::AppWindow;
use crate::app::Controller;
use lumina::compare::{PointerButton, PointerEvent};
use std::rc::Rc;

/// Sets up all comparison-viewport callbacks on the UI.
pub fn setup_compare_callbacks(ui: &AppWindow, controller: Rc<Controller>) {
    let c = controller.clone();
    ui.on_compare_pointer_down(move |x, y, primary, width, height| {
        let button = if primary {
            PointerButton::Primary
        } else {
            PointerButton::Secondary
        };
        c.compare_event(PointerEvent::Down { x, y, button }, width, height);
    });

    let c = controller.clone();
    ui.on_compare_pointer_move(move |x, y, width, height| {
        c.compare_event(PointerEvent::MouseMove { x, y }, width, height);
    });

    // up and leave don't depend on the frame geometry
    let c = controller.clone();
    ui.on_compare_pointer_up(move || {
        c.compare_event(PointerEvent::Up, 0.0, 0.0);
    });

    ui.on_compare_pointer_leave(move || {
        controller.compare_event(PointerEvent::Leave, 0.0, 0.0);
    });
}
