//! Mask painting callbacks.
//!
//! Handles: start_masking, mask_pointer_down, mask_pointer_move, mask_pointer_up,
//! brush_changed, mask_cancel, mask_validate

use crate::AppWindow;
use crate::app::Controller;
use lumina::state::Msg;
use slint::ComponentHandle;
use std::rc::Rc;

/// Sets up all mask-related callbacks on the UI.
pub fn setup_mask_callbacks(ui: &AppWindow, controller: Rc<Controller>) {
    let c = controller.clone();
    ui.on_start_masking(move || {
        c.send(Msg::MaskingStarted);
    });

    let c = controller.clone();
    ui.on_mask_pointer_down(move |x, y, width, height| {
        c.with_mask(|surface| {
            surface.set_display_size(width, height);
            surface.pointer_down(x, y);
        });
    });

    let c = controller.clone();
    ui.on_mask_pointer_move(move |x, y| {
        if c.with_mask(|surface| surface.pointer_move(x, y)) == Some(true) {
            c.schedule_mask_overlay();
        }
    });

    let c = controller.clone();
    ui.on_mask_pointer_up(move || {
        c.with_mask(|surface| surface.pointer_up());
        c.refresh_mask_overlay();
    });

    let c = controller.clone();
    let ui_weak = ui.as_weak();
    ui.on_brush_changed(move |width| {
        let applied = c.with_mask(|surface| {
            surface.set_brush_width(width);
            surface.brush_width()
        });
        if let (Some(applied), Some(ui)) = (applied, ui_weak.upgrade()) {
            if applied != width {
                ui.set_brush_width(applied);
            }
        }
    });

    let c = controller.clone();
    ui.on_mask_cancel(move || {
        c.cancel_mask();
    });

    ui.on_mask_validate(move || {
        controller.validate_mask();
    });
}
