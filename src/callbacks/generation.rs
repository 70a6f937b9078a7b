//! Configuration panel callbacks.
//!
//! Handles: pick_source, pick_recent, prompt_edited, style_selected, generate, dismiss_notice

use crate::AppWindow;
use crate::app::Controller;
use lumina::model::Style;
use lumina::state::Msg;
use std::path::Path;
use std::rc::Rc;
use tracing::warn;

pub fn setup_generation_callbacks(ui: &AppWindow, controller: Rc<Controller>) {
    let c = controller.clone();
    ui.on_pick_source(move || {
        let file = rfd::FileDialog::new()
            .add_filter("Images", &["png", "jpg", "jpeg", "webp"])
            .set_title("Choose a room photo")
            .pick_file();

        if let Some(path) = file {
            c.select_source(&path);
        }
    });

    let c = controller.clone();
    ui.on_pick_recent(move |path| {
        c.select_source(Path::new(path.as_str()));
    });

    let c = controller.clone();
    ui.on_prompt_edited(move |text| {
        c.send(Msg::PromptChanged(text.to_string()));
    });

    let c = controller.clone();
    ui.on_style_selected(move |id| match Style::from_id(&id) {
        Some(style) => c.send(Msg::StyleSelected(style)),
        None => warn!(%id, "unknown style"),
    });

    let c = controller.clone();
    ui.on_generate(move || {
        c.send(Msg::GenerateRequested);
    });

    ui.on_dismiss_notice(move || {
        controller.send(Msg::NoticeDismissed);
    });
}
