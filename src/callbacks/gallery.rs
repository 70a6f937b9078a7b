//! Gallery callbacks.

use crate::AppWindow;
use crate::app::Controller;
use lumina::state::{GalleryState, Msg};
use std::rc::Rc;

pub fn setup_gallery_callbacks(ui: &AppWindow, controller: Rc<Controller>) {
    let c = controller.clone();
    ui.on_open_gallery(move || {
        c.send(Msg::GalleryOpened);
    });

    let c = controller.clone();
    ui.on_close_gallery(move || {
        c.send(Msg::GalleryClosed);
    });

    ui.on_gallery_chosen(move |index| {
        let chosen = match &controller.state().gallery {
            GalleryState::Loaded(images) => usize::try_from(index)
                .ok()
                .and_then(|i| images.get(i))
                .cloned(),
            _ => None,
        };
        if let Some(image) = chosen {
            controller.send(Msg::GalleryImageChosen(image));
        }
    });
}
