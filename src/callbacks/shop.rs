//! Admin session and product management callbacks.
//!
//! Handles: login, logout, pick_product_image, submit_product, delete_product

use crate::AppWindow;
use crate::app::Controller;
use lumina::catalog::DEFAULT_CATEGORY;
use lumina::model::NewProduct;
use lumina::state::Msg;
use std::rc::Rc;
use tracing::warn;

pub fn setup_shop_callbacks(ui: &AppWindow, controller: Rc<Controller>) {
    let c = controller.clone();
    ui.on_login(move |username, password| {
        c.send(Msg::LoginRequested {
            username: username.to_string(),
            password: password.to_string(),
        });
    });

    let c = controller.clone();
    ui.on_logout(move || {
        c.send(Msg::LoggedOut);
    });

    let c = controller.clone();
    ui.on_pick_product_image(move || {
        let file = rfd::FileDialog::new()
            .add_filter("Images", &["png", "jpg", "jpeg", "webp"])
            .set_title("Product image")
            .pick_file();

        if let Some(path) = file {
            c.set_product_image(&path);
        }
    });

    let c = controller.clone();
    ui.on_submit_product(move |name, price, link, category| {
        let Some(image) = c.take_product_image() else {
            warn!("product submitted without an image");
            return;
        };
        let category = category.trim();
        c.send(Msg::ProductSubmitted(NewProduct {
            name: name.trim().to_string(),
            price: price.trim().to_string(),
            link: link.trim().to_string(),
            category: if category.is_empty() {
                DEFAULT_CATEGORY.to_string()
            } else {
                category.to_lowercase()
            },
            image,
        }));
    });

    ui.on_delete_product(move |id| {
        controller.send(Msg::ProductDeleteRequested(id.to_string()));
    });
}
