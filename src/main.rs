slint::include_modules!();

mod app;
mod callbacks;
mod utils;

use app::Controller;
use lumina::catalog::load_catalog;
use lumina::client::{Backend, HttpBackend};
use lumina::config::load_config;
use lumina::state::Msg;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "lumina=info".into()))
        .init();

    let mut config = load_config();
    // Optional backend URL override as first arg.
    if let Some(base_url) = std::env::args().nth(1) {
        config.backend.base_url = base_url;
    }
    info!(backend = %config.backend.base_url, "starting");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let backend: Arc<dyn Backend> = Arc::new(HttpBackend::new(&config.backend)?);
    let catalog = load_catalog(config.catalog.catalog_file.as_deref());

    let ui = AppWindow::new()?;
    let controller = Controller::new(&ui, backend, runtime.handle().clone(), config, catalog);

    callbacks::compare::setup_compare_callbacks(&ui, controller.clone());
    callbacks::mask::setup_mask_callbacks(&ui, controller.clone());
    callbacks::generation::setup_generation_callbacks(&ui, controller.clone());
    callbacks::gallery::setup_gallery_callbacks(&ui, controller.clone());
    callbacks::shop::setup_shop_callbacks(&ui, controller.clone());

    controller.send(Msg::Started);

    ui.run()?;
    Ok(())
}
