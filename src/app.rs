//! Window controller: owns the state container and the two interactive
//! views, runs commands on the tokio runtime and mirrors state into the UI.
//!
//! Threading model:
//! - UI thread: every state transition and every pointer event.
//! - tokio runtime: backend requests and image decoding.
//! - `slint::spawn_local` awaits the runtime's join handle and feeds the
//!   resulting message back on the UI thread.

use crate::utils::{
    image_from_rgba, mask_overlay_buffer, parse_color, placeholder_image, update_overlay_region,
};
use crate::{AppWindow, GalleryItem, MarkerData, ProductItem, RecentSource, StyleItem};
use image::RgbaImage;
use lumina::catalog::Catalog;
use lumina::client::Backend;
use lumina::compare::{CompareViewport, PointerEvent, ViewportOutput};
use lumina::config::{self, AppConfig};
use lumina::geometry::FrameRect;
use lumina::mask::{BrushSettings, MaskSurface};
use lumina::model::{ImageRef, SourceImage, Style};
use lumina::state::{AppState, Busy, Command, GalleryState, Msg};
use lumina::tasks;
use slint::{ComponentHandle, ModelRc, Rgba8Pixel, SharedPixelBuffer, SharedString, VecModel};
use std::cell::{Ref, RefCell};
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Minimum delay between two mask overlay uploads while painting.
const OVERLAY_REFRESH: Duration = Duration::from_millis(33);
/// Recent photos offered in the configuration panel.
const RECENT_SHOWN: usize = 5;

pub struct Controller {
    ui: slint::Weak<AppWindow>,
    backend: Arc<dyn Backend>,
    runtime: tokio::runtime::Handle,
    brush: BrushSettings,
    state: RefCell<AppState>,
    viewport: RefCell<CompareViewport>,
    mask: RefCell<Option<MaskSurface>>,
    overlay: RefCell<Option<SharedPixelBuffer<Rgba8Pixel>>>,
    overlay_timer: slint::Timer,
    config: RefCell<AppConfig>,
    product_image: RefCell<Option<SourceImage>>,
    before_cache: RefCell<Option<(ImageRef, slint::Image)>>,
    after_cache: RefCell<Option<Arc<RgbaImage>>>,
}

impl Controller {
    pub fn new(
        ui: &AppWindow,
        backend: Arc<dyn Backend>,
        runtime: tokio::runtime::Handle,
        config: AppConfig,
        catalog: Catalog,
    ) -> Rc<Self> {
        let state = AppState::new(&config, catalog);
        let brush = config.mask.brush_settings();

        ui.set_brush_min(brush.min_width);
        ui.set_brush_max(brush.max_width);
        ui.set_brush_width(brush.default_width);
        ui.set_prompt(state.prompt.as_str().into());
        ui.set_after_image(placeholder_image());

        let controller = Rc::new(Self {
            ui: ui.as_weak(),
            backend,
            runtime,
            brush,
            state: RefCell::new(state),
            viewport: RefCell::new(CompareViewport::new()),
            mask: RefCell::new(None),
            overlay: RefCell::new(None),
            overlay_timer: slint::Timer::default(),
            config: RefCell::new(config),
            product_image: RefCell::new(None),
            before_cache: RefCell::new(None),
            after_cache: RefCell::new(None),
        });
        controller.sync_recent();
        controller.sync_ui();
        controller
    }

    pub fn state(&self) -> Ref<'_, AppState> {
        self.state.borrow()
    }

    /// Apply a message, refresh the window and launch the resulting commands.
    pub fn send(self: &Rc<Self>, msg: Msg) {
        let commands = self.state.borrow_mut().update(msg);
        self.reconcile_mask();
        self.sync_ui();
        for command in commands {
            self.spawn(command);
        }
    }

    fn spawn(self: &Rc<Self>, command: Command) {
        let backend = self.backend.clone();
        let handle = self
            .runtime
            .spawn(async move { tasks::run(backend.as_ref(), command).await });
        let this = Rc::downgrade(self);
        let spawned = slint::spawn_local(async move {
            match handle.await {
                Ok(msg) => {
                    if let Some(this) = this.upgrade() {
                        this.send(msg);
                    }
                }
                Err(e) => error!("background task failed: {e}"),
            }
        });
        if let Err(e) = spawned {
            error!("could not schedule result delivery: {e}");
        }
    }

    pub fn select_source(self: &Rc<Self>, path: &Path) {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(path = %path.display(), "could not read source photo: {e}");
                self.show_notice(format!("Could not open {}: {e}", path.display()));
                return;
            }
        };
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.jpg".to_string());
        let mut source = SourceImage::new(file_name, bytes);
        source.path = Some(path.to_path_buf());

        {
            let mut config = self.config.borrow_mut();
            config::add_recent_source(&mut config, path.display().to_string());
            if let Err(e) = config::save_config(&config) {
                warn!("could not save config: {e}");
            }
        }
        self.sync_recent();
        self.send(Msg::SourceSelected(source));
    }

    pub fn set_product_image(&self, path: &Path) {
        match std::fs::read(path) {
            Ok(bytes) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "product.png".to_string());
                if let Some(ui) = self.ui.upgrade() {
                    ui.set_product_image_name(name.as_str().into());
                }
                *self.product_image.borrow_mut() = Some(SourceImage::new(name, bytes));
            }
            Err(e) => warn!(path = %path.display(), "could not read product image: {e}"),
        }
    }

    pub fn take_product_image(&self) -> Option<SourceImage> {
        if let Some(ui) = self.ui.upgrade() {
            ui.set_product_image_name(SharedString::new());
        }
        self.product_image.borrow_mut().take()
    }

    fn sync_recent(&self) {
        let Some(ui) = self.ui.upgrade() else { return };
        let recent: Vec<RecentSource> = config::recent_sources(&self.config.borrow(), RECENT_SHOWN)
            .into_iter()
            .map(|path| RecentSource {
                name: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default()
                    .into(),
                path: path.display().to_string().into(),
            })
            .collect();
        ui.set_recent_sources(ModelRc::new(VecModel::from(recent)));
    }

    fn show_notice(&self, text: String) {
        if let Some(ui) = self.ui.upgrade() {
            ui.set_notice(text.into());
        }
    }

    /// Route a pointer event through the comparison viewport.
    pub fn compare_event(self: &Rc<Self>, event: PointerEvent, width: f32, height: f32) {
        let frame = FrameRect::local(width, height);
        let output = {
            let state = self.state.borrow();
            self.viewport
                .borrow_mut()
                .handle(&state.compare_props(), &frame, &event)
        };
        match output {
            Some(ViewportOutput::ObjectClicked(object)) => self.send(Msg::ObjectClicked(object)),
            None => self.sync_compare(),
        }
    }

    /// Run `f` against the open mask surface, if any.
    pub fn with_mask<R>(&self, f: impl FnOnce(&mut MaskSurface) -> R) -> Option<R> {
        self.mask.borrow_mut().as_mut().map(f)
    }

    /// Coalesce overlay redraws while a stroke is in progress.
    pub fn schedule_mask_overlay(self: &Rc<Self>) {
        if self.overlay_timer.running() {
            return;
        }
        let this = Rc::downgrade(self);
        self.overlay_timer
            .start(slint::TimerMode::SingleShot, OVERLAY_REFRESH, move || {
                if let Some(this) = this.upgrade() {
                    this.refresh_mask_overlay();
                }
            });
    }

    /// Push the pixels painted since the last refresh to the overlay image.
    pub fn refresh_mask_overlay(&self) {
        let Some(ui) = self.ui.upgrade() else { return };
        let mut mask = self.mask.borrow_mut();
        let Some(surface) = mask.as_mut() else { return };
        let Some(region) = surface.take_dirty() else { return };
        let Some(raster) = surface.raster() else { return };

        let mut overlay = self.overlay.borrow_mut();
        let buffer = overlay.get_or_insert_with(|| mask_overlay_buffer(raster));
        update_overlay_region(buffer, raster, region);
        ui.set_mask_overlay(slint::Image::from_rgba8(buffer.clone()));
    }

    fn close_overlay(&self) {
        self.overlay_timer.stop();
        self.overlay.borrow_mut().take();
    }

    pub fn validate_mask(self: &Rc<Self>) {
        let result = self.with_mask(MaskSurface::validate);
        match result {
            Some(Ok(artifact)) => {
                self.mask.borrow_mut().take();
                self.close_overlay();
                self.send(Msg::MaskValidated(artifact));
            }
            Some(Err(e)) => warn!("mask not validated: {e}"),
            None => {}
        }
    }

    pub fn cancel_mask(self: &Rc<Self>) {
        if let Some(mut surface) = self.mask.borrow_mut().take() {
            surface.cancel();
        }
        self.close_overlay();
        self.send(Msg::MaskCancelled);
    }

    /// Open or drop the mask surface to follow the state's masking flag.
    fn reconcile_mask(&self) {
        let state = self.state.borrow();
        let mut mask = self.mask.borrow_mut();
        match (state.masking, mask.is_some()) {
            (true, false) => {
                let (Some(after), Some(loaded)) = (&state.after_image, &state.after_loaded) else {
                    return;
                };
                let mut surface = MaskSurface::new(after.clone(), self.brush);
                // the result is already decoded, so the load notification is immediate
                surface.image_loaded(loaded.width(), loaded.height());
                info!(image = %after, "mask surface opened");
                if let Some(ui) = self.ui.upgrade() {
                    ui.set_mask_source(image_from_rgba(&loaded.pixels));
                    ui.set_mask_aspect(loaded.width() as f32 / loaded.height().max(1) as f32);
                    ui.set_brush_width(surface.brush_width());
                    if let Some(raster) = surface.raster() {
                        let buffer = mask_overlay_buffer(raster);
                        ui.set_mask_overlay(slint::Image::from_rgba8(buffer.clone()));
                        *self.overlay.borrow_mut() = Some(buffer);
                    }
                }
                *mask = Some(surface);
            }
            (false, true) => {
                *mask = None;
                self.close_overlay();
            }
            _ => {}
        }
    }

    fn sync_compare(&self) {
        let Some(ui) = self.ui.upgrade() else { return };
        let state = self.state.borrow();
        let frame = self.viewport.borrow().frame(&state.compare_props());

        if let Some(handle) = frame.handle {
            ui.set_slider_percent(handle.percent());
        }
        ui.set_has_before(frame.before.as_ref().is_some_and(|b| b.source.is_some()));
        ui.set_is_generating(frame.busy_overlay);
        ui.set_after_zoom(frame.after.zoom());

        let markers: Vec<MarkerData> = frame
            .markers
            .iter()
            .map(|m| MarkerData {
                label: m.label.as_str().into(),
                x: m.position.x,
                y: m.position.y,
                visible: m.visible,
            })
            .collect();
        ui.set_markers(ModelRc::new(VecModel::from(markers)));
    }

    fn sync_images(&self, ui: &AppWindow, state: &AppState) {
        let mut before_cache = self.before_cache.borrow_mut();
        if before_cache.as_ref().map(|(r, _)| r) != state.before_image.as_ref() {
            *before_cache = state.before_image.as_ref().map(|image| {
                let loaded = match image {
                    ImageRef::Local(path) => slint::Image::load_from_path(path).unwrap_or_else(|_| {
                        warn!(path = %path.display(), "source photo could not be decoded");
                        placeholder_image()
                    }),
                    ImageRef::Remote(_) => placeholder_image(),
                };
                (image.clone(), loaded)
            });
            if let Some((_, image)) = before_cache.as_ref() {
                ui.set_before_image(image.clone());
            }
        }

        let mut after_cache = self.after_cache.borrow_mut();
        let current = state.after_loaded.as_ref().map(|l| l.pixels.clone());
        let changed = match (&*after_cache, &current) {
            (Some(a), Some(b)) => !Arc::ptr_eq(a, b),
            (None, None) => false,
            _ => true,
        };
        if changed {
            let image = match &current {
                Some(pixels) => image_from_rgba(pixels),
                // nothing generated yet: show the photo itself
                None if state.after_image.is_none() => before_cache
                    .as_ref()
                    .map(|(_, image)| image.clone())
                    .unwrap_or_else(placeholder_image),
                None => placeholder_image(),
            };
            ui.set_after_image(image);
            *after_cache = current;
        } else if state.after_image.is_none() {
            if let Some((_, image)) = before_cache.as_ref() {
                ui.set_after_image(image.clone());
            }
        }
    }

    /// Mirror the whole state into the window properties.
    pub fn sync_ui(&self) {
        let Some(ui) = self.ui.upgrade() else { return };
        {
            let state = self.state.borrow();

            self.sync_images(&ui, &state);

            ui.set_busy_text(
                match state.busy {
                    Busy::Idle => "",
                    Busy::Generating => "Generating your design…",
                    Busy::Detecting => "Detecting objects…",
                    Busy::Inpainting => "Repainting the selected area…",
                }
                .into(),
            );
            ui.set_source_name(
                state
                    .source
                    .as_ref()
                    .map(|s| s.file_name.as_str())
                    .unwrap_or_default()
                    .into(),
            );
            ui.set_can_edit(!state.is_busy() && state.after_loaded.is_some());

            let styles: Vec<StyleItem> = Style::ALL
                .into_iter()
                .map(|style| StyleItem {
                    id: style.id().into(),
                    name: style.name().into(),
                    swatch: parse_color(style.swatch()).unwrap_or_default(),
                    selected: style == state.style,
                })
                .collect();
            ui.set_styles(ModelRc::new(VecModel::from(styles)));

            let products: Vec<ProductItem> = state
                .suggestions
                .iter()
                .map(|p| ProductItem {
                    id: p.id.as_str().into(),
                    name: p.name.as_str().into(),
                    price: p.price.as_str().into(),
                    glyph: product_glyph(&p.image).into(),
                    match_score: p.match_score.as_str().into(),
                    category: p.category.as_str().into(),
                })
                .collect();
            ui.set_products(ModelRc::new(VecModel::from(products)));
            ui.set_active_label(state.active_label.as_deref().unwrap_or_default().into());

            let (open, loading, items) = match &state.gallery {
                GalleryState::Closed => (false, false, Vec::new()),
                GalleryState::Loading => (true, true, Vec::new()),
                GalleryState::Loaded(images) => (
                    true,
                    false,
                    images
                        .iter()
                        .map(|img| GalleryItem {
                            id: img.id.as_str().into(),
                            url: img.url.as_str().into(),
                        })
                        .collect(),
                ),
            };
            ui.set_gallery_open(open);
            ui.set_gallery_loading(loading);
            ui.set_gallery_items(ModelRc::new(VecModel::from(items)));

            ui.set_signed_in(state.session.is_some());
            ui.set_notice(state.notice.as_deref().unwrap_or_default().into());
        }

        {
            let mask = self.mask.borrow();
            ui.set_mask_open(mask.is_some());
            ui.set_mask_ready(mask.as_ref().is_some_and(MaskSurface::is_ready));
        }

        self.sync_compare();
    }
}

/// Bundled entries carry a short glyph; remote ones an image URL.
fn product_glyph(image: &str) -> &str {
    if image.starts_with("http://") || image.starts_with("https://") || image.starts_with('/') {
        "🛒"
    } else {
        image
    }
}
