use super::messages::{Busy, Command, DetectInput, GalleryState, Msg};
use crate::catalog::{Catalog, DEFAULT_CATEGORY};
use crate::client::{ApiClientError, GenerateRequest, InpaintRequest, UploadImage};
use crate::compare::CompareProps;
use crate::config::{AppConfig, DetectionTarget};
use crate::model::{
    AuthToken, DetectedObject, ImageRef, LoadedImage, Product, SourceImage, Style,
};
use reqwest::StatusCode;
use tracing::{debug, info, warn};

/// Prompt used when the user leaves the field blank and nothing else is configured.
pub const DEFAULT_PROMPT: &str = "interior design";

pub const NOTICE_NO_SOURCE: &str = "Please select an image first.";
pub const NOTICE_NO_RESULT: &str = "Generate or open an image before editing it.";
pub const NOTICE_PROCESSING_FAILED: &str = "Error while processing.";
pub const NOTICE_BAD_CREDENTIALS: &str = "Incorrect username or password";
pub const NOTICE_SIGN_IN: &str = "Sign in as an administrator first.";

/// Single owner of everything the window displays.
///
/// Mutated only through [`AppState::update`]; the returned commands are run
/// by the caller and their outcome comes back as another [`Msg`].
#[derive(Debug)]
pub struct AppState {
    pub source: Option<SourceImage>,
    pub before_image: Option<ImageRef>,
    pub after_image: Option<ImageRef>,
    /// Decoded pixels of `after_image`, once fetched.
    pub after_loaded: Option<LoadedImage>,
    /// Bumped whenever the after image or the source changes. Detection
    /// results tagged with an older revision are discarded.
    pub revision: u64,
    pub detected_objects: Vec<DetectedObject>,
    pub busy: Busy,
    pub masking: bool,
    pub prompt: String,
    /// Sent instead of a blank prompt.
    pub default_prompt: String,
    pub style: Style,
    pub detection_target: DetectionTarget,
    pub active_label: Option<String>,
    pub suggestions: Vec<Product>,
    pub gallery: GalleryState,
    pub catalog: Catalog,
    pub session: Option<AuthToken>,
    pub notice: Option<String>,
}

impl AppState {
    pub fn new(config: &AppConfig, catalog: Catalog) -> Self {
        let suggestions = catalog.suggestions_for(DEFAULT_CATEGORY);
        Self {
            source: None,
            before_image: None,
            after_image: None,
            after_loaded: None,
            revision: 0,
            detected_objects: Vec::new(),
            busy: Busy::Idle,
            masking: false,
            prompt: String::new(),
            default_prompt: config.session.default_prompt.clone(),
            style: config.session.default_style,
            detection_target: config.detection.target,
            active_label: None,
            suggestions,
            gallery: GalleryState::Closed,
            catalog,
            session: None,
            notice: None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy != Busy::Idle
    }

    /// Props for the comparison viewport. The result image stays pending
    /// until detection has finished too.
    pub fn compare_props(&self) -> CompareProps<'_> {
        CompareProps {
            before_image: self.before_image.as_ref(),
            after_image: self.after_image.as_ref(),
            is_generating: self.is_busy(),
            detected_objects: &self.detected_objects,
        }
    }

    fn effective_prompt(&self) -> String {
        let trimmed = self.prompt.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
        match self.default_prompt.trim() {
            "" => DEFAULT_PROMPT.to_string(),
            configured => configured.to_string(),
        }
    }

    /// Swap in a new after image that no detection run belongs to.
    fn replace_after_image(&mut self, image: ImageRef) -> Command {
        self.revision += 1;
        self.after_image = Some(image.clone());
        self.after_loaded = None;
        self.clear_detections();
        if self.busy == Busy::Detecting {
            self.busy = Busy::Idle;
        }
        Command::LoadAfterImage(image)
    }

    fn clear_detections(&mut self) {
        self.detected_objects.clear();
        self.active_label = None;
        self.suggestions = self.catalog.suggestions_for(DEFAULT_CATEGORY);
    }

    fn refresh_suggestions(&mut self) {
        let label = self.active_label.as_deref().unwrap_or(DEFAULT_CATEGORY);
        self.suggestions = self.catalog.suggestions_for(label);
    }

    fn fail(&mut self, context: &str, error: &ApiClientError) {
        warn!("{context}: {error}");
        self.notice = Some(NOTICE_PROCESSING_FAILED.to_string());
    }

    pub fn update(&mut self, msg: Msg) -> Vec<Command> {
        match msg {
            Msg::Started => vec![Command::FetchProducts],

            Msg::SourceSelected(source) => {
                info!(file = %source.file_name, "source selected");
                self.before_image = Some(source.image_ref());
                self.source = Some(source);
                self.revision += 1;
                self.clear_detections();
                // results still in flight belong to the previous photo
                if self.busy != Busy::Idle {
                    debug!(busy = ?self.busy, "pending work abandoned for the new source");
                    self.busy = Busy::Idle;
                }
                Vec::new()
            }

            Msg::PromptChanged(prompt) => {
                self.prompt = prompt;
                Vec::new()
            }

            Msg::StyleSelected(style) => {
                self.style = style;
                Vec::new()
            }

            Msg::GenerateRequested => {
                if self.is_busy() {
                    debug!(busy = ?self.busy, "generate ignored while busy");
                    return Vec::new();
                }
                let Some(source) = &self.source else {
                    self.notice = Some(NOTICE_NO_SOURCE.to_string());
                    return Vec::new();
                };
                let request = GenerateRequest {
                    image: upload_of(source),
                    prompt: self.effective_prompt(),
                    style: self.style,
                };
                self.busy = Busy::Generating;
                self.clear_detections();
                vec![Command::Generate {
                    request,
                    revision: self.revision,
                }]
            }

            Msg::Generated { revision, .. } | Msg::Inpainted { revision, .. }
                if revision != self.revision =>
            {
                debug!(revision, current = self.revision, "stale result discarded");
                Vec::new()
            }

            Msg::Generated { result: Ok(image), .. } => {
                let mut commands = vec![self.replace_after_image(image.clone())];
                let input = match self.detection_target {
                    DetectionTarget::Source => self.source.as_ref().map(|s| DetectInput::Upload(upload_of(s))),
                    DetectionTarget::Generated => Some(DetectInput::Fetch(image)),
                };
                match input {
                    Some(input) => {
                        self.busy = Busy::Detecting;
                        commands.push(Command::Detect {
                            input,
                            revision: self.revision,
                        });
                    }
                    None => self.busy = Busy::Idle,
                }
                commands
            }

            Msg::Generated { result: Err(e), .. } => {
                self.busy = Busy::Idle;
                self.fail("generation failed", &e);
                Vec::new()
            }

            Msg::ObjectsDetected { revision, result } => {
                if revision != self.revision {
                    debug!(revision, current = self.revision, "stale detection discarded");
                    return Vec::new();
                }
                if self.busy == Busy::Detecting {
                    self.busy = Busy::Idle;
                }
                match result {
                    Ok(objects) => {
                        info!(count = objects.len(), "detections received");
                        self.detected_objects = objects;
                    }
                    Err(e) => self.fail("detection failed", &e),
                }
                Vec::new()
            }

            Msg::AfterImageLoaded { image, result } => {
                if self.after_image.as_ref() != Some(&image) {
                    debug!(%image, "stale image load discarded");
                    return Vec::new();
                }
                match result {
                    Ok(loaded) => self.after_loaded = Some(loaded),
                    Err(e) => warn!(%image, "{e}"),
                }
                Vec::new()
            }

            Msg::ObjectClicked(object) => {
                self.suggestions = self.catalog.suggestions_for(&object.label);
                self.active_label = Some(object.label);
                Vec::new()
            }

            Msg::MaskingStarted => {
                if self.is_busy() || self.masking {
                    return Vec::new();
                }
                if self.after_loaded.is_none() {
                    self.notice = Some(NOTICE_NO_RESULT.to_string());
                    return Vec::new();
                }
                self.masking = true;
                Vec::new()
            }

            Msg::MaskValidated(mask) => {
                self.masking = false;
                let (Some(after), Some(loaded)) = (&self.after_image, &self.after_loaded) else {
                    self.notice = Some(NOTICE_NO_RESULT.to_string());
                    return Vec::new();
                };
                let request = InpaintRequest {
                    image: UploadImage {
                        file_name: file_name_of(after),
                        bytes: loaded.encoded.clone(),
                    },
                    mask,
                    prompt: self.effective_prompt(),
                };
                self.busy = Busy::Inpainting;
                vec![Command::Inpaint {
                    request,
                    revision: self.revision,
                }]
            }

            Msg::MaskCancelled => {
                self.masking = false;
                Vec::new()
            }

            Msg::Inpainted { result: Ok(image), .. } => {
                self.busy = Busy::Idle;
                vec![self.replace_after_image(image)]
            }

            Msg::Inpainted { result: Err(e), .. } => {
                self.busy = Busy::Idle;
                self.fail("inpainting failed", &e);
                Vec::new()
            }

            Msg::GalleryOpened => {
                self.gallery = GalleryState::Loading;
                vec![Command::FetchGallery]
            }

            Msg::GalleryLoaded(result) => {
                if self.gallery == GalleryState::Closed {
                    return Vec::new();
                }
                let images = result.unwrap_or_else(|e| {
                    warn!("gallery fetch failed: {e}");
                    Vec::new()
                });
                self.gallery = GalleryState::Loaded(images);
                Vec::new()
            }

            Msg::GalleryImageChosen(image) => {
                self.gallery = GalleryState::Closed;
                if matches!(self.busy, Busy::Generating | Busy::Inpainting) {
                    debug!("gallery choice ignored while a result is pending");
                    return Vec::new();
                }
                vec![self.replace_after_image(ImageRef::Remote(image.url))]
            }

            Msg::GalleryClosed => {
                self.gallery = GalleryState::Closed;
                Vec::new()
            }

            Msg::ProductsLoaded(Ok(products)) => {
                self.catalog.merge_remote(products);
                self.refresh_suggestions();
                Vec::new()
            }

            Msg::ProductsLoaded(Err(e)) => {
                warn!("product list unavailable, keeping bundled catalog: {e}");
                Vec::new()
            }

            Msg::LoginRequested { username, password } => {
                vec![Command::Login { username, password }]
            }

            Msg::LoginCompleted(Ok(token)) => {
                info!("administrator signed in");
                self.session = Some(token);
                Vec::new()
            }

            Msg::LoginCompleted(Err(e)) => {
                self.notice = Some(match &e {
                    ApiClientError::UnexpectedStatus { status, .. }
                        if *status == StatusCode::UNAUTHORIZED =>
                    {
                        NOTICE_BAD_CREDENTIALS.to_string()
                    }
                    other => format!("Sign-in failed: {other}"),
                });
                Vec::new()
            }

            Msg::LoggedOut => {
                self.session = None;
                Vec::new()
            }

            Msg::ProductSubmitted(product) => {
                let Some(token) = self.session.clone() else {
                    self.notice = Some(NOTICE_SIGN_IN.to_string());
                    return Vec::new();
                };
                vec![Command::AddProduct { token, product }]
            }

            Msg::ProductAdded(Ok(product)) => {
                self.notice = Some(format!("Product \"{}\" added.", product.name));
                self.catalog.insert(product);
                self.refresh_suggestions();
                Vec::new()
            }

            Msg::ProductAdded(Err(e)) => {
                self.fail("adding product failed", &e);
                Vec::new()
            }

            Msg::ProductDeleteRequested(id) => {
                let Some(token) = self.session.clone() else {
                    self.notice = Some(NOTICE_SIGN_IN.to_string());
                    return Vec::new();
                };
                vec![Command::DeleteProduct { token, id }]
            }

            Msg::ProductDeleted { id, result } => {
                match result {
                    Ok(()) => {
                        self.catalog.remove(&id);
                        self.refresh_suggestions();
                    }
                    Err(e) => self.fail("deleting product failed", &e),
                }
                Vec::new()
            }

            Msg::NoticeDismissed => {
                self.notice = None;
                Vec::new()
            }
        }
    }
}

fn upload_of(source: &SourceImage) -> UploadImage {
    UploadImage {
        file_name: source.file_name.clone(),
        bytes: source.bytes.clone(),
    }
}

/// File name to upload an image under, taken from its last path segment.
fn file_name_of(image: &ImageRef) -> String {
    let name = match image {
        ImageRef::Remote(url) => url
            .split(['?', '#'])
            .next()
            .and_then(|path| path.rsplit('/').next())
            .map(str::to_string),
        ImageRef::Local(path) => path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned()),
    };
    name.filter(|n| n.contains('.'))
        .unwrap_or_else(|| "current.png".to_string())
}
