//! Inputs to and effects of the state container.

use crate::client::{ApiClientError, GenerateRequest, InpaintRequest, UploadImage};
use crate::error::ViewError;
use crate::mask::MaskArtifact;
use crate::model::{
    AuthToken, DetectedObject, GalleryImage, ImageRef, LoadedImage, NewProduct, Product,
    SourceImage, Style,
};

/// What the application is currently waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Busy {
    #[default]
    Idle,
    Generating,
    Detecting,
    Inpainting,
}

/// Image sent to object detection.
#[derive(Debug, Clone, PartialEq)]
pub enum DetectInput {
    /// Bytes already in memory (the uploaded source photo).
    Upload(UploadImage),
    /// An image that has to be fetched first (the generated result).
    Fetch(ImageRef),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum GalleryState {
    #[default]
    Closed,
    Loading,
    Loaded(Vec<GalleryImage>),
}

/// Effects requested by [`AppState::update`](super::AppState::update).
#[derive(Debug, Clone)]
pub enum Command {
    Generate { request: GenerateRequest, revision: u64 },
    Detect { input: DetectInput, revision: u64 },
    LoadAfterImage(ImageRef),
    Inpaint { request: InpaintRequest, revision: u64 },
    FetchGallery,
    FetchProducts,
    Login { username: String, password: String },
    AddProduct { token: AuthToken, product: NewProduct },
    DeleteProduct { token: AuthToken, id: String },
}

#[derive(Debug)]
pub enum Msg {
    Started,
    SourceSelected(SourceImage),
    PromptChanged(String),
    StyleSelected(Style),
    GenerateRequested,
    Generated {
        revision: u64,
        result: Result<ImageRef, ApiClientError>,
    },
    ObjectsDetected {
        revision: u64,
        result: Result<Vec<DetectedObject>, ApiClientError>,
    },
    AfterImageLoaded {
        image: ImageRef,
        result: Result<LoadedImage, ViewError>,
    },
    ObjectClicked(DetectedObject),
    MaskingStarted,
    MaskValidated(MaskArtifact),
    MaskCancelled,
    Inpainted {
        revision: u64,
        result: Result<ImageRef, ApiClientError>,
    },
    GalleryOpened,
    GalleryLoaded(Result<Vec<GalleryImage>, ApiClientError>),
    GalleryImageChosen(GalleryImage),
    GalleryClosed,
    ProductsLoaded(Result<Vec<Product>, ApiClientError>),
    LoginRequested { username: String, password: String },
    LoginCompleted(Result<AuthToken, ApiClientError>),
    LoggedOut,
    ProductSubmitted(NewProduct),
    ProductAdded(Result<Product, ApiClientError>),
    ProductDeleteRequested(String),
    ProductDeleted {
        id: String,
        result: Result<(), ApiClientError>,
    },
    NoticeDismissed,
}
