//! Runs the commands emitted by the state container against a [`Backend`].

use crate::client::{ApiClientError, Backend, UploadImage};
use crate::error::ViewError;
use crate::model::{DetectedObject, ImageRef, LoadedImage};
use crate::state::{Command, DetectInput, Msg};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Execute one command and report its outcome as the message to feed back.
#[instrument(skip_all)]
pub async fn run(backend: &dyn Backend, command: Command) -> Msg {
    match command {
        Command::Generate { request, revision } => Msg::Generated {
            revision,
            result: backend.generate(request).await,
        },

        Command::Detect { input, revision } => {
            let result = detect(backend, input).await;
            Msg::ObjectsDetected { revision, result }
        }

        Command::LoadAfterImage(image) => {
            let result = load_image(backend, &image).await;
            Msg::AfterImageLoaded { image, result }
        }

        Command::Inpaint { request, revision } => Msg::Inpainted {
            revision,
            result: backend.inpaint(request).await,
        },

        Command::FetchGallery => Msg::GalleryLoaded(backend.fetch_gallery().await),

        Command::FetchProducts => Msg::ProductsLoaded(backend.list_products().await),

        Command::Login { username, password } => {
            Msg::LoginCompleted(backend.login(&username, &password).await)
        }

        Command::AddProduct { token, product } => {
            Msg::ProductAdded(backend.add_product(&token, product).await)
        }

        Command::DeleteProduct { token, id } => {
            let result = backend.delete_product(&token, &id).await;
            Msg::ProductDeleted { id, result }
        }
    }
}

async fn detect(
    backend: &dyn Backend,
    input: DetectInput,
) -> Result<Vec<DetectedObject>, ApiClientError> {
    let upload = match input {
        DetectInput::Upload(upload) => upload,
        DetectInput::Fetch(image) => {
            debug!(%image, "fetching generated image for detection");
            let bytes = backend.fetch_image(&image).await?;
            UploadImage {
                file_name: "generated.png".to_string(),
                bytes: Arc::new(bytes),
            }
        }
    };
    backend.detect_objects(upload).await
}

/// Fetch and decode an image. Decoding runs on the blocking pool.
pub async fn load_image(backend: &dyn Backend, image: &ImageRef) -> Result<LoadedImage, ViewError> {
    let bytes = backend
        .fetch_image(image)
        .await
        .map_err(|e| ViewError::TransientRenderFailure(e.to_string()))?;
    tokio::task::spawn_blocking(move || LoadedImage::decode(bytes))
        .await
        .map_err(|e| ViewError::TransientRenderFailure(e.to_string()))?
}
