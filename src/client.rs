//! Request/response contract with the redesign backend.

use crate::config::BackendConfig;
use crate::mask::MaskArtifact;
use crate::model::{AuthToken, DetectedObject, GalleryImage, ImageRef, NewProduct, Product, Style};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

#[derive(Debug, thiserror::Error)]
pub enum ApiClientError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Unexpected status {status}: {text}")]
    UnexpectedStatus { status: StatusCode, text: String },
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    #[error("Could not read local image: {0}")]
    Io(#[from] std::io::Error),
}

/// Image bytes to upload, with the file name the backend should see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadImage {
    pub file_name: String,
    pub bytes: Arc<Vec<u8>>,
}

#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub image: UploadImage,
    pub prompt: String,
    pub style: Style,
}

#[derive(Debug, Clone)]
pub struct InpaintRequest {
    pub image: UploadImage,
    pub mask: MaskArtifact,
    pub prompt: String,
}

/// The external collaborator performing generation, detection, inpainting,
/// gallery storage, the product catalog and authentication.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn generate(&self, request: GenerateRequest) -> Result<ImageRef, ApiClientError>;
    async fn detect_objects(&self, image: UploadImage) -> Result<Vec<DetectedObject>, ApiClientError>;
    async fn inpaint(&self, request: InpaintRequest) -> Result<ImageRef, ApiClientError>;
    async fn fetch_gallery(&self) -> Result<Vec<GalleryImage>, ApiClientError>;
    async fn list_products(&self) -> Result<Vec<Product>, ApiClientError>;
    async fn add_product(&self, token: &AuthToken, product: NewProduct) -> Result<Product, ApiClientError>;
    async fn delete_product(&self, token: &AuthToken, id: &str) -> Result<(), ApiClientError>;
    async fn login(&self, username: &str, password: &str) -> Result<AuthToken, ApiClientError>;
    async fn fetch_image(&self, image: &ImageRef) -> Result<Vec<u8>, ApiClientError>;
}

#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    pub generated_image: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl GenerateResponse {
    pub fn into_image_url(self) -> Result<String, ApiClientError> {
        self.generated_image
            .filter(|url| !url.is_empty())
            .ok_or_else(|| ApiClientError::MalformedResponse("missing generated_image".to_string()))
    }
}

#[derive(Debug, Deserialize)]
pub struct DetectResponse {
    #[serde(default)]
    pub objects: Vec<DetectedObject>,
}

#[derive(Debug, Deserialize)]
pub struct GalleryResponse {
    #[serde(default)]
    pub images: Vec<GalleryImage>,
}

pub struct HttpBackend {
    http_client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Create the HTTP backend client.
    ///
    /// # Errors
    /// If the underlying TLS/HTTP client can't be initialized.
    pub fn new(config: &BackendConfig) -> Result<Self, ApiClientError> {
        let http_client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// Backend-relative URLs become absolute; absolute URLs pass through.
    pub fn resolve_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            self.url(url)
        }
    }
}

fn image_part(image: &UploadImage) -> Result<Part, ApiClientError> {
    let mime = mime_guess::from_path(&image.file_name).first_or_octet_stream();
    Ok(Part::bytes(image.bytes.as_ref().clone())
        .file_name(image.file_name.clone())
        .mime_str(mime.as_ref())?)
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiClientError> {
    match response.status() {
        StatusCode::OK => {
            let body = response.text().await?;
            Ok(serde_json::from_str(&body)?)
        }
        status => {
            let text = response.text().await?;
            Err(ApiClientError::UnexpectedStatus { status, text })
        }
    }
}

#[async_trait]
impl Backend for HttpBackend {
    #[instrument(skip_all, fields(style = request.style.id()))]
    async fn generate(&self, request: GenerateRequest) -> Result<ImageRef, ApiClientError> {
        let form = Form::new()
            .part("file", image_part(&request.image)?)
            .text("prompt", request.prompt)
            .text("style", request.style.id());
        let response = self
            .http_client
            .post(self.url("generate"))
            .multipart(form)
            .send()
            .await?;
        let body: GenerateResponse = read_json(response).await?;
        let url = body.into_image_url()?;
        debug!(%url, "generation finished");
        Ok(ImageRef::Remote(self.resolve_url(&url)))
    }

    #[instrument(skip_all, fields(file = %image.file_name))]
    async fn detect_objects(&self, image: UploadImage) -> Result<Vec<DetectedObject>, ApiClientError> {
        let form = Form::new().part("file", image_part(&image)?);
        let response = self
            .http_client
            .post(self.url("detect"))
            .multipart(form)
            .send()
            .await?;
        let body: DetectResponse = read_json(response).await?;
        debug!(count = body.objects.len(), "objects detected");
        Ok(body.objects)
    }

    #[instrument(skip_all)]
    async fn inpaint(&self, request: InpaintRequest) -> Result<ImageRef, ApiClientError> {
        let mask = Part::bytes(request.mask.png)
            .file_name("mask.png")
            .mime_str("image/png")?;
        let form = Form::new()
            .part("file", image_part(&request.image)?)
            .part("mask", mask)
            .text("prompt", request.prompt);
        let response = self
            .http_client
            .post(self.url("inpaint"))
            .multipart(form)
            .send()
            .await?;
        let body: GenerateResponse = read_json(response).await?;
        Ok(ImageRef::Remote(self.resolve_url(&body.into_image_url()?)))
    }

    async fn fetch_gallery(&self) -> Result<Vec<GalleryImage>, ApiClientError> {
        let response = self.http_client.get(self.url("gallery")).send().await?;
        let body: GalleryResponse = read_json(response).await?;
        Ok(body
            .images
            .into_iter()
            .map(|img| GalleryImage {
                url: self.resolve_url(&img.url),
                id: img.id,
            })
            .collect())
    }

    async fn list_products(&self) -> Result<Vec<Product>, ApiClientError> {
        let response = self.http_client.get(self.url("products")).send().await?;
        read_json(response).await
    }

    #[instrument(skip_all, fields(name = %product.name))]
    async fn add_product(&self, token: &AuthToken, product: NewProduct) -> Result<Product, ApiClientError> {
        let image = UploadImage {
            file_name: product.image.file_name.clone(),
            bytes: product.image.bytes.clone(),
        };
        let form = Form::new()
            .part("image", image_part(&image)?)
            .text("name", product.name)
            .text("price", product.price)
            .text("link", product.link)
            .text("category", product.category);
        let response = self
            .http_client
            .post(self.url("products"))
            .bearer_auth(&token.access_token)
            .multipart(form)
            .send()
            .await?;
        read_json(response).await
    }

    async fn delete_product(&self, token: &AuthToken, id: &str) -> Result<(), ApiClientError> {
        let response = self
            .http_client
            .delete(self.url(&format!("products/{id}")))
            .bearer_auth(&token.access_token)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(()),
            status => {
                let text = response.text().await?;
                Err(ApiClientError::UnexpectedStatus { status, text })
            }
        }
    }

    async fn login(&self, username: &str, password: &str) -> Result<AuthToken, ApiClientError> {
        let response = self
            .http_client
            .post(self.url("token"))
            .form(&[("username", username), ("password", password)])
            .send()
            .await?;
        read_json(response).await
    }

    async fn fetch_image(&self, image: &ImageRef) -> Result<Vec<u8>, ApiClientError> {
        match image {
            ImageRef::Local(path) => Ok(tokio::fs::read(path).await?),
            ImageRef::Remote(url) => {
                let response = self.http_client.get(self.resolve_url(url)).send().await?;
                match response.status() {
                    StatusCode::OK => Ok(response.bytes().await?.to_vec()),
                    status => {
                        let text = response.text().await?;
                        Err(ApiClientError::UnexpectedStatus { status, text })
                    }
                }
            }
        }
    }
}
