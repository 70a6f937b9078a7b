// Test helper functions for creating test scenarios
#![allow(dead_code)]

use async_trait::async_trait;
use image::{ImageFormat, Rgba, RgbaImage};
use lumina::catalog::Catalog;
use lumina::client::{ApiClientError, Backend, GenerateRequest, InpaintRequest, UploadImage};
use lumina::compare::CompareProps;
use lumina::config::AppConfig;
use lumina::geometry::FrameRect;
use lumina::model::{AuthToken, DetectedObject, GalleryImage, ImageRef, NewProduct, Product, SourceImage};
use lumina::state::AppState;
use std::io::Cursor;
use std::sync::Mutex;

/// The standard 200x100 viewport frame used by the comparison tests
pub fn frame() -> FrameRect {
    FrameRect::new(0.0, 0.0, 200.0, 100.0)
}

/// Detected objects at the given horizontal percentages, all at y = 50
pub fn objects_at(xs: &[f32]) -> Vec<DetectedObject> {
    xs.iter()
        .enumerate()
        .map(|(i, &x)| DetectedObject::new(format!("object-{i}"), x, 50.0))
        .collect()
}

pub fn props<'a>(objects: &'a [DetectedObject], generating: bool) -> CompareProps<'a> {
    CompareProps {
        before_image: None,
        after_image: None,
        is_generating: generating,
        detected_objects: objects,
    }
}

/// Encode a solid-color PNG of the given size
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([120, 90, 60, 255]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

pub fn source_image(name: &str) -> SourceImage {
    SourceImage::new(name, png_bytes(8, 6))
}

pub fn fresh_state() -> AppState {
    AppState::new(&AppConfig::default(), Catalog::builtin())
}

pub fn remote(url: &str) -> ImageRef {
    ImageRef::Remote(url.to_string())
}

pub fn token() -> AuthToken {
    AuthToken {
        access_token: "secret".to_string(),
        token_type: "bearer".to_string(),
    }
}

pub fn product(id: &str, name: &str, category: &str) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        price: "10€".to_string(),
        image: "📦".to_string(),
        match_score: "100%".to_string(),
        link: None,
        category: category.to_string(),
    }
}

fn failure() -> ApiClientError {
    ApiClientError::MalformedResponse("fake backend failure".to_string())
}

/// In-memory backend recording every call it receives
#[derive(Default)]
pub struct FakeBackend {
    pub fail: bool,
    pub objects: Vec<DetectedObject>,
    pub image: Vec<u8>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            image: png_bytes(16, 8),
            objects: objects_at(&[30.0, 60.0]),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<(), ApiClientError> {
        self.calls.lock().unwrap().push(call);
        if self.fail { Err(failure()) } else { Ok(()) }
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn generate(&self, request: GenerateRequest) -> Result<ImageRef, ApiClientError> {
        self.record(format!("generate {} {} {}", request.image.file_name, request.prompt, request.style.id()))?;
        Ok(remote("http://backend/static/gallery/generated.png"))
    }

    async fn detect_objects(&self, image: UploadImage) -> Result<Vec<DetectedObject>, ApiClientError> {
        self.record(format!("detect {}", image.file_name))?;
        Ok(self.objects.clone())
    }

    async fn inpaint(&self, request: InpaintRequest) -> Result<ImageRef, ApiClientError> {
        self.record(format!("inpaint {} {}x{}", request.image.file_name, request.mask.width, request.mask.height))?;
        Ok(remote("http://backend/static/gallery/inpainted.png"))
    }

    async fn fetch_gallery(&self) -> Result<Vec<GalleryImage>, ApiClientError> {
        self.record("gallery".to_string())?;
        Ok(vec![GalleryImage {
            id: "a.png".to_string(),
            url: "http://backend/static/gallery/a.png".to_string(),
        }])
    }

    async fn list_products(&self) -> Result<Vec<Product>, ApiClientError> {
        self.record("products".to_string())?;
        Ok(vec![product("7", "Rattan Chair", "chair")])
    }

    async fn add_product(&self, token: &AuthToken, product: NewProduct) -> Result<Product, ApiClientError> {
        self.record(format!("add {} {}", token.access_token, product.name))?;
        Ok(self::product("42", &product.name, &product.category))
    }

    async fn delete_product(&self, token: &AuthToken, id: &str) -> Result<(), ApiClientError> {
        self.record(format!("delete {} {id}", token.access_token))
    }

    async fn login(&self, username: &str, _password: &str) -> Result<AuthToken, ApiClientError> {
        self.record(format!("login {username}"))?;
        Ok(token())
    }

    async fn fetch_image(&self, image: &ImageRef) -> Result<Vec<u8>, ApiClientError> {
        self.record(format!("fetch {image}"))?;
        Ok(self.image.clone())
    }
}
