//! Data shared between the views, the state container and the backend client.

use crate::error::ViewError;
use crate::geometry::PercentPoint;
use image::{GenericImageView, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Reference to an image the application can display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    /// Served by the backend (generation results, gallery entries).
    Remote(String),
    /// A file on the local disk.
    Local(PathBuf),
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageRef::Remote(url) => f.write_str(url),
            ImageRef::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// One object found by the detection backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedObject {
    pub label: String,
    pub position: PercentPoint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    /// `[x_center, y_center, width, height]`, normalized to 0–1.
    #[serde(rename = "box", default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<[f32; 4]>,
}

impl DetectedObject {
    pub fn new(label: impl Into<String>, x: f32, y: f32) -> Self {
        Self {
            label: label.into(),
            position: PercentPoint::new(x, y),
            confidence: None,
            bbox: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    Scandi,
    #[default]
    Indus,
    Japandi,
    Cyber,
    Lux,
}

impl Style {
    pub const ALL: [Style; 5] = [
        Style::Scandi,
        Style::Indus,
        Style::Japandi,
        Style::Cyber,
        Style::Lux,
    ];

    /// Identifier sent to the generation backend.
    pub fn id(self) -> &'static str {
        match self {
            Style::Scandi => "scandi",
            Style::Indus => "indus",
            Style::Japandi => "japandi",
            Style::Cyber => "cyber",
            Style::Lux => "lux",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Style::Scandi => "Scandinavian",
            Style::Indus => "Industrial",
            Style::Japandi => "Japandi",
            Style::Cyber => "Cyberpunk",
            Style::Lux => "Modern Luxury",
        }
    }

    /// Swatch color as a hex string.
    pub fn swatch(self) -> &'static str {
        match self {
            Style::Scandi => "#e7e5e4",
            Style::Indus => "#3f3f46",
            Style::Japandi => "#fef3c7",
            Style::Cyber => "#701a75",
            Style::Lux => "#0f172a",
        }
    }

    pub fn from_id(id: &str) -> Option<Style> {
        Style::ALL.into_iter().find(|s| s.id() == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryImage {
    pub id: String,
    pub url: String,
}

fn default_category() -> String {
    "default".to_string()
}

fn default_match() -> String {
    "100%".to_string()
}

/// A shoppable product linked to a detected object category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: String,
    /// Image URL or a short glyph for bundled entries.
    pub image: String,
    #[serde(rename = "match", default = "default_match")]
    pub match_score: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default = "default_category")]
    pub category: String,
}

/// Fields submitted when an administrator adds a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub price: String,
    pub link: String,
    pub category: String,
    pub image: SourceImage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    pub access_token: String,
    pub token_type: String,
}

/// An image file picked by the user, kept in memory for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    pub file_name: String,
    pub path: Option<PathBuf>,
    pub bytes: Arc<Vec<u8>>,
}

impl SourceImage {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            path: None,
            bytes: Arc::new(bytes),
        }
    }

    pub fn image_ref(&self) -> ImageRef {
        match &self.path {
            Some(path) => ImageRef::Local(path.clone()),
            None => ImageRef::Local(PathBuf::from(&self.file_name)),
        }
    }
}

/// An image whose bytes have been fetched and decoded.
///
/// Keeps the encoded form for re-upload and the RGBA pixels for display.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub encoded: Arc<Vec<u8>>,
    pub pixels: Arc<RgbaImage>,
}

impl LoadedImage {
    pub fn decode(bytes: Vec<u8>) -> Result<Self, ViewError> {
        let decoded = image::load_from_memory(&bytes)
            .map_err(|e| ViewError::TransientRenderFailure(e.to_string()))?;
        let (width, height) = decoded.dimensions();
        if width == 0 || height == 0 {
            return Err(ViewError::TransientRenderFailure(
                "image has no pixels".to_string(),
            ));
        }
        Ok(Self {
            encoded: Arc::new(bytes),
            pixels: Arc::new(decoded.to_rgba8()),
        })
    }

    /// Natural pixel width.
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Natural pixel height.
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}
