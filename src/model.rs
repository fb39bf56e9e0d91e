//! Input and output values of one catalogue generation call.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CatalogueError;

/// File name callers should offer the finished document under.
pub const FILE_NAME: &str = "United_Copier_Catalogue.pdf";

/// Content type of the finished document.
pub const CONTENT_TYPE: &str = "application/pdf";

/// A product as stored in the record store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: String,
    pub name: String,
    /// Raw description markup (see [`crate::parse`]).
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub category_id: String,
    #[serde(default)]
    pub images: Vec<ImageRef>,
    #[serde(default)]
    pub youtube_link: Option<String>,
}

/// Where an image's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ImageRef {
    /// A `data:image/...;base64,` URI. The payload is decoded at resolve time.
    InlineEncoded { mime: String, payload: String },
    /// An `http://` or `https://` URL.
    RemoteUrl(String),
    /// Anything else. Never resolves.
    Unsupported(String),
}

impl ImageRef {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Some(rest) = trimmed.strip_prefix("data:image") {
            if let Some((header, payload)) = rest.split_once(',') {
                let mime = header
                    .trim_start_matches('/')
                    .split(';')
                    .next()
                    .unwrap_or_default();
                return ImageRef::InlineEncoded {
                    mime: format!("image/{mime}"),
                    payload: payload.to_string(),
                };
            }
        } else if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            return ImageRef::RemoteUrl(trimmed.to_string());
        }
        ImageRef::Unsupported(raw.to_string())
    }
}

impl From<String> for ImageRef {
    fn from(raw: String) -> Self {
        ImageRef::parse(&raw)
    }
}

impl From<&str> for ImageRef {
    fn from(raw: &str) -> Self {
        ImageRef::parse(raw)
    }
}

impl From<ImageRef> for String {
    fn from(image: ImageRef) -> Self {
        match image {
            ImageRef::InlineEncoded { mime, payload } => format!("data:{mime};base64,{payload}"),
            ImageRef::RemoteUrl(url) => url,
            ImageRef::Unsupported(raw) => raw,
        }
    }
}

/// Branding and contact details shown on the cover and page decorations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogueSettings {
    pub logo: Option<ImageRef>,
    pub company_name: String,
    pub tagline: String,
    pub address: String,
    pub phone: String,
    pub whatsapp_number: String,
    pub branches: String,
}

impl CatalogueSettings {
    /// The logo reference, treating an empty string as no logo.
    pub fn logo_ref(&self) -> Option<&ImageRef> {
        self.logo
            .as_ref()
            .filter(|logo| !matches!(logo, ImageRef::Unsupported(raw) if raw.trim().is_empty()))
    }
}

impl Default for CatalogueSettings {
    fn default() -> Self {
        Self {
            logo: None,
            company_name: "United Copier".to_string(),
            tagline: "All Solutions Under A Roof for Printers".to_string(),
            address: "118, Jaora Compound, Indore".to_string(),
            phone: "8103349299".to_string(),
            whatsapp_number: String::new(),
            branches: "Bhopal & Jabalpur".to_string(),
        }
    }
}

/// Category id to display name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryNames(HashMap<String, String>);

impl CategoryNames {
    pub fn get(&self, category_id: &str) -> Option<&str> {
        self.0.get(category_id).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CategoryNames {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Everything the generator needs for one document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentRequest {
    pub products: Vec<ProductRecord>,
    #[serde(default)]
    pub categories: CategoryNames,
    #[serde(default)]
    pub settings: CatalogueSettings,
}

/// A finished PDF.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

impl RenderedDocument {
    pub fn write_to(&self, path: &Path) -> Result<(), CatalogueError> {
        fs::write(path, &self.bytes).map_err(|source| CatalogueError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}
