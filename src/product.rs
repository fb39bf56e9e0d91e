//! One product as an atomic layout unit.

use crate::config::CatalogueConfig;
use crate::markup;
use crate::model::{CatalogueSettings, ProductRecord};
use crate::resolver::{ImageJob, RasterImage, ResolvedImage};
use crate::style::{MAX_IMAGES_PER_PRODUCT, PRODUCT_IMAGE_BOX};
use crate::token::FormattingToken;

/// Label shown when a product's category id is not in the lookup.
pub const UNKNOWN_CATEGORY: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockLink {
    pub label: String,
    pub url: String,
}

/// Everything rendered for one product, in display order.
#[derive(Debug, Clone)]
pub struct ProductBlock {
    pub product_id: String,
    /// `"{index}. {name}"`, index starting at 1.
    pub title: String,
    pub category: String,
    pub price: String,
    pub description: Vec<FormattingToken>,
    /// Successfully resolved images only, in original order.
    pub images: Vec<RasterImage>,
    pub links: Vec<BlockLink>,
}

impl ProductBlock {
    /// `resolved` holds the outcomes for [`image_jobs`] of the same product.
    pub fn build(
        index: usize,
        product: &ProductRecord,
        category_name: Option<&str>,
        resolved: Vec<ResolvedImage>,
        settings: &CatalogueSettings,
        config: &CatalogueConfig,
    ) -> Self {
        let images = resolved
            .into_iter()
            .take(MAX_IMAGES_PER_PRODUCT)
            .filter_map(ResolvedImage::into_raster)
            .collect();

        Self {
            product_id: product.id.clone(),
            title: format!("{}. {}", index, product.name.trim()),
            category: category_name.unwrap_or(UNKNOWN_CATEGORY).to_string(),
            price: format_price(product.price, &config.currency_symbol),
            description: markup::parse(&product.description),
            images,
            links: product_links(product, settings, &config.currency_symbol),
        }
    }
}

/// Image references of `product` that are worth resolving, first three only.
pub fn image_jobs(product: &ProductRecord) -> Vec<ImageJob<'_>> {
    product
        .images
        .iter()
        .take(MAX_IMAGES_PER_PRODUCT)
        .enumerate()
        .map(|(slot, image)| ImageJob {
            label: format!("product {} image {}", product.id, slot + 1),
            image,
            target: PRODUCT_IMAGE_BOX,
        })
        .collect()
}

/// Two decimals with thousands grouping, e.g. `₹1,234.50`.
pub fn format_price(price: f64, symbol: &str) -> String {
    // Zero, negatives (including -0.0) and NaN all print as "0.00".
    let price = if price.is_finite() && price > 0.0 { price } else { 0.0 };
    let fixed = format!("{price:.2}");
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{symbol}{grouped}.{cents}")
}

fn product_links(
    product: &ProductRecord,
    settings: &CatalogueSettings,
    currency_symbol: &str,
) -> Vec<BlockLink> {
    let mut links = Vec::new();

    if let Some(video) = product
        .youtube_link
        .as_deref()
        .map(str::trim)
        .filter(|url| url.starts_with("http://") || url.starts_with("https://"))
    {
        links.push(BlockLink {
            label: "Watch video".to_string(),
            url: video.to_string(),
        });
    }

    let digits: String = settings
        .whatsapp_number
        .chars()
        .filter(char::is_ascii_digit)
        .collect();
    if !digits.is_empty() {
        let message = format!(
            "Hi, I'm interested in {} ({})",
            product.name.trim(),
            format_price(product.price, currency_symbol)
        );
        let base = format!("https://wa.me/{digits}");
        if let Ok(url) = reqwest::Url::parse_with_params(&base, &[("text", message)]) {
            links.push(BlockLink {
                label: "Enquire on WhatsApp".to_string(),
                url: url.to_string(),
            });
        }
    }

    links
}
