//! Fixed page geometry, colours and type sizes. All lengths are in points.

/// A box an image is scaled to fit inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayBox {
    pub width: f64,
    pub height: f64,
}

impl DisplayBox {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Largest size with the given aspect ratio that fits inside this box.
    pub fn fit(&self, pixel_width: u32, pixel_height: u32) -> DisplayBox {
        if pixel_width == 0 || pixel_height == 0 {
            return *self;
        }
        let scale = (self.width / pixel_width as f64).min(self.height / pixel_height as f64);
        DisplayBox::new(pixel_width as f64 * scale, pixel_height as f64 * scale)
    }
}

pub const PAGE_WIDTH: f64 = 595.28;
pub const PAGE_HEIGHT: f64 = 841.89;
pub const MARGIN_X: f64 = 54.0;
pub const MARGIN_TOP: f64 = 72.0;
pub const MARGIN_BOTTOM: f64 = 108.0;

pub const BODY_WIDTH: f64 = PAGE_WIDTH - 2.0 * MARGIN_X;
pub const BODY_HEIGHT: f64 = PAGE_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;

pub const LOGO_BOX: DisplayBox = DisplayBox::new(180.0, 86.4);
pub const PRODUCT_IMAGE_BOX: DisplayBox = DisplayBox::new(144.0, 108.0);
pub const IMAGE_GUTTER: f64 = 10.0;

/// Images embedded at most this many pixels per display point.
pub const MAX_PIXELS_PER_POINT: f64 = 3.0;

/// Products show at most this many images; the rest are dropped.
pub const MAX_IMAGES_PER_PRODUCT: usize = 3;

pub const HEADER_BAND: &str = "#3b82f6";
pub const FOOTER_BAND: &str = "#f2f2f7";
pub const FOOTER_TEXT: &str = "#33334d";
pub const FOOTER_MUTED: &str = "#808099";
pub const TITLE: &str = "#2563eb";
pub const SUBTITLE: &str = "#6366f1";
pub const PRODUCT_NAME: &str = "#1e40af";
pub const CATEGORY_LABEL: &str = "#8b5cf6";
pub const CATEGORY_VALUE: &str = "#6366f1";
pub const PRICE: &str = "#059669";
pub const BODY_TEXT: &str = "#1f2937";
pub const SEPARATOR: &str = "#93c5fd";
pub const LINK: &str = "#1a4f8b";

pub const TITLE_SIZE: f64 = 28.0;
pub const SUBTITLE_SIZE: f64 = 12.0;
pub const PRODUCT_NAME_SIZE: f64 = 18.0;
pub const PRICE_SIZE: f64 = 16.0;
pub const BODY_SIZE: f64 = 10.0;
pub const FOOTER_COMPANY_SIZE: f64 = 12.0;
pub const FOOTER_SIZE: f64 = 8.0;

pub const BLOCK_SPACING: f64 = 20.0;
pub const PARAGRAPH_SPACING: f64 = 6.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_preserves_aspect_ratio() {
        let close = |a: f64, b: f64| (a - b).abs() < 1e-9;

        let fitted = PRODUCT_IMAGE_BOX.fit(400, 100);
        assert!(close(fitted.width, 144.0));
        assert!(close(fitted.height, 36.0));

        let fitted = PRODUCT_IMAGE_BOX.fit(100, 400);
        assert!(close(fitted.height, 108.0));
        assert!(close(fitted.width, 27.0));
    }

    #[test]
    fn three_images_fit_on_one_row() {
        let row = 3.0 * PRODUCT_IMAGE_BOX.width + 2.0 * IMAGE_GUTTER;
        assert!(row <= BODY_WIDTH);
    }
}
