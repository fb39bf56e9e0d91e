//! Printable product catalogue generation.
//!
//! A [`DocumentRequest`] (products, category names, branding settings)
//! becomes a paginated PDF with a cover, one unsplittable block per product
//! and a header and footer on every page. Layout and PDF output go through
//! Typst.

mod compose;
mod config;
mod decorate;
mod error;
mod markup;
mod model;
mod product;
mod resolver;
mod style;
#[cfg(test)]
mod testing;
mod token;
mod typst;

pub use compose::{CatalogueGenerator, CatalogueLayout, Cover};
pub use config::{CatalogueConfig, Config, ImagesConfig};
pub use decorate::{FooterBand, HeaderBand, PageDecoration, decorate};
pub use error::{CatalogueError, FetchError, ImageError};
pub use model::{
    CONTENT_TYPE, CatalogueSettings, CategoryNames, DocumentRequest, FILE_NAME, ImageRef,
    ProductRecord, RenderedDocument,
};
pub use product::{BlockLink, ProductBlock, UNKNOWN_CATEGORY, format_price};
pub use resolver::{
    FetchLimits, HttpFetcher, ImageFetcher, ImageJob, RasterImage, ResolvedImage, resolve,
    resolve_all, try_resolve,
};
pub use style::DisplayBox;
pub use token::{FormattingToken, Span};

/// Parse a product description into formatting tokens.
pub fn parse(description: &str) -> Vec<FormattingToken> {
    markup::parse(description)
}
