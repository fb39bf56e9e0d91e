//! Turns a [`DocumentRequest`] into a finished PDF.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use chrono::{Datelike, Local, NaiveDateTime};
use tracing::{debug, info};
use typst_as_lib::TypstEngine;
use typst_as_lib::typst_kit_options::TypstKitFontOptions;
use typst_library::layout::PagedDocument;
use typst_pdf::PdfOptions;

use crate::config::Config;
use crate::decorate::{PageDecoration, decorate};
use crate::error::CatalogueError;
use crate::model::{CatalogueSettings, DocumentRequest, RenderedDocument};
use crate::product::{ProductBlock, image_jobs};
use crate::resolver::{FetchLimits, ImageFetcher, ImageJob, RasterImage, resolve_all};
use crate::style::LOGO_BOX;
use crate::typst;

/// Decorations live in the page margins, so the page count normally settles
/// on the second pass.
const MAX_DECORATION_PASSES: usize = 3;

/// Title section at the top of the first page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cover {
    pub title: String,
    pub subtitle: String,
    pub generated_on: String,
    pub product_count: usize,
    /// Distinct category ids across the requested products.
    pub category_count: usize,
}

/// All flow content of a catalogue, in order, with images resolved.
#[derive(Debug, Clone)]
pub struct CatalogueLayout {
    pub logo: Option<RasterImage>,
    pub cover: Cover,
    pub blocks: Vec<ProductBlock>,
}

/// Generates catalogue PDFs.
///
/// Holds no per-document state, so one generator can serve many requests.
pub struct CatalogueGenerator {
    config: Config,
    fetcher: Arc<dyn ImageFetcher>,
}

impl CatalogueGenerator {
    pub fn new(config: Config, fetcher: Arc<dyn ImageFetcher>) -> Self {
        Self { config, fetcher }
    }

    /// Generate a catalogue stamped with the current local time.
    pub fn generate(&self, request: &DocumentRequest) -> Result<RenderedDocument, CatalogueError> {
        self.generate_at(request, Local::now().naive_local())
    }

    /// Like [`generate`](Self::generate), but image fetches still running at
    /// `deadline` are abandoned and their images left out.
    pub fn generate_with_deadline(
        &self,
        request: &DocumentRequest,
        deadline: Instant,
    ) -> Result<RenderedDocument, CatalogueError> {
        let limits = self.fetch_limits().with_deadline(deadline);
        let layout = self.layout(request, Local::now().naive_local(), &limits);
        self.render(&layout, &request.settings)
    }

    /// Generate a catalogue stamped with `generated_at`. Output is
    /// byte-identical for identical inputs and images.
    pub fn generate_at(
        &self,
        request: &DocumentRequest,
        generated_at: NaiveDateTime,
    ) -> Result<RenderedDocument, CatalogueError> {
        let layout = self.layout(request, generated_at, &self.fetch_limits());
        self.render(&layout, &request.settings)
    }

    /// The final Typst source for `request`, decorations included.
    pub fn render_source(
        &self,
        request: &DocumentRequest,
        generated_at: NaiveDateTime,
    ) -> Result<String, CatalogueError> {
        let layout = self.layout(request, generated_at, &self.fetch_limits());
        let (source, _) = self.paginate(&layout, &request.settings)?;
        Ok(source)
    }

    /// Resolve every image and build the flow content.
    pub fn layout(
        &self,
        request: &DocumentRequest,
        generated_at: NaiveDateTime,
        limits: &FetchLimits,
    ) -> CatalogueLayout {
        let products = &request.products;
        info!("Laying out catalogue: {} products", products.len());

        let mut jobs: Vec<ImageJob<'_>> = Vec::new();
        let logo_ref = request.settings.logo_ref();
        if let Some(logo) = logo_ref {
            jobs.push(ImageJob {
                label: "logo".to_string(),
                image: logo,
                target: LOGO_BOX,
            });
        }
        let mut per_product = Vec::with_capacity(products.len());
        for product in products {
            let product_jobs = image_jobs(product);
            per_product.push(product_jobs.len());
            jobs.extend(product_jobs);
        }

        let mut resolved =
            resolve_all(&jobs, self.fetcher.as_ref(), limits, self.config.images.workers)
                .into_iter();

        let logo = match logo_ref {
            Some(_) => resolved.next().and_then(|image| image.into_raster()),
            None => None,
        };

        let blocks: Vec<ProductBlock> = products
            .iter()
            .zip(per_product)
            .enumerate()
            .map(|(i, (product, count))| {
                let images = resolved.by_ref().take(count).collect();
                ProductBlock::build(
                    i + 1,
                    product,
                    request.categories.get(&product.category_id),
                    images,
                    &request.settings,
                    &self.config.catalogue,
                )
            })
            .collect();

        let category_count = products
            .iter()
            .map(|p| p.category_id.as_str())
            .collect::<HashSet<_>>()
            .len();

        CatalogueLayout {
            logo,
            cover: Cover {
                title: format!("{} {}", self.config.catalogue.title, generated_at.year()),
                subtitle: self.config.catalogue.subtitle.clone(),
                generated_on: format!("Generated on {}", generated_at.format("%d %B %Y, %H:%M")),
                product_count: products.len(),
                category_count,
            },
            blocks,
        }
    }

    fn render(
        &self,
        layout: &CatalogueLayout,
        settings: &CatalogueSettings,
    ) -> Result<RenderedDocument, CatalogueError> {
        let (_, doc) = self.paginate(layout, settings)?;

        let bytes = typst_pdf::pdf(&doc, &PdfOptions::default())
            .map_err(|e| CatalogueError::Pdf(format!("{:?}", e)))?;

        info!(
            "Catalogue ready: {} pages, {} bytes",
            doc.pages.len(),
            bytes.len()
        );
        Ok(RenderedDocument {
            bytes,
            page_count: doc.pages.len(),
        })
    }

    /// Compile until every physical page has its own decoration.
    fn paginate(
        &self,
        layout: &CatalogueLayout,
        settings: &CatalogueSettings,
    ) -> Result<(String, PagedDocument), CatalogueError> {
        let assets = typst::assets(layout);
        let mut decorations: Vec<PageDecoration> = Vec::new();
        let mut source = typst::layout_to_typst(layout, &decorations);
        let mut doc = compile(&source, &assets)?;

        for pass in 1..=MAX_DECORATION_PASSES {
            let pages = doc.pages.len();
            if decorations.len() == pages {
                break;
            }
            debug!("Decoration pass {}: {} pages", pass, pages);
            decorations = (1..=pages).map(|page| decorate(page, settings)).collect();
            source = typst::layout_to_typst(layout, &decorations);
            doc = compile(&source, &assets)?;
        }

        Ok((source, doc))
    }

    fn fetch_limits(&self) -> FetchLimits {
        FetchLimits::new(self.config.images.fetch_timeout())
    }
}

/// Compile Typst source with the given images available by path.
fn compile(source: &str, assets: &[(String, &[u8])]) -> Result<PagedDocument, CatalogueError> {
    let font_options = TypstKitFontOptions::new()
        .include_embedded_fonts(true)
        .include_system_fonts(false);

    let files: Vec<(&str, Vec<u8>)> = assets
        .iter()
        .map(|(path, bytes)| (path.as_str(), bytes.to_vec()))
        .collect();

    let engine = TypstEngine::builder()
        .main_file(source.to_string())
        .search_fonts_with(font_options)
        .with_static_file_resolver(files)
        .build();

    engine
        .compile()
        .output
        .map_err(|e| CatalogueError::Compile(format!("{:?}", e)))
}
