//! Image acquisition: inline data URIs and remote URLs to embeddable PNGs.
//!
//! Resolution never fails outward. Every problem ends as
//! [`ResolvedImage::Absent`] and a `warn!` carrying the [`ImageError`].

use std::io::Cursor;
use std::time::{Duration, Instant};

use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::{DynamicImage, ImageFormat, imageops::FilterType};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::{FetchError, ImageError};
use crate::model::ImageRef;
use crate::style::{DisplayBox, MAX_PIXELS_PER_POINT};

/// A decoded image, re-encoded as PNG, with its display size.
#[derive(Debug, Clone)]
pub struct RasterImage {
    pub png: Vec<u8>,
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub display: DisplayBox,
}

/// Outcome of resolving one image reference.
#[derive(Debug, Clone)]
pub enum ResolvedImage {
    Resolved(RasterImage),
    Absent,
}

impl ResolvedImage {
    pub fn is_absent(&self) -> bool {
        matches!(self, ResolvedImage::Absent)
    }

    pub fn into_raster(self) -> Option<RasterImage> {
        match self {
            ResolvedImage::Resolved(raster) => Some(raster),
            ResolvedImage::Absent => None,
        }
    }
}

/// Fetches raw bytes for remote image references.
///
/// Injected into the generator so the caller owns the client's lifecycle.
pub trait ImageFetcher: Send + Sync {
    fn fetch(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, FetchError>;
}

/// [`ImageFetcher`] over a blocking `reqwest` client. No retries.
///
/// Must not be used from inside an async runtime.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("catalogue/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        Ok(Self { client })
    }
}

impl ImageFetcher for HttpFetcher {
    fn fetch(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, FetchError> {
        let to_fetch_error = |e: reqwest::Error| {
            if e.is_timeout() {
                FetchError::Timeout(timeout.as_millis())
            } else {
                FetchError::Transport(e.to_string())
            }
        };

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .map_err(to_fetch_error)?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        let bytes = response.bytes().map_err(to_fetch_error)?;
        debug!("Fetched {} bytes from {}", bytes.len(), url);
        Ok(bytes.to_vec())
    }
}

/// Time limits applied to remote fetches.
#[derive(Debug, Clone, Copy)]
pub struct FetchLimits {
    pub timeout: Duration,
    /// Fetches not finished by this instant count as absent.
    pub deadline: Option<Instant>,
}

impl FetchLimits {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Timeout for a fetch starting now, `None` once the deadline has passed.
    fn timeout_from_now(&self) -> Option<Duration> {
        match self.deadline {
            Some(deadline) => deadline
                .checked_duration_since(Instant::now())
                .filter(|left| !left.is_zero())
                .map(|left| left.min(self.timeout)),
            None => Some(self.timeout),
        }
    }
}

/// Resolve one reference into a raster fitted to `target`.
pub fn resolve(
    image: &ImageRef,
    target: DisplayBox,
    fetcher: &dyn ImageFetcher,
    limits: &FetchLimits,
) -> ResolvedImage {
    match try_resolve(image, target, fetcher, limits) {
        Ok(raster) => ResolvedImage::Resolved(raster),
        Err(e) => {
            warn!("Image unavailable: {}", e);
            ResolvedImage::Absent
        }
    }
}

/// Same as [`resolve`] but keeps the failure reason.
pub fn try_resolve(
    image: &ImageRef,
    target: DisplayBox,
    fetcher: &dyn ImageFetcher,
    limits: &FetchLimits,
) -> Result<RasterImage, ImageError> {
    let bytes = match image {
        ImageRef::InlineEncoded { payload, .. } => STANDARD.decode(payload.trim())?,
        ImageRef::RemoteUrl(url) => {
            let timeout = limits
                .timeout_from_now()
                .ok_or_else(|| ImageError::DeadlineExpired(url.clone()))?;
            fetcher
                .fetch(url, timeout)
                .map_err(|source| ImageError::Fetch {
                    url: url.clone(),
                    source,
                })?
        }
        ImageRef::Unsupported(raw) => {
            let shown: String = raw.chars().take(48).collect();
            return Err(ImageError::Unsupported(shown));
        }
    };

    decode(&bytes, target)
}

fn decode(bytes: &[u8], target: DisplayBox) -> Result<RasterImage, ImageError> {
    let img = downscale(image::load_from_memory(bytes)?, target);

    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

    Ok(RasterImage {
        png,
        pixel_width: img.width(),
        pixel_height: img.height(),
        display: target.fit(img.width(), img.height()),
    })
}

/// Shrink rasters far larger than they will ever be displayed.
fn downscale(img: DynamicImage, target: DisplayBox) -> DynamicImage {
    let max_width = (target.width * MAX_PIXELS_PER_POINT).ceil() as u32;
    let max_height = (target.height * MAX_PIXELS_PER_POINT).ceil() as u32;
    if img.width() <= max_width && img.height() <= max_height {
        return img;
    }
    debug!(
        "Downscaling {}x{} image to fit {}x{}",
        img.width(),
        img.height(),
        max_width,
        max_height
    );
    img.resize(max_width, max_height, FilterType::Triangle)
}

/// One image to resolve as part of a batch.
#[derive(Debug, Clone)]
pub struct ImageJob<'a> {
    /// Used in log messages only.
    pub label: String,
    pub image: &'a ImageRef,
    pub target: DisplayBox,
}

/// Resolve a batch on a pool of `workers` threads.
///
/// The result at index `i` always belongs to `jobs[i]`.
pub fn resolve_all(
    jobs: &[ImageJob<'_>],
    fetcher: &dyn ImageFetcher,
    limits: &FetchLimits,
    workers: usize,
) -> Vec<ResolvedImage> {
    let resolve_job = |job: &ImageJob<'_>| match try_resolve(job.image, job.target, fetcher, limits)
    {
        Ok(raster) => ResolvedImage::Resolved(raster),
        Err(e) => {
            warn!("{}: image unavailable: {}", job.label, e);
            ResolvedImage::Absent
        }
    };

    if jobs.is_empty() {
        return Vec::new();
    }

    match rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .build()
    {
        Ok(pool) => {
            debug!("Resolving {} images on {} workers", jobs.len(), workers.max(1));
            pool.install(|| jobs.par_iter().map(resolve_job).collect())
        }
        Err(e) => {
            warn!("Image pool unavailable ({}), resolving sequentially", e);
            jobs.iter().map(resolve_job).collect()
        }
    }
}
