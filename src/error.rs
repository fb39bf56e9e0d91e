//! Error types.
//!
//! [`CatalogueError`] is fatal: no document is produced. [`ImageError`] is
//! per image and never leaves the resolver; it only explains why an image
//! came back absent.

use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort document generation.
#[derive(Debug, Error)]
pub enum CatalogueError {
    #[error("Typst compilation failed: {0}")]
    Compile(String),

    #[error("PDF generation failed: {0}")]
    Pdf(String),

    #[error("failed to write catalogue to '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a remote fetch produced no bytes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("HTTP {0}")]
    Status(u16),

    #[error("timed out after {0}ms")]
    Timeout(u128),

    #[error("transport error: {0}")]
    Transport(String),
}

/// Why an image reference resolved to nothing.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("undecodable image data: {0}")]
    Decode(#[from] image::ImageError),

    #[error("fetch of '{url}' failed: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("deadline passed before '{0}' could be fetched")]
    DeadlineExpired(String),

    #[error("unsupported image reference '{0}'")]
    Unsupported(String),
}
