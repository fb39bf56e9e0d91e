//! Fixtures shared by unit tests.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

use crate::error::FetchError;
use crate::resolver::ImageFetcher;

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let pixels = RgbaImage::from_pixel(width, height, Rgba([0, 90, 200, 255]));
    let img = DynamicImage::ImageRgba8(pixels);
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("encode png");
    buf
}

pub fn png_data_uri(width: u32, height: u32) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png_bytes(width, height)))
}

/// Serves canned bytes by URL; everything else is a 404. A delay longer
/// than the fetch timeout gives up at the timeout.
#[derive(Default)]
pub struct FakeFetcher {
    responses: HashMap<String, Vec<u8>>,
    delays: HashMap<String, Duration>,
    pub calls: AtomicUsize,
}

impl FakeFetcher {
    pub fn with(mut self, url: &str, bytes: Vec<u8>) -> Self {
        self.responses.insert(url.to_string(), bytes);
        self
    }

    pub fn with_delay(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }
}

impl ImageFetcher for FakeFetcher {
    fn fetch(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(&delay) = self.delays.get(url) {
            if delay > timeout {
                std::thread::sleep(timeout);
                return Err(FetchError::Timeout(timeout.as_millis()));
            }
            std::thread::sleep(delay);
        }
        self.responses
            .get(url)
            .cloned()
            .ok_or(FetchError::Status(404))
    }
}
