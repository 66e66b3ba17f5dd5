//! System clipboard implementation using arboard
//!
//! A fresh `arboard::Clipboard` is opened for every operation and the work is
//! done on the blocking pool, so the provider itself is a plain `Send + Sync`
//! value. On X11 the written selection is only served while some process owns
//! it, so a short-lived CLI write may vanish once the process exits unless a
//! clipboard manager picks it up.

use std::borrow::Cow;

use arboard::{Clipboard, ImageData};
use async_trait::async_trait;
use tracing::debug;

use super::{ClipboardContent, ClipboardError, ClipboardProvider};
use crate::imaging;

/// Platform clipboard
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl SystemClipboard {
    pub fn new() -> Self {
        Self
    }
}

fn open() -> Result<Clipboard, ClipboardError> {
    Clipboard::new().map_err(|e| ClipboardError::Platform(e.to_string()))
}

/// Read the clipboard, preferring an image over text
///
/// Screenshots usually carry no text flavor, while rich documents often carry
/// both; checking the image first keeps screenshots from being missed.
fn read_blocking() -> Result<ClipboardContent, ClipboardError> {
    let mut clipboard = open()?;

    match clipboard.get_image() {
        Ok(image) => {
            debug!("Clipboard holds a {}x{} image", image.width, image.height);
            let png = imaging::encode_rgba_png(
                image.width as u32,
                image.height as u32,
                image.bytes.into_owned(),
            )?;
            return Ok(ClipboardContent::Image(png));
        }
        Err(arboard::Error::ContentNotAvailable) => {}
        Err(e) => debug!("Image read failed, trying text: {}", e),
    }

    match clipboard.get_text() {
        Ok(text) if !text.is_empty() => Ok(ClipboardContent::Text(text)),
        Ok(_) | Err(arboard::Error::ContentNotAvailable) => Ok(ClipboardContent::Empty),
        Err(e) => Err(ClipboardError::Platform(e.to_string())),
    }
}

fn write_blocking(content: ClipboardContent) -> Result<(), ClipboardError> {
    let mut clipboard = open()?;

    let result = match content {
        ClipboardContent::Empty => clipboard.clear(),
        ClipboardContent::Text(text) => clipboard.set_text(text),
        ClipboardContent::Image(png) => {
            let (width, height, rgba) = imaging::decode_png_rgba(&png)?;
            clipboard.set_image(ImageData {
                width: width as usize,
                height: height as usize,
                bytes: Cow::Owned(rgba),
            })
        }
    };

    result.map_err(|e| ClipboardError::Platform(e.to_string()))
}

#[async_trait]
impl ClipboardProvider for SystemClipboard {
    async fn read(&self) -> Result<ClipboardContent, ClipboardError> {
        tokio::task::spawn_blocking(read_blocking)
            .await
            .map_err(|e| ClipboardError::Platform(e.to_string()))?
    }

    async fn write(&self, content: &ClipboardContent) -> Result<(), ClipboardError> {
        let content = content.clone();
        tokio::task::spawn_blocking(move || write_blocking(content))
            .await
            .map_err(|e| ClipboardError::Platform(e.to_string()))?
    }

    fn name(&self) -> &str {
        "system"
    }
}
