//! Clipboard abstraction layer
//!
//! The store and the preview renderer never talk to the platform clipboard
//! directly. They go through [`ClipboardProvider`], which reads the clipboard
//! as plain text or a PNG image and writes either back.

use async_trait::async_trait;
use thiserror::Error;

use crate::imaging::ImagingError;

pub mod memory;
pub mod system;

pub use memory::MemoryClipboard;
pub use system::SystemClipboard;

/// Clipboard content as seen by ClipDrop
///
/// Images are always PNG-encoded; providers normalize whatever the platform
/// hands them before returning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ClipboardContent {
    /// Nothing readable (empty clipboard or an unsupported type)
    #[default]
    Empty,
    /// Plain UTF-8 text
    Text(String),
    /// PNG-encoded image bytes
    Image(Vec<u8>),
}

impl ClipboardContent {
    /// Create new text content
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Create new image content from PNG bytes
    pub fn png(data: Vec<u8>) -> Self {
        Self::Image(data)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Get size of content in bytes
    pub fn size(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Text(text) => text.len(),
            Self::Image(data) => data.len(),
        }
    }
}

/// Clipboard provider trait
#[async_trait]
pub trait ClipboardProvider: Send + Sync {
    /// Read the current clipboard content
    async fn read(&self) -> Result<ClipboardContent, ClipboardError>;

    /// Overwrite the clipboard
    async fn write(&self, content: &ClipboardContent) -> Result<(), ClipboardError>;

    /// Get provider name
    fn name(&self) -> &str;
}

/// Clipboard errors
#[derive(Debug, Error)]
pub enum ClipboardError {
    /// Platform-specific error
    #[error("Platform error: {0}")]
    Platform(String),

    /// Image could not be converted to or from PNG
    #[error("Image conversion failed: {0}")]
    Image(#[from] ImagingError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Create a clipboard provider for the current platform
pub fn create_provider() -> Result<Box<dyn ClipboardProvider>, ClipboardError> {
    Ok(Box::new(SystemClipboard::new()))
}
