//! # ClipDrop
//!
//! Clipboard history saver for macOS and Linux.
//!
//! ClipDrop captures the current clipboard (plain text or a raster image),
//! keeps it in a bounded newest-first history on disk, suppresses consecutive
//! duplicates, and renders any stored clip back into a self-contained preview
//! document that can copy its content back to the clipboard.

pub mod app;
pub mod cli;
pub mod clipboard;
pub mod config;
pub mod history;
pub mod imaging;
pub mod menu;
pub mod preview;

pub use app::{ClipDrop, SaveOutcome};
pub use config::Settings;
pub use history::{ClipKind, ClipPayload, ClipRecord, ClipStore};

/// Result type alias for ClipDrop operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for ClipDrop operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Clip store error
    #[error("Store error: {0}")]
    Store(#[from] history::StoreError),

    /// Clipboard operation error
    #[error("Clipboard error: {0}")]
    Clipboard(#[from] clipboard::ClipboardError),
}

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
