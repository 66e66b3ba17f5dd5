//! In-process clipboard, for tests and headless runs

use std::sync::Mutex;

use async_trait::async_trait;

use super::{ClipboardContent, ClipboardError, ClipboardProvider};

/// Clipboard that lives entirely in memory
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    content: Mutex<ClipboardContent>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clipboard already holding `content`
    pub fn with_content(content: ClipboardContent) -> Self {
        Self {
            content: Mutex::new(content),
        }
    }

    /// Snapshot of the current content
    pub fn contents(&self) -> ClipboardContent {
        self.lock().clone()
    }

    /// Replace the content without going through the provider interface
    pub fn set(&self, content: ClipboardContent) {
        *self.lock() = content;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ClipboardContent> {
        // A poisoned lock still holds a complete value
        self.content.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl ClipboardProvider for MemoryClipboard {
    async fn read(&self) -> Result<ClipboardContent, ClipboardError> {
        Ok(self.contents())
    }

    async fn write(&self, content: &ClipboardContent) -> Result<(), ClipboardError> {
        self.set(content.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
