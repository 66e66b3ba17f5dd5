//! Application facade tying settings, store, clipboard and preview window
//!
//! Every shell entry point (menu item, global hotkey, CLI command) goes
//! through [`ClipDrop`], so captures from different triggers are serialized
//! by the same store lock.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use crate::clipboard::{ClipboardContent, ClipboardProvider};
use crate::config::Settings;
use crate::history::{self, CaptureOutcome, ClipPayload, ClipRecord, ClipStore};
use crate::menu::{build_menu, MenuEntry};
use crate::preview::{self, CopyOutcome, Document, PreviewWindow, ToggleOutcome, WindowState};
use crate::Result;

/// Result of saving the clipboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(ClipRecord),
    /// Same as the most recent clip
    Duplicate,
    /// Nothing readable on the clipboard
    Empty,
}

pub struct ClipDrop {
    settings: Settings,
    store: ClipStore,
    clipboard: Arc<dyn ClipboardProvider>,
    window: Mutex<PreviewWindow>,
}

impl ClipDrop {
    pub fn new(settings: Settings, clipboard: Arc<dyn ClipboardProvider>) -> Result<Self> {
        let store = ClipStore::from_settings(&settings)?;
        let window = PreviewWindow::new(settings.window.clone());

        Ok(Self {
            settings,
            store,
            clipboard,
            window: Mutex::new(window),
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &ClipStore {
        &self.store
    }

    /// Capture whatever is on the clipboard now
    pub async fn save_clipboard(&self) -> Result<SaveOutcome> {
        self.save_clipboard_at(history::now()).await
    }

    pub async fn save_clipboard_at(&self, now: i64) -> Result<SaveOutcome> {
        let payload = match self.clipboard.read().await? {
            ClipboardContent::Empty => {
                info!("Clipboard is empty, nothing to save");
                return Ok(SaveOutcome::Empty);
            }
            ClipboardContent::Text(text) => ClipPayload::Text(text),
            ClipboardContent::Image(png) => ClipPayload::Image(png),
        };

        Ok(match self.store.capture_at(payload, now).await? {
            CaptureOutcome::Captured(record) => SaveOutcome::Saved(record),
            CaptureOutcome::Duplicate => SaveOutcome::Duplicate,
        })
    }

    /// Drop every clip and close the preview
    pub async fn clear_all(&self) -> Result<()> {
        self.store.clear().await?;
        self.window.lock().await.hide();
        Ok(())
    }

    pub async fn menu(&self) -> Vec<MenuEntry> {
        self.menu_at(history::now()).await
    }

    pub async fn menu_at(&self, now: i64) -> Vec<MenuEntry> {
        build_menu(&self.store.list().await, now)
    }

    /// Toggle the preview for clip `id`; `None` if no such clip exists
    pub async fn activate(&self, id: i64) -> Option<ToggleOutcome> {
        self.activate_at(id, history::now()).await
    }

    pub async fn activate_at(&self, id: i64, now: i64) -> Option<ToggleOutcome> {
        let record = self.store.get(id).await?;
        let mut window = self.window.lock().await;
        Some(window.toggle(record, self.store.dir(), now))
    }

    /// Handle a copy request raised by the displayed document
    pub async fn copy_requested(&self) -> Result<CopyOutcome> {
        let window = self.window.lock().await;
        Ok(window
            .copy_requested(self.store.dir(), self.clipboard.as_ref())
            .await?)
    }

    pub async fn window_state(&self) -> WindowState {
        self.window.lock().await.state().clone()
    }

    /// Document currently on display
    pub async fn displayed_document(&self) -> Option<Document> {
        let window = self.window.lock().await;
        window.current().and(window.document().cloned())
    }

    /// Render clip `id` without touching the window
    pub async fn render(&self, id: i64) -> Option<Document> {
        let record = self.store.get(id).await?;
        Some(preview::render(&record, self.store.dir(), history::now()))
    }

    /// Copy clip `id` straight to the clipboard; `None` if no such clip
    pub async fn copy_clip(&self, id: i64) -> Result<Option<CopyOutcome>> {
        let Some(record) = self.store.get(id).await else {
            return Ok(None);
        };
        let outcome =
            preview::copy_back(&record, self.store.dir(), self.clipboard.as_ref()).await?;
        Ok(Some(outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;
    use tempfile::TempDir;

    fn app(dir: &std::path::Path, clipboard: Arc<MemoryClipboard>) -> ClipDrop {
        let settings = Settings {
            store_dir: dir.to_path_buf(),
            max_clips: 5,
            ..Settings::default()
        };
        ClipDrop::new(settings, clipboard).unwrap()
    }

    #[tokio::test]
    async fn test_empty_clipboard_saves_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let app = app(temp_dir.path(), Arc::new(MemoryClipboard::new()));

        assert_eq!(app.save_clipboard().await.unwrap(), SaveOutcome::Empty);
        assert!(app.menu().await.is_empty());
    }

    #[tokio::test]
    async fn test_save_then_duplicate() {
        let temp_dir = TempDir::new().unwrap();
        let clipboard = Arc::new(MemoryClipboard::with_content(ClipboardContent::text("hi")));
        let app = app(temp_dir.path(), clipboard);

        assert!(matches!(
            app.save_clipboard_at(100).await.unwrap(),
            SaveOutcome::Saved(_)
        ));
        assert_eq!(
            app.save_clipboard_at(101).await.unwrap(),
            SaveOutcome::Duplicate
        );
    }

    #[tokio::test]
    async fn test_clear_hides_window() {
        let temp_dir = TempDir::new().unwrap();
        let clipboard = Arc::new(MemoryClipboard::with_content(ClipboardContent::text("x")));
        let app = app(temp_dir.path(), clipboard);

        app.save_clipboard_at(100).await.unwrap();
        assert_eq!(app.activate_at(100, 100).await, Some(ToggleOutcome::Shown));
        assert!(app.displayed_document().await.is_some());

        app.clear_all().await.unwrap();
        assert_eq!(app.window_state().await, WindowState::Hidden);
        assert!(app.displayed_document().await.is_none());
        assert_eq!(app.activate_at(100, 100).await, None);
    }
}
