//! Floating preview window model
//!
//! The window is a two-state machine, `Hidden` or `Showing(record)`.
//! Activating the clip already on display hides the window; activating any
//! other clip replaces what is shown. Copy requests always resolve against
//! the record on display at the time of the request.

use std::path::Path;

use tracing::debug;

use super::{copy_back, render, CopyOutcome, Document};
use crate::clipboard::{ClipboardError, ClipboardProvider};
use crate::config::WindowSettings;
use crate::history::ClipRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowState {
    Hidden,
    Showing(ClipRecord),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Shown,
    Hidden,
}

pub struct PreviewWindow {
    geometry: WindowSettings,
    state: WindowState,
    document: Option<Document>,
}

impl PreviewWindow {
    pub fn new(geometry: WindowSettings) -> Self {
        Self {
            geometry,
            state: WindowState::Hidden,
            document: None,
        }
    }

    pub fn geometry(&self) -> &WindowSettings {
        &self.geometry
    }

    pub fn state(&self) -> &WindowState {
        &self.state
    }

    pub fn is_visible(&self) -> bool {
        matches!(self.state, WindowState::Showing(_))
    }

    /// Record on display, if any
    pub fn current(&self) -> Option<&ClipRecord> {
        match &self.state {
            WindowState::Showing(record) => Some(record),
            WindowState::Hidden => None,
        }
    }

    /// Document last rendered for display
    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    /// Render `record` and put it on display
    pub fn show(&mut self, record: ClipRecord, store_dir: &Path, now: i64) -> &Document {
        debug!("Showing clip {}", record.id);
        let document = render(&record, store_dir, now);
        self.state = WindowState::Showing(record);
        self.document.insert(document)
    }

    pub fn hide(&mut self) {
        if self.is_visible() {
            debug!("Hiding preview window");
        }
        self.state = WindowState::Hidden;
    }

    /// Show `record`, or hide the window if `record` is already on display
    pub fn toggle(&mut self, record: ClipRecord, store_dir: &Path, now: i64) -> ToggleOutcome {
        if self.current().map(|r| r.id) == Some(record.id) {
            self.hide();
            ToggleOutcome::Hidden
        } else {
            self.show(record, store_dir, now);
            ToggleOutcome::Shown
        }
    }

    /// Handle the document's copy request for whatever is on display now
    pub async fn copy_requested(
        &self,
        store_dir: &Path,
        clipboard: &dyn ClipboardProvider,
    ) -> Result<CopyOutcome, ClipboardError> {
        match self.current() {
            Some(record) => copy_back(record, store_dir, clipboard).await,
            None => Ok(CopyOutcome::NothingShown),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::{ClipboardContent, MemoryClipboard};
    use crate::history::{ClipBody, ClipKind};
    use tempfile::TempDir;

    fn text(id: i64, content: &str) -> ClipRecord {
        ClipRecord {
            id,
            timestamp: id,
            preview: content.to_string(),
            body: ClipBody::Text {
                content: content.to_string(),
            },
        }
    }

    #[test]
    fn test_toggle_state_machine() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        let mut window = PreviewWindow::new(WindowSettings::default());
        assert_eq!(window.state(), &WindowState::Hidden);

        // Hidden -> Showing(a)
        assert_eq!(window.toggle(text(1, "a"), dir, 10), ToggleOutcome::Shown);
        assert_eq!(window.current().map(|r| r.id), Some(1));

        // Showing(a) -> Showing(b)
        assert_eq!(window.toggle(text(2, "b"), dir, 10), ToggleOutcome::Shown);
        assert_eq!(window.current().map(|r| r.id), Some(2));

        // Showing(b) -> Hidden
        assert_eq!(window.toggle(text(2, "b"), dir, 10), ToggleOutcome::Hidden);
        assert!(!window.is_visible());
    }

    #[test]
    fn test_show_renders_document() {
        let temp_dir = TempDir::new().unwrap();
        let mut window = PreviewWindow::new(WindowSettings::default());
        let doc = window.show(text(1, "hello"), temp_dir.path(), 1);
        assert_eq!(doc.title, "hello");
        assert!(window.document().unwrap().html.contains("<pre>hello</pre>"));
    }

    #[tokio::test]
    async fn test_copy_follows_displayed_record() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        let clipboard = MemoryClipboard::new();
        let mut window = PreviewWindow::new(WindowSettings::default());

        assert_eq!(
            window.copy_requested(dir, &clipboard).await.unwrap(),
            CopyOutcome::NothingShown
        );

        window.show(text(1, "first"), dir, 1);
        window.show(text(2, "second"), dir, 2);

        let outcome = window.copy_requested(dir, &clipboard).await.unwrap();
        assert_eq!(outcome, CopyOutcome::Copied(ClipKind::Text));
        assert_eq!(clipboard.contents(), ClipboardContent::text("second"));
    }
}
