//! Preview rendering and copy-back
//!
//! A stored clip renders to a self-contained HTML [`Document`]: a header with
//! the capture time and a Copy button, and the clip body (escaped text, or
//! the image inlined as a data URI). The document only *declares* that it can
//! request a copy; whatever hosts it routes that request to [`copy_back`],
//! usually through [`PreviewWindow::copy_requested`].

pub mod time;
pub mod window;

use std::fs;
use std::path::Path;

use base64::{engine::general_purpose, Engine as _};
use tracing::{debug, warn};

use crate::clipboard::{ClipboardContent, ClipboardError, ClipboardProvider};
use crate::history::{ClipBody, ClipKind, ClipRecord};

pub use time::{format_timestamp, relative_time};
pub use window::{PreviewWindow, ToggleOutcome, WindowState};

/// Characters of a text clip's preview used as the window title
const TITLE_CHARS: usize = 50;

const PREVIEW_CSS: &str = r#"
body {
    font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Helvetica, Arial, sans-serif;
    font-size: 14px;
    line-height: 1.6;
    color: #e6edf3;
    background: #0d1117;
    margin: 0;
    padding: 24px 32px;
}
pre {
    font-family: ui-monospace, "SF Mono", Menlo, Consolas, monospace;
    font-size: 13px;
    background: #161b22;
    border: 1px solid #30363d;
    border-radius: 6px;
    padding: 16px;
    white-space: pre-wrap;
    word-wrap: break-word;
}
.clip-meta {
    display: flex;
    justify-content: space-between;
    align-items: center;
    color: #8b949e;
    font-size: 12px;
    border-bottom: 1px solid #30363d;
    padding-bottom: 8px;
    margin-bottom: 12px;
}
.copy-btn {
    background: #21262d;
    color: #8b949e;
    border: 1px solid #30363d;
    border-radius: 6px;
    padding: 4px 12px;
    cursor: pointer;
}
.copy-btn.copied { background: #238636; border-color: #238636; color: #fff; }
.image-container {
    display: flex;
    justify-content: center;
    align-items: center;
    min-height: 200px;
    padding: 16px;
}
.image-container img { max-width: 100%; max-height: 80vh; border-radius: 6px; }
.missing { color: #f85149; }
"#;

const COPY_SCRIPT: &str = r#"
function copyClip(btn) {
    document.dispatchEvent(new CustomEvent('copyClip'));
    btn.textContent = 'Copied!';
    btn.classList.add('copied');
    setTimeout(function () {
        btn.textContent = 'Copy';
        btn.classList.remove('copied');
    }, 1500);
}
"#;

/// Outbound action a document can raise
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentAction {
    /// The user asked to copy the displayed clip back to the clipboard
    CopyRequested,
}

impl DocumentAction {
    /// Name of the DOM event the document dispatches
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::CopyRequested => "copyClip",
        }
    }

    /// Map a message received from the document's host back to an action
    pub fn from_event(name: &str) -> Option<Self> {
        match name {
            "copyClip" => Some(Self::CopyRequested),
            _ => None,
        }
    }
}

/// What a rendered document shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Text,
    Image,
    /// Image clip whose blob is gone
    MissingAsset,
}

/// Rendered, self-contained preview of a clip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub title: String,
    pub html: String,
    pub kind: DocumentKind,
    /// Action the document can raise, absent for placeholders
    pub action: Option<DocumentAction>,
}

/// Result of a copy-back request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    /// Clipboard now holds the clip
    Copied(ClipKind),
    /// The image blob was missing; clipboard left untouched
    MissingAsset(String),
    /// No clip is on display
    NothingShown,
}

/// Escape the five markup-significant characters
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Title used for a record's preview window
pub fn title_for(record: &ClipRecord) -> String {
    match record.kind() {
        ClipKind::Text => record.preview.chars().take(TITLE_CHARS).collect(),
        ClipKind::Image => record.preview.clone(),
    }
}

/// Render `record` into a self-contained document
///
/// Image blobs are read from `store_dir`. A missing or unreadable blob yields
/// a "not found" placeholder instead of an error.
pub fn render(record: &ClipRecord, store_dir: &Path, now: i64) -> Document {
    let title = title_for(record);

    match &record.body {
        ClipBody::Text { content } => {
            let body = format!("<pre>{}</pre>", escape_html(content));
            Document {
                title,
                html: page("Text clip", record.timestamp, now, &body),
                kind: DocumentKind::Text,
                action: Some(DocumentAction::CopyRequested),
            }
        }
        ClipBody::Image { filename } => match fs::read(store_dir.join(filename)) {
            Ok(data) => {
                let b64 = general_purpose::STANDARD.encode(&data);
                let body = format!(
                    "<div class=\"image-container\">\n    <img src=\"data:image/png;base64,{}\" alt=\"{}\">\n</div>",
                    b64,
                    escape_html(&record.preview)
                );
                Document {
                    title,
                    html: page("Image clip", record.timestamp, now, &body),
                    kind: DocumentKind::Image,
                    action: Some(DocumentAction::CopyRequested),
                }
            }
            Err(e) => {
                warn!("Blob {} for clip {} unavailable: {}", filename, record.id, e);
                Document {
                    title,
                    html: missing_page(filename),
                    kind: DocumentKind::MissingAsset,
                    action: None,
                }
            }
        },
    }
}

fn page(label: &str, timestamp: i64, now: i64, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html><head>
<meta charset="utf-8">
<style>{css}</style>
</head><body>
<div class="clip-meta">
    <span>{label} &middot; {absolute} &middot; {relative}</span>
    <button class="copy-btn" onclick="copyClip(this)">Copy</button>
</div>
{body}
<script>{script}</script>
</body></html>"#,
        css = PREVIEW_CSS,
        label = label,
        absolute = format_timestamp(timestamp),
        relative = relative_time(timestamp, now),
        body = body,
        script = COPY_SCRIPT,
    )
}

fn missing_page(filename: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html><head>
<meta charset="utf-8">
<style>{}</style>
</head><body>
<p class="missing">Image not found: {}</p>
</body></html>"#,
        PREVIEW_CSS,
        escape_html(filename)
    )
}

/// Copy a record's content to the clipboard
///
/// Image bytes are read fresh from disk. A missing blob is a no-op reported
/// as [`CopyOutcome::MissingAsset`].
pub async fn copy_back(
    record: &ClipRecord,
    store_dir: &Path,
    clipboard: &dyn ClipboardProvider,
) -> Result<CopyOutcome, ClipboardError> {
    let content = match &record.body {
        ClipBody::Text { content } => ClipboardContent::Text(content.clone()),
        ClipBody::Image { filename } => match tokio::fs::read(store_dir.join(filename)).await {
            Ok(data) => ClipboardContent::Image(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Cannot copy clip {}: {} is missing", record.id, filename);
                return Ok(CopyOutcome::MissingAsset(filename.clone()));
            }
            Err(e) => return Err(ClipboardError::Io(e)),
        },
    };

    clipboard.write(&content).await?;
    debug!(
        "Copied clip {} ({} bytes) via {} clipboard",
        record.id,
        content.size(),
        clipboard.name()
    );
    Ok(CopyOutcome::Copied(record.kind()))
}
