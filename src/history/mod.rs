//! Clip history: records, on-disk persistence and retention policy
//!
//! The store keeps an ordered newest-first list of [`ClipRecord`]s in
//! `clips.json`, with image clips backed by `img_<id>.png` blob files in the
//! same directory. Every mutation runs load-check-mutate-persist under a
//! single async mutex, so the menu and hotkey entry points can share one
//! store without interleaving.

pub mod blob;
pub mod index;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::config::{CorruptIndexPolicy, Settings};
use crate::imaging;

pub use index::INDEX_FILE;

/// Maximum characters kept in a text clip's preview
pub const PREVIEW_CHARS: usize = 80;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing a store file failed
    #[error("IO error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The index exists but is not a valid clip list
    #[error("Clip index {} is unreadable: {source}", .path.display())]
    CorruptIndex {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The index could not be serialized
    #[error("Failed to encode clip index: {0}")]
    Encode(serde_json::Error),

    /// The retention limit must keep at least one clip
    #[error("max_clips must be at least 1")]
    InvalidLimit,
}

impl StoreError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Kind of a stored clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipKind {
    Text,
    Image,
}

/// Kind-specific part of a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClipBody {
    /// Full captured text
    Text { content: String },
    /// Blob file name relative to the store directory
    Image { filename: String },
}

/// One captured clipboard item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipRecord {
    /// Capture time in seconds since the epoch, doubling as identity
    pub id: i64,
    #[serde(flatten)]
    pub body: ClipBody,
    /// Capture time, used only for display
    pub timestamp: i64,
    /// Short single-line label derived at capture
    pub preview: String,
}

impl ClipRecord {
    pub fn kind(&self) -> ClipKind {
        match self.body {
            ClipBody::Text { .. } => ClipKind::Text,
            ClipBody::Image { .. } => ClipKind::Image,
        }
    }

    /// Text content, for text clips
    pub fn content(&self) -> Option<&str> {
        match &self.body {
            ClipBody::Text { content } => Some(content),
            ClipBody::Image { .. } => None,
        }
    }

    /// Blob file name, for image clips
    pub fn filename(&self) -> Option<&str> {
        match &self.body {
            ClipBody::Image { filename } => Some(filename),
            ClipBody::Text { .. } => None,
        }
    }
}

/// Data handed to [`ClipStore::capture`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipPayload {
    Text(String),
    /// PNG-encoded image bytes
    Image(Vec<u8>),
}

impl ClipPayload {
    pub fn kind(&self) -> ClipKind {
        match self {
            Self::Text(_) => ClipKind::Text,
            Self::Image(_) => ClipKind::Image,
        }
    }
}

/// Result of a capture
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    Captured(ClipRecord),
    /// Same as the head record; nothing changed
    Duplicate,
}

/// Current time in seconds since the epoch
pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Single-line preview of a text clip
pub fn text_preview(text: &str) -> String {
    text.chars()
        .take(PREVIEW_CHARS)
        .map(|c| if matches!(c, '\n' | '\r' | '\t') { ' ' } else { c })
        .collect()
}

/// Caption for an image clip, from its decoded dimensions when possible
pub fn image_preview(data: &[u8]) -> String {
    match imaging::png_dimensions(data) {
        Some((w, h)) => format!("Screenshot ({}x{})", w, h),
        None => "Image".to_string(),
    }
}

/// Bounded, newest-first clip history backed by a directory
pub struct ClipStore {
    dir: PathBuf,
    max_clips: usize,
    records: Mutex<Vec<ClipRecord>>,
}

impl ClipStore {
    /// Open the store in `dir`, creating the directory if needed
    ///
    /// An unreadable index is a hard error under [`CorruptIndexPolicy::Fail`];
    /// under [`CorruptIndexPolicy::Backup`] it is moved aside and the store
    /// starts empty. Blob files no record references are swept once they are
    /// older than [`blob::ORPHAN_GRACE`]. A `max_clips` of zero is rejected.
    pub fn open(
        dir: impl Into<PathBuf>,
        max_clips: usize,
        policy: CorruptIndexPolicy,
    ) -> Result<Self, StoreError> {
        if max_clips == 0 {
            return Err(StoreError::InvalidLimit);
        }
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;

        let records = Self::load_records(&dir, policy)?;

        let referenced: HashSet<&str> = records.iter().filter_map(|r| r.filename()).collect();
        let swept = blob::sweep_orphans(&dir, &referenced, blob::ORPHAN_GRACE);
        if swept > 0 {
            info!("Swept {} orphaned blobs from {}", swept, dir.display());
        }

        info!("Opened clip store at {} ({} clips)", dir.display(), records.len());

        Ok(Self {
            dir,
            max_clips,
            records: Mutex::new(records),
        })
    }

    /// Open the store described by `settings`
    pub fn from_settings(settings: &Settings) -> Result<Self, StoreError> {
        Self::open(
            settings.store_dir.clone(),
            settings.max_clips,
            settings.corrupt_index,
        )
    }

    fn load_records(dir: &Path, policy: CorruptIndexPolicy) -> Result<Vec<ClipRecord>, StoreError> {
        let path = dir.join(INDEX_FILE);
        match index::load(&path) {
            Ok(records) => Ok(records),
            Err(e @ StoreError::CorruptIndex { .. }) if policy == CorruptIndexPolicy::Backup => {
                warn!("{}", e);
                index::backup_corrupt(&path, now())?;
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_clips(&self) -> usize {
        self.max_clips
    }

    fn index_path(&self) -> PathBuf {
        self.dir.join(INDEX_FILE)
    }

    /// Path of a record's blob, for image clips
    pub fn blob_path(&self, record: &ClipRecord) -> Option<PathBuf> {
        record.filename().map(|f| self.dir.join(f))
    }

    /// Capture `payload` stamped with the current time
    pub async fn capture(&self, payload: ClipPayload) -> Result<CaptureOutcome, StoreError> {
        self.capture_at(payload, now()).await
    }

    /// Capture `payload` with an explicit capture time
    pub async fn capture_at(
        &self,
        payload: ClipPayload,
        now: i64,
    ) -> Result<CaptureOutcome, StoreError> {
        let mut records = self.records.lock().await;

        if self.is_duplicate(records.first(), &payload) {
            debug!("Skipping {:?} clip identical to the head", payload.kind());
            return Ok(CaptureOutcome::Duplicate);
        }

        let record = match payload {
            ClipPayload::Text(content) => ClipRecord {
                id: now,
                timestamp: now,
                preview: text_preview(&content),
                body: ClipBody::Text { content },
            },
            ClipPayload::Image(data) => {
                let filename = blob::filename(now);
                // The blob must exist before any record points at it
                blob::write(&self.dir.join(&filename), &data)?;
                ClipRecord {
                    id: now,
                    timestamp: now,
                    preview: image_preview(&data),
                    body: ClipBody::Image { filename },
                }
            }
        };

        records.insert(0, record.clone());
        let evicted = if records.len() > self.max_clips {
            records.split_off(self.max_clips)
        } else {
            Vec::new()
        };

        if let Err(e) = index::save(&self.index_path(), &records) {
            error!("Failed to persist clip {}: {}", record.id, e);
            records.remove(0);
            records.extend(evicted);
            if let Some(filename) = record.filename() {
                if !records.iter().any(|r| r.filename() == Some(filename)) {
                    blob::remove(&self.dir.join(filename));
                }
            }
            return Err(e);
        }

        // Evicted blobs go only after the new index is durable
        let retained: HashSet<&str> = records.iter().filter_map(|r| r.filename()).collect();
        for old in &evicted {
            if let Some(filename) = old.filename() {
                if !retained.contains(filename) {
                    blob::remove(&self.dir.join(filename));
                }
            }
        }
        if !evicted.is_empty() {
            debug!("Evicted {} clips over the limit of {}", evicted.len(), self.max_clips);
        }

        info!("Saved {:?} clip {}: {}", record.kind(), record.id, record.preview);
        Ok(CaptureOutcome::Captured(record))
    }

    /// Duplicate check against the head only
    ///
    /// Images compare by byte length alone, matching how screenshots of the
    /// same region re-captured in a row are recognized.
    fn is_duplicate(&self, head: Option<&ClipRecord>, payload: &ClipPayload) -> bool {
        match (head.map(|h| &h.body), payload) {
            (Some(ClipBody::Text { content }), ClipPayload::Text(text)) => content == text,
            (Some(ClipBody::Image { filename }), ClipPayload::Image(data)) => {
                blob::size(&self.dir.join(filename)) == Some(data.len() as u64)
            }
            _ => false,
        }
    }

    /// Remove every clip and its blob
    ///
    /// The empty index is persisted first; if that fails nothing is deleted
    /// and the history is left as it was.
    pub async fn clear(&self) -> Result<(), StoreError> {
        let mut records = self.records.lock().await;

        index::save(&self.index_path(), &[])?;

        for record in records.iter() {
            if let Some(filename) = record.filename() {
                blob::remove(&self.dir.join(filename));
            }
        }
        blob::sweep_orphans(&self.dir, &HashSet::new(), blob::ORPHAN_GRACE);

        info!("Cleared {} clips", records.len());
        records.clear();
        Ok(())
    }

    /// Snapshot of the history, newest first
    pub async fn list(&self) -> Vec<ClipRecord> {
        self.records.lock().await.clone()
    }

    /// Snapshot of one record
    pub async fn get(&self, id: i64) -> Option<ClipRecord> {
        self.records.lock().await.iter().find(|r| r.id == id).cloned()
    }

    /// Most recent record
    pub async fn head(&self) -> Option<ClipRecord> {
        self.records.lock().await.first().cloned()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }

    /// Re-read the index from disk, picking up changes from another writer
    pub async fn reload(&self) -> Result<(), StoreError> {
        let mut records = self.records.lock().await;
        *records = index::load(&self.index_path())?;
        debug!("Reloaded {} clips", records.len());
        Ok(())
    }
}
