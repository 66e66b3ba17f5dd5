//! Persisted clip index (`clips.json`)
//!
//! The index is a pretty-printed JSON array, newest first. Writes go to a
//! sibling temp file which is synced and then renamed over the index, so a
//! failed write never clobbers the previous valid index.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::{ClipRecord, StoreError};

/// File name of the index inside the store directory
pub const INDEX_FILE: &str = "clips.json";

fn tmp_path(path: &Path) -> PathBuf {
    path.with_extension("json.tmp")
}

/// Load the index; a missing file is an empty history
pub fn load(path: &Path) -> Result<Vec<ClipRecord>, StoreError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(StoreError::io(path, e)),
    };

    let records: Vec<ClipRecord> =
        serde_json::from_slice(&bytes).map_err(|source| StoreError::CorruptIndex {
            path: path.to_path_buf(),
            source,
        })?;

    debug!("Loaded {} clips from {}", records.len(), path.display());
    Ok(records)
}

/// Atomically replace the index with `records`
pub fn save(path: &Path, records: &[ClipRecord]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }

    let json = serde_json::to_vec_pretty(records).map_err(StoreError::Encode)?;

    let tmp = tmp_path(path);
    let written = (|| -> std::io::Result<()> {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(&json)?;
        file.sync_all()
    })();

    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(StoreError::io(&tmp, e));
    }

    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        StoreError::io(path, e)
    })?;

    debug!("Persisted {} clips to {}", records.len(), path.display());
    Ok(())
}

/// Move an unreadable index aside as `clips.json.corrupt-<ts>`
pub fn backup_corrupt(path: &Path, now: i64) -> Result<PathBuf, StoreError> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| INDEX_FILE.to_string());
    let backup = path.with_file_name(format!("{}.corrupt-{}", file_name, now));

    fs::rename(path, &backup).map_err(|e| StoreError::io(path, e))?;
    warn!(
        "Moved unreadable clip index {} to {}",
        path.display(),
        backup.display()
    );
    Ok(backup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::ClipBody;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn text_record(id: i64, text: &str) -> ClipRecord {
        ClipRecord {
            id,
            timestamp: id,
            preview: text.to_string(),
            body: ClipBody::Text {
                content: text.to_string(),
            },
        }
    }

    #[test]
    fn test_missing_index_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let records = load(&temp_dir.path().join(INDEX_FILE)).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join(INDEX_FILE);
        let records = vec![text_record(2, "b"), text_record(1, "a")];

        save(&path, &records).unwrap();
        assert!(!tmp_path(&path).exists());
        assert_eq!(load(&path).unwrap(), records);
    }

    #[test]
    fn test_corrupt_index_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(INDEX_FILE);
        fs::write(&path, "[{\"id\": 1,").unwrap();

        let err = load(&path).unwrap_err();
        assert!(matches!(err, StoreError::CorruptIndex { .. }));
        // The file must survive a failed load
        assert!(path.exists());
    }

    #[test]
    fn test_backup_corrupt_renames() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(INDEX_FILE);
        fs::write(&path, "garbage").unwrap();

        let backup = backup_corrupt(&path, 1_700_000_000).unwrap();
        assert!(!path.exists());
        assert_eq!(
            backup.file_name().unwrap().to_string_lossy(),
            "clips.json.corrupt-1700000000"
        );
        assert_eq!(fs::read_to_string(backup).unwrap(), "garbage");
    }

    #[test]
    fn test_wire_format() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(INDEX_FILE);
        let image = ClipRecord {
            id: 7,
            timestamp: 7,
            preview: "Screenshot (1x1)".to_string(),
            body: ClipBody::Image {
                filename: "img_7.png".to_string(),
            },
        };
        save(&path, &[image, text_record(5, "hi")]).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!([
                {"id": 7, "type": "image", "filename": "img_7.png", "timestamp": 7, "preview": "Screenshot (1x1)"},
                {"id": 5, "type": "text", "content": "hi", "timestamp": 5, "preview": "hi"}
            ])
        );
    }
}
