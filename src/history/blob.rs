//! Image blob files (`img_<id>.png`) next to the index

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::{Duration, SystemTime};

use tracing::{debug, warn};

use super::StoreError;

const PREFIX: &str = "img_";
const SUFFIX: &str = ".png";

/// Unreferenced blobs younger than this may belong to a capture in flight
pub const ORPHAN_GRACE: Duration = Duration::from_secs(60);

/// Deterministic blob file name for a clip id
pub fn filename(id: i64) -> String {
    format!("{}{}{}", PREFIX, id, SUFFIX)
}

/// Whether `name` looks like a blob this store created
pub fn is_blob_name(name: &str) -> bool {
    name.strip_prefix(PREFIX)
        .and_then(|rest| rest.strip_suffix(SUFFIX))
        .map(|id| !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false)
}

/// Write blob bytes durably; the file is complete once this returns
pub fn write(path: &Path, data: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }

    let written = (|| -> std::io::Result<()> {
        let mut file = fs::File::create(path)?;
        file.write_all(data)?;
        file.sync_all()
    })();

    written.map_err(|e| {
        let _ = fs::remove_file(path);
        StoreError::io(path, e)
    })
}

/// Byte length of a blob, `None` when it cannot be read
pub fn size(path: &Path) -> Option<u64> {
    fs::metadata(path).ok().map(|m| m.len())
}

/// Best-effort delete; a missing file is not an error
pub fn remove(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!("Removed blob {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove blob {}: {}", path.display(), e),
    }
}

/// Whether the file was modified at least `min_age` ago
///
/// Unreadable or future modification times count as fresh.
fn older_than(path: &Path, min_age: Duration) -> bool {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|modified| SystemTime::now().duration_since(modified).ok())
        .is_some_and(|age| age >= min_age)
}

/// Delete blob files in `dir` that no record references
///
/// Files modified within `min_age` are left alone, since another process may
/// have written the blob and not yet linked it from the index. Returns the
/// number of files removed.
pub fn sweep_orphans(dir: &Path, referenced: &HashSet<&str>, min_age: Duration) -> usize {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return 0,
    };

    let mut removed = 0;
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if !is_blob_name(name) || referenced.contains(name) {
            continue;
        }
        let path = entry.path();
        if !older_than(&path, min_age) {
            debug!("Keeping recent unreferenced blob {}", name);
            continue;
        }
        warn!("Removing orphaned blob {}", name);
        remove(&path);
        removed += 1;
    }
    removed
}
