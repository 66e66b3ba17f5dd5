//! Menu entries for the clip list

use crate::history::ClipRecord;
use crate::preview::relative_time;

/// Longest preview shown in a menu label, in characters
pub const LABEL_CHARS: usize = 40;

/// One selectable clip in a menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub id: i64,
    pub label: String,
}

/// Label for `record`: short preview, then its age
pub fn menu_label(record: &ClipRecord, now: i64) -> String {
    let preview = if record.preview.chars().count() > LABEL_CHARS {
        let cut: String = record.preview.chars().take(LABEL_CHARS - 3).collect();
        format!("{}...", cut)
    } else {
        record.preview.clone()
    };
    format!("{}  ·  {}", preview, relative_time(record.timestamp, now))
}

/// Entries for `records`, in the same newest-first order
pub fn build_menu(records: &[ClipRecord], now: i64) -> Vec<MenuEntry> {
    records
        .iter()
        .map(|record| MenuEntry {
            id: record.id,
            label: menu_label(record, now),
        })
        .collect()
}
