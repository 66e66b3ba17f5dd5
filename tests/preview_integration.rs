//! End-to-end tests: capture from a clipboard, preview, and copy back

use std::fs;
use std::path::Path;
use std::sync::Arc;

use clipdrop::clipboard::{ClipboardContent, MemoryClipboard};
use clipdrop::history::ClipKind;
use clipdrop::imaging::encode_rgba_png;
use clipdrop::preview::{CopyOutcome, DocumentKind, ToggleOutcome, WindowState};
use clipdrop::{ClipDrop, SaveOutcome, Settings};
use tempfile::TempDir;

fn setup(dir: &Path) -> (ClipDrop, Arc<MemoryClipboard>) {
    let clipboard = Arc::new(MemoryClipboard::new());
    let settings = Settings {
        store_dir: dir.to_path_buf(),
        max_clips: 10,
        ..Settings::default()
    };
    let app = ClipDrop::new(settings, clipboard.clone()).unwrap();
    (app, clipboard)
}

async fn save(app: &ClipDrop, now: i64) -> i64 {
    match app.save_clipboard_at(now).await.unwrap() {
        SaveOutcome::Saved(record) => record.id,
        other => panic!("expected a saved clip, got {:?}", other),
    }
}

#[tokio::test]
async fn test_text_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let (app, clipboard) = setup(temp_dir.path());
    let original = "fn main() {\n    println!(\"<hi> & bye\");\n}\n";

    clipboard.set(ClipboardContent::text(original));
    let id = save(&app, 100).await;

    clipboard.set(ClipboardContent::text("something else"));
    assert_eq!(app.activate_at(id, 130).await, Some(ToggleOutcome::Shown));

    let doc = app.displayed_document().await.unwrap();
    assert_eq!(doc.kind, DocumentKind::Text);
    assert!(doc.html.contains("println!(&quot;&lt;hi&gt; &amp; bye&quot;);"));

    let outcome = app.copy_requested().await.unwrap();
    assert_eq!(outcome, CopyOutcome::Copied(ClipKind::Text));
    assert_eq!(clipboard.contents(), ClipboardContent::text(original));
}

#[tokio::test]
async fn test_image_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let (app, clipboard) = setup(temp_dir.path());
    let png = encode_rgba_png(2, 2, vec![9; 16]).unwrap();

    clipboard.set(ClipboardContent::png(png.clone()));
    let id = save(&app, 200).await;
    clipboard.set(ClipboardContent::Empty);

    app.activate_at(id, 200).await;
    let doc = app.displayed_document().await.unwrap();
    assert_eq!(doc.kind, DocumentKind::Image);
    assert!(doc.html.contains("data:image/png;base64,"));

    app.copy_requested().await.unwrap();
    assert_eq!(clipboard.contents(), ClipboardContent::Image(png));
}

#[tokio::test]
async fn test_copy_tracks_window_switches() {
    let temp_dir = TempDir::new().unwrap();
    let (app, clipboard) = setup(temp_dir.path());

    clipboard.set(ClipboardContent::text("one"));
    let first = save(&app, 100).await;
    clipboard.set(ClipboardContent::text("two"));
    let second = save(&app, 101).await;

    app.activate_at(first, 200).await;
    app.activate_at(second, 200).await;
    clipboard.set(ClipboardContent::Empty);

    app.copy_requested().await.unwrap();
    assert_eq!(clipboard.contents(), ClipboardContent::text("two"));

    // Activating the displayed clip again hides the window
    assert_eq!(app.activate_at(second, 200).await, Some(ToggleOutcome::Hidden));
    assert_eq!(app.window_state().await, WindowState::Hidden);
    assert_eq!(app.copy_requested().await.unwrap(), CopyOutcome::NothingShown);
}

#[tokio::test]
async fn test_missing_blob_degrades() {
    let temp_dir = TempDir::new().unwrap();
    let (app, clipboard) = setup(temp_dir.path());

    clipboard.set(ClipboardContent::png(vec![1, 2, 3, 4]));
    let id = save(&app, 300).await;
    fs::remove_file(temp_dir.path().join("img_300.png")).unwrap();

    let doc = app.render(id).await.unwrap();
    assert_eq!(doc.kind, DocumentKind::MissingAsset);
    assert!(doc.html.contains("Image not found: img_300.png"));

    clipboard.set(ClipboardContent::text("untouched"));
    let outcome = app.copy_clip(id).await.unwrap();
    assert_eq!(
        outcome,
        Some(CopyOutcome::MissingAsset("img_300.png".to_string()))
    );
    assert_eq!(clipboard.contents(), ClipboardContent::text("untouched"));
}

#[tokio::test]
async fn test_menu_labels() {
    let temp_dir = TempDir::new().unwrap();
    let (app, clipboard) = setup(temp_dir.path());

    clipboard.set(ClipboardContent::text("a".repeat(60)));
    save(&app, 0).await;
    clipboard.set(ClipboardContent::text("short"));
    save(&app, 7200).await;

    let menu = app.menu_at(7200).await;
    let labels: Vec<&str> = menu.iter().map(|e| e.label.as_str()).collect();
    assert_eq!(
        labels,
        vec![
            "short  ·  just now".to_string(),
            format!("{}...  ·  2 hrs ago", "a".repeat(37)),
        ]
    );
}

#[tokio::test]
async fn test_unknown_clip() {
    let temp_dir = TempDir::new().unwrap();
    let (app, _clipboard) = setup(temp_dir.path());

    assert_eq!(app.activate(42).await, None);
    assert!(app.render(42).await.is_none());
    assert_eq!(app.copy_clip(42).await.unwrap(), None);
}
