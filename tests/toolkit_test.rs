use std::fs;
use std::path::Path;
use syskit::core::toolkit::{Toolkit, ToolkitOptions};
use syskit::domain::model::RunOutcome;
use tempfile::TempDir;

fn toolkit_in(dir: &Path) -> Toolkit {
    Toolkit::new(ToolkitOptions {
        log_base_path: dir.join("logs"),
        state_path: Some(dir.join("tasks.json")),
        ..ToolkitOptions::default()
    })
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

#[tokio::test]
async fn test_backup_and_restore_roundtrip() {
    let dir = TempDir::new().unwrap();
    let toolkit = toolkit_in(dir.path());

    let source = dir.path().join("data");
    write_file(&source.join("config.toml"), "[a]\nb = 1\n");
    write_file(&source.join("docs/readme.md"), "# readme");

    let backup = dir.path().join("backups/data.zip");
    let entries = toolkit
        .backup_folder(&source, &backup, &["*.tmp".to_string()])
        .unwrap();
    assert_eq!(entries, 2);

    let restored = dir.path().join("restored");
    toolkit.restore_backup(&backup, &restored).unwrap();
    assert_eq!(
        fs::read_to_string(restored.join("docs/readme.md")).unwrap(),
        "# readme"
    );
}

#[tokio::test]
async fn test_run_every_records_into_the_log_book() {
    let dir = TempDir::new().unwrap();
    let toolkit = toolkit_in(dir.path());

    let outcome = toolkit
        .run_every("1 hour", "cleanup", 0, || async { Ok(()) })
        .await
        .unwrap();
    assert_eq!(outcome, RunOutcome::Ran { count: 1 });

    let recent = toolkit.logbook().recent(None, 10).unwrap();
    assert!(recent
        .iter()
        .any(|line| line.contains("Task 'cleanup' executed automatically (every 1 hour)")));

    // Immediately re-invoking is gated.
    let outcome = toolkit
        .run_every("1 hour", "cleanup", 0, || async { Ok(()) })
        .await
        .unwrap();
    assert!(matches!(outcome, RunOutcome::Skipped { .. }));
}

#[tokio::test]
async fn test_dir_size_human() {
    let dir = TempDir::new().unwrap();
    let toolkit = toolkit_in(dir.path());

    let data = dir.path().join("data");
    write_file(&data.join("payload.bin"), &"x".repeat(2048));

    assert_eq!(toolkit.dir_size(&data).unwrap(), 2048);
    assert_eq!(toolkit.dir_size_human(&data).unwrap(), "2.00 KB");
}

#[tokio::test]
async fn test_export_xlsx_through_the_facade() {
    let dir = TempDir::new().unwrap();
    let toolkit = toolkit_in(dir.path());

    let records: Vec<_> = serde_json::json!([{"id": 1, "name": "Item"}])
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row.as_object().unwrap().clone())
        .collect();

    let path = dir.path().join("out/report.xlsx");
    toolkit.export_xlsx(&path, &records, None).unwrap();

    let file = fs::File::open(&path).unwrap();
    let archive = zip::ZipArchive::new(file).unwrap();
    assert_eq!(archive.len(), 6);
}

#[tokio::test]
async fn test_optimize_image_roundtrip() {
    let dir = TempDir::new().unwrap();
    let toolkit = toolkit_in(dir.path());

    let png_path = dir.path().join("pic.png");
    let img = image::RgbImage::from_fn(64, 64, |x, y| image::Rgb([x as u8, y as u8, 128]));
    img.save(&png_path).unwrap();

    let stats = toolkit.optimize_image(&png_path, Some(50)).unwrap();
    assert!(stats.bytes_before > 0);
    assert!(stats.bytes_after > 0);

    // Still a decodable PNG after the rewrite.
    let reloaded = image::open(&png_path).unwrap();
    assert_eq!(reloaded.width(), 64);

    let jpg_path = dir.path().join("pic.jpg");
    img.save(&jpg_path).unwrap();
    toolkit.optimize_image(&jpg_path, Some(40)).unwrap();
    assert_eq!(image::open(&jpg_path).unwrap().height(), 64);
}

#[tokio::test]
async fn test_optimize_rejects_non_image_content() {
    let dir = TempDir::new().unwrap();
    let toolkit = toolkit_in(dir.path());

    let fake = dir.path().join("fake.png");
    fs::write(&fake, "definitely not pixels").unwrap();

    assert!(toolkit.optimize_image(&fake, None).is_err());
    assert!(toolkit
        .optimize_image(&dir.path().join("missing.png"), None)
        .is_err());
}

#[tokio::test]
async fn test_keep_recent_and_clean_via_facade() {
    let dir = TempDir::new().unwrap();
    let toolkit = toolkit_in(dir.path());

    let spool = dir.path().join("spool");
    for name in ["a.dump", "b.dump", "c.dump", "d.dump"] {
        write_file(&spool.join(name), name);
        std::thread::sleep(std::time::Duration::from_millis(50));
    }

    let removed = toolkit.keep_recent_files(&spool, 2, "*.dump").unwrap();
    assert_eq!(removed, 2);
    assert_eq!(toolkit.list_files(&spool, Some("*.dump")).unwrap().len(), 2);
}
