use std::fs;
use std::io::Read;
use std::path::Path;
use syskit::core::archive;
use syskit::core::fsops::ExcludeSet;
use tempfile::TempDir;

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn entry_names(archive_path: &Path) -> Vec<String> {
    let file = fs::File::open(archive_path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let mut names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    names.sort();
    names
}

#[test]
fn test_zip_directory_stores_relative_paths() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("project");
    write_file(&source.join("readme.md"), "hello");
    write_file(&source.join("src/lib.rs"), "pub fn f() {}");

    let destination = dir.path().join("backup.zip");
    let entries = archive::zip_path(&source, &destination, &ExcludeSet::default()).unwrap();

    assert_eq!(entries, 2);
    assert_eq!(entry_names(&destination), vec!["readme.md", "src/lib.rs"]);
}

#[test]
fn test_zip_respects_exclusions() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("project");
    write_file(&source.join("keep.txt"), "keep");
    write_file(&source.join("debug.log"), "log");
    write_file(&source.join("logs/old.log"), "old");

    let destination = dir.path().join("backup.zip");
    let exclude = ExcludeSet::new(["*.log"]);
    let entries = archive::zip_path(&source, &destination, &exclude).unwrap();

    assert_eq!(entries, 1);
    assert_eq!(entry_names(&destination), vec!["keep.txt"]);
}

#[test]
fn test_zip_single_file_uses_basename() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("notes.txt");
    write_file(&source, "some notes");

    let destination = dir.path().join("out/notes.zip");
    let entries = archive::zip_path(&source, &destination, &ExcludeSet::default()).unwrap();

    assert_eq!(entries, 1);
    assert_eq!(entry_names(&destination), vec!["notes.txt"]);
}

#[test]
fn test_zip_missing_source_is_an_error() {
    let dir = TempDir::new().unwrap();
    let result = archive::zip_path(
        &dir.path().join("absent"),
        &dir.path().join("backup.zip"),
        &ExcludeSet::default(),
    );
    assert!(result.is_err());
}

#[test]
fn test_zip_unzip_roundtrip_preserves_content() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("data");
    write_file(&source.join("a.txt"), "alpha");
    write_file(&source.join("nested/b.txt"), "beta");

    let archive_path = dir.path().join("data.zip");
    archive::zip_path(&source, &archive_path, &ExcludeSet::default()).unwrap();

    let restored = dir.path().join("restored");
    let entries = archive::unzip(&archive_path, &restored).unwrap();

    assert_eq!(entries, 2);
    assert_eq!(fs::read_to_string(restored.join("a.txt")).unwrap(), "alpha");
    assert_eq!(
        fs::read_to_string(restored.join("nested/b.txt")).unwrap(),
        "beta"
    );
}

#[test]
fn test_unzip_missing_archive_is_an_error() {
    let dir = TempDir::new().unwrap();
    let result = archive::unzip(&dir.path().join("absent.zip"), &dir.path().join("out"));
    assert!(result.is_err());
}

#[test]
fn test_archive_and_clean_removes_source() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("scratch");
    write_file(&source.join("tmp.txt"), "temp data");

    let archive_path = dir.path().join("scratch.zip");
    archive::archive_and_clean(&source, &archive_path, &ExcludeSet::default()).unwrap();

    assert!(!source.exists());
    assert!(archive_path.exists());

    // The archived copy is still intact.
    let file = fs::File::open(&archive_path).unwrap();
    let mut zip = zip::ZipArchive::new(file).unwrap();
    let mut content = String::new();
    zip.by_name("tmp.txt")
        .unwrap()
        .read_to_string(&mut content)
        .unwrap();
    assert_eq!(content, "temp data");
}
