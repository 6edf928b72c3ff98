use std::fs;

use cheatsheet_engine::{ensure_output_dir, AtomicFileWriter};
use tempfile::TempDir;

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let nested = temp.path().join("out").join("sheets");
    assert!(!nested.exists());
    ensure_output_dir(&nested).unwrap();
    assert!(nested.is_dir());
}

#[test]
fn rewriting_an_artifact_replaces_it() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("cheatsheet.pdf", b"%PDF-1.4 first").unwrap();
    assert_eq!(first.file_name().unwrap(), "cheatsheet.pdf");
    assert_eq!(fs::read(&first).unwrap(), b"%PDF-1.4 first");

    let second = writer.write("cheatsheet.pdf", b"%PDF-1.4 second").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read(&second).unwrap(), b"%PDF-1.4 second");
}

#[test]
fn output_path_that_is_a_file_fails_cleanly() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    assert!(writer.write("cheatsheet.md", b"data").is_err());
    assert!(!file_path.with_file_name("cheatsheet.md").exists());
}
