use crate::common::*;
use mdocx_babel::diff::{compare_files, ChangeKind, DiffOptions, Difference};
use mdocx_babel::formats::docx::serializer::serialize_to_docx;
use mdocx_babel::ir::docx::Document;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn compare(dir: &Path, ext: &str, original: &[u8], new: &[u8], options: &DiffOptions) -> Vec<Difference> {
    let old_path = dir.join(format!("old.{ext}"));
    let new_path = dir.join(format!("new.{ext}"));
    fs::write(&old_path, original).unwrap();
    fs::write(&new_path, new).unwrap();
    compare_files(&old_path, &new_path, options).unwrap().differences
}

#[test]
fn test_marker_swaps_are_noise() {
    let dir = tempdir().unwrap();
    let differences = compare(
        dir.path(),
        "md",
        b"- item\n*word*\n",
        b"* item\n_word_\n",
        &DiffOptions::default(),
    );
    assert!(differences.is_empty(), "{differences:?}");
}

#[test]
fn test_blank_lines_are_noise_unless_asked() {
    let dir = tempdir().unwrap();
    let quiet = compare(dir.path(), "md", b"# A\nText\n", b"# A\n\nText\n", &DiffOptions::default());
    assert!(quiet.is_empty());

    let strict = DiffOptions {
        ignore_blank_lines: false,
        ..DiffOptions::default()
    };
    let loud = compare(dir.path(), "md", b"# A\nText\n", b"# A\n\nText\n", &strict);
    assert_eq!(loud.len(), 1);
    assert_eq!(loud[0].kind, ChangeKind::Added);
}

#[test]
fn test_real_edit_is_reported_with_line_number() {
    let dir = tempdir().unwrap();
    let differences = compare(
        dir.path(),
        "md",
        b"# A\n- item\n",
        b"# A\n- widget\n",
        &DiffOptions::default(),
    );
    assert_eq!(differences, vec![Difference::changed(2, "- item", "- widget")]);
}

#[test]
fn test_packages_compare_through_markdown() {
    let dir = tempdir().unwrap();
    let old = serialize_to_docx(&Document::new(vec![heading(1, "Guide")])).unwrap();
    let new = serialize_to_docx(&Document::new(vec![heading(1, "Manual")])).unwrap();

    let differences = compare(dir.path(), "docx", &old, &new, &DiffOptions::default());
    assert_eq!(differences, vec![Difference::changed(1, "# Guide", "# Manual")]);
}
