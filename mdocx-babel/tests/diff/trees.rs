use mdocx_babel::diff::{compare_dirs, compare_files, DiffMode, DiffOptions, Difference};
use std::fs;
use tempfile::tempdir;

fn tree_options() -> DiffOptions {
    DiffOptions {
        mode: DiffMode::Ast,
        ..DiffOptions::default()
    }
}

#[test]
fn test_yaml_children_attach_to_their_root_key() {
    let dir = tempdir().unwrap();
    let old = dir.path().join("old.yml");
    let new = dir.path().join("new.yml");
    fs::write(&old, "key1: val1\n  child1: x\nkey2: val2\n").unwrap();
    fs::write(&new, "key1: val1\n  child1: y\nkey2: val2\n").unwrap();

    let diff = compare_files(&old, &new, &tree_options()).unwrap();
    assert_eq!(
        diff.differences,
        vec![Difference::changed("1.1", "child1: x", "child1: y")]
    );
}

#[test]
fn test_markdown_insertion_shifts_later_siblings() {
    let dir = tempdir().unwrap();
    let old = dir.path().join("old.md");
    let new = dir.path().join("new.md");
    fs::write(&old, "# A\n\nText\n").unwrap();
    fs::write(&new, "# A\n\nNew\n\nText\n").unwrap();

    let diff = compare_files(&old, &new, &tree_options()).unwrap();
    assert_eq!(
        diff.differences,
        vec![
            Difference::changed(2, "paragraph: Text", "paragraph: New"),
            Difference::added(3, "paragraph: Text"),
        ]
    );
}

#[test]
fn test_directories_report_one_sided_files() {
    let old = tempdir().unwrap();
    let new = tempdir().unwrap();
    fs::write(old.path().join("same.md"), "# Same\n").unwrap();
    fs::write(new.path().join("same.md"), "# Same\n").unwrap();
    fs::write(old.path().join("gone.md"), "# Gone\n").unwrap();
    fs::write(new.path().join("fresh.md"), "# Fresh\n").unwrap();
    fs::write(new.path().join("notes.bin"), [0u8, 1, 2]).unwrap();

    let diffs = compare_dirs(old.path(), new.path(), &DiffOptions::default()).unwrap();
    let names: Vec<_> = diffs.iter().map(|diff| diff.file_name.as_str()).collect();
    assert_eq!(names, vec!["gone.md", "same.md", "fresh.md"]);

    assert_eq!(diffs[0].differences, vec![Difference::deleted(0, "gone.md")]);
    assert!(diffs[1].differences.is_empty());
    assert_eq!(diffs[2].differences, vec![Difference::added(0, "fresh.md")]);
}
