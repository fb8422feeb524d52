use crate::common::*;
use mdocx_babel::diff::ast::{diff_trees, from_docx};
use mdocx_babel::ir::docx::{Document, Formatting};
use mdocx_babel::render::RenderOptions;

fn authored_document() -> Document {
    Document::new(vec![
        heading(1, "Guide"),
        para(vec![
            text("Some "),
            styled("bold", Formatting::bold()),
            text(" and "),
            styled("italic", Formatting::italic()),
            text(" text."),
        ]),
        heading(2, "Setup"),
        table(vec![
            vec![(1, "Name"), (1, "Value")],
            vec![(1, "depth"), (1, "3")],
        ]),
        para(vec![text("Closing words.")]),
    ])
}

#[test]
fn test_docx_markdown_docx_has_no_structural_differences() {
    let original = through_package(&authored_document());
    let markdown = to_markdown(&original);
    let back = to_docx(&markdown, RenderOptions::default());

    let differences = diff_trees(&from_docx(&original), &from_docx(&back));
    assert!(differences.is_empty(), "unexpected differences: {differences:#?}");
}

#[test]
fn test_markdown_from_authored_document() {
    let markdown = to_markdown(&authored_document());

    assert!(markdown.starts_with("# Guide\n\nSome **bold** and _italic_ text.\n\n## Setup\n"));
    assert!(markdown.contains("| Name | Value |"));
    assert!(markdown.ends_with("Closing words.\n"));
}

#[test]
fn test_code_block_language_survives_the_package() {
    let source = "```rust\nfn main() {}\n```\n";
    let doc = to_docx(source, RenderOptions::default());
    let markdown = to_markdown(&doc);

    assert!(markdown.contains("```rust"));
    assert!(markdown.contains("fn main() {}"));
}

#[test]
fn test_zone_without_pivot_round_trips() {
    let source = "# Install\n\n:::zone pivot=\"windows,mac\":::\nRun the installer.\n:::zone-end:::\n";
    let doc = to_docx(source, RenderOptions::default());

    assert_eq!(to_markdown(&doc), source);
}

#[test]
fn test_front_matter_title_round_trips() {
    let source = "---\ntitle: Release notes\n---\n\nBody text.\n";
    let doc = to_docx(source, RenderOptions::default());

    assert_eq!(doc.title.as_deref(), Some("Release notes"));
    assert_eq!(to_markdown(&doc), source);
}
