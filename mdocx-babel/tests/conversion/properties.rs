//! Mapping rules observed through whole conversions.

use crate::common::*;
use insta::assert_snapshot;
use mdocx_babel::ir::docx::{Block, Document, Formatting};
use mdocx_babel::render::RenderOptions;

const ZONED: &str = "# Install\n\n:::zone pivot=\"windows,mac\":::\nRun the installer.\n:::zone-end:::\n";

fn with_pivot(pivot: Option<&str>) -> RenderOptions {
    RenderOptions {
        zone_pivot: pivot.map(str::to_string),
        ..RenderOptions::default()
    }
}

#[test]
fn test_heading_level_comes_from_style_name() {
    let doc = Document::new(vec![heading(3, "Deep"), para(vec![text("Body")])]);
    assert_eq!(to_markdown(&doc), "### Deep\n\nBody\n");
}

#[test]
fn test_monospace_font_becomes_code_span() {
    let doc = Document::new(vec![para(vec![
        text("Set "),
        styled("retries", Formatting::font("Consolas")),
        text(" in "),
        styled("plain words", Formatting::font("Arial")),
    ])]);
    assert_eq!(to_markdown(&doc), "Set `retries` in plain words\n");
}

#[test]
fn test_spanning_table_uses_row_directives() {
    let doc = Document::new(vec![table(vec![
        vec![(2, "Wide")],
        vec![(1, "a"), (1, "b")],
    ])]);
    assert_snapshot!(to_markdown(&doc), @r#"
    :::row:::
        :::column span="2":::
            Wide
        :::column-end:::
    :::row-end:::
    :::row:::
        :::column:::
            a
        :::column-end:::
        :::column:::
            b
        :::column-end:::
    :::row-end:::
    "#);
}

#[test]
fn test_row_directives_restore_the_span() {
    let doc = Document::new(vec![table(vec![
        vec![(2, "Wide")],
        vec![(1, "a"), (1, "b")],
    ])]);
    let back = to_docx(&to_markdown(&doc), RenderOptions::default());

    let Some(Block::Table(table)) = back.blocks.first() else {
        panic!("expected a table, got {:?}", back.blocks);
    };
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[0].cells[0].span, 2);
    assert_eq!(table.rows[1].cells.len(), 2);
}

#[test]
fn test_matching_pivot_keeps_only_the_body() {
    let doc = to_docx(ZONED, with_pivot(Some("mac")));
    assert_eq!(paragraph_texts(&doc), vec!["Install", "Run the installer."]);
}

#[test]
fn test_unset_pivot_keeps_visible_markers() {
    let doc = to_docx(ZONED, with_pivot(None));
    assert_eq!(
        paragraph_texts(&doc),
        vec![
            "Install",
            "{zonePivot:\"windows,mac\"}",
            "Run the installer.",
            "{end-zonePivot:\"windows,mac\"}",
        ]
    );
}

#[test]
fn test_other_pivot_drops_the_zone() {
    let doc = to_docx(ZONED, with_pivot(Some("linux")));
    assert_eq!(paragraph_texts(&doc), vec!["Install"]);
}
