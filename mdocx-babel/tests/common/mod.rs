//! Helpers shared by the integration tests: build small word-processing documents and
//! push them through the package writer and reader.

use mdocx_babel::formats::docx::parser::parse_from_docx;
use mdocx_babel::formats::docx::serializer::serialize_to_docx;
use mdocx_babel::formats::markdown::parser::parse_from_markdown;
use mdocx_babel::formats::markdown::serializer::serialize_to_markdown;
use mdocx_babel::ir::docx::{Block, Document, Formatting, Paragraph, Run, Table, TableCell, TableRow};
use mdocx_babel::render::{docx_to_md, md_to_docx, RenderContext, RenderOptions};

pub fn heading(level: usize, text: &str) -> Block {
    Block::Paragraph(Paragraph::styled(format!("Heading {level}")).with_run(Run::text(text)))
}

pub fn para(runs: Vec<Run>) -> Block {
    let mut paragraph = Paragraph::new();
    paragraph.runs = runs;
    Block::Paragraph(paragraph)
}

pub fn text(text: &str) -> Run {
    Run::text(text)
}

pub fn styled(text: &str, formatting: Formatting) -> Run {
    Run::text(text).with_formatting(formatting)
}

pub fn table(rows: Vec<Vec<(usize, &str)>>) -> Block {
    Block::Table(Table {
        rows: rows
            .into_iter()
            .map(|cells| TableRow {
                cells: cells
                    .into_iter()
                    .map(|(span, content)| TableCell::spanning(span, vec![para(vec![text(content)])]))
                    .collect(),
            })
            .collect(),
    })
}

/// Write a document as a package and read it back.
pub fn through_package(doc: &Document) -> Document {
    let bytes = serialize_to_docx(doc).expect("package should be written");
    parse_from_docx(&bytes).expect("package should be readable")
}

/// Package → Markdown text.
pub fn to_markdown(doc: &Document) -> String {
    let read = through_package(doc);
    let md = docx_to_md::render_document(&read, &mut RenderContext::default())
        .expect("render to markdown");
    serialize_to_markdown(&md).expect("serialize markdown")
}

/// Markdown text → package, read back as a model.
pub fn to_docx(source: &str, options: RenderOptions) -> Document {
    let md = parse_from_markdown(source).expect("parse markdown");
    let doc = md_to_docx::render_document(&md, &mut RenderContext::new(options))
        .expect("render to docx");
    through_package(&doc)
}

/// Texts of the top-level paragraphs, empty ones skipped.
pub fn paragraph_texts(doc: &Document) -> Vec<String> {
    doc.blocks
        .iter()
        .filter_map(|block| match block {
            Block::Paragraph(p) if !p.text().trim().is_empty() => Some(p.text()),
            _ => None,
        })
        .collect()
}
