//! DOCX serialization (word-processing object model → DOCX package)
//!
//! Built on `docx-rs`. Every package gets the converter's style sheet, one numbering
//! definition per list id in the model, and one comment per run that carries metadata.

use super::image::picture;
use super::styles::{add_styles, style_id};
use crate::error::FormatError;
use crate::ir::docx::{
    Block, Document, Formatting, Paragraph, Run, RunContent, Table, VerticalAlign, MAX_LIST_LEVEL,
};
use docx_rs::{
    AbstractNumbering, BreakType, Comment, Docx, Hyperlink, HyperlinkType, IndentLevel, Level,
    LevelJc, LevelText, NumberFormat, Numbering, NumberingId, RunFonts, SpecialIndentType, Start,
};
use log::{debug, warn};
use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

const DEFAULT_COMMENT_AUTHOR: &str = "mdocx";
const LIST_LEVELS: usize = MAX_LIST_LEVEL + 1;
const CORE_PROPS: &str = "docProps/core.xml";

/// Serialize a word-processing document into DOCX bytes
pub fn serialize_to_docx(doc: &Document) -> Result<Vec<u8>, FormatError> {
    let mut writer = DocxWriter::default();
    let mut docx = add_numbering(add_styles(Docx::new()), &doc.blocks);

    for block in &doc.blocks {
        docx = writer.write_block(docx, block);
    }

    let mut buffer = Vec::new();
    docx.build()
        .pack(&mut Cursor::new(&mut buffer))
        .map_err(|e| FormatError::SerializationError(format!("Failed to pack DOCX: {e}")))?;

    match doc.title.as_deref() {
        Some(title) => stamp_title(&buffer, title),
        None => Ok(buffer),
    }
}

/// Rewrite `docProps/core.xml` so it carries `dc:title`. Other parts are copied as is.
fn stamp_title(package: &[u8], title: &str) -> Result<Vec<u8>, FormatError> {
    let pack_err = |e: ZipError| FormatError::SerializationError(format!("Failed to set title: {e}"));
    let mut archive = ZipArchive::new(Cursor::new(package)).map_err(pack_err)?;
    let mut out = Cursor::new(Vec::new());
    let mut writer = ZipWriter::new(&mut out);
    let mut stamped = false;

    for idx in 0..archive.len() {
        let name = archive.by_index_raw(idx).map_err(pack_err)?.name().to_string();
        if name != CORE_PROPS {
            let file = archive.by_index_raw(idx).map_err(pack_err)?;
            writer.raw_copy_file(file).map_err(pack_err)?;
            continue;
        }
        let mut xml = String::new();
        archive
            .by_index(idx)
            .map_err(pack_err)?
            .read_to_string(&mut xml)?;
        writer
            .start_file(CORE_PROPS, SimpleFileOptions::default())
            .map_err(pack_err)?;
        writer.write_all(with_title(&xml, title).as_bytes())?;
        stamped = true;
    }
    writer.finish().map_err(pack_err)?;

    if !stamped {
        warn!("Package has no {CORE_PROPS}; title not written");
    }
    Ok(out.into_inner())
}

fn with_title(core_xml: &str, title: &str) -> String {
    let mut xml = core_xml.to_string();
    if let Some(start) = xml.find("<dc:title") {
        let end = xml[start..]
            .find("</dc:title>")
            .map(|end| start + end + "</dc:title>".len())
            .or_else(|| xml[start..].find("/>").map(|end| start + end + 2));
        if let Some(end) = end {
            xml.replace_range(start..end, "");
        }
    }
    let element = format!("<dc:title>{}</dc:title>", escape_xml(title));
    match xml.rfind("</cp:coreProperties>") {
        Some(close) => xml.insert_str(close, &element),
        None => warn!("Unexpected {CORE_PROPS} layout; title not written"),
    }
    xml
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn collect_lists(blocks: &[Block], lists: &mut BTreeMap<usize, BTreeMap<usize, bool>>) {
    for block in blocks {
        match block {
            Block::Paragraph(p) => {
                if let Some(list) = p.list {
                    lists
                        .entry(list.num_id)
                        .or_default()
                        .entry(list.level)
                        .or_insert(list.ordered);
                }
            }
            Block::Table(table) => {
                for cell in table.rows.iter().flat_map(|row| &row.cells) {
                    collect_lists(&cell.blocks, lists);
                }
            }
            Block::SectionBreak | Block::Unknown(_) => {}
        }
    }
}

fn list_level(level: usize, ordered: bool) -> Level {
    let (format, text) = if ordered {
        ("decimal", format!("%{}.", level + 1))
    } else {
        let bullet = match level % 3 {
            0 => "•",
            1 => "○",
            _ => "▪",
        };
        ("bullet", bullet.to_string())
    };
    let hanging = if ordered { 420 } else { 360 };

    Level::new(
        level,
        Start::new(1),
        NumberFormat::new(format),
        LevelText::new(&text),
        LevelJc::new("left"),
    )
    .indent(
        Some(720 * (level as i32 + 1)),
        Some(SpecialIndentType::Hanging(hanging)),
        None,
        None,
    )
}

/// One abstract numbering per list id; unseen levels follow the nearest shallower level.
fn add_numbering(mut docx: Docx, blocks: &[Block]) -> Docx {
    let mut lists = BTreeMap::new();
    collect_lists(blocks, &mut lists);

    for (num_id, levels) in lists {
        let mut abstract_numbering = AbstractNumbering::new(num_id);
        let mut ordered = levels.values().next().copied().unwrap_or(false);
        for level in 0..LIST_LEVELS {
            if let Some(kind) = levels.get(&level) {
                ordered = *kind;
            }
            abstract_numbering = abstract_numbering.add_level(list_level(level, ordered));
        }
        docx = docx
            .add_abstract_numbering(abstract_numbering)
            .add_numbering(Numbering::new(num_id, num_id));
    }
    docx
}

#[derive(Default)]
struct DocxWriter {
    next_comment_id: usize,
}

impl DocxWriter {
    fn write_block(&mut self, docx: Docx, block: &Block) -> Docx {
        match block {
            Block::Paragraph(p) => docx.add_paragraph(self.paragraph(p)),
            Block::Table(table) => docx.add_table(self.table(table)),
            Block::SectionBreak => docx.add_paragraph(
                docx_rs::Paragraph::new().add_run(docx_rs::Run::new().add_break(BreakType::Page)),
            ),
            Block::Unknown(name) => {
                debug!("Dropping unmodelled element <w:{name}>");
                docx
            }
        }
    }

    fn table(&mut self, table: &Table) -> docx_rs::Table {
        let rows = table
            .rows
            .iter()
            .map(|row| {
                let cells = row
                    .cells
                    .iter()
                    .map(|cell| {
                        let mut out = docx_rs::TableCell::new();
                        let mut has_paragraph = false;
                        for block in &cell.blocks {
                            match block {
                                Block::Paragraph(p) => {
                                    out = out.add_paragraph(self.paragraph(p));
                                    has_paragraph = true;
                                }
                                Block::Table(nested) => out = out.add_table(self.table(nested)),
                                Block::SectionBreak | Block::Unknown(_) => {}
                            }
                        }
                        // a cell must end with a paragraph
                        if !has_paragraph || matches!(cell.blocks.last(), Some(Block::Table(_))) {
                            out = out.add_paragraph(docx_rs::Paragraph::new());
                        }
                        if cell.span > 1 {
                            out = out.grid_span(cell.span);
                        }
                        out
                    })
                    .collect();
                docx_rs::TableRow::new(cells)
            })
            .collect();
        docx_rs::Table::new(rows)
    }

    fn paragraph(&mut self, p: &Paragraph) -> docx_rs::Paragraph {
        let mut out = docx_rs::Paragraph::new();
        if let Some(style) = &p.style {
            out = out.style(&style_id(style));
        }
        if let Some(list) = p.list {
            out = out.numbering(NumberingId::new(list.num_id), IndentLevel::new(list.level));
        }

        let mut idx = 0;
        while idx < p.runs.len() {
            let run = &p.runs[idx];
            match &run.link {
                Some(url) => {
                    let end = p.runs[idx..]
                        .iter()
                        .position(|r| r.link.as_ref() != Some(url))
                        .map_or(p.runs.len(), |offset| idx + offset);
                    out = self.hyperlink(out, url, &p.runs[idx..end]);
                    idx = end;
                }
                None => {
                    if let Some((id, comment)) = self.open_comment(run) {
                        out = out.add_comment_start(comment);
                        out = out.add_run(self.run(run));
                        out = out.add_comment_end(id);
                    } else {
                        out = out.add_run(self.run(run));
                    }
                    idx += 1;
                }
            }
        }
        out
    }

    fn hyperlink(
        &mut self,
        mut out: docx_rs::Paragraph,
        url: &str,
        runs: &[Run],
    ) -> docx_rs::Paragraph {
        let comments: Vec<_> = runs.iter().filter_map(|run| self.open_comment(run)).collect();
        let mut link = Hyperlink::new(url, HyperlinkType::External);
        for run in runs {
            let mut out = self.run(run);
            if character_style(&run.formatting).is_none() {
                out = out.style("Hyperlink");
            }
            link = link.add_run(out);
        }
        for (_, comment) in &comments {
            out = out.add_comment_start(comment.clone());
        }
        out = out.add_hyperlink(link);
        for (id, _) in comments {
            out = out.add_comment_end(id);
        }
        out
    }

    fn open_comment(&mut self, run: &Run) -> Option<(usize, Comment)> {
        let comment = run.comment.as_ref()?;
        let id = self.next_comment_id;
        self.next_comment_id += 1;

        let mut out = Comment::new(id).author(
            comment
                .author
                .as_deref()
                .unwrap_or(DEFAULT_COMMENT_AUTHOR),
        );
        for line in comment.text.split('\n') {
            out = out.add_paragraph(
                docx_rs::Paragraph::new().add_run(docx_rs::Run::new().add_text(line)),
            );
        }
        Some((id, out))
    }

    fn run(&self, run: &Run) -> docx_rs::Run {
        let mut out = apply_formatting(docx_rs::Run::new(), &run.formatting);
        match &run.content {
            RunContent::Text(text) => {
                for (i, segment) in text.split('\t').enumerate() {
                    if i > 0 {
                        out = out.add_tab();
                    }
                    if !segment.is_empty() {
                        out = out.add_text(segment);
                    }
                }
            }
            RunContent::Break => out = out.add_break(BreakType::TextWrapping),
            RunContent::Drawing(drawing) => match picture(&drawing.data, &drawing.file_name) {
                Some(pic) => out = out.add_image(pic),
                None => {
                    warn!("Writing a placeholder for {}", drawing.file_name);
                    out = out.add_text(format!("[Image not found: {}]", drawing.file_name));
                }
            },
        }
        out
    }
}

fn apply_formatting(mut run: docx_rs::Run, formatting: &Formatting) -> docx_rs::Run {
    if formatting.bold {
        run = run.bold();
    }
    if formatting.italic {
        run = run.italic();
    }
    if formatting.strike {
        run = run.strike();
    }
    if let Some(font) = &formatting.font {
        run = run.fonts(
            RunFonts::new()
                .ascii(font)
                .hi_ansi(font)
                .east_asia(font)
                .cs(font),
        );
    }
    if let Some(color) = &formatting.highlight {
        run = run.highlight(color);
    }

    if let Some(style) = character_style(formatting) {
        run = run.style(&style);
    }
    run
}

/// Character style id carrying kbd or vertical alignment, else the run's own style.
fn character_style(formatting: &Formatting) -> Option<String> {
    if formatting.kbd {
        return Some("Kbd".to_string());
    }
    match formatting.vertical {
        VerticalAlign::Superscript => Some("Superscript".to_string()),
        VerticalAlign::Subscript => Some("Subscript".to_string()),
        VerticalAlign::Baseline => formatting.style.as_deref().map(style_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::docx::parser::parse_from_docx;
    use crate::ir::docx::{Comment as MetaComment, ListInfo, TableCell, TableRow};

    fn roundtrip(doc: &Document) -> Document {
        parse_from_docx(&serialize_to_docx(doc).unwrap()).unwrap()
    }

    fn only_paragraph(doc: &Document) -> &Paragraph {
        match &doc.blocks[..] {
            [Block::Paragraph(p)] => p,
            other => panic!("expected one paragraph, got {other:?}"),
        }
    }

    #[test]
    fn test_styles_and_formatting_survive() {
        let doc = Document::new(vec![Block::Paragraph(
            Paragraph::styled("Heading 2")
                .with_run(Run::text("Intro "))
                .with_run(Run::text("bold").with_formatting(Formatting::bold()))
                .with_run(Run::text("mono").with_formatting(Formatting::font("Consolas"))),
        )]);

        let back = roundtrip(&doc);
        let p = only_paragraph(&back);
        let style = p.style.as_deref().map(|s| style_id(s).to_lowercase());
        assert_eq!(style.as_deref(), Some("heading2"));
        assert_eq!(p.text(), "Intro boldmono");
        assert!(p.runs[1].formatting.bold);
        assert!(p.runs[2].formatting.is_monospace());
    }

    #[test]
    fn test_kbd_and_superscript_use_character_styles() {
        let kbd = Formatting {
            kbd: true,
            ..Formatting::default()
        };
        let sup = Formatting {
            vertical: VerticalAlign::Superscript,
            ..Formatting::default()
        };
        let doc = Document::new(vec![Block::Paragraph(
            Paragraph::new()
                .with_run(Run::text("Ctrl").with_formatting(kbd))
                .with_run(Run::text("2").with_formatting(sup)),
        )]);

        let back = roundtrip(&doc);
        let p = only_paragraph(&back);
        assert!(p.runs[0].formatting.kbd);
        assert_eq!(p.runs[1].formatting.vertical, VerticalAlign::Superscript);
    }

    #[test]
    fn test_comments_are_anchored() {
        let doc = Document::new(vec![Block::Paragraph(Paragraph::new().with_run(
            Run::text("{codeBlock}").with_comment(MetaComment::new("mdocx-meta: directive:\"code\"")),
        ))]);

        let back = roundtrip(&doc);
        let p = only_paragraph(&back);
        let comment = p.runs[0].comment.as_ref().unwrap();
        assert_eq!(comment.text, "mdocx-meta: directive:\"code\"");
        assert_eq!(comment.author.as_deref(), Some("mdocx"));
    }

    #[test]
    fn test_lists_keep_kind() {
        let item = |text: &str, ordered: bool| {
            let mut p = Paragraph::new().with_run(Run::text(text));
            p.list = Some(ListInfo {
                num_id: 1,
                level: if ordered { 0 } else { 1 },
                ordered,
            });
            Block::Paragraph(p)
        };
        let doc = Document::new(vec![item("one", true), item("nested", false)]);

        let back = roundtrip(&doc);
        let kinds: Vec<_> = back
            .blocks
            .iter()
            .filter_map(|b| match b {
                Block::Paragraph(p) => p.list.map(|l| (l.level, l.ordered)),
                _ => None,
            })
            .collect();
        assert_eq!(kinds, vec![(0, true), (1, false)]);
    }

    #[test]
    fn test_table_span_and_links() {
        let mut linked = Run::text("site");
        linked.link = Some("https://example.com".to_string());
        let doc = Document::new(vec![Block::Table(Table {
            rows: vec![TableRow {
                cells: vec![TableCell::spanning(
                    2,
                    vec![Block::Paragraph(Paragraph::new().with_run(linked))],
                )],
            }],
        })]);

        let back = roundtrip(&doc);
        let Block::Table(table) = &back.blocks[0] else {
            panic!("expected table");
        };
        let cell = &table.rows[0].cells[0];
        assert_eq!(cell.span, 2);
        let Block::Paragraph(p) = &cell.blocks[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(p.runs[0].link.as_deref(), Some("https://example.com"));
    }

    #[test]
    fn test_linked_runs_keep_their_character_style() {
        let mut key = Run::text("Enter").with_formatting(Formatting {
            kbd: true,
            ..Formatting::default()
        });
        key.link = Some("https://example.com/keys".to_string());
        let mut note = Run::text("1").with_formatting(Formatting {
            vertical: VerticalAlign::Superscript,
            ..Formatting::default()
        });
        note.link = Some("https://example.com/keys".to_string());
        let doc = Document::new(vec![Block::Paragraph(
            Paragraph::new().with_run(key).with_run(note),
        )]);

        let back = roundtrip(&doc);
        let p = only_paragraph(&back);
        assert!(p.runs[0].formatting.kbd);
        assert_eq!(p.runs[1].formatting.vertical, VerticalAlign::Superscript);
        assert!(p
            .runs
            .iter()
            .all(|run| run.link.as_deref() == Some("https://example.com/keys")));
    }

    #[test]
    fn test_title_replaces_existing_element() {
        let core = r#"<cp:coreProperties xmlns:cp="c" xmlns:dc="d"><dc:title></dc:title><dc:creator>x</dc:creator></cp:coreProperties>"#;
        assert_eq!(
            with_title(core, "A & B"),
            r#"<cp:coreProperties xmlns:cp="c" xmlns:dc="d"><dc:creator>x</dc:creator><dc:title>A &amp; B</dc:title></cp:coreProperties>"#
        );
    }

    #[test]
    fn test_title_roundtrip() {
        let mut doc = Document::new(vec![Block::Paragraph(Paragraph::new().with_run(Run::text("x")))]);
        doc.title = Some("Install: Windows".to_string());
        let back = roundtrip(&doc);
        assert_eq!(back.title.as_deref(), Some("Install: Windows"));
        assert_eq!(only_paragraph(&back).text(), "x");
    }
}
