//! DOCX parsing (DOCX package → word-processing object model)
//!
//! Reads the parts of the OPC package that carry authoring structure: `word/document.xml`
//! for the body, `word/styles.xml` to turn style ids into display names,
//! `word/numbering.xml` to tell ordered from bulleted lists, `word/comments.xml` for the
//! metadata channel, the document relationships for hyperlinks and media, and
//! `docProps/core.xml` for the title. Everything else in the package is ignored.

use crate::error::FormatError;
use crate::ir::docx::{
    Block, Comment, Document, Drawing, Formatting, ListInfo, Paragraph, Run, RunContent, Table,
    TableCell, TableRow, VerticalAlign, MAX_LIST_LEVEL,
};
use log::{debug, warn};
use roxmltree::Node;
use std::collections::HashMap;
use std::io::{Cursor, Read};
use zip::result::ZipError;
use zip::ZipArchive;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const DC_NS: &str = "http://purl.org/dc/elements/1.1/";

/// Parse a DOCX package into the word-processing object model
pub fn parse_from_docx(bytes: &[u8]) -> Result<Document, FormatError> {
    let archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| FormatError::ParseError(format!("Not a DOCX package: {e}")))?;
    let mut reader = PackageReader::open(archive)?;

    let xml = reader
        .read_part("word/document.xml")?
        .ok_or_else(|| FormatError::ParseError("Missing word/document.xml".to_string()))?;
    let dom = parse_xml(&xml, "word/document.xml")?;
    let body = dom
        .root_element()
        .children()
        .find(|n| is_w(n, "body"))
        .ok_or_else(|| FormatError::ParseError("Document has no body".to_string()))?;

    let blocks = reader.read_blocks(body)?;
    let title = reader.read_title()?;
    Ok(Document { title, blocks })
}

struct PackageReader<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
    /// Style id → display name.
    styles: HashMap<String, String>,
    /// numId → level → ordered.
    numbering: HashMap<String, HashMap<usize, bool>>,
    comments: HashMap<String, Comment>,
    /// Relationship id → target.
    relationships: HashMap<String, String>,
    /// Comment whose range has started but has not been attached to a run yet.
    pending_comment: Option<Comment>,
}

impl<'a> PackageReader<'a> {
    fn open(archive: ZipArchive<Cursor<&'a [u8]>>) -> Result<Self, FormatError> {
        let mut reader = Self {
            archive,
            styles: HashMap::new(),
            numbering: HashMap::new(),
            comments: HashMap::new(),
            relationships: HashMap::new(),
            pending_comment: None,
        };
        reader.load_styles()?;
        reader.load_numbering()?;
        reader.load_comments()?;
        reader.load_relationships()?;
        Ok(reader)
    }

    fn read_part(&mut self, name: &str) -> Result<Option<String>, FormatError> {
        match self.read_binary(name)? {
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|e| FormatError::ParseError(format!("{name} is not UTF-8: {e}"))),
            None => Ok(None),
        }
    }

    fn read_binary(&mut self, name: &str) -> Result<Option<Vec<u8>>, FormatError> {
        let mut file = match self.archive.by_name(name) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(FormatError::ParseError(format!("Cannot read {name}: {e}"))),
        };
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        Ok(Some(bytes))
    }

    fn load_styles(&mut self) -> Result<(), FormatError> {
        let Some(xml) = self.read_part("word/styles.xml")? else {
            return Ok(());
        };
        let dom = parse_xml(&xml, "word/styles.xml")?;
        for style in dom.descendants().filter(|n| is_w(n, "style")) {
            let Some(id) = style.attribute((W_NS, "styleId")) else {
                continue;
            };
            let name = child_val(style, "name").unwrap_or(id);
            self.styles.insert(id.to_string(), name.to_string());
        }
        Ok(())
    }

    fn load_numbering(&mut self) -> Result<(), FormatError> {
        let Some(xml) = self.read_part("word/numbering.xml")? else {
            return Ok(());
        };
        let dom = parse_xml(&xml, "word/numbering.xml")?;

        let mut abstracts: HashMap<&str, HashMap<usize, bool>> = HashMap::new();
        for abstract_num in dom.descendants().filter(|n| is_w(n, "abstractNum")) {
            let Some(id) = abstract_num.attribute((W_NS, "abstractNumId")) else {
                continue;
            };
            let mut levels = HashMap::new();
            for level in abstract_num.children().filter(|n| is_w(n, "lvl")) {
                let ilvl = level
                    .attribute((W_NS, "ilvl"))
                    .and_then(|v| v.parse::<usize>().ok())
                    .unwrap_or(0);
                let ordered = child_val(level, "numFmt")
                    .is_some_and(|fmt| fmt != "bullet" && fmt != "none");
                levels.insert(ilvl, ordered);
            }
            abstracts.insert(id, levels);
        }

        for num in dom.descendants().filter(|n| is_w(n, "num")) {
            let (Some(num_id), Some(abstract_id)) = (
                num.attribute((W_NS, "numId")),
                child_val(num, "abstractNumId"),
            ) else {
                continue;
            };
            if let Some(levels) = abstracts.get(abstract_id) {
                self.numbering.insert(num_id.to_string(), levels.clone());
            }
        }
        Ok(())
    }

    fn load_comments(&mut self) -> Result<(), FormatError> {
        let Some(xml) = self.read_part("word/comments.xml")? else {
            return Ok(());
        };
        let dom = parse_xml(&xml, "word/comments.xml")?;
        for comment in dom.descendants().filter(|n| is_w(n, "comment")) {
            let Some(id) = comment.attribute((W_NS, "id")) else {
                continue;
            };
            let text = comment
                .children()
                .filter(|n| is_w(n, "p"))
                .map(|p| {
                    p.descendants()
                        .filter(|n| is_w(n, "t"))
                        .filter_map(|t| t.text())
                        .collect::<String>()
                })
                .collect::<Vec<_>>()
                .join("\n");
            self.comments.insert(
                id.to_string(),
                Comment {
                    author: comment.attribute((W_NS, "author")).map(str::to_string),
                    text,
                },
            );
        }
        Ok(())
    }

    fn load_relationships(&mut self) -> Result<(), FormatError> {
        let Some(xml) = self.read_part("word/_rels/document.xml.rels")? else {
            return Ok(());
        };
        let dom = parse_xml(&xml, "word/_rels/document.xml.rels")?;
        for rel in dom
            .descendants()
            .filter(|n| n.tag_name().name() == "Relationship")
        {
            let (Some(id), Some(target)) = (rel.attribute("Id"), rel.attribute("Target")) else {
                continue;
            };
            self.relationships.insert(id.to_string(), target.to_string());
        }
        Ok(())
    }

    fn read_title(&mut self) -> Result<Option<String>, FormatError> {
        let Some(xml) = self.read_part("docProps/core.xml")? else {
            return Ok(None);
        };
        let dom = parse_xml(&xml, "docProps/core.xml")?;
        Ok(dom
            .descendants()
            .find(|n| n.tag_name().name() == "title" && n.tag_name().namespace() == Some(DC_NS))
            .and_then(|n| n.text())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string))
    }

    fn read_blocks(&mut self, parent: Node) -> Result<Vec<Block>, FormatError> {
        let mut blocks = Vec::new();
        for child in parent.children().filter(Node::is_element) {
            let name = child.tag_name().name();
            match name {
                "p" => blocks.extend(self.read_paragraph(child)?),
                "tbl" => blocks.push(Block::Table(self.read_table(child)?)),
                "sdt" => {
                    if let Some(content) = child.children().find(|n| is_w(n, "sdtContent")) {
                        blocks.extend(self.read_blocks(content)?);
                    }
                }
                "commentRangeStart" => self.start_comment(child),
                "commentRangeEnd" | "bookmarkStart" | "bookmarkEnd" | "proofErr" => {}
                _ if name.ends_with("Pr") || name == "tblGrid" => {}
                other => {
                    debug!("Keeping unmodelled body element <w:{other}>");
                    blocks.push(Block::Unknown(other.to_string()));
                }
            }
        }
        Ok(blocks)
    }

    fn read_paragraph(&mut self, node: Node) -> Result<Vec<Block>, FormatError> {
        let mut paragraph = Paragraph::new();
        let mut ends_section = false;

        if let Some(ppr) = node.children().find(|n| is_w(n, "pPr")) {
            paragraph.style = child_val(ppr, "pStyle").map(|id| self.style_name(id));
            paragraph.list = ppr
                .children()
                .find(|n| is_w(n, "numPr"))
                .and_then(|num_pr| self.list_info(num_pr));
            ends_section = ppr.children().any(|n| is_w(&n, "sectPr"));
        }

        let mut page_break = false;
        self.read_inline_container(node, None, &mut paragraph.runs, &mut page_break)?;

        let mut blocks = Vec::new();
        let has_content = paragraph.significant_runs().next().is_some();
        if page_break && !has_content {
            blocks.push(Block::SectionBreak);
            return Ok(blocks);
        }
        blocks.push(Block::Paragraph(paragraph));
        if page_break || ends_section {
            blocks.push(Block::SectionBreak);
        }
        Ok(blocks)
    }

    fn style_name(&self, id: &str) -> String {
        self.styles
            .get(id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }

    fn list_info(&self, num_pr: Node) -> Option<ListInfo> {
        let num_id = child_val(num_pr, "numId")?;
        if num_id == "0" {
            return None;
        }
        let level = child_val(num_pr, "ilvl")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(0);
        if level > MAX_LIST_LEVEL {
            warn!("List level {level} is out of range, using {MAX_LIST_LEVEL}");
        }
        let level = level.min(MAX_LIST_LEVEL);
        let ordered = match self.numbering.get(num_id) {
            Some(levels) => levels.get(&level).copied().unwrap_or(false),
            None => {
                debug!("List numbering {num_id} has no definition, assuming bullets");
                false
            }
        };
        Some(ListInfo {
            num_id: num_id.parse().unwrap_or(0),
            level,
            ordered,
        })
    }

    fn start_comment(&mut self, node: Node) {
        let Some(id) = node.attribute((W_NS, "id")) else {
            return;
        };
        match self.comments.get(id) {
            Some(comment) => self.pending_comment = Some(comment.clone()),
            None => warn!("Comment range {id} has no comment body"),
        }
    }

    fn read_inline_container(
        &mut self,
        node: Node,
        link: Option<&str>,
        runs: &mut Vec<Run>,
        page_break: &mut bool,
    ) -> Result<(), FormatError> {
        for child in node.children().filter(Node::is_element) {
            match child.tag_name().name() {
                "r" => self.read_run(child, link, runs, page_break)?,
                "hyperlink" => {
                    let target = self.hyperlink_target(child);
                    self.read_inline_container(child, target.as_deref().or(link), runs, page_break)?;
                }
                "commentRangeStart" => self.start_comment(child),
                "ins" | "smartTag" | "fldSimple" | "customXml" | "sdtContent" => {
                    self.read_inline_container(child, link, runs, page_break)?
                }
                "sdt" => {
                    if let Some(content) = child.children().find(|n| is_w(n, "sdtContent")) {
                        self.read_inline_container(content, link, runs, page_break)?;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn hyperlink_target(&self, node: Node) -> Option<String> {
        if let Some(id) = node.attribute((R_NS, "id")) {
            let target = self.relationships.get(id).cloned();
            if target.is_none() {
                warn!("Hyperlink relationship {id} is missing");
            }
            return target;
        }
        node.attribute((W_NS, "anchor"))
            .map(|anchor| format!("#{anchor}"))
    }

    fn read_run(
        &mut self,
        node: Node,
        link: Option<&str>,
        runs: &mut Vec<Run>,
        page_break: &mut bool,
    ) -> Result<(), FormatError> {
        let formatting = self.read_formatting(node.children().find(|n| is_w(n, "rPr")));
        let mut text = String::new();

        let push = |reader: &mut Self, content: RunContent, runs: &mut Vec<Run>| {
            runs.push(Run {
                content,
                formatting: formatting.clone(),
                link: link.map(str::to_string),
                comment: reader.pending_comment.take(),
            });
        };

        for child in node.children().filter(Node::is_element) {
            match child.tag_name().name() {
                "t" => text.push_str(child.text().unwrap_or("")),
                "tab" => text.push('\t'),
                "noBreakHyphen" => text.push('\u{2011}'),
                "br" if child.attribute((W_NS, "type")) == Some("page") => *page_break = true,
                "br" | "cr" => {
                    if !text.is_empty() {
                        push(self, RunContent::Text(std::mem::take(&mut text)), runs);
                    }
                    push(self, RunContent::Break, runs);
                }
                "drawing" | "pict" => {
                    if !text.is_empty() {
                        push(self, RunContent::Text(std::mem::take(&mut text)), runs);
                    }
                    match self.read_drawing(child)? {
                        Some(drawing) => push(self, RunContent::Drawing(drawing), runs),
                        None => warn!("Skipping a drawing without an embedded picture"),
                    }
                }
                _ => {}
            }
        }

        if !text.is_empty() {
            push(self, RunContent::Text(text), runs);
        }
        Ok(())
    }

    fn read_formatting(&self, rpr: Option<Node>) -> Formatting {
        let mut formatting = Formatting::default();
        let Some(rpr) = rpr else {
            return formatting;
        };

        for child in rpr.children().filter(Node::is_element) {
            match child.tag_name().name() {
                "b" => formatting.bold = flag_on(child),
                "i" => formatting.italic = flag_on(child),
                "strike" | "dstrike" => formatting.strike = formatting.strike || flag_on(child),
                "rFonts" => {
                    formatting.font = child
                        .attribute((W_NS, "ascii"))
                        .or_else(|| child.attribute((W_NS, "hAnsi")))
                        .map(str::to_string)
                }
                "vertAlign" => {
                    formatting.vertical = match child.attribute((W_NS, "val")) {
                        Some("superscript") => VerticalAlign::Superscript,
                        Some("subscript") => VerticalAlign::Subscript,
                        _ => VerticalAlign::Baseline,
                    }
                }
                "highlight" => {
                    formatting.highlight = child
                        .attribute((W_NS, "val"))
                        .filter(|v| *v != "none")
                        .map(str::to_string)
                }
                "rStyle" => {
                    if let Some(id) = child.attribute((W_NS, "val")) {
                        let name = self.style_name(id);
                        apply_character_style(&mut formatting, &name);
                        formatting.style = Some(name);
                    }
                }
                _ => {}
            }
        }
        formatting
    }

    fn read_drawing(&mut self, node: Node) -> Result<Option<Drawing>, FormatError> {
        let embed = node.descendants().find_map(|n| match n.tag_name().name() {
            "blip" => n.attribute((R_NS, "embed")),
            "imagedata" => n.attribute((R_NS, "id")),
            _ => None,
        });
        let Some(target) = embed
            .and_then(|id| self.relationships.get(id))
            .cloned()
        else {
            return Ok(None);
        };

        let part = resolve_part(&target);
        let Some(data) = self.read_binary(&part)? else {
            warn!("Picture part {part} is missing from the package");
            return Ok(None);
        };

        let alt_text = node
            .descendants()
            .find(|n| n.tag_name().name() == "docPr")
            .and_then(|doc_pr| doc_pr.attribute("descr").or_else(|| doc_pr.attribute("title")))
            .filter(|alt| !alt.trim().is_empty())
            .map(str::to_string);

        let file_name = part.rsplit('/').next().unwrap_or(&part).to_string();
        Ok(Some(Drawing {
            file_name,
            data,
            alt_text,
        }))
    }

    fn read_table(&mut self, node: Node) -> Result<Table, FormatError> {
        let mut table = Table::default();
        for tr in node.children().filter(|n| is_w(n, "tr")) {
            let mut row = TableRow::default();
            for tc in tr.children().filter(|n| is_w(n, "tc")) {
                let span = tc
                    .children()
                    .find(|n| is_w(n, "tcPr"))
                    .and_then(|tc_pr| child_val(tc_pr, "gridSpan"))
                    .and_then(|v| v.parse::<usize>().ok())
                    .unwrap_or(1);
                let blocks = self.read_blocks(tc)?;
                row.cells.push(TableCell::spanning(span, blocks));
            }
            table.rows.push(row);
        }
        Ok(table)
    }
}

fn parse_xml<'x>(xml: &'x str, part: &str) -> Result<roxmltree::Document<'x>, FormatError> {
    roxmltree::Document::parse(xml)
        .map_err(|e| FormatError::ParseError(format!("Malformed XML in {part}: {e}")))
}

fn is_w(node: &Node, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name && node.tag_name().namespace() == Some(W_NS)
}

/// `w:val` of the first child element called `name`.
fn child_val<'x>(node: Node<'x, 'x>, name: &str) -> Option<&'x str> {
    node.children()
        .find(|n| is_w(n, name))
        .and_then(|n| n.attribute((W_NS, "val")))
}

/// Toggle properties are on unless `w:val` says otherwise.
fn flag_on(node: Node) -> bool {
    !matches!(
        node.attribute((W_NS, "val")),
        Some("0" | "false" | "off" | "none")
    )
}

fn apply_character_style(formatting: &mut Formatting, style: &str) {
    match style {
        "Kbd" => formatting.kbd = true,
        "Superscript" => formatting.vertical = VerticalAlign::Superscript,
        "Subscript" => formatting.vertical = VerticalAlign::Subscript,
        "Strong" => formatting.bold = true,
        "Emphasis" => formatting.italic = true,
        _ => {}
    }
}

/// Relationship targets are relative to `word/`.
fn resolve_part(target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        absolute.to_string()
    } else if let Some(parent) = target.strip_prefix("../") {
        parent.to_string()
    } else {
        format!("word/{target}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    const DOC_HEAD: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><w:body>"#;
    const DOC_TAIL: &str = "</w:body></w:document>";

    fn package(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buffer);
            for (name, content) in parts {
                writer.start_file(*name, SimpleFileOptions::default()).unwrap();
                writer.write_all(content.as_bytes()).unwrap();
            }
            writer.finish().unwrap();
        }
        buffer.into_inner()
    }

    fn body(xml: &str) -> Vec<u8> {
        package(&[("word/document.xml", &format!("{DOC_HEAD}{xml}{DOC_TAIL}"))])
    }

    #[test]
    fn test_rejects_non_zip() {
        assert!(matches!(
            parse_from_docx(b"not a zip"),
            Err(FormatError::ParseError(_))
        ));
    }

    #[test]
    fn test_reads_runs_with_formatting() {
        let doc = parse_from_docx(&body(
            r#"<w:p><w:r><w:t xml:space="preserve">Plain </w:t></w:r><w:r><w:rPr><w:b/><w:rFonts w:ascii="Consolas"/></w:rPr><w:t>code</w:t></w:r><w:r><w:rPr><w:i w:val="0"/></w:rPr><w:t>x</w:t></w:r></w:p>"#,
        ))
        .unwrap();

        let Block::Paragraph(p) = &doc.blocks[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(p.runs.len(), 3);
        assert_eq!(p.runs[0].content, RunContent::Text("Plain ".to_string()));
        assert!(p.runs[1].formatting.bold);
        assert!(p.runs[1].formatting.is_monospace());
        assert!(!p.runs[2].formatting.italic);
    }

    #[test]
    fn test_out_of_range_list_level_is_clamped() {
        let document = format!(
            r#"{DOC_HEAD}<w:p><w:pPr><w:numPr><w:ilvl w:val="1000000"/><w:numId w:val="2"/></w:numPr></w:pPr><w:r><w:t>deep</w:t></w:r></w:p><w:p><w:pPr><w:numPr><w:ilvl w:val="-3"/><w:numId w:val="2"/></w:numPr></w:pPr><w:r><w:t>odd</w:t></w:r></w:p>{DOC_TAIL}"#
        );
        let doc = parse_from_docx(&package(&[("word/document.xml", &document)])).unwrap();

        let levels: Vec<_> = doc
            .blocks
            .iter()
            .filter_map(|block| match block {
                Block::Paragraph(p) => p.list.map(|l| l.level),
                _ => None,
            })
            .collect();
        assert_eq!(levels, vec![MAX_LIST_LEVEL, 0]);
    }

    #[test]
    fn test_style_names_and_numbering() {
        let styles = r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:style w:styleId="Heading2"><w:name w:val="heading 2"/></w:style></w:styles>"#;
        let numbering = r#"<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:abstractNum w:abstractNumId="3"><w:lvl w:ilvl="0"><w:numFmt w:val="decimal"/></w:lvl><w:lvl w:ilvl="1"><w:numFmt w:val="bullet"/></w:lvl></w:abstractNum><w:num w:numId="7"><w:abstractNumId w:val="3"/></w:num></w:numbering>"#;
        let document = format!(
            r#"{DOC_HEAD}<w:p><w:pPr><w:pStyle w:val="Heading2"/></w:pPr><w:r><w:t>Title</w:t></w:r></w:p><w:p><w:pPr><w:numPr><w:ilvl w:val="1"/><w:numId w:val="7"/></w:numPr></w:pPr><w:r><w:t>item</w:t></w:r></w:p>{DOC_TAIL}"#
        );
        let doc = parse_from_docx(&package(&[
            ("word/document.xml", &document),
            ("word/styles.xml", styles),
            ("word/numbering.xml", numbering),
        ]))
        .unwrap();

        let Block::Paragraph(heading) = &doc.blocks[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(heading.style.as_deref(), Some("heading 2"));

        let Block::Paragraph(item) = &doc.blocks[1] else {
            panic!("expected paragraph");
        };
        assert_eq!(
            item.list,
            Some(ListInfo {
                num_id: 7,
                level: 1,
                ordered: false
            })
        );
    }

    #[test]
    fn test_comment_attaches_to_first_run_in_range() {
        let comments = r#"<w:comments xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:comment w:id="0" w:author="mdocx"><w:p><w:r><w:t>mdocx-meta: directive:"code"</w:t></w:r></w:p></w:comment></w:comments>"#;
        let document = format!(
            r#"{DOC_HEAD}<w:p><w:r><w:t>before</w:t></w:r><w:commentRangeStart w:id="0"/><w:r><w:t>inside</w:t></w:r><w:commentRangeEnd w:id="0"/><w:r><w:commentReference w:id="0"/></w:r></w:p>{DOC_TAIL}"#
        );
        let doc = parse_from_docx(&package(&[
            ("word/document.xml", &document),
            ("word/comments.xml", comments),
        ]))
        .unwrap();

        let Block::Paragraph(p) = &doc.blocks[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(p.runs.len(), 2);
        assert!(p.runs[0].comment.is_none());
        let comment = p.runs[1].comment.as_ref().unwrap();
        assert_eq!(comment.text, "mdocx-meta: directive:\"code\"");
        assert_eq!(comment.author.as_deref(), Some("mdocx"));
    }

    #[test]
    fn test_table_spans_and_page_break() {
        let doc = parse_from_docx(&body(
            r#"<w:tbl><w:tblPr/><w:tblGrid/><w:tr><w:tc><w:tcPr><w:gridSpan w:val="2"/></w:tcPr><w:p><w:r><w:t>wide</w:t></w:r></w:p></w:tc></w:tr></w:tbl><w:p><w:r><w:br w:type="page"/></w:r></w:p>"#,
        ))
        .unwrap();

        assert_eq!(doc.blocks.len(), 2);
        let Block::Table(table) = &doc.blocks[0] else {
            panic!("expected table");
        };
        assert_eq!(table.rows[0].cells[0].span, 2);
        assert_eq!(table.rows[0].cells[0].blocks.len(), 1);
        assert_eq!(doc.blocks[1], Block::SectionBreak);
    }

    #[test]
    fn test_hyperlink_targets_from_relationships() {
        let rels = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId9" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com" TargetMode="External"/></Relationships>"#;
        let document = format!(
            r#"{DOC_HEAD}<w:p><w:hyperlink r:id="rId9"><w:r><w:t>site</w:t></w:r></w:hyperlink></w:p>{DOC_TAIL}"#
        );
        let doc = parse_from_docx(&package(&[
            ("word/document.xml", &document),
            ("word/_rels/document.xml.rels", rels),
        ]))
        .unwrap();

        let Block::Paragraph(p) = &doc.blocks[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(p.runs[0].link.as_deref(), Some("https://example.com"));
    }
}
