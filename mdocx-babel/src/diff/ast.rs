//! Positional tree diff.
//!
//! Both trees are reduced to [`DiffNode`]s, a label per node plus children, and walked
//! in lockstep. Siblings pair by index only: once one side runs out, every remaining
//! node of the other side (descendants included) is an addition or deletion. Paired
//! nodes with different labels are one change and are not descended into.

use super::yaml::YamlData;
use super::Difference;
use crate::common::triple_colon::format_open;
use crate::formats::markdown::serializer::render_inlines;
use crate::ir::docx;
use crate::ir::markdown::{self, DirectiveChildren};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffNode {
    pub label: String,
    pub children: Vec<DiffNode>,
}

impl DiffNode {
    pub fn leaf(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            children: Vec::new(),
        }
    }

    pub fn branch(label: impl Into<String>, children: Vec<DiffNode>) -> Self {
        Self {
            label: label.into(),
            children,
        }
    }
}

pub fn diff_trees(original: &[DiffNode], new: &[DiffNode]) -> Vec<Difference> {
    let mut out = Vec::new();
    walk(original, new, "", &mut out);
    out
}

fn walk(original: &[DiffNode], new: &[DiffNode], prefix: &str, out: &mut Vec<Difference>) {
    for idx in 0..original.len().max(new.len()) {
        let position = if prefix.is_empty() {
            (idx + 1).to_string()
        } else {
            format!("{prefix}.{}", idx + 1)
        };
        match (original.get(idx), new.get(idx)) {
            (Some(a), Some(b)) if a.label != b.label => {
                out.push(Difference::changed(&position, &a.label, &b.label));
            }
            (Some(a), Some(b)) => walk(&a.children, &b.children, &position, out),
            (Some(a), None) => report_subtree(a, &position, false, out),
            (None, Some(b)) => report_subtree(b, &position, true, out),
            (None, None) => {}
        }
    }
}

fn report_subtree(node: &DiffNode, position: &str, added: bool, out: &mut Vec<Difference>) {
    out.push(if added {
        Difference::added(position, &node.label)
    } else {
        Difference::deleted(position, &node.label)
    });
    for (idx, child) in node.children.iter().enumerate() {
        report_subtree(child, &format!("{position}.{}", idx + 1), added, out);
    }
}

/// One node per line of plain text.
pub fn from_lines(text: &str) -> Vec<DiffNode> {
    text.lines().map(DiffNode::leaf).collect()
}

pub fn from_yaml(entries: &[YamlData]) -> Vec<DiffNode> {
    entries
        .iter()
        .map(|entry| DiffNode::branch(entry.label(), from_yaml(&entry.children)))
        .collect()
}

pub fn from_markdown(doc: &markdown::Document) -> Vec<DiffNode> {
    let mut nodes = Vec::new();
    if let Some(front_matter) = &doc.front_matter {
        nodes.push(DiffNode::branch(
            "front-matter",
            from_yaml(&super::yaml::parse_yaml(front_matter)),
        ));
    }
    nodes.extend(doc.blocks.iter().map(markdown_block));
    nodes
}

fn markdown_blocks(blocks: &[markdown::Block]) -> Vec<DiffNode> {
    blocks.iter().map(markdown_block).collect()
}

fn markdown_block(block: &markdown::Block) -> DiffNode {
    use markdown::Block;
    match block {
        Block::Paragraph(inlines) => {
            DiffNode::leaf(format!("paragraph: {}", collapse(&render_inlines(inlines))))
        }
        Block::Heading { level, content } => DiffNode::leaf(format!(
            "heading{level}: {}",
            collapse(&render_inlines(content))
        )),
        Block::List(list) => DiffNode::branch(
            if list.ordered { "ordered-list" } else { "bullet-list" },
            list.items
                .iter()
                .map(|item| DiffNode::branch("item", markdown_blocks(&item.blocks)))
                .collect(),
        ),
        Block::Table(table) => DiffNode::branch(
            "table",
            table
                .rows
                .iter()
                .map(|row| {
                    DiffNode::branch(
                        "row",
                        row.cells
                            .iter()
                            .map(|cell| {
                                DiffNode::branch(
                                    format!("cell span={}", cell.span),
                                    markdown_blocks(&cell.blocks),
                                )
                            })
                            .collect(),
                    )
                })
                .collect(),
        ),
        Block::CodeBlock { language, literal } => DiffNode::leaf(format!(
            "code-block[{}]: {literal}",
            language.as_deref().unwrap_or_default()
        )),
        Block::Quote(blocks) => DiffNode::branch("quote", markdown_blocks(blocks)),
        Block::Alert { kind, blocks } => {
            DiffNode::branch(format!("alert {}", kind.label()), markdown_blocks(blocks))
        }
        Block::Html(html) => DiffNode::leaf(format!("html: {}", html.trim())),
        Block::ThematicBreak => DiffNode::leaf("thematic-break"),
        Block::TripleColon(element) => {
            let label = format!(
                "directive: {}",
                format_open(element.extension.name(), &element.attributes)
            );
            match &element.children {
                DirectiveChildren::Blocks(blocks) => {
                    DiffNode::branch(label, markdown_blocks(blocks))
                }
                _ => DiffNode::leaf(label),
            }
        }
    }
}

/// Word document tree. Empty paragraphs are skipped and run boundaries are ignored, so
/// re-splitting text into runs or moving whitespace across a formatting edge is no
/// difference.
pub fn from_docx(doc: &docx::Document) -> Vec<DiffNode> {
    docx_blocks(&doc.blocks)
}

fn docx_blocks(blocks: &[docx::Block]) -> Vec<DiffNode> {
    blocks.iter().filter_map(docx_block).collect()
}

fn docx_block(block: &docx::Block) -> Option<DiffNode> {
    match block {
        docx::Block::Paragraph(para) => {
            let text = paragraph_text(para);
            if text.is_empty() {
                return None;
            }
            let style = para
                .style
                .as_deref()
                .filter(|style| !style.eq_ignore_ascii_case("normal"))
                .map(|style| format!("[{style}]"))
                .unwrap_or_default();
            let list = para
                .list
                .map(|info| {
                    format!(
                        "[{} {}]",
                        if info.ordered { "ordered" } else { "bullet" },
                        info.level
                    )
                })
                .unwrap_or_default();
            Some(DiffNode::leaf(format!("paragraph{style}{list}: {text}")))
        }
        docx::Block::Table(table) => Some(DiffNode::branch(
            "table",
            table
                .rows
                .iter()
                .map(|row| {
                    DiffNode::branch(
                        "row",
                        row.cells
                            .iter()
                            .map(|cell| {
                                DiffNode::branch(
                                    format!("cell span={}", cell.span),
                                    docx_blocks(&cell.blocks),
                                )
                            })
                            .collect(),
                    )
                })
                .collect(),
        )),
        docx::Block::SectionBreak => Some(DiffNode::leaf("section-break")),
        docx::Block::Unknown(name) => Some(DiffNode::leaf(format!("unknown: {name}"))),
    }
}

/// Paragraph text with formatted stretches marked as `[flags]{text}`.
fn paragraph_text(para: &docx::Paragraph) -> String {
    let mut segments: Vec<(String, String)> = Vec::new();
    for run in &para.runs {
        let (flags, text) = match &run.content {
            docx::RunContent::Text(text) => (run_flags(run), text.clone()),
            docx::RunContent::Drawing(drawing) => {
                (String::new(), format!("[image:{}]", drawing.file_name))
            }
            docx::RunContent::Break => (String::new(), "\n".to_string()),
        };
        match segments.last_mut() {
            Some((last_flags, last_text)) if *last_flags == flags => last_text.push_str(&text),
            _ => segments.push((flags, text)),
        }
    }

    let mut out = String::new();
    for (flags, text) in segments {
        if flags.is_empty() || text.trim().is_empty() {
            out.push_str(&text);
            continue;
        }
        let lead = &text[..text.len() - text.trim_start().len()];
        let trail = &text[text.trim_end().len()..];
        out.push_str(&format!("{lead}[{flags}]{{{}}}{trail}", text.trim()));
    }
    collapse(&out)
}

fn run_flags(run: &docx::Run) -> String {
    let f = &run.formatting;
    let mut flags = Vec::new();
    if f.is_bold() {
        flags.push("b");
    }
    if f.italic {
        flags.push("i");
    }
    if f.strike {
        flags.push("s");
    }
    if f.kbd {
        flags.push("kbd");
    } else if f.is_monospace() {
        flags.push("mono");
    }
    match f.vertical {
        docx::VerticalAlign::Superscript => flags.push("sup"),
        docx::VerticalAlign::Subscript => flags.push("sub"),
        docx::VerticalAlign::Baseline => {}
    }
    if f.highlight.is_some() {
        flags.push("mark");
    }
    let mut out = flags.join(",");
    if let Some(link) = &run.link {
        if !out.is_empty() {
            out.push(',');
        }
        out.push_str("link=");
        out.push_str(link);
    }
    out
}

/// Trim and collapse whitespace runs to one space.
fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
