//! Markdown model → word-processing model.
//!
//! | Markdown            | Word                                              |
//! |---------------------|---------------------------------------------------|
//! | heading N           | paragraph styled "Heading N"                      |
//! | list item           | numbered paragraph, one numbering per top list    |
//! | fenced code         | one "Code Block" paragraph per line               |
//! | quote / alert       | paragraphs styled "Block Quote" / "Alert Kind"    |
//! | thematic break      | section (page) break                              |
//! | pipe / `:::row:::`  | table with column spans                           |
//! | `:::directive:::`   | see [`triple_colon`]                              |
//!
//! Raw HTML blocks have no Word counterpart: their renderer drops them with a warning.

mod inline;
mod table;
pub mod triple_colon;

use super::{write_container, Parent, RenderContext, Renderer};
use crate::common::metadata;
use crate::diff::yaml;
use crate::error::FormatError;
use crate::ir::docx::{self, ListInfo, Paragraph, Run};
use crate::ir::markdown::{Block, Document, List};
use crate::ir::Attributes;
use log::warn;

pub use inline::{InlineRenderer, RunSink, INLINE_PRIORITY};

const CODE_STYLE: &str = "Code Block";
const QUOTE_STYLE: &str = "Block Quote";

/// Lower a Markdown document into a word-processing document. Of the front matter only
/// `title` is carried, as the document title.
pub fn render_document(
    doc: &Document,
    ctx: &mut RenderContext,
) -> Result<docx::Document, FormatError> {
    let mut blocks = Vec::new();
    write_container(BLOCK_PRIORITY, &doc.blocks, ctx, &mut blocks)?;
    let mut out = docx::Document::new(blocks);
    out.title = doc
        .front_matter
        .as_deref()
        .and_then(|front_matter| yaml::root_value(&yaml::parse_yaml(front_matter), "title"));
    Ok(out)
}

/// Renderers for Markdown blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockRenderer {
    Directive,
    Heading,
    Paragraph,
    List,
    Code,
    Table,
    Quote,
    Alert,
    ThematicBreak,
    Html,
}

pub const BLOCK_PRIORITY: &[BlockRenderer] = &[
    BlockRenderer::Directive,
    BlockRenderer::Heading,
    BlockRenderer::Paragraph,
    BlockRenderer::List,
    BlockRenderer::Code,
    BlockRenderer::Table,
    BlockRenderer::Quote,
    BlockRenderer::Alert,
    BlockRenderer::ThematicBreak,
    BlockRenderer::Html,
];

impl Renderer for BlockRenderer {
    type Node = Block;
    type Output = Vec<docx::Block>;

    fn can_render(self, node: &Block, _ctx: &RenderContext) -> bool {
        matches!(
            (self, node),
            (BlockRenderer::Directive, Block::TripleColon(_))
                | (BlockRenderer::Heading, Block::Heading { .. })
                | (BlockRenderer::Paragraph, Block::Paragraph(_))
                | (BlockRenderer::List, Block::List(_))
                | (BlockRenderer::Code, Block::CodeBlock { .. })
                | (BlockRenderer::Table, Block::Table(_))
                | (BlockRenderer::Quote, Block::Quote(_))
                | (BlockRenderer::Alert, Block::Alert { .. })
                | (BlockRenderer::ThematicBreak, Block::ThematicBreak)
                | (BlockRenderer::Html, Block::Html(_))
        )
    }

    fn render(
        self,
        node: &Block,
        ctx: &mut RenderContext,
        out: &mut Vec<docx::Block>,
    ) -> Result<(), FormatError> {
        match node {
            Block::TripleColon(element) => triple_colon::render_block(element, ctx, out),
            Block::Heading { level, content } => {
                let mut para = Paragraph::styled(format!("Heading {}", (*level).clamp(1, 6)));
                para.runs = inline::render_inlines(content, ctx)?;
                out.push(docx::Block::Paragraph(para));
                Ok(())
            }
            Block::Paragraph(content) => {
                let runs = inline::render_inlines(content, ctx)?;
                if !runs.is_empty() {
                    out.push(docx::Block::Paragraph(Paragraph {
                        style: callout_style(ctx),
                        list: None,
                        runs,
                    }));
                }
                Ok(())
            }
            Block::List(list) => render_list(list, ctx, out),
            Block::CodeBlock { language, literal } => {
                render_code(language.as_deref(), literal, ctx, out);
                Ok(())
            }
            Block::Table(table) => {
                out.push(docx::Block::Table(table::render_table(table, ctx)?));
                Ok(())
            }
            Block::Quote(blocks) => {
                ctx.scoped(Parent::Quote, |ctx| write_container(BLOCK_PRIORITY, blocks, ctx, out))
            }
            Block::Alert { kind, blocks } => ctx.scoped(Parent::Alert(*kind), |ctx| {
                write_container(BLOCK_PRIORITY, blocks, ctx, out)
            }),
            Block::ThematicBreak => {
                out.push(docx::Block::SectionBreak);
                Ok(())
            }
            Block::Html(html) => {
                warn!("Dropping raw HTML block {:?}", html.trim());
                Ok(())
            }
        }
    }
}

/// Paragraph style given by the innermost enclosing quote or alert.
fn callout_style(ctx: &RenderContext) -> Option<String> {
    ctx.parents().iter().rev().find_map(|parent| match parent {
        Parent::Quote => Some(QUOTE_STYLE.to_string()),
        Parent::Alert(kind) => Some(kind.style_name().to_string()),
        _ => None,
    })
}

fn render_list(
    list: &List,
    ctx: &mut RenderContext,
    out: &mut Vec<docx::Block>,
) -> Result<(), FormatError> {
    let num_id = match ctx.list_num_id {
        Some(id) if ctx.list_depth > 0 => id,
        _ => ctx.allocate_num_id(),
    };
    let info = ListInfo {
        num_id,
        level: ctx.list_depth.min(docx::MAX_LIST_LEVEL),
        ordered: list.ordered,
    };

    let saved = (ctx.list_depth, ctx.list_num_id);
    ctx.list_depth += 1;
    ctx.list_num_id = Some(num_id);

    let result = list.items.iter().try_for_each(|item| {
        let mut blocks = Vec::new();
        ctx.scoped(Parent::ListItem, |ctx| {
            write_container(BLOCK_PRIORITY, &item.blocks, ctx, &mut blocks)
        })?;
        attach_numbering(&mut blocks, info);
        out.extend(blocks);
        Ok::<(), FormatError>(())
    });

    (ctx.list_depth, ctx.list_num_id) = saved;
    result
}

/// Number the item's first paragraph, or lead with an empty numbered one when the
/// item starts with something else.
fn attach_numbering(blocks: &mut Vec<docx::Block>, info: ListInfo) {
    if let Some(docx::Block::Paragraph(para)) = blocks.first_mut() {
        if para.list.is_none() {
            para.list = Some(info);
            return;
        }
    }
    let mut marker = Paragraph::new();
    marker.list = Some(info);
    blocks.insert(0, docx::Block::Paragraph(marker));
}

fn render_code(
    language: Option<&str>,
    literal: &str,
    ctx: &RenderContext,
    out: &mut Vec<docx::Block>,
) {
    for (idx, line) in literal.split('\n').enumerate() {
        let mut para = Paragraph::styled(CODE_STYLE);
        let language = language.filter(|_| idx == 0);
        if !line.is_empty() || language.is_some() {
            let mut run = Run::text(line);
            if let Some(language) = language {
                run.comment = Some(metadata::to_comment(
                    &Attributes::new().with("language", language),
                    ctx.options.comment_author.as_deref(),
                ));
            }
            para.runs.push(run);
        }
        out.push(docx::Block::Paragraph(para));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::markdown::parser::parse_from_markdown;
    use crate::ir::docx::RunContent;
    use crate::ir::markdown::AlertKind;
    use crate::render::find_renderer;

    fn render(source: &str) -> Vec<docx::Block> {
        let doc = parse_from_markdown(source).unwrap();
        let mut ctx = RenderContext::default();
        render_document(&doc, &mut ctx).unwrap().blocks
    }

    fn paragraph(block: &docx::Block) -> &Paragraph {
        match block {
            docx::Block::Paragraph(para) => para,
            other => panic!("expected paragraph, got {other:?}"),
        }
    }

    #[test]
    fn raw_html_blocks_have_a_dropping_renderer() {
        let doc = parse_from_markdown("<div>\nboxed\n</div>\n\nAfter.\n").unwrap();
        assert!(matches!(doc.blocks[0], Block::Html(_)));
        let ctx = RenderContext::default();
        assert_eq!(
            find_renderer(BLOCK_PRIORITY, &doc.blocks[0], &ctx),
            Some(BlockRenderer::Html)
        );

        let blocks = render("<div>\nboxed\n</div>\n\nAfter.\n");
        assert_eq!(blocks.len(), 1);
        assert_eq!(paragraph(&blocks[0]).text(), "After.");
    }

    #[test]
    fn headings_get_heading_styles() {
        let blocks = render("## Setup\n\nBody text.\n");
        assert_eq!(paragraph(&blocks[0]).style.as_deref(), Some("Heading 2"));
        assert_eq!(paragraph(&blocks[0]).text(), "Setup");
        assert_eq!(paragraph(&blocks[1]).style, None);
    }

    #[test]
    fn lists_share_numbering_per_top_level_list() {
        let blocks = render("- a\n  1. inner\n- b\n\ntext\n\n- c\n");
        let infos: Vec<_> = blocks
            .iter()
            .filter_map(|block| paragraph(block).list)
            .map(|info| (info.num_id, info.level, info.ordered))
            .collect();
        assert_eq!(
            infos,
            vec![(1, 0, false), (1, 1, true), (1, 0, false), (2, 0, false)]
        );
    }

    #[test]
    fn code_block_lines_become_paragraphs() {
        let blocks = render("```rust\nfn main() {\n\n}\n```\n");
        assert_eq!(blocks.len(), 3);
        let first = paragraph(&blocks[0]);
        assert_eq!(first.style.as_deref(), Some(CODE_STYLE));
        let language = metadata::from_comment(first.runs[0].comment.as_ref()).unwrap();
        assert_eq!(language.get("language"), Some("rust"));
        assert!(paragraph(&blocks[1]).runs.is_empty());
        assert_eq!(paragraph(&blocks[2]).text(), "}");
    }

    #[test]
    fn alerts_style_their_paragraphs() {
        let blocks = render("> [!NOTE]\n> Read this.\n");
        assert_eq!(
            paragraph(&blocks[0]).style.as_deref(),
            Some(AlertKind::Note.style_name())
        );
    }

    #[test]
    fn thematic_break_is_section_break() {
        let blocks = render("before\n\n***\n\nafter\n");
        assert_eq!(blocks[1], docx::Block::SectionBreak);
    }

    #[test]
    fn html_blocks_are_dropped() {
        let blocks = render("<div>raw</div>\n\nkept\n");
        assert_eq!(blocks.len(), 1);
        assert_eq!(paragraph(&blocks[0]).text(), "kept");
    }

    #[test]
    fn emphasis_becomes_run_formatting() {
        let blocks = render("plain **bold** _it_ `code`\n");
        let runs = &paragraph(&blocks[0]).runs;
        let find = |needle: &str| {
            runs.iter()
                .find(|run| matches!(&run.content, RunContent::Text(t) if t == needle))
                .map(|run| run.formatting.clone())
                .unwrap()
        };
        assert!(find("bold").bold);
        assert!(find("it").italic);
        assert_eq!(find("code").font.as_deref(), Some("Consolas"));
    }

    #[test]
    fn front_matter_title_becomes_document_title() {
        let doc = parse_from_markdown("---\ntitle: \"Install: Windows\"\nms.date: 2024\n---\n\nBody\n")
            .unwrap();
        let out = render_document(&doc, &mut RenderContext::default()).unwrap();
        assert_eq!(out.title.as_deref(), Some("Install: Windows"));
    }
}
