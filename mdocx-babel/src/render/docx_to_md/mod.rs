//! Word-processing model → Markdown model.
//!
//! Blocks are dispatched through [`BLOCK_PRIORITY`], runs through
//! [`run::RUN_PRIORITY`]. Paragraph renderers never build lists, code blocks or callouts
//! directly: they hand single items to a [`BlockSink`], which coalesces consecutive
//! list items, code lines and quote lines into one Markdown block and keeps track of
//! open zone directives.

mod image;
mod paragraph;
mod run;
mod table;

use super::{write_container, RenderContext, Renderer};
use crate::error::FormatError;
use crate::ir::docx;
use crate::ir::markdown::{
    AlertKind, Block, Document, Extension, List, ListItem, TripleColonElement,
};
use crate::ir::Attributes;
use log::warn;

pub use run::{RunRenderer, RUN_PRIORITY};

/// Lower a word-processing document into a Markdown document.
pub fn render_document(
    doc: &docx::Document,
    ctx: &mut RenderContext,
) -> Result<Document, FormatError> {
    let blocks = render_blocks(&doc.blocks, ctx)?;
    let front_matter = doc
        .title
        .as_deref()
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .map(|title| format!("title: {}", yaml_scalar(title)));
    Ok(Document {
        front_matter,
        blocks,
    })
}

/// Lower a block sequence with its own sink, as for a table cell.
pub(crate) fn render_blocks(
    blocks: &[docx::Block],
    ctx: &mut RenderContext,
) -> Result<Vec<Block>, FormatError> {
    let mut sink = BlockSink::default();
    write_container(BLOCK_PRIORITY, blocks, ctx, &mut sink)?;
    Ok(sink.finish())
}

fn yaml_scalar(value: &str) -> String {
    let plain = !value.contains([':', '#', '"', '\'', '\n'])
        && !value.starts_with(['-', '[', '{', '&', '*', '!', '|', '>', '%', '@', '`']);
    if plain {
        value.to_string()
    } else {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    }
}

/// Renderers for word-processing blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockRenderer {
    Table,
    SectionBreak,
    ZoneMarker,
    Code,
    Image,
    DirectivePlaceholder,
    Heading,
    ListItem,
    Callout,
    Plain,
}

pub const BLOCK_PRIORITY: &[BlockRenderer] = &[
    BlockRenderer::Table,
    BlockRenderer::SectionBreak,
    BlockRenderer::ZoneMarker,
    BlockRenderer::Code,
    BlockRenderer::Image,
    BlockRenderer::DirectivePlaceholder,
    BlockRenderer::Heading,
    BlockRenderer::ListItem,
    BlockRenderer::Callout,
    BlockRenderer::Plain,
];

impl Renderer for BlockRenderer {
    type Node = docx::Block;
    type Output = BlockSink;

    fn can_render(self, node: &docx::Block, _ctx: &RenderContext) -> bool {
        let para = match (self, node) {
            (BlockRenderer::Table, docx::Block::Table(_)) => return true,
            (BlockRenderer::SectionBreak, docx::Block::SectionBreak) => return true,
            (_, docx::Block::Paragraph(para)) => para,
            _ => return false,
        };
        match self {
            BlockRenderer::ZoneMarker => paragraph::zone_marker(para).is_some(),
            BlockRenderer::Code => paragraph::is_code(para),
            BlockRenderer::Image => paragraph::sole_drawing(para).is_some(),
            BlockRenderer::DirectivePlaceholder => paragraph::sole_code_directive(para).is_some(),
            BlockRenderer::Heading => paragraph::heading_level(para).is_some(),
            BlockRenderer::ListItem => para.list.is_some(),
            BlockRenderer::Callout => paragraph::callout(para).is_some(),
            BlockRenderer::Plain => true,
            BlockRenderer::Table | BlockRenderer::SectionBreak => false,
        }
    }

    fn render(
        self,
        node: &docx::Block,
        ctx: &mut RenderContext,
        sink: &mut BlockSink,
    ) -> Result<(), FormatError> {
        let para = match node {
            docx::Block::Table(table) => {
                let table = table::render_table(table, ctx)?;
                sink.push(Block::Table(table));
                return Ok(());
            }
            docx::Block::SectionBreak => {
                sink.push(Block::ThematicBreak);
                return Ok(());
            }
            docx::Block::Paragraph(para) => para,
            docx::Block::Unknown(_) => return Ok(()),
        };

        match self {
            BlockRenderer::ZoneMarker => match paragraph::zone_marker(para) {
                Some(paragraph::ZoneMarker::Open(attributes)) => sink.open_zone(attributes),
                Some(paragraph::ZoneMarker::Close) => sink.close_zone(),
                None => {}
            },
            BlockRenderer::Code => paragraph::render_code_line(para, sink),
            BlockRenderer::Image => {
                if let Some(run) = paragraph::sole_drawing(para) {
                    paragraph::render_image(run, ctx, sink)?;
                }
            }
            BlockRenderer::DirectivePlaceholder => {
                if let Some(attributes) = paragraph::sole_code_directive(para) {
                    sink.push(Block::TripleColon(TripleColonElement::new(
                        Extension::Code,
                        attributes,
                    )));
                }
            }
            BlockRenderer::Heading => {
                if let Some(level) = paragraph::heading_level(para) {
                    paragraph::render_heading(para, level, ctx, sink)?;
                }
            }
            BlockRenderer::ListItem => {
                if let Some(info) = para.list {
                    paragraph::render_list_item(para, info, ctx, sink)?;
                }
            }
            BlockRenderer::Callout => {
                if let Some(callout) = paragraph::callout(para) {
                    paragraph::render_callout(para, callout, ctx, sink)?;
                }
            }
            BlockRenderer::Plain => paragraph::render_plain(para, ctx, sink)?,
            BlockRenderer::Table | BlockRenderer::SectionBreak => {}
        }
        Ok(())
    }
}

/// Which kind of multi-paragraph block the last pushed block may still absorb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Open {
    List(usize),
    Code,
    Quote,
    Alert(AlertKind),
}

#[derive(Debug)]
struct OpenZone {
    attributes: Attributes,
    blocks: Vec<Block>,
}

/// Output of block rendering.
#[derive(Debug, Default)]
pub struct BlockSink {
    root: Vec<Block>,
    zones: Vec<OpenZone>,
    open: Option<Open>,
}

impl BlockSink {
    fn target(&mut self) -> &mut Vec<Block> {
        match self.zones.last_mut() {
            Some(zone) => &mut zone.blocks,
            None => &mut self.root,
        }
    }

    /// Append a standalone block, ending any coalescing run.
    pub fn push(&mut self, block: Block) {
        self.open = None;
        self.target().push(block);
    }

    /// The last block, when it is still absorbing paragraphs of kind `open`.
    fn continuing(&mut self, open: Open) -> Option<&mut Block> {
        if self.open == Some(open) {
            self.target().last_mut()
        } else {
            None
        }
    }

    fn begin(&mut self, open: Open, block: Block) {
        self.target().push(block);
        self.open = Some(open);
    }

    fn push_code_line(&mut self, language: Option<String>, line: String) {
        if let Some(Block::CodeBlock { literal, .. }) = self.continuing(Open::Code) {
            literal.push('\n');
            literal.push_str(&line);
            return;
        }
        self.begin(
            Open::Code,
            Block::CodeBlock {
                language,
                literal: line,
            },
        );
    }

    fn push_quoted(&mut self, open: Open, block: Block) {
        match self.continuing(open) {
            Some(Block::Quote(blocks)) | Some(Block::Alert { blocks, .. }) => blocks.push(block),
            _ => {
                let container = match open {
                    Open::Alert(kind) => Block::Alert {
                        kind,
                        blocks: vec![block],
                    },
                    _ => Block::Quote(vec![block]),
                };
                self.begin(open, container);
            }
        }
    }

    fn push_list_item(&mut self, info: docx::ListInfo, item: ListItem) {
        let continuing =
            matches!(self.open, Some(Open::List(id)) if info.level > 0 || id == info.num_id);
        if !continuing {
            self.begin(Open::List(info.num_id), Block::List(List::new(info.ordered)));
        }
        if let Some(Block::List(list)) = self.target().last_mut() {
            insert_at_level(list, info.level.min(docx::MAX_LIST_LEVEL), info.ordered, item);
        }
    }

    fn open_zone(&mut self, attributes: Attributes) {
        self.open = None;
        self.zones.push(OpenZone {
            attributes,
            blocks: Vec::new(),
        });
    }

    fn close_zone(&mut self) {
        match self.zones.pop() {
            Some(zone) => {
                let element = TripleColonElement::new(Extension::Zone, zone.attributes)
                    .with_blocks(zone.blocks);
                self.push(Block::TripleColon(element));
            }
            None => warn!("Zone end marker without an open zone; ignoring it"),
        }
    }

    /// Close whatever is still open and return the blocks.
    pub fn finish(mut self) -> Vec<Block> {
        while let Some(zone) = self.zones.pop() {
            warn!("Zone without an end marker; closing it at the end of its container");
            let mut element =
                TripleColonElement::new(Extension::Zone, zone.attributes).with_blocks(zone.blocks);
            element.closed = false;
            self.push(Block::TripleColon(element));
        }
        self.root
    }
}

fn insert_at_level(list: &mut List, level: usize, ordered: bool, item: ListItem) {
    if level == 0 {
        list.items.push(item);
        return;
    }
    let Some(parent) = list.items.last_mut() else {
        list.items.push(item);
        return;
    };
    if !matches!(parent.blocks.last(), Some(Block::List(_))) {
        parent.blocks.push(Block::List(List::new(ordered)));
    }
    if let Some(Block::List(child)) = parent.blocks.last_mut() {
        insert_at_level(child, level - 1, ordered, item);
    }
}
