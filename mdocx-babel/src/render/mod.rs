//! Tree lowering between the two document models.
//!
//! Each direction keeps, per node kind, a fixed list of renderers in priority order.
//! [`find_renderer`] returns the first one whose `can_render` accepts a node;
//! [`write_element`] runs it, and [`write_container`] does so for a sequence of siblings
//! in order. A node no renderer accepts is logged and dropped, so an unknown construct
//! never aborts a whole document.
//!
//! Renderers are plain `Copy` enums. Everything that changes during a walk lives in
//! [`RenderContext`], which the walk threads by `&mut` through every call, including the
//! re-entrant ones made for table cells, list items and directive bodies.
//!
//! - [`docx_to_md`]: word-processing model → Markdown model
//! - [`md_to_docx`]: Markdown model → word-processing model, including directives

pub mod docx_to_md;
pub mod md_to_docx;

use crate::error::FormatError;
use crate::ir::markdown::AlertKind;
use log::warn;
use std::path::{Path, PathBuf};

/// Conversion options shared by both directions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Target zone pivot. `None` keeps every pivot between visible markers.
    pub zone_pivot: Option<String>,
    /// Write only CommonMark/HTML for images instead of `:::image:::` directives.
    pub plain_markdown: bool,
    /// Folder, relative to the Markdown file, that receives extracted media.
    pub media_folder: String,
    /// Turn a missing required directive attribute into an error instead of a skip.
    pub strict_directives: bool,
    /// Author written on metadata comments.
    pub comment_author: Option<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            zone_pivot: None,
            plain_markdown: false,
            media_folder: "media".to_string(),
            strict_directives: false,
            comment_author: None,
        }
    }
}

/// What the node currently being rendered sits inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parent {
    Document,
    ListItem,
    TableCell,
    Quote,
    Alert(AlertKind),
    Directive,
}

/// Per-conversion state threaded through a walk.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub options: RenderOptions,
    /// Current list nesting, 0 outside lists.
    pub list_depth: usize,
    /// Numbering instance of the list being written, when inside one.
    pub list_num_id: Option<usize>,
    parents: Vec<Parent>,
    /// Markdown file being written; extracted media lands next to it.
    pub destination: Option<PathBuf>,
    /// Directory relative Markdown image sources resolve against.
    pub source_dir: Option<PathBuf>,
    /// Media files written so far, in write order.
    pub written_media: Vec<PathBuf>,
    next_num_id: usize,
}

impl RenderContext {
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            list_depth: 0,
            list_num_id: None,
            parents: Vec::new(),
            destination: None,
            source_dir: None,
            written_media: Vec::new(),
            next_num_id: 1,
        }
    }

    pub fn with_destination(mut self, path: impl AsRef<Path>) -> Self {
        self.destination = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_source_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.source_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Innermost enclosing node kind.
    pub fn parent(&self) -> Parent {
        self.parents.last().copied().unwrap_or(Parent::Document)
    }

    /// Enclosing node kinds, outermost first.
    pub fn parents(&self) -> &[Parent] {
        &self.parents
    }

    pub fn is_inside(&self, parent: Parent) -> bool {
        self.parents.contains(&parent)
    }

    /// Run `f` with `parent` pushed on the parent stack.
    pub fn scoped<T>(&mut self, parent: Parent, f: impl FnOnce(&mut Self) -> T) -> T {
        self.parents.push(parent);
        let result = f(self);
        self.parents.pop();
        result
    }

    /// Run `f` with list nesting reset, as inside a table cell.
    pub fn detached_from_lists<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = std::mem::take(&mut self.list_depth);
        let result = f(self);
        self.list_depth = saved;
        result
    }

    /// Directory of the destination Markdown file.
    pub fn destination_dir(&self) -> Option<&Path> {
        self.destination.as_deref().and_then(Path::parent)
    }

    /// Allocate a fresh numbering instance for a new top-level list.
    pub fn allocate_num_id(&mut self) -> usize {
        let id = self.next_num_id;
        self.next_num_id += 1;
        id
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new(RenderOptions::default())
    }
}

/// A node kind name for diagnostics.
pub trait NodeKind {
    fn kind(&self) -> &str;
}

/// One way of lowering one node kind.
pub trait Renderer: Copy + std::fmt::Debug {
    type Node: NodeKind + ?Sized;
    type Output;

    fn can_render(self, node: &Self::Node, ctx: &RenderContext) -> bool;

    fn render(
        self,
        node: &Self::Node,
        ctx: &mut RenderContext,
        out: &mut Self::Output,
    ) -> Result<(), FormatError>;
}

/// First renderer in `priority` that accepts `node`.
pub fn find_renderer<R: Renderer>(
    priority: &[R],
    node: &R::Node,
    ctx: &RenderContext,
) -> Option<R> {
    priority
        .iter()
        .copied()
        .find(|renderer| renderer.can_render(node, ctx))
}

/// Render one node, or log and skip it when nothing accepts it.
pub fn write_element<R: Renderer>(
    priority: &[R],
    node: &R::Node,
    ctx: &mut RenderContext,
    out: &mut R::Output,
) -> Result<(), FormatError> {
    match find_renderer(priority, node, ctx) {
        Some(renderer) => renderer.render(node, ctx, out),
        None => {
            warn!("No renderer for {} node; skipping it", node.kind());
            Ok(())
        }
    }
}

/// Render a sequence of sibling nodes in order.
pub fn write_container<R>(
    priority: &[R],
    nodes: &[R::Node],
    ctx: &mut RenderContext,
    out: &mut R::Output,
) -> Result<(), FormatError>
where
    R: Renderer,
    R::Node: Sized,
{
    for node in nodes {
        write_element(priority, node, ctx, out)?;
    }
    Ok(())
}

impl NodeKind for crate::ir::docx::Block {
    fn kind(&self) -> &str {
        crate::ir::docx::Block::kind(self)
    }
}

impl NodeKind for crate::ir::docx::Run {
    fn kind(&self) -> &str {
        match self.content {
            crate::ir::docx::RunContent::Text(_) => "text run",
            crate::ir::docx::RunContent::Drawing(_) => "drawing run",
            crate::ir::docx::RunContent::Break => "break run",
        }
    }
}

impl NodeKind for crate::ir::markdown::Block {
    fn kind(&self) -> &str {
        crate::ir::markdown::Block::kind(self)
    }
}

impl NodeKind for crate::ir::markdown::Inline {
    fn kind(&self) -> &str {
        use crate::ir::markdown::Inline;
        match self {
            Inline::Text(_) => "text",
            Inline::Strong(_) => "strong",
            Inline::Emphasis(_) => "emphasis",
            Inline::Strikethrough(_) => "strikethrough",
            Inline::Code(_) => "code",
            Inline::Link { .. } => "link",
            Inline::Image { .. } => "image",
            Inline::LineBreak => "line break",
            Inline::SoftBreak => "soft break",
            Inline::Html(_) => "inline html",
            Inline::Tagged { .. } => "tagged",
            Inline::TripleColon(_) => "inline directive",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Item(i32);

    impl NodeKind for Item {
        fn kind(&self) -> &str {
            "item"
        }
    }

    #[derive(Debug, Clone, Copy)]
    enum TestRenderer {
        Even,
        Positive,
    }

    impl Renderer for TestRenderer {
        type Node = Item;
        type Output = Vec<String>;

        fn can_render(self, node: &Item, _ctx: &RenderContext) -> bool {
            match self {
                TestRenderer::Even => node.0 % 2 == 0,
                TestRenderer::Positive => node.0 > 0,
            }
        }

        fn render(
            self,
            node: &Item,
            ctx: &mut RenderContext,
            out: &mut Vec<String>,
        ) -> Result<(), FormatError> {
            ctx.list_depth += 1;
            out.push(format!("{self:?}:{}", node.0));
            Ok(())
        }
    }

    const PRIORITY: &[TestRenderer] = &[TestRenderer::Even, TestRenderer::Positive];

    #[test]
    fn first_matching_renderer_wins() {
        let ctx = RenderContext::default();
        assert!(matches!(
            find_renderer(PRIORITY, &Item(4), &ctx),
            Some(TestRenderer::Even)
        ));
        assert!(matches!(
            find_renderer(PRIORITY, &Item(3), &ctx),
            Some(TestRenderer::Positive)
        ));
        assert!(find_renderer(PRIORITY, &Item(-3), &ctx).is_none());
    }

    #[test]
    fn unmatched_nodes_are_skipped_in_order() {
        let mut ctx = RenderContext::default();
        let mut out = Vec::new();
        write_container(PRIORITY, &[Item(1), Item(-1), Item(2)], &mut ctx, &mut out).unwrap();
        assert_eq!(out, vec!["Positive:1", "Even:2"]);
        assert_eq!(ctx.list_depth, 2);
    }

    #[test]
    fn scoped_parent_is_popped() {
        let mut ctx = RenderContext::default();
        let inner = ctx.scoped(Parent::TableCell, |ctx| {
            ctx.scoped(Parent::ListItem, |ctx| (ctx.parent(), ctx.is_inside(Parent::TableCell)))
        });
        assert_eq!(inner, (Parent::ListItem, true));
        assert_eq!(ctx.parent(), Parent::Document);
    }

    #[test]
    fn list_depth_is_restored_after_detaching() {
        let mut ctx = RenderContext::default();
        ctx.list_depth = 2;
        let seen = ctx.detached_from_lists(|ctx| ctx.list_depth);
        assert_eq!(seen, 0);
        assert_eq!(ctx.list_depth, 2);
    }
}
