//! Inline → run rendering.
//!
//! Emphasis-like inlines do not produce runs of their own: they change the active
//! [`Formatting`] on the [`RunSink`], render their children, and restore it.

use super::triple_colon;
use crate::error::FormatError;
use crate::ir::docx::{Formatting, Run, RunContent, VerticalAlign};
use crate::ir::markdown::{Inline, InlineTag};
use crate::render::{write_container, RenderContext, Renderer};

/// Font given to inline code.
pub const CODE_FONT: &str = "Consolas";

/// Highlight color of marked text and directive placeholders.
pub const HIGHLIGHT: &str = "yellow";

/// Runs of one paragraph plus the formatting active at the current depth.
#[derive(Debug, Default)]
pub struct RunSink {
    pub runs: Vec<Run>,
    formatting: Formatting,
    link: Option<String>,
}

impl RunSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a run, stamping it with the active hyperlink.
    pub fn push(&mut self, mut run: Run) {
        if run.link.is_none() {
            run.link = self.link.clone();
        }
        self.runs.push(run);
    }

    fn text(&mut self, text: &str, formatting: Formatting) {
        if !text.is_empty() {
            self.push(Run::text(text).with_formatting(formatting));
        }
    }

    fn nested(
        &mut self,
        children: &[Inline],
        ctx: &mut RenderContext,
        change: impl FnOnce(&mut Formatting),
    ) -> Result<(), FormatError> {
        let saved = self.formatting.clone();
        change(&mut self.formatting);
        let result = write_container(INLINE_PRIORITY, children, ctx, self);
        self.formatting = saved;
        result
    }
}

/// Render a paragraph's inlines into runs.
pub(super) fn render_inlines(
    inlines: &[Inline],
    ctx: &mut RenderContext,
) -> Result<Vec<Run>, FormatError> {
    let mut sink = RunSink::new();
    write_container(INLINE_PRIORITY, inlines, ctx, &mut sink)?;
    Ok(sink.runs)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlineRenderer {
    Text,
    Emphasis,
    Code,
    Link,
    Image,
    Break,
    Tagged,
    Directive,
}

pub const INLINE_PRIORITY: &[InlineRenderer] = &[
    InlineRenderer::Directive,
    InlineRenderer::Text,
    InlineRenderer::Emphasis,
    InlineRenderer::Code,
    InlineRenderer::Link,
    InlineRenderer::Image,
    InlineRenderer::Break,
    InlineRenderer::Tagged,
];

impl Renderer for InlineRenderer {
    type Node = Inline;
    type Output = RunSink;

    fn can_render(self, node: &Inline, _ctx: &RenderContext) -> bool {
        match self {
            InlineRenderer::Text => matches!(node, Inline::Text(_)),
            InlineRenderer::Emphasis => matches!(
                node,
                Inline::Strong(_) | Inline::Emphasis(_) | Inline::Strikethrough(_)
            ),
            InlineRenderer::Code => matches!(node, Inline::Code(_)),
            InlineRenderer::Link => matches!(node, Inline::Link { .. }),
            InlineRenderer::Image => matches!(node, Inline::Image { .. }),
            InlineRenderer::Break => matches!(node, Inline::LineBreak | Inline::SoftBreak),
            InlineRenderer::Tagged => matches!(node, Inline::Tagged { .. }),
            InlineRenderer::Directive => matches!(node, Inline::TripleColon(_)),
        }
    }

    fn render(
        self,
        node: &Inline,
        ctx: &mut RenderContext,
        sink: &mut RunSink,
    ) -> Result<(), FormatError> {
        match node {
            Inline::Text(text) => sink.text(text, sink.formatting.clone()),
            Inline::Strong(children) => sink.nested(children, ctx, |f| f.bold = true)?,
            Inline::Emphasis(children) => sink.nested(children, ctx, |f| f.italic = true)?,
            Inline::Strikethrough(children) => sink.nested(children, ctx, |f| f.strike = true)?,
            Inline::Code(code) => {
                let mut formatting = sink.formatting.clone();
                formatting.font = Some(CODE_FONT.to_string());
                sink.text(code, formatting);
            }
            Inline::Link { url, content, .. } => {
                let saved = sink.link.replace(url.clone());
                let result = write_container(INLINE_PRIORITY, content, ctx, sink);
                sink.link = saved;
                result?;
            }
            Inline::Image { url, alt, .. } => {
                let alt = (!alt.is_empty()).then_some(alt.as_str());
                let drawing = triple_colon::load_drawing(url, alt, ctx);
                sink.push(Run::drawing(drawing));
            }
            Inline::LineBreak => sink.push(Run::line_break()),
            Inline::SoftBreak => sink.text(" ", sink.formatting.clone()),
            Inline::Tagged { tag, content } => {
                let tag = *tag;
                sink.nested(content, ctx, |f| match tag {
                    InlineTag::Kbd => f.kbd = true,
                    InlineTag::Sup => f.vertical = VerticalAlign::Superscript,
                    InlineTag::Sub => f.vertical = VerticalAlign::Subscript,
                    InlineTag::Mark => f.highlight = Some(HIGHLIGHT.to_string()),
                })?;
            }
            Inline::TripleColon(element) => triple_colon::render_inline(element, ctx, sink)?,
            Inline::Html(_) => {}
        }
        Ok(())
    }
}

/// Text of a run sequence, ignoring formatting.
pub(super) fn runs_text(runs: &[Run]) -> String {
    runs.iter()
        .map(|run| match &run.content {
            RunContent::Text(text) => text.as_str(),
            RunContent::Break => "\n",
            RunContent::Drawing(_) => "",
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Inline {
        Inline::Text(s.to_string())
    }

    fn render(inlines: Vec<Inline>) -> Vec<Run> {
        render_inlines(&inlines, &mut RenderContext::default()).unwrap()
    }

    #[test]
    fn nested_emphasis_accumulates() {
        let runs = render(vec![Inline::Strong(vec![
            text("a"),
            Inline::Emphasis(vec![text("b")]),
        ])]);
        assert_eq!(runs.len(), 2);
        assert!(runs[0].formatting.bold && !runs[0].formatting.italic);
        assert!(runs[1].formatting.bold && runs[1].formatting.italic);
    }

    #[test]
    fn formatting_is_restored_after_children() {
        let runs = render(vec![Inline::Strong(vec![text("a")]), text("b")]);
        assert!(!runs[1].formatting.bold);
    }

    #[test]
    fn links_stamp_every_run() {
        let runs = render(vec![Inline::Link {
            url: "https://example.com".into(),
            title: String::new(),
            content: vec![text("go "), Inline::Code("now".into())],
        }]);
        assert!(runs
            .iter()
            .all(|run| run.link.as_deref() == Some("https://example.com")));
        assert_eq!(runs[1].formatting.font.as_deref(), Some(CODE_FONT));
    }

    #[test]
    fn tags_map_to_formatting() {
        let runs = render(vec![
            Inline::Tagged {
                tag: InlineTag::Kbd,
                content: vec![text("Ctrl")],
            },
            Inline::Tagged {
                tag: InlineTag::Sub,
                content: vec![text("2")],
            },
            Inline::Tagged {
                tag: InlineTag::Mark,
                content: vec![text("hot")],
            },
        ]);
        assert!(runs[0].formatting.kbd);
        assert_eq!(runs[1].formatting.vertical, VerticalAlign::Subscript);
        assert_eq!(runs[2].formatting.highlight.as_deref(), Some(HIGHLIGHT));
    }

    #[test]
    fn breaks() {
        let runs = render(vec![text("a"), Inline::SoftBreak, text("b"), Inline::LineBreak]);
        assert_eq!(runs_text(&runs), "a b\n");
    }

    #[test]
    fn inline_html_is_dropped() {
        let runs = render(vec![text("a"), Inline::Html("<span>".into())]);
        assert_eq!(runs.len(), 1);
    }

    #[test]
    fn missing_image_keeps_a_drawing_without_data() {
        let runs = render(vec![Inline::Image {
            url: "does/not/exist.png".into(),
            title: String::new(),
            alt: "Alt".into(),
        }]);
        let RunContent::Drawing(drawing) = &runs[0].content else {
            panic!("expected drawing");
        };
        assert!(drawing.data.is_empty());
        assert_eq!(drawing.file_name, "exist.png");
        assert_eq!(drawing.alt_text.as_deref(), Some("Alt"));
    }
}
