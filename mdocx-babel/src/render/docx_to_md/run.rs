//! Run → inline rendering and font-based markup inference.

use super::image::{self, LoweredImage};
use crate::common::metadata;
use crate::error::FormatError;
use crate::ir::docx::{Formatting, Run, RunContent, VerticalAlign};
use crate::ir::markdown::{Extension, Inline, InlineTag, TripleColonElement};
use crate::ir::Attributes;
use crate::render::{write_container, RenderContext, Renderer};

/// Renderers for runs, most specific first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunRenderer {
    Directive,
    Drawing,
    Break,
    Kbd,
    Monospace,
    Emphasis,
    Plain,
}

pub const RUN_PRIORITY: &[RunRenderer] = &[
    RunRenderer::Directive,
    RunRenderer::Drawing,
    RunRenderer::Break,
    RunRenderer::Kbd,
    RunRenderer::Monospace,
    RunRenderer::Emphasis,
    RunRenderer::Plain,
];

impl Renderer for RunRenderer {
    type Node = Run;
    type Output = Vec<Inline>;

    fn can_render(self, run: &Run, _ctx: &RenderContext) -> bool {
        let text = match &run.content {
            RunContent::Text(text) => Some(text),
            _ => None,
        };
        match self {
            RunRenderer::Directive => code_directive(run).is_some(),
            RunRenderer::Drawing => matches!(run.content, RunContent::Drawing(_)),
            RunRenderer::Break => matches!(run.content, RunContent::Break),
            RunRenderer::Kbd => text.is_some() && run.formatting.kbd,
            RunRenderer::Monospace => text.is_some() && run.formatting.is_monospace(),
            RunRenderer::Emphasis => {
                text.is_some() && (run.formatting.is_bold() || run.formatting.italic)
            }
            RunRenderer::Plain => text.is_some(),
        }
    }

    fn render(
        self,
        run: &Run,
        ctx: &mut RenderContext,
        out: &mut Vec<Inline>,
    ) -> Result<(), FormatError> {
        let text = match &run.content {
            RunContent::Text(text) => text.as_str(),
            RunContent::Drawing(drawing) => {
                let inline = match image::lower(drawing, run.comment.as_ref(), ctx)? {
                    LoweredImage::Directive(element) => Inline::TripleColon(element),
                    LoweredImage::Inline(inline) => inline,
                };
                out.push(inline);
                return Ok(());
            }
            RunContent::Break => {
                out.push(Inline::LineBreak);
                return Ok(());
            }
        };

        let inline = match self {
            RunRenderer::Directive => match code_directive(run) {
                Some(attributes) => {
                    Inline::TripleColon(TripleColonElement::new(Extension::Code, attributes))
                }
                None => return Ok(()),
            },
            _ if text.is_empty() => return Ok(()),
            _ if text.trim().is_empty() => Inline::Text(text.to_string()),
            RunRenderer::Kbd => decorate(
                &run.formatting,
                Inline::Tagged {
                    tag: InlineTag::Kbd,
                    content: vec![Inline::Text(text.to_string())],
                },
                true,
            ),
            RunRenderer::Monospace => {
                decorate(&run.formatting, Inline::Code(text.to_string()), true)
            }
            RunRenderer::Emphasis => {
                decorate(&run.formatting, Inline::Text(text.to_string()), true)
            }
            _ => decorate(&run.formatting, Inline::Text(text.to_string()), false),
        };
        out.push(inline);
        Ok(())
    }
}

/// Attributes of a code reference placeholder run, from its metadata comment.
pub(super) fn code_directive(run: &Run) -> Option<Attributes> {
    let mut attributes = metadata::from_comment(run.comment.as_ref())?;
    (attributes.remove(metadata::DIRECTIVE_KEY).as_deref() == Some("code")).then_some(attributes)
}

/// Wrap a rendered run in the markup its remaining formatting asks for: emphasis
/// innermost, then strikethrough, then super/subscript, then highlight.
fn decorate(formatting: &Formatting, inline: Inline, with_emphasis: bool) -> Inline {
    let mut inline = inline;
    if with_emphasis {
        if formatting.italic {
            inline = Inline::Emphasis(vec![inline]);
        }
        if formatting.is_bold() {
            inline = Inline::Strong(vec![inline]);
        }
    }
    if formatting.strike {
        inline = Inline::Strikethrough(vec![inline]);
    }
    let tag = match formatting.vertical {
        VerticalAlign::Superscript => Some(InlineTag::Sup),
        VerticalAlign::Subscript => Some(InlineTag::Sub),
        VerticalAlign::Baseline => None,
    };
    if let Some(tag) = tag {
        inline = Inline::Tagged {
            tag,
            content: vec![inline],
        };
    }
    if formatting.highlight.is_some() {
        inline = Inline::Tagged {
            tag: InlineTag::Mark,
            content: vec![inline],
        };
    }
    inline
}

/// Join neighbouring text runs that differ only in where the writer split them.
fn merge_runs(runs: &[Run]) -> Vec<Run> {
    let mut merged: Vec<Run> = Vec::with_capacity(runs.len());
    for run in runs {
        if let Some(last) = merged.last_mut() {
            if let (RunContent::Text(acc), RunContent::Text(text)) = (&mut last.content, &run.content)
            {
                if last.formatting == run.formatting
                    && last.link == run.link
                    && last.comment.is_none()
                    && run.comment.is_none()
                {
                    acc.push_str(text);
                    continue;
                }
            }
        }
        merged.push(run.clone());
    }
    merged
}

/// Render a paragraph's runs. Runs sharing a hyperlink target become one link.
pub(super) fn render_runs(runs: &[Run], ctx: &mut RenderContext) -> Result<Vec<Inline>, FormatError> {
    let merged = merge_runs(runs);
    let mut out = Vec::new();
    for group in merged.chunk_by(|a, b| a.link == b.link) {
        match &group[0].link {
            Some(url) => {
                let mut content = Vec::new();
                write_container(RUN_PRIORITY, group, ctx, &mut content)?;
                out.push(Inline::Link {
                    url: url.clone(),
                    title: String::new(),
                    content,
                });
            }
            None => write_container(RUN_PRIORITY, group, ctx, &mut out)?,
        }
    }
    Ok(out)
}
