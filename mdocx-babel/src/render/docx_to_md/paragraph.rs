//! Paragraph classification and the paragraph-level renderers.

use super::image::{self, LoweredImage};
use super::run::{code_directive, render_runs};
use super::{BlockSink, Open};
use crate::common::metadata;
use crate::error::FormatError;
use crate::ir::docx::{ListInfo, Paragraph, Run, RunContent};
use crate::ir::markdown::{AlertKind, Block, Inline, ListItem};
use crate::ir::Attributes;
use crate::render::RenderContext;

const ZONE_OPEN_PREFIX: &str = "{zonePivot:\"";
const ZONE_CLOSE_PREFIX: &str = "{end-zonePivot:";

/// Style name lowercased with spaces removed: "Heading 2" → "heading2".
fn normalized_style(para: &Paragraph) -> String {
    para.style
        .as_deref()
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

pub(super) fn heading_level(para: &Paragraph) -> Option<u8> {
    let style = normalized_style(para);
    if style == "title" {
        return Some(1);
    }
    let level: u8 = style.strip_prefix("heading")?.parse().ok()?;
    (level >= 1).then_some(level.min(6))
}

pub(super) fn is_code(para: &Paragraph) -> bool {
    let style = normalized_style(para);
    style.starts_with("code") || style == "htmlpreformatted"
}

pub(super) fn callout(para: &Paragraph) -> Option<Open> {
    let style = para.style.as_deref()?;
    if let Some(kind) = AlertKind::from_style_name(style) {
        return Some(Open::Alert(kind));
    }
    matches!(
        normalized_style(para).as_str(),
        "blockquote" | "quote" | "intensequote"
    )
    .then_some(Open::Quote)
}

pub(super) enum ZoneMarker {
    Open(Attributes),
    Close,
}

/// Zone boundary paragraphs, recognized by their metadata comment or, failing that, by
/// the visible marker text.
pub(super) fn zone_marker(para: &Paragraph) -> Option<ZoneMarker> {
    let mut significant = para.significant_runs();
    let first = significant.next()?;

    if let Some(mut attributes) = metadata::from_comment(first.comment.as_ref()) {
        match attributes.remove(metadata::DIRECTIVE_KEY).as_deref() {
            Some("zone") => return Some(ZoneMarker::Open(attributes)),
            Some("zone-end") => return Some(ZoneMarker::Close),
            _ => {}
        }
    }

    let text = para.text();
    let text = text.trim();
    if let Some(pivot) = text
        .strip_prefix(ZONE_OPEN_PREFIX)
        .and_then(|rest| rest.strip_suffix("\"}"))
    {
        return Some(ZoneMarker::Open(Attributes::new().with("pivot", pivot)));
    }
    if text.starts_with(ZONE_CLOSE_PREFIX) && text.ends_with('}') {
        return Some(ZoneMarker::Close);
    }
    None
}

/// The run of a paragraph whose only content is one picture.
pub(super) fn sole_drawing(para: &Paragraph) -> Option<&Run> {
    let mut significant = para.significant_runs();
    let run = significant.next()?;
    (matches!(run.content, RunContent::Drawing(_)) && significant.next().is_none()).then_some(run)
}

/// Attributes of a paragraph whose only content is a code reference placeholder.
pub(super) fn sole_code_directive(para: &Paragraph) -> Option<Attributes> {
    let mut significant = para.significant_runs();
    let run = significant.next()?;
    if significant.next().is_some() {
        return None;
    }
    code_directive(run)
}

pub(super) fn render_heading(
    para: &Paragraph,
    level: u8,
    ctx: &mut RenderContext,
    sink: &mut BlockSink,
) -> Result<(), FormatError> {
    let content = render_runs(&para.runs, ctx)?;
    if !content.is_empty() {
        sink.push(Block::Heading { level, content });
    }
    Ok(())
}

pub(super) fn render_list_item(
    para: &Paragraph,
    info: ListInfo,
    ctx: &mut RenderContext,
    sink: &mut BlockSink,
) -> Result<(), FormatError> {
    let saved = ctx.list_depth;
    ctx.list_depth = info.level + 1;
    let content = render_runs(&para.runs, ctx);
    ctx.list_depth = saved;

    let content = content?;
    let blocks = if content.is_empty() {
        Vec::new()
    } else {
        vec![Block::Paragraph(content)]
    };
    sink.push_list_item(info, ListItem { blocks });
    Ok(())
}

/// Code paragraphs are taken literally, one line each. An empty paragraph is an empty
/// line of code.
pub(super) fn render_code_line(para: &Paragraph, sink: &mut BlockSink) {
    let language = para
        .runs
        .iter()
        .find_map(|run| metadata::from_comment(run.comment.as_ref()))
        .and_then(|attributes| attributes.get("language").map(str::to_string));

    let line: String = para
        .runs
        .iter()
        .map(|run| match &run.content {
            RunContent::Text(text) => text.as_str(),
            RunContent::Break => "\n",
            RunContent::Drawing(_) => "",
        })
        .collect();
    sink.push_code_line(language, line);
}

pub(super) fn render_image(
    run: &Run,
    ctx: &mut RenderContext,
    sink: &mut BlockSink,
) -> Result<(), FormatError> {
    let RunContent::Drawing(drawing) = &run.content else {
        return Ok(());
    };
    match image::lower(drawing, run.comment.as_ref(), ctx)? {
        LoweredImage::Directive(element) => sink.push(Block::TripleColon(element)),
        LoweredImage::Inline(inline) => sink.push(Block::Paragraph(vec![inline])),
    }
    Ok(())
}

pub(super) fn render_callout(
    para: &Paragraph,
    callout: Open,
    ctx: &mut RenderContext,
    sink: &mut BlockSink,
) -> Result<(), FormatError> {
    let content = render_runs(&para.runs, ctx)?;
    if !content.is_empty() {
        sink.push_quoted(callout, Block::Paragraph(content));
    }
    Ok(())
}

/// Any other paragraph. Empty ones vanish without ending a list or quote.
pub(super) fn render_plain(
    para: &Paragraph,
    ctx: &mut RenderContext,
    sink: &mut BlockSink,
) -> Result<(), FormatError> {
    let content = render_runs(&para.runs, ctx)?;
    if content.iter().any(|inline| !is_blank(inline)) {
        sink.push(Block::Paragraph(content));
    }
    Ok(())
}

fn is_blank(inline: &Inline) -> bool {
    match inline {
        Inline::Text(text) => text.trim().is_empty(),
        Inline::SoftBreak | Inline::LineBreak => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_levels_clamp_to_six() {
        assert_eq!(heading_level(&Paragraph::styled("Heading 1")), Some(1));
        assert_eq!(heading_level(&Paragraph::styled("heading9")), Some(6));
        assert_eq!(heading_level(&Paragraph::styled("Heading")), None);
        assert_eq!(heading_level(&Paragraph::styled("Normal")), None);
        assert_eq!(heading_level(&Paragraph::new()), None);
    }

    #[test]
    fn code_styles() {
        assert!(is_code(&Paragraph::styled("Code Block")));
        assert!(is_code(&Paragraph::styled("Code")));
        assert!(is_code(&Paragraph::styled("HTML Preformatted")));
        assert!(!is_code(&Paragraph::styled("Caption")));
    }

    #[test]
    fn zone_close_marker_from_text() {
        let para = Paragraph::new().with_run(Run::text("{end-zonePivot:\"linux\"}"));
        assert!(matches!(zone_marker(&para), Some(ZoneMarker::Close)));
        let para = Paragraph::new().with_run(Run::text("zonePivot is a word"));
        assert!(zone_marker(&para).is_none());
    }
}
