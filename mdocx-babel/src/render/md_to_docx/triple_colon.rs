//! Triple-colon directive processor.
//!
//! Each directive arrives already resolved by the Markdown reader: one element with its
//! attributes, a closed flag and, for block forms, its body. Nothing is remembered
//! between directives.
//!
//! - `image`: a real picture. Attributes Word cannot hold (`link`, `lightbox`,
//!   `loc-scope`, `border`, a non-default `type`, alt text, the long description of a
//!   complex image) ride along in a metadata comment on the picture run.
//! - `code`: a highlighted `{codeBlock: ...}` placeholder run. The referenced file is
//!   never read.
//! - `zone`: with no target pivot, the body between visible `{zonePivot:"…"}` and
//!   `{end-zonePivot:"…"}` marker paragraphs. With a target pivot, the bare body when the
//!   zone's `pivot` contains it (ignoring case), otherwise nothing.
//! - anything else: dropped.
//!
//! A missing required attribute (`source` on image and code, `pivot` on zone) is logged
//! and the directive skipped, unless strict directives are configured, in which case it
//! is a [`FormatError::MissingAttribute`]. A zone without a pivot keeps its body.

use super::inline::{render_inlines, runs_text, RunSink, HIGHLIGHT};
use super::BLOCK_PRIORITY;
use crate::common::metadata::{self, DIRECTIVE_KEY};
use crate::error::FormatError;
use crate::ir::docx::{self, Drawing, Formatting, Paragraph, Run};
use crate::ir::markdown::{Block, DirectiveChildren, Extension, TripleColonElement};
use crate::ir::Attributes;
use crate::render::{write_container, Parent, RenderContext};
use log::{debug, info, warn};
use std::fs;
use std::path::Path;

/// Image attributes carried in the metadata comment when present.
const IMAGE_METADATA: [&str; 5] = ["alt-text", "border", "lightbox", "link", "loc-scope"];

/// Lower a directive standing as a block of its own.
pub fn render_block(
    element: &TripleColonElement,
    ctx: &mut RenderContext,
    out: &mut Vec<docx::Block>,
) -> Result<(), FormatError> {
    match &element.extension {
        Extension::Image => {
            if let Some(run) = image_run(element, ctx)? {
                out.push(docx::Block::Paragraph(Paragraph::new().with_run(run)));
            }
        }
        Extension::Code => {
            if let Some(run) = code_run(element, ctx)? {
                out.push(docx::Block::Paragraph(Paragraph::new().with_run(run)));
            }
        }
        Extension::Zone => zone(element, ctx, out)?,
        Extension::Unknown(name) => info!("Ignoring unsupported directive :::{name}:::"),
    }
    Ok(())
}

/// Lower a directive found inside paragraph text.
pub fn render_inline(
    element: &TripleColonElement,
    ctx: &mut RenderContext,
    sink: &mut RunSink,
) -> Result<(), FormatError> {
    let run = match &element.extension {
        Extension::Image => image_run(element, ctx)?,
        Extension::Code => code_run(element, ctx)?,
        Extension::Zone => {
            warn!("Zone directive inside paragraph text has no body; ignoring it");
            None
        }
        Extension::Unknown(name) => {
            info!("Ignoring unsupported directive :::{name}:::");
            None
        }
    };
    if let Some(run) = run {
        sink.push(run);
    }
    Ok(())
}

/// Value of a required attribute. `Ok(None)` means: skip the directive.
fn required<'a>(
    element: &'a TripleColonElement,
    attribute: &str,
    ctx: &RenderContext,
) -> Result<Option<&'a str>, FormatError> {
    match element.attribute(attribute) {
        Some(value) if !value.trim().is_empty() => Ok(Some(value)),
        _ if ctx.options.strict_directives => Err(FormatError::MissingAttribute {
            directive: element.extension.name().to_string(),
            attribute: attribute.to_string(),
        }),
        _ => {
            warn!(
                "Directive :::{}::: has no {attribute} attribute; skipping it",
                element.extension.name()
            );
            Ok(None)
        }
    }
}

fn comment_for(attributes: &Attributes, ctx: &RenderContext) -> docx::Comment {
    metadata::to_comment(attributes, ctx.options.comment_author.as_deref())
}

fn placeholder_formatting() -> Formatting {
    Formatting {
        highlight: Some(HIGHLIGHT.to_string()),
        ..Formatting::default()
    }
}

fn image_run(
    element: &TripleColonElement,
    ctx: &mut RenderContext,
) -> Result<Option<Run>, FormatError> {
    let Some(source) = required(element, "source", ctx)? else {
        return Ok(None);
    };
    let drawing = load_drawing(source, element.attribute("alt-text"), ctx);

    let mut meta = Attributes::new();
    if let Some(kind) = element.attribute("type").filter(|kind| *kind != "content") {
        meta.insert("type", kind);
    }
    for key in IMAGE_METADATA {
        if let Some(value) = element.attribute(key) {
            meta.insert(key, value);
        }
    }
    if element.attribute("type") == Some("complex") {
        let description = long_description(element, ctx)?;
        if !description.is_empty() {
            meta.insert("description", description);
        }
    }

    let mut run = Run::drawing(drawing);
    if !meta.is_empty() {
        run.comment = Some(comment_for(&meta, ctx));
    }
    Ok(Some(run))
}

/// Body paragraphs of a complex image joined with CRLF. Nothing else of the body is
/// rendered.
fn long_description(
    element: &TripleColonElement,
    ctx: &mut RenderContext,
) -> Result<String, FormatError> {
    let DirectiveChildren::Blocks(blocks) = &element.children else {
        return Ok(String::new());
    };
    let mut lines = Vec::new();
    for block in blocks {
        match block {
            Block::Paragraph(inlines) => {
                let runs = render_inlines(inlines, ctx)?;
                lines.push(runs_text(&runs).trim().to_string());
            }
            other => debug!("Complex image description skips a {} block", other.kind()),
        }
    }
    Ok(lines.join("\r\n"))
}

/// Read a picture relative to the Markdown source. A picture that cannot be read keeps
/// its name and alt text but no data; the writer puts a visible placeholder in its place.
pub(super) fn load_drawing(source: &str, alt: Option<&str>, ctx: &RenderContext) -> Drawing {
    let file_name = Path::new(source)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| source.to_string());

    let data = if source.starts_with("http://") || source.starts_with("https://") {
        warn!("Remote image {source} is not downloaded");
        Vec::new()
    } else {
        let path = match &ctx.source_dir {
            Some(dir) => dir.join(source),
            None => Path::new(source).to_path_buf(),
        };
        fs::read(&path).unwrap_or_else(|e| {
            warn!("Image not found: {} ({e})", path.display());
            Vec::new()
        })
    };

    Drawing {
        file_name,
        data,
        alt_text: alt.map(str::to_string),
    }
}

/// `{codeBlock: language=…, source="…", range=…, highlight=…}` with only the keys the
/// directive has.
pub fn code_placeholder(element: &TripleColonElement) -> String {
    let mut parts = Vec::new();
    if let Some(language) = element.attribute("language") {
        parts.push(format!("language={language}"));
    }
    if let Some(source) = element.attribute("source") {
        parts.push(format!("source=\"{source}\""));
    }
    if let Some(range) = element.attribute("range") {
        parts.push(format!("range={range}"));
    }
    if let Some(highlight) = element.attribute("highlight") {
        parts.push(format!("highlight={highlight}"));
    }
    format!("{{codeBlock: {}}}", parts.join(", "))
}

fn code_run(element: &TripleColonElement, ctx: &RenderContext) -> Result<Option<Run>, FormatError> {
    if required(element, "source", ctx)?.is_none() {
        return Ok(None);
    }
    let mut meta = Attributes::new().with(DIRECTIVE_KEY, "code");
    for (key, value) in element.attributes.iter() {
        meta.insert(key, value);
    }
    Ok(Some(
        Run::text(code_placeholder(element))
            .with_formatting(placeholder_formatting())
            .with_comment(comment_for(&meta, ctx)),
    ))
}

fn zone(
    element: &TripleColonElement,
    ctx: &mut RenderContext,
    out: &mut Vec<docx::Block>,
) -> Result<(), FormatError> {
    let body: &[Block] = match &element.children {
        DirectiveChildren::Blocks(blocks) => blocks,
        _ => &[],
    };
    let Some(pivot) = required(element, "pivot", ctx)? else {
        return write_body(body, ctx, out);
    };

    let target = ctx
        .options
        .zone_pivot
        .as_deref()
        .map(str::trim)
        .filter(|target| !target.is_empty())
        .map(str::to_lowercase);

    match target {
        Some(target) => {
            if pivot.to_lowercase().contains(&target) {
                write_body(body, ctx, out)?;
            } else {
                debug!("Omitting zone \"{pivot}\" for pivot \"{target}\"");
            }
        }
        None => {
            let mut open = Attributes::new().with(DIRECTIVE_KEY, "zone");
            for (key, value) in element.attributes.iter() {
                open.insert(key, value);
            }
            out.push(marker(format!("{{zonePivot:\"{pivot}\"}}"), &open, ctx));
            write_body(body, ctx, out)?;
            let close = Attributes::new().with(DIRECTIVE_KEY, "zone-end");
            out.push(marker(format!("{{end-zonePivot:\"{pivot}\"}}"), &close, ctx));
        }
    }
    Ok(())
}

fn write_body(
    body: &[Block],
    ctx: &mut RenderContext,
    out: &mut Vec<docx::Block>,
) -> Result<(), FormatError> {
    ctx.scoped(Parent::Directive, |ctx| {
        write_container(BLOCK_PRIORITY, body, ctx, out)
    })
}

fn marker(text: String, meta: &Attributes, ctx: &RenderContext) -> docx::Block {
    docx::Block::Paragraph(
        Paragraph::new().with_run(
            Run::text(text)
                .with_formatting(placeholder_formatting())
                .with_comment(comment_for(meta, ctx)),
        ),
    )
}
