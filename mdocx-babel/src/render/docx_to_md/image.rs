//! Picture extraction and image markup.
//!
//! Every picture is written to `<markdown dir>/<media folder>/<file name>` the moment it
//! is rendered, then referenced by its path relative to the Markdown file. A file of the
//! same name with other content, e.g. from another document of a batch, is never
//! overwritten: the picture gets a numbered name (`image1-2.png`) instead. Directive
//! metadata recovered from the picture's comment decides the `:::image:::` attributes.

use crate::common::metadata;
use crate::error::FormatError;
use crate::ir::docx::{Comment, Drawing};
use crate::ir::markdown::{Block, Extension, Inline, TripleColonElement};
use crate::ir::Attributes;
use crate::render::RenderContext;
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Attributes copied verbatim from the metadata comment onto the directive.
const PASSTHROUGH: [&str; 4] = ["border", "lightbox", "loc-scope", "link"];

pub(super) enum LoweredImage {
    Directive(TripleColonElement),
    Inline(Inline),
}

pub(super) fn lower(
    drawing: &Drawing,
    comment: Option<&Comment>,
    ctx: &mut RenderContext,
) -> Result<LoweredImage, FormatError> {
    let source = extract(drawing, ctx)?;
    let meta = metadata::from_comment(comment).unwrap_or_default();
    let alt = meta
        .get("alt-text")
        .map(str::to_string)
        .or_else(|| drawing.alt_text.clone())
        .unwrap_or_default();

    if ctx.options.plain_markdown {
        return Ok(LoweredImage::Inline(plain(source, alt, &meta)));
    }

    let kind = meta.get("type").unwrap_or("content");
    let mut attributes = Attributes::new()
        .with("type", kind)
        .with("source", source);
    if !alt.is_empty() {
        attributes.insert("alt-text", alt);
    }
    for key in PASSTHROUGH {
        if let Some(value) = meta.get(key) {
            attributes.insert(key, value);
        }
    }

    let mut element = TripleColonElement::new(Extension::Image, attributes);
    if kind == "complex" {
        element = element.with_blocks(description_blocks(meta.get("description")));
    }
    Ok(LoweredImage::Directive(element))
}

/// The long description of a complex image, one paragraph per line.
fn description_blocks(description: Option<&str>) -> Vec<Block> {
    description
        .unwrap_or_default()
        .split("\r\n")
        .flat_map(|line| line.split('\n'))
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| Block::Paragraph(vec![Inline::Text(line.to_string())]))
        .collect()
}

/// Write the picture next to the destination and return its relative path.
fn extract(drawing: &Drawing, ctx: &mut RenderContext) -> Result<String, FormatError> {
    let file_name = if drawing.file_name.is_empty() {
        "image.png"
    } else {
        drawing.file_name.as_str()
    };
    let fallback = format!("{}/{}", ctx.options.media_folder, file_name);

    let Some(dest_dir) = ctx.destination_dir().map(|dir| dir.to_path_buf()) else {
        debug!("No destination set; not extracting {file_name}");
        return Ok(fallback);
    };
    if drawing.data.is_empty() {
        warn!("Picture {file_name} has no data; referencing it without extracting");
        return Ok(fallback);
    }

    let media_dir = dest_dir.join(&ctx.options.media_folder);
    fs::create_dir_all(&media_dir)?;
    let (path, present) = free_media_path(&media_dir, file_name, &drawing.data)?;
    if present {
        debug!("{} already holds this picture", path.display());
    } else {
        fs::write(&path, &drawing.data)?;
        info!("Extracted {}", path.display());
    }

    let relative = pathdiff::diff_paths(&path, &dest_dir).unwrap_or_else(|| path.clone());
    if !present {
        ctx.written_media.push(path);
    }
    Ok(relative.to_string_lossy().replace('\\', "/"))
}

/// First of `name`, `stem-2.ext`, `stem-3.ext`, … that is free or already holds `data`.
/// The flag is true when the file exists with that content.
fn free_media_path(dir: &Path, name: &str, data: &[u8]) -> Result<(PathBuf, bool), FormatError> {
    let original = Path::new(name);
    let stem = original
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string());
    let extension = original.extension().map(|e| e.to_string_lossy().into_owned());

    let mut candidate = dir.join(name);
    let mut n = 2;
    loop {
        if !candidate.exists() {
            return Ok((candidate, false));
        }
        if fs::read(&candidate)? == data {
            return Ok((candidate, true));
        }
        let numbered = match &extension {
            Some(ext) => format!("{stem}-{n}.{ext}"),
            None => format!("{stem}-{n}"),
        };
        candidate = dir.join(numbered);
        n += 1;
    }
}

/// Nearest CommonMark/HTML rendering of an image directive.
fn plain(source: String, alt: String, meta: &Attributes) -> Inline {
    let dropped: Vec<&str> = ["border", "loc-scope"]
        .into_iter()
        .filter(|key| meta.contains_key(key))
        .collect();
    if !dropped.is_empty() {
        warn!(
            "Plain Markdown cannot express {} on {source}; dropping it",
            dropped.join(", ")
        );
    }
    if meta.contains_key("description") {
        warn!("Dropping the long description of {source} in plain Markdown");
    }

    if let Some(lightbox) = meta.get("lightbox") {
        if meta.contains_key("link") {
            warn!("Image {source} has both lightbox and link; keeping the lightbox");
        }
        return Inline::Html(format!(
            "<a href=\"{}\"><img src=\"{}\" alt=\"{}\" /></a>",
            html_attr(lightbox),
            html_attr(&source),
            html_attr(&alt)
        ));
    }

    let image = Inline::Image {
        url: source,
        title: String::new(),
        alt,
    };
    match meta.get("link") {
        Some(link) => Inline::Link {
            url: link.to_string(),
            title: String::new(),
            content: vec![image],
        },
        None => image,
    }
}

fn html_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
