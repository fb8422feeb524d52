//! Inspect transforms
//!
//! Views of a document at the stages of a conversion, for debugging a mapping:
//!
//! - `ir-json`: the object model the reader produced
//! - `rendered-json`: the object model of the other side, after the renderers ran
//! - `tree`: the labelled tree the AST diff compares, one node per line with its position
//!
//! Example: `mdocx inspect guide.docx rendered-json`

use mdocx_babel::diff::ast::{self, DiffNode};
use mdocx_babel::format::Document;
use mdocx_babel::render::{docx_to_md, md_to_docx, RenderContext, RenderOptions};
use mdocx_babel::FormatRegistry;
use std::fs;
use std::path::Path;

/// All available inspect transforms
pub const AVAILABLE_TRANSFORMS: &[&str] = &["ir-json", "rendered-json", "tree"];

pub fn execute_transform(
    path: &Path,
    transform: &str,
    options: &RenderOptions,
) -> Result<String, String> {
    let registry = FormatRegistry::default();
    let format = registry
        .detect_format_from_filename(&path.to_string_lossy())
        .ok_or_else(|| format!("Could not detect format from filename '{}'", path.display()))?;
    let bytes = fs::read(path).map_err(|e| format!("Error reading file '{}': {e}", path.display()))?;
    let document = registry.parse(&bytes, &format).map_err(|e| e.to_string())?;

    match transform {
        "ir-json" => to_json(&document),
        "rendered-json" => {
            let mut ctx = RenderContext::new(options.clone());
            if let Some(dir) = path.parent() {
                ctx = ctx.with_source_dir(dir);
            }
            let rendered = match &document {
                Document::Docx(doc) => docx_to_md::render_document(doc, &mut ctx).map(Document::Markdown),
                Document::Markdown(doc) => md_to_docx::render_document(doc, &mut ctx).map(Document::Docx),
            }
            .map_err(|e| e.to_string())?;
            to_json(&rendered)
        }
        "tree" => {
            let nodes = match &document {
                Document::Docx(doc) => ast::from_docx(doc),
                Document::Markdown(doc) => ast::from_markdown(doc),
            };
            let mut out = String::new();
            write_tree(&nodes, "", &mut out);
            Ok(out)
        }
        other => Err(format!("Unknown transform: {other}")),
    }
}

fn to_json(document: &Document) -> Result<String, String> {
    let json = match document {
        Document::Docx(doc) => serde_json::to_string_pretty(doc),
        Document::Markdown(doc) => serde_json::to_string_pretty(doc),
    };
    json.map(|mut text| {
        text.push('\n');
        text
    })
    .map_err(|e| format!("JSON serialization failed: {e}"))
}

fn write_tree(nodes: &[DiffNode], prefix: &str, out: &mut String) {
    for (idx, node) in nodes.iter().enumerate() {
        let position = if prefix.is_empty() {
            (idx + 1).to_string()
        } else {
            format!("{prefix}.{}", idx + 1)
        };
        let depth = position.matches('.').count();
        out.push_str(&"  ".repeat(depth));
        out.push_str(&position);
        out.push(' ');
        out.push_str(&node.label.replace('\n', "\\n"));
        out.push('\n');
        write_tree(&node.children, &position, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_lines_carry_positions() {
        let nodes = vec![
            DiffNode::leaf("heading1: Title"),
            DiffNode::branch("bullet-list", vec![DiffNode::leaf("item")]),
        ];
        let mut out = String::new();
        write_tree(&nodes, "", &mut out);
        assert_eq!(out, "1 heading1: Title\n2 bullet-list\n  2.1 item\n");
    }
}
