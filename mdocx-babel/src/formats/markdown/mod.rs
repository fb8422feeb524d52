//! Markdown format implementation
//!
//! Reads and writes CommonMark with the GFM table and strikethrough extensions, plus the
//! documentation platform additions the converter cares about.
//!
//! # Library Choice
//!
//! We use the `comrak` crate for parsing. Directives are not CommonMark, so a line-level
//! pre-pass (see `parser.rs`) claims them before comrak runs. Writing is done by hand:
//! the canonical directive and table forms are not something comrak's formatter emits.
//!
//! # Element Mapping Table
//!
//! | Markdown                     | Object model                         | Notes                              |
//! |------------------------------|--------------------------------------|------------------------------------|
//! | `---` YAML `---` at the top  | `Document::front_matter`             | Kept verbatim                      |
//! | `#`..`######`                | `Block::Heading`                     |                                    |
//! | `-`, `*`, `1.`               | `Block::List`                        | Tight/loose inferred on write      |
//! | Fenced or indented code      | `Block::CodeBlock`                   | First info word is the language    |
//! | Pipe table                   | `Table { form: Pipe }`               | First row is the header            |
//! | `:::row:::`/`:::column:::`   | `Table { form: Directive }`          | `span="N"` on columns              |
//! | `> [!NOTE]` ..               | `Block::Alert`                       | NOTE TIP IMPORTANT WARNING CAUTION |
//! | `>`                          | `Block::Quote`                       |                                    |
//! | `:::image ...:::`            | `TripleColonElement` (Image)         | `type="complex"` owns a body       |
//! | `:::code ...:::`             | `TripleColonElement` (Code)          | Always self-closed                 |
//! | `:::zone ...` / `:::zone-end`| `TripleColonElement` (Zone)          | Owns child blocks                  |
//! | `<kbd>` `<sup>` `<sub>` `<mark>` | `Inline::Tagged`                 | Other inline HTML kept raw         |
//!
//! # Lossy Conversions
//!
//! - Setext headings, `+` bullets and `__strong__` are normalized to the canonical forms
//! - Reference-style links are resolved to inline links
//! - A directive table nested inside a list item is not recognized on read

mod escape;
pub mod parser;
pub mod serializer;

use crate::error::FormatError;
use crate::format::{Document, Format, SerializedDocument};

/// Format implementation for Markdown
pub struct MarkdownFormat;

impl Format for MarkdownFormat {
    fn name(&self) -> &str {
        "markdown"
    }

    fn description(&self) -> &str {
        "CommonMark Markdown with documentation platform directives"
    }

    fn file_extensions(&self) -> &[&str] {
        &["md", "markdown"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &[u8]) -> Result<Document, FormatError> {
        let text = std::str::from_utf8(source)
            .map_err(|e| FormatError::ParseError(format!("Markdown is not valid UTF-8: {e}")))?;
        parser::parse_from_markdown(text).map(Document::Markdown)
    }

    fn serialize(&self, doc: &Document) -> Result<SerializedDocument, FormatError> {
        match doc {
            Document::Markdown(doc) => {
                serializer::serialize_to_markdown(doc).map(SerializedDocument::Text)
            }
            other => Err(FormatError::NotSupported(format!(
                "Markdown cannot serialize a {} document; convert it first",
                other.kind()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_roundtrips_bytes() {
        let format = MarkdownFormat;
        let doc = format.parse(b"# Title\n\nBody\n").unwrap();
        let out = format.serialize(&doc).unwrap().into_bytes();
        assert_eq!(String::from_utf8(out).unwrap(), "# Title\n\nBody\n");
    }

    #[test]
    fn test_rejects_docx_model() {
        let doc = Document::Docx(crate::ir::docx::Document::default());
        assert!(matches!(
            MarkdownFormat.serialize(&doc),
            Err(FormatError::NotSupported(_))
        ));
    }

    #[test]
    fn test_invalid_utf8_is_parse_error() {
        assert!(matches!(
            MarkdownFormat.parse(&[0xff, 0xfe]),
            Err(FormatError::ParseError(_))
        ));
    }
}
