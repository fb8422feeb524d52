//! DOCX format implementation
//!
//! Reads and writes Office Open XML word-processing packages.
//!
//! # Library Choice
//!
//! Writing uses `docx-rs`, which covers styles, numbering, hyperlinks, comments and
//! pictures. `docx-rs` has no reader for the parts we need, so reading goes through `zip`
//! and `roxmltree` directly (see `parser.rs`).
//!
//! # What Is Modelled
//!
//! | DOCX                                | Object model                    |
//! |-------------------------------------|---------------------------------|
//! | `w:p` with `w:pStyle`               | `Paragraph::style` (display name) |
//! | `w:numPr`                           | `Paragraph::list`               |
//! | `w:r` + `w:rPr`                     | `Run` + `Formatting`            |
//! | `w:hyperlink`                       | `Run::link`                     |
//! | `w:drawing` / `a:blip`              | `RunContent::Drawing`           |
//! | `w:br`                              | `RunContent::Break`             |
//! | `w:br w:type="page"`, `w:sectPr`    | `Block::SectionBreak`           |
//! | `w:tbl`, `w:gridSpan`               | `Table`, `TableCell::span`      |
//! | `w:commentRangeStart` + comments.xml| `Run::comment`                  |
//!
//! Vertically merged cells, fields, footnotes, headers and footers are not modelled.

mod image;
pub mod parser;
pub mod serializer;
pub mod styles;

use crate::error::FormatError;
use crate::format::{Document, Format, SerializedDocument};

/// Format implementation for DOCX packages
pub struct DocxFormat;

impl Format for DocxFormat {
    fn name(&self) -> &str {
        "docx"
    }

    fn description(&self) -> &str {
        "Office Open XML word-processing document"
    }

    fn file_extensions(&self) -> &[&str] {
        &["docx"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &[u8]) -> Result<Document, FormatError> {
        parser::parse_from_docx(source).map(Document::Docx)
    }

    fn serialize(&self, doc: &Document) -> Result<SerializedDocument, FormatError> {
        match doc {
            Document::Docx(doc) => serializer::serialize_to_docx(doc).map(SerializedDocument::Binary),
            other => Err(FormatError::NotSupported(format!(
                "DOCX cannot serialize a {} document; convert it first",
                other.kind()
            ))),
        }
    }
}
