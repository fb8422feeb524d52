//! Word-processing document model.
//!
//! This is the shape the DOCX reader produces and the DOCX writer consumes. It keeps
//! only what documentation authoring needs: paragraphs with styled runs, tables with
//! column spans, embedded drawings, list membership and the comments used as a metadata
//! side channel.

use serde::Serialize;

/// Root of a word-processing document.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Document {
    /// Core document title (`docProps/core.xml`), when present.
    pub title: Option<String>,
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self {
            title: None,
            blocks,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
    SectionBreak,
    /// Body element the reader does not model, kept by element name.
    Unknown(String),
}

impl Block {
    pub fn kind(&self) -> &str {
        match self {
            Block::Paragraph(_) => "paragraph",
            Block::Table(_) => "table",
            Block::SectionBreak => "section-break",
            Block::Unknown(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Paragraph {
    /// Style display name, e.g. "Heading 2" or "Code Block".
    pub style: Option<String>,
    pub list: Option<ListInfo>,
    pub runs: Vec<Run>,
}

impl Paragraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn styled(style: impl Into<String>) -> Self {
        Self {
            style: Some(style.into()),
            ..Self::default()
        }
    }

    pub fn with_run(mut self, run: Run) -> Self {
        self.runs.push(run);
        self
    }

    /// Concatenated text of all text runs.
    pub fn text(&self) -> String {
        self.runs
            .iter()
            .filter_map(|run| match &run.content {
                RunContent::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Runs that carry something other than whitespace.
    pub fn significant_runs(&self) -> impl Iterator<Item = &Run> {
        self.runs.iter().filter(|run| match &run.content {
            RunContent::Text(text) => !text.trim().is_empty() || run.comment.is_some(),
            _ => true,
        })
    }
}

/// Deepest list level WordprocessingML defines (`w:ilvl` runs 0 to 8).
pub const MAX_LIST_LEVEL: usize = 8;

/// List membership of a paragraph, taken from `w:numPr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ListInfo {
    pub num_id: usize,
    pub level: usize,
    pub ordered: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Run {
    pub content: RunContent,
    pub formatting: Formatting,
    /// Target of the hyperlink this run belongs to.
    pub link: Option<String>,
    /// Comment anchored on this run.
    pub comment: Option<Comment>,
}

impl Run {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: RunContent::Text(text.into()),
            ..Self::default()
        }
    }

    pub fn drawing(drawing: Drawing) -> Self {
        Self {
            content: RunContent::Drawing(drawing),
            ..Self::default()
        }
    }

    pub fn line_break() -> Self {
        Self {
            content: RunContent::Break,
            ..Self::default()
        }
    }

    pub fn with_formatting(mut self, formatting: Formatting) -> Self {
        self.formatting = formatting;
        self
    }

    pub fn with_comment(mut self, comment: Comment) -> Self {
        self.comment = Some(comment);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RunContent {
    Text(String),
    Drawing(Drawing),
    Break,
}

impl Default for RunContent {
    fn default() -> Self {
        RunContent::Text(String::new())
    }
}

/// Character formatting of a run. Value type: every run owns its copy.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Formatting {
    pub bold: bool,
    pub italic: bool,
    pub strike: bool,
    /// Font family (`w:rFonts/@w:ascii`).
    pub font: Option<String>,
    pub vertical: VerticalAlign,
    /// Character style display name.
    pub style: Option<String>,
    pub highlight: Option<String>,
    /// Keyboard input marker, carried by the "Kbd" character style.
    pub kbd: bool,
}

impl Formatting {
    pub fn bold() -> Self {
        Self {
            bold: true,
            ..Self::default()
        }
    }

    pub fn italic() -> Self {
        Self {
            italic: true,
            ..Self::default()
        }
    }

    pub fn font(family: impl Into<String>) -> Self {
        Self {
            font: Some(family.into()),
            ..Self::default()
        }
    }

    /// Monospace inference from the font family name.
    ///
    /// A family containing "mono" or "code" (any case), or exactly "Consolas" or
    /// "Courier New", is monospace. A missing family is not.
    pub fn is_monospace(&self) -> bool {
        match self.font.as_deref() {
            Some(font) => {
                let lower = font.to_lowercase();
                lower.contains("mono")
                    || lower.contains("code")
                    || font == "Consolas"
                    || font == "Courier New"
            }
            None => false,
        }
    }

    /// Bold either by flag or by a font family whose name contains "bold".
    pub fn is_bold(&self) -> bool {
        self.bold
            || self
                .font
                .as_deref()
                .is_some_and(|font| font.to_lowercase().contains("bold"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum VerticalAlign {
    #[default]
    Baseline,
    Superscript,
    Subscript,
}

/// Embedded picture.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Drawing {
    /// File name of the media part, e.g. "image1.png".
    pub file_name: String,
    #[serde(skip_serializing)]
    pub data: Vec<u8>,
    pub alt_text: Option<String>,
}

/// A document comment anchored on a run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Comment {
    pub author: Option<String>,
    pub text: String,
}

impl Comment {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            author: None,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Table {
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableCell {
    /// Number of grid columns covered (`w:gridSpan`), at least 1.
    pub span: usize,
    pub blocks: Vec<Block>,
}

impl TableCell {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { span: 1, blocks }
    }

    pub fn spanning(span: usize, blocks: Vec<Block>) -> Self {
        Self {
            span: span.max(1),
            blocks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monospace_detection_follows_family_name() {
        assert!(Formatting::font("Consolas").is_monospace());
        assert!(Formatting::font("Courier New").is_monospace());
        assert!(Formatting::font("JetBrains Mono").is_monospace());
        assert!(Formatting::font("Cascadia Code").is_monospace());
        assert!(!Formatting::font("Arial").is_monospace());
        assert!(!Formatting::font("consolas").is_monospace());
        assert!(!Formatting::default().is_monospace());
    }

    #[test]
    fn bold_detection_accepts_font_names() {
        assert!(Formatting::bold().is_bold());
        assert!(Formatting::font("Segoe UI Bold").is_bold());
        assert!(!Formatting::font("Segoe UI").is_bold());
        assert!(!Formatting::default().is_bold());
    }

    #[test]
    fn paragraph_text_skips_drawings() {
        let para = Paragraph::new()
            .with_run(Run::text("Hello "))
            .with_run(Run::drawing(Drawing::default()))
            .with_run(Run::text("world"));
        assert_eq!(para.text(), "Hello world");
    }
}
