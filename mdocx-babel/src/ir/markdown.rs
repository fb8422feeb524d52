//! Markdown document model, including platform directives.

use super::attributes::Attributes;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Document {
    /// Raw YAML between the `---` delimiters, without the delimiters.
    pub front_matter: Option<String>,
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self {
            front_matter: None,
            blocks,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Block {
    Paragraph(Vec<Inline>),
    Heading { level: u8, content: Vec<Inline> },
    List(List),
    Table(Table),
    CodeBlock { language: Option<String>, literal: String },
    Quote(Vec<Block>),
    Alert { kind: AlertKind, blocks: Vec<Block> },
    Html(String),
    ThematicBreak,
    TripleColon(TripleColonElement),
}

impl Block {
    pub fn kind(&self) -> &'static str {
        match self {
            Block::Paragraph(_) => "paragraph",
            Block::Heading { .. } => "heading",
            Block::List(_) => "list",
            Block::Table(_) => "table",
            Block::CodeBlock { .. } => "code-block",
            Block::Quote(_) => "quote",
            Block::Alert { .. } => "alert",
            Block::Html(_) => "html",
            Block::ThematicBreak => "thematic-break",
            Block::TripleColon(_) => "directive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct List {
    pub ordered: bool,
    pub start: usize,
    pub items: Vec<ListItem>,
}

impl List {
    pub fn new(ordered: bool) -> Self {
        Self {
            ordered,
            start: 1,
            items: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ListItem {
    pub blocks: Vec<Block>,
}

/// GitHub-style alert callout kinds (`> [!NOTE]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AlertKind {
    Note,
    Tip,
    Important,
    Warning,
    Caution,
}

impl AlertKind {
    pub const ALL: [AlertKind; 5] = [
        AlertKind::Note,
        AlertKind::Tip,
        AlertKind::Important,
        AlertKind::Warning,
        AlertKind::Caution,
    ];

    /// Marker label as written inside `[!...]`.
    pub fn label(self) -> &'static str {
        match self {
            AlertKind::Note => "NOTE",
            AlertKind::Tip => "TIP",
            AlertKind::Important => "IMPORTANT",
            AlertKind::Warning => "WARNING",
            AlertKind::Caution => "CAUTION",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(label))
    }

    /// Paragraph style used on the word-processing side.
    pub fn style_name(self) -> &'static str {
        match self {
            AlertKind::Note => "Alert Note",
            AlertKind::Tip => "Alert Tip",
            AlertKind::Important => "Alert Important",
            AlertKind::Warning => "Alert Warning",
            AlertKind::Caution => "Alert Caution",
        }
    }

    pub fn from_style_name(style: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.style_name().eq_ignore_ascii_case(style))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Alignment {
    #[default]
    None,
    Left,
    Center,
    Right,
}

/// How a table is written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TableForm {
    /// GFM pipe table: rectangular, inline content only, first row is the header.
    Pipe,
    /// `:::row:::` / `:::column:::` platform table: spans and block content allowed.
    Directive,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub form: TableForm,
    pub alignments: Vec<Alignment>,
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableCell {
    pub span: usize,
    pub blocks: Vec<Block>,
}

impl TableCell {
    pub fn new(span: usize, blocks: Vec<Block>) -> Self {
        Self {
            span: span.max(1),
            blocks,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Inline {
    Text(String),
    Strong(Vec<Inline>),
    Emphasis(Vec<Inline>),
    Strikethrough(Vec<Inline>),
    Code(String),
    Link {
        url: String,
        title: String,
        content: Vec<Inline>,
    },
    Image {
        url: String,
        title: String,
        alt: String,
    },
    LineBreak,
    SoftBreak,
    Html(String),
    Tagged {
        tag: InlineTag,
        content: Vec<Inline>,
    },
    TripleColon(TripleColonElement),
}

/// HTML tags given structural meaning inside paragraphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InlineTag {
    Kbd,
    Sup,
    Sub,
    Mark,
}

impl InlineTag {
    pub fn name(self) -> &'static str {
        match self {
            InlineTag::Kbd => "kbd",
            InlineTag::Sup => "sup",
            InlineTag::Sub => "sub",
            InlineTag::Mark => "mark",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "kbd" => Some(InlineTag::Kbd),
            "sup" => Some(InlineTag::Sup),
            "sub" => Some(InlineTag::Sub),
            "mark" => Some(InlineTag::Mark),
            _ => None,
        }
    }
}

/// Directive extension identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Extension {
    Image,
    Code,
    Zone,
    /// Any other directive name; rendered as a no-op.
    Unknown(String),
}

impl Extension {
    pub fn from_name(name: &str) -> Self {
        match name {
            "image" => Extension::Image,
            "code" => Extension::Code,
            "zone" => Extension::Zone,
            other => Extension::Unknown(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Extension::Image => "image",
            Extension::Code => "code",
            Extension::Zone => "zone",
            Extension::Unknown(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DirectiveChildren {
    None,
    Blocks(Vec<Block>),
    Inlines(Vec<Inline>),
}

/// A triple-colon directive. Open and close markers are already resolved: a
/// block-form directive owns its child blocks and records whether its closing
/// marker was found.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripleColonElement {
    pub extension: Extension,
    pub attributes: Attributes,
    pub closed: bool,
    pub children: DirectiveChildren,
}

impl TripleColonElement {
    pub fn new(extension: Extension, attributes: Attributes) -> Self {
        Self {
            extension,
            attributes,
            closed: true,
            children: DirectiveChildren::None,
        }
    }

    pub fn with_blocks(mut self, blocks: Vec<Block>) -> Self {
        self.children = DirectiveChildren::Blocks(blocks);
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key)
    }

    /// Whether this directive is written with an owned body and an end marker.
    pub fn is_block_form(&self) -> bool {
        match self.extension {
            Extension::Zone => true,
            Extension::Image => self.attributes.get("type") == Some("complex"),
            _ => matches!(self.children, DirectiveChildren::Blocks(_)),
        }
    }
}
