//! Markdown parsing (Markdown text → Markdown object model)
//!
//! Pipeline: a line-level pre-pass recognizes directive blocks (zones, complex images,
//! `:::row:::` tables, self-closed directives on their own line) and front matter. The
//! text between them goes through comrak. Directives embedded in paragraph text are
//! swapped for private-use placeholders before comrak sees them and swapped back while
//! lowering comrak's AST, so their attribute text is never read as emphasis.

use crate::common::triple_colon::{self, Marker};
use crate::error::FormatError;
use crate::ir::markdown::{
    AlertKind, Alignment, Block, DirectiveChildren, Document, Extension, Inline, InlineTag, List,
    ListItem, Table, TableCell, TableForm, TableRow, TripleColonElement,
};
use comrak::nodes::{AstNode, ListType, NodeValue, TableAlignment};
use comrak::{parse_document, Arena, ComrakOptions};
use log::{debug, warn};

const PLACEHOLDER_OPEN: char = '\u{E000}';
const PLACEHOLDER_CLOSE: char = '\u{E001}';

/// Parse Markdown text into the Markdown object model
pub fn parse_from_markdown(source: &str) -> Result<Document, FormatError> {
    let normalized = source.replace("\r\n", "\n");
    let (front_matter, body) = split_front_matter(&normalized);
    let lines: Vec<&str> = body.split('\n').collect();
    Ok(Document {
        front_matter,
        blocks: parse_lines(&lines),
    })
}

fn default_comrak_options() -> ComrakOptions<'static> {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    options
}

fn split_front_matter(source: &str) -> (Option<String>, &str) {
    let Some(rest) = source.strip_prefix("---\n") else {
        return (None, source);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let trimmed = line.trim_end();
        if trimmed == "---" || trimmed == "..." {
            let yaml = rest[..offset].trim_end_matches('\n').to_string();
            let body = &rest[offset + line.len()..];
            return (Some(yaml), body);
        }
        offset += line.len();
    }

    (None, source)
}

/// What a top-level line means to the directive pre-pass.
fn classify_line(line: &str) -> Option<Marker> {
    if !line.starts_with(":::") {
        return None;
    }
    let trimmed = line.trim_end();
    let inline = triple_colon::find_inline_markers(trimmed);
    match inline.as_slice() {
        [(range, marker)] if *range == (0..trimmed.len()) => Some(marker.clone()),
        [] => triple_colon::parse_marker(trimmed),
        _ => None,
    }
}

/// Whether an opener owns a body that runs to a matching close marker.
fn opens_body(name: &str, attributes: &crate::ir::Attributes, terminated: bool) -> bool {
    match name {
        "zone" | "row" | "column" => true,
        "image" => attributes.get("type") == Some("complex"),
        "code" => false,
        _ => !terminated,
    }
}

struct Fence {
    marker: char,
    len: usize,
}

impl Fence {
    fn open(line: &str) -> Option<Self> {
        let indent = line.len() - line.trim_start_matches(' ').len();
        if indent > 3 {
            return None;
        }
        let trimmed = &line[indent..];
        let marker = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
        let len = trimmed.chars().take_while(|c| *c == marker).count();
        if len < 3 {
            return None;
        }
        if marker == '`' && trimmed[len..].contains('`') {
            return None;
        }
        Some(Self { marker, len })
    }

    fn closes(&self, line: &str) -> bool {
        let trimmed = line.trim();
        let count = trimmed.chars().take_while(|c| *c == self.marker).count();
        count >= self.len && count == trimmed.chars().count()
    }
}

/// Collects plain Markdown lines until a directive interrupts them.
#[derive(Default)]
struct Chunk {
    lines: Vec<String>,
    placeholders: Vec<(String, TripleColonElement)>,
}

impl Chunk {
    fn push_text(&mut self, line: &str) {
        let markers = triple_colon::find_inline_markers(line);
        if markers.is_empty() {
            self.lines.push(line.to_string());
            return;
        }

        let mut out = String::with_capacity(line.len());
        let mut last = 0;
        for (range, marker) in markers {
            let Marker::Open {
                name, attributes, ..
            } = marker
            else {
                continue;
            };
            if line[..range.start].ends_with('\\') {
                continue;
            }
            out.push_str(&line[last..range.start]);
            let idx = self.placeholders.len();
            out.push(PLACEHOLDER_OPEN);
            out.push_str(&idx.to_string());
            out.push(PLACEHOLDER_CLOSE);
            self.placeholders.push((
                line[range.clone()].to_string(),
                TripleColonElement::new(Extension::from_name(&name), attributes),
            ));
            last = range.end;
        }
        out.push_str(&line[last..]);
        self.lines.push(out);
    }

    fn push_raw(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }

    fn flush(&mut self, blocks: &mut Vec<Block>) {
        let text = self.lines.join("\n");
        let chunk = std::mem::take(self);
        if text.trim().is_empty() {
            return;
        }

        let arena = Arena::new();
        let options = default_comrak_options();
        let root = parse_document(&arena, &text, &options);
        let lowering = Lowering {
            placeholders: &chunk.placeholders,
        };
        for child in root.children() {
            if let Some(block) = lowering.block(child) {
                blocks.push(block);
            }
        }
    }
}

fn parse_lines(lines: &[&str]) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut chunk = Chunk::default();
    let mut fence: Option<Fence> = None;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        if let Some(open) = &fence {
            chunk.push_raw(line);
            if open.closes(line) {
                fence = None;
            }
            i += 1;
            continue;
        }
        if let Some(open) = Fence::open(line) {
            fence = Some(open);
            chunk.push_raw(line);
            i += 1;
            continue;
        }

        match classify_line(line) {
            Some(marker) if marker.is_open("row") => {
                chunk.flush(&mut blocks);
                let (table, next) = parse_directive_table(lines, i);
                blocks.push(Block::Table(table));
                i = next;
            }
            Some(Marker::Open {
                name,
                attributes,
                terminated,
            }) => {
                chunk.flush(&mut blocks);
                let mut element =
                    TripleColonElement::new(Extension::from_name(&name), attributes);
                if opens_body(&name, &element.attributes, terminated) {
                    let (body, closed, next) = collect_body(lines, i + 1);
                    element.children = DirectiveChildren::Blocks(parse_lines(&dedent(body)));
                    element.closed = closed;
                    if !closed {
                        warn!("Directive '{name}' opened without a closing marker");
                    }
                    i = next;
                } else {
                    element.closed = terminated;
                    i += 1;
                }
                blocks.push(Block::TripleColon(element));
            }
            Some(Marker::Close { name }) => {
                chunk.flush(&mut blocks);
                warn!(
                    "Dropping unmatched closing marker for '{}'",
                    name.as_deref().unwrap_or(":::")
                );
                i += 1;
            }
            None => {
                chunk.push_text(line);
                i += 1;
            }
        }
    }

    chunk.flush(&mut blocks);
    blocks
}

/// Lines up to the close marker balancing the opener before `start`.
///
/// Returns the body, whether the close marker was found, and the index after it.
fn collect_body<'a>(lines: &[&'a str], start: usize) -> (Vec<&'a str>, bool, usize) {
    let mut depth = 0usize;
    let mut fence: Option<Fence> = None;

    for (offset, line) in lines[start..].iter().enumerate() {
        if let Some(open) = &fence {
            if open.closes(line) {
                fence = None;
            }
            continue;
        }
        if let Some(open) = Fence::open(line) {
            fence = Some(open);
            continue;
        }

        let trimmed = line.trim();
        if !trimmed.starts_with(":::") {
            continue;
        }
        match classify_line(trimmed) {
            Some(Marker::Open {
                name,
                attributes,
                terminated,
            }) if opens_body(&name, &attributes, terminated) => depth += 1,
            Some(Marker::Close { .. }) => {
                if depth == 0 {
                    let end = start + offset;
                    return (lines[start..end].to_vec(), true, end + 1);
                }
                depth -= 1;
            }
            _ => {}
        }
    }

    (lines[start..].to_vec(), false, lines.len())
}

fn parse_directive_table(lines: &[&str], start: usize) -> (Table, usize) {
    let mut rows = Vec::new();
    let mut i = start;

    loop {
        // lines[i] is a row opener
        i += 1;
        let mut cells = Vec::new();

        while i < lines.len() {
            let marker = triple_colon::parse_marker(lines[i]);
            match marker {
                Some(marker) if marker.is_close("row") => {
                    i += 1;
                    break;
                }
                Some(Marker::Open {
                    ref name,
                    ref attributes,
                    ..
                }) if name == "column" => {
                    let span = attributes
                        .get("span")
                        .and_then(|s| s.trim().parse::<usize>().ok())
                        .unwrap_or(1);
                    i += 1;
                    let body_start = i;
                    while i < lines.len() && !ends_column(lines[i]) {
                        i += 1;
                    }
                    let body = dedent(lines[body_start..i].to_vec());
                    if i < lines.len()
                        && triple_colon::parse_marker(lines[i]).is_some_and(|m| m.is_close("column"))
                    {
                        i += 1;
                    }
                    cells.push(TableCell::new(span, parse_lines(&body)));
                }
                _ => {
                    if !lines[i].trim().is_empty() {
                        warn!("Ignoring content outside a column: '{}'", lines[i].trim());
                    }
                    i += 1;
                }
            }
        }

        rows.push(TableRow { cells });

        let mut next = i;
        while next < lines.len() && lines[next].trim().is_empty() {
            next += 1;
        }
        let another_row = next < lines.len()
            && triple_colon::parse_marker(lines[next]).is_some_and(|m| m.is_open("row"));
        if another_row {
            i = next;
        } else {
            break;
        }
    }

    let table = Table {
        form: TableForm::Directive,
        alignments: Vec::new(),
        rows,
    };
    (table, i)
}

fn ends_column(line: &str) -> bool {
    match triple_colon::parse_marker(line) {
        Some(marker) => {
            marker.is_close("column")
                || marker.is_open("column")
                || marker.is_close("row")
                || marker.is_open("row")
        }
        None => false,
    }
}

/// Strip the common leading indentation of non-blank lines. Only ASCII spaces and tabs
/// count as indentation, so the cut always lands on a character boundary.
fn dedent<'a>(lines: Vec<&'a str>) -> Vec<&'a str> {
    let indent = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0);

    lines
        .into_iter()
        .map(|line| {
            if line.trim().is_empty() {
                ""
            } else {
                &line[indent..]
            }
        })
        .collect()
}

/// Lowers comrak nodes into the object model, resolving directive placeholders.
struct Lowering<'p> {
    placeholders: &'p [(String, TripleColonElement)],
}

impl Lowering<'_> {
    fn block<'a>(&self, node: &'a AstNode<'a>) -> Option<Block> {
        let value = node.data.borrow().value.clone();
        match value {
            NodeValue::Paragraph => {
                let inlines = self.inlines(node);
                if let Some(element) = lone_directive(&inlines) {
                    return Some(Block::TripleColon(element));
                }
                Some(Block::Paragraph(inlines))
            }
            NodeValue::Heading(heading) => Some(Block::Heading {
                level: heading.level,
                content: self.inlines(node),
            }),
            NodeValue::List(list) => {
                let mut out = List::new(list.list_type == ListType::Ordered);
                out.start = list.start.max(1);
                for item in node.children() {
                    out.items.push(ListItem {
                        blocks: self.blocks(item),
                    });
                }
                Some(Block::List(out))
            }
            NodeValue::CodeBlock(code) => {
                let language = code
                    .info
                    .split_whitespace()
                    .next()
                    .map(str::to_string);
                let literal = self.restore(&code.literal);
                Some(Block::CodeBlock {
                    language,
                    literal: literal.strip_suffix('\n').unwrap_or(&literal).to_string(),
                })
            }
            NodeValue::BlockQuote => Some(self.quote(node)),
            NodeValue::HtmlBlock(html) => Some(Block::Html(
                self.restore(&html.literal).trim_end().to_string(),
            )),
            NodeValue::ThematicBreak => Some(Block::ThematicBreak),
            NodeValue::Table(table) => Some(Block::Table(self.table(node, &table.alignments))),
            other => {
                debug!("Skipping unsupported Markdown block {other:?}");
                None
            }
        }
    }

    fn blocks<'a>(&self, node: &'a AstNode<'a>) -> Vec<Block> {
        node.children().filter_map(|child| self.block(child)).collect()
    }

    fn quote<'a>(&self, node: &'a AstNode<'a>) -> Block {
        let mut blocks = self.blocks(node);

        let alert = match blocks.first_mut() {
            Some(Block::Paragraph(inlines)) => take_alert_marker(inlines),
            _ => None,
        };

        match alert {
            Some(kind) => {
                if matches!(blocks.first(), Some(Block::Paragraph(inlines)) if inlines.is_empty())
                {
                    blocks.remove(0);
                }
                Block::Alert { kind, blocks }
            }
            None => Block::Quote(blocks),
        }
    }

    fn table<'a>(&self, node: &'a AstNode<'a>, alignments: &[TableAlignment]) -> Table {
        let rows = node
            .children()
            .map(|row| TableRow {
                cells: row
                    .children()
                    .map(|cell| {
                        let inlines = self.inlines(cell);
                        let blocks = if inlines.is_empty() {
                            Vec::new()
                        } else {
                            vec![Block::Paragraph(inlines)]
                        };
                        TableCell::new(1, blocks)
                    })
                    .collect(),
            })
            .collect();

        Table {
            form: TableForm::Pipe,
            alignments: alignments
                .iter()
                .map(|align| match align {
                    TableAlignment::Left => Alignment::Left,
                    TableAlignment::Center => Alignment::Center,
                    TableAlignment::Right => Alignment::Right,
                    TableAlignment::None => Alignment::None,
                })
                .collect(),
            rows,
        }
    }

    fn inlines<'a>(&self, node: &'a AstNode<'a>) -> Vec<Inline> {
        let mut out = Vec::new();
        for child in node.children() {
            self.inline(child, &mut out);
        }
        fold_tagged(merge_text(out))
    }

    fn inline<'a>(&self, node: &'a AstNode<'a>, out: &mut Vec<Inline>) {
        let value = node.data.borrow().value.clone();
        match value {
            NodeValue::Text(text) => self.split_placeholders(&text, out),
            NodeValue::Strong => out.push(Inline::Strong(self.inlines(node))),
            NodeValue::Emph => out.push(Inline::Emphasis(self.inlines(node))),
            NodeValue::Strikethrough => out.push(Inline::Strikethrough(self.inlines(node))),
            NodeValue::Code(code) => out.push(Inline::Code(self.restore(&code.literal))),
            NodeValue::Link(link) => out.push(Inline::Link {
                url: link.url,
                title: link.title,
                content: self.inlines(node),
            }),
            NodeValue::Image(link) => {
                let mut alt = String::new();
                collect_text(node, &mut alt);
                out.push(Inline::Image {
                    url: link.url,
                    title: link.title,
                    alt: self.restore(&alt),
                });
            }
            NodeValue::SoftBreak => out.push(Inline::SoftBreak),
            NodeValue::LineBreak => out.push(Inline::LineBreak),
            NodeValue::HtmlInline(html) => out.push(Inline::Html(self.restore(&html))),
            other => {
                debug!("Flattening unsupported inline {other:?}");
                let mut text = String::new();
                collect_text(node, &mut text);
                if !text.is_empty() {
                    self.split_placeholders(&text, out);
                }
            }
        }
    }

    fn split_placeholders(&self, text: &str, out: &mut Vec<Inline>) {
        let mut buffer = String::new();
        let mut chars = text.chars();

        while let Some(c) = chars.next() {
            if c != PLACEHOLDER_OPEN {
                buffer.push(c);
                continue;
            }
            let digits: String = chars.by_ref().take_while(|c| *c != PLACEHOLDER_CLOSE).collect();
            match digits.parse::<usize>().ok().and_then(|idx| self.placeholders.get(idx)) {
                Some((_, element)) => {
                    if !buffer.is_empty() {
                        out.push(Inline::Text(std::mem::take(&mut buffer)));
                    }
                    out.push(Inline::TripleColon(element.clone()));
                }
                None => warn!("Dangling directive placeholder '{digits}'"),
            }
        }

        if !buffer.is_empty() {
            out.push(Inline::Text(buffer));
        }
    }

    /// Put original directive text back into literal content (code spans, HTML).
    fn restore(&self, text: &str) -> String {
        if !text.contains(PLACEHOLDER_OPEN) {
            return text.to_string();
        }
        let mut restored = text.to_string();
        for (idx, (original, _)) in self.placeholders.iter().enumerate() {
            let token = format!("{PLACEHOLDER_OPEN}{idx}{PLACEHOLDER_CLOSE}");
            restored = restored.replace(&token, original);
        }
        restored
    }
}

fn collect_text<'a>(node: &'a AstNode<'a>, output: &mut String) {
    match &node.data.borrow().value {
        NodeValue::Text(text) => output.push_str(text),
        NodeValue::Code(code) => output.push_str(&code.literal),
        NodeValue::SoftBreak | NodeValue::LineBreak => output.push(' '),
        _ => {
            for child in node.children() {
                collect_text(child, output);
            }
        }
    }
}

/// A paragraph made of exactly one directive (plus whitespace) is a block directive.
fn lone_directive(inlines: &[Inline]) -> Option<TripleColonElement> {
    let mut found = None;
    for inline in inlines {
        match inline {
            Inline::TripleColon(element) if found.is_none() => found = Some(element.clone()),
            Inline::Text(text) if text.trim().is_empty() => {}
            Inline::SoftBreak => {}
            _ => return None,
        }
    }
    found
}

fn merge_text(inlines: Vec<Inline>) -> Vec<Inline> {
    let mut out: Vec<Inline> = Vec::with_capacity(inlines.len());
    for inline in inlines {
        match (out.last_mut(), inline) {
            (Some(Inline::Text(previous)), Inline::Text(text)) => previous.push_str(&text),
            (_, inline) => out.push(inline),
        }
    }
    out
}

/// Fold `<kbd>`, `<sup>`, `<sub>` and `<mark>` tag pairs into tagged inlines.
fn fold_tagged(inlines: Vec<Inline>) -> Vec<Inline> {
    let mut root = Vec::new();
    let mut stack: Vec<(InlineTag, Vec<Inline>)> = Vec::new();

    for inline in inlines {
        if let Inline::Html(html) = &inline {
            match parse_simple_tag(html) {
                Some((tag, true)) => {
                    stack.push((tag, Vec::new()));
                    continue;
                }
                Some((tag, false)) if stack.last().is_some_and(|(open, _)| *open == tag) => {
                    if let Some((tag, content)) = stack.pop() {
                        let target = stack.last_mut().map(|(_, c)| c).unwrap_or(&mut root);
                        target.push(Inline::Tagged { tag, content });
                    }
                    continue;
                }
                _ => {}
            }
        }
        let target = stack.last_mut().map(|(_, c)| c).unwrap_or(&mut root);
        target.push(inline);
    }

    while let Some((tag, content)) = stack.pop() {
        let target = stack.last_mut().map(|(_, c)| c).unwrap_or(&mut root);
        target.push(Inline::Html(format!("<{}>", tag.name())));
        target.extend(content);
    }

    root
}

fn parse_simple_tag(html: &str) -> Option<(InlineTag, bool)> {
    let inner = html.trim().strip_prefix('<')?.strip_suffix('>')?.trim();
    match inner.strip_prefix('/') {
        Some(name) => InlineTag::from_name(name.trim()).map(|tag| (tag, false)),
        None => InlineTag::from_name(inner).map(|tag| (tag, true)),
    }
}

/// Remove a leading `[!KIND]` marker from an alert's first paragraph.
fn take_alert_marker(inlines: &mut Vec<Inline>) -> Option<AlertKind> {
    let Some(Inline::Text(first)) = inlines.first() else {
        return None;
    };
    let rest = first.trim_start().strip_prefix("[!")?;
    let end = rest.find(']')?;
    let kind = AlertKind::from_label(&rest[..end])?;
    let remainder = rest[end + 1..].trim_start().to_string();

    if remainder.is_empty() {
        inlines.remove(0);
        if matches!(inlines.first(), Some(Inline::SoftBreak | Inline::LineBreak)) {
            inlines.remove(0);
        }
    } else {
        inlines[0] = Inline::Text(remainder);
    }
    Some(kind)
}
