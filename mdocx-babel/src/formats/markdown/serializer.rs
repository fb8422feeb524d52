//! Markdown serialization (Markdown object model → Markdown text)
//!
//! Output is canonical: `**` strong, `_` emphasis, fenced code, `-` bullets, pipe tables
//! for simple grids and `:::row:::` tables for everything else. Directives are always
//! written with a terminating `:::` and block-form directives always get an end marker.

use super::escape::{
    code_fence_block, escape_line_start, escape_markdown_text, escape_table_cell,
    indent_multiline, render_inline_code,
};
use crate::common::triple_colon::{format_close, format_open};
use crate::error::FormatError;
use crate::ir::markdown::{
    Alignment, Block, DirectiveChildren, Document, Inline, List, Table, TableForm,
    TripleColonElement,
};

const COLUMN_INDENT: usize = 4;
const CELL_BODY_INDENT: usize = 8;

/// Serialize a Markdown document to text
pub fn serialize_to_markdown(doc: &Document) -> Result<String, FormatError> {
    let mut out = String::new();
    if let Some(front_matter) = &doc.front_matter {
        out.push_str("---\n");
        out.push_str(front_matter.trim_end_matches('\n'));
        out.push_str("\n---\n\n");
    }
    out.push_str(&render_blocks(&doc.blocks));
    if !out.ends_with('\n') {
        out.push('\n');
    }
    Ok(out)
}

/// Render a block sequence, separating blocks with blank lines.
pub fn render_blocks(blocks: &[Block]) -> String {
    let mut parts = Vec::with_capacity(blocks.len());
    let mut alternate = false;
    let mut previous_list: Option<bool> = None;

    for block in blocks {
        let rendered = match block {
            Block::List(list) => {
                // adjacent lists of one kind need different markers to stay separate
                alternate = previous_list == Some(list.ordered) && !alternate;
                previous_list = Some(list.ordered);
                render_list(list, alternate)
            }
            other => {
                previous_list = None;
                alternate = false;
                render_block(other)
            }
        };
        if !rendered.is_empty() {
            parts.push(rendered);
        }
    }

    parts.join("\n\n")
}

fn render_block(block: &Block) -> String {
    match block {
        Block::Paragraph(inlines) => render_paragraph(inlines),
        Block::Heading { level, content } => {
            let text = render_inlines(content).replace('\n', " ");
            format!("{} {}", "#".repeat((*level).clamp(1, 6) as usize), text.trim())
        }
        Block::List(list) => render_list(list, false),
        Block::Table(table) => match table.form {
            TableForm::Pipe => render_pipe_table(table),
            TableForm::Directive => render_directive_table(table),
        },
        Block::CodeBlock { language, literal } => code_fence_block(language.as_deref(), literal),
        Block::Quote(blocks) => prefix_quote(&render_blocks(blocks)),
        Block::Alert { kind, blocks } => {
            let body = render_blocks(blocks);
            let marker = format!("[!{}]", kind.label());
            if body.is_empty() {
                prefix_quote(&marker)
            } else {
                prefix_quote(&format!("{marker}\n{body}"))
            }
        }
        Block::Html(html) => html.trim_end().to_string(),
        Block::ThematicBreak => "***".to_string(),
        Block::TripleColon(element) => render_directive_block(element),
    }
}

fn render_paragraph(inlines: &[Inline]) -> String {
    render_inlines(inlines)
        .lines()
        .map(|line| escape_line_start(line.trim_end()))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn render_list(list: &List, alternate: bool) -> String {
    let loose = list.items.iter().any(|item| {
        item.blocks
            .iter()
            .filter(|block| !matches!(block, Block::List(_)))
            .count()
            > 1
    });

    let mut items = Vec::with_capacity(list.items.len());
    for (idx, item) in list.items.iter().enumerate() {
        let marker = if list.ordered {
            let delimiter = if alternate { ')' } else { '.' };
            format!("{}{delimiter}", list.start + idx)
        } else if alternate {
            "*".to_string()
        } else {
            "-".to_string()
        };

        let mut body = String::new();
        for (pos, block) in item.blocks.iter().enumerate() {
            let rendered = render_block(block);
            if rendered.is_empty() {
                continue;
            }
            if pos > 0 && !body.is_empty() {
                let tight_child = !loose && matches!(block, Block::List(_));
                body.push_str(if tight_child { "\n" } else { "\n\n" });
            }
            body.push_str(&rendered);
        }

        if body.is_empty() {
            items.push(marker);
            continue;
        }

        let width = marker.len() + 1;
        let (first, rest) = body.split_once('\n').unwrap_or((body.as_str(), ""));
        let mut rendered = format!("{marker} {first}");
        if !rest.is_empty() {
            rendered.push('\n');
            rendered.push_str(&indent_multiline(rest, width));
        }
        items.push(rendered);
    }

    items.join(if loose { "\n\n" } else { "\n" })
}

fn cell_text(blocks: &[Block]) -> String {
    let text = blocks
        .iter()
        .map(|block| match block {
            Block::Paragraph(inlines) => render_inlines(inlines),
            other => render_block(other),
        })
        .collect::<Vec<_>>()
        .join(" ");
    escape_table_cell(text.trim())
}

fn render_pipe_table(table: &Table) -> String {
    let Some(header) = table.rows.first() else {
        return String::new();
    };
    let columns = table
        .rows
        .iter()
        .map(|row| row.cells.len())
        .max()
        .unwrap_or(0)
        .max(table.alignments.len())
        .max(1);

    let render_row = |cells: Vec<String>| {
        let mut padded = cells;
        padded.resize(columns, String::new());
        format!("| {} |", padded.join(" | "))
    };

    let mut lines = Vec::with_capacity(table.rows.len() + 1);
    lines.push(render_row(
        header.cells.iter().map(|cell| cell_text(&cell.blocks)).collect(),
    ));
    lines.push(render_row(
        (0..columns)
            .map(|idx| {
                match table.alignments.get(idx).copied().unwrap_or_default() {
                    Alignment::None => "---",
                    Alignment::Left => ":---",
                    Alignment::Center => ":---:",
                    Alignment::Right => "---:",
                }
                .to_string()
            })
            .collect(),
    ));
    for row in &table.rows[1..] {
        lines.push(render_row(
            row.cells.iter().map(|cell| cell_text(&cell.blocks)).collect(),
        ));
    }

    lines.join("\n")
}

fn render_directive_table(table: &Table) -> String {
    let column_indent = " ".repeat(COLUMN_INDENT);
    let mut rows = Vec::with_capacity(table.rows.len());

    for row in &table.rows {
        let mut out = String::from(":::row:::\n");
        for cell in &row.cells {
            out.push_str(&column_indent);
            if cell.span > 1 {
                out.push_str(&format!(":::column span=\"{}\":::\n", cell.span));
            } else {
                out.push_str(":::column:::\n");
            }
            let body = render_blocks(&cell.blocks);
            if !body.is_empty() {
                out.push_str(&indent_multiline(&body, CELL_BODY_INDENT));
                out.push('\n');
            }
            out.push_str(&column_indent);
            out.push_str(":::column-end:::\n");
        }
        out.push_str(":::row-end:::");
        rows.push(out);
    }

    rows.join("\n")
}

fn prefix_quote(body: &str) -> String {
    body.lines()
        .map(|line| {
            if line.is_empty() {
                ">".to_string()
            } else {
                format!("> {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_directive_block(element: &TripleColonElement) -> String {
    let name = element.extension.name();
    let open = format_open(name, &element.attributes);

    match &element.children {
        DirectiveChildren::Blocks(blocks) => {
            let body = render_blocks(blocks);
            if body.is_empty() {
                format!("{open}\n{}", format_close(name))
            } else {
                format!("{open}\n{body}\n{}", format_close(name))
            }
        }
        DirectiveChildren::Inlines(inlines) => {
            format!("{open}\n{}\n{}", render_paragraph(inlines), format_close(name))
        }
        DirectiveChildren::None if element.is_block_form() => {
            format!("{open}\n{}", format_close(name))
        }
        DirectiveChildren::None => open,
    }
}

/// Render inline content to Markdown source.
pub fn render_inlines(inlines: &[Inline]) -> String {
    let mut out = String::new();
    for inline in inlines {
        render_inline(inline, &mut out);
    }
    out
}

fn render_inline(inline: &Inline, out: &mut String) {
    match inline {
        Inline::Text(text) => out.push_str(&escape_markdown_text(text)),
        Inline::Strong(children) => out.push_str(&wrap_delimited("**", children)),
        Inline::Emphasis(children) => out.push_str(&wrap_delimited("_", children)),
        Inline::Strikethrough(children) => out.push_str(&wrap_delimited("~~", children)),
        Inline::Code(code) => out.push_str(&render_inline_code(code)),
        Inline::Link {
            url,
            title,
            content,
        } => {
            out.push('[');
            out.push_str(&render_inlines(content));
            out.push_str("](");
            out.push_str(&link_destination(url, title));
            out.push(')');
        }
        Inline::Image { url, title, alt } => {
            out.push_str("![");
            out.push_str(&escape_markdown_text(alt));
            out.push_str("](");
            out.push_str(&link_destination(url, title));
            out.push(')');
        }
        Inline::LineBreak => out.push_str("\\\n"),
        Inline::SoftBreak => out.push('\n'),
        Inline::Html(html) => out.push_str(html),
        Inline::Tagged { tag, content } => {
            out.push_str(&format!("<{}>", tag.name()));
            out.push_str(&render_inlines(content));
            out.push_str(&format!("</{}>", tag.name()));
        }
        Inline::TripleColon(element) => {
            out.push_str(&format_open(element.extension.name(), &element.attributes))
        }
    }
}

/// Wrap rendered children in a delimiter pair, keeping edge whitespace outside it.
fn wrap_delimited(delimiter: &str, children: &[Inline]) -> String {
    let inner = render_inlines(children);
    let core = inner.trim();
    if core.is_empty() {
        return inner;
    }
    let lead = &inner[..inner.len() - inner.trim_start().len()];
    let trail = &inner[inner.trim_end().len()..];
    format!("{lead}{delimiter}{core}{delimiter}{trail}")
}

fn link_destination(url: &str, title: &str) -> String {
    let destination = if url.contains([' ', '(', ')', '<', '>']) {
        format!("<{}>", url.replace('<', "%3C").replace('>', "%3E"))
    } else {
        url.to_string()
    };
    if title.is_empty() {
        destination
    } else {
        format!("{destination} \"{}\"", title.replace('"', "\\\""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::markdown::parser::parse_from_markdown;
    use crate::ir::markdown::{AlertKind, Extension, ListItem, TableCell, TableRow};
    use crate::ir::Attributes;

    fn text(s: &str) -> Inline {
        Inline::Text(s.to_string())
    }

    fn para(s: &str) -> Block {
        Block::Paragraph(vec![text(s)])
    }

    #[test]
    fn test_emphasis_keeps_spaces_outside_markers() {
        let inlines = vec![
            text("a"),
            Inline::Strong(vec![text(" bold ")]),
            text("b"),
        ];
        assert_eq!(render_inlines(&inlines), "a **bold** b");
    }

    #[test]
    fn test_paragraph_escapes_block_starts() {
        assert_eq!(render_block(&para("# not heading")), "\\# not heading");
        assert_eq!(render_block(&para("1. not a list")), "1\\. not a list");
    }

    #[test]
    fn test_nested_tight_list() {
        let mut inner = List::new(false);
        inner.items.push(ListItem {
            blocks: vec![para("child")],
        });
        let mut outer = List::new(true);
        outer.items.push(ListItem {
            blocks: vec![para("parent"), Block::List(inner)],
        });
        outer.items.push(ListItem {
            blocks: vec![para("next")],
        });

        assert_eq!(
            render_blocks(&[Block::List(outer)]),
            "1. parent\n   - child\n2. next"
        );
    }

    #[test]
    fn test_adjacent_lists_alternate_markers() {
        let list = |s: &str| {
            let mut list = List::new(false);
            list.items.push(ListItem {
                blocks: vec![para(s)],
            });
            Block::List(list)
        };
        assert_eq!(render_blocks(&[list("a"), list("b")]), "- a\n\n* b");
    }

    #[test]
    fn test_pipe_table() {
        let table = Table {
            form: TableForm::Pipe,
            alignments: vec![Alignment::None, Alignment::Center],
            rows: vec![
                TableRow {
                    cells: vec![TableCell::new(1, vec![para("A")]), TableCell::new(1, vec![para("B")])],
                },
                TableRow {
                    cells: vec![TableCell::new(1, vec![para("x|y")]), TableCell::new(1, vec![])],
                },
            ],
        };
        assert_eq!(
            render_block(&Block::Table(table)),
            "| A | B |\n| --- | :---: |\n| x\\|y |  |"
        );
    }

    #[test]
    fn test_directive_table_with_span() {
        let table = Table {
            form: TableForm::Directive,
            alignments: vec![],
            rows: vec![TableRow {
                cells: vec![TableCell::new(2, vec![para("Wide")])],
            }],
        };
        assert_eq!(
            render_block(&Block::Table(table)),
            ":::row:::\n    :::column span=\"2\":::\n        Wide\n    :::column-end:::\n:::row-end:::"
        );
    }

    #[test]
    fn test_zone_directive_block() {
        let zone = TripleColonElement::new(
            Extension::Zone,
            Attributes::new().with("pivot", "windows"),
        )
        .with_blocks(vec![para("Hi")]);
        assert_eq!(
            render_block(&Block::TripleColon(zone)),
            ":::zone pivot=\"windows\":::\nHi\n:::zone-end:::"
        );
    }

    #[test]
    fn test_alert() {
        let alert = Block::Alert {
            kind: AlertKind::Tip,
            blocks: vec![para("Use it.")],
        };
        assert_eq!(render_block(&alert), "> [!TIP]\n> Use it.");
    }

    #[test]
    fn test_document_reparses_to_same_model() {
        let source = "\
---
title: Sample
---

# Heading

Some **bold** and *italic* text with `code`.

- one
- two

:::image type=\"content\" source=\"media/a.png\" alt-text=\"Alt\":::

:::zone pivot=\"mac\":::
Only on mac.
:::zone-end:::

| A | B |
| --- | --- |
| 1 | 2 |
";
        let first = parse_from_markdown(source).unwrap();
        let written = serialize_to_markdown(&first).unwrap();
        let second = parse_from_markdown(&written).unwrap();
        assert_eq!(first, second);
    }
}
