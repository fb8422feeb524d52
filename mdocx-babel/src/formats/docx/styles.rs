//! Paragraph and character styles written into every generated package

use crate::ir::markdown::AlertKind;
use docx_rs::*;

/// Style id for a display name: "Heading 1" → "Heading1".
pub fn style_id(display_name: &str) -> String {
    display_name.chars().filter(|c| !c.is_whitespace()).collect()
}

fn heading(level: usize, size: usize) -> Style {
    Style::new(&format!("Heading{level}"), StyleType::Paragraph)
        .name(&format!("Heading {level}"))
        .size(size)
        .bold()
}

fn monospace(family: &str) -> RunFonts {
    RunFonts::new()
        .ascii(family)
        .hi_ansi(family)
        .east_asia(family)
        .cs(family)
}

/// Add the converter's style sheet to a document.
pub fn add_styles(docx: Docx) -> Docx {
    let mut docx = docx
        .add_style(heading(1, 32))
        .add_style(heading(2, 28))
        .add_style(heading(3, 26))
        .add_style(heading(4, 24))
        .add_style(heading(5, 22))
        .add_style(heading(6, 20));

    docx = docx
        .add_style(
            Style::new("CodeBlock", StyleType::Paragraph)
                .name("Code Block")
                .fonts(monospace("Courier New"))
                .size(18),
        )
        .add_style(
            Style::new("BlockQuote", StyleType::Paragraph)
                .name("Block Quote")
                .indent(Some(720), None, None, None)
                .italic(),
        )
        .add_style(
            Style::new("Kbd", StyleType::Character)
                .name("Kbd")
                .fonts(monospace("Consolas"))
                .bold(),
        )
        .add_style(Style::new("Superscript", StyleType::Character).name("Superscript"))
        .add_style(Style::new("Subscript", StyleType::Character).name("Subscript"))
        .add_style(
            Style::new("Hyperlink", StyleType::Character)
                .name("Hyperlink")
                .color("0000FF")
                .underline("single"),
        );

    for kind in AlertKind::ALL {
        docx = docx.add_style(
            Style::new(&style_id(kind.style_name()), StyleType::Paragraph)
                .name(kind.style_name())
                .indent(Some(360), None, None, None),
        );
    }

    docx
}
