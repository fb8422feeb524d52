//! Text escaping helpers for the Markdown writer.

pub(super) fn escape_markdown_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '*' => out.push_str("\\*"),
            '_' => out.push_str("\\_"),
            '[' => out.push_str("\\["),
            ']' => out.push_str("\\]"),
            '`' => out.push_str("\\`"),
            '<' => out.push_str("\\<"),
            _ => out.push(ch),
        }
    }
    // keep literal text from reading back as a directive
    out.replace(":::", "\\:::")
}

/// Escape a line start that would otherwise open a block construct.
pub(super) fn escape_line_start(line: &str) -> String {
    let trimmed = line.trim_start();
    let needs_escape = trimmed.starts_with('#')
        || trimmed.starts_with('>')
        || trimmed.starts_with("---")
        || trimmed.starts_with("===")
        || ["- ", "+ "].iter().any(|m| trimmed.starts_with(m))
        || trimmed == "-"
        || trimmed == "+"
        || starts_with_ordered_marker(trimmed);

    if !needs_escape {
        return trimmed.to_string();
    }

    let digits = trimmed.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        // "1. text" -> "1\. text"
        let (number, rest) = trimmed.split_at(digits);
        format!("{number}\\{rest}")
    } else {
        format!("\\{trimmed}")
    }
}

fn starts_with_ordered_marker(text: &str) -> bool {
    let digits = text.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 || digits > 9 {
        return false;
    }
    let rest = &text[digits..];
    (rest.starts_with('.') || rest.starts_with(')'))
        && (rest.len() == 1 || rest[1..].starts_with(' '))
}

pub(super) fn escape_table_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

pub(super) fn indent_multiline(text: &str, indent: usize) -> String {
    if indent == 0 || text.is_empty() {
        return text.to_string();
    }
    let prefix = " ".repeat(indent);
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{prefix}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn max_consecutive_backticks(text: &str) -> usize {
    let mut max_run = 0usize;
    let mut current = 0usize;
    for ch in text.chars() {
        if ch == '`' {
            current += 1;
            max_run = max_run.max(current);
        } else {
            current = 0;
        }
    }
    max_run
}

pub(super) fn render_inline_code(code: &str) -> String {
    let ticks = max_consecutive_backticks(code);
    let fence = "`".repeat(ticks + 1);
    if code.starts_with('`') || code.ends_with('`') {
        format!("{fence} {code} {fence}")
    } else {
        format!("{fence}{code}{fence}")
    }
}

pub(super) fn code_fence_block(language: Option<&str>, content: &str) -> String {
    let max_ticks = max_consecutive_backticks(content);
    let fence = "`".repeat((max_ticks + 1).max(3));
    let mut out = String::new();
    out.push_str(&fence);
    if let Some(lang) = language.filter(|lang| !lang.is_empty()) {
        out.push_str(lang);
    }
    out.push('\n');
    if !content.is_empty() {
        out.push_str(content.trim_end_matches('\n'));
        out.push('\n');
    }
    out.push_str(&fence);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_emphasis_and_brackets() {
        assert_eq!(escape_markdown_text("a*b_c [d]"), "a\\*b\\_c \\[d\\]");
        assert_eq!(escape_markdown_text("x :::zone:::"), "x \\:::zone:::");
    }

    #[test]
    fn line_start_hazards() {
        assert_eq!(escape_line_start("# not a heading"), "\\# not a heading");
        assert_eq!(escape_line_start("- not a bullet"), "\\- not a bullet");
        assert_eq!(escape_line_start("1. not a list"), "1\\. not a list");
        assert_eq!(escape_line_start("plain -text"), "plain -text");
        assert_eq!(escape_line_start("2024 was a year"), "2024 was a year");
    }

    #[test]
    fn inline_code_grows_fence() {
        assert_eq!(render_inline_code("x"), "`x`");
        assert_eq!(render_inline_code("a`b"), "``a`b``");
        assert_eq!(render_inline_code("`x"), "`` `x ``");
    }

    #[test]
    fn code_fence_uses_language() {
        assert_eq!(
            code_fence_block(Some("rust"), "fn main() {}"),
            "```rust\nfn main() {}\n```"
        );
    }
}
