//! Triple-colon directive grammar.
//!
//! Markers look like `:::name key="value" key2="value2":::`. Block-form directives end
//! with `:::name-end:::`; a bare `:::` line also closes the innermost open directive.
//! Parsing is lenient (whitespace after the leading colons, unquoted values, a missing
//! trailing `:::` on openers), emission is always the canonical form.

use crate::ir::Attributes;
use std::ops::Range;

/// A single directive marker line or span.
#[derive(Debug, Clone, PartialEq)]
pub enum Marker {
    Open {
        name: String,
        attributes: Attributes,
        /// The marker ended with its own `:::`.
        terminated: bool,
    },
    /// `:::name-end:::`, or a bare `:::` when `name` is `None`.
    Close { name: Option<String> },
}

impl Marker {
    pub fn is_open(&self, expected: &str) -> bool {
        matches!(self, Marker::Open { name, .. } if name == expected)
    }

    pub fn is_close(&self, expected: &str) -> bool {
        matches!(self, Marker::Close { name: Some(name) } if name == expected)
    }
}

/// Parse one marker. Surrounding whitespace is ignored.
pub fn parse_marker(text: &str) -> Option<Marker> {
    let rest = text.trim().strip_prefix(":::")?.trim_start();
    if rest.is_empty() {
        return Some(Marker::Close { name: None });
    }

    let (body, terminated) = match rest.strip_suffix(":::") {
        Some(body) => (body.trim_end(), true),
        None => (rest, false),
    };

    let name_len = body
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(body.len());
    if name_len == 0 || !body.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return None;
    }
    let (name, remainder) = body.split_at(name_len);
    if !remainder.is_empty() && !remainder.starts_with(char::is_whitespace) {
        return None;
    }

    if let Some(base) = name.strip_suffix("-end") {
        if remainder.trim().is_empty() && !base.is_empty() {
            return Some(Marker::Close {
                name: Some(base.to_string()),
            });
        }
    }

    Some(Marker::Open {
        name: name.to_string(),
        attributes: parse_attributes(remainder),
        terminated,
    })
}

/// Parse a whitespace separated `key="value"` sequence.
///
/// Single quotes, unquoted values and bare keys (empty value) are accepted.
pub fn parse_attributes(source: &str) -> Attributes {
    let mut attributes = Attributes::new();
    let mut chars = source.char_indices().peekable();

    loop {
        while chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
        let Some(&(start, _)) = chars.peek() else {
            break;
        };

        let mut key_end = source.len();
        while let Some(&(idx, c)) = chars.peek() {
            if c == '=' || c.is_whitespace() {
                key_end = idx;
                break;
            }
            chars.next();
        }
        let key = &source[start..key_end];

        if chars.next_if(|(_, c)| *c == '=').is_none() {
            if !key.is_empty() {
                attributes.insert(key, "");
            }
            continue;
        }

        let value = match chars.peek().map(|&(_, c)| c) {
            Some(quote @ ('"' | '\'')) => {
                chars.next();
                let mut value = String::new();
                for (_, c) in chars.by_ref() {
                    if c == quote {
                        break;
                    }
                    value.push(c);
                }
                value
            }
            _ => {
                let mut value = String::new();
                while let Some((_, c)) = chars.next_if(|(_, c)| !c.is_whitespace()) {
                    value.push(c);
                }
                value
            }
        };

        if !key.is_empty() {
            attributes.insert(key, unescape_value(&value));
        }
    }

    attributes
}

/// ` key="value"` for every attribute, in insertion order.
pub fn format_attributes(attributes: &Attributes) -> String {
    let mut out = String::new();
    for (key, value) in attributes.iter() {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&value.replace('"', "&quot;"));
        out.push('"');
    }
    out
}

pub fn format_open(name: &str, attributes: &Attributes) -> String {
    format!(":::{name}{}:::", format_attributes(attributes))
}

pub fn format_close(name: &str) -> String {
    format!(":::{name}-end:::")
}

/// Locate every terminated directive embedded in a line of text.
///
/// Returns byte ranges into `text` with the parsed marker. Spans never cross lines.
pub fn find_inline_markers(text: &str) -> Vec<(Range<usize>, Marker)> {
    let mut found = Vec::new();
    let mut cursor = 0;

    while let Some(offset) = text[cursor..].find(":::") {
        let start = cursor + offset;
        let Some(close_offset) = text[start + 3..].find(":::") else {
            break;
        };
        let end = start + 3 + close_offset + 3;
        let candidate = &text[start..end];

        match parse_marker(candidate) {
            Some(marker @ Marker::Open { terminated: true, .. }) if !candidate.contains('\n') => {
                found.push((start..end, marker));
                cursor = end;
            }
            _ => cursor = start + 3,
        }
    }

    found
}

fn unescape_value(value: &str) -> String {
    value.replace("&quot;", "\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(name: &str, attrs: &[(&str, &str)], terminated: bool) -> Marker {
        Marker::Open {
            name: name.to_string(),
            attributes: attrs.iter().copied().collect(),
            terminated,
        }
    }

    #[test]
    fn parses_terminated_opener() {
        let marker = parse_marker(r#":::image type="content" source="media/a.png" alt-text="A cat":::"#);
        assert_eq!(
            marker,
            Some(open(
                "image",
                &[
                    ("type", "content"),
                    ("source", "media/a.png"),
                    ("alt-text", "A cat")
                ],
                true
            ))
        );
    }

    #[test]
    fn parses_unterminated_opener_with_leading_space() {
        let marker = parse_marker(r#"::: zone pivot="windows,mac""#);
        assert_eq!(marker, Some(open("zone", &[("pivot", "windows,mac")], false)));
    }

    #[test]
    fn parses_close_forms() {
        let named = Some(Marker::Close {
            name: Some("zone".to_string()),
        });
        assert_eq!(parse_marker(":::zone-end:::"), named);
        assert_eq!(parse_marker(":::zone-end"), named);
        assert_eq!(parse_marker("::: zone-end"), named);
        assert_eq!(parse_marker(":::"), Some(Marker::Close { name: None }));
    }

    #[test]
    fn rejects_non_markers() {
        assert_eq!(parse_marker("plain text"), None);
        assert_eq!(parse_marker(":::::"), None);
        assert_eq!(parse_marker(":::=x:::"), None);
    }

    #[test]
    fn lenient_attribute_forms() {
        let attrs = parse_attributes(r#" span=2 title='x y' lightbox  border="false""#);
        assert_eq!(attrs.get("span"), Some("2"));
        assert_eq!(attrs.get("title"), Some("x y"));
        assert_eq!(attrs.get("lightbox"), Some(""));
        assert_eq!(attrs.get("border"), Some("false"));
    }

    #[test]
    fn emits_canonical_markers() {
        let attrs = Attributes::new()
            .with("source", "media/a.png")
            .with("alt-text", r#"say "hi""#);
        assert_eq!(
            format_open("image", &attrs),
            r#":::image source="media/a.png" alt-text="say &quot;hi&quot;":::"#
        );
        assert_eq!(format_close("zone"), ":::zone-end:::");

        let parsed = parse_marker(&format_open("image", &attrs));
        assert_eq!(parsed, Some(open("image", &[("source", "media/a.png"), ("alt-text", r#"say "hi""#)], true)));
    }

    #[test]
    fn finds_inline_markers_between_text() {
        let text = r#"Run :::code source="a.cs" language="csharp"::: then :::image source="b.png"::: done"#;
        let found = find_inline_markers(text);
        assert_eq!(found.len(), 2);
        assert_eq!(&text[found[0].0.clone()], r#":::code source="a.cs" language="csharp":::"#);
        assert!(found[1].1.is_open("image"));
    }

    #[test]
    fn inline_scan_skips_unterminated_colons() {
        assert!(find_inline_markers("ratio 3:::4 and ::: nothing").is_empty());
    }
}
