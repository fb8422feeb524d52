//! Comment metadata channel.
//!
//! DOCX has no slot for directive metadata such as an image's lightbox target or a
//! code reference's source path, so it travels in a document comment anchored on the
//! affected run. The comment text is a fixed sentinel followed by `key:"value"` pairs:
//!
//! ```text
//! mdocx-meta: link:"https://example.com" lightbox:"media/full.png" loc-scope:"other"
//! ```
//!
//! Only this module reads or writes that text.

use crate::ir::docx::Comment;
use crate::ir::Attributes;
use log::warn;

pub const SENTINEL: &str = "mdocx-meta:";

/// Key recording which directive a placeholder run stands for.
pub const DIRECTIVE_KEY: &str = "directive";

/// Serialize attributes into comment text.
pub fn encode(attributes: &Attributes) -> String {
    let mut out = String::from(SENTINEL);
    for (key, value) in attributes.iter() {
        out.push(' ');
        out.push_str(key);
        out.push_str(":\"");
        for c in value.chars() {
            if c == '"' || c == '\\' {
                out.push('\\');
            }
            out.push(c);
        }
        out.push('"');
    }
    out
}

/// Parse comment text back into attributes.
///
/// Returns `None` when the text does not start with the sentinel, i.e. it is an
/// ordinary editorial comment. A malformed tail keeps the pairs decoded before it.
pub fn decode(text: &str) -> Option<Attributes> {
    let rest = text.trim_start().strip_prefix(SENTINEL)?;
    let mut attributes = Attributes::new();
    let mut chars = rest.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        if chars.peek().is_none() {
            break;
        }

        let mut key = String::new();
        while let Some(c) = chars.next_if(|c| *c != ':' && !c.is_whitespace()) {
            key.push(c);
        }
        if chars.next() != Some(':') || chars.next() != Some('"') || key.is_empty() {
            warn!("Malformed metadata comment near '{key}'");
            break;
        }

        let mut value = String::new();
        let mut terminated = false;
        while let Some(c) = chars.next() {
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        value.push(escaped);
                    }
                }
                '"' => {
                    terminated = true;
                    break;
                }
                other => value.push(other),
            }
        }
        if !terminated {
            warn!("Unterminated metadata value for '{key}'");
            break;
        }
        attributes.insert(key, value);
    }

    Some(attributes)
}

/// Build the comment carrying `attributes`.
pub fn to_comment(attributes: &Attributes, author: Option<&str>) -> Comment {
    Comment {
        author: author.map(str::to_string),
        text: encode(attributes),
    }
}

/// Decode a run's comment, if it is a metadata comment.
pub fn from_comment(comment: Option<&Comment>) -> Option<Attributes> {
    comment.and_then(|comment| decode(&comment.text))
}
