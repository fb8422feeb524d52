//! Line-oriented YAML micro-parser.
//!
//! Only enough structure to compare metadata files and read front matter: root entries
//! start on unindented `key: value` lines, everything else attaches to the latest root
//! entry as a child. No nesting deeper than one level, no flow collections, no anchors.

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct YamlData {
    /// 1-based source line.
    pub line: usize,
    /// Verbatim line for comments and block scalar continuations.
    pub raw: Option<String>,
    pub key: String,
    pub value: String,
    pub children: Vec<YamlData>,
}

impl YamlData {
    fn entry(line: usize, key: &str, value: &str) -> Self {
        Self {
            line,
            key: key.trim().to_string(),
            value: value.trim().to_string(),
            ..Self::default()
        }
    }

    fn comment(line: usize, raw: &str) -> Self {
        Self {
            line,
            raw: Some(raw.to_string()),
            ..Self::default()
        }
    }

    /// A line kept whole, key only.
    fn bare(line: usize, raw: &str) -> Self {
        Self {
            key: raw.to_string(),
            ..Self::comment(line, raw)
        }
    }

    /// Comparable rendering: the raw line, `key: value` or `key:`.
    pub fn label(&self) -> String {
        match &self.raw {
            Some(raw) => raw.clone(),
            None if self.value.is_empty() => format!("{}:", self.key),
            None => format!("{}: {}", self.key, self.value),
        }
    }
}

fn is_root_line(line: &str) -> bool {
    if line.starts_with([' ', '\t']) {
        return false;
    }
    let colon = line.find(':');
    let space = line.find(char::is_whitespace);
    match (colon, space) {
        (Some(colon), Some(space)) => colon < space,
        (Some(_), None) => true,
        (None, _) => false,
    }
}

pub fn parse_yaml(text: &str) -> Vec<YamlData> {
    let mut roots: Vec<YamlData> = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let number = idx + 1;
        if line.trim().is_empty() || line.trim() == "---" {
            continue;
        }
        if line.starts_with('#') {
            roots.push(YamlData::comment(number, line));
            continue;
        }
        if is_root_line(line) {
            let (key, value) = line.split_once(':').unwrap_or((line, ""));
            roots.push(YamlData::entry(number, key, value));
            continue;
        }

        let Some(parent) = roots.last_mut() else {
            roots.push(YamlData::bare(number, line));
            continue;
        };
        let child = match line.trim().split_once(':') {
            Some((key, value)) if !parent.value.contains('|') => {
                YamlData::entry(number, key, value)
            }
            _ => YamlData::bare(number, line),
        };
        parent.children.push(child);
    }
    roots
}

/// Unquoted value of a root key, as used for a front matter `title`.
pub fn root_value(entries: &[YamlData], key: &str) -> Option<String> {
    let entry = entries.iter().find(|e| e.raw.is_none() && e.key == key)?;
    let value = entry.value.as_str();
    let unquoted = if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        value[1..value.len() - 1]
            .replace("\\\"", "\"")
            .replace("\\\\", "\\")
    } else if value.len() >= 2 && value.starts_with('\'') && value.ends_with('\'') {
        value[1..value.len() - 1].replace("''", "'")
    } else {
        value.to_string()
    };
    Some(unquoted).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indented_line_attaches_to_root() {
        let entries = parse_yaml("key1: val1\n  child1: x\n");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key, "key1");
        assert_eq!(entries[0].value, "val1");
        assert_eq!(entries[0].children.len(), 1);
        assert_eq!(entries[0].children[0].key, "child1");
        assert_eq!(entries[0].children[0].value, "x");
        assert_eq!(entries[0].children[0].line, 2);
    }

    #[test]
    fn comments_are_kept_verbatim() {
        let entries = parse_yaml("# header\ntitle: A\n");
        assert_eq!(entries[0].raw.as_deref(), Some("# header"));
        assert_eq!(entries[0].label(), "# header");
        assert_eq!(entries[1].label(), "title: A");
    }

    #[test]
    fn block_scalar_lines_are_not_split() {
        let entries = parse_yaml("description: |\n  Time: 10 minutes\n  More text\n");
        let children = &entries[0].children;
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].key, "  Time: 10 minutes");
        assert!(children[0].value.is_empty());
        assert_eq!(children[0].label(), "  Time: 10 minutes");
    }

    #[test]
    fn space_before_colon_is_not_a_root_entry() {
        let entries = parse_yaml("title: A\nnot a key: x\n- item\n");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].children.len(), 2);
        assert_eq!(entries[0].children[1].label(), "- item");
    }

    #[test]
    fn quoted_root_value_is_unquoted() {
        let entries = parse_yaml("title: \"Install: Windows\"\nother: x\n");
        assert_eq!(root_value(&entries, "title").as_deref(), Some("Install: Windows"));
        assert_eq!(root_value(&entries, "missing"), None);
    }
}
