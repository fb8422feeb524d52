//! Side-by-side line diff with noise suppression.

use super::{ChangeKind, DiffOptions, Difference};
use similar::{capture_diff_slices, Algorithm, DiffOp};
use std::collections::BTreeMap;

/// Character pairs treated as the same marker written two ways.
const MARKER_CLASSES: [[char; 2]; 2] = [['-', '*'], ['*', '_']];

/// Compare two texts line by line.
///
/// Lines are aligned with Myers. Inside a replaced hunk, lines pair up by index. Any line
/// still unpaired afterwards is matched against an unpaired line at the same line
/// number on the other side before it is reported as a plain addition or deletion.
pub fn diff_lines(original: &str, new: &str, options: &DiffOptions) -> Vec<Difference> {
    let old_lines = split_lines(original);
    let new_lines = split_lines(new);

    let mut changed: Vec<(usize, usize)> = Vec::new();
    let mut deleted: BTreeMap<usize, usize> = BTreeMap::new();
    let mut added: BTreeMap<usize, usize> = BTreeMap::new();

    for op in capture_diff_slices(Algorithm::Myers, &old_lines, &new_lines) {
        match op {
            DiffOp::Equal { .. } => {}
            DiffOp::Delete {
                old_index, old_len, ..
            } => {
                for idx in old_index..old_index + old_len {
                    deleted.insert(idx + 1, idx);
                }
            }
            DiffOp::Insert {
                new_index, new_len, ..
            } => {
                for idx in new_index..new_index + new_len {
                    added.insert(idx + 1, idx);
                }
            }
            DiffOp::Replace {
                old_index,
                old_len,
                new_index,
                new_len,
            } => {
                let paired = old_len.min(new_len);
                for offset in 0..paired {
                    changed.push((old_index + offset, new_index + offset));
                }
                for idx in old_index + paired..old_index + old_len {
                    deleted.insert(idx + 1, idx);
                }
                for idx in new_index + paired..new_index + new_len {
                    added.insert(idx + 1, idx);
                }
            }
        }
    }

    let same_position: Vec<usize> = deleted
        .keys()
        .filter(|line| added.contains_key(line))
        .copied()
        .collect();
    for line in same_position {
        if let (Some(old_idx), Some(new_idx)) = (deleted.remove(&line), added.remove(&line)) {
            changed.push((old_idx, new_idx));
        }
    }

    let mut differences: Vec<(usize, Difference)> = Vec::new();
    for (old_idx, new_idx) in changed {
        let (before, after) = (old_lines[old_idx], new_lines[new_idx]);
        if options.ignore_marker_substitutions && is_marker_substitution(before, after) {
            continue;
        }
        differences.push((old_idx + 1, Difference::changed(old_idx + 1, before, after)));
    }
    for (line, idx) in deleted {
        let text = old_lines[idx];
        if !(options.ignore_blank_lines && text.trim().is_empty()) {
            differences.push((line, Difference::deleted(line, text)));
        }
    }
    for (line, idx) in added {
        let text = new_lines[idx];
        if !(options.ignore_blank_lines && text.trim().is_empty()) {
            differences.push((line, Difference::added(line, text)));
        }
    }

    differences.sort_by_key(|(line, diff)| (*line, kind_order(diff.kind)));
    differences.into_iter().map(|(_, diff)| diff).collect()
}

fn kind_order(kind: ChangeKind) -> u8 {
    match kind {
        ChangeKind::Deleted => 0,
        ChangeKind::Changed => 1,
        ChangeKind::Added => 2,
    }
}

fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

/// Same length, and every differing position swaps characters within one marker class.
pub fn is_marker_substitution(before: &str, after: &str) -> bool {
    if before == after || before.chars().count() != after.chars().count() {
        return false;
    }
    before.chars().zip(after.chars()).all(|(a, b)| {
        a == b
            || MARKER_CLASSES
                .iter()
                .any(|class| class.contains(&a) && class.contains(&b))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diff(a: &str, b: &str) -> Vec<Difference> {
        diff_lines(a, b, &DiffOptions::default())
    }

    #[test]
    fn bullet_swap_is_noise() {
        assert!(diff("- item", "* item").is_empty());
    }

    #[test]
    fn emphasis_swap_is_noise() {
        assert!(diff("some *word* here", "some _word_ here").is_empty());
    }

    #[test]
    fn dash_underscore_swap_is_not_noise() {
        assert_eq!(diff("a-b", "a_b").len(), 1);
    }

    #[test]
    fn inserted_blank_line_is_noise() {
        assert!(diff("foo", "foo\n").is_empty());
        assert!(diff("a\nb\n", "a\n\nb\n").is_empty());
    }

    #[test]
    fn real_change_is_reported_once() {
        assert_eq!(
            diff("- item", "- widget"),
            vec![Difference::changed(1, "- item", "- widget")]
        );
    }

    #[test]
    fn additions_and_deletions_keep_line_numbers() {
        let out = diff("a\nb\nc\n", "a\nc\nd\n");
        assert_eq!(
            out,
            vec![Difference::deleted(2, "b"), Difference::added(3, "d")]
        );
    }

    #[test]
    fn same_line_delete_and_insert_pair_up() {
        let out = diff("keep\nold\nkeep2\n", "keep\nkeep2\nnew\n");
        assert!(out.iter().all(|d| d.kind != ChangeKind::Changed));
        let out = diff("x\nold line\n", "x\n");
        assert_eq!(out, vec![Difference::deleted(2, "old line")]);
    }

    #[test]
    fn noise_rules_can_be_disabled() {
        let options = DiffOptions {
            ignore_marker_substitutions: false,
            ignore_blank_lines: false,
            ..DiffOptions::default()
        };
        assert_eq!(diff_lines("- item", "* item", &options).len(), 1);
        assert_eq!(diff_lines("foo", "foo\n", &options).len(), 1);
    }

    #[test]
    fn marker_substitution_requires_equal_length() {
        assert!(is_marker_substitution("**bold**", "__bold__"));
        assert!(!is_marker_substitution("**bold**", "_bold_"));
        assert!(!is_marker_substitution("same", "same"));
    }
}
