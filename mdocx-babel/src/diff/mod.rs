//! Round-trip verification diffs.
//!
//! Two comparators, both meant for inputs that should be nearly identical:
//!
//! - [`lines`]: Myers line alignment with noise suppression. Bullet and emphasis marker
//!   swaps (`-`/`*`, `*`/`_`) and inserted or deleted blank lines are not reported.
//! - [`ast`]: positional lockstep walk over two parsed trees (Markdown, DOCX or the
//!   [`yaml`] micro-model). Nodes are paired by index, never realigned.
//!
//! [`compare_files`] and [`compare_dirs`] pick the parser from the file extension and
//! produce [`FileDiff`]s, which [`report`] renders as text, CSV or Markdown.

pub mod ast;
pub mod lines;
pub mod report;
pub mod yaml;

use crate::error::FormatError;
use crate::formats::{docx as docx_format, markdown as markdown_format};
use crate::render::{docx_to_md, RenderContext};
use log::debug;
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use walkdir::WalkDir;

pub use report::{render_report, ReportFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChangeKind {
    Added,
    Deleted,
    Changed,
}

impl ChangeKind {
    pub fn label(self) -> &'static str {
        match self {
            ChangeKind::Added => "Added",
            ChangeKind::Deleted => "Deleted",
            ChangeKind::Changed => "Changed",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One reported difference. `position` is a 1-based line number for line diffs and a
/// dotted 1-based index path (`"3.1"`) for tree diffs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Difference {
    pub kind: ChangeKind,
    pub position: String,
    pub original: String,
    pub new: String,
}

impl Difference {
    pub fn added(position: impl ToString, new: impl Into<String>) -> Self {
        Self {
            kind: ChangeKind::Added,
            position: position.to_string(),
            original: String::new(),
            new: new.into(),
        }
    }

    pub fn deleted(position: impl ToString, original: impl Into<String>) -> Self {
        Self {
            kind: ChangeKind::Deleted,
            position: position.to_string(),
            original: original.into(),
            new: String::new(),
        }
    }

    pub fn changed(
        position: impl ToString,
        original: impl Into<String>,
        new: impl Into<String>,
    ) -> Self {
        Self {
            kind: ChangeKind::Changed,
            position: position.to_string(),
            original: original.into(),
            new: new.into(),
        }
    }
}

/// Differences found for one compared file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileDiff {
    pub file_name: String,
    pub differences: Vec<Difference>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiffMode {
    #[default]
    Lines,
    Ast,
}

impl FromStr for DiffMode {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lines" | "line" => Ok(DiffMode::Lines),
            "ast" | "tree" => Ok(DiffMode::Ast),
            other => Err(FormatError::InvalidArgument(format!(
                "unknown diff mode '{other}' (expected lines or ast)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffOptions {
    pub mode: DiffMode,
    /// Drop changed line pairs that differ only by `-`/`*` or `*`/`_` swaps.
    pub ignore_marker_substitutions: bool,
    /// Drop inserted or deleted blank lines.
    pub ignore_blank_lines: bool,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            mode: DiffMode::Lines,
            ignore_marker_substitutions: true,
            ignore_blank_lines: true,
        }
    }
}

/// File kinds the comparators understand, by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputKind {
    Markdown,
    Docx,
    Yaml,
    Text,
}

impl InputKind {
    fn of(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "md" | "markdown" => Some(InputKind::Markdown),
            "docx" => Some(InputKind::Docx),
            "yml" | "yaml" => Some(InputKind::Yaml),
            "txt" => Some(InputKind::Text),
            _ => None,
        }
    }
}

fn read_text(path: &Path) -> Result<String, FormatError> {
    fs::read_to_string(path)
        .map_err(|e| FormatError::Io(format!("cannot read {}: {e}", path.display())))
}

/// Text used for line comparison. A DOCX package is compared through its Markdown
/// rendering.
fn comparable_text(path: &Path, kind: InputKind) -> Result<String, FormatError> {
    match kind {
        InputKind::Docx => {
            let bytes = fs::read(path)?;
            let doc = docx_format::parser::parse_from_docx(&bytes)?;
            let md = docx_to_md::render_document(&doc, &mut RenderContext::default())?;
            markdown_format::serializer::serialize_to_markdown(&md)
        }
        _ => read_text(path),
    }
}

fn tree_of(path: &Path, kind: InputKind) -> Result<Vec<ast::DiffNode>, FormatError> {
    match kind {
        InputKind::Markdown => {
            let doc = markdown_format::parser::parse_from_markdown(&read_text(path)?)?;
            Ok(ast::from_markdown(&doc))
        }
        InputKind::Docx => {
            let doc = docx_format::parser::parse_from_docx(&fs::read(path)?)?;
            Ok(ast::from_docx(&doc))
        }
        InputKind::Yaml => Ok(ast::from_yaml(&yaml::parse_yaml(&read_text(path)?))),
        InputKind::Text => Ok(ast::from_lines(&read_text(path)?)),
    }
}

/// Compare two files. The file kind comes from the original's extension.
pub fn compare_files(
    original: &Path,
    new: &Path,
    options: &DiffOptions,
) -> Result<FileDiff, FormatError> {
    for path in [original, new] {
        if !path.is_file() {
            return Err(FormatError::InvalidArgument(format!(
                "{} does not exist or is not a file",
                path.display()
            )));
        }
    }
    let kind = InputKind::of(original).unwrap_or(InputKind::Text);

    let differences = match options.mode {
        DiffMode::Lines => lines::diff_lines(
            &comparable_text(original, kind)?,
            &comparable_text(new, kind)?,
            options,
        ),
        DiffMode::Ast => ast::diff_trees(&tree_of(original, kind)?, &tree_of(new, kind)?),
    };

    Ok(FileDiff {
        file_name: new
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| new.display().to_string()),
        differences,
    })
}

/// Compare every supported file under `original_dir` with the file at the same relative
/// path under `new_dir`. Files present on one side only are reported as a whole-file
/// deletion or addition.
pub fn compare_dirs(
    original_dir: &Path,
    new_dir: &Path,
    options: &DiffOptions,
) -> Result<Vec<FileDiff>, FormatError> {
    for dir in [original_dir, new_dir] {
        if !dir.is_dir() {
            return Err(FormatError::InvalidArgument(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
    }

    let originals = relative_files(original_dir)?;
    let news = relative_files(new_dir)?;
    let mut diffs = Vec::new();

    for relative in &originals {
        let name = relative.replace('\\', "/");
        let new_path = new_dir.join(relative);
        if news.contains(relative) {
            let mut diff = compare_files(&original_dir.join(relative), &new_path, options)?;
            diff.file_name = name;
            diffs.push(diff);
        } else {
            diffs.push(FileDiff {
                file_name: name.clone(),
                differences: vec![Difference::deleted(0, name)],
            });
        }
    }
    for relative in news.iter().filter(|path| !originals.contains(path)) {
        let name = relative.replace('\\', "/");
        diffs.push(FileDiff {
            file_name: name.clone(),
            differences: vec![Difference::added(0, name)],
        });
    }

    Ok(diffs)
}

fn relative_files(root: &Path) -> Result<Vec<String>, FormatError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| FormatError::Io(e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if InputKind::of(entry.path()).is_none() {
            debug!("Not comparing {}", entry.path().display());
            continue;
        }
        if let Ok(relative) = entry.path().strip_prefix(root) {
            files.push(relative.to_string_lossy().into_owned());
        }
    }
    Ok(files)
}
