//! Diff reports: plain text, CSV or a Markdown table per file.

use super::FileDiff;
use crate::error::FormatError;
use std::str::FromStr;

const SEPARATOR: &str = "------------------------------";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Csv,
    Markdown,
}

impl FromStr for ReportFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(ReportFormat::Text),
            "csv" => Ok(ReportFormat::Csv),
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            other => Err(FormatError::InvalidArgument(format!(
                "unknown report format '{other}' (expected text, csv or markdown)"
            ))),
        }
    }
}

pub fn render_report(diffs: &[FileDiff], format: ReportFormat) -> Result<String, FormatError> {
    match format {
        ReportFormat::Text => Ok(text_report(diffs)),
        ReportFormat::Csv => csv_report(diffs),
        ReportFormat::Markdown => Ok(markdown_report(diffs)),
    }
}

fn text_report(diffs: &[FileDiff]) -> String {
    let mut out = String::new();
    for file in diffs.iter().filter(|file| !file.differences.is_empty()) {
        out.push_str(&file.file_name);
        out.push('\n');
        for diff in &file.differences {
            let line = match (diff.original.is_empty(), diff.new.is_empty()) {
                (_, true) => format!("{} {}: {}", diff.kind, diff.position, diff.original),
                (true, false) => format!("{} {}: {}", diff.kind, diff.position, diff.new),
                (false, false) => format!(
                    "{} {}: {} -> {}",
                    diff.kind, diff.position, diff.original, diff.new
                ),
            };
            out.push_str("    ");
            out.push_str(&line);
            out.push('\n');
        }
        out.push_str(SEPARATOR);
        out.push('\n');
    }
    out
}

fn csv_report(diffs: &[FileDiff]) -> Result<String, FormatError> {
    let csv_err = |e: csv::Error| FormatError::SerializationError(format!("CSV report: {e}"));
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["Filename", "Change", "Line", "Original", "New"])
        .map_err(csv_err)?;
    for file in diffs {
        for diff in &file.differences {
            writer
                .write_record([
                    file.file_name.as_str(),
                    diff.kind.label(),
                    diff.position.as_str(),
                    diff.original.as_str(),
                    diff.new.as_str(),
                ])
                .map_err(csv_err)?;
        }
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| FormatError::SerializationError(format!("CSV report: {e}")))?;
    String::from_utf8(bytes)
        .map_err(|e| FormatError::SerializationError(format!("CSV report: {e}")))
}

fn markdown_report(diffs: &[FileDiff]) -> String {
    let mut out = String::new();
    for file in diffs.iter().filter(|file| !file.differences.is_empty()) {
        out.push_str(&format!("## {}\n\n", file.file_name));
        out.push_str("| Type | Position | Original | New |\n");
        out.push_str("| --- | --- | --- | --- |\n");
        for diff in &file.differences {
            out.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                diff.kind,
                diff.position,
                table_cell(&diff.original),
                table_cell(&diff.new)
            ));
        }
        out.push('\n');
    }
    out
}

fn table_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', "<br>")
}
