//! File conversion pipeline.
//!
//! Ties the format registry, the renderers and file I/O together: read a file, parse it
//! with the format its extension names, lower it into the target model, serialize, write.
//! Use this for "convert this file" or "convert this folder" commands. For in-memory work
//! use [`FormatRegistry`] and the [`render`](crate::render) functions directly.
//!
//! A failed conversion leaves nothing behind: media extracted for it and any partially
//! written output are deleted before the error is returned.

use crate::error::FormatError;
use crate::format::{Document, SerializedDocument};
use crate::registry::FormatRegistry;
use crate::render::{docx_to_md, md_to_docx, RenderContext, RenderOptions};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Characters rejected in output paths.
const INVALID_PATH_CHARS: &[char] = &['<', '>', '"', '|', '?', '*'];

/// Specifies one file conversion.
///
/// ```ignore
/// let spec = ConvertSpec::new("guide.md")
///     .with_output_path("guide.docx")
///     .with_options(options);
/// ```
///
/// Without a target the direction is the opposite of the input format. Without an output
/// path Markdown comes back in memory; DOCX always needs a path.
#[derive(Debug, Clone)]
pub struct ConvertSpec {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    /// Target format name ("docx", "markdown").
    pub target: Option<String>,
    pub options: RenderOptions,
}

impl ConvertSpec {
    pub fn new(input: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: None,
            target: None,
            options: RenderOptions::default(),
        }
    }

    pub fn with_output_path(mut self, path: impl AsRef<Path>) -> Self {
        self.output = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_target(mut self, format: impl Into<String>) -> Self {
        self.target = Some(format.into());
        self
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    fn validate(&self) -> Result<(), FormatError> {
        if self.input.as_os_str().is_empty() {
            return Err(FormatError::InvalidArgument(
                "input path is empty".to_string(),
            ));
        }
        if !self.input.is_file() {
            return Err(FormatError::InvalidArgument(format!(
                "{} does not exist or is not a file",
                self.input.display()
            )));
        }
        if let Some(output) = &self.output {
            let text = output.to_string_lossy();
            if text.is_empty() {
                return Err(FormatError::InvalidArgument(
                    "output path is empty".to_string(),
                ));
            }
            if text.contains(INVALID_PATH_CHARS) || text.contains(char::is_control) {
                return Err(FormatError::InvalidArgument(format!(
                    "output path {text:?} contains invalid characters"
                )));
            }
        }
        if matches!(&self.target, Some(target) if target.trim().is_empty()) {
            return Err(FormatError::InvalidArgument(
                "target format is empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConvertArtifact {
    /// Markdown text, when no output path was given.
    InMemory(String),
    /// Path of the written output.
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConvertResult {
    pub artifact: ConvertArtifact,
    /// Media files extracted next to the output.
    pub media: Vec<PathBuf>,
}

/// Convert one file.
///
/// # Errors
///
/// - [`FormatError::InvalidArgument`] for a missing input, an unusable output path, an
///   unrecognized input extension, or DOCX output without a path
/// - [`FormatError::FormatNotFound`] for an unknown target
/// - parse, render and write errors from the pipeline
pub fn convert_file(spec: &ConvertSpec) -> Result<ConvertResult, FormatError> {
    spec.validate()?;
    let registry = FormatRegistry::with_defaults();
    let source_format = registry
        .detect_format_from_filename(&spec.input.to_string_lossy())
        .ok_or_else(|| {
            FormatError::InvalidArgument(format!(
                "cannot tell the format of {} from its extension",
                spec.input.display()
            ))
        })?;
    let target = match &spec.target {
        Some(target) => target.to_ascii_lowercase(),
        None => opposite(&source_format).to_string(),
    };
    registry.get(&target)?;

    let document = registry.parse(&fs::read(&spec.input)?, &source_format)?;

    let mut ctx = RenderContext::new(spec.options.clone());
    if let Some(dir) = spec.input.parent() {
        ctx = ctx.with_source_dir(dir);
    }
    if let Some(output) = &spec.output {
        ctx = ctx.with_destination(output);
    }

    let outcome = lower(document, &target, &mut ctx)
        .and_then(|lowered| registry.serialize(&lowered, &target))
        .and_then(|serialized| emit(serialized, spec.output.as_deref()));

    match outcome {
        Ok(artifact) => Ok(ConvertResult {
            artifact,
            media: ctx.written_media,
        }),
        Err(err) => {
            discard(&ctx.written_media);
            Err(err)
        }
    }
}

fn opposite(format: &str) -> &'static str {
    if format == "docx" {
        "markdown"
    } else {
        "docx"
    }
}

/// Lower into the target's model. Same-model conversions pass through unchanged.
fn lower(document: Document, target: &str, ctx: &mut RenderContext) -> Result<Document, FormatError> {
    match (document, target) {
        (Document::Docx(doc), "markdown") => {
            docx_to_md::render_document(&doc, ctx).map(Document::Markdown)
        }
        (Document::Markdown(doc), "docx") => md_to_docx::render_document(&doc, ctx).map(Document::Docx),
        (document, _) => Ok(document),
    }
}

fn emit(
    serialized: SerializedDocument,
    output: Option<&Path>,
) -> Result<ConvertArtifact, FormatError> {
    match (serialized, output) {
        (serialized, Some(path)) => {
            write_to_path(path, &serialized.into_bytes()).map(ConvertArtifact::File)
        }
        (SerializedDocument::Text(text), None) => Ok(ConvertArtifact::InMemory(text)),
        (SerializedDocument::Binary(_), None) => Err(FormatError::InvalidArgument(
            "binary formats require an explicit output path".to_string(),
        )),
    }
}

fn write_to_path(path: &Path, bytes: &[u8]) -> Result<PathBuf, FormatError> {
    fs::write(path, bytes).map_err(|err| {
        if path.is_file() {
            discard(&[path.to_path_buf()]);
        }
        FormatError::Io(format!("cannot write {}: {err}", path.display()))
    })?;
    Ok(path.to_path_buf())
}

/// Best-effort removal of files written by a failed conversion.
fn discard(paths: &[PathBuf]) {
    for path in paths {
        match fs::remove_file(path) {
            Ok(()) => debug!("Removed {}", path.display()),
            Err(e) => warn!("Could not remove {}: {e}", path.display()),
        }
    }
}

/// Convert every recognized file under `input_dir` into `output_dir`, keeping relative
/// paths and swapping extensions. Files run one after another; the first failure stops
/// the batch and is returned, after that file's own cleanup.
pub fn convert_batch(
    input_dir: &Path,
    output_dir: &Path,
    target: Option<&str>,
    options: &RenderOptions,
) -> Result<Vec<ConvertResult>, FormatError> {
    if !input_dir.is_dir() {
        return Err(FormatError::InvalidArgument(format!(
            "{} is not a directory",
            input_dir.display()
        )));
    }
    let registry = FormatRegistry::with_defaults();

    let mut inputs = Vec::new();
    for entry in WalkDir::new(input_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| FormatError::Io(e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        match registry.detect_format_from_filename(&entry.path().to_string_lossy()) {
            Some(format) => inputs.push((entry.into_path(), format)),
            None => debug!("Skipping {}", entry.path().display()),
        }
    }

    let mut results = Vec::with_capacity(inputs.len());
    for (input, format) in inputs {
        let target = target.map(str::to_string).unwrap_or_else(|| opposite(&format).to_string());
        let extension = registry
            .get(&target)?
            .file_extensions()
            .first()
            .copied()
            .unwrap_or("out");
        let relative = input.strip_prefix(input_dir).unwrap_or(&input);
        let output = output_dir.join(relative).with_extension(extension);
        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent)?;
        }

        info!("Converting {} -> {}", input.display(), output.display());
        let spec = ConvertSpec::new(&input)
            .with_output_path(&output)
            .with_target(target)
            .with_options(options.clone());
        results.push(convert_file(&spec)?);
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const GUIDE: &str = "# Guide\n\nSome **bold** text.\n\n- one\n- two\n";

    #[test]
    fn markdown_to_docx_and_back() {
        let dir = tempdir().unwrap();
        let md = dir.path().join("guide.md");
        let docx = dir.path().join("guide.docx");
        let back = dir.path().join("back.md");
        fs::write(&md, GUIDE).unwrap();

        let result = convert_file(&ConvertSpec::new(&md).with_output_path(&docx)).unwrap();
        assert_eq!(result.artifact, ConvertArtifact::File(docx.clone()));
        assert!(docx.is_file());

        convert_file(&ConvertSpec::new(&docx).with_output_path(&back)).unwrap();
        assert_eq!(fs::read_to_string(&back).unwrap(), GUIDE);
    }

    #[test]
    fn markdown_output_stays_in_memory_without_path() {
        let dir = tempdir().unwrap();
        let md = dir.path().join("a.md");
        fs::write(&md, "Hello *world*\n").unwrap();
        let result = convert_file(&ConvertSpec::new(&md).with_target("markdown")).unwrap();
        assert_eq!(
            result.artifact,
            ConvertArtifact::InMemory("Hello _world_\n".to_string())
        );
    }

    #[test]
    fn docx_output_needs_a_path() {
        let dir = tempdir().unwrap();
        let md = dir.path().join("a.md");
        fs::write(&md, "text\n").unwrap();
        assert!(matches!(
            convert_file(&ConvertSpec::new(&md)),
            Err(FormatError::InvalidArgument(_))
        ));
    }

    #[test]
    fn bad_arguments_fail_before_reading() {
        let dir = tempdir().unwrap();
        let missing = ConvertSpec::new(dir.path().join("nope.md"));
        assert!(matches!(convert_file(&missing), Err(FormatError::InvalidArgument(_))));
        assert!(matches!(
            convert_file(&ConvertSpec::new("")),
            Err(FormatError::InvalidArgument(_))
        ));

        let md = dir.path().join("a.md");
        fs::write(&md, "text\n").unwrap();
        let bad_output = ConvertSpec::new(&md).with_output_path(dir.path().join("a?.docx"));
        assert!(matches!(convert_file(&bad_output), Err(FormatError::InvalidArgument(_))));

        let txt = dir.path().join("notes.txt");
        fs::write(&txt, "text\n").unwrap();
        assert!(matches!(
            convert_file(&ConvertSpec::new(&txt)),
            Err(FormatError::InvalidArgument(_))
        ));
    }

    #[test]
    fn unknown_target_is_reported() {
        let dir = tempdir().unwrap();
        let md = dir.path().join("a.md");
        fs::write(&md, "text\n").unwrap();
        assert!(matches!(
            convert_file(&ConvertSpec::new(&md).with_target("pdf")),
            Err(FormatError::FormatNotFound(_))
        ));
    }

    #[test]
    fn failed_write_is_an_io_error() {
        let dir = tempdir().unwrap();
        let md = dir.path().join("a.md");
        fs::write(&md, "text\n").unwrap();
        let blocked = dir.path().join("out.docx");
        fs::create_dir(&blocked).unwrap();
        let result = convert_file(&ConvertSpec::new(&md).with_output_path(&blocked));
        assert!(matches!(result, Err(FormatError::Io(_))));
        assert!(blocked.is_dir());
    }

    #[test]
    fn discard_removes_written_files() {
        let dir = tempdir().unwrap();
        let media = dir.path().join("media");
        fs::create_dir(&media).unwrap();
        let picture = media.join("a.png");
        fs::write(&picture, [1u8, 2, 3]).unwrap();
        discard(&[picture.clone(), media.join("never-written.png")]);
        assert!(!picture.exists());
    }

    #[test]
    fn batch_mirrors_the_tree() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        fs::create_dir_all(input.path().join("nested")).unwrap();
        fs::write(input.path().join("a.md"), "# A\n").unwrap();
        fs::write(input.path().join("nested/b.md"), "# B\n").unwrap();
        fs::write(input.path().join("notes.txt"), "skip\n").unwrap();

        let results =
            convert_batch(input.path(), output.path(), None, &RenderOptions::default()).unwrap();
        assert_eq!(results.len(), 2);
        assert!(output.path().join("a.docx").is_file());
        assert!(output.path().join("nested/b.docx").is_file());
        assert!(!output.path().join("notes.docx").exists());
    }

    #[test]
    fn batch_stops_at_first_failure() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        fs::write(input.path().join("a.docx"), b"not a zip").unwrap();
        fs::write(input.path().join("b.md"), "# B\n").unwrap();

        let result = convert_batch(input.path(), output.path(), None, &RenderOptions::default());
        assert!(matches!(result, Err(FormatError::ParseError(_))));
        assert!(!output.path().join("b.docx").exists());
    }
}
