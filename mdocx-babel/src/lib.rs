//! Structural conversion between DOCX and Markdown
//!
//!     This crate converts word-processing documents to documentation-platform Markdown and
//!     back, keeping the structure (headings, lists, tables, code, callouts, images) and the
//!     platform's triple-colon directives (`:::image:::`, `:::code:::`, `:::zone:::`).
//!     It also ships the comparators used to check that a round trip lost nothing.
//!
//!     This is a pure lib, that is, it powers mdocx-cli but is shell agnostic: no code here
//!     prints to stdout or reads env vars. Diagnostics go through the `log` facade.
//!
//! Architecture
//!
//!     Every conversion goes through two object models (./ir), one per side:
//!
//!         DOCX bytes ──parse──▶ ir::docx ──render──▶ ir::markdown ──serialize──▶ Markdown text
//!         Markdown text ──parse──▶ ir::markdown ──render──▶ ir::docx ──serialize──▶ DOCX bytes
//!
//!     Formats (./formats) only move between bytes and their own model. All the mapping
//!     decisions live in the renderers (./render), which dispatch each node to the first
//!     renderer in a fixed priority list that accepts it. Nodes nothing accepts are logged
//!     and dropped, never fatal.
//!
//!     The file structure :
//!     .
//!     ├── error.rs
//!     ├── format.rs               # Format trait definition
//!     ├── registry.rs             # FormatRegistry for discovery and selection
//!     ├── convert.rs              # File and folder conversion pipeline
//!     ├── formats
//!     │   ├── docx                # zip + roxmltree reader, docx-rs writer
//!     │   └── markdown            # comrak reader with directive pre-pass, hand writer
//!     ├── ir                      # The two object models
//!     ├── common                  # Directive grammar, comment metadata channel
//!     ├── render                  # Dispatch framework and both directions
//!     └── diff                    # Line diff, positional tree diff, YAML micro-parser
//!
//! Testing
//!     tests
//!     ├── lib.rs
//!     ├── roundtrip.rs
//!     ├── properties.rs
//!     └── diff.rs
//!
//!     Note that rust does not by default discover tests in subdirectories, so these are
//!     declared from tests/lib.rs.
//!
//! Lossy Conversions
//!
//!     Neither direction is lossless. Word has no directives, so directives travel as
//!     placeholder text plus a metadata comment (see ./common/metadata.rs) and are rebuilt
//!     from the comment on the way back. Markdown has no page layout, fonts or colors; only
//!     monospace, bold-by-font and highlight survive as inline markup.
//!
//!     Use [`diff`] in AST mode on the two ends of a round trip to see what was lost.
//!
pub mod common;
pub mod convert;
pub mod diff;
pub mod error;
pub mod format;
pub mod formats;
pub mod ir;
pub mod registry;
pub mod render;

pub use convert::{convert_batch, convert_file, ConvertArtifact, ConvertResult, ConvertSpec};
pub use error::FormatError;
pub use format::{Format, SerializedDocument};
pub use registry::FormatRegistry;
pub use render::{RenderContext, RenderOptions};
