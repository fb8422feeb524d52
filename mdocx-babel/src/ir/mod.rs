//! Object models for both sides of a conversion.
//!
//! [`docx`] mirrors the word-processing document (blocks, runs, drawings, comments) and
//! [`markdown`] mirrors the Markdown document including the platform's triple-colon
//! directives. Renderers in [`crate::render`] lower one model into the other; the
//! formats in [`crate::formats`] read and write them.
//!
//! Both models are plain owned trees. Order of children is the only position signal
//! and is preserved exactly through every stage.

pub mod attributes;
pub mod docx;
pub mod markdown;

pub use attributes::Attributes;
