//! Format implementations
//!
//! This module contains the format implementations that convert between file
//! bytes and the two document object models.

pub mod docx;
pub mod markdown;

pub use docx::DocxFormat;
pub use markdown::MarkdownFormat;
