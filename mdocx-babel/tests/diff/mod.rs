//! Comparison tests over files on disk.

mod lines;
mod trees;
