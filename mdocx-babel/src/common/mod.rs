//! Format-agnostic pieces shared by readers, writers and renderers.

pub mod metadata;
pub mod triple_colon;
