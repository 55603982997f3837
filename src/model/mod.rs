//! Core data model: the parsed book and the content it packs.
//!
//! This module contains:
//! - [`Content`], a file placed in the archive, and [`UnnamedContent`],
//!   inlined into generated XML
//! - [`ContentData`], the closed set of places content bytes come from
//! - [`Book`], the result of parsing one descriptor

mod book;
mod content;

pub use book::{Book, RESERVED_ENTRIES};
pub use content::{Content, ContentData, OriginKind, UnnamedContent};
