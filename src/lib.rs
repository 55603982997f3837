//! # gen-epub-book
//!
//! Generate an ePub book from a simple plaintext descriptor.
//!
//! ## Descriptor format
//!
//! One `Key: Value` directive per line. `Name`, `Author`, `Date` (RFC3339)
//! and `Language` (BCP47) are required; `Content`, `String-Content`,
//! `Network-Image-Content`, `Cover`, `Network-Cover`, `Include`,
//! `Network-Include`, `Description`, `String-Description` and
//! `Network-Description` add material to the book.
//!
//! ```text
//! Name: Simple ePub demonstration
//! Author: nabijaczleweli
//! Date: 2017-02-08T15:30:18+01:00
//! Language: en-GB
//! Cover: images/cover.png
//! Content: simple/ctnt.html
//! String-Content: <strong>SEIZE THE MEANS OF PRODUCTION!</strong>
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use gen_epub_book::{pack_book, parse_descriptor};
//! use std::io::Cursor;
//!
//! let text = std::fs::read_to_string("book/book.epupp")?;
//! let book = parse_descriptor(&text, "book", ":", false)?;
//!
//! let mut epub = Cursor::new(Vec::new());
//! pack_book(&book, &mut epub)?;
//! std::fs::write("book.epub", epub.into_inner())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::io::{Seek, Write};

pub mod descriptor;
pub mod error;
pub mod export;
pub mod io;
pub mod model;
pub mod patterns;
pub mod util;

pub use descriptor::{DescriptorParser, LanguageTag, parse_descriptor};
pub use error::{Error, Result};
pub use export::{EpubConfig, EpubPacker, build_manifest, build_nav, populate_archive};
pub use model::{Book, Content, ContentData, OriginKind, UnnamedContent};

/// Pack `book` into `writer`, reading local files from disk and fetching
/// remote content over HTTP with the default timeout.
pub fn pack_book<W: Write + Seek>(book: &Book, writer: &mut W) -> Result<()> {
    let fetcher = io::HttpFetcher::default();
    let resolver = io::Resolver::new(&io::LocalFs, &fetcher);
    EpubPacker::new().export(book, &resolver, writer)
}
