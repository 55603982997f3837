//! EPUB packer.
//!
//! Writes the fixed container files, the generated documents, and one entry
//! per distinct packed path.

use std::io::{Seek, Write};

use log::{debug, info};
use rayon::prelude::*;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use super::{build_manifest, build_nav};
use crate::error::Result;
use crate::io::Resolver;
use crate::model::Book;

/// Container.xml template.
const CONTAINER_XML: &[u8] = br#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>
"#;

/// Default deflate level for everything except `mimetype`.
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 9;

/// Accepts archive entries keyed by packed path.
pub trait ArchiveSink {
    fn add_entry(&mut self, packed_path: &str, data: &[u8]) -> Result<()>;
}

/// An EPUB container being written to `W`.
///
/// `mimetype` (stored) and `META-INF/container.xml` are written on creation.
pub struct EpubArchive<W: Write + Seek> {
    zip: ZipWriter<W>,
    deflated: SimpleFileOptions,
}

impl<W: Write + Seek> EpubArchive<W> {
    pub fn new(writer: W, compression_level: u32) -> Result<Self> {
        let mut zip = ZipWriter::new(writer);

        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        let deflated = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(compression_level as i64));

        // mimetype must be first and uncompressed
        zip.start_file("mimetype", stored)?;
        zip.write_all(b"application/epub+zip")?;

        zip.start_file("META-INF/container.xml", deflated)?;
        zip.write_all(CONTAINER_XML)?;

        Ok(Self { zip, deflated })
    }

    /// Write the central directory and hand back the writer.
    pub fn finish(self) -> Result<W> {
        Ok(self.zip.finish()?)
    }
}

impl<W: Write + Seek> ArchiveSink for EpubArchive<W> {
    fn add_entry(&mut self, packed_path: &str, data: &[u8]) -> Result<()> {
        self.zip.start_file(packed_path, self.deflated)?;
        self.zip.write_all(data)?;
        Ok(())
    }
}

/// Resolve every distinct packed path of `book` into `sink`.
///
/// De-duplication happens before any resolution; resolutions then run in
/// parallel and the first failure aborts without writing anything.
pub fn populate_archive(book: &Book, resolver: &Resolver<'_>, sink: &mut dyn ArchiveSink) -> Result<()> {
    for (packed_path, data) in resolve_payloads(book, resolver)? {
        sink.add_entry(packed_path, &data)?;
    }
    Ok(())
}

fn resolve_payloads<'b>(book: &'b Book, resolver: &Resolver<'_>) -> Result<Vec<(&'b str, Vec<u8>)>> {
    book.packed_items()
        .into_par_iter()
        .map(|content| {
            let data = resolver.resolve(&content.data)?;
            debug!("Resolved {} ({} bytes)", content.packed_path, data.len());
            Ok((content.packed_path.as_str(), data))
        })
        .collect()
}

/// Configuration for EPUB packing.
#[derive(Debug, Clone)]
pub struct EpubConfig {
    /// Compression level for deflate (0-9, default 9).
    pub compression_level: Option<u32>,
}

impl Default for EpubConfig {
    fn default() -> Self {
        Self {
            compression_level: Some(DEFAULT_COMPRESSION_LEVEL),
        }
    }
}

/// Packs a parsed [`Book`] into an EPUB.
///
/// # Example
///
/// ```no_run
/// use gen_epub_book::descriptor::parse_descriptor;
/// use gen_epub_book::export::EpubPacker;
/// use gen_epub_book::io::{HttpFetcher, LocalFs, Resolver};
/// use std::fs::File;
///
/// let text = std::fs::read_to_string("book/book.epupp")?;
/// let book = parse_descriptor(&text, "book", ":", false)?;
/// let fetcher = HttpFetcher::default();
/// let mut file = File::create("book.epub")?;
/// EpubPacker::new().export(&book, &Resolver::new(&LocalFs, &fetcher), &mut file)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct EpubPacker {
    config: EpubConfig,
}

impl EpubPacker {
    /// Create a new packer with default configuration.
    pub fn new() -> Self {
        Self {
            config: EpubConfig::default(),
        }
    }

    /// Configure the packer with custom settings.
    pub fn with_config(mut self, config: EpubConfig) -> Self {
        self.config = config;
        self
    }

    /// Resolve everything `book` needs and write the archive to `writer`.
    ///
    /// Documents and payloads are produced concurrently; nothing is written
    /// until all of them succeed.
    pub fn export<W: Write + Seek>(&self, book: &Book, resolver: &Resolver<'_>, writer: &mut W) -> Result<()> {
        info!(
            "Packing \"{}\": {} contents, {} additives",
            book.name,
            book.contents.len(),
            book.additives.len()
        );

        let ((manifest, nav), payloads) = rayon::join(
            || rayon::join(|| build_manifest(book, resolver), || build_nav(book, resolver.fs())),
            || resolve_payloads(book, resolver),
        );
        let (manifest, nav, payloads) = (manifest?, nav?, payloads?);

        let level = self.config.compression_level.unwrap_or(DEFAULT_COMPRESSION_LEVEL);
        let mut archive = EpubArchive::new(writer, level)?;
        archive.add_entry("content.opf", manifest.as_bytes())?;
        archive.add_entry("toc.ncx", nav.as_bytes())?;
        for (packed_path, data) in &payloads {
            archive.add_entry(packed_path, data)?;
        }
        archive.finish()?;

        info!("Packed {} entries", payloads.len() + 4);
        Ok(())
    }
}

impl Default for EpubPacker {
    fn default() -> Self {
        Self::new()
    }
}
