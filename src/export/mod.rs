//! Document assembly and archive population.
//!
//! - [`build_manifest`] generates `content.opf`
//! - [`build_nav`] generates `toc.ncx`
//! - [`populate_archive`] resolves payloads into an [`ArchiveSink`]
//! - [`EpubPacker`] drives all of the above into an EPUB file

mod epub;
mod ncx;
mod opf;

pub use epub::{
    ArchiveSink, DEFAULT_COMPRESSION_LEVEL, EpubArchive, EpubConfig, EpubPacker, populate_archive,
};
pub use ncx::build_nav;
pub use opf::build_manifest;
