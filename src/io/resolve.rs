use log::debug;

use super::{Fetcher, FileSystem};
use crate::error::Result;
use crate::model::ContentData;
use crate::util::decode_text;

/// Turns [`ContentData`] into bytes using the injected capabilities.
#[derive(Clone, Copy)]
pub struct Resolver<'a> {
    fs: &'a dyn FileSystem,
    fetcher: &'a dyn Fetcher,
}

impl<'a> Resolver<'a> {
    pub fn new(fs: &'a dyn FileSystem, fetcher: &'a dyn Fetcher) -> Self {
        Self { fs, fetcher }
    }

    pub fn fs(&self) -> &'a dyn FileSystem {
        self.fs
    }

    /// Read, copy, or fetch the bytes of `data`.
    pub fn resolve(&self, data: &ContentData) -> Result<Vec<u8>> {
        match data {
            ContentData::Local(path) => {
                debug!("Reading {path}");
                Ok(self.fs.read(path)?)
            }
            ContentData::Inline(text) => Ok(text.as_bytes().to_vec()),
            ContentData::Remote(url) => self.fetcher.fetch(url),
        }
    }

    /// Resolve `data` and decode it as text.
    pub fn resolve_text(&self, data: &ContentData) -> Result<String> {
        match data {
            ContentData::Inline(text) => Ok(text.clone()),
            _ => Ok(decode_text(&self.resolve(data)?).into_owned()),
        }
    }
}
