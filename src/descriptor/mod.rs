//! Descriptor parsing.
//!
//! A descriptor is plain text with one `Key: Value` directive per line.
//! Lines without the separator are skipped and unknown keys are ignored.
//! Every violation aborts the parse; the first one encountered wins.
//!
//! ```
//! use gen_epub_book::descriptor::DescriptorParser;
//! use gen_epub_book::io::MemoryFs;
//!
//! let fs = MemoryFs::new().with_file("book/ch1.html", "<p>Hi</p>");
//! let book = DescriptorParser::new(&fs)
//!     .parse(
//!         "Name: Hi\nAuthor: Me\nDate: 2017-02-08T15:30:18+01:00\nLanguage: en\nContent: ch1.html",
//!         "book",
//!     )
//!     .unwrap();
//! assert_eq!(book.contents[0].packed_path, "ch1.html");
//! ```

mod date;
mod field;
mod language;

pub use date::parse_date;
pub use language::{Extension, LanguageTag, LanguageTagError};

use chrono::{DateTime, FixedOffset};
use log::debug;
use url::Url;
use uuid::Uuid;

use self::field::SetOnce;
use crate::error::{Error, Result};
use crate::io::{FileSystem, LocalFs};
use crate::model::{Book, Content, ContentData, UnnamedContent};
use crate::util::{self, join_posix};

const COVER_GROUP: &str = "Cover or Network-Cover";
const DESCRIPTION_GROUP: &str = "Description, String-Description, or Network-Description";

/// Parse a descriptor against the local filesystem.
///
/// `relative_root` is the directory local paths are resolved against,
/// usually the descriptor's own directory.
pub fn parse_descriptor(text: &str, relative_root: &str, separator: &str, free_date: bool) -> Result<Book> {
    DescriptorParser::new(&LocalFs)
        .with_separator(separator)
        .with_free_date(free_date)
        .parse(text, relative_root)
}

/// Descriptor parser with an injected filesystem probe.
pub struct DescriptorParser<'a> {
    fs: &'a dyn FileSystem,
    separator: String,
    free_date: bool,
}

impl<'a> DescriptorParser<'a> {
    /// Create a parser using `:` as separator and strict RFC3339 dates.
    pub fn new(fs: &'a dyn FileSystem) -> Self {
        Self {
            fs,
            separator: ":".to_string(),
            free_date: false,
        }
    }

    /// Separator between key and value.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Also accept ISO8601, RFC2822, and other common date layouts.
    pub fn with_free_date(mut self, free_date: bool) -> Self {
        self.free_date = free_date;
        self
    }

    /// Parse `text` into a [`Book`].
    pub fn parse(&self, text: &str, relative_root: &str) -> Result<Book> {
        let mut fields = Fields::new();

        for (idx, line) in text.lines().enumerate() {
            let Some((key, value)) = line.split_once(self.separator.as_str()) else {
                continue;
            };
            self.directive(&mut fields, idx, key.trim(), value.trim(), relative_root)?;
        }

        fields.into_book()
    }

    /// Apply one directive. `idx` is the line index, used to name
    /// generated pages.
    fn directive(
        &self,
        fields: &mut Fields,
        idx: usize,
        key: &str,
        value: &str,
        relative_root: &str,
    ) -> Result<()> {
        let resolved = || join_posix(relative_root, value);

        match key {
            "Name" => fields.name.set(value.to_string())?,
            "Author" => fields.author.set(value.to_string())?,
            "Date" => fields
                .date
                .set_with(|| date::parse_date(value, self.free_date))?,
            "Language" => fields.language.set_with(|| {
                LanguageTag::parse(value).map_err(|e| {
                    Error::descriptor(format!(
                        "Language value \"{value}\" not valid BCP47: {} at position {}",
                        e.reason, e.offset
                    ))
                })
            })?,

            "Content" => {
                let path = self.existing(key, resolved())?;
                fields.contents.push(Content::local(value, path));
            }
            "String-Content" => {
                fields
                    .contents
                    .push(Content::page(&format!("string-content-{idx}"), value));
            }
            "Network-Image-Content" => {
                let image = Content::remote(parse_url(key, value)?);
                fields.contents.push(Content::page(
                    &format!("network-image-content-{idx}"),
                    &util::image_content_string(&image.packed_path),
                ));
                fields.additives.push(image);
            }

            "Cover" => {
                let mut image = None;
                fields.cover.set_with(|| {
                    let local = Content::local(value, self.existing(key, resolved())?);
                    let page = Content::page(
                        "cover-content",
                        &util::image_content_string(&local.packed_path),
                    );
                    image = Some(local);
                    Ok(page)
                })?;
                fields.additives.extend(image);
            }
            "Network-Cover" => {
                let mut image = None;
                fields.cover.set_with(|| {
                    let remote = Content::remote(parse_url(key, value)?);
                    let page = Content::page(
                        "network-cover-content",
                        &util::image_content_string(&remote.packed_path),
                    );
                    image = Some(remote);
                    Ok(page)
                })?;
                fields.additives.extend(image);
            }

            "Include" => {
                let path = self.existing(key, resolved())?;
                fields.additives.push(Content::local(value, path));
            }
            "Network-Include" => {
                fields.additives.push(Content::remote(parse_url(key, value)?));
            }

            "Description" => fields.description.set_with(|| {
                let path = self.existing(key, resolved())?;
                Ok(UnnamedContent::new(ContentData::Local(path)))
            })?,
            "String-Description" => fields
                .description
                .set(UnnamedContent::new(ContentData::Inline(value.to_string())))?,
            "Network-Description" => fields.description.set_with(|| {
                Ok(UnnamedContent::new(ContentData::Remote(parse_url(key, value)?)))
            })?,

            _ => {
                debug!("Ignoring unrecognized key {key:?} on line {}", idx + 1);
                return Ok(());
            }
        }

        debug!("Line {}: {key} = {value:?}", idx + 1);
        Ok(())
    }

    /// Ensure a local path referenced by `key` exists, returning it.
    fn existing(&self, key: &str, path: String) -> Result<String> {
        if self.fs.exists(&path) {
            Ok(path)
        } else {
            Err(Error::descriptor(format!("{key} path \"{path}\" nonexistent")))
        }
    }
}

fn parse_url(key: &str, value: &str) -> Result<Url> {
    Url::parse(value)
        .map_err(|e| Error::descriptor(format!("{key} URL \"{value}\" invalid: {e}")))
}

/// Accumulated state of one parse.
struct Fields {
    name: SetOnce<String>,
    author: SetOnce<String>,
    date: SetOnce<DateTime<FixedOffset>>,
    language: SetOnce<LanguageTag>,
    cover: SetOnce<Content>,
    description: SetOnce<UnnamedContent>,
    contents: Vec<Content>,
    additives: Vec<Content>,
}

impl Fields {
    fn new() -> Self {
        Self {
            name: SetOnce::new("Name"),
            author: SetOnce::new("Author"),
            date: SetOnce::new("Date"),
            language: SetOnce::new("Language"),
            cover: SetOnce::new(COVER_GROUP),
            description: SetOnce::new(DESCRIPTION_GROUP),
            contents: Vec::new(),
            additives: Vec::new(),
        }
    }

    fn into_book(self) -> Result<Book> {
        let name = self.name.required()?;
        let author = self.author.required()?;
        let date = self.date.required()?;
        let language = self.language.required()?;

        Ok(Book {
            uuid: Uuid::new_v4(),
            name,
            author,
            date,
            language,
            cover: self.cover.into_inner(),
            description: self.description.into_inner(),
            contents: self.contents,
            additives: self.additives,
        })
    }
}
