use std::collections::HashSet;

use chrono::{DateTime, FixedOffset};
use log::warn;
use uuid::Uuid;

use super::{Content, UnnamedContent};
use crate::descriptor::LanguageTag;
use crate::util;

/// Archive entries written by the packer itself; user content never
/// shadows them.
pub const RESERVED_ENTRIES: [&str; 3] = ["mimetype", "content.opf", "toc.ncx"];

/// A fully parsed descriptor.
///
/// Built once per parse and never mutated afterwards; the packer only
/// borrows it.
#[derive(Debug, Clone)]
pub struct Book {
    /// Fresh for every parse; becomes the package's unique identifier.
    pub uuid: Uuid,
    pub name: String,
    pub author: String,
    pub date: DateTime<FixedOffset>,
    pub language: LanguageTag,
    /// Generated cover page wrapping the cover image.
    pub cover: Option<Content>,
    pub description: Option<UnnamedContent>,
    /// Reading order (spine), in descriptor order.
    pub contents: Vec<Content>,
    /// Manifest-only material: cover images, includes, fetched images.
    pub additives: Vec<Content>,
}

impl Book {
    /// Every content that becomes its own archive entry, in priority order
    /// (cover, then contents, then additives), keeping only the first
    /// content for each packed path. Contents packing to one of
    /// [`RESERVED_ENTRIES`] are dropped.
    pub fn packed_items(&self) -> Vec<&Content> {
        let mut seen: HashSet<&str> = RESERVED_ENTRIES.into_iter().collect();
        self.cover
            .iter()
            .chain(&self.contents)
            .chain(&self.additives)
            .filter(|content| {
                let fresh = seen.insert(content.packed_path.as_str());
                if !fresh && content.is_reserved() {
                    warn!("Skipping {}: name is reserved by the archive", content.packed_path);
                }
                fresh
            })
            .collect()
    }

    /// The publication date as RFC3339.
    pub fn date_string(&self) -> String {
        self.date.format(util::RFC3339_FORMAT).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ContentData;

    fn book_with(cover: Option<Content>, contents: Vec<Content>, additives: Vec<Content>) -> Book {
        Book {
            uuid: Uuid::new_v4(),
            name: "Name".to_string(),
            author: "Author".to_string(),
            date: DateTime::parse_from_rfc3339("2017-02-08T15:30:18+01:00").unwrap(),
            language: LanguageTag::parse("en-GB").unwrap(),
            cover,
            description: None,
            contents,
            additives,
        }
    }

    #[test]
    fn test_packed_items_priority_and_dedup() {
        let cover = Content {
            id: "cover-content_html".to_string(),
            packed_path: "cover-content.html".to_string(),
            data: ContentData::Inline("cover".to_string()),
        };
        let chapter = Content::local("ctnt.html", "root/ctnt.html");
        let clash = Content::local("sub/../cover-content.html", "root/cover-content.html");
        let image = Content::local("cover.png", "root/cover.png");
        let image_again = Content::local("./cover.png", "root/cover.png");

        let book = book_with(Some(cover), vec![chapter, clash], vec![image, image_again]);
        let paths: Vec<_> = book.packed_items().iter().map(|c| c.packed_path.as_str()).collect();

        // "sub/../cover-content.html" packs to "sub-cover-content.html", no clash
        assert_eq!(
            paths,
            vec!["cover-content.html", "ctnt.html", "sub-cover-content.html", "cover.png"]
        );
    }

    #[test]
    fn test_packed_items_first_occurrence_wins() {
        let chapter = Content::local("images/cover.png", "root/images/cover.png");
        let additive = Content::local("../images/cover.png", "images/cover.png");

        let book = book_with(None, vec![chapter], vec![additive]);
        let items = book.packed_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].data, ContentData::Local("root/images/cover.png".to_string()));
    }

    #[test]
    fn test_packed_items_skip_reserved_names() {
        let ncx = Content::local("toc.ncx", "root/toc.ncx");
        let opf = Content::local("./content.opf", "root/content.opf");
        let chapter = Content::local("ctnt.html", "root/ctnt.html");
        let mimetype = Content::local("../mimetype", "mimetype");

        let book = book_with(None, vec![opf, chapter], vec![ncx, mimetype]);
        let paths: Vec<_> = book.packed_items().iter().map(|c| c.packed_path.as_str()).collect();
        assert_eq!(paths, vec!["ctnt.html"]);
    }

    #[test]
    fn test_date_string_keeps_offset() {
        let book = book_with(None, Vec::new(), Vec::new());
        assert_eq!(book.date_string(), "2017-02-08T15:30:18+01:00");
    }
}
