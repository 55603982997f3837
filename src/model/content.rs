//! Packaged content and where its bytes come from.

use url::Url;

use super::RESERVED_ENTRIES;
use crate::util;

/// Where a piece of content originates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OriginKind {
    Local,
    InlineString,
    Remote,
}

/// The source of a piece of content's bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentData {
    /// A file on disk, already joined onto the descriptor's relative root.
    Local(String),
    /// Text generated or given inline in the descriptor.
    Inline(String),
    /// A resource fetched over the network.
    Remote(Url),
}

impl ContentData {
    pub fn kind(&self) -> OriginKind {
        match self {
            ContentData::Local(_) => OriginKind::Local,
            ContentData::Inline(_) => OriginKind::InlineString,
            ContentData::Remote(_) => OriginKind::Remote,
        }
    }
}

/// A unit of material placed in the archive under its own manifest item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    /// Manifest identifier, derived from the packed path.
    pub id: String,
    /// Flattened in-archive filename.
    pub packed_path: String,
    pub data: ContentData,
}

impl Content {
    /// Content backed by a local file.
    ///
    /// `relative` is the path as written in the descriptor and decides the
    /// id and packed path; `resolved` is where the file actually lives.
    pub fn local(relative: &str, resolved: impl Into<String>) -> Self {
        Self {
            id: util::content_id(relative),
            packed_path: util::packed_path(relative),
            data: ContentData::Local(resolved.into()),
        }
    }

    /// Content fetched from `url`, named after the URL's last path segment.
    pub fn remote(url: Url) -> Self {
        Self {
            id: util::url_id(&url),
            packed_path: util::url_packed_path(&url),
            data: ContentData::Remote(url),
        }
    }

    /// Generated XHTML page stored as `<name>.html`.
    pub fn page(name: &str, body: &str) -> Self {
        Self {
            id: format!("{name}_html"),
            packed_path: format!("{name}.html"),
            data: ContentData::Inline(util::string_content(body)),
        }
    }

    pub fn kind(&self) -> OriginKind {
        self.data.kind()
    }

    /// Whether this content packs onto a name the archive already uses.
    pub fn is_reserved(&self) -> bool {
        RESERVED_ENTRIES.contains(&self.packed_path.as_str())
    }
}

/// Content that is inlined into generated XML rather than packed as a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnnamedContent {
    pub data: ContentData,
}

impl UnnamedContent {
    pub fn new(data: ContentData) -> Self {
        Self { data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_content_names() {
        let content = Content::local("simple/ctnt.html", "root/simple/ctnt.html");
        assert_eq!(content.id, "simple-ctnt_html");
        assert_eq!(content.packed_path, "simple-ctnt.html");
        assert_eq!(content.data, ContentData::Local("root/simple/ctnt.html".to_string()));
        assert_eq!(content.kind(), OriginKind::Local);
    }

    #[test]
    fn test_remote_content_names() {
        let url = Url::parse("http://i.imgur.com/ViQ2WED.jpg").unwrap();
        let content = Content::remote(url);
        assert_eq!(content.id, "ViQ2WED_jpg");
        assert_eq!(content.packed_path, "ViQ2WED.jpg");
        assert_eq!(content.kind(), OriginKind::Remote);
    }

    #[test]
    fn test_page_content() {
        let content = Content::page("string-content-3", "<p>hi</p>");
        assert_eq!(content.id, "string-content-3_html");
        assert_eq!(content.packed_path, "string-content-3.html");
        match content.data {
            ContentData::Inline(ref text) => assert!(text.contains("<p>hi</p>")),
            ref other => panic!("Expected inline content, got {other:?}"),
        }
    }
}
