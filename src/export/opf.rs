//! `content.opf` package document.

use std::collections::HashSet;
use std::fmt::Write;

use log::warn;

use crate::error::Result;
use crate::io::Resolver;
use crate::model::Book;
use crate::util::{escape_xml, guess_media_type};

const OPF_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0" unique-identifier="uuid">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:opf="http://www.idpf.org/2007/opf">
"#;

/// Generate content.opf for `book`.
///
/// The description, if any, is resolved through `resolver` and inlined as
/// text. Manifest items are listed once per packed path, cover first, then
/// contents, then additives; the spine lists only `contents`. Contents
/// packing to a reserved archive name are left out of both.
pub fn build_manifest(book: &Book, resolver: &Resolver<'_>) -> Result<String> {
    let description = match book.description {
        Some(ref description) => Some(resolver.resolve_text(&description.data)?),
        None => None,
    };

    let mut opf = String::from(OPF_HEADER);

    // Dublin Core metadata
    let _ = writeln!(opf, "    <dc:title>{}</dc:title>", escape_xml(&book.name));
    let _ = writeln!(
        opf,
        "    <dc:creator opf:role=\"aut\">{}</dc:creator>",
        escape_xml(&book.author)
    );
    let _ = writeln!(
        opf,
        "    <dc:identifier id=\"uuid\" opf:scheme=\"uuid\">{}</dc:identifier>",
        book.uuid
    );
    let _ = writeln!(opf, "    <dc:date>{}</dc:date>", book.date_string());
    let _ = writeln!(
        opf,
        "    <dc:language>{}</dc:language>",
        escape_xml(&book.language.to_string())
    );

    if let Some(ref cover) = book.cover {
        let _ = writeln!(opf, "    <meta name=\"cover\" content=\"{}\"/>", escape_xml(&cover.id));
    }

    if let Some(description) = description {
        let _ = writeln!(
            opf,
            "    <dc:description>\n{}\n    </dc:description>",
            escape_xml(description.trim())
        );
    }

    opf.push_str("  </metadata>\n  <manifest>\n");
    opf.push_str(
        "    <item href=\"toc.ncx\" id=\"toc\" media-type=\"application/x-dtbncx+xml\"/>\n",
    );
    let mut ids: HashSet<&str> = HashSet::from(["toc"]);
    for item in book.packed_items() {
        if !ids.insert(item.id.as_str()) {
            warn!(
                "Manifest id {} of {} is already in use; readers may resolve it to another item",
                item.id, item.packed_path
            );
        }
        let _ = writeln!(
            opf,
            "    <item href=\"{}\" id=\"{}\" media-type=\"{}\"/>",
            escape_xml(&item.packed_path),
            escape_xml(&item.id),
            guess_media_type(&item.packed_path)
        );
    }
    opf.push_str("  </manifest>\n");

    opf.push_str("  <spine toc=\"toc\">\n");
    for content in book.contents.iter().filter(|c| !c.is_reserved()) {
        let _ = writeln!(opf, "    <itemref idref=\"{}\"/>", escape_xml(&content.id));
    }
    opf.push_str("  </spine>\n");

    opf.push_str("  <guide>\n");
    if let Some(ref cover) = book.cover {
        let _ = writeln!(
            opf,
            "    <reference href=\"{}\" title=\"{}\" type=\"cover\"/>",
            escape_xml(&cover.packed_path),
            escape_xml(&cover.id)
        );
    }
    opf.push_str("    <reference href=\"toc.ncx\" title=\"Table of Contents\" type=\"toc\"/>\n");
    opf.push_str("  </guide>\n</package>\n");

    Ok(opf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::DescriptorParser;
    use crate::error::Error;
    use crate::io::{Fetcher, MemoryFs};
    use url::Url;

    struct NoNetwork;

    impl Fetcher for NoNetwork {
        fn fetch(&self, url: &Url) -> Result<Vec<u8>> {
            Err(Error::Fetch {
                url: url.to_string(),
                reason: "offline".to_string(),
            })
        }
    }

    fn fs() -> MemoryFs {
        MemoryFs::new()
            .with_file("root/ctnt.html", "<p/>")
            .with_file("root/cover.png", vec![0u8; 4])
            .with_file("root/desc.txt", "A <b>bold</b> book")
            .with_file("root/a.b.html", "<p/>")
            .with_file("root/a_b.html", "<p/>")
            .with_file("root/toc.ncx", "<ncx/>")
    }

    fn manifest(descriptor: &str) -> Result<String> {
        let fs = fs();
        let book = DescriptorParser::new(&fs).parse(descriptor, "root")?;
        build_manifest(&book, &Resolver::new(&fs, &NoNetwork))
    }

    const HEADER: &str = "Name: Tom & Jerry\nAuthor: A\nDate: 2017-02-08T15:30:18+01:00\nLanguage: en-GB\n";

    #[test]
    fn test_metadata() {
        let opf = manifest(HEADER).unwrap();
        assert!(opf.contains("<dc:title>Tom &amp; Jerry</dc:title>"));
        assert!(opf.contains("<dc:creator opf:role=\"aut\">A</dc:creator>"));
        assert!(opf.contains("<dc:date>2017-02-08T15:30:18+01:00</dc:date>"));
        assert!(opf.contains("<dc:language>en-GB</dc:language>"));
        assert!(!opf.contains("name=\"cover\""));
        assert!(!opf.contains("dc:description"));
    }

    #[test]
    fn test_cover_meta_and_guide() {
        let opf = manifest(&format!("{HEADER}Cover: cover.png")).unwrap();
        assert!(opf.contains("<meta name=\"cover\" content=\"cover-content_html\"/>"));
        assert!(opf.contains(
            "<reference href=\"cover-content.html\" title=\"cover-content_html\" type=\"cover\"/>"
        ));
        assert!(opf.contains(
            "<item href=\"cover.png\" id=\"cover_png\" media-type=\"image/png\"/>"
        ));
    }

    #[test]
    fn test_description_is_resolved() {
        let opf = manifest(&format!("{HEADER}Description: desc.txt")).unwrap();
        assert!(opf.contains("A &lt;b&gt;bold&lt;/b&gt; book"));
    }

    #[test]
    fn test_description_fetch_failure_propagates() {
        let err = manifest(&format!("{HEADER}Network-Description: https://example.com/d.txt"))
            .unwrap_err();
        assert!(matches!(err, Error::Fetch { .. }));
    }

    #[test]
    fn test_spine_lists_only_contents() {
        let opf = manifest(&format!(
            "{HEADER}Content: ctnt.html\nInclude: cover.png\nString-Content: hi"
        ))
        .unwrap();
        let spine = &opf[opf.find("<spine").unwrap()..opf.find("</spine>").unwrap()];
        assert!(spine.contains("<itemref idref=\"ctnt_html\"/>"));
        assert!(spine.contains("<itemref idref=\"string-content-6_html\"/>"));
        assert!(!spine.contains("cover_png"));
        assert!(spine.find("ctnt_html") < spine.find("string-content-6_html"));
    }

    #[test]
    fn test_items_deduplicated_by_packed_path() {
        let opf = manifest(&format!(
            "{HEADER}Cover: cover.png\nInclude: cover.png\nContent: ctnt.html\nContent: ./ctnt.html"
        ))
        .unwrap();
        assert_eq!(opf.matches("href=\"cover.png\"").count(), 1);
        assert_eq!(opf.matches("<item href=\"ctnt.html\"").count(), 1);
        assert_eq!(opf.matches("<itemref idref=\"ctnt_html\"/>").count(), 2);
    }

    #[test]
    fn test_colliding_ids_keep_both_items() {
        let opf = manifest(&format!("{HEADER}Content: a.b.html\nContent: a_b.html")).unwrap();
        assert!(opf.contains("<item href=\"a.b.html\" id=\"a_b_html\""));
        assert!(opf.contains("<item href=\"a_b.html\" id=\"a_b_html\""));
    }

    #[test]
    fn test_reserved_content_left_out_of_spine() {
        let opf = manifest(&format!("{HEADER}Content: toc.ncx\nContent: ctnt.html")).unwrap();
        assert!(!opf.contains("toc_ncx"));
        assert!(opf.contains("<itemref idref=\"ctnt_html\"/>"));
    }

    #[test]
    fn test_reserved_name_not_listed_twice() {
        let opf = manifest(&format!("{HEADER}Include: toc.ncx")).unwrap();
        assert_eq!(opf.matches("<item href=\"toc.ncx\"").count(), 1);
        assert!(!opf.contains("toc_ncx"));
    }
}
