//! `toc.ncx` navigation map.

use std::fmt::Write;

use log::warn;
use rayon::prelude::*;

use crate::error::Result;
use crate::io::FileSystem;
use crate::model::{Book, Content, ContentData};
use crate::patterns::chapter_title;
use crate::util::{decode_text, escape_xml};

/// Generate toc.ncx for `book`.
///
/// Only local contents declaring a chapter title get a navPoint. Each
/// navPoint's `playOrder` is its 1-based position in `contents`, so
/// skipped entries leave gaps.
pub fn build_nav(book: &Book, fs: &dyn FileSystem) -> Result<String> {
    let nav_points = book
        .contents
        .par_iter()
        .enumerate()
        .map(|(i, content)| nav_point(content, i + 1, fs))
        .collect::<Result<Vec<_>>>()?;

    let mut ncx = String::new();
    ncx.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(
        ncx,
        "<ncx xmlns=\"http://www.daisy.org/z3986/2005/ncx/\" version=\"2005-1\" xml:lang=\"{}\">",
        escape_xml(&book.language.to_string())
    );
    ncx.push_str("  <head>\n");
    let _ = writeln!(ncx, "    <meta content=\"{}\" name=\"dtb:uid\"/>", book.uuid);
    ncx.push_str("    <meta content=\"2\" name=\"dtb:depth\"/>\n");
    ncx.push_str("  </head>\n  <docTitle>\n");
    let _ = writeln!(ncx, "    <text>{}</text>", escape_xml(&book.name));
    ncx.push_str("  </docTitle>\n  <navMap>\n");
    for nav_point in nav_points.into_iter().flatten() {
        ncx.push_str(&nav_point);
    }
    ncx.push_str("  </navMap>\n</ncx>\n");

    Ok(ncx)
}

fn nav_point(content: &Content, play_order: usize, fs: &dyn FileSystem) -> Result<Option<String>> {
    let ContentData::Local(ref path) = content.data else {
        return Ok(None);
    };
    if content.is_reserved() {
        return Ok(None);
    }

    let data = fs.read(path)?;
    let text = decode_text(&data);
    let Some(title) = chapter_title(&text) else {
        warn!("{path} has no chapter title, leaving it out of the navigation map");
        return Ok(None);
    };

    let mut point = String::new();
    let _ = writeln!(
        point,
        "    <navPoint id=\"{}\" playOrder=\"{play_order}\">",
        escape_xml(&content.id)
    );
    let _ = writeln!(
        point,
        "      <navLabel>\n        <text>{}</text>\n      </navLabel>",
        escape_xml(title)
    );
    let _ = writeln!(point, "      <content src=\"{}\"/>", escape_xml(&content.packed_path));
    point.push_str("    </navPoint>\n");
    Ok(Some(point))
}
