//! Path normalization, identifiers, and small text helpers shared by the
//! descriptor parser and the packer.

use std::borrow::Cow;
use std::path::Path;

use url::Url;

/// `chrono` format string used to re-serialize dates as RFC3339.
pub const RFC3339_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

const STRING_CONTENT_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml">
  <head></head>
  <body>
"#;

const STRING_CONTENT_FOOTER: &str = r#"
  </body>
</html>
"#;

/// Flatten a relative file path into a single-level archive filename.
///
/// Backslashes count as separators, every `.` and `..` segment is dropped
/// wherever it occurs, and the remaining separators become `-`.
///
/// # Examples
///
/// ```
/// use gen_epub_book::util::packed_path;
///
/// assert_eq!(packed_path("simple/ctnt.html"), "simple-ctnt.html");
/// assert_eq!(packed_path("../cover.png"), "cover.png");
/// assert_eq!(packed_path("../"), "");
/// ```
pub fn packed_path(path: &str) -> String {
    path.replace('\\', "/")
        .split('/')
        .filter(|segment| *segment != "." && *segment != "..")
        .collect::<Vec<_>>()
        .join("-")
}

/// Manifest identifier for a relative file path: its packed path with
/// every `.` turned into `_`.
pub fn content_id(path: &str) -> String {
    packed_path(path).replace('.', "_")
}

/// Packed path for a URL, taken from the last segment of its path only.
///
/// A URL whose path ends in `/` packs to the empty string.
pub fn url_packed_path(url: &Url) -> String {
    let path = url.path();
    let last = path.rsplit('/').next().unwrap_or(path);
    packed_path(last)
}

/// Manifest identifier for a URL.
pub fn url_id(url: &Url) -> String {
    url_packed_path(url).replace('.', "_")
}

/// Join `relative` onto `root` with forward slashes and normalize the result.
///
/// `.` segments are dropped and `..` pops the preceding segment when there
/// is one to pop. The empty path normalizes to `.`.
pub fn join_posix(root: &str, relative: &str) -> String {
    let joined = match (root.is_empty(), relative.is_empty()) {
        (true, _) => relative.to_string(),
        (false, true) => root.to_string(),
        (false, false) => format!("{root}/{relative}"),
    };
    let absolute = joined.starts_with('/');

    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if absolute => {}
                _ => segments.push(".."),
            },
            _ => segments.push(segment),
        }
    }

    let body = segments.join("/");
    match (absolute, body.is_empty()) {
        (true, _) => format!("/{body}"),
        (false, true) => ".".to_string(),
        (false, false) => body,
    }
}

/// Wrap `body` in the fixed XHTML page used for generated content.
pub fn string_content(body: &str) -> String {
    let mut page =
        String::with_capacity(STRING_CONTENT_HEADER.len() + body.len() + STRING_CONTENT_FOOTER.len());
    page.push_str(STRING_CONTENT_HEADER);
    page.push_str(body);
    page.push_str(STRING_CONTENT_FOOTER);
    page
}

/// Image tag referencing a packed path, used for covers and image pages.
pub fn image_content_string(packed_path: &str) -> String {
    let path = escape_xml(packed_path);
    format!("<img src=\"{path}\" alt=\"{path}\"></img>")
}

/// Escape XML special characters.
pub fn escape_xml(s: &str) -> Cow<'_, str> {
    quick_xml::escape::escape(s)
}

/// Guess media type from file extension.
///
/// HTML is always declared as XHTML; anything unknown is `text/plain`.
pub fn guess_media_type(path: &str) -> &'static str {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "xhtml" | "html" | "htm" => "application/xhtml+xml",
        "css" => "text/css",
        "js" => "application/javascript",
        "json" => "application/json",
        "xml" => "application/xml",
        "txt" => "text/plain",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "mp3" => "audio/mpeg",
        "mp4" => "video/mp4",
        "ncx" => "application/x-dtbncx+xml",
        "opf" => "application/oebps-package+xml",
        _ => "text/plain",
    }
}

/// Decode bytes to a string, handling legacy encodings.
///
/// Tries UTF-8 first (a BOM is handled by `encoding_rs`), then falls back
/// to Windows-1252, which is common in hand-written HTML.
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);
    if !malformed {
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_packed_path_slashes() {
        assert_eq!(packed_path("simple/chapter_image.png"), "simple-chapter_image.png");
        assert_eq!(packed_path("simple\\ctnt.html"), "simple-ctnt.html");
    }

    #[test]
    fn test_packed_path_strips_traversal() {
        assert_eq!(packed_path("../cover.png"), "cover.png");
        assert_eq!(packed_path("relative/path/../green_ass_dog.html"), "relative-path-green_ass_dog.html");
        assert_eq!(
            packed_path(
                "./../relative_path_fuckery\\relative/../relative/path\\../../relative/path/dead_santa.html"
            ),
            "relative_path_fuckery-relative-relative-path-relative-path-dead_santa.html"
        );
        assert_eq!(packed_path("../cover"), "cover");
        assert_eq!(packed_path("../../"), "");
    }

    #[test]
    fn test_content_id() {
        assert_eq!(content_id("simple/ctnt.html"), "simple-ctnt_html");
        assert_eq!(content_id("simple/chapter_image.png"), "simple-chapter_image_png");
        assert_eq!(content_id("../cover"), "cover");
    }

    #[test]
    fn test_url_packed_path_and_id() {
        let cases = [
            ("http://i.imgur.com/ViQ2WED.jpg", "ViQ2WED.jpg", "ViQ2WED_jpg"),
            (
                "https://cdn.rawgit.com/nabijaczleweli/nabijaczleweli.github.io/dev/src/writing_prompts/slim_shady.png",
                "slim_shady.png",
                "slim_shady_png",
            ),
            (
                "https://img09.deviantart.net/e6c8/i/2015/138/8/0/the_pursuer_by_artsed-d7lbiua.jpg",
                "the_pursuer_by_artsed-d7lbiua.jpg",
                "the_pursuer_by_artsed-d7lbiua_jpg",
            ),
            ("https://i.imgur.com/", "", ""),
            ("https://i.imgur.com/.png", ".png", "_png"),
        ];

        for (raw, path, id) in cases {
            let url = Url::parse(raw).unwrap();
            assert_eq!(url_packed_path(&url), path, "{raw}");
            assert_eq!(url_id(&url), id, "{raw}");
        }
    }

    #[test]
    fn test_join_posix() {
        assert_eq!(join_posix("books", "simple/ctnt.html"), "books/simple/ctnt.html");
        assert_eq!(join_posix("books/a", "../cover.png"), "books/cover.png");
        assert_eq!(join_posix(".", "ctnt.html"), "ctnt.html");
        assert_eq!(join_posix("", "./ctnt.html"), "ctnt.html");
        assert_eq!(join_posix("..", "../x"), "../../x");
        assert_eq!(join_posix("/srv", "../../x"), "/x");
        assert_eq!(join_posix("a", ".."), ".");
    }

    #[test]
    fn test_string_content_contains_body() {
        let page = string_content("<strong>SEIZE THE MEANS OF PRODUCTION!</strong>");
        assert!(page.contains("<strong>SEIZE THE MEANS OF PRODUCTION!</strong>"));
        assert!(page.starts_with("<?xml"));
        assert!(page.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_image_content_string() {
        assert_eq!(
            image_content_string("henlo.png"),
            "<img src=\"henlo.png\" alt=\"henlo.png\"></img>"
        );
    }

    #[test]
    fn test_guess_media_type() {
        assert_eq!(guess_media_type("slim_shady.png"), "image/png");
        assert_eq!(guess_media_type("index.js"), "application/javascript");
        assert_eq!(guess_media_type("ctnt.html"), "application/xhtml+xml");
        assert_eq!(guess_media_type("IMAGE.JPG"), "image/jpeg");
        assert_eq!(guess_media_type(".htaccess"), "text/plain");
        assert_eq!(guess_media_type("henlo.you-stinky-birb"), "text/plain");
    }

    #[test]
    fn test_decode_text_falls_back_to_cp1252() {
        assert_eq!(decode_text("Hello, World!".as_bytes()), "Hello, World!");
        // 0xE9 is 'é' in Windows-1252 and invalid on its own in UTF-8
        assert_eq!(decode_text(b"caf\xE9"), "café");
    }

    proptest! {
        #[test]
        fn prop_packed_path_is_flat(path in "[a-z./\\\\]{0,32}") {
            let packed = packed_path(&path);
            prop_assert!(!packed.contains('/'));
            prop_assert!(!packed.contains('\\'));
            prop_assert_eq!(packed_path(&path), packed);
        }

        #[test]
        fn prop_content_id_has_no_dots(path in "[a-z_./]{0,32}") {
            let id = content_id(&path);
            prop_assert!(!id.contains('.'));
            prop_assert_eq!(content_id(&path), id);
        }
    }
}
