//! Image source rewriting for previews displayed from the local filesystem.
//!
//! The page stage leaves image sources relative to the repository root. A
//! preview loaded from a `file://` page needs them absolute, so the
//! presentation layer rewrites them against the root's URL.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// Characters escaped in each path segment of a `file://` URL.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

static IMG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<img\s+([^>]*?)src="([^"]+)"([^>]*)>"#).unwrap());

/// `file://` URL of an absolute filesystem path.
///
/// # Example
///
/// ```
/// use preview_core::image_sources::file_url;
/// use std::path::Path;
///
/// assert_eq!(file_url(Path::new("/home/me/my book")), "file:///home/me/my%20book");
/// ```
pub fn file_url(path: &Path) -> String {
    let path = path.to_string_lossy().replace('\\', "/");
    let encoded = path
        .split('/')
        .map(|segment| utf8_percent_encode(segment, PATH_SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/");
    normalize_drive_letter(&format!("file://{encoded}"))
}

/// Normalizes a `file://` URL whose path starts with a drive letter.
///
/// `file://C:\book\img.png` and `file://C:/book/img.png` both become
/// `file:///C:/book/img.png`; any other URL is returned unchanged.
pub fn normalize_drive_letter(url: &str) -> String {
    let Some(rest) = url.strip_prefix("file://") else {
        return url.to_string();
    };
    let bytes = rest.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        format!("file:///{}", rest.replace('\\', "/"))
    } else {
        url.to_string()
    }
}

fn is_absolute_source(src: &str) -> bool {
    src.starts_with('/')
        || src.starts_with("data:")
        || src
            .find(':')
            .map(|colon| !src[..colon].contains(['/', '?', '#']))
            .unwrap_or(false)
}

/// Rewrites relative `<img src>` in `html` to absolute URLs under `base_url`.
///
/// `base_url` is the URL of the directory sources are relative to; a missing
/// trailing `/` is added.
pub fn rewrite_image_sources(html: &str, base_url: &str) -> String {
    let base_url = if base_url.ends_with('/') {
        base_url.to_string()
    } else {
        format!("{base_url}/")
    };

    IMG_REGEX
        .replace_all(html, |caps: &regex::Captures| {
            let before = &caps[1];
            let src = &caps[2];
            let after = &caps[3];

            if is_absolute_source(src) {
                return caps[0].to_string();
            }

            let resolved = normalize_drive_letter(&format!("{base_url}{src}"));
            format!(r#"<img {before}src="{resolved}"{after}>"#)
        })
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrite_relative_paths() {
        let html = r#"<p><img src="guide/img/a.png" alt="a" /></p>"#;
        assert_eq!(
            rewrite_image_sources(html, "file:///home/me/book"),
            r#"<p><img src="file:///home/me/book/guide/img/a.png" alt="a" /></p>"#
        );
    }

    #[test]
    fn test_preserve_absolute_sources() {
        for html in [
            r#"<img src="https://example.com/image.png">"#,
            r#"<img src="data:image/png;base64,abc123">"#,
            r#"<img src="/absolute/path/image.png">"#,
            r#"<img src="//cdn.example.com/image.png">"#,
            r#"<img src="file:///tmp/x.png">"#,
        ] {
            assert_eq!(rewrite_image_sources(html, "file:///book/"), html);
        }
    }

    #[test]
    fn test_drive_letter_base() {
        let html = r#"<img src="img/a.png">"#;
        assert_eq!(
            rewrite_image_sources(html, r"file://C:\book"),
            r#"<img src="file:///C:/book/img/a.png">"#
        );
    }

    #[test]
    fn test_normalize_drive_letter() {
        assert_eq!(
            normalize_drive_letter(r"file://C:\book\img.png"),
            "file:///C:/book/img.png"
        );
        assert_eq!(
            normalize_drive_letter("file://d:/book/img.png"),
            "file:///d:/book/img.png"
        );
        assert_eq!(
            normalize_drive_letter("file:///home/book/img.png"),
            "file:///home/book/img.png"
        );
        assert_eq!(
            normalize_drive_letter("https://example.com"),
            "https://example.com"
        );
    }

    #[test]
    fn test_file_url() {
        assert_eq!(file_url(Path::new("/book")), "file:///book");
        assert_eq!(file_url(Path::new("/a#b")), "file:///a%23b");
    }
}
