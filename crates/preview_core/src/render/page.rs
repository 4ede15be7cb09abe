//! Page stage: lexed sections to ordered HTML fragments.

use super::lex::Lexed;
use super::output::Section;
use crate::error::PageError;
use pulldown_cmark::{CowStr, Event, Tag};

/// Context used to resolve relative targets inside the fragments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOptions {
    /// Repository prefix, empty for the repository root.
    pub repo: String,
    /// Directory of the document, `/` for the root.
    pub dir: String,
    /// Directory the rendered page is written to.
    pub outdir: String,
}

impl PageOptions {
    /// Options for a document located in `dir`.
    pub fn for_dir(dir: &str) -> Self {
        let dir = if dir.is_empty() { "/" } else { dir };
        Self {
            repo: String::new(),
            dir: dir.to_string(),
            outdir: dir.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TargetKind {
    Link,
    Image,
}

/// `true` for targets that are left untouched: anchors, absolute paths and
/// anything carrying a scheme (`https:`, `mailto:`, `data:`).
fn is_non_relative(target: &str) -> bool {
    if target.is_empty() || target.starts_with('#') || target.starts_with('/') {
        return true;
    }
    match target.find(':') {
        Some(colon) => !target[..colon].contains(['/', '?', '#']),
        None => false,
    }
}

/// Resolves a relative `target` against `dir`, producing a root-relative path.
///
/// Links to markdown documents point at their rendered `.html` page.
fn resolve_target(dir: &str, target: &str, kind: TargetKind) -> Result<String, PageError> {
    if is_non_relative(target) {
        return Ok(target.to_string());
    }

    let split_at = target.find(['?', '#']).unwrap_or(target.len());
    let (path, suffix) = target.split_at(split_at);

    let mut components: Vec<&str> = dir
        .split('/')
        .filter(|c| !c.is_empty() && *c != ".")
        .collect();
    for component in path.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                if components.pop().is_none() {
                    return Err(PageError::EscapesRoot {
                        target: target.to_string(),
                    });
                }
            }
            c => components.push(c),
        }
    }

    let mut resolved = components.join("/");
    if kind == TargetKind::Link {
        let lower = resolved.to_ascii_lowercase();
        if let Some(stem_len) = lower
            .strip_suffix(".md")
            .or_else(|| lower.strip_suffix(".markdown"))
            .map(str::len)
        {
            resolved.truncate(stem_len);
            resolved.push_str(".html");
        }
    }
    resolved.push_str(suffix);

    Ok(resolved)
}

fn resolve_event<'a>(event: Event<'a>, dir: &str) -> Result<Event<'a>, PageError> {
    let event = match event {
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: CowStr::from(resolve_target(dir, &dest_url, TargetKind::Link)?),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: CowStr::from(resolve_target(dir, &dest_url, TargetKind::Image)?),
            title,
            id,
        }),
        event => event,
    };
    Ok(event)
}

/// Renders every lexed section in order.
pub fn page(lexed: Lexed<'_>, options: &PageOptions) -> Result<Vec<Section>, PageError> {
    lexed
        .sections
        .into_iter()
        .map(|section| {
            let events = section
                .events
                .into_iter()
                .map(|event| resolve_event(event, &options.dir))
                .collect::<Result<Vec<_>, _>>()?;

            let mut content = String::new();
            pulldown_cmark::html::push_html(&mut content, events.into_iter());

            Ok(match section.code {
                Some(code) => Section::Exercise { content, code },
                None => Section::Normal { content },
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_options_for_dir() {
        assert_eq!(PageOptions::for_dir("").dir, "/");
        let options = PageOptions::for_dir("guide");
        assert_eq!(options.repo, "");
        assert_eq!(options.outdir, "guide");
    }

    #[test]
    fn test_non_relative_targets() {
        for target in [
            "https://example.com/a.md",
            "mailto:me@example.com",
            "data:image/png;base64,abc",
            "#section",
            "/absolute/img.png",
            "//cdn.example.com/x.png",
        ] {
            assert_eq!(
                resolve_target("guide", target, TargetKind::Link).unwrap(),
                target
            );
        }
    }

    #[test]
    fn test_resolve_relative_targets() {
        assert_eq!(
            resolve_target("/", "img/a.png", TargetKind::Image).unwrap(),
            "img/a.png"
        );
        assert_eq!(
            resolve_target("guide/part", "../img/a.png", TargetKind::Image).unwrap(),
            "guide/img/a.png"
        );
        assert_eq!(
            resolve_target("guide", "./next.md#usage", TargetKind::Link).unwrap(),
            "guide/next.html#usage"
        );
        // Images keep their extension whatever it is.
        assert_eq!(
            resolve_target("guide", "diagram.md", TargetKind::Image).unwrap(),
            "guide/diagram.md"
        );
    }

    #[test]
    fn test_escaping_root_fails() {
        assert_eq!(
            resolve_target("guide", "../../secret.png", TargetKind::Image).unwrap_err(),
            PageError::EscapesRoot {
                target: "../../secret.png".into()
            }
        );
        assert!(resolve_target("/", "../a.md", TargetKind::Link).is_err());
    }
}
