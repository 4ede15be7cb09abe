//! Lexing stage: raw content to an intermediate section structure.

use super::output::ExerciseCode;
use super::RenderOptions;
use crate::error::LexError;
use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag, TagEnd};

/// Content split into sections, still as markdown events.
#[derive(Debug)]
pub struct Lexed<'a> {
    pub sections: Vec<LexedSection<'a>>,
}

#[derive(Debug)]
pub struct LexedSection<'a> {
    /// Events of the prose, exercise snippets excluded.
    pub events: Vec<Event<'a>>,
    /// Set when the section is an exercise.
    pub code: Option<ExerciseCode>,
}

/// A top-level fenced code block inside a section.
struct CodeBlock {
    language: String,
    text: String,
    /// Index range of the block's events, end exclusive.
    span: std::ops::Range<usize>,
}

/// Convert byte offset to line number (1-indexed).
fn byte_offset_to_line(content: &str, byte_offset: usize) -> usize {
    content.as_bytes()[..byte_offset.min(content.len())]
        .iter()
        .filter(|b| **b == b'\n')
        .count()
        + 1
}

/// Returns `true` if the source of a fenced code block ends with a closing
/// fence at least as long as the opening one.
fn is_fence_closed(block: &str) -> bool {
    let strip = |line: &str| line.trim_start_matches([' ', '\t', '>']).trim_end().to_string();
    let mut lines = block.trim_end().lines().map(strip);

    let Some(opening) = lines.next() else {
        return false;
    };
    let Some(fence_char) = opening.chars().next().filter(|c| *c == '`' || *c == '~') else {
        return false;
    };
    let fence_len = opening.chars().take_while(|c| *c == fence_char).count();

    match lines.last() {
        Some(closing) => {
            closing.chars().count() >= fence_len && closing.chars().all(|c| c == fence_char)
        }
        None => false,
    }
}

/// Splits `content` into sections at top-level thematic breaks.
///
/// Empty sections (consecutive breaks, leading or trailing breaks) are
/// dropped. Fails on a fenced code block that is never closed.
pub fn lex<'a>(content: &'a str, options: &RenderOptions) -> Result<Lexed<'a>, LexError> {
    let parser = Parser::new_ext(content, options.to_pulldown_options());

    let mut sections = Vec::new();
    let mut current = Vec::new();
    let mut depth = 0usize;

    for (event, range) in parser.into_offset_iter() {
        match &event {
            Event::Start(tag) => {
                if matches!(tag, Tag::CodeBlock(CodeBlockKind::Fenced(_)))
                    && !is_fence_closed(&content[range.clone()])
                {
                    return Err(LexError::UnterminatedFence {
                        line: byte_offset_to_line(content, range.start),
                    });
                }
                depth += 1;
            }
            Event::End(_) => depth = depth.saturating_sub(1),
            Event::Rule if depth == 0 => {
                sections.extend(build_section(std::mem::take(&mut current)));
                continue;
            }
            _ => {}
        }
        current.push(event);
    }
    sections.extend(build_section(current));

    tracing::trace!(sections = sections.len(), "Lexed document");

    Ok(Lexed { sections })
}

fn top_level_code_blocks(events: &[Event<'_>]) -> Vec<CodeBlock> {
    let mut blocks = Vec::new();
    let mut depth = 0usize;
    let mut open: Option<CodeBlock> = None;

    for (idx, event) in events.iter().enumerate() {
        match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) if depth == 0 => {
                let language = info.split_whitespace().next().unwrap_or_default();
                open.replace(CodeBlock {
                    language: language.to_string(),
                    text: String::new(),
                    span: idx..idx,
                });
                depth += 1;
            }
            Event::Start(_) => depth += 1,
            Event::End(TagEnd::CodeBlock) if depth == 1 && open.is_some() => {
                depth -= 1;
                if let Some(mut block) = open.take() {
                    block.span.end = idx + 1;
                    blocks.push(block);
                }
            }
            Event::End(_) => depth = depth.saturating_sub(1),
            Event::Text(text) => {
                if let Some(block) = open.as_mut() {
                    block.text.push_str(text);
                }
            }
            _ => {}
        }
    }

    blocks
}

/// An exercise is a section with 3 or 4 top-level fenced code blocks of one
/// language: base, solution, validation and an optional context.
fn build_section(events: Vec<Event<'_>>) -> Option<LexedSection<'_>> {
    if events.is_empty() {
        return None;
    }

    let blocks = top_level_code_blocks(&events);
    let is_exercise = matches!(blocks.len(), 3 | 4)
        && !blocks[0].language.is_empty()
        && blocks.iter().all(|b| b.language == blocks[0].language);

    if !is_exercise {
        return Some(LexedSection { events, code: None });
    }

    let events = events
        .into_iter()
        .enumerate()
        .filter(|(idx, _)| !blocks.iter().any(|b| b.span.contains(idx)))
        .map(|(_, event)| event)
        .collect();

    let mut snippets = blocks
        .into_iter()
        .map(|b| (b.language, b.text.trim_end_matches('\n').to_string()));
    let (language, base) = snippets.next()?;
    let (_, solution) = snippets.next()?;
    let (_, validation) = snippets.next()?;
    let context = snippets.next().map(|(_, text)| text);

    Some(LexedSection {
        events,
        code: Some(ExerciseCode {
            language,
            base,
            solution,
            validation,
            context,
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXERCISE: &str = "Define `x` equal to 10.

```js
var x =
```

```js
var x = 10;
```

```js
assert(x == 10);
```
";

    #[test]
    fn test_single_section() {
        let lexed = lex("# Title\n\nHello", &RenderOptions::default()).unwrap();
        assert_eq!(lexed.sections.len(), 1);
        assert!(lexed.sections[0].code.is_none());
    }

    #[test]
    fn test_split_at_rules() {
        let content = "---\n\nfirst\n\n---\n\nsecond\n\n***\n\n***\n\nthird\n";
        let lexed = lex(content, &RenderOptions::default()).unwrap();
        assert_eq!(lexed.sections.len(), 3);
    }

    #[test]
    fn test_nested_rule_does_not_split() {
        let content = "> quoted\n>\n> ---\n>\n> still quoted\n";
        let lexed = lex(content, &RenderOptions::default()).unwrap();
        assert_eq!(lexed.sections.len(), 1);
    }

    #[test]
    fn test_exercise_detection() {
        let content = format!("Intro\n\n---\n\n{EXERCISE}\n---\n\nOutro\n");
        let lexed = lex(&content, &RenderOptions::default()).unwrap();
        assert_eq!(lexed.sections.len(), 3);

        let code = lexed.sections[1].code.as_ref().unwrap();
        assert_eq!(code.language, "js");
        assert_eq!(code.base, "var x =");
        assert_eq!(code.solution, "var x = 10;");
        assert_eq!(code.validation, "assert(x == 10);");
        assert_eq!(code.context, None);

        // Code blocks are not part of the description.
        assert!(!lexed.sections[1]
            .events
            .iter()
            .any(|e| matches!(e, Event::Start(Tag::CodeBlock(_)))));
    }

    #[test]
    fn test_mixed_languages_is_not_an_exercise() {
        let content = "```js\na\n```\n\n```rust\nb\n```\n\n```js\nc\n```\n";
        let lexed = lex(content, &RenderOptions::default()).unwrap();
        assert!(lexed.sections[0].code.is_none());
    }

    #[test]
    fn test_unterminated_fence() {
        let content = "# Title\n\nsome text\n\n```rust\nfn main() {}\n";
        let err = lex(content, &RenderOptions::default()).unwrap_err();
        assert_eq!(err, LexError::UnterminatedFence { line: 5 });
    }

    #[test]
    fn test_longer_closing_fence_is_fine() {
        assert!(is_fence_closed("```\ncode\n`````\n"));
        assert!(is_fence_closed("~~~\ncode\n~~~"));
        assert!(!is_fence_closed("````\ncode\n```\n"));
        assert!(!is_fence_closed("```rust\n"));
    }
}
