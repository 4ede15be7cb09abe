//! Section fragments produced by the parser adapter.
//!
//! Sections are serialized to JSON for the presentation layer; the `type`
//! field lets it draw plain prose and exercises differently.

use serde::{Deserialize, Serialize};

/// Code snippets of an exercise section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseCode {
    /// Language of all the snippets (the fence info string).
    pub language: String,
    /// Starting code handed to the reader.
    pub base: String,
    pub solution: String,
    /// Code checking the reader's answer.
    pub validation: String,
    /// Code made available to the other snippets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// One rendered fragment of a document. Position in the produced sequence is
/// significant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Section {
    /// Regular prose.
    Normal {
        /// HTML fragment.
        content: String,
    },
    /// An exercise: its description plus the code snippets.
    Exercise {
        /// HTML fragment of the description.
        content: String,
        code: ExerciseCode,
    },
}

impl Section {
    pub fn normal(content: impl Into<String>) -> Self {
        Self::Normal {
            content: content.into(),
        }
    }

    /// HTML of the section, the description for exercises.
    pub fn html(&self) -> &str {
        match self {
            Self::Normal { content } | Self::Exercise { content, .. } => content,
        }
    }

    pub fn is_exercise(&self) -> bool {
        matches!(self, Self::Exercise { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_normal() {
        let section = Section::normal("<p>test</p>");
        let json = serde_json::to_string(&section).unwrap();
        assert_eq!(json, r#"{"type":"normal","content":"<p>test</p>"}"#);
    }

    #[test]
    fn test_serde_exercise_without_context() {
        let section = Section::Exercise {
            content: "<p>Define x</p>".into(),
            code: ExerciseCode {
                language: "js".into(),
                base: "var x =".into(),
                solution: "var x = 10;".into(),
                validation: "assert(x == 10);".into(),
                context: None,
            },
        };
        let json = serde_json::to_string(&section).unwrap();
        assert!(json.contains(r#""type":"exercise""#));
        assert!(json.contains(r#""solution":"var x = 10;""#));
        // Missing context should be skipped
        assert!(!json.contains("context"));
        assert_eq!(section.html(), "<p>Define x</p>");
        assert!(section.is_exercise());
    }
}
