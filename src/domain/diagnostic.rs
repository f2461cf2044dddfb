//! Non-fatal findings recorded while building a workshop structure.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A problem the parser or discovery absorbed instead of failing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Outline had no `# ` heading
    MissingTitle,

    /// A line looked like a section entry but could not be used
    MalformedOutlineLine { line: usize, text: String },

    /// A section linked to a slug already used in the same part
    DuplicateSectionSlug { part_id: u32, slug: String, line: usize },

    /// A part ended up with no sections
    EmptyPart { part_id: u32, title: String },

    /// Discovery skipped an entry that does not follow the `NN-title` convention
    UnorderedEntry { path: String },
}

impl Diagnostic {
    /// Source line (1-based) the diagnostic refers to, if any
    pub fn line(&self) -> Option<usize> {
        match self {
            Diagnostic::MalformedOutlineLine { line, .. }
            | Diagnostic::DuplicateSectionSlug { line, .. } => Some(*line),
            _ => None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MissingTitle => write!(f, "outline has no title heading"),
            Diagnostic::MalformedOutlineLine { line, text } => {
                write!(f, "line {}: skipped malformed entry '{}'", line, text)
            }
            Diagnostic::DuplicateSectionSlug { part_id, slug, line } => write!(
                f,
                "line {}: duplicate slug '{}' in part {} dropped",
                line, slug, part_id
            ),
            Diagnostic::EmptyPart { part_id, title } => {
                write!(f, "part {} ('{}') has no sections", part_id, title)
            }
            Diagnostic::UnorderedEntry { path } => {
                write!(f, "'{}' has no NN- order prefix, skipped", path)
            }
        }
    }
}
