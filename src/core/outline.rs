//! Outline document parser.
//!
//! The outline is a small markdown document:
//!
//! ```text
//! # Workshop Title
//! One line of description.
//! ## Part Title
//! - [Section Title](section-slug.md)
//! ```
//!
//! Parsing is line oriented and tolerant. Individual lines never fail the
//! parse; anything unusable is skipped and recorded as a [`Diagnostic`].
//! The parse only fails when no part was found at all.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::domain::{Diagnostic, Part, Section, WorkshopStructure};

/// Extension stripped from section links to form slugs
pub const MARKDOWN_EXTENSION: &str = ".md";

/// Outline parse failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OutlineError {
    #[error("Outline contains no parts (no '## ' headings)")]
    NoParts,
}

/// A parsed outline together with everything the parser skipped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedOutline {
    pub structure: WorkshopStructure,

    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
}

impl ParsedOutline {
    /// Whether the parser had to skip or drop anything
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

impl FromStr for ParsedOutline {
    type Err = OutlineError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        parse_outline(source)
    }
}

/// Classified outline line
#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    Blank,
    Heading { level: usize, text: &'a str },
    Item(&'a str),
    Text(&'a str),
}

fn classify(line: &str) -> Line<'_> {
    if line.is_empty() {
        return Line::Blank;
    }

    let level = line.bytes().take_while(|b| *b == b'#').count();
    if level > 0 {
        let rest = &line[level..];
        if rest.is_empty() || rest.starts_with(' ') || rest.starts_with('\t') {
            return Line::Heading {
                level,
                text: rest.trim(),
            };
        }
    }

    if let Some(item) = line.strip_prefix("- ") {
        return Line::Item(item.trim());
    }

    Line::Text(line)
}

/// Parse a `[title](link)` list item body
///
/// Trailing text after the closing parenthesis is ignored.
fn parse_link(item: &str) -> Option<(&str, &str)> {
    let rest = item.strip_prefix('[')?;
    let split = rest.find("](")?;
    let title = rest[..split].trim();
    let after = &rest[split + 2..];
    let close = after.find(')')?;

    if title.is_empty() {
        return None;
    }

    Some((title, after[..close].trim()))
}

/// Turn a link target into a slug, or `None` for an empty target
pub fn slug_from_link(link: &str) -> Option<String> {
    let slug = link.strip_suffix(MARKDOWN_EXTENSION).unwrap_or(link).trim();
    if slug.is_empty() {
        None
    } else {
        Some(slug.to_string())
    }
}

/// Parse an outline document
pub fn parse_outline(source: &str) -> Result<ParsedOutline, OutlineError> {
    let mut structure = WorkshopStructure::default();
    let mut diagnostics = Vec::new();
    let mut has_title = false;
    let mut in_comment = false;

    for (index, raw) in source.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();

        // HTML comments, possibly spanning lines
        if in_comment {
            in_comment = !line.contains("-->");
            continue;
        }
        if line.starts_with("<!--") {
            in_comment = !line.contains("-->");
            continue;
        }

        match classify(line) {
            Line::Blank => {}
            Line::Heading { level: 1, text } => {
                if !has_title && !text.is_empty() {
                    structure.title = text.to_string();
                    has_title = true;
                }
            }
            Line::Heading { level: 2, text } => {
                let id = structure.parts.len() as u32 + 1;
                structure.parts.push(Part::new(id, text));
            }
            Line::Heading { .. } => {}
            Line::Item(item) => {
                let Some(part) = structure.parts.last_mut() else {
                    if has_title && structure.description.is_empty() {
                        structure.description = line.to_string();
                    } else if item.starts_with('[') {
                        diagnostics.push(Diagnostic::MalformedOutlineLine {
                            line: line_no,
                            text: line.to_string(),
                        });
                    }
                    continue;
                };

                let Some((title, link)) = parse_link(item) else {
                    if item.starts_with('[') {
                        diagnostics.push(Diagnostic::MalformedOutlineLine {
                            line: line_no,
                            text: line.to_string(),
                        });
                    }
                    continue;
                };

                let slug = slug_from_link(link);
                if let Some(ref slug) = slug {
                    if part.has_slug(slug) {
                        diagnostics.push(Diagnostic::DuplicateSectionSlug {
                            part_id: part.id,
                            slug: slug.clone(),
                            line: line_no,
                        });
                        continue;
                    }
                }

                let id = part.sections.len() as u32 + 1;
                part.sections.push(Section {
                    id,
                    title: title.to_string(),
                    slug,
                });
            }
            Line::Text(text) => {
                if has_title && structure.parts.is_empty() && structure.description.is_empty() {
                    structure.description = text.to_string();
                }
            }
        }
    }

    if structure.parts.is_empty() {
        return Err(OutlineError::NoParts);
    }

    if !has_title {
        diagnostics.insert(0, Diagnostic::MissingTitle);
    }

    for part in structure.parts.iter().filter(|p| p.sections.is_empty()) {
        diagnostics.push(Diagnostic::EmptyPart {
            part_id: part.id,
            title: part.title.clone(),
        });
    }

    for diagnostic in &diagnostics {
        warn!(%diagnostic, "Outline diagnostic");
    }

    Ok(ParsedOutline {
        structure,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_heading_levels() {
        assert_eq!(
            classify("## Part"),
            Line::Heading {
                level: 2,
                text: "Part"
            }
        );
        assert_eq!(classify("#hashtag"), Line::Text("#hashtag"));
        assert_eq!(classify("- [a](b)"), Line::Item("[a](b)"));
        assert_eq!(classify(""), Line::Blank);
    }

    #[test]
    fn test_parse_link_ignores_trailing_text() {
        assert_eq!(
            parse_link("[Welcome](welcome.md) (15 min)"),
            Some(("Welcome", "welcome.md"))
        );
        assert_eq!(parse_link("[Broken](welcome.md"), None);
        assert_eq!(parse_link("[](welcome.md)"), None);
        assert_eq!(parse_link("plain"), None);
    }

    #[test]
    fn test_slug_from_link() {
        assert_eq!(slug_from_link("setup.md"), Some("setup".to_string()));
        assert_eq!(
            slug_from_link("part1/intro.md"),
            Some("part1/intro".to_string())
        );
        assert_eq!(slug_from_link("notes"), Some("notes".to_string()));
        assert_eq!(slug_from_link(""), None);
    }

    #[test]
    fn test_title_only_first_h1_counts() {
        let parsed = parse_outline("# First\n# Second\n## Part\n- [A](a.md)\n").unwrap();
        assert_eq!(parsed.structure.title, "First");
    }

    #[test]
    fn test_bare_hash_line_is_not_a_title() {
        let parsed = parse_outline("#\n# Real Title\nIntro.\n## Part\n- [A](a.md)\n").unwrap();

        assert_eq!(parsed.structure.title, "Real Title");
        assert_eq!(parsed.structure.description, "Intro.");
        assert!(parsed.is_clean());
    }

    #[test]
    fn test_only_one_description_line() {
        let parsed =
            parse_outline("# T\nFirst line.\nSecond line.\n## Part\n- [A](a.md)\n").unwrap();
        assert_eq!(parsed.structure.description, "First line.");
    }

    #[test]
    fn test_text_before_title_is_not_description() {
        let parsed = parse_outline("intro\n# T\n## Part\n- [A](a.md)\n").unwrap();
        assert_eq!(parsed.structure.description, "");
    }

    #[test]
    fn test_comments_are_skipped() {
        let source = "<!--\n# Hidden\n-->\n# Shown\n<!-- note -->\n## P\n- [A](a.md)\n";
        let parsed = parse_outline(source).unwrap();

        assert_eq!(parsed.structure.title, "Shown");
        assert_eq!(parsed.structure.description, "");
    }

    #[test]
    fn test_empty_link_is_coming_soon() {
        let parsed = parse_outline("# T\n## P\n- [Later]()\n- [Now](now.md)\n").unwrap();
        let sections = &parsed.structure.parts[0].sections;

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].slug, None);
        assert_eq!(sections[1].id, 2);
    }

    #[test]
    fn test_malformed_item_is_reported_and_skipped() {
        let parsed = parse_outline("# T\n## P\n- [Broken](x.md\n- [Ok](ok.md)\n").unwrap();

        assert_eq!(parsed.structure.parts[0].sections.len(), 1);
        assert_eq!(parsed.structure.parts[0].sections[0].id, 1);
        assert_eq!(
            parsed.diagnostics,
            vec![Diagnostic::MalformedOutlineLine {
                line: 3,
                text: "- [Broken](x.md".to_string()
            }]
        );
    }

    #[test]
    fn test_deeper_headings_do_not_start_parts() {
        let parsed = parse_outline("# T\n## P\n### Sub\n- [A](a.md)\n").unwrap();

        assert_eq!(parsed.structure.parts.len(), 1);
        assert_eq!(parsed.structure.parts[0].sections.len(), 1);
    }

    #[test]
    fn test_no_parts_fails() {
        assert_eq!(
            parse_outline("# Title\nJust text.\n"),
            Err(OutlineError::NoParts)
        );
        assert_eq!(parse_outline(""), Err(OutlineError::NoParts));
    }

    #[test]
    fn test_missing_title_is_diagnosed() {
        let parsed = parse_outline("## P\n- [A](a.md)\n").unwrap();

        assert_eq!(parsed.structure.title, "");
        assert_eq!(parsed.diagnostics, vec![Diagnostic::MissingTitle]);
    }

    #[test]
    fn test_crlf_input() {
        let parsed = parse_outline("# T\r\nDesc\r\n## P\r\n- [A](a.md)\r\n").unwrap();

        assert_eq!(parsed.structure.description, "Desc");
        assert_eq!(
            parsed.structure.parts[0].sections[0].slug.as_deref(),
            Some("a")
        );
    }
}
