//! Outline Parser Integration Tests
//!
//! Tests the tolerant outline parser through the public API.

use workshop::core::{parse_outline, OutlineError};
use workshop::domain::{Diagnostic, Section};

const SAMPLE: &str = "# Sample Workshop
A short intro.
## Getting Started
- [Welcome](welcome.md)
- [Setup](setup.md)
## Advanced
- [Deep Dive](deep-dive.md)
";

fn section(id: u32, title: &str, slug: &str) -> Section {
    Section {
        id,
        title: title.to_string(),
        slug: Some(slug.to_string()),
    }
}

#[test]
fn test_sample_outline_end_to_end() {
    let outline = parse_outline(SAMPLE).unwrap();
    let structure = &outline.structure;

    assert!(outline.is_clean());
    assert_eq!(structure.title, "Sample Workshop");
    assert_eq!(structure.description, "A short intro.");
    assert_eq!(structure.parts.len(), 2);

    assert_eq!(structure.parts[0].id, 1);
    assert_eq!(structure.parts[0].title, "Getting Started");
    assert_eq!(
        structure.parts[0].sections,
        vec![
            section(1, "Welcome", "welcome"),
            section(2, "Setup", "setup"),
        ]
    );

    assert_eq!(structure.parts[1].id, 2);
    assert_eq!(
        structure.parts[1].sections,
        vec![section(1, "Deep Dive", "deep-dive")]
    );
}

#[test]
fn test_parse_is_idempotent() {
    let first = parse_outline(SAMPLE).unwrap();
    let second = parse_outline(SAMPLE).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_order_follows_document() {
    let text = "# W
## Zeta
- [Last](z.md)
- [First](a.md)
## Alpha
- [Middle](m.md)
";
    let structure = parse_outline(text).unwrap().structure;

    let titles: Vec<&str> = structure.parts.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Zeta", "Alpha"]);

    let slugs: Vec<Option<&str>> = structure.parts[0]
        .sections
        .iter()
        .map(|s| s.slug.as_deref())
        .collect();
    assert_eq!(slugs, vec![Some("z"), Some("a")]);
}

#[test]
fn test_duplicate_slug_keeps_first_title() {
    let text = "# W
## Part
- [Original](intro.md)
- [Copy](intro.md)
- [Next](next.md)
";
    let outline = parse_outline(text).unwrap();
    let sections = &outline.structure.parts[0].sections;

    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0].title, "Original");
    assert_eq!(sections[1], section(2, "Next", "next"));
    assert_eq!(
        outline.diagnostics,
        vec![Diagnostic::DuplicateSectionSlug {
            part_id: 1,
            slug: "intro".to_string(),
            line: 4,
        }]
    );
}

#[test]
fn test_same_slug_allowed_in_different_parts() {
    let text = "# W\n## One\n- [A](shared.md)\n## Two\n- [B](shared.md)\n";
    let structure = parse_outline(text).unwrap().structure;

    assert_eq!(structure.parts[0].sections.len(), 1);
    assert_eq!(structure.parts[1].sections.len(), 1);
}

#[test]
fn test_missing_description_is_empty() {
    let structure = parse_outline("# Title\n## Part\n- [A](a.md)\n")
        .unwrap()
        .structure;

    assert_eq!(structure.description, "");
}

#[test]
fn test_coming_soon_and_malformed_entries() {
    let text = "# W
## Part
- [Later]()
- [Broken(link.md)
- plain note
- [Done](done.md)
";
    let outline = parse_outline(text).unwrap();
    let sections = &outline.structure.parts[0].sections;

    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0].title, "Later");
    assert!(!sections[0].is_navigable());
    assert_eq!(sections[1], section(2, "Done", "done"));

    assert_eq!(outline.diagnostics.len(), 1);
    assert_eq!(outline.diagnostics[0].line(), Some(4));
}

#[test]
fn test_outline_without_parts_fails() {
    assert_eq!(
        parse_outline("# Only a title\nSome text\n").unwrap_err(),
        OutlineError::NoParts
    );
}
