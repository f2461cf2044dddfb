//! Workshop outline model.
//!
//! A workshop is an ordered list of parts, each holding an ordered list of
//! sections. Ids are positional (1-based) and never read from content.

use serde::{Deserialize, Serialize};

/// Root descriptor of a workshop outline
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkshopStructure {
    /// Workshop title (first H1 of the outline)
    pub title: String,

    /// One-line description (first plain line after the title)
    pub description: String,

    /// Parts in display order
    pub parts: Vec<Part>,
}

/// A top-level chapter of the workshop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    /// 1-based position in the workshop
    pub id: u32,

    /// Part title
    pub title: String,

    /// Sections in display order
    pub sections: Vec<Section>,
}

/// A single lesson
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// 1-based position within the parent part
    pub id: u32,

    /// Lesson title
    pub title: String,

    /// Content key; `None` means the lesson is not written yet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

impl Section {
    /// Whether the section links to content
    pub fn is_navigable(&self) -> bool {
        self.slug.is_some()
    }
}

/// A section together with the part that owns it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionRef<'a> {
    pub part: &'a Part,
    pub section: &'a Section,
}

impl<'a> SectionRef<'a> {
    /// Dotted display number, e.g. `2.3`
    pub fn number(&self) -> String {
        format!("{}.{}", self.part.id, self.section.id)
    }

    /// Slug of the referenced section (always present for navigable refs)
    pub fn slug(&self) -> Option<&'a str> {
        self.section.slug.as_deref()
    }
}

/// Previous and next navigable sections around a given slug
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Adjacent<'a> {
    pub prev: Option<SectionRef<'a>>,
    pub next: Option<SectionRef<'a>>,
}

impl Part {
    /// Create an empty part
    pub fn new(id: u32, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            sections: Vec::new(),
        }
    }

    /// Check if a slug is already used by a section in this part
    pub fn has_slug(&self, slug: &str) -> bool {
        self.sections
            .iter()
            .any(|s| s.slug.as_deref() == Some(slug))
    }
}

impl WorkshopStructure {
    /// Total number of sections, navigable or not
    pub fn section_count(&self) -> usize {
        self.parts.iter().map(|p| p.sections.len()).sum()
    }

    /// All sections that link to content, in display order
    pub fn navigable_sections(&self) -> Vec<SectionRef<'_>> {
        self.parts
            .iter()
            .flat_map(|part| {
                part.sections
                    .iter()
                    .filter(|s| s.is_navigable())
                    .map(move |section| SectionRef { part, section })
            })
            .collect()
    }

    /// Find the first section with the given slug
    pub fn find_section(&self, slug: &str) -> Option<SectionRef<'_>> {
        self.parts.iter().find_map(|part| {
            part.sections
                .iter()
                .find(|s| s.slug.as_deref() == Some(slug))
                .map(|section| SectionRef { part, section })
        })
    }

    /// Previous/next navigable sections, crossing part boundaries
    pub fn adjacent(&self, slug: &str) -> Adjacent<'_> {
        let sections = self.navigable_sections();
        let Some(index) = sections.iter().position(|s| s.slug() == Some(slug)) else {
            return Adjacent::default();
        };

        Adjacent {
            prev: index.checked_sub(1).map(|i| sections[i]),
            next: sections.get(index + 1).copied(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(id: u32, title: &str, slug: Option<&str>) -> Section {
        Section {
            id,
            title: title.to_string(),
            slug: slug.map(str::to_string),
        }
    }

    fn sample() -> WorkshopStructure {
        WorkshopStructure {
            title: "Sample".to_string(),
            description: String::new(),
            parts: vec![
                Part {
                    id: 1,
                    title: "One".to_string(),
                    sections: vec![
                        section(1, "Welcome", Some("welcome")),
                        section(2, "Later", None),
                    ],
                },
                Part {
                    id: 2,
                    title: "Two".to_string(),
                    sections: vec![section(1, "Deep Dive", Some("deep-dive"))],
                },
            ],
        }
    }

    #[test]
    fn test_find_section_returns_owner_part() {
        let structure = sample();
        let found = structure.find_section("deep-dive").unwrap();

        assert_eq!(found.part.id, 2);
        assert_eq!(found.section.title, "Deep Dive");
        assert_eq!(found.number(), "2.1");
        assert!(structure.find_section("missing").is_none());
    }

    #[test]
    fn test_adjacent_skips_coming_soon_sections() {
        let structure = sample();

        let around = structure.adjacent("welcome");
        assert!(around.prev.is_none());
        assert_eq!(around.next.unwrap().slug(), Some("deep-dive"));

        let around = structure.adjacent("deep-dive");
        assert_eq!(around.prev.unwrap().slug(), Some("welcome"));
        assert!(around.next.is_none());
    }

    #[test]
    fn test_counts() {
        let structure = sample();
        assert_eq!(structure.section_count(), 3);
        assert_eq!(structure.navigable_sections().len(), 2);
    }

    #[test]
    fn test_serialization_omits_missing_slug() {
        let json = serde_json::to_string(&section(2, "Later", None)).unwrap();
        assert!(!json.contains("slug"));

        let parsed: Section = serde_json::from_str(&json).unwrap();
        assert!(parsed.slug.is_none());
    }
}
