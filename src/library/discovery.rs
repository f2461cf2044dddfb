//! Build a workshop structure from ordered folders instead of an outline.
//!
//! ```text
//! content/
//! ├── README.md                 # optional: title + description
//! ├── 01-getting-started/
//! │   ├── 01-welcome.md         # slug: 01-getting-started/01-welcome
//! │   └── 02-setup.md
//! └── 02-advanced/
//!     └── 01-deep-dive.md
//! ```

use anyhow::{bail, Result};
use tracing::{debug, warn};

use crate::adapters::{normalize_path, ContentSource};
use crate::core::outline::ParsedOutline;
use crate::domain::{Diagnostic, Part, Section, WorkshopStructure};

use super::naming::{parse_ordered_name, OrderedName};

/// File read for the workshop title and description, if present
pub const INDEX_FILE: &str = "README.md";

/// Title used when neither options nor the index file provide one
pub const DEFAULT_TITLE: &str = "Workshop";

/// Overrides for discovered metadata
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryOptions {
    /// Workshop title; read from the index file when unset
    pub title: Option<String>,

    /// Workshop description; read from the index file when unset
    pub description: Option<String>,
}

fn join(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", base, name)
    }
}

/// Keep ordered entries, report the rest, sort by (order, name)
fn ordered<'a>(
    base: &str,
    names: impl IntoIterator<Item = &'a String>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<(OrderedName, &'a str)> {
    let mut entries: Vec<(OrderedName, &str)> = names
        .into_iter()
        .filter_map(|name| match parse_ordered_name(name) {
            Some(parsed) => Some((parsed, name.as_str())),
            None => {
                diagnostics.push(Diagnostic::UnorderedEntry {
                    path: join(base, name),
                });
                None
            }
        })
        .collect();

    entries.sort_by(|a, b| a.0.order.cmp(&b.0.order).then_with(|| a.1.cmp(b.1)));
    entries
}

/// First `# ` heading and the first plain line after it
fn index_metadata(text: &str) -> (Option<String>, Option<String>) {
    let mut title = None;
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if title.is_none() {
            if let Some(heading) = line.strip_prefix("# ") {
                title = Some(heading.trim().to_string());
            }
            continue;
        }
        if line.starts_with('#') {
            break;
        }
        return (title, Some(line.to_string()));
    }
    (title, None)
}

/// Discover the structure under `root` of a source
///
/// Part and section ids follow sorted position, not the numeric prefix.
/// Entries without a prefix are skipped and reported as diagnostics.
pub async fn discover_structure(
    source: &dyn ContentSource,
    root: &str,
    options: &DiscoveryOptions,
) -> Result<ParsedOutline> {
    let root = normalize_path(root)?;
    let listing = source.list(&root).await?;
    let mut diagnostics = Vec::new();

    let (index_title, index_description) = if listing.files.iter().any(|f| f == INDEX_FILE) {
        match source.read(&join(&root, INDEX_FILE)).await {
            Ok(Some(text)) => index_metadata(&text),
            Ok(None) => (None, None),
            Err(e) => {
                warn!(error = %e, "Failed to read workshop index");
                (None, None)
            }
        }
    } else {
        (None, None)
    };

    let mut structure = WorkshopStructure {
        title: options
            .title
            .clone()
            .or(index_title)
            .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        description: options
            .description
            .clone()
            .or(index_description)
            .unwrap_or_default(),
        parts: Vec::new(),
    };

    for (index, (name, folder)) in ordered(&root, &listing.folders, &mut diagnostics)
        .into_iter()
        .enumerate()
    {
        let folder_path = join(&root, folder);
        let mut part = Part::new(index as u32 + 1, name.title);

        let part_listing = source.list(&folder_path).await?;
        let lessons = part_listing.files.iter().filter(|f| f.ends_with(".md"));

        for (position, (lesson, file)) in ordered(&folder_path, lessons, &mut diagnostics)
            .into_iter()
            .enumerate()
        {
            let stem = file.strip_suffix(".md").unwrap_or(file);
            part.sections.push(Section {
                id: position as u32 + 1,
                title: lesson.title,
                slug: Some(join(&folder_path, stem)),
            });
        }

        if part.sections.is_empty() {
            diagnostics.push(Diagnostic::EmptyPart {
                part_id: part.id,
                title: part.title.clone(),
            });
        }

        debug!(part = %part.title, sections = part.sections.len(), "Discovered part");
        structure.parts.push(part);
    }

    if structure.parts.is_empty() {
        bail!(
            "no NN-title folders found under '{}'",
            if root.is_empty() { "/" } else { root.as_str() }
        );
    }

    Ok(ParsedOutline {
        structure,
        diagnostics,
    })
}
