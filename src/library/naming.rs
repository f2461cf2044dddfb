//! The `NN-title` naming convention for discovered workshop folders.
//!
//! Folders (parts) and lesson files (sections) are ordered by a numeric
//! prefix: `01-getting-started/02-setup.md`. The prefix only orders entries;
//! ids are assigned from the sorted position, so gaps are harmless.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::adapters::DirectoryListing;

use super::discovery::INDEX_FILE;

/// A name split into its order prefix and readable stem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderedName {
    /// Numeric prefix
    pub order: u32,

    /// Name without prefix or `.md` extension, e.g. `getting-started`
    pub stem: String,

    /// Humanized stem, e.g. `Getting Started`
    pub title: String,
}

/// Parse `NN-stem` or `NN_stem` (an `.md` extension is dropped)
pub fn parse_ordered_name(name: &str) -> Option<OrderedName> {
    let name = name.strip_suffix(".md").unwrap_or(name);

    let digits = name.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }

    let order = name[..digits].parse().ok()?;
    let stem = name[digits..].strip_prefix(['-', '_'].as_slice())?;
    if stem.is_empty() {
        return None;
    }

    Some(OrderedName {
        order,
        stem: stem.to_string(),
        title: humanize(stem),
    })
}

/// `getting-started` → `Getting Started`
pub fn humanize(stem: &str) -> String {
    stem.split(['-', '_'].as_slice())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// A naming convention violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NamingIssue {
    /// Entry has no `NN-` prefix and will be skipped by discovery
    MissingOrderPrefix { name: String },

    /// Several entries share an order number; they are ordered by name
    DuplicateOrder { order: u32, names: Vec<String> },
}

impl fmt::Display for NamingIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamingIssue::MissingOrderPrefix { name } => {
                write!(f, "'{}' has no NN- order prefix", name)
            }
            NamingIssue::DuplicateOrder { order, names } => {
                write!(f, "order {:02} is used by {}", order, names.join(", "))
            }
        }
    }
}

/// Check a group of sibling names against the convention
pub fn validate_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<NamingIssue> {
    let mut issues = Vec::new();
    let mut by_order: BTreeMap<u32, Vec<String>> = BTreeMap::new();

    for name in names {
        match parse_ordered_name(name) {
            Some(parsed) => by_order.entry(parsed.order).or_default().push(name.to_string()),
            None => issues.push(NamingIssue::MissingOrderPrefix {
                name: name.to_string(),
            }),
        }
    }

    for (order, mut names) in by_order {
        if names.len() > 1 {
            names.sort();
            issues.push(NamingIssue::DuplicateOrder { order, names });
        }
    }

    issues
}

/// Check folders and markdown files of a listing, each group on its own
///
/// Files other than `.md` are not lessons and are not checked, nor is the
/// workshop index file.
pub fn validate_listing(listing: &DirectoryListing) -> Vec<NamingIssue> {
    let mut issues = validate_names(listing.folders.iter().map(String::as_str));
    issues.extend(validate_names(
        listing
            .files
            .iter()
            .map(String::as_str)
            .filter(|f| f.ends_with(".md") && *f != INDEX_FILE),
    ));
    issues
}
