//! Whole-workshop export as a single markdown document.
//!
//! Export never fails because of one section: sections without a slug or
//! whose content cannot be resolved contribute a placeholder instead.

use tracing::{info, warn};

use crate::domain::WorkshopStructure;

use super::resolver::{ContentResolver, ResolveError};

/// Placeholder for sections that are not written yet
pub const COMING_SOON_MARKER: &str = "> _Coming soon._";

/// Placeholder for a section whose content could not be resolved
pub fn unavailable_marker(slug: &str) -> String {
    format!("> _Content unavailable ({})._", slug)
}

/// Drop a document's leading `# ` title line (and blank lines before it)
pub fn strip_leading_title(markdown: &str) -> &str {
    let body = markdown.trim_start();
    if !body.starts_with("# ") {
        return markdown;
    }

    match body.find('\n') {
        Some(end) => body[end + 1..].trim_start_matches(|c: char| c == '\r' || c == '\n'),
        None => "",
    }
}

/// Export every section the resolver can reach
pub async fn export_workshop(resolver: &ContentResolver) -> Result<String, ResolveError> {
    let structure = resolver.resolve_structure().await?;
    let mut missing = 0usize;

    let mut bodies = Vec::with_capacity(structure.section_count());
    for part in &structure.parts {
        for section in &part.sections {
            let body = match &section.slug {
                None => None,
                Some(slug) => match resolver.resolve_content(slug).await {
                    Ok(text) => Some(Ok(text)),
                    Err(e) => {
                        warn!(%slug, error = %e, "Exporting placeholder for section");
                        missing += 1;
                        Some(Err(slug.clone()))
                    }
                },
            };
            bodies.push(body);
        }
    }

    info!(
        sections = bodies.len(),
        unavailable = missing,
        "Exported workshop"
    );

    Ok(render(&structure, bodies))
}

/// Lay out the combined document; `bodies` is in section display order
fn render(
    structure: &WorkshopStructure,
    bodies: Vec<Option<Result<String, String>>>,
) -> String {
    let mut out = String::new();
    let mut bodies = bodies.into_iter();

    out.push_str(&format!("# {}\n\n", structure.title));
    if !structure.description.is_empty() {
        out.push_str(&format!("{}\n\n", structure.description));
    }

    for part in &structure.parts {
        out.push_str(&format!("## Part {}: {}\n\n", part.id, part.title));

        for section in &part.sections {
            out.push_str(&format!(
                "### {}.{} {}\n\n",
                part.id, section.id, section.title
            ));

            match bodies.next().flatten() {
                None => out.push_str(COMING_SOON_MARKER),
                Some(Ok(text)) => out.push_str(strip_leading_title(&text).trim_end()),
                Some(Err(slug)) => out.push_str(&unavailable_marker(&slug)),
            }
            out.push_str("\n\n");
        }
    }

    let trimmed = out.trim_end().len();
    out.truncate(trimmed);
    out.push('\n');
    out
}
