//! Discovery Integration Tests
//!
//! Tests building a workshop from NN-title folders on disk.

use std::path::Path;

use tempfile::TempDir;
use tokio::fs;

use workshop::adapters::{BundledSource, DirectorySource};
use workshop::core::{ContentResolver, ResolverOptions, Sources, StructureStrategy};
use workshop::library::{validate_listing, DiscoveryOptions, NamingIssue};
use workshop::ContentSource;

async fn write(root: &Path, relative: &str, text: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.unwrap();
    }
    fs::write(path, text).await.unwrap();
}

async fn sample_tree() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    write(root, "README.md", "# Intents Workshop\n\nBuild with intents.\n").await;
    write(root, "01-intro/01-welcome.md", "# Welcome\n").await;
    write(root, "01-intro/02-setup.md", "# Setup\n").await;
    write(root, "03-wallets/01-smart-wallet.md", "# Smart Wallet\n").await;
    write(root, "03-wallets/01-keys.md", "# Keys\n").await;
    temp
}

fn discover_options() -> ResolverOptions {
    ResolverOptions {
        structure: StructureStrategy::Discover {
            root: String::new(),
            options: DiscoveryOptions::default(),
        },
        ..ResolverOptions::default()
    }
}

#[tokio::test]
async fn test_live_resolver_discovers_from_directory() {
    let temp = sample_tree().await;
    let resolver = ContentResolver::new(
        Sources::Live {
            bundled: std::sync::Arc::new(BundledSource::new()),
            store: std::sync::Arc::new(DirectorySource::new(temp.path())),
        },
        discover_options(),
    );

    let structure = resolver.resolve_structure().await.unwrap();
    assert_eq!(structure.title, "Intents Workshop");
    assert_eq!(structure.description, "Build with intents.");

    let ids: Vec<u32> = structure.parts.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(structure.parts[1].title, "Wallets");

    // Equal prefixes are ordered by name
    let slugs: Vec<&str> = structure.parts[1]
        .sections
        .iter()
        .filter_map(|s| s.slug.as_deref())
        .collect();
    assert_eq!(slugs, vec!["03-wallets/01-keys", "03-wallets/01-smart-wallet"]);

    let text = resolver
        .resolve_content("03-wallets/01-smart-wallet")
        .await
        .unwrap();
    assert_eq!(text, "# Smart Wallet\n");
}

#[tokio::test]
async fn test_bundled_snapshot_discovers_structure() {
    let temp = sample_tree().await;
    let bundled = BundledSource::from_dir(temp.path()).unwrap();
    let resolver = ContentResolver::new(
        Sources::Bundled(std::sync::Arc::new(bundled)),
        discover_options(),
    );

    let structure = resolver.resolve_structure().await.unwrap();
    assert_eq!(structure.parts.len(), 2);
    assert_eq!(structure.section_count(), 4);
    assert_eq!(
        structure.adjacent("01-intro/02-setup").next.and_then(|s| s.slug()),
        Some("03-wallets/01-keys")
    );
}

#[tokio::test]
async fn test_naming_validation_reports_duplicates() {
    let temp = sample_tree().await;
    write(temp.path(), "scratch/notes.md", "notes").await;
    let source = DirectorySource::new(temp.path());

    let root_issues = validate_listing(&source.list("").await.unwrap());
    assert_eq!(
        root_issues,
        vec![NamingIssue::MissingOrderPrefix {
            name: "scratch".to_string()
        }]
    );

    let wallet_issues = validate_listing(&source.list("03-wallets").await.unwrap());
    assert_eq!(
        wallet_issues,
        vec![NamingIssue::DuplicateOrder {
            order: 1,
            names: vec!["01-keys.md".to_string(), "01-smart-wallet.md".to_string()],
        }]
    );
}
