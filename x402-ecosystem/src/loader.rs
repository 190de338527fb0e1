//! Ecosystem directory loader.
//!
//! Reads entries from `<root>/<category-slug>/*.json` on every call. Bad
//! files are skipped with a warning so one malformed entry never hides the
//! rest of a category.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::fs;
use tracing::{debug, instrument, warn};

use x402_core::error::Result;
use x402_core::types::{CategoryMeta, CategorySlug, EcosystemEntry, CATEGORIES};

/// Entries of one category together with its display metadata.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CategoryGroup {
    /// Category metadata
    pub category: CategoryMeta,
    /// Entries sorted by name
    pub entries: Vec<EcosystemEntry>,
}

/// Loads ecosystem entries from a directory tree.
#[derive(Clone, Debug)]
pub struct EcosystemLoader {
    root: PathBuf,
}

impl EcosystemLoader {
    /// Creates a loader rooted at `root`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Loads all entries of one category, sorted by name.
    ///
    /// A missing or unreadable category directory yields an empty list.
    #[instrument(skip(self), fields(root = ?self.root))]
    pub async fn entries_by_category(&self, category: CategorySlug) -> Vec<EcosystemEntry> {
        let dir = self.root.join(category.as_str());

        let mut read_dir = match fs::read_dir(&dir).await {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = ?dir, "Category directory does not exist");
                return Vec::new();
            }
            Err(e) => {
                warn!(path = ?dir, error = %e, "Failed to read category directory");
                return Vec::new();
            }
        };

        let mut entries = Vec::new();
        loop {
            let dir_entry = match read_dir.next_entry().await {
                Ok(Some(dir_entry)) => dir_entry,
                Ok(None) => break,
                Err(e) => {
                    warn!(path = ?dir, error = %e, "Failed to read category directory");
                    return Vec::new();
                }
            };

            let path = dir_entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }

            match Self::read_entry(&path).await {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!(path = ?path, error = %e, "Skipping malformed ecosystem entry"),
            }
        }

        sort_by_name(&mut entries);
        debug!(count = entries.len(), "Loaded ecosystem entries");
        entries
    }

    /// Loads every entry, category by category in display order.
    pub async fn all_entries(&self) -> Vec<EcosystemEntry> {
        let mut all = Vec::new();
        for meta in &CATEGORIES {
            all.extend(self.entries_by_category(meta.slug).await);
        }
        all
    }

    /// Loads every category with its entries, in display order.
    pub async fn by_category(&self) -> Vec<CategoryGroup> {
        let mut groups = Vec::with_capacity(CATEGORIES.len());
        for meta in &CATEGORIES {
            groups.push(CategoryGroup {
                category: meta.clone(),
                entries: self.entries_by_category(meta.slug).await,
            });
        }
        groups
    }

    async fn read_entry(path: &Path) -> Result<EcosystemEntry> {
        let contents = fs::read(path).await?;
        Ok(serde_json::from_slice(&contents)?)
    }
}

fn sort_by_name(entries: &mut [EcosystemEntry]) {
    entries.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs as std_fs;
    use tempfile::TempDir;

    fn write(root: &Path, category: &str, file: &str, contents: &str) {
        let dir = root.join(category);
        std_fs::create_dir_all(&dir).unwrap();
        std_fs::write(dir.join(file), contents).unwrap();
    }

    fn entry_json(name: &str, category: &str) -> String {
        json!({
            "name": name,
            "description": format!("{} description", name),
            "url": format!("https://{}.example", name.to_lowercase()),
            "category": category,
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_missing_directory_is_empty() {
        let root = TempDir::new().unwrap();
        let loader = EcosystemLoader::new(root.path());

        assert!(loader.entries_by_category(CategorySlug::Facilitators).await.is_empty());
        assert!(loader.all_entries().await.is_empty());
    }

    #[tokio::test]
    async fn test_skips_non_json_and_malformed_files() {
        let root = TempDir::new().unwrap();
        write(root.path(), "facilitators", "coinbase.json", &entry_json("Coinbase", "facilitators"));
        write(root.path(), "facilitators", ".gitkeep", "");
        write(root.path(), "facilitators", "notes.md", "# not an entry");
        write(root.path(), "facilitators", "broken.json", "{ \"name\": ");
        write(root.path(), "facilitators", "wrong-category.json", &entry_json("X", "not-a-category"));

        let entries = EcosystemLoader::new(root.path())
            .entries_by_category(CategorySlug::Facilitators)
            .await;

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "Coinbase");
        assert_eq!(entries[0].category, CategorySlug::Facilitators);
    }

    #[tokio::test]
    async fn test_sorted_by_name_case_insensitive() {
        let root = TempDir::new().unwrap();
        for (file, name) in [("a.json", "zeta"), ("b.json", "Alpha"), ("c.json", "beta"), ("d.json", "alpha")] {
            write(root.path(), "client-integrations", file, &entry_json(name, "client-integrations"));
        }

        let names: Vec<_> = EcosystemLoader::new(root.path())
            .entries_by_category(CategorySlug::ClientIntegrations)
            .await
            .into_iter()
            .map(|e| e.name)
            .collect();

        assert_eq!(names, vec!["Alpha", "alpha", "beta", "zeta"]);
    }

    #[tokio::test]
    async fn test_optional_fields() {
        let root = TempDir::new().unwrap();
        let contents = json!({
            "name": "Docs",
            "description": "Guides",
            "url": "https://docs.example",
            "category": "learning-community",
            "logo": "/logos/docs.png",
            "tags": ["docs", "tutorial"]
        });
        write(root.path(), "learning-community", "docs.json", &contents.to_string());

        let entries = EcosystemLoader::new(root.path())
            .entries_by_category(CategorySlug::LearningCommunity)
            .await;

        assert_eq!(entries[0].logo.as_deref(), Some("/logos/docs.png"));
        assert_eq!(entries[0].tags, vec!["docs", "tutorial"]);
    }

    #[tokio::test]
    async fn test_all_entries_follow_category_order() {
        let root = TempDir::new().unwrap();
        write(root.path(), "learning-community", "a.json", &entry_json("Aardvark Docs", "learning-community"));
        write(root.path(), "facilitators", "z.json", &entry_json("Zed Pay", "facilitators"));
        write(root.path(), "client-integrations", "m.json", &entry_json("Middle SDK", "client-integrations"));

        let names: Vec<_> = EcosystemLoader::new(root.path())
            .all_entries()
            .await
            .into_iter()
            .map(|e| e.name)
            .collect();

        assert_eq!(names, vec!["Middle SDK", "Zed Pay", "Aardvark Docs"]);
    }

    #[tokio::test]
    async fn test_by_category_includes_empty_groups() {
        let root = TempDir::new().unwrap();
        write(root.path(), "facilitators", "c.json", &entry_json("Coinbase", "facilitators"));

        let groups = EcosystemLoader::new(root.path()).by_category().await;

        assert_eq!(groups.len(), CATEGORIES.len());
        assert_eq!(groups[0].category.slug, CategorySlug::ClientIntegrations);
        assert!(groups[0].entries.is_empty());

        let facilitators = groups
            .iter()
            .find(|g| g.category.slug == CategorySlug::Facilitators)
            .unwrap();
        assert_eq!(facilitators.entries.len(), 1);
    }
}
