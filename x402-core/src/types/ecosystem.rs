//! Ecosystem directory types.
//!
//! Each project is stored as one JSON file under `<root>/<category-slug>/`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::X402Error;

/// Category slug, matching a directory name under the ecosystem root.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CategorySlug {
    /// Libraries and SDKs for paying with x402
    ClientIntegrations,
    /// APIs that accept x402 payments
    ServicesEndpoints,
    /// Tools for operating x402 services
    InfrastructureTooling,
    /// Payment verification and settlement services
    Facilitators,
    /// Docs, tutorials, community
    LearningCommunity,
}

impl CategorySlug {
    /// Directory name / URL segment.
    pub fn as_str(&self) -> &'static str {
        match self {
            CategorySlug::ClientIntegrations => "client-integrations",
            CategorySlug::ServicesEndpoints => "services-endpoints",
            CategorySlug::InfrastructureTooling => "infrastructure-tooling",
            CategorySlug::Facilitators => "facilitators",
            CategorySlug::LearningCommunity => "learning-community",
        }
    }

    /// Display metadata for this category.
    pub fn meta(&self) -> &'static CategoryMeta {
        CATEGORIES
            .iter()
            .find(|meta| meta.slug == *self)
            .unwrap_or(&CATEGORIES[0])
    }
}

impl fmt::Display for CategorySlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategorySlug {
    type Err = X402Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CATEGORIES
            .iter()
            .map(|meta| meta.slug)
            .find(|slug| slug.as_str() == s.trim())
            .ok_or_else(|| X402Error::UnknownCategory(s.to_string()))
    }
}

/// Display metadata for a category.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CategoryMeta {
    /// Slug matching the directory name
    pub slug: CategorySlug,
    /// Human-readable title
    pub title: &'static str,
    /// One-line description
    pub description: &'static str,
}

/// All categories, in display order.
pub static CATEGORIES: [CategoryMeta; 5] = [
    CategoryMeta {
        slug: CategorySlug::ClientIntegrations,
        title: "Client-Side Integrations",
        description: "Libraries and SDKs for integrating x402 payments into applications",
    },
    CategoryMeta {
        slug: CategorySlug::ServicesEndpoints,
        title: "Services & Endpoints",
        description: "APIs and services that accept x402 payments",
    },
    CategoryMeta {
        slug: CategorySlug::InfrastructureTooling,
        title: "Infrastructure & Tooling",
        description: "Tools for building and operating x402-enabled services",
    },
    CategoryMeta {
        slug: CategorySlug::Facilitators,
        title: "Facilitators",
        description: "Payment verification and settlement services for x402",
    },
    CategoryMeta {
        slug: CategorySlug::LearningCommunity,
        title: "Learning & Community",
        description: "Documentation, tutorials, and community resources",
    },
];

/// A single ecosystem entry (a project, tool, or resource).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EcosystemEntry {
    /// Display name
    pub name: String,
    /// What the project does
    pub description: String,
    /// Website, repository, or documentation
    pub url: String,
    /// Category this entry belongs to
    pub category: CategorySlug,
    /// Logo path relative to the site's public root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    /// Tags for filtering and search
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("client-integrations", CategorySlug::ClientIntegrations)]
    #[test_case("services-endpoints", CategorySlug::ServicesEndpoints)]
    #[test_case("infrastructure-tooling", CategorySlug::InfrastructureTooling)]
    #[test_case("facilitators", CategorySlug::Facilitators)]
    #[test_case(" learning-community ", CategorySlug::LearningCommunity)]
    fn test_parse_slug(input: &str, expected: CategorySlug) {
        assert_eq!(input.parse::<CategorySlug>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_slug() {
        let err = "wallets".parse::<CategorySlug>().unwrap_err();
        assert!(matches!(err, X402Error::UnknownCategory(ref s) if s == "wallets"));
    }

    #[test]
    fn test_meta_lookup() {
        for meta in &CATEGORIES {
            assert_eq!(meta.slug.meta(), meta);
            assert_eq!(serde_json::to_value(meta.slug).unwrap(), meta.slug.as_str());
        }
    }

    #[test]
    fn test_entry_optional_fields() {
        let entry: EcosystemEntry = serde_json::from_str(
            r#"{"name":"x402-fetch","description":"Fetch wrapper","url":"https://example.com","category":"client-integrations","logo":null}"#,
        )
        .unwrap();

        assert_eq!(entry.category, CategorySlug::ClientIntegrations);
        assert!(entry.logo.is_none());
        assert!(entry.tags.is_empty());
    }
}
