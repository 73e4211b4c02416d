use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A repository as returned by the listing service. Never mutated after fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(rename = "stargazers_count", default)]
    pub stars: u64,
    #[serde(rename = "html_url")]
    pub url: String,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Repository {
    /// 描述存在且非空白時回傳描述，否則回傳名稱
    pub fn description_or_name(&self) -> &str {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Release {
    pub id: u64,
    #[serde(rename = "tag_name")]
    pub version: String,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub body: Option<String>,
}

impl Release {
    pub fn body_text(&self) -> &str {
        self.body.as_deref().unwrap_or("")
    }
}

/// The closed tag vocabulary. `Other` is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Ai,
    Web,
    Cli,
    Library,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Ai,
        Category::Web,
        Category::Cli,
        Category::Library,
        Category::Other,
    ];

    pub const DEFAULT: Category = Category::Other;

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Ai => "ai",
            Category::Web => "web",
            Category::Cli => "cli",
            Category::Library => "library",
            Category::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Ai => "AI",
            Category::Web => "Web",
            Category::Cli => "CLI",
            Category::Library => "Library",
            Category::Other => "Other",
        }
    }

    /// Trimmed, case-insensitive lookup. Anything outside the vocabulary is `None`.
    pub fn parse(raw: &str) -> Option<Category> {
        let needle = raw.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(needle))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    pub tags: Vec<Category>,
    pub description: String,
}

impl ProjectMetadata {
    pub fn fallback(repository: &Repository) -> Self {
        Self {
            tags: vec![Category::DEFAULT],
            description: repository.description_or_name().to_string(),
        }
    }

    /// 快取檔可能被手動編輯成空陣列，顯示時補上預設標籤
    pub fn display_tags(&self) -> Vec<Category> {
        if self.tags.is_empty() {
            vec![Category::DEFAULT]
        } else {
            self.tags.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPost {
    pub version: String,
    pub published_at: Option<DateTime<Utc>>,
    pub html: String,
    pub download_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestRelease {
    pub version: String,
    pub download_url: String,
}

/// In-memory aggregate for one run; feeds the site assembler.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub repository: Repository,
    pub slug: String,
    pub latest_release: Option<LatestRelease>,
    pub metadata: ProjectMetadata,
    pub posts: Vec<BlogPost>,
}

impl Project {
    pub fn has_updates(&self) -> bool {
        !self.posts.is_empty()
    }

    pub fn updates_path(&self) -> String {
        format!("updates/{}.html", self.slug)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub path: String,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(description: Option<&str>) -> Repository {
        Repository {
            id: 7,
            name: "beta".to_string(),
            description: description.map(str::to_string),
            language: None,
            stars: 0,
            url: "https://github.com/octo/beta".to_string(),
            fork: false,
            updated_at: None,
        }
    }

    #[test]
    fn test_category_parse_is_case_insensitive() {
        assert_eq!(Category::parse(" AI "), Some(Category::Ai));
        assert_eq!(Category::parse("Library"), Some(Category::Library));
        assert_eq!(Category::parse("blockchain"), None);
        assert_eq!(Category::parse(""), None);
    }

    #[test]
    fn test_fallback_prefers_description() {
        let meta = ProjectMetadata::fallback(&repo(Some("A tiny tool")));
        assert_eq!(meta.tags, vec![Category::Other]);
        assert_eq!(meta.description, "A tiny tool");

        let meta = ProjectMetadata::fallback(&repo(Some("   ")));
        assert_eq!(meta.description, "beta");

        let meta = ProjectMetadata::fallback(&repo(None));
        assert_eq!(meta.description, "beta");
    }

    #[test]
    fn test_repository_deserializes_from_listing_json() {
        let json = serde_json::json!({
            "id": 42,
            "name": "beta",
            "description": null,
            "language": "Rust",
            "stargazers_count": 12,
            "html_url": "https://github.com/octo/beta",
            "fork": false,
            "updated_at": "2024-05-01T10:00:00Z",
            "owner": {"login": "octo"}
        });

        let repository: Repository = serde_json::from_value(json).unwrap();
        assert_eq!(repository.id, 42);
        assert_eq!(repository.stars, 12);
        assert_eq!(repository.language.as_deref(), Some("Rust"));
        assert!(repository.description.is_none());
    }
}
