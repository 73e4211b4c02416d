use crate::utils::error::{Result, SiteError};
use url::Url;

/// Builds release download links from a repository name and version label.
#[derive(Debug, Clone)]
pub struct ReleaseLinks {
    html_base: String,
    account: String,
}

impl ReleaseLinks {
    pub fn new(html_base: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            html_base: html_base.into(),
            account: account.into(),
        }
    }

    /// `<html_base>/<account>/<repository>/releases/tag/<version>`, percent-encoded per segment.
    pub fn download_url(&self, repository: &str, version: &str) -> Result<String> {
        if repository.trim().is_empty() || version.trim().is_empty() {
            return Err(SiteError::ValidationError {
                message: format!(
                    "cannot derive a download link from repository '{}' and version '{}'",
                    repository, version
                ),
            });
        }

        let mut url = Url::parse(&self.html_base).map_err(|e| SiteError::ConfigError {
            message: format!("invalid html base '{}': {}", self.html_base, e),
        })?;
        url.path_segments_mut()
            .map_err(|_| SiteError::ConfigError {
                message: format!("html base '{}' cannot hold a path", self.html_base),
            })?
            .pop_if_empty()
            .extend([self.account.as_str(), repository, "releases", "tag", version]);

        Ok(url.to_string())
    }
}

/// File-name slug for a repository's update page.
///
/// Keeps the characters GitHub allows in names (`a-z0-9`, `-`, `_`, `.`) so
/// `my-repo`, `my_repo` and `my.repo` stay distinct; anything else becomes `-`.
pub fn page_slug(name: &str) -> Result<String> {
    let mut slug = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.') {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    // 開頭的點會變成隱藏檔
    let slug = slug.trim_matches(|c| c == '-' || c == '.').to_string();

    if slug.is_empty() {
        return Err(SiteError::ValidationError {
            message: format!("repository name '{}' has no usable characters for a page name", name),
        });
    }
    Ok(slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_url_is_deterministic() {
        let links = ReleaseLinks::new("https://github.com", "octo");
        let url = links.download_url("beta", "v1.0.0").unwrap();
        assert_eq!(url, "https://github.com/octo/beta/releases/tag/v1.0.0");
        assert_eq!(links.download_url("beta", "v1.0.0").unwrap(), url);
    }

    #[test]
    fn test_download_url_encodes_segments() {
        let links = ReleaseLinks::new("https://github.com/", "octo");
        let url = links.download_url("beta", "release/2024 spring").unwrap();
        assert_eq!(
            url,
            "https://github.com/octo/beta/releases/tag/release%2F2024%20spring"
        );
    }

    #[test]
    fn test_download_url_rejects_empty_parts() {
        let links = ReleaseLinks::new("https://github.com", "octo");
        assert!(links.download_url("beta", "").is_err());
        assert!(links.download_url(" ", "v1").is_err());
    }

    #[test]
    fn test_page_slug() {
        assert_eq!(page_slug("Beta").unwrap(), "beta");
        assert_eq!(page_slug("my_cool.repo").unwrap(), "my_cool.repo");
        assert_eq!(page_slug("--Weird  Name--").unwrap(), "weird-name");
        assert_eq!(page_slug(".dotfiles").unwrap(), "dotfiles");
        assert!(page_slug("...").is_err());
        assert!(page_slug("").is_err());
    }

    #[test]
    fn test_page_slug_keeps_names_github_treats_as_distinct() {
        let slugs: Vec<String> = ["my-repo", "my_repo", "my.repo"]
            .iter()
            .map(|name| page_slug(name).unwrap())
            .collect();
        assert_eq!(slugs, vec!["my-repo", "my_repo", "my.repo"]);
    }
}
