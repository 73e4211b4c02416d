use crate::utils::error::{Result, SiteError};
use std::path::Path;
use url::Url;

/// GitHub caps login names at 39 characters.
pub const MAX_ACCOUNT_LEN: usize = 39;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: impl ToString, reason: impl Into<String>) -> SiteError {
    SiteError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// Endpoint and link bases must be absolute http(s) URLs.
pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.trim().is_empty() {
        return Err(invalid(field_name, url_str, "URL cannot be empty"));
    }

    let url = Url::parse(url_str)
        .map_err(|e| invalid(field_name, url_str, format!("Invalid URL format: {}", e)))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(invalid(
            field_name,
            url_str,
            format!("Unsupported URL scheme: {}", scheme),
        )),
    }
}

/// Account names follow GitHub's login rule: ASCII letters, digits and single
/// inner hyphens. The name ends up in API paths and download links.
pub fn validate_account(field_name: &str, account: &str) -> Result<()> {
    if account.trim().is_empty() {
        return Err(invalid(field_name, account, "Account cannot be empty"));
    }
    if account.len() > MAX_ACCOUNT_LEN {
        return Err(invalid(
            field_name,
            account,
            format!("Account is longer than {} characters", MAX_ACCOUNT_LEN),
        ));
    }
    if !account.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(invalid(
            field_name,
            account,
            "Account may only contain letters, digits and hyphens",
        ));
    }
    if account.starts_with('-') || account.ends_with('-') || account.contains("--") {
        return Err(invalid(
            field_name,
            account,
            "Hyphens cannot lead, trail or repeat",
        ));
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(
            field_name,
            value,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(invalid(field_name, path, "Path cannot be empty"));
    }
    if path.contains('\0') {
        return Err(invalid(field_name, path, "Path contains null bytes"));
    }
    Ok(())
}

/// The cache lives in a single JSON file, so the path has to end in a file name.
pub fn validate_cache_file(field_name: &str, path: &str) -> Result<()> {
    validate_path(field_name, path)?;
    if path.ends_with('/') || path.ends_with('\\') || Path::new(path).file_name().is_none() {
        return Err(invalid(field_name, path, "Cache path must name a file"));
    }
    Ok(())
}

/// The listing endpoint serves at most `max` items per page and at least one.
pub fn validate_page_size(field_name: &str, page_size: u32, max: u32) -> Result<()> {
    if page_size == 0 || page_size > max {
        return Err(invalid(
            field_name,
            page_size,
            format!("Page size must be between 1 and {}", max),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("github.api_base", "https://api.github.com").is_ok());
        assert!(validate_url("llm.endpoint", "http://localhost:11434/v1/chat/completions").is_ok());
        assert!(validate_url("github.api_base", "").is_err());
        assert!(validate_url("github.api_base", "not a url").is_err());
        assert!(validate_url("github.api_base", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_account() {
        assert!(validate_account("site.account", "octocat").is_ok());
        assert!(validate_account("site.account", "octo-cat-42").is_ok());
        assert!(validate_account("site.account", "").is_err());
        assert!(validate_account("site.account", "octo cat").is_err());
        assert!(validate_account("site.account", "octo/cat").is_err());
        assert!(validate_account("site.account", "-octo").is_err());
        assert!(validate_account("site.account", "octo--cat").is_err());
        assert!(validate_account("site.account", &"a".repeat(40)).is_err());
    }

    #[test]
    fn test_validate_cache_file() {
        assert!(validate_cache_file("output.cache_path", "./.cache/ai-cache.json").is_ok());
        assert!(validate_cache_file("output.cache_path", "cache.json").is_ok());
        assert!(validate_cache_file("output.cache_path", "").is_err());
        assert!(validate_cache_file("output.cache_path", "./.cache/").is_err());
        assert!(validate_cache_file("output.cache_path", "..").is_err());
        assert!(validate_cache_file("output.cache_path", "bad\0path").is_err());
    }

    #[test]
    fn test_validate_page_size() {
        assert!(validate_page_size("github.page_size", 100, 100).is_ok());
        assert!(validate_page_size("github.page_size", 1, 100).is_ok());

        let err = validate_page_size("github.page_size", 0, 100).unwrap_err();
        assert!(matches!(
            err,
            SiteError::InvalidConfigValueError { ref field, .. } if field == "github.page_size"
        ));
        assert!(validate_page_size("github.page_size", 101, 100).is_err());
    }

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("llm.model", "gpt-4o-mini").is_ok());
        assert!(validate_non_empty_string("llm.model", "   ").is_err());
    }
}
