use crate::core::ConfigProvider;
use crate::utils::error::{Result, SiteError};
use crate::utils::validation::{
    validate_account, validate_cache_file, validate_non_empty_string, validate_page_size,
    validate_path, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid regex"));

pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub site: SiteSection,
    pub github: GitHubSection,
    pub llm: LlmSection,
    pub output: OutputSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSection {
    pub title: String,
    pub account: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubSection {
    pub api_base: String,
    pub html_base: String,
    pub token: Option<String>,
    pub page_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub path: String,
    pub cache_path: String,
    pub archive: bool,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            title: "Projects".to_string(),
            account: String::new(),
        }
    }
}

impl Default for GitHubSection {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
            html_base: "https://github.com".to_string(),
            token: None,
            page_size: MAX_PAGE_SIZE,
        }
    }
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
        }
    }
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            path: "./site".to_string(),
            cache_path: "./.cache/ai-cache.json".to_string(),
            archive: false,
        }
    }
}

impl SiteConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SiteError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置，先替換 ${VAR} 環境變數
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = substitute_env_vars(content);

        toml::from_str(&processed).map_err(|e| SiteError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_account("site.account", &self.site.account)?;
        validate_url("github.api_base", &self.github.api_base)?;
        validate_url("github.html_base", &self.github.html_base)?;
        validate_page_size("github.page_size", self.github.page_size, MAX_PAGE_SIZE)?;
        validate_url("llm.endpoint", &self.llm.endpoint)?;
        validate_non_empty_string("llm.model", &self.llm.model)?;
        validate_path("output.path", &self.output.path)?;
        validate_cache_file("output.cache_path", &self.output.cache_path)?;
        Ok(())
    }

    pub fn github_token(&self) -> Option<String> {
        resolved_secret(self.github.token.as_deref())
    }

    pub fn llm_api_key(&self) -> Option<String> {
        resolved_secret(self.llm.api_key.as_deref())
    }

    /// Splits `output.cache_path` into (directory, file name).
    pub fn cache_location(&self) -> (String, String) {
        let path = Path::new(&self.output.cache_path);
        let dir = path
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| ".".to_string());
        let file = path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        (dir, file)
    }
}

fn substitute_env_vars(content: &str) -> String {
    ENV_PLACEHOLDER
        .replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
}

// 未被替換的 ${VAR} 視為未設定
fn resolved_secret(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !ENV_PLACEHOLDER.is_match(v))
        .map(str::to_string)
}

impl ConfigProvider for SiteConfig {
    fn account(&self) -> &str {
        &self.site.account
    }

    fn site_title(&self) -> &str {
        &self.site.title
    }

    fn model(&self) -> &str {
        &self.llm.model
    }

    fn html_base(&self) -> &str {
        &self.github.html_base
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn cache_file(&self) -> &str {
        Path::new(&self.output.cache_path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("ai-cache.json")
    }

    fn archive(&self) -> bool {
        self.output.archive
    }
}

impl Validate for SiteConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[site]
title = "Octo's workshop"
account = "octo"

[github]
api_base = "https://github.example.com/api/v3"
page_size = 50

[llm]
endpoint = "http://localhost:11434/v1/chat/completions"
model = "llama3"

[output]
path = "./public"
cache_path = "./state/cache.json"
archive = true
"#;

        let config = SiteConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.account(), "octo");
        assert_eq!(config.site_title(), "Octo's workshop");
        assert_eq!(config.github.page_size, 50);
        assert_eq!(config.html_base(), "https://github.com");
        assert_eq!(config.model(), "llama3");
        assert!(config.archive());
        assert_eq!(config.cache_file(), "cache.json");
        assert_eq!(
            config.cache_location(),
            ("./state".to_string(), "cache.json".to_string())
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = SiteConfig::from_toml_str("[site]\naccount = \"octo\"\n").unwrap();
        assert_eq!(config.github.api_base, "https://api.github.com");
        assert_eq!(config.github.page_size, 100);
        assert_eq!(config.output.path, "./site");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SHOWCASE_TEST_TOKEN", "ghp_example");

        let toml_content = r#"
[site]
account = "octo"

[github]
token = "${SHOWCASE_TEST_TOKEN}"

[llm]
api_key = "${SHOWCASE_TEST_UNSET_KEY}"
"#;

        let config = SiteConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.github_token().as_deref(), Some("ghp_example"));
        assert_eq!(config.llm_api_key(), None);

        std::env::remove_var("SHOWCASE_TEST_TOKEN");
    }

    #[test]
    fn test_config_validation() {
        let config = SiteConfig::default();
        assert!(config.validate().is_err(), "account is required");

        let mut config = SiteConfig::default();
        config.site.account = "octo".to_string();
        config.github.page_size = 500;
        assert!(config.validate().is_err());

        let mut config = SiteConfig::default();
        config.site.account = "octo".to_string();
        config.llm.endpoint = "ftp://models.example.com".to_string();
        assert!(config.validate().is_err());

        let mut config = SiteConfig::default();
        config.site.account = "octo cat".to_string();
        assert!(config.validate().is_err(), "account must be a login name");

        let mut config = SiteConfig::default();
        config.site.account = "octo".to_string();
        config.output.cache_path = "./.cache/".to_string();
        assert!(config.validate().is_err(), "cache path must name a file");
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[site]\naccount = \"file-account\"\n")
            .unwrap();

        let config = SiteConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.account(), "file-account");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = SiteConfig::from_toml_str("[site\naccount = ").unwrap_err();
        assert!(matches!(err, SiteError::ConfigValidationError { .. }));
    }
}
