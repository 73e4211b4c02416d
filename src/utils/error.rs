use thiserror::Error;

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Upstream returned {status} for {url}")]
    UpstreamError { status: u16, url: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Cache error: {message}")]
    CacheError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Storage,
    Configuration,
    Data,
    Cache,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SiteError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SiteError::ApiError(_) | SiteError::UpstreamError { .. } => ErrorCategory::Network,
            SiteError::IoError(_) | SiteError::ZipError(_) => ErrorCategory::Storage,
            SiteError::ConfigError { .. }
            | SiteError::ConfigValidationError { .. }
            | SiteError::InvalidConfigValueError { .. }
            | SiteError::MissingConfigError { .. } => ErrorCategory::Configuration,
            SiteError::SerializationError(_) | SiteError::ValidationError { .. } => {
                ErrorCategory::Data
            }
            SiteError::CacheError { .. } => ErrorCategory::Cache,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Storage | ErrorCategory::Cache => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check network connectivity and the configured API endpoints",
            ErrorCategory::Storage => "Check that the output directory exists and is writable",
            ErrorCategory::Configuration => "Review the configuration file and CLI arguments",
            ErrorCategory::Data => "Inspect the upstream data; the offending repository is named in the log",
            ErrorCategory::Cache => "Check that the cache path is writable; generated content was not saved",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SiteError::UpstreamError { status, url } => {
                format!("Remote service answered {} ({})", status, url)
            }
            SiteError::CacheError { message } => format!("Could not save the AI cache: {}", message),
            SiteError::MissingConfigError { field } => {
                format!("Missing configuration value: {}", field)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SiteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_errors_are_critical() {
        let err = SiteError::CacheError {
            message: "disk full".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Cache);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.user_friendly_message().contains("disk full"));
    }

    #[test]
    fn test_upstream_error_is_network() {
        let err = SiteError::UpstreamError {
            status: 502,
            url: "https://api.github.com/users/octo/repos".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Network);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
    }
}
