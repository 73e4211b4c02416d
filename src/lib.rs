pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{ChatClient, GitHubClient};
pub use config::{cli::LocalStorage, SiteConfig};
pub use self::core::engine::{RunSummary, SiteEngine};
pub use utils::error::{Result, SiteError};
