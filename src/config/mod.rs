pub mod cli;
pub mod toml_config;

pub use toml_config::SiteConfig;

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "repo-showcase")]
#[command(about = "Generate a static catalog site for a GitHub account's repositories")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Account whose public repositories are listed
    #[arg(long)]
    pub account: Option<String>,

    #[arg(long)]
    pub output_path: Option<String>,

    #[arg(long)]
    pub cache_path: Option<String>,

    /// Model identifier sent to the chat-completions endpoint
    #[arg(long)]
    pub model: Option<String>,

    /// Also write site.zip with every generated page
    #[arg(long)]
    pub archive: bool,

    /// List repositories and cache state without generating anything
    #[arg(long)]
    pub dry_run: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 命令列參數覆蓋設定檔
    pub fn apply_overrides(&self, config: &mut SiteConfig) {
        if let Some(account) = &self.account {
            config.site.account = account.clone();
        }
        if let Some(path) = &self.output_path {
            config.output.path = path.clone();
        }
        if let Some(path) = &self.cache_path {
            config.output.cache_path = path.clone();
        }
        if let Some(model) = &self.model {
            config.llm.model = model.clone();
        }
        if self.archive {
            config.output.archive = true;
        }
    }
}
