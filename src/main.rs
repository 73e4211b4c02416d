use anyhow::Context;
use clap::Parser;
use repo_showcase::utils::error::ErrorSeverity;
use repo_showcase::utils::logger::{self, LogFormat};
use repo_showcase::utils::validation::Validate;
use repo_showcase::{ChatClient, CliConfig, GitHubClient, LocalStorage, SiteConfig, SiteEngine};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    logger::init_logger(LogFormat::from_json_flag(cli.json_logs), cli.verbose);

    tracing::info!("Starting repo-showcase");

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            SiteConfig::from_file(path)
                .with_context(|| format!("failed to load config file '{}'", path))?
        }
        None => SiteConfig::default(),
    };
    cli.apply_overrides(&mut config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }
    if cli.verbose {
        tracing::debug!("Effective config: {:?}", config);
    }

    let (cache_dir, _) = config.cache_location();
    let site_storage = LocalStorage::new(config.output.path.clone());
    let cache_storage = LocalStorage::new(cache_dir);
    let source = GitHubClient::new(
        config.github.api_base.clone(),
        config.site.account.clone(),
        config.github_token(),
        config.github.page_size,
    );
    let generator = ChatClient::new(config.llm.endpoint.clone(), config.llm_api_key());

    let engine = SiteEngine::new_with_monitoring(
        site_storage,
        cache_storage,
        source,
        generator,
        config,
        cli.monitor,
    );

    if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be generated or written");
        for planned in engine.plan().await {
            let state = if planned.metadata_cached {
                "cached"
            } else {
                "needs classification"
            };
            println!("{:<40} {}", planned.name, state);
        }
        return Ok(());
    }

    match engine.run().await {
        Ok(summary) => {
            println!(
                "✅ Site generated: {} project(s), {} skipped",
                summary.projects_rendered, summary.repositories_skipped
            );
            println!("📁 Output saved to: {}", summary.output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Site generation failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
