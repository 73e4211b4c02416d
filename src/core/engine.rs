use crate::core::aggregator::ProjectAggregator;
use crate::core::cache::{CacheKey, CacheStore};
use crate::core::links::ReleaseLinks;
use crate::core::site::assemble;
use crate::core::{ConfigProvider, RepositorySource, Storage, TextGenerator};
use crate::domain::model::{Document, ProjectMetadata, Repository};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use std::io::Write;
use zip::write::{SimpleFileOptions, ZipWriter};

pub const ARCHIVE_NAME: &str = "site.zip";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub output_path: String,
    pub repositories_listed: usize,
    pub projects_rendered: usize,
    pub repositories_skipped: usize,
    pub documents_written: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedRepository {
    pub name: String,
    pub metadata_cached: bool,
}

/// Runs one generation pass: load cache, list, enrich, persist, render, write.
pub struct SiteEngine<S: Storage, R: RepositorySource, G: TextGenerator, C: ConfigProvider> {
    site_storage: S,
    cache_storage: S,
    source: R,
    generator: G,
    config: C,
    monitor: SystemMonitor,
}

impl<S, R, G, C> SiteEngine<S, R, G, C>
where
    S: Storage,
    R: RepositorySource,
    G: TextGenerator,
    C: ConfigProvider,
{
    pub fn new(site_storage: S, cache_storage: S, source: R, generator: G, config: C) -> Self {
        Self::new_with_monitoring(site_storage, cache_storage, source, generator, config, false)
    }

    pub fn new_with_monitoring(
        site_storage: S,
        cache_storage: S,
        source: R,
        generator: G,
        config: C,
        monitor_enabled: bool,
    ) -> Self {
        Self {
            site_storage,
            cache_storage,
            source,
            generator,
            config,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        tracing::info!("🚀 Building site for {}", self.config.account());

        let mut cache = CacheStore::load_all(&self.cache_storage, self.config.cache_file()).await;

        let repositories = self.list_repositories().await;
        let candidates = repositories.iter().filter(|r| !r.fork).count();
        self.monitor.log_stats("list");

        let links = ReleaseLinks::new(self.config.html_base(), self.config.account());
        let aggregator =
            ProjectAggregator::new(&self.source, &self.generator, self.config.model(), links);
        let projects = aggregator.build(&mut cache, &repositories).await;
        self.monitor.log_stats("enrich");

        // 先存快取再寫頁面，頁面寫入失敗也不會遺失已產生的內容
        if cache.is_dirty() {
            cache
                .persist_all(&self.cache_storage, self.config.cache_file())
                .await?;
            tracing::info!("💾 Cache saved ({} entries)", cache.len());
        }

        let documents = assemble(&projects, self.config.site_title(), chrono::Utc::now());
        let mut written = Vec::with_capacity(documents.len() + 1);
        for document in &documents {
            self.site_storage
                .write_file(&document.path, document.content.as_bytes())
                .await?;
            written.push(document.path.clone());
        }

        if self.config.archive() {
            let archive = build_archive(&documents)?;
            self.site_storage.write_file(ARCHIVE_NAME, &archive).await?;
            written.push(ARCHIVE_NAME.to_string());
        }
        self.monitor.log_stats("render");
        self.monitor.log_final_stats();

        let summary = RunSummary {
            output_path: self.config.output_path().to_string(),
            repositories_listed: repositories.len(),
            projects_rendered: projects.len(),
            repositories_skipped: candidates - projects.len(),
            documents_written: written,
        };
        tracing::info!(
            "📄 {} project(s), {} skipped, {} document(s)",
            summary.projects_rendered,
            summary.repositories_skipped,
            summary.documents_written.len()
        );
        Ok(summary)
    }

    /// Lists what a run would classify without calling the generative service.
    pub async fn plan(&self) -> Vec<PlannedRepository> {
        let cache = CacheStore::load_all(&self.cache_storage, self.config.cache_file()).await;
        self.list_repositories()
            .await
            .into_iter()
            .filter(|r| !r.fork)
            .map(|r| PlannedRepository {
                metadata_cached: cache
                    .get_as::<ProjectMetadata>(&CacheKey::RepoMetadata(r.id))
                    .is_some(),
                name: r.name,
            })
            .collect()
    }

    async fn list_repositories(&self) -> Vec<Repository> {
        match self.source.list_repositories().await {
            Ok(repositories) => {
                tracing::info!("📋 Listed {} repositories", repositories.len());
                repositories
            }
            Err(e) => {
                tracing::warn!("⚠️ Repository listing failed: {}. Rendering an empty catalog", e);
                Vec::new()
            }
        }
    }
}

fn build_archive(documents: &[Document]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for document in documents {
        zip.start_file(document.path.as_str(), SimpleFileOptions::default())?;
        zip.write_all(document.content.as_bytes())?;
    }
    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}
