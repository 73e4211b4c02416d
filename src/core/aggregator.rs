use crate::core::cache::CacheStore;
use crate::core::classifier::MetadataClassifier;
use crate::core::links::{page_slug, ReleaseLinks};
use crate::core::narrator::ChangelogNarrator;
use crate::core::{RepositorySource, TextGenerator};
use crate::domain::model::{BlogPost, LatestRelease, Project, Repository};
use crate::utils::error::Result;
use std::collections::HashSet;

/// Drives classification and narration for every repository, one at a time.
pub struct ProjectAggregator<'a, R: RepositorySource, G: TextGenerator> {
    source: &'a R,
    classifier: MetadataClassifier<'a, G>,
    narrator: ChangelogNarrator<'a, G>,
    links: ReleaseLinks,
}

impl<'a, R: RepositorySource, G: TextGenerator> ProjectAggregator<'a, R, G> {
    pub fn new(source: &'a R, generator: &'a G, model: &'a str, links: ReleaseLinks) -> Self {
        Self {
            source,
            classifier: MetadataClassifier::new(generator, model),
            narrator: ChangelogNarrator::new(generator, model),
            links,
        }
    }

    /// Projects come back in listing order. Forks are dropped; a repository
    /// whose processing fails is logged and skipped. Every project gets a
    /// distinct page slug.
    pub async fn build(&self, cache: &mut CacheStore, repositories: &[Repository]) -> Vec<Project> {
        let mut projects = Vec::new();
        let mut used_slugs: HashSet<String> = HashSet::new();

        for repository in repositories {
            if repository.fork {
                tracing::debug!("Skipping fork {}", repository.name);
                continue;
            }

            match self.build_project(cache, repository).await {
                Ok(mut project) => {
                    // 名稱只差在大小寫或符號時，用 id 區分頁面檔名
                    if !used_slugs.insert(project.slug.clone()) {
                        let unique = format!("{}-{}", project.slug, repository.id);
                        tracing::debug!(
                            "Page name {} already taken, {} uses {}",
                            project.slug,
                            repository.name,
                            unique
                        );
                        used_slugs.insert(unique.clone());
                        project.slug = unique;
                    }
                    tracing::info!(
                        "✅ {} [{}] with {} update(s)",
                        repository.name,
                        project
                            .metadata
                            .tags
                            .iter()
                            .map(|t| t.as_str())
                            .collect::<Vec<_>>()
                            .join(", "),
                        project.posts.len()
                    );
                    projects.push(project);
                }
                Err(e) => {
                    tracing::warn!("⏭️ Skipping repository {}: {}", repository.name, e);
                }
            }
        }

        projects
    }

    async fn build_project(&self, cache: &mut CacheStore, repository: &Repository) -> Result<Project> {
        let slug = page_slug(&repository.name)?;

        let releases = match self.source.list_releases(repository).await {
            Ok(releases) => releases,
            Err(e) => {
                tracing::warn!(
                    "⚠️ Could not fetch releases for {}: {}. Continuing without releases",
                    repository.name,
                    e
                );
                Vec::new()
            }
        };

        let metadata = self.classifier.classify(cache, repository).await;

        let mut posts = Vec::new();
        for release in &releases {
            let download_url = self.links.download_url(&repository.name, &release.version)?;
            if let Some(html) = self.narrator.narrate(cache, repository, release).await {
                posts.push(BlogPost {
                    version: release.version.clone(),
                    published_at: release.published_at,
                    html,
                    download_url,
                });
            }
        }

        // 最新版本資訊不論敘述是否成功都要記錄
        let latest_release = releases
            .first()
            .map(|latest| -> Result<LatestRelease> {
                Ok(LatestRelease {
                    version: latest.version.clone(),
                    download_url: self.links.download_url(&repository.name, &latest.version)?,
                })
            })
            .transpose()?;

        Ok(Project {
            repository: repository.clone(),
            slug,
            latest_release,
            metadata,
            posts,
        })
    }
}
