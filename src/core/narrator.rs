use crate::core::cache::{CacheKey, CacheStore};
use crate::core::response::strip_code_fences;
use crate::core::TextGenerator;
use crate::domain::model::{Release, Repository};
use serde::{Deserialize, Serialize};

/// Cached shape of one narrated release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarratedPost {
    pub version: String,
    pub html: String,
}

/// Rewrites raw release notes into a short HTML narrative.
///
/// A failed or empty answer yields `None`; the release is then left off the
/// update page and nothing is cached for it, so the next run tries again.
pub struct ChangelogNarrator<'a, G: TextGenerator> {
    generator: &'a G,
    model: &'a str,
}

impl<'a, G: TextGenerator> ChangelogNarrator<'a, G> {
    pub fn new(generator: &'a G, model: &'a str) -> Self {
        Self { generator, model }
    }

    pub async fn narrate(
        &self,
        cache: &mut CacheStore,
        repository: &Repository,
        release: &Release,
    ) -> Option<String> {
        let key = CacheKey::ReleasePost(release.id);
        match cache.get_as::<NarratedPost>(&key) {
            Some(cached) if !cached.html.trim().is_empty() => {
                tracing::debug!("Post cache hit for {} {}", repository.name, release.version);
                return Some(cached.html);
            }
            Some(_) => {
                tracing::warn!(
                    "Cached post for {} {} is blank, narrating again",
                    repository.name,
                    release.version
                );
            }
            None => {}
        }

        if release.body_text().trim().is_empty() {
            tracing::debug!(
                "Release {} {} has no notes, nothing to narrate",
                repository.name,
                release.version
            );
            return None;
        }

        let prompt = build_prompt(repository, release);
        let answer = match self.generator.generate(self.model, &prompt).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!(
                    "⚠️ Narration failed for {} {}: {}. Skipping post",
                    repository.name,
                    release.version,
                    e
                );
                return None;
            }
        };

        let html = strip_code_fences(&answer);
        if html.is_empty() {
            tracing::warn!(
                "⚠️ Empty narration for {} {}. Skipping post",
                repository.name,
                release.version
            );
            return None;
        }

        let post = NarratedPost {
            version: release.version.clone(),
            html,
        };
        if let Err(e) = cache.set_as(&key, &post) {
            tracing::warn!("Could not cache post for {} {}: {}", repository.name, release.version, e);
        }
        Some(post.html)
    }
}

fn build_prompt(repository: &Repository, release: &Release) -> String {
    format!(
        "Rewrite the release notes below as a short factual update for the {} project page.\n\
         Version: {}\n\n\
         Release notes:\n{}\n\n\
         Reply with one HTML fragment made of <p> paragraphs only. \
         No greeting, no headings, no lists, no Markdown, no closing remarks.",
        repository.name,
        release.version,
        release.body_text().trim(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::classifier::test_support::ScriptedGenerator;

    fn repo() -> Repository {
        Repository {
            id: 1,
            name: "beta".to_string(),
            description: None,
            language: None,
            stars: 0,
            url: "https://github.com/octo/beta".to_string(),
            fork: false,
            updated_at: None,
        }
    }

    fn release(id: u64, version: &str, body: Option<&str>) -> Release {
        Release {
            id,
            version: version.to_string(),
            published_at: None,
            body: body.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_fenced_answer_is_unwrapped_and_cached() {
        let generator =
            ScriptedGenerator::new(vec![Some("```html\n<p>Adds a faster parser.</p>\n```\n")]);
        let narrator = ChangelogNarrator::new(&generator, "test-model");
        let mut cache = CacheStore::new();
        let rel = release(100, "v1.0.0", Some("- faster parser"));

        let html = narrator.narrate(&mut cache, &repo(), &rel).await;
        assert_eq!(html.as_deref(), Some("<p>Adds a faster parser.</p>"));

        let again = narrator.narrate(&mut cache, &repo(), &rel).await;
        assert_eq!(again, html);
        assert_eq!(generator.calls(), 1);

        let cached: NarratedPost = cache.get_as(&CacheKey::ReleasePost(100)).unwrap();
        assert_eq!(cached.version, "v1.0.0");
    }

    #[tokio::test]
    async fn test_failure_yields_none_and_caches_nothing() {
        let generator = ScriptedGenerator::new(vec![None]);
        let narrator = ChangelogNarrator::new(&generator, "test-model");
        let mut cache = CacheStore::new();

        let html = narrator
            .narrate(&mut cache, &repo(), &release(5, "v0.2.0", Some("fixes")))
            .await;

        assert!(html.is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_whitespace_answer_yields_none() {
        let generator = ScriptedGenerator::new(vec![Some("```\n   \n```")]);
        let narrator = ChangelogNarrator::new(&generator, "test-model");
        let mut cache = CacheStore::new();

        let html = narrator
            .narrate(&mut cache, &repo(), &release(6, "v0.3.0", Some("notes")))
            .await;
        assert!(html.is_none());
    }

    #[tokio::test]
    async fn test_blank_body_skips_the_service() {
        let generator = ScriptedGenerator::new(vec![Some("<p>unused</p>")]);
        let narrator = ChangelogNarrator::new(&generator, "test-model");
        let mut cache = CacheStore::new();

        let html = narrator
            .narrate(&mut cache, &repo(), &release(7, "v0.4.0", Some("  ")))
            .await;

        assert!(html.is_none());
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_cache_is_keyed_by_release_not_repository() {
        let generator = ScriptedGenerator::new(vec![]);
        let narrator = ChangelogNarrator::new(&generator, "test-model");
        let mut cache = CacheStore::new();
        cache
            .set_as(
                &CacheKey::ReleasePost(8),
                &NarratedPost {
                    version: "v2.0.0".to_string(),
                    html: "<p>Cached.</p>".to_string(),
                },
            )
            .unwrap();

        let mut other_repo = repo();
        other_repo.id = 999;
        other_repo.name = "renamed".to_string();

        let html = narrator
            .narrate(&mut cache, &other_repo, &release(8, "v2.0.0", Some("notes")))
            .await;
        assert_eq!(html.as_deref(), Some("<p>Cached.</p>"));
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_blank_cached_post_is_regenerated() {
        let generator = ScriptedGenerator::new(vec![Some("<p>Fresh.</p>")]);
        let narrator = ChangelogNarrator::new(&generator, "test-model");
        let mut cache = CacheStore::new();
        cache
            .set_as(
                &CacheKey::ReleasePost(9),
                &NarratedPost {
                    version: "v3.0.0".to_string(),
                    html: "  \n".to_string(),
                },
            )
            .unwrap();

        let html = narrator
            .narrate(&mut cache, &repo(), &release(9, "v3.0.0", Some("notes")))
            .await;

        assert_eq!(html.as_deref(), Some("<p>Fresh.</p>"));
        assert_eq!(generator.calls(), 1);
        let cached: NarratedPost = cache.get_as(&CacheKey::ReleasePost(9)).unwrap();
        assert_eq!(cached.html, "<p>Fresh.</p>");
    }
}
