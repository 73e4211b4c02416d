use crate::core::cache::{CacheKey, CacheStore};
use crate::core::response::extract_json_object;
use crate::core::TextGenerator;
use crate::domain::model::{Category, ProjectMetadata, Repository};

/// Turns a repository into validated [`ProjectMetadata`].
///
/// `classify` never fails: service errors, empty answers and malformed JSON
/// all end in [`ProjectMetadata::fallback`].
pub struct MetadataClassifier<'a, G: TextGenerator> {
    generator: &'a G,
    model: &'a str,
}

impl<'a, G: TextGenerator> MetadataClassifier<'a, G> {
    pub fn new(generator: &'a G, model: &'a str) -> Self {
        Self { generator, model }
    }

    pub async fn classify(&self, cache: &mut CacheStore, repository: &Repository) -> ProjectMetadata {
        let key = CacheKey::RepoMetadata(repository.id);
        if let Some(cached) = cache.get_as::<ProjectMetadata>(&key) {
            tracing::debug!("Metadata cache hit for {}", repository.name);
            return cached;
        }

        let prompt = build_prompt(repository);
        let metadata = match self.generator.generate(self.model, &prompt).await {
            Ok(answer) if !answer.trim().is_empty() => parse_metadata(&answer, repository),
            Ok(_) => {
                tracing::warn!("⚠️ Empty classification for {}, using fallback", repository.name);
                ProjectMetadata::fallback(repository)
            }
            Err(e) => {
                tracing::warn!(
                    "⚠️ Classification failed for {}: {}. Using fallback",
                    repository.name,
                    e
                );
                ProjectMetadata::fallback(repository)
            }
        };

        if let Err(e) = cache.set_as(&key, &metadata) {
            tracing::warn!("Could not cache metadata for {}: {}", repository.name, e);
        }
        metadata
    }
}

fn build_prompt(repository: &Repository) -> String {
    let vocabulary: Vec<&str> = Category::ALL.iter().map(Category::as_str).collect();
    format!(
        "Classify the repository below for a project catalog.\n\
         Name: {}\n\
         Description: {}\n\
         Primary language: {}\n\n\
         Answer with a single JSON object and no other text:\n\
         {{\"tags\": [...], \"description\": \"...\"}}\n\
         \"tags\" must contain one or more of: {}.\n\
         \"description\" must be one short sentence.",
        repository.name,
        repository.description.as_deref().unwrap_or("(none)"),
        repository.language.as_deref().unwrap_or("unknown"),
        vocabulary.join(", "),
    )
}

/// Parses and validates a raw answer. Total: every input yields valid metadata.
pub fn parse_metadata(answer: &str, repository: &Repository) -> ProjectMetadata {
    let parsed = extract_json_object(answer)
        .and_then(|object| serde_json::from_str::<serde_json::Value>(object).ok());

    let Some(serde_json::Value::Object(fields)) = parsed else {
        tracing::warn!(
            "⚠️ Unparsable classification for {}, using fallback",
            repository.name
        );
        return ProjectMetadata::fallback(repository);
    };

    ProjectMetadata {
        tags: validate_tags(fields.get("tags")),
        description: validate_description(fields.get("description"), repository),
    }
}

/// 只保留詞彙表內的標籤；全部被過濾掉時回傳預設標籤
pub fn validate_tags(raw: Option<&serde_json::Value>) -> Vec<Category> {
    let mut tags: Vec<Category> = Vec::new();

    if let Some(serde_json::Value::Array(items)) = raw {
        for category in items.iter().filter_map(|v| v.as_str()).filter_map(Category::parse) {
            if !tags.contains(&category) {
                tags.push(category);
            }
        }
    }

    if tags.is_empty() {
        tags.push(Category::DEFAULT);
    }
    tags
}

fn validate_description(raw: Option<&serde_json::Value>, repository: &Repository) -> String {
    raw.and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| repository.description_or_name().to_string())
}
