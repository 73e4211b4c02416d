use crate::domain::model::{Release, Repository};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn account(&self) -> &str;
    fn site_title(&self) -> &str;
    fn model(&self) -> &str;
    fn html_base(&self) -> &str;
    fn output_path(&self) -> &str;
    fn cache_file(&self) -> &str;
    fn archive(&self) -> bool;
}

/// Repository and release listing service.
#[async_trait]
pub trait RepositorySource: Send + Sync {
    async fn list_repositories(&self) -> Result<Vec<Repository>>;
    async fn list_releases(&self, repository: &Repository) -> Result<Vec<Release>>;
}

/// Generative-text service. Any `Err` or blank answer counts as "no content".
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String>;
}
