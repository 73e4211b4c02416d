use crate::core::RepositorySource;
use crate::domain::model::{Release, Repository};
use crate::utils::error::{Result, SiteError};
use reqwest::Client;

const USER_AGENT: &str = "repo-showcase";

/// GitHub REST client for one account. Fetches a single page per listing.
pub struct GitHubClient {
    client: Client,
    api_base: String,
    account: String,
    token: Option<String>,
    page_size: u32,
}

impl GitHubClient {
    pub fn new(
        api_base: impl Into<String>,
        account: impl Into<String>,
        token: Option<String>,
        page_size: u32,
    ) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            account: account.into(),
            token,
            page_size,
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let mut request = self
            .client
            .get(url)
            .query(query)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", USER_AGENT);

        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        tracing::debug!("GET {}", url);
        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("GitHub response status: {}", status);

        if !status.is_success() {
            return Err(SiteError::UpstreamError {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait::async_trait]
impl RepositorySource for GitHubClient {
    async fn list_repositories(&self) -> Result<Vec<Repository>> {
        let url = format!("{}/users/{}/repos", self.api_base, self.account);
        self.get_json(
            &url,
            &[
                ("per_page", self.page_size.to_string()),
                ("sort", "updated".to_string()),
                ("type", "owner".to_string()),
            ],
        )
        .await
    }

    async fn list_releases(&self, repository: &Repository) -> Result<Vec<Release>> {
        let url = format!(
            "{}/repos/{}/{}/releases",
            self.api_base, self.account, repository.name
        );
        self.get_json(&url, &[("per_page", self.page_size.to_string())])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn repo(name: &str) -> Repository {
        Repository {
            id: 1,
            name: name.to_string(),
            description: None,
            language: None,
            stars: 0,
            url: format!("https://github.com/octo/{}", name),
            fork: false,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_list_repositories_sends_query_and_token() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/users/octo/repos")
                .query_param("per_page", "100")
                .query_param("sort", "updated")
                .header("authorization", "Bearer secret-token");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!([
                    {
                        "id": 1, "name": "beta", "description": "Beta tool",
                        "language": "Rust", "stargazers_count": 4,
                        "html_url": "https://github.com/octo/beta", "fork": false
                    },
                    {
                        "id": 2, "name": "alpha", "description": null,
                        "language": null, "stargazers_count": 0,
                        "html_url": "https://github.com/octo/alpha", "fork": true
                    }
                ]));
        });

        let client = GitHubClient::new(server.base_url(), "octo", Some("secret-token".into()), 100);
        let repositories = client.list_repositories().await.unwrap();

        mock.assert();
        assert_eq!(repositories.len(), 2);
        assert_eq!(repositories[0].name, "beta");
        assert_eq!(repositories[0].stars, 4);
        assert!(repositories[1].fork);
    }

    #[tokio::test]
    async fn test_list_releases_parses_release_fields() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/repos/octo/beta/releases");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!([
                    {
                        "id": 77, "tag_name": "v1.0.0",
                        "published_at": "2024-02-03T04:05:06Z",
                        "body": "First stable release"
                    }
                ]));
        });

        let client = GitHubClient::new(server.base_url(), "octo", None, 100);
        let releases = client.list_releases(&repo("beta")).await.unwrap();

        mock.assert();
        assert_eq!(releases.len(), 1);
        assert_eq!(releases[0].id, 77);
        assert_eq!(releases[0].version, "v1.0.0");
        assert_eq!(releases[0].body_text(), "First stable release");
        assert!(releases[0].published_at.is_some());
    }

    #[tokio::test]
    async fn test_error_status_is_upstream_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/repos/octo/beta/releases");
            then.status(404);
        });

        let client = GitHubClient::new(server.base_url(), "octo", None, 100);
        let err = client.list_releases(&repo("beta")).await.unwrap_err();

        assert!(matches!(err, SiteError::UpstreamError { status: 404, .. }));
    }
}
