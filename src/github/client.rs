use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};

use super::models::*;
use super::{GitHubApi, GitHubError};

const USER_AGENT: &str = "actions-inventory";
const PER_PAGE: u32 = 100;

/// Thin GitHub REST client. Every request carries the bearer token and the
/// base URL injected at construction, so an alternate (or fake) API host
/// only needs a different `Config`.
pub struct GitHubClient {
    client: Client,
    base_url: String,
    token: String,
}

impl GitHubClient {
    pub fn new(base_url: String, token: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to create HTTP client"),
            base_url,
            token,
        }
    }

    fn get(&self, url: &str) -> RequestBuilder {
        self.client
            .get(url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github+json")
    }

    async fn error_for(response: Response) -> GitHubError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        match status {
            StatusCode::NOT_FOUND => GitHubError::NotFound,
            StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => GitHubError::RateLimited {
                status: status.as_u16(),
                body,
            },
            _ => GitHubError::Status {
                status: status.as_u16(),
                body,
            },
        }
    }
}

#[async_trait]
impl GitHubApi for GitHubClient {
    async fn rate_limit(&self) -> Result<RateLimit, GitHubError> {
        let url = format!("{}/rate_limit", self.base_url);
        let response = self.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }

        let body: RateLimitResponse = response.json().await?;
        Ok(body.rate)
    }

    async fn list_user_orgs(&self) -> Result<Vec<Organization>, GitHubError> {
        let url = format!("{}/user/orgs", self.base_url);
        let response = self.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }

        Ok(response.json().await?)
    }

    async fn list_org_repos(&self, org: &str, page: u32) -> Result<Vec<Repository>, GitHubError> {
        let url = format!("{}/orgs/{}/repos", self.base_url, org);
        let response = self
            .get(&url)
            .query(&[
                ("type", "all".to_string()),
                ("per_page", PER_PAGE.to_string()),
                ("page", page.to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }

        Ok(response.json().await?)
    }

    async fn list_workflow_dir(
        &self,
        org: &str,
        repo: &str,
    ) -> Result<Vec<ContentEntry>, GitHubError> {
        let url = format!(
            "{}/repos/{}/{}/contents/.github/workflows",
            self.base_url, org, repo
        );
        let response = self.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }

        // The contents API returns a single object when the path resolves to
        // a file rather than a directory; treat that as no workflows.
        let body: serde_json::Value = response.json().await?;
        match body {
            serde_json::Value::Array(items) => Ok(items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect()),
            _ => Ok(Vec::new()),
        }
    }

    async fn fetch_raw(&self, url: &str) -> Result<String, GitHubError> {
        let response = self.get(url).send().await?;

        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }

        Ok(response.text().await?)
    }
}
