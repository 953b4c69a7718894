pub mod client;
pub mod models;
pub mod rate_limit;

use async_trait::async_trait;
use thiserror::Error;

pub use client::GitHubClient;
pub use models::*;
pub use rate_limit::{with_retry, RequestGate, RetryPolicy, ThrottleConfig};

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("resource not found")]
    NotFound,

    #[error("rate limited ({status}): {body}")]
    RateLimited { status: u16, body: String },

    #[error("GitHub API error ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl GitHubError {
    /// Throttling is flow control, not a failure: callers back off and
    /// retry instead of discarding the current scope.
    pub fn is_throttle(&self) -> bool {
        matches!(self, GitHubError::RateLimited { .. })
    }
}

/// Remote surface the crawl depends on, one method per endpoint touched
/// during an inventory run. `GitHubClient` is the live implementation;
/// tests substitute fakes.
#[async_trait]
pub trait GitHubApi {
    /// Current rate-limit quota for the authenticated identity.
    async fn rate_limit(&self) -> Result<RateLimit, GitHubError>;

    /// Organizations visible to the authenticated identity.
    async fn list_user_orgs(&self) -> Result<Vec<Organization>, GitHubError>;

    /// One page of an organization's repositories (1-based page number).
    async fn list_org_repos(&self, org: &str, page: u32) -> Result<Vec<Repository>, GitHubError>;

    /// Directory listing of `.github/workflows` for one repository.
    async fn list_workflow_dir(
        &self,
        org: &str,
        repo: &str,
    ) -> Result<Vec<ContentEntry>, GitHubError>;

    /// Raw file content by download URL.
    async fn fetch_raw(&self, url: &str) -> Result<String, GitHubError>;
}
