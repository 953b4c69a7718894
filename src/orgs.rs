use std::path::PathBuf;

use tracing::{info, warn};

use crate::github::{with_retry, GitHubApi, RequestGate, RetryPolicy};

/// Source of truth for the organizations a run covers. Loaded exactly once
/// at startup; the resulting list is never re-fetched or mutated mid-run.
pub struct OrgRegistry {
    cache_path: PathBuf,
    retry: RetryPolicy,
}

impl OrgRegistry {
    pub fn new(cache_path: PathBuf, retry: RetryPolicy) -> Self {
        Self { cache_path, retry }
    }

    /// Load the cached organization list, falling back to a live fetch
    /// when the cache is missing or unreadable. An empty result is the
    /// caller's fatal precondition, not ours.
    pub async fn load<A: GitHubApi>(&self, api: &A, gate: &mut RequestGate) -> Vec<String> {
        match std::fs::read_to_string(&self.cache_path) {
            Ok(raw) => match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(orgs) => orgs,
                Err(e) => {
                    warn!("error loading {}: {}", self.cache_path.display(), e);
                    self.fetch(api, gate).await
                }
            },
            Err(_) => {
                warn!("org cache missing, fetching from the API");
                self.fetch(api, gate).await
            }
        }
    }

    /// Fetch organizations for the authenticated identity and persist them
    /// for later runs. Throttled responses are retried like every other
    /// call; only a genuine failure yields the empty list.
    async fn fetch<A: GitHubApi>(&self, api: &A, gate: &mut RequestGate) -> Vec<String> {
        let result = with_retry(gate, api, &self.retry, || api.list_user_orgs()).await;
        let orgs: Vec<String> = match result {
            Ok(orgs) => orgs.into_iter().map(|org| org.login).collect(),
            Err(e) => {
                warn!("error fetching orgs: {}", e);
                return Vec::new();
            }
        };

        match serde_json::to_string_pretty(&orgs) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&self.cache_path, json) {
                    warn!(
                        "could not persist org cache {}: {}",
                        self.cache_path.display(),
                        e
                    );
                } else {
                    info!("organizations saved to {}", self.cache_path.display());
                }
            }
            Err(e) => warn!("could not serialize org cache: {}", e),
        }
        orgs
    }
}
