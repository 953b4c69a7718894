use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::github::{
    with_retry, ContentEntry, GitHubApi, GitHubError, RequestGate, RetryPolicy, WorkflowFile,
};
use crate::inventory::{classifier, ActionUsage, InventoryReport};
use crate::workflow;

/// The multi-level traversal: orgs -> repos -> workflow files -> parsed
/// steps. Failures below organization resolution are isolated to their
/// scope; whatever was gathered before a failure is kept.
pub struct Crawler<A: GitHubApi> {
    api: A,
    gate: RequestGate,
    retry: RetryPolicy,
}

impl<A: GitHubApi> Crawler<A> {
    pub fn new(api: A, gate: RequestGate, retry: RetryPolicy) -> Self {
        Self { api, gate, retry }
    }

    /// Crawl every organization and accumulate the classified inventory.
    /// The org list is fixed for the whole run; its lowercased form is the
    /// first-party set for classification.
    pub async fn run(&mut self, orgs: &[String]) -> InventoryReport {
        let own_orgs: HashSet<String> = orgs.iter().map(|org| org.to_lowercase()).collect();
        let mut report = InventoryReport::new();

        for org in orgs {
            info!("fetching repositories for org: {}", org);
            let repos = self.fetch_all_repos(org).await;
            if repos.is_empty() {
                warn!("no repositories found in org {} or error occurred", org);
                continue;
            }

            for repo in &repos {
                let files = self.fetch_workflow_files(org, repo).await;
                let mut entries = Vec::new();
                for file in &files {
                    for reference in self.parse_workflow(&file.download_url).await {
                        let is_third_party = classifier::is_third_party(&reference, &own_orgs);
                        entries.push(ActionUsage {
                            workflow_file: file.path.clone(),
                            uses_reference: reference,
                            is_third_party,
                        });
                    }
                }
                report.record(org, repo, entries);
            }
        }
        report
    }

    /// Paginate one organization's repositories. A failed page ends the
    /// loop with whatever accumulated so far; the failure stays inside
    /// this org.
    async fn fetch_all_repos(&mut self, org: &str) -> Vec<String> {
        let mut repos = Vec::new();
        let mut page = 1;
        loop {
            let result = with_retry(&mut self.gate, &self.api, &self.retry, || {
                self.api.list_org_repos(org, page)
            })
            .await;

            let batch = match result {
                Ok(batch) => batch,
                Err(e) => {
                    warn!("error fetching repos for {}: {}", org, e);
                    break;
                }
            };
            if batch.is_empty() {
                break;
            }
            repos.extend(batch.into_iter().map(|repo| repo.name));
            page += 1;
        }
        repos
    }

    /// List one repository's workflow directory. No directory is the
    /// expected case, not an error.
    async fn fetch_workflow_files(&mut self, org: &str, repo: &str) -> Vec<WorkflowFile> {
        debug!("checking workflows in {}/{}", org, repo);
        let result = with_retry(&mut self.gate, &self.api, &self.retry, || {
            self.api.list_workflow_dir(org, repo)
        })
        .await;

        match result {
            Ok(entries) => entries
                .into_iter()
                .filter(|entry| entry.entry_type == "file")
                .filter_map(|entry| {
                    let ContentEntry {
                        name,
                        path,
                        download_url,
                        ..
                    } = entry;
                    download_url.map(|download_url| WorkflowFile {
                        name,
                        path,
                        download_url,
                    })
                })
                .collect(),
            Err(GitHubError::NotFound) => Vec::new(),
            Err(e) => {
                warn!("error fetching workflows for {}/{}: {}", org, repo, e);
                Vec::new()
            }
        }
    }

    /// Fetch and parse one workflow file into its `uses:` references. A
    /// file that cannot be fetched contributes nothing.
    async fn parse_workflow(&mut self, url: &str) -> Vec<String> {
        let result = with_retry(&mut self.gate, &self.api, &self.retry, || {
            self.api.fetch_raw(url)
        })
        .await;

        match result {
            Ok(content) => workflow::extract_uses(&content),
            Err(e) => {
                debug!("could not fetch workflow {}: {}", url, e);
                Vec::new()
            }
        }
    }
}
