use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// One classified `uses:` occurrence, attributed to the workflow file it
/// was found in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionUsage {
    pub workflow_file: String,
    pub uses_reference: String,
    pub is_third_party: bool,
}

/// Accumulated inventory: organization -> repository -> usages in
/// encounter order. Sparse by construction; repositories (and therefore
/// organizations) contributing no references never appear.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct InventoryReport(BTreeMap<String, BTreeMap<String, Vec<ActionUsage>>>);

impl InventoryReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one repository's usages. Empty lists are dropped so the
    /// report stays sparse.
    pub fn record(&mut self, org: &str, repo: &str, entries: Vec<ActionUsage>) {
        if entries.is_empty() {
            return;
        }
        self.0
            .entry(org.to_string())
            .or_default()
            .insert(repo.to_string(), entries);
    }

    pub fn contains_org(&self, org: &str) -> bool {
        self.0.contains_key(org)
    }

    pub fn entries(&self, org: &str, repo: &str) -> Option<&[ActionUsage]> {
        self.0.get(org)?.get(repo).map(Vec::as_slice)
    }

    pub fn third_party_count(&self) -> usize {
        self.0
            .values()
            .flat_map(|repos| repos.values())
            .flatten()
            .filter(|entry| entry.is_third_party)
            .count()
    }

    /// Write the full nested structure as the run's report artifact.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Console summary of everything flagged third-party.
    pub fn print_summary(&self) {
        println!("\n=== Third-Party Actions Found ===");
        let mut count = 0;
        for (org, repos) in &self.0 {
            for (repo, entries) in repos {
                for entry in entries.iter().filter(|e| e.is_third_party) {
                    println!(
                        "{}/{}: {} (file: {})",
                        org, repo, entry.uses_reference, entry.workflow_file
                    );
                    count += 1;
                }
            }
        }
        println!("Total third-party references found: {}", count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usage(file: &str, reference: &str, third_party: bool) -> ActionUsage {
        ActionUsage {
            workflow_file: file.to_string(),
            uses_reference: reference.to_string(),
            is_third_party: third_party,
        }
    }

    #[test]
    fn empty_entry_lists_are_omitted() {
        let mut report = InventoryReport::new();
        report.record("acme", "empty-repo", Vec::new());
        assert!(!report.contains_org("acme"));
    }

    #[test]
    fn entries_keep_encounter_order() {
        let mut report = InventoryReport::new();
        report.record(
            "acme",
            "api",
            vec![
                usage("ci.yml", "actions/checkout@v3", false),
                usage("ci.yml", "randomuser/cool-action@v1", true),
            ],
        );

        let entries = report.entries("acme", "api").unwrap();
        assert_eq!(entries[0].uses_reference, "actions/checkout@v3");
        assert_eq!(entries[1].uses_reference, "randomuser/cool-action@v1");
        assert_eq!(report.third_party_count(), 1);
    }

    #[test]
    fn save_writes_nested_json() {
        let mut report = InventoryReport::new();
        report.record(
            "acme",
            "api",
            vec![usage("ci.yml", "randomuser/cool-action@v1", true)],
        );

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inventory.json");
        report.save(&path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            parsed["acme"]["api"][0]["uses_reference"],
            "randomuser/cool-action@v1"
        );
        assert_eq!(parsed["acme"]["api"][0]["is_third_party"], true);
    }
}
