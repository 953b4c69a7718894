use std::collections::HashSet;

/// Decide whether an action reference points outside the crawled
/// organizations. Pure and total: every input gets an answer, and the
/// unparseable default to first-party so they are never flagged.
///
/// `own_orgs` must contain lowercased organization names.
pub fn is_third_party(reference: &str, own_orgs: &HashSet<String>) -> bool {
    let reference = reference.trim().to_lowercase();

    // GitHub-maintained namespace, excluded by policy.
    if reference.starts_with("actions/") {
        return false;
    }

    // <owner>/<repo>@<version> -> owner
    let before_version = reference.split('@').next().unwrap_or("");
    let owner = before_version.split('/').next().unwrap_or("");
    if owner.is_empty() {
        return false;
    }

    // Container-image references are not repository-owner references.
    if owner == "docker" {
        return false;
    }

    !own_orgs.contains(owner)
}
