use serde_yaml::Value;
use tracing::warn;

/// Extract every `uses:` reference from a workflow document, preserving
/// job order and step order. Nothing is deduplicated; repeated references
/// are repeated results.
///
/// Malformed or oddly-shaped documents yield an empty list, never an
/// error. A workflow that fails to parse is worth a warning but must not
/// stop the crawl.
pub fn extract_uses(content: &str) -> Vec<String> {
    let doc: Value = match serde_yaml::from_str(content) {
        Ok(doc) => doc,
        Err(e) => {
            warn!("could not parse workflow YAML: {}", e);
            return Vec::new();
        }
    };

    if !doc.is_mapping() {
        return Vec::new();
    }

    // jobs:
    //   some_job:
    //     steps:
    //       - uses: ...
    //       - run: ...
    let mut references = Vec::new();
    let jobs = doc.get("jobs").and_then(Value::as_mapping);
    for (_job_name, job) in jobs.into_iter().flatten() {
        let steps = job.get("steps").and_then(Value::as_sequence);
        for step in steps.into_iter().flatten() {
            if let Some(uses) = step.get("uses").and_then(Value::as_str) {
                references.push(uses.to_string());
            }
        }
    }
    references
}
