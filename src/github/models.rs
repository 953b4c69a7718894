use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Organization {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub name: String,
}

/// One entry of a contents-API directory listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub entry_type: String,
    /// Null for submodules and symlinks.
    pub download_url: Option<String>,
}

/// A workflow definition file resolved from a directory listing.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowFile {
    pub name: String,
    pub path: String,
    pub download_url: String,
}

/// The `/rate_limit` endpoint nests the core quota under `rate`.
#[derive(Debug, Deserialize)]
pub struct RateLimitResponse {
    pub rate: RateLimit,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RateLimit {
    pub remaining: u64,
    /// Epoch seconds at which the quota window resets.
    pub reset: u64,
}
