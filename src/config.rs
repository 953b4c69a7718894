use std::env;
use std::path::PathBuf;

use crate::github::{RetryPolicy, ThrottleConfig};

pub const DEFAULT_API_BASE: &str = "https://api.github.com";

const ORG_CACHE_FILE: &str = "github_orgs.json";
const REPORT_FILE: &str = "third_party_actions_inventory.json";

/// Runtime configuration, resolved once in `main` and injected into the
/// components that need it.
#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    pub api_base: String,
    pub org_cache_path: PathBuf,
    pub report_path: PathBuf,
    pub throttle: ThrottleConfig,
    pub retry: RetryPolicy,
}

impl Config {
    /// Load configuration from environment variables. `GITHUB_TOKEN` is
    /// required; `GITHUB_ENTERPRISE` overrides the public API base URL.
    pub fn from_env() -> Result<Self, String> {
        let token = env::var("GITHUB_TOKEN")
            .map_err(|_| "GITHUB_TOKEN not set. Please define it in your .env or environment")?;
        let api_base = env::var("GITHUB_ENTERPRISE")
            .unwrap_or_else(|_| DEFAULT_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            token,
            api_base,
            org_cache_path: PathBuf::from(ORG_CACHE_FILE),
            report_path: PathBuf::from(REPORT_FILE),
            throttle: ThrottleConfig::default(),
            retry: RetryPolicy::default(),
        })
    }
}
