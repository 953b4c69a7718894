mod config;
mod crawler;
mod github;
mod inventory;
mod orgs;
mod workflow;

use anyhow::{anyhow, bail, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Config;
use crawler::Crawler;
use github::{GitHubClient, RequestGate};
use orgs::OrgRegistry;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow!(e))?;
    info!(
        "Starting third-party actions inventory (API base: {})",
        config.api_base
    );

    let api = GitHubClient::new(config.api_base.clone(), config.token.clone());
    let mut gate = RequestGate::new(config.throttle.clone());

    let registry = OrgRegistry::new(config.org_cache_path.clone(), config.retry.clone());
    let orgs = registry.load(&api, &mut gate).await;
    if orgs.is_empty() {
        bail!("no organizations found, nothing to crawl");
    }
    info!("crawling {} organizations", orgs.len());

    let mut crawler = Crawler::new(api, gate, config.retry.clone());
    let report = crawler.run(&orgs).await;

    report.save(&config.report_path)?;
    info!(
        "inventory complete, results saved to {}",
        config.report_path.display()
    );
    report.print_summary();

    Ok(())
}
