use std::future::Future;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::{info, warn};

use super::{GitHubApi, GitHubError};

/// Soft-throttle tuning. The burst window is a guess at the API's
/// undocumented burst detection, not a contract; both knobs are meant to
/// be adjusted if the crawl still gets secondary-limited.
#[derive(Debug, Clone)]
pub struct ThrottleConfig {
    /// Requests allowed before a forced cooldown, regardless of quota.
    pub burst_window: u32,
    /// Length of that forced cooldown.
    pub burst_cooldown: Duration,
    /// Minimum sleep whenever the reported quota is exhausted.
    pub floor: Duration,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            burst_window: 9,
            burst_cooldown: Duration::from_secs(65),
            floor: Duration::from_secs(65),
        }
    }
}

/// Uniform retry policy for throttled calls: `max_attempts` total tries,
/// exponential backoff between them.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(65),
        }
    }
}

impl RetryPolicy {
    /// Backoff before retry number `attempt`: `base_delay * 2^attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }
}

/// Run a gate-enforced call, retrying throttled responses under the
/// uniform policy. Every network call site goes through here; anything
/// that is not a throttling signal is returned as-is for the caller's
/// isolation handling.
pub async fn with_retry<A, T, F, Fut>(
    gate: &mut RequestGate,
    api: &A,
    policy: &RetryPolicy,
    mut op: F,
) -> Result<T, GitHubError>
where
    A: GitHubApi,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, GitHubError>>,
{
    let mut attempt = 0;
    loop {
        gate.enforce(api).await;
        match op().await {
            Err(e) if e.is_throttle() && attempt + 1 < policy.max_attempts => {
                attempt += 1;
                let delay = policy.delay_for(attempt);
                warn!(
                    "throttled, retrying in {}s (attempt {}/{})",
                    delay.as_secs(),
                    attempt + 1,
                    policy.max_attempts
                );
                tokio::time::sleep(delay).await;
            }
            result => return result,
        }
    }
}

/// The single suspension point of the crawl. Quota is global, so a sleep
/// here stalls the whole pipeline by design; the crawl is strictly
/// sequential and nothing else is in flight.
pub struct RequestGate {
    config: ThrottleConfig,
    issued: u32,
}

impl RequestGate {
    pub fn new(config: ThrottleConfig) -> Self {
        Self { config, issued: 0 }
    }

    /// Query the current quota. Any failure reads as exhausted, so the
    /// caller errs toward sleeping rather than tripping the limit.
    pub async fn check<A: GitHubApi>(&self, api: &A) -> (u64, u64) {
        match api.rate_limit().await {
            Ok(rate) => (rate.remaining, rate.reset),
            Err(e) => {
                warn!("could not retrieve rate limit: {}", e);
                (0, 0)
            }
        }
    }

    /// Must run immediately before every throttleable remote call. Applies
    /// the burst cooldown first, then sleeps out the reset window when the
    /// reported quota is exhausted.
    pub async fn enforce<A: GitHubApi>(&mut self, api: &A) {
        if self.issued >= self.config.burst_window {
            info!(
                "issued {} requests, backing off for {}s",
                self.issued,
                self.config.burst_cooldown.as_secs()
            );
            tokio::time::sleep(self.config.burst_cooldown).await;
            self.issued = 0;
        }
        self.issued += 1;

        let (remaining, reset) = self.check(api).await;
        if remaining == 0 {
            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0);
            let wait = Duration::from_secs(reset.saturating_sub(now)).max(self.config.floor);
            info!("rate limit exhausted, sleeping for {}s", wait.as_secs());
            tokio::time::sleep(wait).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::{models::*, GitHubError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct QuotaApi {
        remaining: u64,
        calls: AtomicU32,
        fail: bool,
    }

    #[async_trait]
    impl GitHubApi for QuotaApi {
        async fn rate_limit(&self) -> Result<RateLimit, GitHubError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(GitHubError::Status {
                    status: 500,
                    body: String::new(),
                });
            }
            Ok(RateLimit {
                remaining: self.remaining,
                reset: 0,
            })
        }

        async fn list_user_orgs(&self) -> Result<Vec<Organization>, GitHubError> {
            unreachable!()
        }

        async fn list_org_repos(&self, _: &str, _: u32) -> Result<Vec<Repository>, GitHubError> {
            unreachable!()
        }

        async fn list_workflow_dir(
            &self,
            _: &str,
            _: &str,
        ) -> Result<Vec<ContentEntry>, GitHubError> {
            unreachable!()
        }

        async fn fetch_raw(&self, _: &str) -> Result<String, GitHubError> {
            unreachable!()
        }
    }

    fn instant_throttle() -> ThrottleConfig {
        ThrottleConfig {
            burst_window: 3,
            burst_cooldown: Duration::ZERO,
            floor: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn check_treats_failure_as_exhausted() {
        let api = QuotaApi {
            remaining: 5000,
            calls: AtomicU32::new(0),
            fail: true,
        };
        let gate = RequestGate::new(instant_throttle());
        assert_eq!(gate.check(&api).await, (0, 0));
    }

    #[tokio::test]
    async fn enforce_requeries_quota_every_call() {
        let api = QuotaApi {
            remaining: 5000,
            calls: AtomicU32::new(0),
            fail: false,
        };
        let mut gate = RequestGate::new(instant_throttle());
        for _ in 0..4 {
            gate.enforce(&api).await;
        }
        assert_eq!(api.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn burst_window_forces_cooldown_and_resets_counter() {
        let api = QuotaApi {
            remaining: 5000,
            calls: AtomicU32::new(0),
            fail: false,
        };
        let mut gate = RequestGate::new(ThrottleConfig {
            burst_window: 3,
            burst_cooldown: Duration::from_secs(65),
            floor: Duration::ZERO,
        });

        let start = tokio::time::Instant::now();
        for _ in 0..3 {
            gate.enforce(&api).await;
        }
        assert_eq!(start.elapsed(), Duration::ZERO);

        // Full window: the next call must sit out the cooldown even though
        // quota is plentiful.
        gate.enforce(&api).await;
        assert!(start.elapsed() >= Duration::from_secs(65));

        // Counter was reset by the cooldown; the call after it is free.
        let after_cooldown = tokio::time::Instant::now();
        gate.enforce(&api).await;
        assert_eq!(after_cooldown.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn enforce_sleeps_out_exhausted_quota() {
        let api = QuotaApi {
            remaining: 0,
            calls: AtomicU32::new(0),
            fail: false,
        };
        let mut gate = RequestGate::new(ThrottleConfig {
            floor: Duration::from_secs(65),
            ..instant_throttle()
        });
        let before = tokio::time::Instant::now();
        gate.enforce(&api).await;
        assert!(before.elapsed() >= Duration::from_secs(65));
    }

    #[test]
    fn retry_delay_doubles_per_attempt() {
        let policy = RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_secs(65),
        };
        assert_eq!(policy.delay_for(0), Duration::from_secs(65));
        assert_eq!(policy.delay_for(1), Duration::from_secs(130));
        assert_eq!(policy.delay_for(3), Duration::from_secs(520));
    }
}
