use std::time::Duration;

use rand::Rng;

use crate::filter::SourceFilter;

/// Reconnect schedule for the push channel.
///
/// Exponential backoff from `initial_delay`, capped at `max_delay`, with
/// proportional jitter so a fleet of viewers does not reconnect in
/// lockstep. After `max_attempts` consecutive failures the subscription
/// gives up; the device poll keeps running regardless.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub max_attempts: u32,
    pub jitter_ratio: f64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(5),
            max_delay: Duration::from_secs(60),
            max_attempts: 10,
            jitter_ratio: 0.2,
        }
    }
}

impl ReconnectPolicy {
    /// Delay before retry number `attempt` (1-based), jitter applied.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let base = self
            .initial_delay
            .saturating_mul(2u32.saturating_pow(exponent))
            .min(self.max_delay);

        let jitter_span = base.as_secs_f64() * self.jitter_ratio;
        if jitter_span <= f64::EPSILON {
            return base;
        }
        let offset = rand::rng().random_range(-jitter_span..=jitter_span);
        Duration::from_secs_f64((base.as_secs_f64() + offset).max(0.0))
    }

    pub fn exhausted(&self, attempt: u32) -> bool {
        attempt > self.max_attempts
    }
}

/// Connection settings for a viewer.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// Server base URL, e.g. `http://localhost:3001`.
    pub server_url: String,
    /// Interval of the device list poll that backs up the push channel.
    pub poll_interval: Duration,
    pub reconnect: ReconnectPolicy,
    pub filter: SourceFilter,
}

impl ViewerConfig {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            poll_interval: Duration::from_secs(30),
            reconnect: ReconnectPolicy::default(),
            filter: SourceFilter::default(),
        }
    }
}
