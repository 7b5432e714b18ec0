//! Runtime configuration with environment overrides.
//!
//! Every knob has a default; `MAILPROBE_*` variables override individual
//! values. Unset or empty variables keep the default.

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::probe::ProbeOptions;
use crate::scoring::ScoringTuning;
use crate::signals::SignalTuning;

pub const DEFAULT_BULK_CONCURRENCY: usize = 20;
/// Hard cap on concurrent sessions, whatever the caller asks for.
pub const MAX_BULK_CONCURRENCY: usize = 50;

pub const ENV_DNS_TIMEOUT_MS: &str = "MAILPROBE_DNS_TIMEOUT_MS";
pub const ENV_SMTP_TIMEOUT_MS: &str = "MAILPROBE_SMTP_TIMEOUT_MS";
pub const ENV_PROBE_PAUSE_MS: &str = "MAILPROBE_PROBE_PAUSE_MS";
pub const ENV_MX_CACHE_TTL_SECS: &str = "MAILPROBE_MX_CACHE_TTL_SECS";
pub const ENV_BULK_CONCURRENCY: &str = "MAILPROBE_BULK_CONCURRENCY";
pub const ENV_WORKER_THREADS: &str = "MAILPROBE_WORKER_THREADS";
pub const ENV_SMTP_PORT: &str = "MAILPROBE_SMTP_PORT";
pub const ENV_HELO_DOMAIN: &str = "MAILPROBE_HELO_DOMAIN";
pub const ENV_MAIL_FROM: &str = "MAILPROBE_MAIL_FROM";
pub const ENV_REQUEST_TIMEOUT_MS: &str = "MAILPROBE_REQUEST_TIMEOUT_MS";
pub const ENV_DELIVERABLE_THRESHOLD: &str = "MAILPROBE_DELIVERABLE_THRESHOLD";
pub const ENV_RISKY_THRESHOLD: &str = "MAILPROBE_RISKY_THRESHOLD";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
    #[error("{0}")]
    Inconsistent(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct VerifierOptions {
    pub dns_timeout: Duration,
    pub mx_cache_ttl: Duration,
    /// Default per-request concurrency for bulk verification.
    pub bulk_concurrency: usize,
    /// Size of the shared worker pool.
    pub worker_threads: usize,
    /// Deadline for a whole bulk request; `None` waits for every worker.
    pub request_timeout: Option<Duration>,
    /// Report known disposable domains without touching the network.
    pub reject_disposable: bool,
    pub probe: ProbeOptions,
    pub signals: SignalTuning,
    pub scoring: ScoringTuning,
}

impl Default for VerifierOptions {
    fn default() -> Self {
        Self {
            dns_timeout: Duration::from_secs(3),
            mx_cache_ttl: Duration::from_secs(300),
            bulk_concurrency: DEFAULT_BULK_CONCURRENCY,
            worker_threads: MAX_BULK_CONCURRENCY,
            request_timeout: None,
            reject_disposable: true,
            probe: ProbeOptions::default(),
            signals: SignalTuning::default(),
            scoring: ScoringTuning::default(),
        }
    }
}

impl VerifierOptions {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with whatever `lookup` returns for the
    /// `MAILPROBE_*` keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &'static str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut options = Self::default();

        if let Some(ms) = parse::<u64>(ENV_DNS_TIMEOUT_MS, get(ENV_DNS_TIMEOUT_MS))? {
            options.dns_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = parse::<u64>(ENV_SMTP_TIMEOUT_MS, get(ENV_SMTP_TIMEOUT_MS))? {
            options.probe.session_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = parse::<u64>(ENV_PROBE_PAUSE_MS, get(ENV_PROBE_PAUSE_MS))? {
            options.probe.pause = Duration::from_millis(ms);
        }
        if let Some(secs) = parse::<u64>(ENV_MX_CACHE_TTL_SECS, get(ENV_MX_CACHE_TTL_SECS))? {
            options.mx_cache_ttl = Duration::from_secs(secs);
        }
        if let Some(n) = parse::<usize>(ENV_BULK_CONCURRENCY, get(ENV_BULK_CONCURRENCY))? {
            options.bulk_concurrency = n;
        }
        if let Some(n) = parse::<usize>(ENV_WORKER_THREADS, get(ENV_WORKER_THREADS))? {
            options.worker_threads = n;
        }
        if let Some(port) = parse::<u16>(ENV_SMTP_PORT, get(ENV_SMTP_PORT))? {
            options.probe.port = port;
        }
        if let Some(helo) = get(ENV_HELO_DOMAIN) {
            options.probe.helo_domain = Some(helo.trim().to_string());
        }
        if let Some(sender) = get(ENV_MAIL_FROM) {
            options.probe.envelope_sender = Some(sender.trim().to_string());
        }
        if let Some(ms) = parse::<u64>(ENV_REQUEST_TIMEOUT_MS, get(ENV_REQUEST_TIMEOUT_MS))? {
            options.request_timeout = Some(Duration::from_millis(ms));
        }
        if let Some(score) =
            parse::<u8>(ENV_DELIVERABLE_THRESHOLD, get(ENV_DELIVERABLE_THRESHOLD))?
        {
            options.scoring.deliverable_threshold = score;
        }
        if let Some(score) = parse::<u8>(ENV_RISKY_THRESHOLD, get(ENV_RISKY_THRESHOLD))? {
            options.scoring.risky_threshold = score;
        }

        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_threads == 0 {
            return Err(ConfigError::InvalidValue {
                key: ENV_WORKER_THREADS,
                value: "0".to_string(),
            });
        }
        if self.scoring.risky_threshold > self.scoring.deliverable_threshold {
            return Err(ConfigError::Inconsistent(format!(
                "risky threshold {} above deliverable threshold {}",
                self.scoring.risky_threshold, self.scoring.deliverable_threshold
            )));
        }
        Ok(())
    }

    /// Per-request concurrency: the requested value (or the default),
    /// clamped to `1..=MAX_BULK_CONCURRENCY`.
    pub fn effective_concurrency(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.bulk_concurrency)
            .clamp(1, MAX_BULK_CONCURRENCY)
    }
}

fn parse<T: FromStr>(key: &'static str, raw: Option<String>) -> Result<Option<T>, ConfigError> {
    raw.map(|value| {
        value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue { key, value })
    })
    .transpose()
}
