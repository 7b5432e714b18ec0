//! Orchestration: one address end to end, or many through a shared pool.
//!
//! A [`Verifier`] owns the MX cache, the session connector and a fixed set of
//! worker threads. It is `Send + Sync`; wrap it in an `Arc` to share it.

mod bulk;
mod pool;
mod types;

pub use pool::{PoolError, WorkerPool};
pub use types::{BulkResult, StatusCounts, VerificationResult};

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;

use crate::address::{ParsedAddress, classify_address, parse_address};
use crate::config::{ConfigError, VerifierOptions};
use crate::mx::{DnsError, MxCache, MxResolver};
use crate::probe::{SessionConnector, TcpConnector, probe};
use crate::provider::classify_provider;
use crate::scoring::{Reason, RuleTable, ScoringInput, Status, Verdict};
use crate::signals::analyze_with;

/// Exchange hosts kept on a result.
const REPORTED_MX_RECORDS: usize = 3;

#[derive(Debug, Error)]
pub enum VerifierError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Dns(#[from] DnsError),
    #[error(transparent)]
    Pool(#[from] PoolError),
}

pub(crate) struct Engine {
    options: VerifierOptions,
    resolver: MxResolver,
    connector: Box<dyn SessionConnector>,
    rules: RuleTable,
}

pub struct Verifier {
    engine: Arc<Engine>,
    pool: WorkerPool,
}

impl Verifier {
    /// Verifier backed by the system resolver and plain TCP sessions.
    pub fn new(options: VerifierOptions) -> Result<Self, VerifierError> {
        options.validate()?;
        let cache = Arc::new(MxCache::new(options.mx_cache_ttl));
        let resolver = MxResolver::system(options.dns_timeout, cache)?;
        Self::with_parts(options, resolver, Box::new(TcpConnector), RuleTable::default())
    }

    pub fn with_parts(
        options: VerifierOptions,
        resolver: MxResolver,
        connector: Box<dyn SessionConnector>,
        rules: RuleTable,
    ) -> Result<Self, VerifierError> {
        options.validate()?;
        let pool = WorkerPool::new(options.worker_threads)?;
        Ok(Self {
            engine: Arc::new(Engine {
                options,
                resolver,
                connector,
                rules,
            }),
            pool,
        })
    }

    pub fn options(&self) -> &VerifierOptions {
        &self.engine.options
    }

    pub fn cache(&self) -> &Arc<MxCache> {
        self.engine.resolver.cache()
    }

    /// Verify one address. Never fails: every problem ends up as a status
    /// and a reason on the result.
    pub fn verify_single(&self, address: &str) -> VerificationResult {
        let started = Instant::now();
        match parse_address(address) {
            Ok(parsed) => self.engine.verify_guarded(address, &parsed),
            Err(err) => {
                tracing::debug!(target: "verifier", %address, error = %err, "rejected by syntax check");
                VerificationResult::invalid(address, started.elapsed())
            }
        }
    }

    /// Exchange hosts for `domain`, through the shared cache.
    pub fn resolve_mx(&self, domain: &str) -> Result<Vec<String>, DnsError> {
        self.engine.resolver.resolve_mx(domain)
    }
}

impl Engine {
    /// [`Engine::verify_parsed`] with panics turned into a
    /// `processing_error` result.
    pub(crate) fn verify_guarded(&self, input: &str, parsed: &ParsedAddress) -> VerificationResult {
        let started = Instant::now();
        panic::catch_unwind(AssertUnwindSafe(|| self.verify_parsed(input, parsed)))
            .unwrap_or_else(|_| {
                tracing::error!(target: "verifier", address = %input, "verification panicked");
                VerificationResult::failed(input, Reason::ProcessingError, started.elapsed())
            })
    }

    fn verify_parsed(&self, input: &str, parsed: &ParsedAddress) -> VerificationResult {
        let started = Instant::now();
        let kind = classify_address(parsed);

        let mut result = VerificationResult::pending(input);
        result.domain = Some(parsed.domain.clone());
        result.classification = Some(kind);

        if kind.is_disposable && self.options.reject_disposable {
            tracing::debug!(target: "verifier", domain = %parsed.domain, "disposable domain");
            return result.finish(
                Verdict {
                    score: 0,
                    status: Status::Undeliverable,
                    reason: Reason::Disposable,
                },
                started.elapsed(),
            );
        }

        let hosts = match self.resolver.resolve_mx(&parsed.domain) {
            Ok(hosts) => hosts,
            Err(err) => {
                tracing::debug!(target: "verifier", domain = %parsed.domain, error = %err, "mx lookup failed");
                return result.finish(dns_verdict(&err), started.elapsed());
            }
        };
        let Some(mx_host) = hosts.first().cloned() else {
            let err = DnsError::NoMx {
                domain: parsed.domain.clone(),
            };
            return result.finish(dns_verdict(&err), started.elapsed());
        };

        let provider = classify_provider(&mx_host);
        let sequence = probe(
            self.connector.as_ref(),
            &self.options.probe,
            &mx_host,
            parsed,
        );
        let signals = analyze_with(&sequence, &self.options.signals);
        let verdict = self.rules.score(
            &ScoringInput {
                provider,
                sequence: &sequence,
                signals: &signals,
            },
            &self.options.scoring,
        );

        tracing::info!(
            target: "verifier",
            address = %parsed.address(),
            mx = %mx_host,
            provider = %provider,
            score = verdict.score,
            status = %verdict.status,
            reason = %verdict.reason,
            "verified"
        );

        result.mx_records = hosts.into_iter().take(REPORTED_MX_RECORDS).collect();
        result.mx_host = Some(mx_host);
        result.provider = Some(provider);
        result.probes = sequence.into_probes();
        result.signals = signals;
        result.finish(verdict, started.elapsed())
    }
}

/// Missing MX or domain is a definite answer; a resolver failure is not.
fn dns_verdict(err: &DnsError) -> Verdict {
    let score = match err {
        DnsError::NoMx { .. } | DnsError::NxDomain { .. } => 0,
        DnsError::Timeout { .. } | DnsError::ResolverInit { .. } | DnsError::Other { .. } => 30,
    };
    Verdict {
        score,
        status: Status::Undeliverable,
        reason: Reason::from(err),
    }
}
