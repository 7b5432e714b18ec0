use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::address::AddressKind;
use crate::probe::{Probe, duration_ms};
use crate::provider::ProviderId;
use crate::scoring::{Reason, Status, Verdict};
use crate::signals::Signals;

/// Outcome of one verification. Every field is always present; values that
/// do not apply are `None`/empty.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationResult {
    pub address: String,
    pub domain: Option<String>,
    pub mx_host: Option<String>,
    /// Up to three exchange hosts, most preferred first.
    pub mx_records: Vec<String>,
    pub provider: Option<ProviderId>,
    pub classification: Option<AddressKind>,
    pub status: Status,
    pub score: u8,
    pub reason: Reason,
    pub probes: Vec<Probe>,
    pub signals: Signals,
    pub verified_at: DateTime<Utc>,
    pub processing_time_ms: u64,
}

impl VerificationResult {
    pub(crate) fn pending(address: &str) -> Self {
        Self {
            address: address.to_string(),
            domain: domain_hint(address),
            mx_host: None,
            mx_records: Vec::new(),
            provider: None,
            classification: None,
            status: Status::Undeliverable,
            score: 0,
            reason: Reason::ProcessingError,
            probes: Vec::new(),
            signals: Signals::default(),
            verified_at: Utc::now(),
            processing_time_ms: 0,
        }
    }

    pub(crate) fn finish(mut self, verdict: Verdict, elapsed: Duration) -> Self {
        self.score = verdict.score;
        self.status = verdict.status;
        self.reason = verdict.reason;
        self.processing_time_ms = duration_ms(elapsed);
        self
    }

    /// Syntactically invalid input. No network work was done for it.
    pub fn invalid(address: &str, elapsed: Duration) -> Self {
        Self::pending(address).finish(
            Verdict {
                score: 0,
                status: Status::Invalid,
                reason: Reason::BadSyntax,
            },
            elapsed,
        )
    }

    /// Verification that could not complete (worker failure, deadline).
    pub fn failed(address: &str, reason: Reason, elapsed: Duration) -> Self {
        Self::pending(address).finish(
            Verdict {
                score: 0,
                status: Status::Undeliverable,
                reason,
            },
            elapsed,
        )
    }
}

fn domain_hint(address: &str) -> Option<String> {
    address
        .trim()
        .rsplit_once('@')
        .map(|(_, domain)| domain.to_ascii_lowercase())
        .filter(|domain| !domain.is_empty())
}

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub deliverable: usize,
    pub risky: usize,
    pub undeliverable: usize,
    pub invalid: usize,
}

impl StatusCounts {
    pub fn tally<'a>(results: impl IntoIterator<Item = &'a VerificationResult>) -> Self {
        let mut counts = Self::default();
        for result in results {
            match result.status {
                Status::Deliverable => counts.deliverable += 1,
                Status::Risky => counts.risky += 1,
                Status::Undeliverable => counts.undeliverable += 1,
                Status::Invalid => counts.invalid += 1,
            }
        }
        counts
    }
}

/// Aggregate of a bulk request. `results[i]` answers input `i`.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct BulkResult {
    pub total: usize,
    #[cfg_attr(feature = "with-serde", serde(flatten))]
    pub counts: StatusCounts,
    pub results: Vec<VerificationResult>,
    pub processing_time_ms: u64,
}

impl BulkResult {
    pub(crate) fn new(results: Vec<VerificationResult>, elapsed: Duration) -> Self {
        Self {
            total: results.len(),
            counts: StatusCounts::tally(&results),
            results,
            processing_time_ms: duration_ms(elapsed),
        }
    }
}
