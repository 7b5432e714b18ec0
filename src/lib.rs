#![forbid(unsafe_code)]
//! mailprobe_lib: deliverability estimate for e-mail addresses without
//! sending anything: syntax check, MX lookup, timed recipient probes and a
//! rule-based score.

pub mod address;
pub mod config;
pub mod mx;
pub mod probe;
pub mod provider;
pub mod scoring;
pub mod signals;
pub mod verifier;

pub use address::{AddressKind, EmailType, ParsedAddress, SyntaxError, parse_address};
pub use config::{ConfigError, VerifierOptions};
pub use mx::{DnsError, MxCache, MxResolver};
pub use probe::{Probe, ProbeKind, ProbeOptions, ProbeSequence, TransportError};
pub use provider::{ProviderId, classify_provider};
pub use scoring::{Reason, RuleTable, Status, Verdict};
pub use signals::{Signals, analyze};
pub use verifier::{BulkResult, StatusCounts, VerificationResult, Verifier, VerifierError};
