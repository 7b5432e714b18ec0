//! Behavioral scorer: an ordered rule table, first match wins.
//!
//! The default table is
//! 1. connection/policy block -> `undeliverable`, `smtp_policy`
//! 2. generic-accept providers (Microsoft 365, Proofpoint, Mimecast,
//!    Barracuda) -> literal reading of the real reply
//! 3. generic timing/diversity composite -> `pattern_analysis`

mod rules;
mod tuning;
mod verdict;

pub use rules::{Rule, ScoringInput};
pub use tuning::ScoringTuning;
pub use verdict::{Reason, Status, Verdict};

use crate::provider::ProviderId;

/// Recipient codes treated as an explicit hard rejection.
pub const HARD_REJECT_CODES: &[u16] = &[550, 551, 553];

/// Providers known to answer recipient commands generically.
pub const GENERIC_ACCEPT_PROVIDERS: &[ProviderId] = &[
    ProviderId::Microsoft365,
    ProviderId::Proofpoint,
    ProviderId::Mimecast,
    ProviderId::Barracuda,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::new(vec![
            Rule::ConnectionBlock,
            Rule::ProviderOverride {
                providers: GENERIC_ACCEPT_PROVIDERS.to_vec(),
                reject_codes: HARD_REJECT_CODES.to_vec(),
            },
            Rule::Generic,
        ])
    }
}

impl RuleTable {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Evaluate top to bottom. A table without a matching rule falls back to
    /// the generic composite.
    pub fn score(&self, input: &ScoringInput<'_>, tuning: &ScoringTuning) -> Verdict {
        self.rules
            .iter()
            .find_map(|rule| rule.evaluate(input, tuning))
            .or_else(|| Rule::Generic.evaluate(input, tuning))
            .unwrap_or(Verdict {
                score: 0,
                status: Status::Undeliverable,
                reason: Reason::ProcessingError,
            })
    }
}

#[cfg(test)]
mod tests;
