use crate::provider::ProviderId;

use super::Status;

/// Empirical constants of the scorer. None of them is derived from ground
/// truth; they are exposed so deployments can retune them.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringTuning {
    pub deliverable_threshold: u8,
    pub risky_threshold: u8,
    pub max_score: u8,
    pub block_score: u8,
    pub reject_score: u8,
    pub accept_score: u8,
    pub gap_weight: f64,
    pub confidence_weight: f64,
    pub entropy_weight: f64,
    /// Real-vs-decoy gap that saturates the gap component.
    pub gap_scale_ms: f64,
    pub confidence_scale: f64,
    pub entropy_scale: f64,
    /// Lower bounds applied to accepted real probes of consistent providers.
    pub provider_floors: Vec<(ProviderId, u8)>,
}

impl Default for ScoringTuning {
    fn default() -> Self {
        Self {
            deliverable_threshold: 80,
            risky_threshold: 55,
            max_score: 99,
            block_score: 50,
            reject_score: 10,
            accept_score: 99,
            gap_weight: 0.4,
            confidence_weight: 0.4,
            entropy_weight: 0.2,
            gap_scale_ms: 80.0,
            confidence_scale: 0.35,
            entropy_scale: 3.0,
            provider_floors: vec![(ProviderId::Google, 60), (ProviderId::Yahoo, 60)],
        }
    }
}

impl ScoringTuning {
    pub fn status_for(&self, score: u8) -> Status {
        if score >= self.deliverable_threshold {
            Status::Deliverable
        } else if score >= self.risky_threshold {
            Status::Risky
        } else {
            Status::Undeliverable
        }
    }

    pub fn floor_for(&self, provider: ProviderId) -> Option<u8> {
        self.provider_floors
            .iter()
            .find(|(candidate, _)| *candidate == provider)
            .map(|(_, floor)| *floor)
    }
}
