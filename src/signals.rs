//! Timing and response-diversity signals derived from a probe sequence.
//!
//! Servers that really look up recipients tend to answer the real address
//! with a latency that differs from random decoys; servers that accept
//! everything answer all probes alike.

use std::collections::HashSet;

use crate::probe::ProbeSequence;

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Signals {
    /// max - min elapsed time among probes that got an answer.
    pub timing_delta_ms: u64,
    /// Number of distinct (code, text) replies, at least 1.
    pub entropy: u32,
    /// Bounded contribution in `[0, confidence_cap]`.
    pub confidence: f64,
}

impl Default for Signals {
    fn default() -> Self {
        Self {
            timing_delta_ms: 0,
            entropy: 1,
            confidence: 0.0,
        }
    }
}

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SignalTuning {
    /// (delta strictly above, confidence) pairs, highest threshold first;
    /// the first tier exceeded applies.
    pub delta_tiers: Vec<(u64, f64)>,
    /// Added when more than one distinct reply was seen.
    pub diversity_bonus: f64,
    pub confidence_cap: f64,
}

impl Default for SignalTuning {
    fn default() -> Self {
        Self {
            delta_tiers: vec![(120, 0.25), (80, 0.18), (40, 0.12), (10, 0.06)],
            diversity_bonus: 0.05,
            confidence_cap: 0.35,
        }
    }
}

pub fn analyze(sequence: &ProbeSequence) -> Signals {
    analyze_with(sequence, &SignalTuning::default())
}

pub fn analyze_with(sequence: &ProbeSequence, tuning: &SignalTuning) -> Signals {
    let times: Vec<u64> = sequence
        .probes()
        .iter()
        .filter_map(|probe| probe.elapsed_ms)
        .collect();
    let (Some(min), Some(max)) = (times.iter().min(), times.iter().max()) else {
        return Signals::default();
    };
    let timing_delta_ms = max - min;

    let signatures: HashSet<(u16, &str)> = sequence
        .probes()
        .iter()
        .filter_map(|probe| probe.code.map(|code| (code, probe.text.as_str())))
        .collect();
    let entropy = u32::try_from(signatures.len()).unwrap_or(u32::MAX).max(1);

    let mut confidence = tuning
        .delta_tiers
        .iter()
        .find(|(threshold, _)| timing_delta_ms > *threshold)
        .map(|(_, increment)| *increment)
        .unwrap_or(0.0);
    if entropy > 1 {
        confidence += tuning.diversity_bonus;
    }
    let confidence = round4(confidence.clamp(0.0, tuning.confidence_cap));

    Signals {
        timing_delta_ms,
        entropy,
        confidence,
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
