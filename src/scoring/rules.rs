use crate::probe::{ProbeSequence, is_accept_or_defer_code};
use crate::provider::ProviderId;
use crate::signals::Signals;

use super::{HARD_REJECT_CODES, Reason, ScoringTuning, Verdict};

/// Everything a rule may look at.
#[derive(Debug, Clone, Copy)]
pub struct ScoringInput<'a> {
    pub provider: ProviderId,
    pub sequence: &'a ProbeSequence,
    pub signals: &'a Signals,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// The session never got to the recipient stage.
    ConnectionBlock,
    /// Providers whose recipient replies are trusted literally: hard
    /// rejections are final, accepts and deferrals are deliverable.
    ProviderOverride {
        providers: Vec<ProviderId>,
        reject_codes: Vec<u16>,
    },
    /// Timing/diversity composite. Always matches.
    Generic,
}

impl Rule {
    pub fn evaluate(&self, input: &ScoringInput<'_>, tuning: &ScoringTuning) -> Option<Verdict> {
        match self {
            Self::ConnectionBlock => input.sequence.is_blocked().then(|| Verdict {
                score: tuning.block_score,
                status: tuning.status_for(tuning.block_score),
                reason: Reason::SmtpPolicy,
            }),
            Self::ProviderOverride {
                providers,
                reject_codes,
            } => {
                if !providers.contains(&input.provider) {
                    return None;
                }
                let code = input.sequence.real()?.code?;
                if reject_codes.contains(&code) {
                    Some(Verdict {
                        score: tuning.reject_score,
                        status: tuning.status_for(tuning.reject_score),
                        reason: Reason::ProviderRejected,
                    })
                } else if is_accept_or_defer_code(code) {
                    Some(Verdict {
                        score: tuning.accept_score,
                        status: tuning.status_for(tuning.accept_score),
                        reason: Reason::ProviderAccepted,
                    })
                } else {
                    None
                }
            }
            Self::Generic => Some(generic(input, tuning)),
        }
    }
}

fn generic(input: &ScoringInput<'_>, tuning: &ScoringTuning) -> Verdict {
    let gap = real_vs_decoy_gap(input.sequence);
    let signals = input.signals;

    let composite = tuning.gap_weight * saturate(gap, tuning.gap_scale_ms)
        + tuning.confidence_weight * saturate(signals.confidence, tuning.confidence_scale)
        + tuning.entropy_weight * saturate(f64::from(signals.entropy), tuning.entropy_scale);
    let mut score = to_score(composite, tuning.max_score);

    let real_code = input.sequence.real().and_then(|probe| probe.code);
    if real_code.is_some_and(|code| (200..300).contains(&code)) {
        if let Some(floor) = tuning.floor_for(input.provider) {
            score = score.max(floor.min(tuning.max_score));
        }
    }
    // an explicit rejection of the real address never reads as deliverable,
    // however the timing looks
    if real_code.is_some_and(|code| HARD_REJECT_CODES.contains(&code)) {
        score = score.min(tuning.risky_threshold.saturating_sub(1));
    }

    Verdict {
        score,
        status: tuning.status_for(score),
        reason: Reason::PatternAnalysis,
    }
}

/// |real - mean(decoys)| in milliseconds, 0 when either side has no timing.
fn real_vs_decoy_gap(sequence: &ProbeSequence) -> f64 {
    let Some(real_ms) = sequence.real().and_then(|probe| probe.elapsed_ms) else {
        return 0.0;
    };
    let decoy_times: Vec<f64> = sequence
        .decoys()
        .filter_map(|probe| probe.elapsed_ms)
        .map(|ms| ms as f64)
        .collect();
    if decoy_times.is_empty() {
        return 0.0;
    }
    let mean = decoy_times.iter().sum::<f64>() / decoy_times.len() as f64;
    (real_ms as f64 - mean).abs()
}

fn saturate(value: f64, scale: f64) -> f64 {
    if scale <= 0.0 {
        return 0.0;
    }
    (value / scale).clamp(0.0, 1.0)
}

fn to_score(composite: f64, max_score: u8) -> u8 {
    let scaled = (composite * 100.0).round();
    if scaled.is_nan() || scaled <= 0.0 {
        0
    } else if scaled >= f64::from(max_score) {
        max_score
    } else {
        scaled as u8
    }
}
