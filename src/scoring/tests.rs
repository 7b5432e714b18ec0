use proptest::prelude::*;

use super::*;
use crate::probe::{Probe, ProbeKind, ProbeSequence};
use crate::signals::{Signals, analyze};

fn probe(kind: ProbeKind, code: u16, ms: u64) -> Probe {
    Probe {
        kind,
        address: "someone@example.com".to_string(),
        code: Some(code),
        text: format!("{code} reply"),
        elapsed_ms: Some(ms),
    }
}

fn score_of(provider: ProviderId, sequence: &ProbeSequence) -> Verdict {
    let signals = analyze(sequence);
    let input = ScoringInput {
        provider,
        sequence,
        signals: &signals,
    };
    RuleTable::default().score(&input, &ScoringTuning::default())
}

#[test]
fn blocked_session_is_policy_verdict() {
    let sequence = ProbeSequence::blocked("someone@example.com", Some(554), "rejected");
    for provider in [ProviderId::Microsoft365, ProviderId::Google, ProviderId::Unknown] {
        let verdict = score_of(provider, &sequence);
        assert_eq!(verdict.reason, Reason::SmtpPolicy);
        assert_eq!(verdict.status, Status::Undeliverable);
        assert_eq!(verdict.score, 50);
    }
}

#[test]
fn microsoft_hard_reject_ignores_timing() {
    // a timing pattern that would score high generically
    let sequence = ProbeSequence::new(vec![
        probe(ProbeKind::Decoy, 250, 10),
        probe(ProbeKind::Real, 550, 400),
        probe(ProbeKind::Decoy, 250, 12),
    ]);
    let verdict = score_of(ProviderId::Microsoft365, &sequence);
    assert_eq!(verdict.score, 10);
    assert_eq!(verdict.status, Status::Undeliverable);
    assert_eq!(verdict.reason, Reason::ProviderRejected);
}

#[test]
fn gateway_accept_or_defer_is_trusted() {
    for code in [250, 451] {
        let sequence = ProbeSequence::new(vec![
            probe(ProbeKind::Decoy, 250, 30),
            probe(ProbeKind::Real, code, 30),
            probe(ProbeKind::Decoy, 250, 30),
        ]);
        let verdict = score_of(ProviderId::Proofpoint, &sequence);
        assert_eq!(verdict.score, 99);
        assert_eq!(verdict.status, Status::Deliverable);
        assert_eq!(verdict.reason, Reason::ProviderAccepted);
    }
}

#[test]
fn gateway_other_code_falls_through_to_generic() {
    let sequence = ProbeSequence::new(vec![
        probe(ProbeKind::Decoy, 421, 30),
        probe(ProbeKind::Real, 421, 30),
    ]);
    let verdict = score_of(ProviderId::Mimecast, &sequence);
    assert_eq!(verdict.reason, Reason::PatternAnalysis);
}

#[test]
fn catch_all_pattern_scores_low() {
    // identical replies, identical latency
    let sequence = ProbeSequence::new(vec![
        probe(ProbeKind::Decoy, 250, 40),
        probe(ProbeKind::Real, 250, 40),
        probe(ProbeKind::Decoy, 250, 40),
    ]);
    let verdict = score_of(ProviderId::Unknown, &sequence);
    // entropy 1 -> 0.2 * 1/3
    assert_eq!(verdict.score, 7);
    assert_eq!(verdict.status, Status::Undeliverable);
    assert_eq!(verdict.reason, Reason::PatternAnalysis);
}

#[test]
fn strong_differential_scores_deliverable() {
    let sequence = ProbeSequence::new(vec![
        probe(ProbeKind::Decoy, 550, 20),
        probe(ProbeKind::Real, 250, 220),
    ]);
    let verdict = score_of(ProviderId::Unknown, &sequence);
    // gap 200 -> 0.4, confidence 0.30 -> 0.4 * 0.857, entropy 2 -> 0.2 * 2/3
    assert_eq!(verdict.score, 88);
    assert_eq!(verdict.status, Status::Deliverable);
}

#[test]
fn slow_hard_reject_stays_undeliverable() {
    // timing alone would score 88
    let sequence = ProbeSequence::new(vec![
        probe(ProbeKind::Decoy, 250, 20),
        probe(ProbeKind::Real, 550, 220),
    ]);
    for provider in [ProviderId::Unknown, ProviderId::Google, ProviderId::Yahoo] {
        let verdict = score_of(provider, &sequence);
        assert_eq!(verdict.status, Status::Undeliverable, "{provider}");
        assert_eq!(verdict.score, 54, "{provider}");
        assert_eq!(verdict.reason, Reason::PatternAnalysis);
    }
}

#[test]
fn provider_floor_only_raises_accepted_results() {
    let accepted = ProbeSequence::new(vec![
        probe(ProbeKind::Decoy, 250, 40),
        probe(ProbeKind::Real, 250, 40),
    ]);
    let verdict = score_of(ProviderId::Google, &accepted);
    assert_eq!(verdict.score, 60);
    assert_eq!(verdict.status, Status::Risky);

    let rejected = ProbeSequence::new(vec![
        probe(ProbeKind::Decoy, 550, 40),
        probe(ProbeKind::Real, 550, 40),
    ]);
    let verdict = score_of(ProviderId::Google, &rejected);
    assert!(verdict.score < 60);
}

#[test]
fn custom_table_order_is_respected() {
    let table = RuleTable::new(vec![Rule::Generic, Rule::ConnectionBlock]);
    let sequence = ProbeSequence::blocked("someone@example.com", None, "refused");
    let signals = Signals::default();
    let input = ScoringInput {
        provider: ProviderId::Unknown,
        sequence: &sequence,
        signals: &signals,
    };
    let verdict = table.score(&input, &ScoringTuning::default());
    assert_eq!(verdict.reason, Reason::PatternAnalysis);
}

#[test]
fn empty_table_falls_back_to_generic() {
    let table = RuleTable::new(Vec::new());
    let sequence = ProbeSequence::default();
    let signals = Signals::default();
    let input = ScoringInput {
        provider: ProviderId::Unknown,
        sequence: &sequence,
        signals: &signals,
    };
    assert_eq!(
        table.score(&input, &ScoringTuning::default()).reason,
        Reason::PatternAnalysis
    );
}

fn arb_probe(kind: ProbeKind) -> impl Strategy<Value = Probe> {
    (
        prop::option::of(prop::sample::select(vec![250u16, 251, 421, 450, 451, 452, 550, 551, 553, 554])),
        prop::option::of(0u64..5_000),
    )
        .prop_map(move |(code, elapsed_ms)| Probe {
            kind,
            address: "someone@example.com".to_string(),
            code,
            text: code.map(|c| format!("{c} text")).unwrap_or_default(),
            elapsed_ms: code.and(elapsed_ms),
        })
}

fn arb_sequence() -> impl Strategy<Value = ProbeSequence> {
    (
        arb_probe(ProbeKind::Decoy),
        arb_probe(ProbeKind::Real),
        prop::collection::vec(arb_probe(ProbeKind::Decoy), 0..=2),
    )
        .prop_map(|(first, real, trailing)| {
            let mut probes = vec![first, real];
            probes.extend(trailing);
            ProbeSequence::new(probes)
        })
}

fn arb_provider() -> impl Strategy<Value = ProviderId> {
    prop::sample::select(vec![
        ProviderId::Google,
        ProviderId::Microsoft365,
        ProviderId::Proofpoint,
        ProviderId::Mimecast,
        ProviderId::Barracuda,
        ProviderId::Yahoo,
        ProviderId::GoDaddy,
        ProviderId::Unknown,
    ])
}

proptest! {
    #[test]
    fn score_in_range_and_status_follows_thresholds(
        provider in arb_provider(),
        sequence in arb_sequence(),
    ) {
        let tuning = ScoringTuning::default();
        let verdict = score_of(provider, &sequence);
        prop_assert!(verdict.score <= 99);
        prop_assert_eq!(verdict.status, tuning.status_for(verdict.score));
    }

    #[test]
    fn replay_yields_identical_verdict(
        provider in arb_provider(),
        sequence in arb_sequence(),
    ) {
        let first = (analyze(&sequence), score_of(provider, &sequence));
        let replay = sequence.clone();
        let second = (analyze(&replay), score_of(provider, &replay));
        prop_assert_eq!(first, second);
    }

    #[test]
    fn hard_reject_is_never_deliverable(
        provider in arb_provider(),
        code in prop::sample::select(HARD_REJECT_CODES.to_vec()),
        decoy_ms in 0u64..5_000,
        real_ms in 0u64..5_000,
    ) {
        let sequence = ProbeSequence::new(vec![
            probe(ProbeKind::Decoy, 250, decoy_ms),
            probe(ProbeKind::Real, code, real_ms),
            probe(ProbeKind::Decoy, 250, decoy_ms),
        ]);
        let verdict = score_of(provider, &sequence);
        prop_assert_eq!(verdict.status, Status::Undeliverable);
    }

    #[test]
    fn generic_accept_family_hard_reject_is_fixed(
        provider in prop::sample::select(GENERIC_ACCEPT_PROVIDERS.to_vec()),
        decoy_ms in 0u64..5_000,
        real_ms in 0u64..5_000,
    ) {
        let sequence = ProbeSequence::new(vec![
            probe(ProbeKind::Decoy, 250, decoy_ms),
            probe(ProbeKind::Real, 550, real_ms),
        ]);
        let verdict = score_of(provider, &sequence);
        prop_assert_eq!(verdict.score, 10);
        prop_assert_eq!(verdict.status, Status::Undeliverable);
    }
}
