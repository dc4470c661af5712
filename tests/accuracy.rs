use afl_tipster::accuracy::{compute_summary, compute_summary_at};
use afl_tipster::history::{PredictionRecord, RoundId};

fn record(round: RoundId, prob: Option<f64>, correct: Option<bool>) -> PredictionRecord {
    let resolved = correct.is_some();
    PredictionRecord {
        year: 2026,
        round,
        date: String::new(),
        venue: String::new(),
        home_team: "Geelong".to_string(),
        away_team: "Sydney".to_string(),
        predicted_winner: "Geelong".to_string(),
        predicted_probability: prob,
        prediction_text: String::new(),
        actual_winner: resolved.then(|| {
            if correct == Some(true) {
                "Geelong".to_string()
            } else {
                "Sydney".to_string()
            }
        }),
        actual_margin: resolved.then_some(12),
        correct,
        saved_at: String::new(),
        result_checked_at: None,
    }
}

#[test]
fn empty_input_has_no_summary() {
    assert!(compute_summary(&[]).is_none());
}

#[test]
fn pending_only_has_no_summary() {
    let records = vec![
        record(RoundId::Number(1), Some(60.0), None),
        record(RoundId::Number(2), None, None),
    ];
    assert!(compute_summary(&records).is_none());
}

#[test]
fn totals_and_rounding() {
    let records = vec![
        record(RoundId::Number(1), Some(60.0), Some(true)),
        record(RoundId::Number(1), Some(70.0), Some(true)),
        record(RoundId::Number(2), Some(52.0), Some(false)),
        record(RoundId::Number(3), Some(80.0), None),
    ];
    let summary = compute_summary_at(&records, "2026-04-20T10:00:00").expect("summary");
    assert_eq!(summary.overall_total, 3);
    assert_eq!(summary.overall_correct, 2);
    assert_eq!(summary.overall_accuracy_pct, 66.7);
    assert_eq!(summary.last_updated, "2026-04-20T10:00:00");

    assert_eq!(summary.by_round.len(), 2);
    assert_eq!(summary.by_round["1"].pct, 100.0);
    assert_eq!(summary.by_round["2"].pct, 0.0);
    assert!(!summary.by_round.contains_key("3"));
}

#[test]
fn favourite_threshold_is_inclusive() {
    let records = vec![
        record(RoundId::Number(1), Some(55.0), Some(true)),
        record(RoundId::Number(1), Some(54.9), Some(false)),
        record(RoundId::Number(1), None, Some(true)),
    ];
    let summary = compute_summary(&records).expect("summary");
    assert_eq!(summary.favourite_picks.total, 1);
    assert_eq!(summary.favourite_picks.correct, 1);
    assert_eq!(summary.upset_picks.total, 1);
    assert_eq!(summary.upset_picks.correct, 0);
    // Probability-less picks still count overall.
    assert_eq!(summary.overall_total, 3);
}

#[test]
fn opening_round_is_its_own_group() {
    let records = vec![
        record(RoundId::Number(0), Some(60.0), Some(true)),
        record(RoundId::Label("Opening Round".to_string()), Some(60.0), Some(false)),
        record(RoundId::Number(1), Some(60.0), Some(true)),
    ];
    let summary = compute_summary(&records).expect("summary");
    assert_eq!(summary.by_round["0"].total, 1);
    assert_eq!(summary.by_round["Opening Round"].total, 1);
    assert_eq!(summary.by_round["1"].total, 1);
}
