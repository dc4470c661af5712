use std::collections::BTreeMap;

use crate::history::{
    AccuracySummary, PredictionRecord, PredictionStatus, RoundTally, Tally, now_timestamp,
};

/// Picks stated below this probability count as underdog (upset) picks.
pub const FAVOURITE_THRESHOLD: f64 = 55.0;

/// Recomputes the accuracy summary from every resolved record.
///
/// Returns `None` when nothing has been resolved yet. Records without a stated
/// probability count towards the overall and per-round figures but sit in neither
/// the favourite nor the upset bucket.
pub fn compute_summary(records: &[PredictionRecord]) -> Option<AccuracySummary> {
    compute_summary_at(records, &now_timestamp())
}

pub fn compute_summary_at(records: &[PredictionRecord], updated_at: &str) -> Option<AccuracySummary> {
    let mut overall = Tally::default();
    let mut rounds: BTreeMap<String, Tally> = BTreeMap::new();
    let mut favourite = Tally::default();
    let mut upset = Tally::default();

    for record in records {
        let PredictionStatus::Resolved { correct } = record.status() else {
            continue;
        };
        overall.record(correct);
        rounds.entry(record.round.key()).or_default().record(correct);
        match record.predicted_probability {
            Some(p) if p < FAVOURITE_THRESHOLD => upset.record(correct),
            Some(_) => favourite.record(correct),
            None => {}
        }
    }

    if overall.total == 0 {
        return None;
    }

    let by_round = rounds
        .into_iter()
        .map(|(round, t)| {
            (
                round,
                RoundTally {
                    correct: t.correct,
                    total: t.total,
                    pct: pct(t.correct, t.total),
                },
            )
        })
        .collect();

    Some(AccuracySummary {
        overall_correct: overall.correct,
        overall_total: overall.total,
        overall_accuracy_pct: pct(overall.correct, overall.total),
        by_round,
        favourite_picks: favourite,
        upset_picks: upset,
        last_updated: updated_at.to_string(),
    })
}

/// Percentage rounded to one decimal place; zero when there is nothing to divide.
pub fn pct(correct: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = 100.0 * f64::from(correct) / f64::from(total);
    (raw * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::pct;

    #[test]
    fn pct_rounds_to_one_decimal() {
        assert_eq!(pct(2, 3), 66.7);
        assert_eq!(pct(1, 3), 33.3);
        assert_eq!(pct(5, 5), 100.0);
        assert_eq!(pct(0, 0), 0.0);
    }
}
