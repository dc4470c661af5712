use anyhow::Result;
use tracing::{debug, info, warn};

use crate::accuracy::compute_summary;
use crate::extract::{extract_probability, extract_winner};
use crate::history::{
    AccuracySummary, HistoryFile, NewPrediction, PredictionRecord, RoundId, now_timestamp,
};
use crate::persist::HistoryStore;
use crate::prompt_history::{DisplayData, display_data, format_history};
use crate::results_feed::ResultsFeed;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecordReport {
    pub saved: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileOutcome {
    NothingPending,
    FeedUnavailable,
    Reconciled {
        updated: usize,
        summary: Option<AccuracySummary>,
    },
}

impl ReconcileOutcome {
    pub fn summary(&self) -> Option<&AccuracySummary> {
        match self {
            ReconcileOutcome::Reconciled { summary, .. } => summary.as_ref(),
            _ => None,
        }
    }
}

/// Records tips, reconciles them against results and exposes the history.
///
/// Every call loads the whole store and writes it back at most once.
pub struct Tracker<S> {
    store: S,
}

impl<S: HistoryStore> Tracker<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn save_predictions(
        &self,
        predictions: &[NewPrediction],
        round: &RoundId,
        year: i32,
    ) -> Result<(HistoryFile, RecordReport)> {
        let mut history = self.store.load();
        let mut report = RecordReport::default();

        for pred in predictions {
            if history
                .find(year, round, &pred.home_team, &pred.away_team)
                .is_some()
            {
                info!(
                    home = %pred.home_team,
                    away = %pred.away_team,
                    %round,
                    "prediction already saved, skipping"
                );
                report.skipped += 1;
                continue;
            }

            let predicted_winner = extract_winner(&pred.prediction, &pred.home_team, &pred.away_team);
            let predicted_probability = extract_probability(&pred.prediction, &predicted_winner);
            info!(
                home = %pred.home_team,
                away = %pred.away_team,
                tipped = %predicted_winner,
                probability = ?predicted_probability,
                "saved prediction"
            );

            history.predictions.push(PredictionRecord {
                year,
                round: round.clone(),
                date: pred.date.clone(),
                venue: pred.venue.clone(),
                home_team: pred.home_team.clone(),
                away_team: pred.away_team.clone(),
                predicted_winner,
                predicted_probability,
                prediction_text: pred.prediction.clone(),
                actual_winner: None,
                actual_margin: None,
                correct: None,
                saved_at: now_timestamp(),
                result_checked_at: None,
            });
            report.saved += 1;
        }

        self.store.save(&history)?;
        Ok((history, report))
    }

    pub fn check_and_update_results(
        &self,
        feed: &dyn ResultsFeed,
        year: i32,
    ) -> Result<ReconcileOutcome> {
        let mut history = self.store.load();
        let pending = history
            .predictions
            .iter()
            .filter(|p| p.year == year && !p.is_resolved())
            .count();
        if pending == 0 {
            info!(year, "no pending predictions to check");
            return Ok(ReconcileOutcome::NothingPending);
        }

        let games = match feed.fetch_completed_games(year) {
            Ok(games) => games,
            Err(err) => {
                warn!(year, error = %err, "error fetching results");
                return Ok(ReconcileOutcome::FeedUnavailable);
            }
        };
        debug!(year, pending, completed = games.len(), "reconciling");

        let checked_at = now_timestamp();
        let mut updated = 0usize;
        for record in history
            .predictions
            .iter_mut()
            .filter(|p| p.year == year && !p.is_resolved())
        {
            let Some(game) = games.iter().find(|g| record.is_game(g)) else {
                continue;
            };
            if !record.resolve(game, &checked_at) {
                continue;
            }
            updated += 1;
            info!(
                home = %record.home_team,
                away = %record.away_team,
                tipped = %record.predicted_winner,
                actual = record.actual_winner.as_deref().unwrap_or_default(),
                correct = record.correct.unwrap_or_default(),
                "result recorded"
            );
        }

        history.accuracy_summary = compute_summary(&history.predictions);
        self.store.save(&history)?;
        info!(updated, "results updated");

        Ok(ReconcileOutcome::Reconciled {
            updated,
            summary: history.accuracy_summary,
        })
    }

    pub fn format_history_for_prompt(&self, home: &str, away: &str) -> String {
        format_history(&self.store.load(), home, away)
    }

    pub fn display_data(&self) -> DisplayData {
        display_data(&self.store.load())
    }
}
