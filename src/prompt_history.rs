use serde::Serialize;

use crate::accuracy::pct;
use crate::history::{
    AccuracySummary, DRAW, HistoryFile, PredictionRecord, PredictionStatus, RoundId,
};

pub const NO_HISTORY: &str = "No prediction history yet — this is the first round of the season.";

const RECENT_ROUNDS: usize = 3;
const TEAM_HISTORY_LIMIT: usize = 6;
const WRONG_PICKS_LIMIT: usize = 4;

#[derive(Debug, Clone, Serialize)]
pub struct DisplayData {
    #[serde(with = "crate::history::summary_object")]
    pub accuracy_summary: Option<AccuracySummary>,
    pub completed: Vec<PredictionRecord>,
    pub pending: Vec<PredictionRecord>,
}

pub fn display_data(history: &HistoryFile) -> DisplayData {
    let mut completed = Vec::new();
    let mut pending = Vec::new();
    for record in &history.predictions {
        match record.status() {
            PredictionStatus::Resolved { .. } => completed.push(record.clone()),
            PredictionStatus::Pending => pending.push(record.clone()),
        }
    }
    DisplayData {
        accuracy_summary: history.accuracy_summary.clone(),
        completed,
        pending,
    }
}

/// Digest of past tips for the prompt of an upcoming `home` v `away` game.
pub fn format_history(history: &HistoryFile, home: &str, away: &str) -> String {
    if history.predictions.is_empty() {
        return NO_HISTORY.to_string();
    }

    let mut lines = Vec::new();
    lines.push("AGENT'S OWN ACCURACY THIS SEASON:".to_string());
    match &history.accuracy_summary {
        Some(summary) => push_accuracy(&mut lines, summary),
        None => {
            let pending = history.pending().count();
            lines.push(format!(
                "  No results checked yet ({pending} prediction(s) pending)"
            ));
        }
    }

    let team_history = most_recent(history.resolved().filter(|p| p.involves_either(home, away)));
    if !team_history.is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "AGENT'S PAST PREDICTIONS INVOLVING {} OR {}:",
            home.to_uppercase(),
            away.to_uppercase()
        ));
        for p in team_history.iter().take(TEAM_HISTORY_LIMIT) {
            lines.push(format_team_line(p));
        }
    }

    let wrong = most_recent(history.predictions.iter().filter(|p| p.correct == Some(false)));
    if !wrong.is_empty() {
        lines.push(String::new());
        lines.push("RECENT INCORRECT PREDICTIONS (use these to recalibrate):".to_string());
        for p in wrong.iter().take(WRONG_PICKS_LIMIT) {
            lines.push(format_wrong_line(p));
        }
    }

    lines.join("\n")
}

fn push_accuracy(lines: &mut Vec<String>, summary: &AccuracySummary) {
    lines.push(format!(
        "  Overall: {}/{} ({:.1}% correct)",
        summary.overall_correct,
        summary.overall_total,
        summary.overall_accuracy_pct
    ));
    let fav = summary.favourite_picks;
    if fav.total > 0 {
        lines.push(format!(
            "  Favourite picks: {}/{} ({:.1}%)",
            fav.correct,
            fav.total,
            pct(fav.correct, fav.total)
        ));
    }
    let upset = summary.upset_picks;
    if upset.total > 0 {
        lines.push(format!(
            "  Underdog picks: {}/{} ({:.1}%)",
            upset.correct,
            upset.total,
            pct(upset.correct, upset.total)
        ));
    }

    let mut rounds: Vec<(&String, RoundId)> = summary
        .by_round
        .keys()
        .map(|k| (k, RoundId::from(k.as_str())))
        .collect();
    rounds.sort_by_key(|(_, id)| id.sort_key());
    let skip = rounds.len().saturating_sub(RECENT_ROUNDS);
    let recent: Vec<String> = rounds
        .iter()
        .skip(skip)
        .filter_map(|(key, _)| {
            let t = summary.by_round.get(*key)?;
            Some(format!("Rd {}: {}/{}", key, t.correct, t.total))
        })
        .collect();
    if !recent.is_empty() {
        lines.push(format!("  Recent rounds: {}", recent.join(", ")));
    }
}

fn most_recent<'a>(records: impl Iterator<Item = &'a PredictionRecord>) -> Vec<&'a PredictionRecord> {
    let mut out: Vec<&PredictionRecord> = records.collect();
    out.sort_by(|a, b| b.recency_key().cmp(&a.recency_key()));
    out
}

fn format_team_line(p: &PredictionRecord) -> String {
    let confidence = p
        .predicted_probability
        .map(|v| format!("{v:.0}"))
        .unwrap_or_else(|| "?".to_string());
    let result = if p.correct == Some(true) {
        "CORRECT"
    } else {
        "WRONG"
    };
    format!(
        "  Rd {}: {} vs {} — tipped {} ({}% confidence) — {} (actual: {})",
        p.round,
        p.home_team,
        p.away_team,
        p.predicted_winner,
        confidence,
        result,
        p.actual_winner.as_deref().unwrap_or("?")
    )
}

fn format_wrong_line(p: &PredictionRecord) -> String {
    let margin = p
        .actual_margin
        .map(|m| m.to_string())
        .unwrap_or_else(|| "?".to_string());
    match p.actual_winner.as_deref() {
        Some(DRAW) => format!(
            "  Rd {}: Tipped {} in {} vs {} — the game was drawn (margin {} pts)",
            p.round, p.predicted_winner, p.home_team, p.away_team, margin
        ),
        actual => format!(
            "  Rd {}: Tipped {} over {} — actual winner won by {} pts",
            p.round,
            p.predicted_winner,
            actual.unwrap_or("?"),
            margin
        ),
    }
}
