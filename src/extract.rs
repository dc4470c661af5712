use once_cell::sync::Lazy;
use regex::Regex;

use crate::history::UNKNOWN_WINNER;

const WINNER_MARKER: &str = "PREDICTED WINNER";
const MARKER_WINDOW_CHARS: usize = 200;
const FALLBACK_WINDOW_CHARS: usize = 300;
const MIN_WIN_PROB: f64 = 50.0;
const MAX_WIN_PROB: f64 = 99.0;

static PERCENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{2,3}(?:\.\d)?)\s*%").expect("percent pattern is valid"));

/// Best-effort read of the tipped team from free-form model output.
///
/// Team names are matched in full, so clubs sharing a last word ("Melbourne" and
/// "North Melbourne", "Adelaide" and "Port Adelaide") do not shadow each other.
/// Returns `"Unknown"` when nothing decisive is found.
pub fn extract_winner(text: &str, home: &str, away: &str) -> String {
    let home_upper = home.trim().to_uppercase();
    let away_upper = away.trim().to_uppercase();
    let upper = text.to_uppercase();

    if let Some(idx) = upper.find(WINNER_MARKER) {
        let window: String = upper[idx..].chars().take(MARKER_WINDOW_CHARS).collect();
        let home_pos = find_name(&window, &home_upper);
        let away_pos = find_name(&window, &away_upper);
        match (home_pos, away_pos) {
            (Some(h), Some(a)) if h < a => return home.to_string(),
            (Some(h), Some(a)) if a < h => return away.to_string(),
            // Same start: one name is a prefix of the other, the longer one was written.
            (Some(_), Some(_)) => {
                return if home_upper.len() >= away_upper.len() {
                    home.to_string()
                } else {
                    away.to_string()
                };
            }
            (Some(_), None) => return home.to_string(),
            (None, Some(_)) => return away.to_string(),
            (None, None) => {}
        }
    }

    let head: String = text.chars().take(FALLBACK_WINDOW_CHARS).collect();
    let head = head.to_uppercase();
    let (home_count, away_count) = count_mentions(&head, &home_upper, &away_upper);
    if home_count > away_count {
        home.to_string()
    } else if away_count > home_count {
        away.to_string()
    } else {
        UNKNOWN_WINNER.to_string()
    }
}

/// First percentage in the text that reads as a win probability (50-99 inclusive).
pub fn extract_probability(text: &str, winner: &str) -> Option<f64> {
    let winner = winner.trim();
    if winner.is_empty() || winner == UNKNOWN_WINNER {
        return None;
    }
    PERCENT
        .captures_iter(text)
        .filter_map(|caps| caps.get(1)?.as_str().parse::<f64>().ok())
        .find(|v| (MIN_WIN_PROB..=MAX_WIN_PROB).contains(v))
}

fn find_name(haystack: &str, name: &str) -> Option<usize> {
    if name.is_empty() {
        return None;
    }
    haystack.find(name)
}

// When one name contains the other, mentions of the longer name are removed
// before the shorter one is counted.
fn count_mentions(haystack: &str, home: &str, away: &str) -> (usize, usize) {
    let count = |text: &str, name: &str| {
        if name.is_empty() {
            0
        } else {
            text.matches(name).count()
        }
    };
    if !home.is_empty() && home != away && home.contains(away) && !away.is_empty() {
        let rest = haystack.replace(home, " ");
        return (count(haystack, home), count(&rest, away));
    }
    if !away.is_empty() && home != away && away.contains(home) && !home.is_empty() {
        let rest = haystack.replace(away, " ");
        return (count(&rest, home), count(haystack, away));
    }
    (count(haystack, home), count(haystack, away))
}
