use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub const UNKNOWN_WINNER: &str = "Unknown";
pub const DRAW: &str = "Draw";

/// Round identifier as it appears in the store and in the results feed.
///
/// Numbered rounds are stored as JSON integers. Round `0` is the opening round and
/// is a real round, not a missing one. Labels cover finals and anything the feed
/// names instead of numbering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoundId {
    Number(i64),
    Label(String),
}

impl RoundId {
    /// Numeric position of the round within a season, when it has one.
    pub fn ordinal(&self) -> Option<i64> {
        match self {
            RoundId::Number(n) => Some(*n),
            RoundId::Label(label) => {
                let trimmed = label.trim();
                if let Ok(n) = trimmed.parse::<i64>() {
                    return Some(n);
                }
                let lower = trimmed.to_ascii_lowercase();
                if lower.starts_with("opening") {
                    return Some(0);
                }
                lower
                    .strip_prefix("round")
                    .and_then(|rest| rest.trim().parse::<i64>().ok())
            }
        }
    }

    // Numbered rounds first in ascending order, unnumbered labels after them.
    pub fn sort_key(&self) -> (u8, i64) {
        match self.ordinal() {
            Some(n) => (0, n),
            None => (1, 0),
        }
    }

    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for RoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundId::Number(n) => write!(f, "{n}"),
            RoundId::Label(label) => f.write_str(label.trim()),
        }
    }
}

// Rounds compare by their string form, so `5` and `"5"` are the same round.
impl PartialEq for RoundId {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for RoundId {}

impl From<i64> for RoundId {
    fn from(n: i64) -> Self {
        RoundId::Number(n)
    }
}

impl From<&str> for RoundId {
    fn from(label: &str) -> Self {
        match label.trim().parse::<i64>() {
            Ok(n) => RoundId::Number(n),
            Err(_) => RoundId::Label(label.trim().to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Home,
    Draw,
    Away,
}

impl Outcome {
    pub fn from_scores(home_score: u32, away_score: u32) -> Self {
        if home_score > away_score {
            Outcome::Home
        } else if home_score < away_score {
            Outcome::Away
        } else {
            Outcome::Draw
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionStatus {
    Pending,
    Resolved { correct: bool },
}

/// One tip for one fixture, plus its outcome once the game has been played.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub year: i32,
    pub round: RoundId,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub venue: String,
    pub home_team: String,
    pub away_team: String,
    pub predicted_winner: String,
    #[serde(default)]
    pub predicted_probability: Option<f64>,
    #[serde(default)]
    pub prediction_text: String,
    #[serde(default)]
    pub actual_winner: Option<String>,
    #[serde(default)]
    pub actual_margin: Option<u32>,
    #[serde(default)]
    pub correct: Option<bool>,
    #[serde(default)]
    pub saved_at: String,
    #[serde(default)]
    pub result_checked_at: Option<String>,
}

impl PredictionRecord {
    pub fn status(&self) -> PredictionStatus {
        match self.correct {
            Some(correct) => PredictionStatus::Resolved { correct },
            None => PredictionStatus::Pending,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.correct.is_some()
    }

    pub fn is_fixture(&self, year: i32, round: &RoundId, home: &str, away: &str) -> bool {
        self.year == year && self.round == *round && self.home_team == home && self.away_team == away
    }

    pub fn is_game(&self, game: &CompletedGame) -> bool {
        self.home_team == game.home_team
            && self.away_team == game.away_team
            && self.round == game.round
    }

    pub fn involves_either(&self, home: &str, away: &str) -> bool {
        [home, away]
            .iter()
            .any(|team| self.home_team == *team || self.away_team == *team)
    }

    /// Fills in the outcome fields from a finished game. Returns `false` and leaves
    /// the record untouched if it was already resolved.
    pub fn resolve(&mut self, game: &CompletedGame, checked_at: &str) -> bool {
        if self.is_resolved() {
            return false;
        }
        let actual = match Outcome::from_scores(game.home_score, game.away_score) {
            Outcome::Home => self.home_team.clone(),
            Outcome::Away => self.away_team.clone(),
            Outcome::Draw => DRAW.to_string(),
        };
        self.correct = Some(self.predicted_winner == actual);
        self.actual_margin = Some(game.home_score.abs_diff(game.away_score));
        self.actual_winner = Some(actual);
        self.result_checked_at = Some(checked_at.to_string());
        true
    }

    // Most recent first when sorted descending.
    pub fn recency_key(&self) -> (i32, (u8, i64)) {
        (self.year, self.round.sort_key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tally {
    pub correct: u32,
    pub total: u32,
}

impl Tally {
    pub fn record(&mut self, correct: bool) {
        self.total += 1;
        if correct {
            self.correct += 1;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundTally {
    pub correct: u32,
    pub total: u32,
    pub pct: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccuracySummary {
    pub overall_correct: u32,
    pub overall_total: u32,
    pub overall_accuracy_pct: f64,
    pub by_round: BTreeMap<String, RoundTally>,
    pub favourite_picks: Tally,
    pub upset_picks: Tally,
    pub last_updated: String,
}

/// The whole persisted document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HistoryFile {
    #[serde(default)]
    pub predictions: Vec<PredictionRecord>,
    #[serde(default, with = "summary_object")]
    pub accuracy_summary: Option<AccuracySummary>,
}

impl HistoryFile {
    pub fn find(&self, year: i32, round: &RoundId, home: &str, away: &str) -> Option<&PredictionRecord> {
        self.predictions
            .iter()
            .find(|p| p.is_fixture(year, round, home, away))
    }

    pub fn resolved(&self) -> impl Iterator<Item = &PredictionRecord> {
        self.predictions.iter().filter(|p| p.is_resolved())
    }

    pub fn pending(&self) -> impl Iterator<Item = &PredictionRecord> {
        self.predictions.iter().filter(|p| !p.is_resolved())
    }
}

/// A freshly generated tip, as handed over by the prediction step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPrediction {
    pub home_team: String,
    pub away_team: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub venue: String,
    pub prediction: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedGame {
    pub home_team: String,
    pub away_team: String,
    pub round: RoundId,
    pub home_score: u32,
    pub away_score: u32,
}

pub fn now_timestamp() -> String {
    chrono::Local::now()
        .naive_local()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

// An empty summary is stored as `{}` rather than `null`.
pub(crate) mod summary_object {
    use serde::de::Error as _;
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use serde_json::Value;

    use super::AccuracySummary;

    pub fn serialize<S: Serializer>(
        value: &Option<AccuracySummary>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(summary) => summary.serialize(serializer),
            None => serializer.serialize_map(Some(0))?.end(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<AccuracySummary>, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(None),
            Value::Object(map) if map.is_empty() => Ok(None),
            other => serde_json::from_value(other)
                .map(Some)
                .map_err(D::Error::custom),
        }
    }
}
