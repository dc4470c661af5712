use anyhow::{Context, Result, anyhow};
use reqwest::blocking::Client;
use serde_json::Value;
use tracing::debug;

use crate::history::{CompletedGame, RoundId};
use crate::http_client::http_client;

pub const SQUIGGLE_BASE_URL: &str = "https://api.squiggle.com.au/";
const COMPLETE: u64 = 100;

/// Source of finished games for a season. Implementations may fail; callers treat
/// a failure as "no results this run".
pub trait ResultsFeed {
    fn fetch_completed_games(&self, year: i32) -> Result<Vec<CompletedGame>>;
}

pub struct SquiggleFeed {
    client: Client,
    base_url: String,
}

impl SquiggleFeed {
    pub fn new(base_url: &str, timeout_secs: u64, contact: &str) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout_secs, contact)?,
            base_url: base_url.to_string(),
        })
    }

    pub fn games_url(&self, year: i32) -> String {
        let base = self.base_url.trim_end_matches('/');
        format!("{base}/?q=games;year={year}")
    }
}

impl ResultsFeed for SquiggleFeed {
    fn fetch_completed_games(&self, year: i32) -> Result<Vec<CompletedGame>> {
        let url = self.games_url(year);
        debug!(%url, "fetching completed games");
        let resp = self.client.get(&url).send().context("request failed")?;
        let status = resp.status();
        let body = resp.text().context("failed reading body")?;
        if !status.is_success() {
            return Err(anyhow!("http {}: {}", status, body));
        }
        parse_squiggle_games_json(&body)
    }
}

/// Parses a Squiggle `q=games` response, keeping only finished games.
pub fn parse_squiggle_games_json(raw: &str) -> Result<Vec<CompletedGame>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let root: Value = serde_json::from_str(trimmed).context("invalid games json")?;
    let Some(games) = root.get("games").and_then(|v| v.as_array()) else {
        return Ok(Vec::new());
    };
    Ok(games.iter().filter_map(parse_completed_game).collect())
}

fn parse_completed_game(v: &Value) -> Option<CompletedGame> {
    if v.get("complete").and_then(as_u64)? != COMPLETE {
        return None;
    }
    let home_team = v.get("hteam")?.as_str()?.to_string();
    let away_team = v.get("ateam")?.as_str()?.to_string();
    let round = parse_round(v)?;
    let home_score = v.get("hscore").and_then(as_u64).unwrap_or(0) as u32;
    let away_score = v.get("ascore").and_then(as_u64).unwrap_or(0) as u32;
    Some(CompletedGame {
        home_team,
        away_team,
        round,
        home_score,
        away_score,
    })
}

fn parse_round(v: &Value) -> Option<RoundId> {
    match v.get("round") {
        Some(Value::Number(n)) => n.as_i64().map(RoundId::Number),
        Some(Value::String(s)) if !s.trim().is_empty() => Some(RoundId::from(s.as_str())),
        _ => v
            .get("roundname")
            .and_then(|x| x.as_str())
            .map(RoundId::from),
    }
}

// Squiggle has served both integers and numeric strings for these fields.
fn as_u64(v: &Value) -> Option<u64> {
    match v {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().map(|f| f.max(0.0) as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{SquiggleFeed, parse_squiggle_games_json};

    #[test]
    fn games_url_handles_trailing_slash() {
        let feed = SquiggleFeed::new("https://api.squiggle.com.au/", 5, "").expect("client");
        assert_eq!(feed.games_url(2026), "https://api.squiggle.com.au/?q=games;year=2026");
        let feed = SquiggleFeed::new("http://localhost:9000", 5, "").expect("client");
        assert_eq!(feed.games_url(2025), "http://localhost:9000/?q=games;year=2025");
    }

    #[test]
    fn incomplete_games_are_skipped() {
        let raw = r#"{"games":[
            {"hteam":"Richmond","ateam":"Carlton","round":1,"hscore":90,"ascore":75,"complete":100},
            {"hteam":"Geelong","ateam":"Sydney","round":1,"hscore":40,"ascore":30,"complete":60}
        ]}"#;
        let games = parse_squiggle_games_json(raw).expect("parse");
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].home_team, "Richmond");
    }
}
