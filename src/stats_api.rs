//! Roster stats provider over HTTP. The service contract is a JSON array of
//! player entries per team, either flat or under a "players" key, each entry
//! carrying player_id, player_name, position, an optional source tag, and the
//! stat fields either inline or under "stats".

use std::env;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use serde_json::Value;

use crate::positions::{GroupStats, PlayerRecord, PositionGroup};
use crate::sources::Source;
use crate::team_names;

const REQUEST_TIMEOUT_SECS: u64 = 10;
const FETCH_ATTEMPTS: u32 = 3;
const BACKOFF_BASE_SECS: u64 = 1;
const DEFAULT_API_BASE: &str = "http://127.0.0.1:8900/v1";

static CLIENT: OnceCell<Client> = OnceCell::new();

fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("failed to build http client")
    })
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base: String,
    pub api_key: Option<String>,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let base = env::var("STATS_API_BASE")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let api_key = env::var("STATS_API_KEY")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        Self {
            base: base.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub fn enabled(&self) -> bool {
        self.api_key.is_some()
    }
}

#[derive(Debug)]
pub struct FetchOutcome {
    pub records: Vec<PlayerRecord>,
    /// Entries dropped for an unknown position or unusable identity.
    pub skipped: usize,
}

pub fn fetch_team_stats(
    cfg: &ApiConfig,
    team_code: &str,
    week: u16,
    season: i32,
) -> Result<FetchOutcome> {
    let team = team_names::name_for(team_code)
        .ok_or_else(|| anyhow!("unknown team code {team_code}"))?;
    let key = cfg
        .api_key
        .as_deref()
        .ok_or_else(|| anyhow!("no stats api key configured"))?;
    let url = format!(
        "{}/teams/{}/players?week={}&season={}",
        cfg.base, team_code, week, season
    );
    let payload = get_with_retry(&url, key)?;
    decode_team_payload(team, week, season, &payload)
}

/// Transport errors and 5xx responses retry with doubling backoff; 4xx fails
/// immediately since a retry cannot fix the request.
fn get_with_retry(url: &str, api_key: &str) -> Result<Value> {
    let client = http_client()?;
    let mut delay = Duration::from_secs(BACKOFF_BASE_SECS);
    let mut last_err: Option<anyhow::Error> = None;

    for attempt in 1..=FETCH_ATTEMPTS {
        match client.get(url).header("X-Api-Key", api_key).send() {
            Ok(resp) => {
                let status = resp.status();
                if status.is_success() {
                    return resp
                        .json::<Value>()
                        .with_context(|| format!("decode json from {url}"));
                }
                if !status.is_server_error() {
                    return Err(anyhow!("{url} returned {status}"));
                }
                last_err = Some(anyhow!("{url} returned {status}"));
            }
            Err(err) => {
                last_err = Some(anyhow::Error::new(err).context(format!("request {url}")));
            }
        }
        if attempt < FETCH_ATTEMPTS {
            eprintln!(
                "[stats_api] attempt {attempt}/{FETCH_ATTEMPTS} failed, retrying in {}s",
                delay.as_secs()
            );
            thread::sleep(delay);
            delay *= 2;
        }
    }
    Err(last_err.unwrap_or_else(|| anyhow!("request {url} failed")))
}

fn as_u64_any(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    if let Some(f) = value.as_f64()
        && f >= 0.0
    {
        return Some(f as u64);
    }
    value.as_str().and_then(|s| s.trim().parse::<u64>().ok())
}

fn decode_team_payload(
    team: &str,
    week: u16,
    season: i32,
    payload: &Value,
) -> Result<FetchOutcome> {
    let players = payload
        .get("players")
        .and_then(Value::as_array)
        .or_else(|| payload.as_array())
        .ok_or_else(|| anyhow!("payload for {team} has no player array"))?;

    let now = Utc::now().to_rfc3339();
    let mut records = Vec::new();
    let mut skipped = 0usize;

    for entry in players {
        let position = entry
            .get("position")
            .and_then(Value::as_str)
            .unwrap_or("")
            .trim()
            .to_string();
        let Some(group) = PositionGroup::parse(&position) else {
            skipped += 1;
            continue;
        };
        let player_id = entry.get("player_id").and_then(as_u64_any).unwrap_or(0) as u32;
        let player_name = entry
            .get("player_name")
            .and_then(Value::as_str)
            .unwrap_or("")
            .trim()
            .to_string();
        if player_id == 0 || player_name.is_empty() {
            skipped += 1;
            continue;
        }

        let source = entry
            .get("source")
            .and_then(Value::as_str)
            .map(Source::parse)
            .unwrap_or(Source::Api);
        let stats_value = entry.get("stats").cloned().unwrap_or_else(|| entry.clone());
        let stats = match GroupStats::from_json(group, &stats_value) {
            Ok(stats) => stats,
            Err(err) => {
                eprintln!("[stats_api] skip {player_name}: {err:#}");
                skipped += 1;
                continue;
            }
        };

        records.push(PlayerRecord {
            player_id,
            player_name,
            team: team.to_string(),
            position,
            week,
            season,
            source,
            last_updated: now.clone(),
            stats,
        });
    }

    Ok(FetchOutcome { records, skipped })
}
