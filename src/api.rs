use std::env;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::blocking::Client;
use serde_json::Value;

use crate::http_client::http_client;

pub const DEFAULT_API_BASE: &str = "https://tusligascanarias.mygol.es/api";
pub const DEFAULT_MINI_TOURNAMENT: u32 = 85;
pub const DEFAULT_PRE_TOURNAMENT: u32 = 87;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    /// Minibenjamín, no subgroups.
    pub mini_tournament: u32,
    /// Prebenjamín, split into lettered groups.
    pub pre_tournament: u32,
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            mini_tournament: DEFAULT_MINI_TOURNAMENT,
            pre_tournament: DEFAULT_PRE_TOURNAMENT,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let base_url = env::var("MYGOL_API_BASE")
            .ok()
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let mini_tournament = env_u32("MYGOL_MINI_TOURNAMENT", DEFAULT_MINI_TOURNAMENT);
        let pre_tournament = env_u32("MYGOL_PRE_TOURNAMENT", DEFAULT_PRE_TOURNAMENT);
        let timeout_secs = env::var("MYGOL_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .clamp(5, 300);

        Self {
            base_url,
            mini_tournament,
            pre_tournament,
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

/// The four documents one run needs, as decoded JSON.
#[derive(Debug, Clone)]
pub struct RawFeeds {
    pub mini_fixtures: Value,
    pub pre_fixtures: Value,
    pub mini_tournament: Value,
    pub pre_tournament: Value,
}

pub fn fixtures_url(base: &str, tournament_id: u32) -> String {
    format!("{base}/matches/fortournament/{tournament_id}")
}

pub fn tournament_url(base: &str, tournament_id: u32) -> String {
    format!("{base}/tournaments/{tournament_id}")
}

pub fn fetch_feeds(config: &ApiConfig) -> Result<RawFeeds> {
    let client = http_client(config.timeout)?;
    let base = config.base_url.as_str();

    let mini_fixtures = fetch_json(client, &fixtures_url(base, config.mini_tournament))?;
    let pre_fixtures = fetch_json(client, &fixtures_url(base, config.pre_tournament))?;
    let mini_tournament = fetch_json(client, &tournament_url(base, config.mini_tournament))?;
    let pre_tournament = fetch_json(client, &tournament_url(base, config.pre_tournament))?;

    Ok(RawFeeds {
        mini_fixtures,
        pre_fixtures,
        mini_tournament,
        pre_tournament,
    })
}

pub fn fetch_json(client: &Client, url: &str) -> Result<Value> {
    let resp = client
        .get(url)
        .send()
        .with_context(|| format!("request failed: {url}"))?;
    let status = resp.status();
    let body = resp
        .text()
        .with_context(|| format!("failed reading body: {url}"))?;
    if !status.is_success() {
        return Err(anyhow!("http {status} from {url}"));
    }
    parse_json_body(&body).with_context(|| format!("invalid json from {url}"))
}

pub fn parse_json_body(body: &str) -> Result<Value> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("empty response body"));
    }
    Ok(serde_json::from_str(trimmed)?)
}

fn env_u32(key: &str, default: u32) -> u32 {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u32>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_follow_api_layout() {
        assert_eq!(
            fixtures_url(DEFAULT_API_BASE, 85),
            "https://tusligascanarias.mygol.es/api/matches/fortournament/85"
        );
        assert_eq!(
            tournament_url(DEFAULT_API_BASE, 87),
            "https://tusligascanarias.mygol.es/api/tournaments/87"
        );
    }

    #[test]
    fn non_json_body_is_an_error() {
        assert!(parse_json_body("<html>maintenance</html>").is_err());
        assert!(parse_json_body("   ").is_err());
        assert!(parse_json_body("[]").expect("array").is_array());
    }
}
