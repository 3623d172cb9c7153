use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status the API uses for a match that has not been played yet.
pub const STATUS_NOT_PLAYED: i64 = 5;
pub const UNKNOWN_TEAM: i64 = -1;

const NULL_DATE_PREFIXES: &[&str] = &["0001", "1901"];
const START_TIME_LEN: usize = 16;

/// One jornada, in the compact shape the page script reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    #[serde(rename = "n")]
    pub name: String,
    #[serde(rename = "g")]
    pub group_id: i64,
    #[serde(rename = "m")]
    pub matches: Vec<MatchRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRow {
    #[serde(rename = "h")]
    pub home_id: i64,
    #[serde(rename = "v")]
    pub visitor_id: i64,
    #[serde(rename = "d")]
    pub start: String,
    #[serde(rename = "s")]
    pub status: i64,
    #[serde(rename = "f")]
    pub field: String,
}

pub fn transform_rounds(raw: &Value) -> Vec<Round> {
    let Some(items) = raw.as_array() else {
        return Vec::new();
    };
    items.iter().map(parse_round).collect()
}

fn parse_round(v: &Value) -> Round {
    let name = v
        .get("name")
        .and_then(|x| x.as_str())
        .unwrap_or_default()
        .to_string();
    let group_id = v.get("idGroup").and_then(|x| x.as_i64()).unwrap_or(0);
    let matches = v
        .get("matches")
        .and_then(|x| x.as_array())
        .map(|arr| arr.iter().map(parse_match).collect())
        .unwrap_or_default();

    Round {
        name,
        group_id,
        matches,
    }
}

fn parse_match(v: &Value) -> MatchRow {
    let field = v
        .get("field")
        .and_then(|f| f.get("name"))
        .and_then(|x| x.as_str())
        .unwrap_or_default()
        .to_string();

    MatchRow {
        home_id: team_id(v.get("idHomeTeam")),
        visitor_id: team_id(v.get("idVisitorTeam")),
        start: format_start_time(v.get("startTime").and_then(|x| x.as_str())),
        status: v
            .get("status")
            .and_then(|x| x.as_i64())
            .unwrap_or(STATUS_NOT_PLAYED),
        field,
    }
}

// Zero means "no team assigned yet" upstream.
fn team_id(v: Option<&Value>) -> i64 {
    match v.and_then(|x| x.as_i64()) {
        Some(id) if id != 0 => id,
        _ => UNKNOWN_TEAM,
    }
}

/// Reduces an ISO timestamp to `YYYY-MM-DDTHH:MM`, or "" for unset dates.
pub fn format_start_time(raw: Option<&str>) -> String {
    let Some(raw) = raw.filter(|s| !s.is_empty()) else {
        return String::new();
    };
    if NULL_DATE_PREFIXES.iter().any(|p| raw.starts_with(p)) {
        return String::new();
    }
    raw.chars().take(START_TIME_LEN).collect()
}
