use std::collections::BTreeMap;
use std::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Where the API may expose group membership, in priority order.
pub const GROUP_FIELDS: &[&str] = &["groups", "roundGroups", "groupsRounds"];

pub type FlatTeams = BTreeMap<i64, String>;
pub type GroupedTeams = BTreeMap<i64, GroupedTeam>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GroupLetter {
    #[default]
    A,
    B,
    C,
    D,
}

impl GroupLetter {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'A' => Some(Self::A),
            'B' => Some(Self::B),
            'C' => Some(Self::C),
            'D' => Some(Self::D),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupedTeam {
    #[serde(rename = "n")]
    pub name: String,
    #[serde(rename = "g")]
    pub group: GroupLetter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupSource {
    /// Letters came from a groups structure in the tournament document.
    Api,
    /// No groups structure; letters were carried over from the page.
    Fallback,
}

#[derive(Debug, Clone)]
pub struct GroupedResolution {
    pub teams: GroupedTeams,
    pub source: GroupSource,
    /// Fallback teams whose letter came from the page rather than the default.
    pub reused: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeamError {
    Malformed { index: usize, field: &'static str },
}

impl fmt::Display for TeamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed { index, field } => {
                write!(f, "team record #{index} has no usable `{field}`")
            }
        }
    }
}

impl std::error::Error for TeamError {}

/// Group letters persisted by an earlier run, keyed by numeric team id.
///
/// Keys in the page are JSON strings; anything that parses as an integer is
/// accepted so both `5` and `"5"` style producers resolve to the same team.
#[derive(Debug, Clone, Default)]
pub struct PreviousGroups {
    entries: BTreeMap<i64, Value>,
}

impl PreviousGroups {
    pub fn from_json_object(obj: Map<String, Value>) -> Self {
        let entries = obj
            .into_iter()
            .filter_map(|(k, v)| k.trim().parse::<i64>().ok().map(|id| (id, v)))
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Letter for `id`, if the stored entry is an object with a valid `g`.
    pub fn letter_for(&self, id: i64) -> Option<GroupLetter> {
        let g = self.entries.get(&id)?.as_object()?.get("g")?.as_str()?;
        let mut chars = g.chars();
        let c = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        GroupLetter::from_char(c)
    }
}

pub fn build_flat_teams(tournament: &Value) -> Result<FlatTeams> {
    let mut out = FlatTeams::new();
    for (index, team) in team_list(tournament).iter().enumerate() {
        let (id, name) = parse_team(team, index)?;
        out.insert(id, name);
    }
    Ok(out)
}

pub fn build_grouped_teams(
    tournament: &Value,
    previous: &PreviousGroups,
) -> Result<GroupedResolution> {
    let mut teams = GroupedTeams::new();

    if let Some(groups) = find_groups(tournament) {
        for group in groups {
            let letter = group_letter(group.get("name").and_then(|x| x.as_str()).unwrap_or(""));
            for (index, team) in team_list(group).iter().enumerate() {
                let (id, name) = parse_team(team, index)?;
                teams.insert(
                    id,
                    GroupedTeam {
                        name,
                        group: letter,
                    },
                );
            }
        }
    }

    if !teams.is_empty() {
        return Ok(GroupedResolution {
            teams,
            source: GroupSource::Api,
            reused: 0,
        });
    }

    let mut reused = 0;
    for (index, team) in team_list(tournament).iter().enumerate() {
        let (id, name) = parse_team(team, index)?;
        let group = match previous.letter_for(id) {
            Some(letter) => {
                reused += 1;
                letter
            }
            None => GroupLetter::default(),
        };
        teams.insert(id, GroupedTeam { name, group });
    }
    Ok(GroupedResolution {
        teams,
        source: GroupSource::Fallback,
        reused,
    })
}

/// First candidate field that holds a non-empty array.
pub fn find_groups(tournament: &Value) -> Option<&Vec<Value>> {
    GROUP_FIELDS.iter().find_map(|field| {
        tournament
            .get(*field)
            .and_then(|x| x.as_array())
            .filter(|arr| !arr.is_empty())
    })
}

/// "Grupo A" -> A, "grupo c" -> C; anything outside A-D is A.
pub fn group_letter(display_name: &str) -> GroupLetter {
    display_name
        .trim()
        .chars()
        .next_back()
        .and_then(|c| c.to_uppercase().next())
        .and_then(GroupLetter::from_char)
        .unwrap_or_default()
}

fn team_list(v: &Value) -> &[Value] {
    v.get("teams")
        .and_then(|x| x.as_array())
        .map(|arr| arr.as_slice())
        .unwrap_or(&[])
}

fn parse_team(v: &Value, index: usize) -> Result<(i64, String)> {
    let id = v
        .get("id")
        .and_then(team_id)
        .ok_or(TeamError::Malformed { index, field: "id" })?;
    let name = v
        .get("name")
        .and_then(|x| x.as_str())
        .ok_or(TeamError::Malformed {
            index,
            field: "name",
        })?;
    Ok((id, name.to_string()))
}

// Some endpoints send ids as numeric strings.
fn team_id(v: &Value) -> Option<i64> {
    match v {
        Value::String(s) => s.trim().parse().ok(),
        _ => v.as_i64(),
    }
}
