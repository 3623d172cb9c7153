use std::fs;
use std::path::PathBuf;

use serde_json::Value;

use mygol_sync::rounds::{MatchRow, transform_rounds};
use mygol_sync::teams::{
    GroupLetter, GroupSource, PreviousGroups, build_flat_teams, build_grouped_teams,
};

fn read_fixture(name: &str) -> Value {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    let raw = fs::read_to_string(path).expect("fixture file should be readable");
    serde_json::from_str(&raw).expect("fixture should be json")
}

#[test]
fn parses_mini_fixtures() {
    let rounds = transform_rounds(&read_fixture("mini_fixtures.json"));
    assert_eq!(rounds.len(), 2);
    assert_eq!(rounds[0].name, "Jornada 1");
    assert_eq!(rounds[0].group_id, 40);
    assert_eq!(
        rounds[0].matches[0],
        MatchRow {
            home_id: 1,
            visitor_id: 2,
            start: "2024-03-10T10:00".to_string(),
            status: 1,
            field: String::new(),
        }
    );
    assert_eq!(
        rounds[1].matches[0],
        MatchRow {
            home_id: 2,
            visitor_id: 1,
            start: String::new(),
            status: 5,
            field: "Campo Norte".to_string(),
        }
    );
}

#[test]
fn parses_pre_fixtures_with_sentinels() {
    let rounds = transform_rounds(&read_fixture("pre_fixtures.json"));
    let m = &rounds[0].matches[0];
    assert_eq!(m.visitor_id, -1);
    assert_eq!(m.start, "");
    assert_eq!(m.field, "Pabellón Añaza");
}

#[test]
fn builds_flat_teams_from_tournament() {
    let mt = build_flat_teams(&read_fixture("mini_tournament.json")).expect("valid teams");
    assert_eq!(mt.len(), 2);
    assert_eq!(mt[&1], "Team A");
    assert_eq!(mt[&2], "Team B");
}

#[test]
fn grouped_teams_prefer_api_groups() {
    let prev = PreviousGroups::default();
    let res = build_grouped_teams(&read_fixture("pre_tournament_groups.json"), &prev)
        .expect("valid teams");
    assert_eq!(res.source, GroupSource::Api);
    assert_eq!(res.teams[&3].group, GroupLetter::C);
    assert_eq!(res.teams[&4].group, GroupLetter::D);
}

#[test]
fn grouped_teams_first_run_defaults_to_a() {
    let res = build_grouped_teams(
        &read_fixture("pre_tournament.json"),
        &PreviousGroups::default(),
    )
    .expect("valid teams");
    assert_eq!(res.source, GroupSource::Fallback);
    assert_eq!(res.teams.len(), 2);
    assert!(res.teams.values().all(|t| t.group == GroupLetter::A));
}
