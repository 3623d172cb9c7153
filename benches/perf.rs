use criterion::{Criterion, criterion_group, criterion_main};
use serde_json::{Value, json};
use std::hint::black_box;

use mygol_sync::page::{PageData, PageLayout, extract_previous_groups, update_page};
use mygol_sync::rounds::transform_rounds;
use mygol_sync::teams::{build_flat_teams, build_grouped_teams};

const PAGE: &str = "<script>\nconst MINI_MATCHES=[];\nconst PRE_MATCHES=[];\n\n\
// ── STATIC TEAMS ──────────────────────────────────────────\n\
const MT={};\nconst PT={\"1\":{\"n\":\"T1\",\"g\":\"B\"}};\n\n\
// ── STATE\nlet tab = 'mini';\n</script>\n";

fn season(teams: i64, rounds: usize) -> Value {
    let rounds = (0..rounds)
        .map(|r| {
            let matches = (0..teams / 2)
                .map(|i| {
                    json!({
                        "idHomeTeam": i + 1,
                        "idVisitorTeam": teams - i,
                        "startTime": format!("2024-10-{:02}T10:00:00", (r % 28) + 1),
                        "status": if r % 3 == 0 { 1 } else { 5 },
                        "field": { "name": format!("Campo {i}") }
                    })
                })
                .collect::<Vec<_>>();
            json!({ "name": format!("Jornada {}", r + 1), "idGroup": 40, "matches": matches })
        })
        .collect::<Vec<_>>();
    Value::Array(rounds)
}

fn tournament(teams: i64) -> Value {
    let list = (1..=teams)
        .map(|id| json!({ "id": id, "name": format!("T{id}") }))
        .collect::<Vec<_>>();
    json!({ "teams": list })
}

fn bench_sync(c: &mut Criterion) {
    let fixtures = season(24, 46);
    let teams = tournament(24);
    let layout = PageLayout::default();

    c.bench_function("transform_rounds_24x46", |b| {
        b.iter(|| black_box(transform_rounds(black_box(&fixtures))))
    });

    c.bench_function("update_page_full", |b| {
        b.iter(|| {
            let previous = extract_previous_groups(PAGE, &layout).unwrap_or_default();
            let data = PageData {
                mini_rounds: transform_rounds(&fixtures),
                pre_rounds: transform_rounds(&fixtures),
                flat_teams: build_flat_teams(&teams).expect("valid teams"),
                grouped_teams: build_grouped_teams(&teams, &previous)
                    .expect("valid teams")
                    .teams,
            };
            black_box(update_page(PAGE, &data, &layout).expect("anchors present"))
        })
    });
}

criterion_group!(benches, bench_sync);
criterion_main!(benches);
