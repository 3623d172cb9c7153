use std::path::PathBuf;
use std::process::ExitCode;

use mygol_sync::sync::{self, SyncConfig};

fn main() -> ExitCode {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let mut config = SyncConfig::from_env();
    if let Some(path) = parse_index_arg() {
        config.index_path = path;
    }
    if std::env::args().skip(1).any(|arg| arg == "--dry-run") {
        config.dry_run = true;
    }

    match sync::run(&config) {
        Ok(summary) => {
            println!(
                "Done! MINI: {} jornadas | PRE: {} jornadas | MT: {} teams | PT: {} teams",
                summary.mini_rounds, summary.pre_rounds, summary.flat_teams, summary.grouped_teams
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("ERROR: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn parse_index_arg() -> Option<PathBuf> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix("--index=") {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        if arg == "--index" {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(PathBuf::from(next));
            }
        }
    }
    None
}
