use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::api::{self, ApiConfig, RawFeeds};
use crate::page::{self, PageData, PageLayout};
use crate::rounds::transform_rounds;
use crate::teams::{GroupSource, PreviousGroups, build_flat_teams, build_grouped_teams};

const DEFAULT_INDEX_PATH: &str = "index.html";

#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub api: ApiConfig,
    pub index_path: PathBuf,
    pub dry_run: bool,
    pub layout: PageLayout,
}

impl SyncConfig {
    pub fn from_env() -> Self {
        let index_path = env::var("MYGOL_INDEX_PATH")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_INDEX_PATH.to_string());
        Self {
            api: ApiConfig::from_env(),
            index_path: PathBuf::from(index_path),
            dry_run: env_bool("MYGOL_DRY_RUN", false),
            layout: PageLayout::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SyncSummary {
    pub mini_rounds: usize,
    pub pre_rounds: usize,
    pub flat_teams: usize,
    pub grouped_teams: usize,
    pub group_source: GroupSource,
    /// Teams that kept a group letter stored in the page.
    pub reused_groups: usize,
    pub changed: bool,
    pub written: bool,
}

pub fn run(config: &SyncConfig) -> Result<SyncSummary> {
    println!("[INFO] Fetching match and team data from {}", config.api.base_url);
    let feeds = api::fetch_feeds(&config.api)?;
    apply_feeds(config, &feeds)
}

/// Everything after the network: read the page, rebuild the block, write it back.
pub fn apply_feeds(config: &SyncConfig, feeds: &RawFeeds) -> Result<SyncSummary> {
    let path = config.index_path.as_path();
    let html = page::read_page(path)?;

    let previous = page::extract_previous_groups(&html, &config.layout).unwrap_or_else(|err| {
        eprintln!("[WARN] No previous group assignments: {err:#}");
        PreviousGroups::default()
    });

    let mini_teams = build_flat_teams(&feeds.mini_tournament)
        .with_context(|| format!("tournament {} teams", config.api.mini_tournament))?;
    let pre = build_grouped_teams(&feeds.pre_tournament, &previous)
        .with_context(|| format!("tournament {} teams", config.api.pre_tournament))?;
    if pre.source == GroupSource::Fallback {
        println!(
            "[INFO] No groups in tournament {}; reused {} of {} stored assignments",
            config.api.pre_tournament,
            pre.reused,
            previous.len()
        );
    }

    let data = PageData {
        mini_rounds: transform_rounds(&feeds.mini_fixtures),
        pre_rounds: transform_rounds(&feeds.pre_fixtures),
        flat_teams: mini_teams,
        grouped_teams: pre.teams,
    };

    let replacement = page::update_page(&html, &data, &config.layout)
        .with_context(|| format!("update {}", path.display()))?;

    let written = replacement.changed && !config.dry_run;
    if written {
        page::write_atomically(path, &replacement.text)?;
    } else if config.dry_run {
        println!("[INFO] Dry run; {} left untouched", path.display());
    } else {
        println!("[INFO] {} already up to date", path.display());
    }

    Ok(SyncSummary {
        mini_rounds: data.mini_rounds.len(),
        pre_rounds: data.pre_rounds.len(),
        flat_teams: data.flat_teams.len(),
        grouped_teams: data.grouped_teams.len(),
        group_source: pre.source,
        reused_groups: pre.reused,
        changed: replacement.changed,
        written,
    })
}

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .map(|v| {
            let t = v.trim().to_ascii_lowercase();
            !(t.is_empty() || t == "0" || t == "false" || t == "off" || t == "no")
        })
        .unwrap_or(default)
}
