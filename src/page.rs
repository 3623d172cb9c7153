use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::rounds::Round;
use crate::teams::{FlatTeams, GroupedTeams, PreviousGroups};

/// Names and markers the page script is written around.
#[derive(Debug, Clone, Copy)]
pub struct PageLayout {
    pub mini_rounds: &'static str,
    pub pre_rounds: &'static str,
    pub flat_teams: &'static str,
    pub grouped_teams: &'static str,
    pub teams_comment: &'static str,
    /// First line of the section that follows the replaceable region.
    pub end_marker: &'static str,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            mini_rounds: "MINI_MATCHES",
            pre_rounds: "PRE_MATCHES",
            flat_teams: "MT",
            grouped_teams: "PT",
            teams_comment: "// ── STATIC TEAMS ──────────────────────────────────────────",
            end_marker: "// ── STATE",
        }
    }
}

impl PageLayout {
    fn region_start(&self) -> String {
        format!("const {}=", self.mini_rounds)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    /// The page no longer has the markers around the data block.
    AnchorsNotFound { start: String, end: String },
}

impl fmt::Display for PageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AnchorsNotFound { start, end } => write!(
                f,
                "no region from `{start}` to `{end}` found; page structure may have changed"
            ),
        }
    }
}

impl std::error::Error for PageError {}

/// Everything written into the data block.
#[derive(Debug, Clone, Default)]
pub struct PageData {
    pub mini_rounds: Vec<Round>,
    pub pre_rounds: Vec<Round>,
    pub flat_teams: FlatTeams,
    pub grouped_teams: GroupedTeams,
}

#[derive(Debug, Clone)]
pub struct Replacement {
    pub text: String,
    /// False when the page already held exactly this data.
    pub changed: bool,
}

pub fn read_page(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Parses the grouped mapping an earlier run left in the page.
pub fn extract_previous_groups(html: &str, layout: &PageLayout) -> Result<PreviousGroups> {
    let pattern = format!(
        r"(?s)const {}=(\{{.*?\}});",
        regex::escape(layout.grouped_teams)
    );
    let re = Regex::new(&pattern).context("invalid grouped-teams pattern")?;
    let caps = re
        .captures(html)
        .ok_or_else(|| anyhow!("no `const {}=` block in page", layout.grouped_teams))?;
    let literal = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
    match serde_json::from_str::<Value>(literal)
        .with_context(|| format!("`{}` block is not valid json", layout.grouped_teams))?
    {
        Value::Object(obj) => Ok(PreviousGroups::from_json_object(obj)),
        _ => Err(anyhow!("`{}` block is not an object", layout.grouped_teams)),
    }
}

pub fn js_const<T: Serialize + ?Sized>(name: &str, value: &T) -> Result<String> {
    let json = serde_json::to_string(value).with_context(|| format!("serialize {name}"))?;
    Ok(format!("const {name}={json};"))
}

pub fn render_block(data: &PageData, layout: &PageLayout) -> Result<String> {
    let lines = [
        js_const(layout.mini_rounds, &data.mini_rounds)?,
        js_const(layout.pre_rounds, &data.pre_rounds)?,
        String::new(),
        layout.teams_comment.to_string(),
        js_const(layout.flat_teams, &data.flat_teams)?,
        js_const(layout.grouped_teams, &data.grouped_teams)?,
        String::new(),
    ];
    Ok(lines.join("\n"))
}

/// Swaps everything from the first rounds constant up to the end marker.
pub fn replace_region(html: &str, block: &str, layout: &PageLayout) -> Result<Replacement> {
    let start_anchor = layout.region_start();
    let span = html.find(&start_anchor).and_then(|start| {
        html[start..]
            .find(layout.end_marker)
            .map(|offset| (start, start + offset))
    });
    let Some((start, end)) = span else {
        return Err(PageError::AnchorsNotFound {
            start: start_anchor,
            end: layout.end_marker.to_string(),
        }
        .into());
    };

    let mut text = String::with_capacity(html.len() + block.len());
    text.push_str(&html[..start]);
    text.push_str(block);
    text.push('\n');
    text.push_str(&html[end..]);

    let changed = text != html;
    Ok(Replacement { text, changed })
}

pub fn update_page(html: &str, data: &PageData, layout: &PageLayout) -> Result<Replacement> {
    let block = render_block(data, layout)?;
    replace_region(html, &block, layout)
}

/// Writes next to the real file behind `path` and renames over it, so readers never
/// see a partial page. Symlinks keep pointing at the updated page and the page keeps
/// its permission bits.
pub fn write_atomically(path: &Path, text: &str) -> Result<()> {
    let target =
        fs::canonicalize(path).with_context(|| format!("failed to resolve {}", path.display()))?;
    let permissions = fs::metadata(&target)
        .with_context(|| format!("failed to stat {}", target.display()))?
        .permissions();

    let tmp = tmp_path(&target);
    fs::write(&tmp, text).with_context(|| format!("failed to write {}", tmp.display()))?;
    let swapped = fs::set_permissions(&tmp, permissions)
        .with_context(|| format!("failed to set permissions on {}", tmp.display()))
        .and_then(|()| {
            fs::rename(&tmp, &target)
                .with_context(|| format!("failed to replace {}", target.display()))
        });
    if swapped.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    swapped
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}
