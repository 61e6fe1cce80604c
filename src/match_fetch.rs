use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use reqwest::header::USER_AGENT;
use reqwest::StatusCode;

use crate::event_store::EventStore;
use crate::events::{parse_match_events_json, AnalysisError, RawEvent};
use crate::http_client::http_client;
use crate::match_stats::{goal_rows, team_stat_rows};
use crate::state::MatchAnalysis;
use crate::timeline::{build_match_series, normalize_events};

const DEFAULT_EVENTS_BASE_URL: &str =
    "https://raw.githubusercontent.com/statsbomb/open-data/master/data/events";

/// Where raw match events come from: a local data directory first, then one
/// blocking provider request. Constructed once at startup; tests build their
/// own pointing at fixture directories.
#[derive(Debug, Clone)]
pub struct EventSource {
    data_dir: PathBuf,
    base_url: Option<String>,
}

impl EventSource {
    pub fn new(data_dir: impl Into<PathBuf>, base_url: Option<String>) -> Self {
        Self {
            data_dir: data_dir.into(),
            base_url,
        }
    }

    pub fn from_env() -> Self {
        let data_dir = env::var("XG_DATA_DIR")
            .ok()
            .filter(|val| !val.trim().is_empty())
            .unwrap_or_else(|| "data".to_string());
        // Setting XG_EVENTS_BASE_URL to an empty string disables the remote
        // source entirely, so a missing local file becomes NotFound.
        let base_url = match env::var("XG_EVENTS_BASE_URL") {
            Ok(raw) => {
                let trimmed = raw.trim().trim_end_matches('/').to_string();
                if trimmed.is_empty() { None } else { Some(trimmed) }
            }
            Err(_) => Some(DEFAULT_EVENTS_BASE_URL.to_string()),
        };
        Self::new(data_dir, base_url)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn events_path(&self, match_id: &str) -> PathBuf {
        self.data_dir.join("events").join(format!("{match_id}.json"))
    }
}

fn valid_match_id(match_id: &str) -> bool {
    !match_id.is_empty()
        && match_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
}

/// Read-through load of one match's raw events. Cache hit skips the source;
/// a miss loads and populates. No retry, no single-flight.
pub fn fetch_match_events(
    source: &EventSource,
    store: &EventStore,
    match_id: &str,
) -> Result<Vec<RawEvent>, AnalysisError> {
    if !valid_match_id(match_id) {
        return Err(AnalysisError::Source(anyhow!(
            "invalid match id: {match_id:?}"
        )));
    }
    if let Some(events) = store.get(match_id) {
        return Ok(events);
    }
    let events = load_match_events(source, match_id)?;
    store.insert(match_id, events.clone());
    Ok(events)
}

fn load_match_events(
    source: &EventSource,
    match_id: &str,
) -> Result<Vec<RawEvent>, AnalysisError> {
    let path = source.events_path(match_id);
    if path.exists() {
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("read events file {}", path.display()))?;
        return Ok(parse_match_events_json(&raw)?);
    }

    let Some(base_url) = source.base_url.as_deref() else {
        return Err(AnalysisError::NotFound(match_id.to_string()));
    };
    fetch_remote_events(base_url, match_id)
}

fn fetch_remote_events(base_url: &str, match_id: &str) -> Result<Vec<RawEvent>, AnalysisError> {
    let client = http_client()?;
    let url = format!("{base_url}/{match_id}.json");
    let resp = client
        .get(&url)
        .header(USER_AGENT, "Mozilla/5.0")
        .send()
        .context("events request failed")?;
    let status = resp.status();
    if status == StatusCode::NOT_FOUND {
        return Err(AnalysisError::NotFound(match_id.to_string()));
    }
    let body = resp.text().context("failed reading events body")?;
    if !status.is_success() {
        return Err(AnalysisError::Source(anyhow!("http {status}: {body}")));
    }
    Ok(parse_match_events_json(&body)?)
}

/// One full analysis request: load, run the series pipeline, derive the side
/// panes. Terminal errors bubble out; everything else lands in warnings.
pub fn analyze_match(
    source: &EventSource,
    store: &EventStore,
    match_id: &str,
) -> Result<MatchAnalysis, AnalysisError> {
    let raw = fetch_match_events(source, store, match_id)?;
    let series = build_match_series(&raw)?;

    let normalized = normalize_events(&raw).events;
    let home = series.teams.first().map(String::as_str).unwrap_or_default();
    let away = series.teams.get(1).map(String::as_str);
    let stats = team_stat_rows(&normalized, home, away);
    let goals = goal_rows(&normalized);

    Ok(MatchAnalysis {
        match_id: match_id.to_string(),
        series,
        stats,
        goals,
    })
}
