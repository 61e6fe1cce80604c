use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Terminal failures for one match-analysis request. Event- and team-level
/// problems are absorbed into warnings and never surface here.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("match {0} not found")]
    NotFound(String),
    #[error("empty event data: {0}")]
    EmptyData(String),
    #[error(transparent)]
    Source(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawEvent {
    pub period: u8,
    #[serde(default)]
    pub timestamp: String,
    #[serde(rename = "type")]
    pub event_type: NamedRef,
    pub team: NamedRef,
    #[serde(default)]
    pub player: Option<NamedRef>,
    #[serde(default)]
    pub shot: Option<ShotDetail>,
    #[serde(default)]
    pub pass: Option<PassDetail>,
    #[serde(default)]
    pub substitution: Option<SubstitutionDetail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedRef {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShotDetail {
    #[serde(
        rename = "statsbomb_xg",
        default,
        deserialize_with = "xg_or_none"
    )]
    pub xg: Option<f64>,
    #[serde(default)]
    pub outcome: Option<NamedRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PassDetail {
    #[serde(default)]
    pub outcome: Option<NamedRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubstitutionDetail {
    #[serde(default)]
    pub outcome: Option<NamedRef>,
    #[serde(default)]
    pub replacement: Option<NamedRef>,
}

impl RawEvent {
    pub fn team_name(&self) -> &str {
        &self.team.name
    }

    pub fn event_type_name(&self) -> &str {
        &self.event_type.name
    }

    pub fn player_name(&self) -> Option<&str> {
        self.player.as_ref().map(|player| player.name.as_str())
    }

    pub fn shot_xg(&self) -> Option<f64> {
        self.shot.as_ref().and_then(|shot| shot.xg)
    }

    pub fn shot_outcome(&self) -> Option<&str> {
        self.shot
            .as_ref()
            .and_then(|shot| shot.outcome.as_ref())
            .map(|outcome| outcome.name.as_str())
    }

    pub fn pass_outcome(&self) -> Option<&str> {
        self.pass
            .as_ref()
            .and_then(|pass| pass.outcome.as_ref())
            .map(|outcome| outcome.name.as_str())
    }
}

/// Some exports stand in for "no xG" with a negative sentinel instead of
/// omitting the field. Anything below zero is not a probability, so it maps
/// to None here and gets its numeric default only inside the cumulative sum.
fn xg_or_none<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value.filter(|xg| *xg >= 0.0))
}

pub fn parse_match_events_json(raw: &str) -> Result<Vec<RawEvent>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    serde_json::from_str(trimmed).context("invalid match events json")
}
