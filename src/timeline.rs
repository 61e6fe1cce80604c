use chrono::{Duration, NaiveTime, Timelike};

use crate::events::{AnalysisError, RawEvent};

pub const FULL_TIME_MINUTE: u32 = 90;

pub const CUM_XG_COLUMN: &str = "cum_xg";
pub const CUM_GOALS_COLUMN: &str = "cum_goals";
pub const XG_LABEL: &str = "Cumulative xG";
pub const GOALS_LABEL: &str = "Total Goals";

const SHOT_EVENT: &str = "Shot";
const GOAL_OUTCOME: &str = "Goal";

#[derive(Debug, Clone)]
pub struct NormalizedEvent {
    pub team: String,
    pub event_type: String,
    pub timestamp: String,
    pub period: u8,
    pub minute: u32,
    pub player: Option<String>,
    pub shot_xg: Option<f64>,
    pub shot_outcome: Option<String>,
    pub pass_outcome: Option<String>,
}

#[derive(Debug, Default)]
pub struct NormalizeOutcome {
    pub events: Vec<NormalizedEvent>,
    pub dropped_timestamps: usize,
    pub dropped_periods: usize,
}

#[derive(Debug, Clone)]
pub struct TeamMetricRow {
    pub team: String,
    pub event_type: String,
    pub shot_xg: Option<f64>,
    pub timestamp: String,
    pub minute: u32,
    pub period: u8,
    pub shot_outcome: Option<String>,
    pub cum_xg: f64,
    pub cum_goals: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlotSeriesRow {
    pub minute: u32,
    pub metric: String,
    pub value: f64,
    pub team: String,
}

#[derive(Debug, Clone, Default)]
pub struct MatchSeries {
    pub xg: Vec<PlotSeriesRow>,
    pub goals: Vec<PlotSeriesRow>,
    pub teams: Vec<String>,
    pub max_minute: u32,
    pub max_period: u8,
    pub warnings: Vec<String>,
}

/// Additive baseline aligning each period's restarted clock to one running
/// match clock. Periods outside 1..=5 have no defined offset.
pub fn period_offset(period: u8) -> Option<i64> {
    match period {
        1 => Some(0),
        2 => Some(45),
        3 => Some(90),
        4 => Some(105),
        5 => Some(120),
        _ => None,
    }
}

fn parse_event_time(raw: &str) -> Option<NaiveTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .ok()
}

/// Converts each event's period-local timestamp into a clamped match minute.
/// Events with unparseable timestamps or undefined periods are dropped and
/// counted, never fatal. Timestamps are assumed same-day.
pub fn normalize_events(raw: &[RawEvent]) -> NormalizeOutcome {
    let mut outcome = NormalizeOutcome {
        events: Vec::with_capacity(raw.len()),
        ..NormalizeOutcome::default()
    };

    for event in raw {
        let Some(offset) = period_offset(event.period) else {
            outcome.dropped_periods += 1;
            continue;
        };
        let Some(time) = parse_event_time(&event.timestamp) else {
            outcome.dropped_timestamps += 1;
            continue;
        };

        let (shifted, _) = time.overflowing_add_signed(Duration::minutes(offset));
        let minute = shifted.hour() * 60 + shifted.minute();
        // A period cannot report a minute beyond its own nominal maximum;
        // this guards against clock-rollover artifacts in the source.
        let cap = u32::from(event.period) * 45;

        outcome.events.push(NormalizedEvent {
            team: event.team_name().to_string(),
            event_type: event.event_type_name().to_string(),
            timestamp: event.timestamp.clone(),
            period: event.period,
            minute: minute.min(cap),
            player: event.player_name().map(str::to_string),
            shot_xg: event.shot_xg(),
            shot_outcome: event.shot_outcome().map(str::to_string),
            pass_outcome: event.pass_outcome().map(str::to_string),
        });
    }

    outcome
}

/// Team names in first-encountered order. Empty names do not count as a team.
pub fn distinct_teams(events: &[NormalizedEvent]) -> Vec<String> {
    let mut teams: Vec<String> = Vec::new();
    for event in events {
        if event.team.is_empty() {
            continue;
        }
        if !teams.iter().any(|team| team == &event.team) {
            teams.push(event.team.clone());
        }
    }
    teams
}

/// Running xG sum and goal count over one team's shots, in source order.
/// A missing xG value contributes 0.0; a team with no shots yields no rows.
pub fn cumulative_shot_metrics(team_events: &[NormalizedEvent]) -> Vec<TeamMetricRow> {
    let mut rows = Vec::new();
    let mut cum_xg = 0.0;
    let mut cum_goals = 0u32;

    for event in team_events.iter().filter(|e| e.event_type == SHOT_EVENT) {
        cum_xg += event.shot_xg.unwrap_or(0.0);
        if event.shot_outcome.as_deref() == Some(GOAL_OUTCOME) {
            cum_goals += 1;
        }
        rows.push(TeamMetricRow {
            team: event.team.clone(),
            event_type: event.event_type.clone(),
            shot_xg: event.shot_xg,
            timestamp: event.timestamp.clone(),
            minute: event.minute,
            period: event.period,
            shot_outcome: event.shot_outcome.clone(),
            cum_xg,
            cum_goals,
        });
    }

    rows
}

pub fn metric_label(name: &str) -> String {
    let spaced = name.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => spaced,
    }
}

/// Wide-to-tidy reshape of one cumulative column. An unknown column name is
/// reported as a warning and yields an empty series, not an error.
pub fn reshape_metric(
    rows: &[TeamMetricRow],
    column: &str,
    label: &str,
    warnings: &mut Vec<String>,
) -> Vec<PlotSeriesRow> {
    let pick: fn(&TeamMetricRow) -> f64 = match column {
        CUM_XG_COLUMN => |row| row.cum_xg,
        CUM_GOALS_COLUMN => |row| f64::from(row.cum_goals),
        other => {
            warnings.push(format!("[WARN] Unknown metric column '{other}', skipping"));
            return Vec::new();
        }
    };

    let metric = metric_label(label);
    rows.iter()
        .map(|row| PlotSeriesRow {
            minute: row.minute,
            metric: metric.clone(),
            value: pick(row),
            team: row.team.clone(),
        })
        .collect()
}

/// Carries the last known value forward to the 90-minute mark so a team with
/// an early final shot does not appear to end the match early. Strictly `<`,
/// so re-running on already-extended data is a no-op.
pub fn extend_to_full_time(rows: &mut Vec<PlotSeriesRow>) {
    let Some(max_minute) = rows.iter().map(|row| row.minute).max() else {
        return;
    };
    if max_minute < FULL_TIME_MINUTE {
        if let Some(last) = rows.last() {
            let mut extended = last.clone();
            extended.minute = FULL_TIME_MINUTE.max(max_minute);
            rows.push(extended);
        }
    }
}

/// The whole pipeline for one match: normalize, slice per team, aggregate,
/// reshape both metrics, extend, concatenate. Per-team gaps become warnings;
/// only match-level emptiness is terminal.
pub fn build_match_series(raw: &[RawEvent]) -> Result<MatchSeries, AnalysisError> {
    if raw.is_empty() {
        return Err(AnalysisError::EmptyData("match has no events".to_string()));
    }

    let outcome = normalize_events(raw);
    let mut warnings = Vec::new();
    if outcome.dropped_timestamps > 0 {
        warnings.push(format!(
            "[WARN] Dropped {} events with unparseable timestamps",
            outcome.dropped_timestamps
        ));
    }
    if outcome.dropped_periods > 0 {
        warnings.push(format!(
            "[WARN] Dropped {} events with undefined periods",
            outcome.dropped_periods
        ));
    }
    if outcome.events.is_empty() {
        return Err(AnalysisError::EmptyData(
            "no events with usable timestamps".to_string(),
        ));
    }

    let teams = distinct_teams(&outcome.events);
    if teams.is_empty() {
        return Err(AnalysisError::EmptyData(
            "no teams present in event data".to_string(),
        ));
    }

    let mut xg = Vec::new();
    let mut goals = Vec::new();
    for team in &teams {
        let slice: Vec<NormalizedEvent> = outcome
            .events
            .iter()
            .filter(|event| &event.team == team)
            .cloned()
            .collect();
        let metrics = cumulative_shot_metrics(&slice);
        if metrics.is_empty() {
            warnings.push(format!("[INFO] {team}: no shots, no series contributed"));
            continue;
        }

        let mut team_xg = reshape_metric(&metrics, CUM_XG_COLUMN, XG_LABEL, &mut warnings);
        extend_to_full_time(&mut team_xg);
        xg.extend(team_xg);

        let mut team_goals = reshape_metric(&metrics, CUM_GOALS_COLUMN, GOALS_LABEL, &mut warnings);
        extend_to_full_time(&mut team_goals);
        goals.extend(team_goals);
    }

    if xg.is_empty() && goals.is_empty() {
        return Err(AnalysisError::EmptyData(
            "no team produced a usable series".to_string(),
        ));
    }

    let max_minute = xg
        .iter()
        .chain(goals.iter())
        .map(|row| row.minute)
        .max()
        .unwrap_or(FULL_TIME_MINUTE);
    let max_period = outcome
        .events
        .iter()
        .map(|event| event.period)
        .max()
        .unwrap_or(1);

    Ok(MatchSeries {
        xg,
        goals,
        teams,
        max_minute,
        max_period,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shot(team: &str, minute: u32, xg: Option<f64>, outcome: Option<&str>) -> NormalizedEvent {
        NormalizedEvent {
            team: team.to_string(),
            event_type: "Shot".to_string(),
            timestamp: String::new(),
            period: 1,
            minute,
            player: None,
            shot_xg: xg,
            shot_outcome: outcome.map(str::to_string),
            pass_outcome: None,
        }
    }

    #[test]
    fn period_offsets_match_running_clock() {
        assert_eq!(period_offset(1), Some(0));
        assert_eq!(period_offset(2), Some(45));
        assert_eq!(period_offset(3), Some(90));
        assert_eq!(period_offset(4), Some(105));
        assert_eq!(period_offset(5), Some(120));
        assert_eq!(period_offset(0), None);
        assert_eq!(period_offset(6), None);
    }

    #[test]
    fn cumulative_metrics_are_monotone_and_default_missing_xg() {
        let events = vec![
            shot("A", 10, Some(0.1), Some("Goal")),
            shot("A", 20, None, Some("Missed")),
            shot("A", 30, Some(0.3), Some("Goal")),
        ];
        let rows = cumulative_shot_metrics(&events);
        assert_eq!(rows.len(), 3);
        assert!((rows[0].cum_xg - 0.1).abs() < 1e-9);
        assert!((rows[1].cum_xg - 0.1).abs() < 1e-9);
        assert!((rows[2].cum_xg - 0.4).abs() < 1e-9);
        assert_eq!(
            rows.iter().map(|r| r.cum_goals).collect::<Vec<_>>(),
            vec![1, 1, 2]
        );
        assert!(rows.windows(2).all(|w| w[0].cum_xg <= w[1].cum_xg));
        assert!(rows.windows(2).all(|w| w[0].cum_goals <= w[1].cum_goals));
    }

    #[test]
    fn aggregator_ignores_non_shot_events() {
        let mut events = vec![shot("A", 10, Some(0.2), None)];
        events.push(NormalizedEvent {
            event_type: "Pass".to_string(),
            ..shot("A", 11, Some(0.9), None)
        });
        let rows = cumulative_shot_metrics(&events);
        assert_eq!(rows.len(), 1);
        assert!((rows[0].cum_xg - 0.2).abs() < 1e-9);
    }

    #[test]
    fn metric_label_replaces_underscores_and_capitalizes() {
        assert_eq!(metric_label("cum_xg"), "Cum xg");
        assert_eq!(metric_label("Cumulative xG"), "Cumulative xG");
        assert_eq!(metric_label("total_goals"), "Total goals");
        assert_eq!(metric_label(""), "");
    }

    #[test]
    fn reshape_unknown_column_warns_and_returns_empty() {
        let rows = cumulative_shot_metrics(&[shot("A", 5, Some(0.5), None)]);
        let mut warnings = Vec::new();
        let series = reshape_metric(&rows, "cum_possession", "Possession", &mut warnings);
        assert!(series.is_empty());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("cum_possession"));
    }

    #[test]
    fn extender_pads_to_ninety_and_is_idempotent() {
        let rows = cumulative_shot_metrics(&[shot("A", 40, Some(0.4), None)]);
        let mut warnings = Vec::new();
        let mut series = reshape_metric(&rows, CUM_XG_COLUMN, XG_LABEL, &mut warnings);

        extend_to_full_time(&mut series);
        assert_eq!(series.len(), 2);
        assert_eq!(series[1].minute, 90);
        assert!((series[1].value - 0.4).abs() < 1e-9);

        let once = series.clone();
        extend_to_full_time(&mut series);
        assert_eq!(series, once);
    }

    #[test]
    fn extender_leaves_late_series_alone() {
        let mut series = vec![PlotSeriesRow {
            minute: 103,
            metric: "Cumulative xG".to_string(),
            value: 1.2,
            team: "A".to_string(),
        }];
        extend_to_full_time(&mut series);
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn extender_is_a_no_op_on_empty_input() {
        let mut series: Vec<PlotSeriesRow> = Vec::new();
        extend_to_full_time(&mut series);
        assert!(series.is_empty());
    }

    #[test]
    fn distinct_teams_preserve_first_encounter_order() {
        let events = vec![
            shot("Away FC", 1, None, None),
            shot("Home FC", 2, None, None),
            shot("Away FC", 3, None, None),
        ];
        assert_eq!(distinct_teams(&events), vec!["Away FC", "Home FC"]);
    }
}
