use crate::timeline::NormalizedEvent;

const PASS_EVENT: &str = "Pass";
const SHOT_EVENT: &str = "Shot";
const SUBSTITUTION_EVENT: &str = "Substitution";
const INCOMPLETE_OUTCOME: &str = "Incomplete";
const GOAL_OUTCOME: &str = "Goal";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatRow {
    pub name: String,
    pub home: String,
    pub away: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalRow {
    pub team: String,
    pub minute: u32,
    pub player: String,
}

struct TeamCounts {
    passes: usize,
    passes_complete: usize,
    shots: usize,
    substitutions: usize,
}

fn count_team(events: &[NormalizedEvent], team: &str) -> TeamCounts {
    let mut passes = 0;
    let mut incomplete = 0;
    let mut shots = 0;
    let mut substitutions = 0;

    for event in events.iter().filter(|e| e.team == team) {
        match event.event_type.as_str() {
            PASS_EVENT => {
                passes += 1;
                if event.pass_outcome.as_deref() == Some(INCOMPLETE_OUTCOME) {
                    incomplete += 1;
                }
            }
            SHOT_EVENT => shots += 1,
            SUBSTITUTION_EVENT => substitutions += 1,
            _ => {}
        }
    }

    TeamCounts {
        passes,
        passes_complete: passes - incomplete,
        shots,
        substitutions,
    }
}

/// Side-by-side match stats for the chart screen. A pass with no recorded
/// outcome counts as complete, matching how the source data marks failures
/// only.
pub fn team_stat_rows(
    events: &[NormalizedEvent],
    home: &str,
    away: Option<&str>,
) -> Vec<StatRow> {
    let home_counts = count_team(events, home);
    let away_counts = away.map(|team| count_team(events, team));

    let cell = |value: Option<usize>| match value {
        Some(count) => count.to_string(),
        None => "-".to_string(),
    };

    vec![
        StatRow {
            name: "Shots".to_string(),
            home: home_counts.shots.to_string(),
            away: cell(away_counts.as_ref().map(|c| c.shots)),
        },
        StatRow {
            name: "Passes Attempted".to_string(),
            home: home_counts.passes.to_string(),
            away: cell(away_counts.as_ref().map(|c| c.passes)),
        },
        StatRow {
            name: "Passes Completed".to_string(),
            home: home_counts.passes_complete.to_string(),
            away: cell(away_counts.as_ref().map(|c| c.passes_complete)),
        },
        StatRow {
            name: "Substitutions".to_string(),
            home: home_counts.substitutions.to_string(),
            away: cell(away_counts.as_ref().map(|c| c.substitutions)),
        },
    ]
}

/// Goal scorers with match minutes, in event order.
pub fn goal_rows(events: &[NormalizedEvent]) -> Vec<GoalRow> {
    events
        .iter()
        .filter(|event| {
            event.event_type == SHOT_EVENT
                && event.shot_outcome.as_deref() == Some(GOAL_OUTCOME)
        })
        .map(|event| GoalRow {
            team: event.team.clone(),
            minute: event.minute,
            player: event
                .player
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
        })
        .collect()
}
