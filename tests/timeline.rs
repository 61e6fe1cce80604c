use xg_terminal::events::{AnalysisError, NamedRef, RawEvent, ShotDetail};
use xg_terminal::timeline::{build_match_series, normalize_events};

fn raw_event(team: &str, event_type: &str, period: u8, timestamp: &str) -> RawEvent {
    RawEvent {
        period,
        timestamp: timestamp.to_string(),
        event_type: NamedRef {
            name: event_type.to_string(),
        },
        team: NamedRef {
            name: team.to_string(),
        },
        player: None,
        shot: None,
        pass: None,
        substitution: None,
    }
}

fn shot(
    team: &str,
    period: u8,
    timestamp: &str,
    xg: Option<f64>,
    outcome: Option<&str>,
) -> RawEvent {
    let mut event = raw_event(team, "Shot", period, timestamp);
    event.shot = Some(ShotDetail {
        xg,
        outcome: outcome.map(|name| NamedRef {
            name: name.to_string(),
        }),
    });
    event
}

fn rows_for<'a>(
    rows: &'a [xg_terminal::timeline::PlotSeriesRow],
    team: &str,
) -> Vec<&'a xg_terminal::timeline::PlotSeriesRow> {
    rows.iter().filter(|row| row.team == team).collect()
}

// Two teams, one of them without a single shot: the shotless team contributes
// zero rows and the other team's lines are padded out to minute 90.
#[test]
fn two_team_match_with_one_shotless_team() {
    let events = vec![
        shot("Team X", 1, "00:10:00.000", Some(0.1), Some("Goal")),
        raw_event("Team Y", "Pass", 1, "00:11:00.000"),
        shot("Team X", 2, "00:35:00.000", Some(0.3), Some("Off T")),
    ];

    let series = build_match_series(&events).expect("two-team match should build");
    assert_eq!(series.teams, vec!["Team X", "Team Y"]);

    let x_xg = rows_for(&series.xg, "Team X");
    let minutes: Vec<u32> = x_xg.iter().map(|row| row.minute).collect();
    let values: Vec<f64> = x_xg.iter().map(|row| row.value).collect();
    assert_eq!(minutes, vec![10, 80, 90]);
    assert!((values[0] - 0.1).abs() < 1e-9);
    assert!((values[1] - 0.4).abs() < 1e-9);
    assert!((values[2] - 0.4).abs() < 1e-9);
    assert!(x_xg.iter().all(|row| row.metric == "Cumulative xG"));

    let x_goals = rows_for(&series.goals, "Team X");
    assert_eq!(
        x_goals.iter().map(|row| row.minute).collect::<Vec<_>>(),
        vec![10, 80, 90]
    );
    assert!(x_goals.iter().all(|row| (row.value - 1.0).abs() < 1e-9));
    assert!(x_goals.iter().all(|row| row.metric == "Total Goals"));

    assert!(rows_for(&series.xg, "Team Y").is_empty());
    assert!(rows_for(&series.goals, "Team Y").is_empty());
    assert!(series
        .warnings
        .iter()
        .any(|warning| warning.contains("Team Y") && warning.contains("no shots")));
}

// A penalty-shootout shot ten minutes into period 5 lands at minute 130 on
// the running clock, well inside that period's 225-minute clamp.
#[test]
fn penalty_period_minutes_extend_past_120() {
    let events = vec![
        shot("Team X", 1, "00:01:00.000", Some(0.05), None),
        shot("Team X", 5, "00:10:00.000", Some(0.7), Some("Goal")),
    ];

    let series = build_match_series(&events).expect("shootout match should build");
    let minutes: Vec<u32> = rows_for(&series.xg, "Team X")
        .iter()
        .map(|row| row.minute)
        .collect();
    assert_eq!(minutes, vec![1, 130]);
    assert_eq!(series.max_minute, 130);
    assert_eq!(series.max_period, 5);
}

// A lone shot with no xG value yields cum_xg 0.0, not an error.
#[test]
fn missing_xg_defaults_to_zero_contribution() {
    let events = vec![shot("Team X", 1, "00:03:00.000", None, Some("Saved"))];

    let series = build_match_series(&events).expect("single-shot match should build");
    let x_xg = rows_for(&series.xg, "Team X");
    assert_eq!(x_xg[0].minute, 3);
    assert!((x_xg[0].value - 0.0).abs() < 1e-9);
}

#[test]
fn combined_series_row_count_is_the_sum_of_team_rows() {
    let events = vec![
        shot("A", 1, "00:05:00.000", Some(0.1), None),
        shot("B", 1, "00:06:00.000", Some(0.2), None),
        shot("A", 2, "00:20:00.000", Some(0.1), None),
        shot("C", 2, "00:30:00.000", Some(0.4), Some("Goal")),
    ];

    let series = build_match_series(&events).expect("three-team data should build");
    for combined in [&series.xg, &series.goals] {
        let per_team: usize = series
            .teams
            .iter()
            .map(|team| rows_for(combined, team).len())
            .sum();
        assert_eq!(combined.len(), per_team);
    }

    // Each team's rows stay internally ordered by minute.
    for team in &series.teams {
        let minutes: Vec<u32> = rows_for(&series.xg, team)
            .iter()
            .map(|row| row.minute)
            .collect();
        let mut sorted = minutes.clone();
        sorted.sort_unstable();
        assert_eq!(minutes, sorted);
    }
}

#[test]
fn clamp_holds_for_every_period() {
    let events: Vec<RawEvent> = (1..=5)
        .map(|period| shot("Team X", period, "23:59:00.000", Some(0.1), None))
        .collect();

    let outcome = normalize_events(&events);
    assert_eq!(outcome.events.len(), 5);
    for event in &outcome.events {
        assert!(event.minute <= u32::from(event.period) * 45);
    }
}

#[test]
fn empty_match_is_terminal_empty_data() {
    let err = build_match_series(&[]).expect_err("no events must not build");
    assert!(matches!(err, AnalysisError::EmptyData(_)));
}

#[test]
fn all_timestamps_invalid_is_terminal_empty_data() {
    let events = vec![
        raw_event("Team X", "Pass", 1, "bogus"),
        raw_event("Team Y", "Pass", 1, ""),
    ];
    let err = build_match_series(&events).expect_err("unusable timestamps must not build");
    assert!(matches!(err, AnalysisError::EmptyData(_)));
}

#[test]
fn undefined_periods_are_dropped_not_fatal() {
    let events = vec![
        shot("Team X", 1, "00:02:00.000", Some(0.2), None),
        shot("Team X", 7, "00:02:30.000", Some(0.9), None),
    ];

    let series = build_match_series(&events).expect("one good event should build");
    assert_eq!(rows_for(&series.xg, "Team X").len(), 2);
    assert!(series
        .warnings
        .iter()
        .any(|warning| warning.contains("undefined periods")));
}
