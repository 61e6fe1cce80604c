use ratatui::style::{Color, Style};
use ratatui::symbols::Marker;
use ratatui::text::Span;
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, GraphType};

use crate::timeline::{MatchSeries, PlotSeriesRow, FULL_TIME_MINUTE};

const TEAM_COLORS: [Color; 4] = [Color::Cyan, Color::Magenta, Color::Green, Color::Yellow];

/// One plotted line: a (team, metric) pair with its points precomputed, since
/// ratatui datasets borrow their point slices for the lifetime of the draw.
#[derive(Debug, Clone)]
pub struct SeriesPoints {
    pub name: String,
    pub team_index: usize,
    pub is_xg: bool,
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone)]
pub struct ChartView {
    pub series: Vec<SeriesPoints>,
    pub x_max: f64,
    pub y_max: f64,
    pub max_period: u8,
}

pub fn chart_view(series: &MatchSeries) -> ChartView {
    let mut lines = Vec::new();
    for (team_index, team) in series.teams.iter().enumerate() {
        push_series(&mut lines, &series.xg, team, team_index, true);
        push_series(&mut lines, &series.goals, team, team_index, false);
    }

    let x_max = f64::from(series.max_minute.max(FULL_TIME_MINUTE));
    let y_peak = lines
        .iter()
        .flat_map(|line| line.points.iter().map(|point| point.1))
        .fold(0.0_f64, f64::max);

    ChartView {
        series: lines,
        x_max,
        y_max: (y_peak + 0.5).max(1.0),
        max_period: series.max_period,
    }
}

fn push_series(
    out: &mut Vec<SeriesPoints>,
    rows: &[PlotSeriesRow],
    team: &str,
    team_index: usize,
    is_xg: bool,
) {
    let team_rows: Vec<&PlotSeriesRow> = rows.iter().filter(|row| row.team == team).collect();
    let Some(first) = team_rows.first() else {
        return;
    };

    out.push(SeriesPoints {
        name: format!("{team} {}", first.metric),
        team_index,
        is_xg,
        points: team_rows
            .iter()
            .map(|row| (f64::from(row.minute), row.value))
            .collect(),
    });
}

/// Extra-time / penalties annotation for the chart title.
pub fn phase_note(max_period: u8) -> Option<&'static str> {
    match max_period {
        5.. => Some("extra time + penalties"),
        3 | 4 => Some("extra time"),
        _ => None,
    }
}

pub fn chart_widget<'a>(view: &'a ChartView, title: &'a str) -> Chart<'a> {
    let datasets = view
        .series
        .iter()
        .map(|line| {
            Dataset::default()
                .name(line.name.clone())
                .marker(if line.is_xg { Marker::Dot } else { Marker::Braille })
                .graph_type(GraphType::Line)
                .style(
                    Style::default().fg(TEAM_COLORS[line.team_index % TEAM_COLORS.len()]),
                )
                .data(&line.points)
        })
        .collect();

    Chart::new(datasets)
        .block(Block::default().borders(Borders::ALL).title(title))
        .x_axis(
            Axis::default()
                .title("Minutes")
                .bounds([0.0, view.x_max])
                .labels(x_labels(view)),
        )
        .y_axis(
            Axis::default()
                .title("Goals")
                .bounds([0.0, view.y_max])
                .labels(y_labels(view)),
        )
}

fn x_labels(view: &ChartView) -> Vec<Span<'static>> {
    let mut labels = vec![Span::raw("0"), Span::raw("45"), Span::raw("90")];
    if view.x_max > 120.0 {
        labels.push(Span::raw("120"));
    }
    if view.x_max > f64::from(FULL_TIME_MINUTE) {
        labels.push(Span::raw(format!("{:.0}", view.x_max)));
    }
    labels
}

fn y_labels(view: &ChartView) -> Vec<Span<'static>> {
    vec![
        Span::raw("0"),
        Span::raw(format!("{:.1}", view.y_max / 2.0)),
        Span::raw(format!("{:.1}", view.y_max)),
    ]
}
