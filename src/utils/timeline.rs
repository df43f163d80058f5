use crate::models::{Half, MatchReport, Segment, Side, TeamState, REGULATION_LENGTH};
use serde::Serialize;

/// Minutes of padding after the end of the match on the chart axis
const AXIS_PADDING: u32 = 7;

/// One horizontal bar of the game-state chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineBar {
    /// Row label, e.g. `"Arsenal - 1st Half"`
    pub row: String,
    pub team: String,
    pub side: Side,
    pub half: Half,
    pub start: u32,
    pub end: u32,
    pub duration: u32,
    pub state: TeamState,
    pub color: &'static str,
    pub left_pct: f64,
    pub width_pct: f64,
}

/// A goal marker placed on the chart axis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalMarker {
    pub side: Side,
    pub instant: u32,
    pub label: String,
    pub left_pct: f64,
}

/// Length of the chart axis in minutes
pub fn axis_length(report: &MatchReport) -> u32 {
    REGULATION_LENGTH
        .saturating_add(report.injury_time.second_half)
        .saturating_add(AXIS_PADDING)
        .max(report.total_time)
}

/// Chart bars, home rows first, each split at half-time
pub fn timeline_rows(report: &MatchReport) -> Vec<TimelineBar> {
    let axis = axis_length(report) as f64;
    let boundary = report.injury_time.first_half_end();
    let teams = [
        (Side::Home, &report.summary.home_team.name),
        (Side::Away, &report.summary.away_team.name),
    ];

    let mut bars = Vec::new();
    for (side, team) in teams {
        for segment in &report.segments {
            for (start, end, half) in split_at(segment, boundary) {
                let state = segment.state_for(side);
                bars.push(TimelineBar {
                    row: format!("{} - {} Half", team, half.label()),
                    team: team.clone(),
                    side,
                    half,
                    start,
                    end,
                    duration: end - start,
                    state,
                    color: state.color(),
                    left_pct: start as f64 / axis * 100.0,
                    width_pct: (end - start) as f64 / axis * 100.0,
                });
            }
        }
    }
    bars
}

/// One marker per goal, in chronological order
pub fn goal_markers(report: &MatchReport) -> Vec<GoalMarker> {
    let axis = axis_length(report) as f64;
    let injury_time_1 = report.injury_time.first_half;

    let mut markers: Vec<GoalMarker> = report
        .home_goals
        .iter()
        .map(|g| (Side::Home, g))
        .chain(report.away_goals.iter().map(|g| (Side::Away, g)))
        .map(|(side, goal)| {
            let instant = goal.instant(injury_time_1);
            let own_goal = if goal.is_own_goal { " (OG)" } else { "" };
            GoalMarker {
                side,
                instant,
                label: format!("{}{} - {}", goal.display_name(), own_goal, goal.clock()),
                left_pct: instant as f64 / axis * 100.0,
            }
        })
        .collect();
    markers.sort_by_key(|m| m.instant);
    markers
}

fn split_at(segment: &Segment, boundary: u32) -> Vec<(u32, u32, Half)> {
    if segment.end <= boundary {
        vec![(segment.start, segment.end, Half::First)]
    } else if segment.start >= boundary {
        vec![(segment.start, segment.end, Half::Second)]
    } else {
        vec![
            (segment.start, boundary, Half::First),
            (boundary, segment.end, Half::Second),
        ]
    }
}
