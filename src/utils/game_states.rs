use crate::error::check_timing;
use crate::models::{GoalEvent, Half, InjuryTime, Segment, Side, StateSummary, TeamState};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Segment timeline and per-team totals for one match
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStates {
    pub segments: Vec<Segment>,
    pub summary: StateSummary,
}

/// A goal placed on the absolute match clock
#[derive(Debug, Clone, Copy)]
struct TimedGoal {
    instant: u32,
    side: Side,
    half: Half,
}

/// Running score and cursor while walking the goals, one half at a time
#[derive(Debug, Default)]
struct Walk {
    home: u32,
    away: u32,
    prev_time: u32,
    segments: Vec<Segment>,
}

impl Walk {
    /// Close the current segment at `time`. Empty intervals emit nothing.
    fn advance_to(&mut self, time: u32, half: Half) {
        if time <= self.prev_time {
            return;
        }
        let (home, away) = TeamState::from_score(self.home, self.away);
        self.segments.push(Segment {
            start: self.prev_time,
            end: time,
            duration: time - self.prev_time,
            home,
            away,
            half,
        });
        self.prev_time = time;
    }

    fn score(&mut self, side: Side) {
        match side {
            Side::Home => self.home += 1,
            Side::Away => self.away += 1,
        }
    }
}

/// Reconstruct the winning/drawing/losing timeline of a match.
///
/// Goals are taken from the list they appear in, so `home_goals` always
/// count for the home side. Input lists are not modified. Returned segments
/// are maximal: adjacent intervals with the same states are joined, and a
/// joined segment keeps the half it started in.
pub fn compute_game_states(
    home_goals: &[GoalEvent],
    away_goals: &[GoalEvent],
    total_time: u32,
    injury_time: InjuryTime,
) -> GameStates {
    let segments = merge_segments(half_segments(
        home_goals,
        away_goals,
        total_time,
        injury_time,
    ));
    let summary = summarize(&segments);
    GameStates { segments, summary }
}

/// Walk the goals half by half, closing a segment at every goal and at the
/// end of each half. No segment spans the half boundary.
pub fn half_segments(
    home_goals: &[GoalEvent],
    away_goals: &[GoalEvent],
    total_time: u32,
    injury_time: InjuryTime,
) -> Vec<Segment> {
    if let Err(e) = check_timing(total_time, injury_time) {
        warn!("{}; trailing segment will be clamped", e);
    }

    let timed = |side: Side| {
        move |goal: &GoalEvent| TimedGoal {
            instant: goal.instant(injury_time.first_half),
            side,
            half: goal.half,
        }
    };
    let mut goals: Vec<TimedGoal> = home_goals
        .iter()
        .map(timed(Side::Home))
        .chain(away_goals.iter().map(timed(Side::Away)))
        .collect();
    // Stable: equal instants keep feed order
    goals.sort_by_key(|g| g.instant);

    let mut walk = Walk::default();

    for goal in goals.iter().filter(|g| g.half == Half::First) {
        walk.advance_to(goal.instant, Half::First);
        walk.score(goal.side);
    }
    walk.advance_to(injury_time.first_half_end(), Half::First);

    for goal in goals.iter().filter(|g| g.half == Half::Second) {
        walk.advance_to(goal.instant, Half::Second);
        walk.score(goal.side);
    }
    if walk.prev_time > total_time {
        warn!(
            "Timeline reached minute {} past total time {}; skipping final segment",
            walk.prev_time, total_time
        );
    }
    walk.advance_to(total_time, Half::Second);

    walk.segments
}

/// Join neighbouring segments whose states are identical
pub fn merge_segments(segments: Vec<Segment>) -> Vec<Segment> {
    let mut merged: Vec<Segment> = Vec::with_capacity(segments.len());
    for segment in segments {
        match merged.last_mut() {
            Some(last)
                if last.end == segment.start
                    && last.home == segment.home
                    && last.away == segment.away =>
            {
                last.end = segment.end;
                last.duration += segment.duration;
            }
            _ => merged.push(segment),
        }
    }
    merged
}

/// Sum segment durations into per-team state totals
pub fn summarize(segments: &[Segment]) -> StateSummary {
    let mut summary = StateSummary::default();
    for segment in segments {
        summary.home.add(segment.home, segment.duration);
        summary.away.add(segment.away, segment.duration);
    }
    summary
}
