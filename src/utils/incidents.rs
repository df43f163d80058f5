use crate::api::sofascore::{RawIncident, SofascoreClient};
use crate::error::GameStateError;
use crate::models::{GoalEvent, Half, InjuryTime, MatchSummary, Side, HALF_LENGTH, REGULATION_LENGTH};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Largest stoppage allowance taken from the feed; anything above is noise
pub const MAX_ADDED_TIME: u32 = 60;

/// Goals split by side, plus the raised stoppage watermarks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedIncidents {
    pub injury_time: InjuryTime,
    pub home_goals: Vec<GoalEvent>,
    pub away_goals: Vec<GoalEvent>,
}

/// Fetch a match's incident feed and classify it
pub async fn extract_goal_incidents(
    client: &SofascoreClient,
    summary: &MatchSummary,
) -> Result<ExtractedIncidents, GameStateError> {
    let incidents = client.fetch_incidents(summary.match_id).await?;
    debug!(
        "{} incidents for {} vs {}",
        incidents.len(),
        summary.home_team.name,
        summary.away_team.name
    );
    Ok(classify_incidents(summary.injury_time, &incidents))
}

/// Raise the stoppage watermarks and collect goal events.
///
/// Goal incidents without a minute or a side, or with an added time above
/// [`MAX_ADDED_TIME`], are skipped.
pub fn classify_incidents(initial: InjuryTime, incidents: &[RawIncident]) -> ExtractedIncidents {
    let mut injury_time = initial;
    let mut home_goals = Vec::new();
    let mut away_goals = Vec::new();

    for incident in incidents {
        raise_watermark(&mut injury_time, incident);

        if incident.incident_type.as_deref() != Some("goal") {
            continue;
        }

        let Some(goal) = to_goal_event(incident) else {
            debug!("Skipping malformed goal incident: {:?}", incident);
            continue;
        };

        match goal.team {
            Side::Home => home_goals.push(goal),
            Side::Away => away_goals.push(goal),
        }
    }

    ExtractedIncidents {
        injury_time,
        home_goals,
        away_goals,
    }
}

fn raise_watermark(injury_time: &mut InjuryTime, incident: &RawIncident) {
    // Period markers carry sentinel added times
    if incident.incident_type.as_deref() == Some("period") {
        return;
    }
    let Some(added) = incident.added_time.and_then(|a| u32::try_from(a).ok()) else {
        return;
    };
    if added > MAX_ADDED_TIME {
        debug!("Ignoring implausible added time {} in {:?}", added, incident);
        return;
    }

    match incident.time.and_then(|t| u32::try_from(t).ok()) {
        Some(HALF_LENGTH) if added > injury_time.first_half => injury_time.first_half = added,
        Some(REGULATION_LENGTH) if added > injury_time.second_half => {
            injury_time.second_half = added
        }
        _ => {}
    }
}

fn to_goal_event(incident: &RawIncident) -> Option<GoalEvent> {
    let minute = u32::try_from(incident.time?).ok()?;
    let team = if incident.is_home? {
        Side::Home
    } else {
        Side::Away
    };
    let added_time = match incident.added_time {
        None => 0,
        Some(a) => u32::try_from(a).ok().filter(|a| *a <= MAX_ADDED_TIME)?,
    };
    let goal_type = incident
        .incident_class
        .clone()
        .unwrap_or_else(|| "regular".to_string());
    let player = incident.player.as_ref();

    Some(GoalEvent {
        match_minute: minute,
        added_time,
        half: Half::from_minute(minute),
        team,
        is_own_goal: goal_type == "ownGoal",
        player_id: player.and_then(|p| p.id),
        player: player.and_then(|p| p.name.clone()),
        player_short_name: player.and_then(|p| p.short_name.clone()),
        goal_type,
    })
}
