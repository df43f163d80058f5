pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod scrapers;
pub mod utils;

pub use api::*;
pub use error::*;
pub use models::*;
pub use utils::*;

use chrono::DateTime;
use futures_util::stream::{self, StreamExt};
use tracing::{info, warn};
use utils::game_states::compute_game_states;
use utils::incidents::{extract_goal_incidents, ExtractedIncidents};

/// Combine a summary with its extracted incidents into a full report
pub fn build_report(summary: MatchSummary, extracted: ExtractedIncidents) -> MatchReport {
    let injury_time = extracted.injury_time;
    let total_time = injury_time.total_time();
    let states = compute_game_states(
        &extracted.home_goals,
        &extracted.away_goals,
        total_time,
        injury_time,
    );

    let result = match (summary.home_score, summary.away_score) {
        (Some(home), Some(away)) => Some(MatchResult::from_score(home, away)),
        _ => None,
    };
    let kickoff = summary
        .start_timestamp
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string());

    MatchReport {
        label: summary.label(),
        result,
        kickoff,
        injury_time,
        total_time,
        home_goals: extracted.home_goals,
        away_goals: extracted.away_goals,
        segments: states.segments,
        game_states: states.summary,
        summary,
    }
}

/// Extract incidents for one fixture and compute its game states
pub async fn analyze_match(
    client: &SofascoreClient,
    summary: MatchSummary,
) -> Result<MatchReport, GameStateError> {
    let extracted = extract_goal_incidents(client, &summary).await?;
    Ok(build_report(summary, extracted))
}

/// Look up a fixture by id and analyse it
pub async fn analyze_match_by_id(
    client: &SofascoreClient,
    match_id: u64,
) -> Result<MatchReport, GameStateError> {
    let summary = client.fetch_event(match_id).await?;
    analyze_match(client, summary).await
}

/// Analyse every fixture of a round, at most `concurrency` at a time.
///
/// Fixtures whose incident feed is unavailable are logged and left out.
/// Reports come back ordered by kickoff, then match id.
pub async fn analyze_round(
    client: &SofascoreClient,
    unique_tournament: u64,
    season: u64,
    round: u32,
    concurrency: usize,
) -> Result<Vec<MatchReport>, GameStateError> {
    let fixtures = client
        .fetch_round_events(unique_tournament, season, round)
        .await?;
    info!("Analysing {} fixtures in round {}", fixtures.len(), round);

    let results: Vec<(u64, Result<MatchReport, GameStateError>)> = stream::iter(fixtures)
        .map(|summary| async move {
            let match_id = summary.match_id;
            (match_id, analyze_match(client, summary).await)
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let mut reports: Vec<MatchReport> = results
        .into_iter()
        .filter_map(|(match_id, result)| match result {
            Ok(report) => Some(report),
            Err(e) => {
                warn!("Skipping match {}: {}", match_id, e);
                None
            }
        })
        .collect();
    reports.sort_by_key(|r| (r.summary.start_timestamp, r.summary.match_id));
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::sofascore::tests::{event_json, StaticFetcher};
    use serde_json::json;
    use std::sync::Arc;

    fn round_fetcher() -> StaticFetcher {
        let mut late = event_json(2, (42, "Arsenal"), (30, "Wolves"));
        late["startTimestamp"] = json!(1723906800);
        let early = event_json(1, (17, "Man Utd"), (35, "Fulham"));
        let missing = event_json(3, (44, "Liverpool"), (39, "Ipswich"));

        StaticFetcher::default()
            .with(
                "http://feed/unique-tournament/17/season/61627/events/round/1",
                json!({"events": [late, missing, early]}),
            )
            .with(
                "http://feed/event/1/incidents",
                json!({"incidents": [
                    {"incidentType": "goal", "time": 87, "isHome": true, "incidentClass": "regular"}
                ]}),
            )
            .with(
                "http://feed/event/2/incidents",
                json!({"incidents": [
                    {"incidentType": "goal", "time": 25, "isHome": true},
                    {"incidentType": "goal", "time": 74, "isHome": true},
                    {"incidentType": "injuryTime", "time": 45, "addedTime": 4}
                ]}),
            )
    }

    #[test]
    fn test_build_report_fields() {
        let summary = MatchSummary {
            match_id: 9,
            home_team: TeamRef { id: 1, name: "Everton".to_string() },
            away_team: TeamRef { id: 2, name: "Brighton".to_string() },
            injury_time: InjuryTime::new(1, 1),
            tournament: None,
            country: None,
            season: Some("Premier League 24/25".to_string()),
            season_year: None,
            round: Some(1),
            start_timestamp: Some(1723906800),
            home_score: Some(0),
            away_score: Some(3),
            home_red_cards: 1,
            away_red_cards: 0,
        };
        let extracted = ExtractedIncidents {
            injury_time: InjuryTime::new(2, 5),
            home_goals: vec![],
            away_goals: vec![],
        };

        let report = build_report(summary, extracted);
        assert_eq!(report.label, "Everton vs Brighton - Premier League 24/25");
        assert_eq!(report.result, Some(MatchResult::Away));
        assert_eq!(report.kickoff.as_deref(), Some("2024-08-17 15:00"));
        assert_eq!(report.total_time, 97);
        assert_eq!(report.game_states.home.drawing, 97);
        // Initial watermarks stay on the summary, final ones on the report
        assert_eq!(report.summary.injury_time, InjuryTime::new(1, 1));
        assert_eq!(report.injury_time, InjuryTime::new(2, 5));
    }

    #[test]
    fn test_build_report_with_huge_added_times() {
        let boundary = |time: i32| RawIncident {
            incident_type: Some("card".to_string()),
            time: Some(time),
            added_time: Some(i32::MAX),
            ..Default::default()
        };
        let summary = MatchSummary {
            match_id: 8,
            home_team: TeamRef { id: 1, name: "Everton".to_string() },
            away_team: TeamRef { id: 2, name: "Brighton".to_string() },
            injury_time: InjuryTime::new(2, 5),
            tournament: None,
            country: None,
            season: None,
            season_year: None,
            round: None,
            start_timestamp: None,
            home_score: None,
            away_score: None,
            home_red_cards: 0,
            away_red_cards: 0,
        };
        let extracted = utils::incidents::classify_incidents(
            summary.injury_time,
            &[boundary(45), boundary(90)],
        );

        let report = build_report(summary, extracted);
        assert_eq!(report.total_time, 97);
        assert_eq!(report.game_states.home.drawing, 97);
    }

    #[tokio::test]
    async fn test_analyze_match_by_id() {
        let fetcher = round_fetcher().with(
            "http://feed/event/2",
            json!({"event": event_json(2, (42, "Arsenal"), (30, "Wolves"))}),
        );
        let client = SofascoreClient::new("http://feed", Arc::new(fetcher));

        let report = analyze_match_by_id(&client, 2).await.unwrap();
        assert_eq!(report.injury_time, InjuryTime::new(4, 5));
        assert_eq!(report.total_time, 99);
        assert_eq!(report.home_goals.len(), 2);
        // 25' then 74' shifted by 4 to 78
        assert_eq!(report.game_states.home.drawing, 25);
        assert_eq!(report.game_states.home.winning, 74);
        assert_eq!(report.game_states.away.losing, 74);
    }

    #[tokio::test]
    async fn test_blocked_incident_feed_fails_match() {
        let mut event = event_json(8, (42, "Arsenal"), (30, "Wolves"));
        event["homeScore"] = json!({"display": 2});
        event["awayScore"] = json!({"display": 1});
        let fetcher = StaticFetcher::default()
            .with("http://feed/event/8", json!({"event": event}))
            .with("http://feed/event/8/incidents", json!({"error": {"code": 403}}));
        let client = SofascoreClient::new("http://feed", Arc::new(fetcher));

        let err = analyze_match_by_id(&client, 8).await.unwrap_err();
        assert!(matches!(err, GameStateError::FeedUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_analyze_round_skips_unavailable_and_orders() {
        let client = SofascoreClient::new("http://feed", Arc::new(round_fetcher()));

        let reports = analyze_round(&client, 17, 61627, 1, 2).await.unwrap();
        let ids: Vec<u64> = reports.iter().map(|r| r.summary.match_id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(reports[0].game_states.home.winning, 97 - 87 - 2);
    }

    #[tokio::test]
    async fn test_analyze_round_unavailable_listing() {
        let client = SofascoreClient::new("http://feed", Arc::new(StaticFetcher::default()));

        let err = analyze_round(&client, 17, 61627, 1, 2).await.unwrap_err();
        assert!(matches!(err, GameStateError::FeedUnavailable { .. }));
    }
}
