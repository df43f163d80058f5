use crate::api::fetcher::JsonFetcher;
use crate::error::GameStateError;
use crate::models::{InjuryTime, MatchSummary, StandingRow, TeamRef};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

pub const SOFASCORE_BASE_URL: &str = "https://www.sofascore.com/api/v1";

/// One entry of an event's incident feed
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawIncident {
    pub incident_type: Option<String>,
    pub time: Option<i32>,
    pub added_time: Option<i32>,
    pub is_home: Option<bool>,
    pub incident_class: Option<String>,
    pub player: Option<RawPlayer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPlayer {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub short_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTeam {
    id: u64,
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTime {
    injury_time1: Option<u32>,
    injury_time2: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct RawScore {
    display: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct RawCountry {
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawCategory {
    #[serde(default)]
    country: RawCountry,
}

#[derive(Debug, Default, Deserialize)]
struct RawTournament {
    name: Option<String>,
    #[serde(default)]
    category: RawCategory,
}

#[derive(Debug, Default, Deserialize)]
struct RawRoundInfo {
    round: Option<u32>,
}

/// Season as listed for a unique tournament
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Season {
    pub id: u64,
    pub name: Option<String>,
    pub year: Option<String>,
}

/// Match summary row from an event or round listing
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEvent {
    id: u64,
    home_team: RawTeam,
    away_team: RawTeam,
    #[serde(default)]
    time: RawTime,
    #[serde(default)]
    home_score: RawScore,
    #[serde(default)]
    away_score: RawScore,
    #[serde(default)]
    tournament: RawTournament,
    season: Option<Season>,
    #[serde(default)]
    round_info: RawRoundInfo,
    start_timestamp: Option<i64>,
    home_red_cards: Option<u32>,
    away_red_cards: Option<u32>,
}

impl RawEvent {
    fn into_summary(self) -> MatchSummary {
        let event = self;
        let (season, season_year) = match event.season {
            Some(season) => (season.name, season.year),
            None => (None, None),
        };

        MatchSummary {
            match_id: event.id,
            home_team: TeamRef {
                id: event.home_team.id,
                name: event.home_team.name,
            },
            away_team: TeamRef {
                id: event.away_team.id,
                name: event.away_team.name,
            },
            injury_time: InjuryTime::new(
                event.time.injury_time1.unwrap_or(0),
                event.time.injury_time2.unwrap_or(0),
            ),
            tournament: event.tournament.name,
            country: event.tournament.category.country.name,
            season,
            season_year,
            round: event.round_info.round,
            start_timestamp: event.start_timestamp,
            home_score: event.home_score.display,
            away_score: event.away_score.display,
            home_red_cards: event.home_red_cards.unwrap_or(0),
            away_red_cards: event.away_red_cards.unwrap_or(0),
        }
    }
}

#[derive(Debug, Deserialize)]
struct EventResponse {
    event: RawEvent,
}

#[derive(Debug, Deserialize)]
struct SeasonsResponse {
    #[serde(default)]
    seasons: Vec<Season>,
}

#[derive(Debug, Deserialize)]
struct RoundEntry {
    round: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoundsResponse {
    current_round: Option<RoundEntry>,
    #[serde(default)]
    rounds: Vec<RoundEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStandingTeam {
    id: u64,
    name: String,
    name_code: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawText {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStandingRow {
    team: RawStandingTeam,
    position: Option<u32>,
    wins: Option<u32>,
    draws: Option<u32>,
    losses: Option<u32>,
    scores_for: Option<u32>,
    scores_against: Option<u32>,
    score_diff_formatted: Option<String>,
    promotion: Option<RawText>,
    descriptions: Option<Vec<RawText>>,
}

impl RawStandingRow {
    fn into_standing(self) -> StandingRow {
        let description = self
            .descriptions
            .unwrap_or_default()
            .into_iter()
            .filter_map(|d| d.text)
            .collect::<Vec<_>>()
            .join(" | ");

        StandingRow {
            position: self.position,
            team: TeamRef {
                id: self.team.id,
                name: self.team.name,
            },
            name_code: self.team.name_code,
            wins: self.wins.unwrap_or(0),
            draws: self.draws.unwrap_or(0),
            losses: self.losses.unwrap_or(0),
            scores_for: self.scores_for.unwrap_or(0),
            scores_against: self.scores_against.unwrap_or(0),
            score_diff: self.score_diff_formatted,
            promotion: self.promotion.and_then(|p| p.text),
            description,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct StandingTable {
    #[serde(default)]
    rows: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct StandingsResponse {
    #[serde(default)]
    standings: Vec<StandingTable>,
}

/// Rounds already played or in progress for a season
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rounds {
    pub current: Option<u32>,
    pub available: Vec<u32>,
}

/// Client for the Sofascore event API
pub struct SofascoreClient {
    base_url: String,
    fetcher: Arc<dyn JsonFetcher>,
}

impl SofascoreClient {
    pub fn new(base_url: impl Into<String>, fetcher: Arc<dyn JsonFetcher>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            fetcher,
        }
    }

    pub fn incidents_url(&self, match_id: u64) -> String {
        format!("{}/event/{}/incidents", self.base_url, match_id)
    }

    pub fn event_url(&self, match_id: u64) -> String {
        format!("{}/event/{}", self.base_url, match_id)
    }

    pub fn seasons_url(&self, unique_tournament: u64) -> String {
        format!(
            "{}/unique-tournament/{}/seasons",
            self.base_url, unique_tournament
        )
    }

    pub fn rounds_url(&self, unique_tournament: u64, season: u64) -> String {
        format!(
            "{}/unique-tournament/{}/season/{}/rounds",
            self.base_url, unique_tournament, season
        )
    }

    pub fn standings_url(&self, unique_tournament: u64, season: u64) -> String {
        format!(
            "{}/unique-tournament/{}/season/{}/standings/total",
            self.base_url, unique_tournament, season
        )
    }

    pub fn round_events_url(&self, unique_tournament: u64, season: u64, round: u32) -> String {
        format!(
            "{}/unique-tournament/{}/season/{}/events/round/{}",
            self.base_url, unique_tournament, season, round
        )
    }

    /// Fetch the raw incident list for one event.
    ///
    /// Entries that do not decode are dropped individually.
    pub async fn fetch_incidents(&self, match_id: u64) -> Result<Vec<RawIncident>, GameStateError> {
        let url = self.incidents_url(match_id);
        let body = self.fetcher.fetch_json(&url).await?;

        let entries = match body.get("incidents") {
            Some(Value::Array(entries)) => entries,
            None | Some(Value::Null) => {
                return Err(GameStateError::unavailable(
                    &url,
                    "missing `incidents` list",
                ))
            }
            Some(_) => {
                return Err(GameStateError::unavailable(
                    &url,
                    "`incidents` is not a list",
                ))
            }
        };

        Ok(entries
            .iter()
            .filter_map(|entry| match RawIncident::deserialize(entry) {
                Ok(incident) => Some(incident),
                Err(e) => {
                    debug!("Skipping undecodable incident in {}: {}", url, e);
                    None
                }
            })
            .collect())
    }

    /// Fetch the summary row of a single event
    pub async fn fetch_event(&self, match_id: u64) -> Result<MatchSummary, GameStateError> {
        let url = self.event_url(match_id);
        let response: EventResponse = self.fetch_typed(&url).await?;
        Ok(response.event.into_summary())
    }

    pub async fn fetch_seasons(&self, unique_tournament: u64) -> Result<Vec<Season>, GameStateError> {
        let url = self.seasons_url(unique_tournament);
        let response: SeasonsResponse = self.fetch_typed(&url).await?;
        Ok(response.seasons)
    }

    /// Rows of the first standings table, in feed order.
    ///
    /// Rows that do not decode are dropped individually.
    pub async fn fetch_standings(
        &self,
        unique_tournament: u64,
        season: u64,
    ) -> Result<Vec<StandingRow>, GameStateError> {
        let url = self.standings_url(unique_tournament, season);
        let response: StandingsResponse = self.fetch_typed(&url).await?;

        let Some(table) = response.standings.into_iter().next() else {
            return Ok(Vec::new());
        };

        Ok(table
            .rows
            .into_iter()
            .filter_map(|row| match serde_json::from_value::<RawStandingRow>(row) {
                Ok(row) => Some(row.into_standing()),
                Err(e) => {
                    debug!("Skipping undecodable standing row in {}: {}", url, e);
                    None
                }
            })
            .collect())
    }

    /// Rounds up to and including the current one
    pub async fn fetch_rounds(
        &self,
        unique_tournament: u64,
        season: u64,
    ) -> Result<Rounds, GameStateError> {
        let url = self.rounds_url(unique_tournament, season);
        let response: RoundsResponse = self.fetch_typed(&url).await?;

        let current = response.current_round.map(|r| r.round);
        let available = response
            .rounds
            .into_iter()
            .map(|r| r.round)
            .filter(|round| current.map_or(true, |c| *round <= c))
            .collect();

        Ok(Rounds { current, available })
    }

    pub async fn fetch_round_events(
        &self,
        unique_tournament: u64,
        season: u64,
        round: u32,
    ) -> Result<Vec<MatchSummary>, GameStateError> {
        let url = self.round_events_url(unique_tournament, season, round);
        let body = self.fetcher.fetch_json(&url).await?;

        let events = match body.get("events") {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(events) => events,
        };

        let events: Vec<RawEvent> = Vec::<RawEvent>::deserialize(events)
            .map_err(|e| GameStateError::unavailable(&url, e))?;
        Ok(events.into_iter().map(RawEvent::into_summary).collect())
    }

    async fn fetch_typed<T: DeserializeOwned>(&self, url: &str) -> Result<T, GameStateError> {
        let body = self.fetcher.fetch_json(url).await?;
        serde_json::from_value(body).map_err(|e| GameStateError::unavailable(url, e))
    }
}
