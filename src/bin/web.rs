use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use clap::Parser;
use game_states::config::FeedConfig;
use game_states::timeline::{goal_markers, timeline_rows, GoalMarker, TimelineBar};
use game_states::{
    analyze_match_by_id, analyze_round, GameStateError, HttpJsonFetcher, MatchReport, Side,
    SofascoreClient, StandingRow,
};
use serde::{Deserialize, Deserializer};
use std::sync::Arc;
use tower_http::services::ServeDir;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// Custom filters for formatting
mod filters {
    pub fn pct(value: &f64) -> ::askama::Result<String> {
        Ok(format!("{:.2}", value))
    }
}

/// Game-state timeline viewer
#[derive(Parser, Debug)]
#[command(name = "game-states-web", version, about)]
struct Config {
    #[command(flatten)]
    feed: FeedConfig,

    /// Listen address
    #[arg(long, env = "WEB_ADDR", default_value = "127.0.0.1:3000")]
    addr: String,
}

#[derive(Template)]
#[template(path = "home.html")]
struct HomeTemplate {
    active_page: String,
}

/// One chart row: a team's bars for one half
struct ChartRow {
    label: String,
    bars: Vec<TimelineBar>,
}

#[derive(Template)]
#[template(path = "match.html")]
struct MatchTemplate {
    active_page: String,
    report: MatchReport,
    home_goals: Vec<String>,
    away_goals: Vec<String>,
    rows: Vec<ChartRow>,
    markers: Vec<GoalMarker>,
}

struct RoundLink {
    number: u32,
    active: bool,
}

#[derive(Template)]
#[template(path = "round.html")]
struct RoundTemplate {
    active_page: String,
    tournament: u64,
    season: u64,
    round: u32,
    rounds: Vec<RoundLink>,
    reports: Vec<MatchReport>,
    standings: Vec<StandingRow>,
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate {
    active_page: String,
    title: String,
    message: String,
}

struct HtmlTemplate<T>(T);

impl<T> IntoResponse for HtmlTemplate<T>
where
    T: Template,
{
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to render template: {}", err),
            )
                .into_response(),
        }
    }
}

#[derive(Clone)]
struct AppState {
    client: Arc<SofascoreClient>,
    concurrency: usize,
}

#[derive(Debug, Deserialize)]
struct Lookup {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct RoundQuery {
    tournament: u64,
    season: u64,
    /// Blank means the current round
    #[serde(default, deserialize_with = "blank_as_none")]
    round: Option<u32>,
}

fn blank_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

async fn home() -> impl IntoResponse {
    HtmlTemplate(HomeTemplate {
        active_page: "home".to_string(),
    })
}

async fn lookup(Query(lookup): Query<Lookup>) -> Redirect {
    Redirect::to(&format!("/match/{}", lookup.id))
}

async fn match_page(State(state): State<AppState>, Path(match_id): Path<u64>) -> Response {
    let report = match analyze_match_by_id(&state.client, match_id).await {
        Ok(report) => report,
        Err(e) => {
            warn!("Match {} unavailable: {}", match_id, e);
            let page = ErrorTemplate {
                active_page: "match".to_string(),
                title: format!("Match {} unavailable", match_id),
                message: e.to_string(),
            };
            return (StatusCode::BAD_GATEWAY, HtmlTemplate(page)).into_response();
        }
    };

    let goal_lines = |side: Side| {
        report
            .goals_by_clock(side)
            .into_iter()
            .map(|g| g.format())
            .collect::<Vec<_>>()
    };
    let home_goals = goal_lines(Side::Home);
    let away_goals = goal_lines(Side::Away);
    let rows = chart_rows(timeline_rows(&report));
    let markers = goal_markers(&report);

    HtmlTemplate(MatchTemplate {
        active_page: "match".to_string(),
        report,
        home_goals,
        away_goals,
        rows,
        markers,
    })
    .into_response()
}

/// Group bars by row label, keeping first-seen order
fn chart_rows(bars: Vec<TimelineBar>) -> Vec<ChartRow> {
    let mut rows: Vec<ChartRow> = Vec::new();
    for bar in bars {
        match rows.iter_mut().find(|r| r.label == bar.row) {
            Some(row) => row.bars.push(bar),
            None => rows.push(ChartRow {
                label: bar.row.clone(),
                bars: vec![bar],
            }),
        }
    }
    rows
}

async fn round_page(State(state): State<AppState>, Query(query): Query<RoundQuery>) -> Response {
    match load_round(&state, &query).await {
        Ok(page) => HtmlTemplate(page).into_response(),
        Err(e) => {
            warn!(
                "Round {:?} of season {} unavailable: {}",
                query.round, query.season, e
            );
            let page = ErrorTemplate {
                active_page: "round".to_string(),
                title: format!("Season {} unavailable", query.season),
                message: e.to_string(),
            };
            (StatusCode::BAD_GATEWAY, HtmlTemplate(page)).into_response()
        }
    }
}

async fn load_round(state: &AppState, query: &RoundQuery) -> Result<RoundTemplate, GameStateError> {
    let client = &state.client;
    let rounds = client.fetch_rounds(query.tournament, query.season).await?;
    let Some(round) = query.round.or(rounds.current) else {
        return Err(GameStateError::unavailable(
            client.rounds_url(query.tournament, query.season),
            "season has no current round",
        ));
    };

    let reports = analyze_round(
        client,
        query.tournament,
        query.season,
        round,
        state.concurrency,
    )
    .await?;

    // The table is secondary to the fixtures
    let standings = match client.fetch_standings(query.tournament, query.season).await {
        Ok(rows) => rows,
        Err(e) => {
            warn!("Standings unavailable: {}", e);
            Vec::new()
        }
    };

    Ok(RoundTemplate {
        active_page: "round".to_string(),
        tournament: query.tournament,
        season: query.season,
        round,
        rounds: rounds
            .available
            .into_iter()
            .map(|number| RoundLink {
                number,
                active: number == round,
            })
            .collect(),
        reports,
        standings,
    })
}

async fn match_json(State(state): State<AppState>, Path(match_id): Path<u64>) -> Response {
    match analyze_match_by_id(&state.client, match_id).await {
        Ok(report) => Json(report).into_response(),
        Err(e) => (
            StatusCode::BAD_GATEWAY,
            Json(serde_json::json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

fn app(state: AppState) -> Router {
    Router::new()
        // This will serve files from the "static" directory at the "/static" URL path
        .nest_service("/static", ServeDir::new("static"))
        .route("/", get(home))
        .route("/match", get(lookup))
        .route("/match/:id", get(match_page))
        .route("/round", get(round_page))
        .route("/api/match/:id", get(match_json))
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.feed.validate()?;

    let fetcher = HttpJsonFetcher::new(config.feed.timeout())?;
    let client = Arc::new(SofascoreClient::new(
        config.feed.base_url.clone(),
        Arc::new(fetcher),
    ));

    let listener = tokio::net::TcpListener::bind(&config.addr).await?;
    info!("Starting web server at http://{}", config.addr);

    let state = AppState {
        client,
        concurrency: config.feed.concurrency,
    };
    axum::serve(listener, app(state)).await?;
    Ok(())
}
