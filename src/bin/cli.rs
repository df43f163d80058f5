use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use game_states::config::FeedConfig;
use game_states::data::{
    load_from_cache, save_segments_to_csv, save_summaries_to_csv, save_to_cache,
};
use game_states::{
    analyze_match_by_id, analyze_round, HttpJsonFetcher, MatchReport, Side, SofascoreClient,
    StandingRow,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Reconstruct match game-state timelines from the Sofascore incident feed
#[derive(Parser, Debug)]
#[command(name = "game-states", version, about)]
struct Cli {
    #[command(flatten)]
    feed: FeedConfig,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyse a single match
    Match {
        /// Sofascore event id
        match_id: u64,
    },
    /// Analyse every fixture in a round
    Round {
        /// Unique tournament id (17 = Premier League)
        #[arg(long)]
        tournament: u64,
        /// Season id
        #[arg(long)]
        season: u64,
        /// Round number; defaults to the current round
        #[arg(long)]
        round: Option<u32>,
        /// Write segment and summary CSVs to the cache directory
        #[arg(long)]
        csv: bool,
    },
    /// List the seasons of a tournament
    Seasons {
        #[arg(long)]
        tournament: u64,
    },
    /// Print the league table of a season
    Standings {
        #[arg(long)]
        tournament: u64,
        #[arg(long)]
        season: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    cli.feed.validate()?;

    let fetcher = HttpJsonFetcher::new(cli.feed.timeout()).context("Failed to build HTTP client")?;
    let client = SofascoreClient::new(cli.feed.base_url.clone(), Arc::new(fetcher));

    match cli.command {
        Command::Match { match_id } => {
            let report = analyze_match_by_id(&client, match_id)
                .await
                .with_context(|| format!("Failed to analyse match {}", match_id))?;
            print_report(&report);
        }
        Command::Round {
            tournament,
            season,
            round,
            csv,
        } => {
            let round = match round {
                Some(round) => round,
                None => client
                    .fetch_rounds(tournament, season)
                    .await
                    .context("Failed to fetch rounds")?
                    .current
                    .context("Season has no current round")?,
            };

            let cache_file = cli
                .feed
                .cache_dir
                .join(format!("round_{}_{}_{}.json", tournament, season, round));

            let reports: Vec<MatchReport> = if cli.feed.use_cache && cache_file.exists() {
                println!("Loading round from cache file: {}\n", cache_file.display());
                load_from_cache(&cache_file)?
            } else {
                let reports = analyze_round(
                    &client,
                    tournament,
                    season,
                    round,
                    cli.feed.concurrency,
                )
                .await
                .context("Failed to analyse round")?;
                save_to_cache(&reports, &cache_file)?;
                println!("Saved round to cache file: {}\n", cache_file.display());
                reports
            };

            if reports.is_empty() {
                println!("No fixtures available for round {}.", round);
            } else {
                println!("ROUND {} ({} fixtures)\n", round, reports.len());
                for (i, report) in reports.iter().enumerate() {
                    println!("{}. {}", i + 1, format_summary_line(report));
                }
            }

            if csv && !reports.is_empty() {
                let stem = format!("round_{}_{}_{}", tournament, season, round);
                let segments_file = cli.feed.cache_dir.join(format!("{}_segments.csv", stem));
                let summaries_file = cli.feed.cache_dir.join(format!("{}_summaries.csv", stem));
                save_segments_to_csv(&reports, &segments_file)?;
                save_summaries_to_csv(&reports, &summaries_file)?;
                println!("\nSaved segments to {}", segments_file.display());
                println!("Saved summaries to {}", summaries_file.display());
            }
        }
        Command::Seasons { tournament } => {
            let seasons = client
                .fetch_seasons(tournament)
                .await
                .context("Failed to fetch seasons")?;
            if seasons.is_empty() {
                println!("No seasons found.");
            }
            for season in seasons {
                println!(
                    "{:>8}  {} ({})",
                    season.id,
                    season.name.unwrap_or_default(),
                    season.year.unwrap_or_default()
                );
            }
        }
        Command::Standings { tournament, season } => {
            let rows = client
                .fetch_standings(tournament, season)
                .await
                .context("Failed to fetch standings")?;
            print_standings(&rows);
        }
    }

    Ok(())
}

fn print_standings(rows: &[StandingRow]) {
    if rows.is_empty() {
        println!("No standings found.");
        return;
    }

    println!(
        "{:>3}  {:<24} {:>3} {:>3} {:>3} {:>3} {:>7} {:>5} {:>4}  {}",
        "#", "Team", "P", "W", "D", "L", "Goals", "Diff", "Pts", "Zone"
    );
    for row in rows {
        let position = row.position.map(|p| p.to_string()).unwrap_or_default();
        let zone = match (&row.promotion, row.description.is_empty()) {
            (Some(promotion), true) => promotion.clone(),
            (Some(promotion), false) => format!("{} ({})", promotion, row.description),
            (None, _) => row.description.clone(),
        };
        println!(
            "{:>3}  {:<24} {:>3} {:>3} {:>3} {:>3} {:>7} {:>5} {:>4}  {}",
            position,
            row.team.name,
            row.played(),
            row.wins,
            row.draws,
            row.losses,
            format!("{}:{}", row.scores_for, row.scores_against),
            row.score_diff.as_deref().unwrap_or("-"),
            row.points(),
            zone
        );
    }
}

fn format_summary_line(report: &MatchReport) -> String {
    let states = &report.game_states;
    format!(
        "{} | {} W{} D{} L{} | {} W{} D{} L{} | {} min",
        report.label,
        report.summary.home_team.name,
        states.home.winning,
        states.home.drawing,
        states.home.losing,
        report.summary.away_team.name,
        states.away.winning,
        states.away.drawing,
        states.away.losing,
        report.total_time
    )
}

fn print_report(report: &MatchReport) {
    let summary = &report.summary;
    println!("{}\n", report.label);
    if let Some(tournament) = &summary.tournament {
        println!(
            "Tournament: {} ({})",
            tournament,
            summary.country.as_deref().unwrap_or("-")
        );
    }
    if let Some(round) = summary.round {
        println!("Round: {}", round);
    }
    if let Some(kickoff) = &report.kickoff {
        println!("Kickoff: {}", kickoff);
    }
    if let (Some(home), Some(away)) = (summary.home_score, summary.away_score) {
        println!("Final score: {} - {}", home, away);
    }
    println!(
        "Total time: {} min (+{} 1st, +{} 2nd)",
        report.total_time, report.injury_time.first_half, report.injury_time.second_half
    );

    for (side, team) in [
        (Side::Home, &summary.home_team.name),
        (Side::Away, &summary.away_team.name),
    ] {
        println!("\n{} GOALS ({})\n", side.label().to_uppercase(), team);
        let goals = report.goals_by_clock(side);
        if goals.is_empty() {
            println!("No goals");
        }
        for goal in goals {
            println!("  {}", goal.format());
        }
    }

    println!("\nSEGMENTS\n");
    for segment in &report.segments {
        println!("  {}", segment.format());
    }

    println!("\nGAME STATES\n");
    for (side, team) in [
        (Side::Home, &summary.home_team.name),
        (Side::Away, &summary.away_team.name),
    ] {
        let totals = report.game_states.for_side(side);
        println!(
            "  {:<24} winning {:>3} | drawing {:>3} | losing {:>3}",
            team, totals.winning, totals.drawing, totals.losing
        );
    }
}
