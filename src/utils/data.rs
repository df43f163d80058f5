use crate::models::MatchReport;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Save any serializable data to a JSON cache file
pub fn save_to_cache<T: Serialize + ?Sized>(data: &T, cache_file: impl AsRef<Path>) -> Result<()> {
    let cache_file = cache_file.as_ref();
    if let Some(parent) = cache_file.parent() {
        std::fs::create_dir_all(parent).context("Failed to create cache directory")?;
    }
    let json = serde_json::to_string_pretty(data).context("Failed to serialize cache data")?;
    std::fs::write(cache_file, json).context("Failed to write cache file")?;
    Ok(())
}

/// Load data from a JSON cache file
pub fn load_from_cache<T: DeserializeOwned>(cache_file: impl AsRef<Path>) -> Result<T> {
    let json = std::fs::read_to_string(cache_file).context("Failed to read cache file")?;
    let data = serde_json::from_str(&json).context("Failed to deserialize cache data")?;
    Ok(data)
}

#[derive(Debug, Serialize)]
struct SegmentRow<'a> {
    match_id: u64,
    match_label: &'a str,
    start: u32,
    end: u32,
    duration: u32,
    half: &'static str,
    home_state: &'static str,
    away_state: &'static str,
}

#[derive(Debug, Serialize)]
struct SummaryRow<'a> {
    match_id: u64,
    match_label: &'a str,
    total_time: u32,
    injury_time_1: u32,
    injury_time_2: u32,
    home_team: &'a str,
    home_winning: u32,
    home_drawing: u32,
    home_losing: u32,
    away_team: &'a str,
    away_winning: u32,
    away_drawing: u32,
    away_losing: u32,
}

/// Save every segment of every report to CSV
pub fn save_segments_to_csv(reports: &[MatchReport], filename: impl AsRef<Path>) -> Result<()> {
    let mut writer = csv::Writer::from_path(filename).context("Failed to create CSV file")?;

    for report in reports {
        for segment in &report.segments {
            writer.serialize(SegmentRow {
                match_id: report.summary.match_id,
                match_label: &report.label,
                start: segment.start,
                end: segment.end,
                duration: segment.duration,
                half: segment.half.label(),
                home_state: segment.home.label(),
                away_state: segment.away.label(),
            })?;
        }
    }

    writer.flush()?;
    Ok(())
}

/// Save the per-team state totals of every report to CSV
pub fn save_summaries_to_csv(reports: &[MatchReport], filename: impl AsRef<Path>) -> Result<()> {
    let mut writer = csv::Writer::from_path(filename).context("Failed to create CSV file")?;

    for report in reports {
        let states = &report.game_states;
        writer.serialize(SummaryRow {
            match_id: report.summary.match_id,
            match_label: &report.label,
            total_time: report.total_time,
            injury_time_1: report.injury_time.first_half,
            injury_time_2: report.injury_time.second_half,
            home_team: &report.summary.home_team.name,
            home_winning: states.home.winning,
            home_drawing: states.home.drawing,
            home_losing: states.home.losing,
            away_team: &report.summary.away_team.name,
            away_winning: states.away.winning,
            away_drawing: states.away.drawing,
            away_losing: states.away.losing,
        })?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InjuryTime, MatchSummary, TeamRef};
    use crate::utils::game_states::compute_game_states;
    use tempfile::TempDir;

    fn report() -> MatchReport {
        let injury = InjuryTime::new(1, 4);
        let states = compute_game_states(&[], &[], injury.total_time(), injury);
        MatchReport {
            summary: MatchSummary {
                match_id: 12436870,
                home_team: TeamRef { id: 44, name: "Liverpool".to_string() },
                away_team: TeamRef { id: 39, name: "Ipswich".to_string() },
                injury_time: injury,
                tournament: Some("Premier League".to_string()),
                country: Some("England".to_string()),
                season: Some("Premier League 24/25".to_string()),
                season_year: Some("24/25".to_string()),
                round: Some(1),
                start_timestamp: Some(1723905000),
                home_score: Some(0),
                away_score: Some(0),
                home_red_cards: 0,
                away_red_cards: 0,
            },
            label: "Liverpool vs Ipswich - Premier League 24/25".to_string(),
            result: None,
            kickoff: None,
            injury_time: injury,
            total_time: injury.total_time(),
            home_goals: vec![],
            away_goals: vec![],
            segments: states.segments,
            game_states: states.summary,
        }
    }

    #[test]
    fn test_cache_round_trip_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("nested").join("reports.json");

        save_to_cache(&vec![report()], &file).unwrap();
        let loaded: Vec<MatchReport> = load_from_cache(&file).unwrap();
        assert_eq!(loaded, vec![report()]);
    }

    #[test]
    fn test_load_missing_cache_fails() {
        let temp_dir = TempDir::new().unwrap();
        assert!(load_from_cache::<Vec<MatchReport>>(temp_dir.path().join("nope.json")).is_err());
    }

    #[test]
    fn test_csv_exports() {
        let temp_dir = TempDir::new().unwrap();
        let segments_file = temp_dir.path().join("segments.csv");
        let summaries_file = temp_dir.path().join("summaries.csv");

        save_segments_to_csv(&[report()], &segments_file).unwrap();
        save_summaries_to_csv(&[report()], &summaries_file).unwrap();

        let segments = std::fs::read_to_string(&segments_file).unwrap();
        let mut lines = segments.lines();
        assert_eq!(
            lines.next().unwrap(),
            "match_id,match_label,start,end,duration,half,home_state,away_state"
        );
        assert_eq!(
            lines.next().unwrap(),
            "12436870,Liverpool vs Ipswich - Premier League 24/25,0,95,95,1st,drawing,drawing"
        );

        let summaries = std::fs::read_to_string(&summaries_file).unwrap();
        assert!(summaries
            .lines()
            .nth(1)
            .unwrap()
            .starts_with("12436870,Liverpool vs Ipswich - Premier League 24/25,95,1,4,Liverpool,0,95,0,Ipswich,0,95,0"));
    }
}
