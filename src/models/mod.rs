use serde::{Deserialize, Serialize};

/// Regulation length of one half, in minutes
pub const HALF_LENGTH: u32 = 45;

/// Regulation length of a full match, in minutes
pub const REGULATION_LENGTH: u32 = 90;

/// Which half of the match a goal or segment belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Half {
    #[serde(rename = "1st")]
    First,
    #[serde(rename = "2nd")]
    Second,
}

impl Half {
    /// Half implied by a feed minute: anything up to 45 is first half
    pub fn from_minute(minute: u32) -> Self {
        if minute <= HALF_LENGTH {
            Half::First
        } else {
            Half::Second
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Half::First => "1st",
            Half::Second => "2nd",
        }
    }
}

/// Home or away side of a fixture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub fn label(&self) -> &'static str {
        match self {
            Side::Home => "home",
            Side::Away => "away",
        }
    }
}

/// A team's relative scoreboard state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamState {
    Winning,
    Drawing,
    Losing,
}

impl TeamState {
    /// States for (home, away) given the running score
    pub fn from_score(home: u32, away: u32) -> (TeamState, TeamState) {
        if home == away {
            (TeamState::Drawing, TeamState::Drawing)
        } else if home > away {
            (TeamState::Winning, TeamState::Losing)
        } else {
            (TeamState::Losing, TeamState::Winning)
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TeamState::Winning => "winning",
            TeamState::Drawing => "drawing",
            TeamState::Losing => "losing",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            TeamState::Winning => "green",
            TeamState::Drawing => "blue",
            TeamState::Losing => "red",
        }
    }
}

/// Minimal team reference carried in match summaries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRef {
    pub id: u64,
    pub name: String,
}

/// Stoppage minutes added to each half
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjuryTime {
    pub first_half: u32,
    pub second_half: u32,
}

impl InjuryTime {
    pub fn new(first_half: u32, second_half: u32) -> Self {
        Self {
            first_half,
            second_half,
        }
    }

    /// Clock minute at which the first half ends
    pub fn first_half_end(&self) -> u32 {
        HALF_LENGTH.saturating_add(self.first_half)
    }

    /// Regulation plus both stoppage allowances
    pub fn total_time(&self) -> u32 {
        REGULATION_LENGTH
            .saturating_add(self.first_half)
            .saturating_add(self.second_half)
    }
}

/// One scored goal as reported by the incident feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalEvent {
    /// Half-relative minute as emitted by the feed
    pub match_minute: u32,
    pub added_time: u32,
    pub half: Half,
    /// Side credited on the scoreboard
    pub team: Side,
    pub is_own_goal: bool,
    pub player_id: Option<u64>,
    pub player: Option<String>,
    pub player_short_name: Option<String>,
    /// Incident sub-classification (`regular`, `ownGoal`, `penalty`, ...)
    pub goal_type: String,
}

impl GoalEvent {
    /// Chronological instant of the goal in absolute match minutes.
    ///
    /// Second-half regulation goals are shifted by the first-half stoppage.
    /// Stoppage-time goals sit at their clock reading plus added time, but a
    /// second-half stoppage goal never lands before the shifted end of
    /// regulation.
    pub fn instant(&self, injury_time_1: u32) -> u32 {
        match self.half {
            Half::First => self.match_minute.saturating_add(self.added_time),
            Half::Second if self.added_time == 0 => self.match_minute.saturating_add(injury_time_1),
            // Not shifted by the first-half stoppage: 90'+4 with one minute of
            // first-half stoppage lands at 94, not 95.
            Half::Second => self
                .match_minute
                .saturating_add(self.added_time)
                .max(REGULATION_LENGTH.saturating_add(injury_time_1)),
        }
    }

    /// Feed clock reading, e.g. `45'+2`
    pub fn clock(&self) -> String {
        if self.added_time > 0 {
            format!("{}'+{}", self.match_minute, self.added_time)
        } else {
            format!("{}'", self.match_minute)
        }
    }

    pub fn display_name(&self) -> &str {
        self.player_short_name
            .as_deref()
            .or(self.player.as_deref())
            .unwrap_or("Unknown")
    }

    pub fn format(&self) -> String {
        let mut line = format!("{} {} ({})", self.clock(), self.display_name(), self.goal_type);
        if self.is_own_goal {
            line.push_str(" OG");
        }
        line
    }
}

/// A maximal interval during which neither team's state changes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub start: u32,
    pub end: u32,
    pub duration: u32,
    pub home: TeamState,
    pub away: TeamState,
    pub half: Half,
}

impl Segment {
    pub fn state_for(&self, side: Side) -> TeamState {
        match side {
            Side::Home => self.home,
            Side::Away => self.away,
        }
    }

    pub fn format(&self) -> String {
        format!(
            "[{:>3}, {:>3}) {:>3} min | {} half | home {} / away {}",
            self.start,
            self.end,
            self.duration,
            self.half.label(),
            self.home.label(),
            self.away.label()
        )
    }
}

/// Minutes spent in each state by one team
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTotals {
    pub winning: u32,
    pub drawing: u32,
    pub losing: u32,
}

impl StateTotals {
    pub fn add(&mut self, state: TeamState, minutes: u32) {
        match state {
            TeamState::Winning => self.winning += minutes,
            TeamState::Drawing => self.drawing += minutes,
            TeamState::Losing => self.losing += minutes,
        }
    }

    pub fn get(&self, state: TeamState) -> u32 {
        match state {
            TeamState::Winning => self.winning,
            TeamState::Drawing => self.drawing,
            TeamState::Losing => self.losing,
        }
    }

    pub fn total(&self) -> u32 {
        self.winning + self.drawing + self.losing
    }
}

/// Per-team time spent winning, drawing and losing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSummary {
    pub home: StateTotals,
    pub away: StateTotals,
}

impl StateSummary {
    pub fn for_side(&self, side: Side) -> &StateTotals {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }
}

/// Header data for one fixture, as listed by a round or event lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub match_id: u64,
    pub home_team: TeamRef,
    pub away_team: TeamRef,
    /// Initial stoppage watermarks from the summary
    pub injury_time: InjuryTime,
    pub tournament: Option<String>,
    pub country: Option<String>,
    pub season: Option<String>,
    pub season_year: Option<String>,
    pub round: Option<u32>,
    pub start_timestamp: Option<i64>,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub home_red_cards: u32,
    pub away_red_cards: u32,
}

impl MatchSummary {
    /// `"Home vs Away - Season"`
    pub fn label(&self) -> String {
        format!(
            "{} vs {} - {}",
            self.home_team.name,
            self.away_team.name,
            self.season.as_deref().unwrap_or("")
        )
    }
}

/// One team's line in a league table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingRow {
    pub position: Option<u32>,
    pub team: TeamRef,
    pub name_code: Option<String>,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub scores_for: u32,
    pub scores_against: u32,
    /// Goal difference as the feed renders it, e.g. `+12`
    pub score_diff: Option<String>,
    /// Qualification or relegation zone, e.g. `Champions League`
    pub promotion: Option<String>,
    /// Feed descriptions joined with ` | `
    pub description: String,
}

impl StandingRow {
    pub fn played(&self) -> u32 {
        self.wins + self.draws + self.losses
    }

    pub fn points(&self) -> u32 {
        self.wins * 3 + self.draws
    }
}

/// Final result from the display score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchResult {
    Home,
    Away,
    Draw,
}

impl MatchResult {
    pub fn from_score(home: u32, away: u32) -> Self {
        if home > away {
            MatchResult::Home
        } else if home < away {
            MatchResult::Away
        } else {
            MatchResult::Draw
        }
    }
}

/// Everything computed for one fixture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    pub summary: MatchSummary,
    pub label: String,
    pub result: Option<MatchResult>,
    pub kickoff: Option<String>,
    /// Watermarks after incident extraction
    pub injury_time: InjuryTime,
    pub total_time: u32,
    pub home_goals: Vec<GoalEvent>,
    pub away_goals: Vec<GoalEvent>,
    pub segments: Vec<Segment>,
    pub game_states: StateSummary,
}

impl MatchReport {
    /// Goals for one side ordered by feed clock
    pub fn goals_by_clock(&self, side: Side) -> Vec<&GoalEvent> {
        let goals = match side {
            Side::Home => &self.home_goals,
            Side::Away => &self.away_goals,
        };
        let mut sorted: Vec<&GoalEvent> = goals.iter().collect();
        sorted.sort_by_key(|g| (g.match_minute, g.added_time));
        sorted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goal(minute: u32, added: u32) -> GoalEvent {
        GoalEvent {
            match_minute: minute,
            added_time: added,
            half: Half::from_minute(minute),
            team: Side::Home,
            is_own_goal: false,
            player_id: None,
            player: Some("Bukayo Saka".to_string()),
            player_short_name: Some("B. Saka".to_string()),
            goal_type: "regular".to_string(),
        }
    }

    #[test]
    fn test_half_from_minute() {
        assert_eq!(Half::from_minute(1), Half::First);
        assert_eq!(Half::from_minute(45), Half::First);
        assert_eq!(Half::from_minute(46), Half::Second);
        assert_eq!(Half::from_minute(90), Half::Second);
    }

    #[test]
    fn test_state_from_score() {
        assert_eq!(
            TeamState::from_score(0, 0),
            (TeamState::Drawing, TeamState::Drawing)
        );
        assert_eq!(
            TeamState::from_score(2, 1),
            (TeamState::Winning, TeamState::Losing)
        );
        assert_eq!(
            TeamState::from_score(0, 3),
            (TeamState::Losing, TeamState::Winning)
        );
    }

    #[test]
    fn test_goal_instant() {
        // First half, regulation and stoppage
        assert_eq!(goal(30, 0).instant(3), 30);
        assert_eq!(goal(45, 2).instant(3), 47);
        // Second half regulation is shifted by first-half stoppage
        assert_eq!(goal(50, 0).instant(1), 51);
        // Second half stoppage sits on its clock reading
        assert_eq!(goal(90, 4).instant(1), 94);
        // ...but never before the shifted end of regulation
        assert_eq!(goal(90, 1).instant(5), 95);
    }

    #[test]
    fn test_goal_format() {
        let mut g = goal(45, 2);
        assert_eq!(g.format(), "45'+2 B. Saka (regular)");

        g.is_own_goal = true;
        g.goal_type = "ownGoal".to_string();
        g.player_short_name = None;
        assert_eq!(g.format(), "45'+2 Bukayo Saka (ownGoal) OG");
    }

    #[test]
    fn test_injury_time_totals() {
        let injury = InjuryTime::new(3, 5);
        assert_eq!(injury.first_half_end(), 48);
        assert_eq!(injury.total_time(), 98);
    }

    #[test]
    fn test_huge_stoppage_saturates() {
        let injury = InjuryTime::new(u32::MAX, u32::MAX);
        assert_eq!(injury.first_half_end(), u32::MAX);
        assert_eq!(injury.total_time(), u32::MAX);
        assert_eq!(goal(90, u32::MAX).instant(u32::MAX), u32::MAX);
    }

    #[test]
    fn test_standing_row_points() {
        let row = StandingRow {
            position: Some(1),
            team: TeamRef { id: 17, name: "Manchester City".to_string() },
            name_code: Some("MCI".to_string()),
            wins: 28,
            draws: 7,
            losses: 3,
            scores_for: 96,
            scores_against: 34,
            score_diff: Some("+62".to_string()),
            promotion: None,
            description: String::new(),
        };
        assert_eq!(row.played(), 38);
        assert_eq!(row.points(), 91);
    }

    #[test]
    fn test_match_result() {
        assert_eq!(MatchResult::from_score(2, 1), MatchResult::Home);
        assert_eq!(MatchResult::from_score(0, 1), MatchResult::Away);
        assert_eq!(MatchResult::from_score(1, 1), MatchResult::Draw);
    }
}
