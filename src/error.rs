use crate::models::InjuryTime;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameStateError {
    /// The incident feed could not be retrieved or parsed
    #[error("feed unavailable at {url}: {reason}")]
    FeedUnavailable { url: String, reason: String },

    /// The caller's total time disagrees with regulation plus stoppage
    #[error(
        "total time {total_time} does not match 90 + {injury_time_1} + {injury_time_2}"
    )]
    InconsistentTiming {
        total_time: u32,
        injury_time_1: u32,
        injury_time_2: u32,
    },
}

impl GameStateError {
    pub fn unavailable(url: impl Into<String>, reason: impl ToString) -> Self {
        GameStateError::FeedUnavailable {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

/// Check a caller-supplied total against the finalized injury time
pub fn check_timing(total_time: u32, injury_time: InjuryTime) -> Result<(), GameStateError> {
    if total_time == injury_time.total_time() {
        Ok(())
    } else {
        Err(GameStateError::InconsistentTiming {
            total_time,
            injury_time_1: injury_time.first_half,
            injury_time_2: injury_time.second_half,
        })
    }
}
