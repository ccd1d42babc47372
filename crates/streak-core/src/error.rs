//! Error types for `streak-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("habit not found: {0}")]
  HabitNotFound(Uuid),

  #[error("challenge not found: {0}")]
  ChallengeNotFound(Uuid),

  #[error("habit day not found: {0}")]
  DayNotFound(Uuid),

  #[error("a days challenge needs at least one date")]
  EmptyDaySelection,

  #[error("habit {0} already has an open challenge")]
  ChallengeInProgress(Uuid),

  #[error("habit {0} has no active challenge")]
  NoActiveChallenge(Uuid),

  #[error("habit name must not be empty")]
  EmptyHabitName,

  #[error("habit {0} has no name to build a reminder from")]
  UnnamedHabit(Uuid),

  #[error("fire time {hour:02}:{minute:02} is already set for habit {habit_id}")]
  FireTimeTaken {
    habit_id: Uuid,
    hour:     u8,
    minute:   u8,
  },

  #[error("not a wall-clock time: {hour:02}:{minute:02}")]
  InvalidFireTime { hour: u8, minute: u8 },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
