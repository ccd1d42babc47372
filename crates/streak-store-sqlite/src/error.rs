//! Error type for `streak-store-sqlite`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("column decode error: {0}")]
  Decode(String),

  #[error("habit not found: {0}")]
  HabitNotFound(Uuid),

  #[error("challenge not found: {0}")]
  ChallengeNotFound(Uuid),

  #[error("habit day not found: {0}")]
  DayNotFound(Uuid),

  #[error("notification not found: {0}")]
  NotificationNotFound(Uuid),

  #[error("a days challenge needs at least one date")]
  EmptyDaySelection,

  #[error("fire time {hour:02}:{minute:02} is already set for habit {habit_id}")]
  FireTimeTaken {
    habit_id: Uuid,
    hour:     u8,
    minute:   u8,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
