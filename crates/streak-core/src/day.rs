//! Calendar days and per-habit day records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A deduplicated representation of one calendar date, shared across habits.
///
/// At most one row per distinct date exists system-wide; the store backs this
/// with a uniqueness constraint rather than relying on a single writer.
/// Calendar days are never mutated and outlive any challenge that reused
/// them; the store prunes a day only once its last referencing
/// [`HabitDay`] is gone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarDay {
  pub day_id: Uuid,
  pub date:   NaiveDate,
}

/// The record of whether a habit was executed on one specific calendar day.
///
/// A habit has at most one record per calendar day. Ownership edges are id
/// references: the owning habit, the owning challenge, and the shared
/// calendar day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitDay {
  pub habit_day_id: Uuid,
  pub habit_id:     Uuid,
  pub challenge_id: Uuid,
  pub day_id:       Uuid,
  pub was_executed: bool,
  pub updated_at:   DateTime<Utc>,
}

/// A habit day joined with its calendar date — the unit the challenge
/// aggregator works over.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedDay {
  pub record: HabitDay,
  pub date:   NaiveDate,
}
