//! Habit — the aggregate root of the tracker.
//!
//! A habit holds only identity metadata. Its challenges, fire times and
//! notifications reference it by id; the graph is assembled by the store,
//! never held as object pointers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Palette index used when rendering a habit. The set is closed; storage
/// encodes the variant name as a lowercase string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitColor {
  Red,
  Orange,
  Yellow,
  Green,
  Teal,
  Blue,
  Indigo,
  Purple,
  Pink,
}

/// A user-defined recurring activity to track.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Habit {
  pub habit_id:   Uuid,
  pub name:       String,
  pub color:      HabitColor,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::HabitStore::add_habit`].
/// `created_at` is always set by the store; it is not accepted from callers.
#[derive(Debug, Clone)]
pub struct NewHabit {
  pub name:  String,
  pub color: HabitColor,
}
