//! The `HabitStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `streak-store-sqlite`).
//! Higher layers (`streak-app`) depend on this abstraction, not on any
//! concrete backend. Relationship traversal happens inside the store;
//! aggregates receive materialised [`ChallengeView`]s and flat records.
//!
//! All methods return `Send` futures so the trait can be used from
//! multi-threaded async runtimes.

use std::future::Future;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{
  challenge::{ChallengeView, Closure, DaysChallenge},
  day::{CalendarDay, ResolvedDay},
  habit::{Habit, NewHabit},
  reminder::{FireTime, NewFireTime, NewNotification, Notification},
};

/// Abstraction over a streak storage backend.
pub trait HabitStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Habits ────────────────────────────────────────────────────────────

  /// Create and persist a new habit. `created_at` is set by the store.
  fn add_habit(
    &self,
    input: NewHabit,
  ) -> impl Future<Output = Result<Habit, Self::Error>> + Send + '_;

  /// Retrieve a habit by id. Returns `None` if not found.
  fn get_habit(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Habit>, Self::Error>> + Send + '_;

  /// List all habits, oldest first.
  fn list_habits(
    &self,
  ) -> impl Future<Output = Result<Vec<Habit>, Self::Error>> + Send + '_;

  /// Delete a habit and everything it exclusively owns: challenges, day
  /// records, fire times, notifications. Calendar days are shared; a day is
  /// pruned only once no habit day references it any more.
  fn delete_habit(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Calendar day registry ─────────────────────────────────────────────

  /// Return the calendar day for `date`, creating it if absent. Never fails
  /// on absence — creation is the fallback.
  fn day_for(
    &self,
    date: NaiveDate,
  ) -> impl Future<Output = Result<CalendarDay, Self::Error>> + Send + '_;

  // ── Challenges ────────────────────────────────────────────────────────

  /// Create a challenge for `habit_id` with one habit day per date, reusing
  /// calendar days through the registry. `from_date`/`to_date` are the
  /// min/max of `dates`. Errors on an empty selection.
  fn add_challenge<'a>(
    &'a self,
    habit_id: Uuid,
    dates: &'a [NaiveDate],
  ) -> impl Future<Output = Result<ChallengeView, Self::Error>> + Send + 'a;

  /// Materialise the view for a challenge. Returns `None` if not found.
  fn get_challenge(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<ChallengeView>, Self::Error>> + Send + '_;

  /// All challenge records ever created for a habit, oldest first.
  fn list_challenges(
    &self,
    habit_id: Uuid,
  ) -> impl Future<Output = Result<Vec<DaysChallenge>, Self::Error>> + Send + '_;

  /// The open challenge whose `[from_date, to_date]` contains `today`, or
  /// `None`. If callers have violated the at-most-one-open precondition the
  /// most recently created match wins.
  fn current_challenge(
    &self,
    habit_id: Uuid,
    today: NaiveDate,
  ) -> impl Future<Output = Result<Option<ChallengeView>, Self::Error>> + Send + '_;

  /// Lazily add a day record to an existing challenge (e.g. a missing
  /// "today" created from a notification action).
  fn add_day(
    &self,
    challenge_id: Uuid,
    date: NaiveDate,
  ) -> impl Future<Output = Result<ResolvedDay, Self::Error>> + Send + '_;

  /// Persist the executed flag of [`ChallengeView::mark_current_day`].
  fn set_day_executed(
    &self,
    habit_day_id: Uuid,
    executed: bool,
    at: DateTime<Utc>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Persist the auto-close of a challenge whose final day was executed.
  fn set_challenge_closed(
    &self,
    challenge_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Persist a [`Closure`]: delete the removed day records, mark the
  /// challenge closed, truncate `to_date`, and prune orphaned calendar days.
  fn apply_closure<'a>(
    &'a self,
    closure: &'a Closure,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Every day record ever linked to a habit, across all its challenges.
  fn list_days(
    &self,
    habit_id: Uuid,
  ) -> impl Future<Output = Result<Vec<ResolvedDay>, Self::Error>> + Send + '_;

  // ── Fire times ────────────────────────────────────────────────────────

  /// Add a fire time. Errors if the habit already has one at the same
  /// (hour, minute).
  fn add_fire_time(
    &self,
    habit_id: Uuid,
    input: NewFireTime,
  ) -> impl Future<Output = Result<FireTime, Self::Error>> + Send + '_;

  /// Fire times of a habit, in daily firing order.
  fn list_fire_times(
    &self,
    habit_id: Uuid,
  ) -> impl Future<Output = Result<Vec<FireTime>, Self::Error>> + Send + '_;

  // ── Notifications ─────────────────────────────────────────────────────

  /// Persist a batch of planned reminders, unscheduled.
  fn add_notifications<'a>(
    &'a self,
    inputs: &'a [NewNotification],
  ) -> impl Future<Output = Result<Vec<Notification>, Self::Error>> + Send + 'a;

  /// Notifications of a habit, ascending by fire date.
  fn list_notifications(
    &self,
    habit_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Notification>, Self::Error>> + Send + '_;

  /// Record a successful hand-off to the OS primitive: set the external key
  /// and the scheduled flag.
  fn mark_notification_scheduled(
    &self,
    id: Uuid,
    user_notification_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete notification records, e.g. the unscheduled tail of a closed
  /// challenge. Unknown ids are ignored.
  fn delete_notifications<'a>(
    &'a self,
    ids: &'a [Uuid],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
