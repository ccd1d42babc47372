//! [`HabitService`] — the one entry point user actions go through.
//!
//! Every method resolves "now" from an optional `as_of` instant (defaulting
//! to the wall clock), mutates through the injected store, and keeps the
//! notification center in sync. Reads hand back the core's materialised
//! views untouched.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use tracing::debug;
use uuid::Uuid;

use streak_core::{
  challenge::{ChallengeView, Closure, DayMark, DaysChallenge},
  day::ResolvedDay,
  error::Error as CoreError,
  habit::{Habit, NewHabit},
  reminder::{self, FireTime, NewFireTime, Notification},
  store::HabitStore,
};
use streak_notify::{NotificationCenter, ReminderScheduler, ScheduleOutcome};

use crate::error::{Error, Result};

/// Everything the habit-creation flow produced.
#[derive(Debug)]
pub struct HabitCreation {
  pub habit:         Habit,
  pub challenge:     ChallengeView,
  pub fire_times:    Vec<FireTime>,
  pub notifications: Vec<Notification>,
}

/// Execution counts across a habit's full history, not just the current
/// challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HabitStats {
  pub executed: usize,
  pub total:    usize,
}

impl HabitStats {
  pub fn execution_percentage(&self) -> f64 {
    if self.total == 0 {
      0.0
    } else {
      self.executed as f64 / self.total as f64 * 100.0
    }
  }
}

pub struct HabitService<S, C> {
  store:     S,
  scheduler: ReminderScheduler<C>,
}

impl<S, C> HabitService<S, C>
where
  S: HabitStore,
  C: NotificationCenter,
{
  pub fn new(store: S, center: C) -> Self {
    Self {
      store,
      scheduler: ReminderScheduler::new(center),
    }
  }

  pub fn store(&self) -> &S { &self.store }

  pub fn scheduler(&self) -> &ReminderScheduler<C> { &self.scheduler }

  fn resolve(as_of: Option<DateTime<Utc>>) -> (DateTime<Utc>, NaiveDate) {
    let now = as_of.unwrap_or_else(Utc::now);
    (now, now.date_naive())
  }

  async fn require_habit(&self, habit_id: Uuid) -> Result<Habit> {
    self
      .store
      .get_habit(habit_id)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| CoreError::HabitNotFound(habit_id).into())
  }

  /// Hand a freshly persisted batch to the scheduler and record successful
  /// hand-offs back into the store.
  async fn schedule_and_record(
    &self,
    habit: &Habit,
    notifications: &mut [Notification],
    now: DateTime<Utc>,
  ) -> Result<()> {
    let outcomes = self
      .scheduler
      .schedule_all(habit, notifications, now)
      .await?;

    for notification in notifications.iter() {
      if let (true, Some(external_id)) =
        (notification.was_scheduled, notification.user_notification_id)
      {
        self
          .store
          .mark_notification_scheduled(notification.notification_id, external_id)
          .await
          .map_err(Error::store)?;
      }
    }

    let scheduled = outcomes
      .iter()
      .filter(|o| **o == ScheduleOutcome::Scheduled)
      .count();
    debug!(
      habit = %habit.habit_id,
      scheduled,
      planned = outcomes.len(),
      "reminder scheduling pass finished",
    );
    Ok(())
  }

  /// Plan, persist and schedule reminders for the pending days of a
  /// challenge against the given fire times.
  async fn create_reminders(
    &self,
    habit: &Habit,
    view: &ChallengeView,
    fire_times: &[FireTime],
    now: DateTime<Utc>,
    today: NaiveDate,
  ) -> Result<Vec<Notification>> {
    let planned = reminder::plan_reminders(view, fire_times, today);
    if planned.is_empty() {
      return Ok(Vec::new());
    }
    let mut notifications = self
      .store
      .add_notifications(&planned)
      .await
      .map_err(Error::store)?;
    self
      .schedule_and_record(habit, &mut notifications, now)
      .await?;
    Ok(notifications)
  }

  // ── Habit creation flow ───────────────────────────────────────────────

  /// Create a habit together with its first challenge, its fire times, and
  /// one scheduled reminder per (pending day × fire time).
  pub async fn create_habit(
    &self,
    input: NewHabit,
    dates: &[NaiveDate],
    fire_times: &[NewFireTime],
    as_of: Option<DateTime<Utc>>,
  ) -> Result<HabitCreation> {
    if input.name.trim().is_empty() {
      return Err(CoreError::EmptyHabitName.into());
    }
    if dates.is_empty() {
      return Err(CoreError::EmptyDaySelection.into());
    }
    let (now, today) = Self::resolve(as_of);

    let habit = self.store.add_habit(input).await.map_err(Error::store)?;
    let challenge = self
      .store
      .add_challenge(habit.habit_id, dates)
      .await
      .map_err(Error::store)?;

    let mut times = Vec::with_capacity(fire_times.len());
    for &fire_time in fire_times {
      times.push(
        self
          .store
          .add_fire_time(habit.habit_id, fire_time)
          .await
          .map_err(Error::store)?,
      );
    }

    let notifications = self
      .create_reminders(&habit, &challenge, &times, now, today)
      .await?;

    Ok(HabitCreation {
      habit,
      challenge,
      fire_times: times,
      notifications,
    })
  }

  // ── Day selection ─────────────────────────────────────────────────────

  /// Start a new challenge for an existing habit. Rejected while another
  /// open challenge still contains today.
  pub async fn add_challenge(
    &self,
    habit_id: Uuid,
    dates: &[NaiveDate],
    as_of: Option<DateTime<Utc>>,
  ) -> Result<ChallengeView> {
    if dates.is_empty() {
      return Err(CoreError::EmptyDaySelection.into());
    }
    let (now, today) = Self::resolve(as_of);
    let habit = self.require_habit(habit_id).await?;

    if self
      .store
      .current_challenge(habit_id, today)
      .await
      .map_err(Error::store)?
      .is_some()
    {
      return Err(CoreError::ChallengeInProgress(habit_id).into());
    }

    let view = self
      .store
      .add_challenge(habit_id, dates)
      .await
      .map_err(Error::store)?;

    let fire_times = self
      .store
      .list_fire_times(habit_id)
      .await
      .map_err(Error::store)?;
    self
      .create_reminders(&habit, &view, &fire_times, now, today)
      .await?;

    Ok(view)
  }

  // ── Fire times ────────────────────────────────────────────────────────

  /// Add a reminder time and plan its share of reminders for the current
  /// challenge, if one is running.
  pub async fn add_fire_time(
    &self,
    habit_id: Uuid,
    input: NewFireTime,
    as_of: Option<DateTime<Utc>>,
  ) -> Result<FireTime> {
    let (now, today) = Self::resolve(as_of);
    let habit = self.require_habit(habit_id).await?;

    let fire_time = self
      .store
      .add_fire_time(habit_id, input)
      .await
      .map_err(Error::store)?;

    if let Some(view) = self
      .store
      .current_challenge(habit_id, today)
      .await
      .map_err(Error::store)?
    {
      self
        .create_reminders(&habit, &view, std::slice::from_ref(&fire_time), now, today)
        .await?;
    }

    Ok(fire_time)
  }

  // ── Marking ───────────────────────────────────────────────────────────

  /// Mark today's day of the current challenge as executed or missed.
  ///
  /// When the challenge's range contains today but no day record exists yet
  /// (a reminder action racing day creation), the record is created lazily
  /// and then marked.
  pub async fn mark_today(
    &self,
    habit_id: Uuid,
    executed: bool,
    as_of: Option<DateTime<Utc>>,
  ) -> Result<DayMark> {
    let (now, today) = Self::resolve(as_of);

    let mut view = self
      .store
      .current_challenge(habit_id, today)
      .await
      .map_err(Error::store)?
      .ok_or(CoreError::NoActiveChallenge(habit_id))?;
    let challenge_id = view.challenge.challenge_id;

    let mark = match view.mark_current_day(executed, today, now) {
      Some(mark) => mark,
      None => {
        let added = self
          .store
          .add_day(challenge_id, today)
          .await
          .map_err(Error::store)?;
        view = self
          .store
          .get_challenge(challenge_id)
          .await
          .map_err(Error::store)?
          .ok_or(CoreError::ChallengeNotFound(challenge_id))?;
        view
          .mark_current_day(executed, today, now)
          .ok_or(CoreError::DayNotFound(added.record.habit_day_id))?
      }
    };

    self
      .store
      .set_day_executed(mark.habit_day_id, executed, now)
      .await
      .map_err(Error::store)?;
    if mark.closed_challenge {
      self
        .store
        .set_challenge_closed(challenge_id)
        .await
        .map_err(Error::store)?;
    }

    Ok(mark)
  }

  // ── Closure ───────────────────────────────────────────────────────────

  /// Abandon the current challenge: truncate its unexecuted tail, persist
  /// the closure, and cancel and delete the reminders that pointed at the
  /// removed days.
  pub async fn close_current_challenge(
    &self,
    habit_id: Uuid,
    as_of: Option<DateTime<Utc>>,
  ) -> Result<Closure> {
    let (_, today) = Self::resolve(as_of);

    let mut view = self
      .store
      .current_challenge(habit_id, today)
      .await
      .map_err(Error::store)?
      .ok_or(CoreError::NoActiveChallenge(habit_id))?;

    let closure = view.close(today);
    self
      .store
      .apply_closure(&closure)
      .await
      .map_err(Error::store)?;

    // Reminders for today and later now point at removed days.
    let cutoff = today.and_time(NaiveTime::MIN).and_utc();
    let stale: Vec<Notification> = self
      .store
      .list_notifications(habit_id)
      .await
      .map_err(Error::store)?
      .into_iter()
      .filter(|n| n.fire_date >= cutoff)
      .collect();

    self.scheduler.unschedule(&stale).await;
    let stale_ids: Vec<Uuid> = stale.iter().map(|n| n.notification_id).collect();
    self
      .store
      .delete_notifications(&stale_ids)
      .await
      .map_err(Error::store)?;

    Ok(closure)
  }

  // ── Deletion ──────────────────────────────────────────────────────────

  /// Delete a habit and everything it owns, cancelling its pending
  /// OS reminders first.
  pub async fn delete_habit(&self, habit_id: Uuid) -> Result<()> {
    let notifications = self
      .store
      .list_notifications(habit_id)
      .await
      .map_err(Error::store)?;
    self.scheduler.unschedule(&notifications).await;

    self.store.delete_habit(habit_id).await.map_err(Error::store)
  }

  // ── Reads ─────────────────────────────────────────────────────────────

  pub async fn habit(&self, habit_id: Uuid) -> Result<Habit> {
    self.require_habit(habit_id).await
  }

  pub async fn habits(&self) -> Result<Vec<Habit>> {
    self.store.list_habits().await.map_err(Error::store)
  }

  pub async fn challenges(&self, habit_id: Uuid) -> Result<Vec<DaysChallenge>> {
    self
      .store
      .list_challenges(habit_id)
      .await
      .map_err(Error::store)
  }

  /// The open challenge containing today, materialised.
  pub async fn current_challenge(
    &self,
    habit_id: Uuid,
    as_of: Option<DateTime<Utc>>,
  ) -> Result<Option<ChallengeView>> {
    let (_, today) = Self::resolve(as_of);
    self
      .store
      .current_challenge(habit_id, today)
      .await
      .map_err(Error::store)
  }

  /// Today's day record of the current challenge, if both exist.
  pub async fn current_day(
    &self,
    habit_id: Uuid,
    as_of: Option<DateTime<Utc>>,
  ) -> Result<Option<ResolvedDay>> {
    let (_, today) = Self::resolve(as_of);
    let view = self
      .store
      .current_challenge(habit_id, today)
      .await
      .map_err(Error::store)?;
    Ok(view.and_then(|v| v.current_day(today).cloned()))
  }

  /// Execution counts across every day ever tracked for the habit.
  pub async fn stats(&self, habit_id: Uuid) -> Result<HabitStats> {
    self.require_habit(habit_id).await?;
    let days = self.store.list_days(habit_id).await.map_err(Error::store)?;
    Ok(HabitStats {
      executed: days.iter().filter(|d| d.record.was_executed).count(),
      total:    days.len(),
    })
  }
}
