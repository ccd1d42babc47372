//! The days challenge and its aggregator.
//!
//! The stored [`DaysChallenge`] record is flat. All derived views — current
//! day, past/future partition, progress, ordering — live on
//! [`ChallengeView`], the materialised read model that joins each member day
//! with its calendar date and keeps the set sorted by construction.
//!
//! Every date-dependent query takes an explicit `today`, so behaviour is a
//! pure function of its inputs. Mutating operations update the view in
//! memory and return a change record ([`DayMark`], [`Closure`]) describing
//! exactly what the caller must persist.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::day::ResolvedDay;

// ─── Stored record ───────────────────────────────────────────────────────────

/// A bounded, contiguous range of calendar days on which a habit is tracked.
///
/// `from_date` and `to_date` are inclusive and track the min/max date of the
/// member day set, with one exception: [`ChallengeView::close`] pins
/// `to_date` to the day before closure regardless of what it was.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaysChallenge {
  pub challenge_id: Uuid,
  pub habit_id:     Uuid,
  pub created_at:   DateTime<Utc>,
  pub from_date:    NaiveDate,
  pub to_date:      NaiveDate,
  pub is_closed:    bool,
}

// ─── Change records ──────────────────────────────────────────────────────────

/// The persistent effect of [`ChallengeView::mark_current_day`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayMark {
  pub habit_day_id: Uuid,
  pub executed:     bool,
  pub marked_at:    DateTime<Utc>,
  /// True when this mark completed the final day and closed the challenge.
  pub closed_challenge: bool,
}

/// The persistent effect of [`ChallengeView::close`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Closure {
  pub challenge_id: Uuid,
  /// Habit days removed from the challenge: the current day (if any) plus
  /// every future day. These records are deleted permanently; the calendar
  /// days they pointed at survive.
  pub removed_day_ids: Vec<Uuid>,
  /// The truncated upper bound: the day before `today`.
  pub to_date: NaiveDate,
}

/// Progress toward the challenge total. `past` advances as days elapse
/// whether or not they were executed, plus one for a same-day completion;
/// `total` never reports zero so percentage math downstream stays defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
  pub past:  usize,
  pub total: usize,
}

// ─── View ────────────────────────────────────────────────────────────────────

/// The materialised read model for one challenge: the stored record plus its
/// member days, sorted ascending by date. Dates are unique within a
/// challenge, so the order is total.
#[derive(Debug, Clone)]
pub struct ChallengeView {
  pub challenge: DaysChallenge,
  days: Vec<ResolvedDay>,
}

impl ChallengeView {
  /// Assemble a view from a challenge record and its (unordered) days.
  pub fn new(challenge: DaysChallenge, mut days: Vec<ResolvedDay>) -> Self {
    days.sort_by_key(|d| d.date);
    Self { challenge, days }
  }

  /// Member days, ascending by date.
  pub fn days(&self) -> &[ResolvedDay] { &self.days }

  /// The date of the final challenge day, if any day remains.
  pub fn last_date(&self) -> Option<NaiveDate> {
    self.days.last().map(|d| d.date)
  }

  // ── Lookups ───────────────────────────────────────────────────────────

  /// The member day falling on `date`, if the challenge tracks it.
  pub fn day_for(&self, date: NaiveDate) -> Option<&ResolvedDay> {
    self.days.iter().find(|d| d.date == date)
  }

  /// The member day falling on `today`, or `None` when today is outside the
  /// challenge's day set.
  pub fn current_day(&self, today: NaiveDate) -> Option<&ResolvedDay> {
    self.day_for(today)
  }

  /// 1-based rank of a member day by ascending date, or `None` if the id is
  /// not a member.
  pub fn order_of(&self, habit_day_id: Uuid) -> Option<usize> {
    self
      .days
      .iter()
      .position(|d| d.record.habit_day_id == habit_day_id)
      .map(|idx| idx + 1)
  }

  // ── Partitions ────────────────────────────────────────────────────────

  /// Days marked as executed, regardless of when they fall.
  pub fn executed_days(&self) -> Vec<&ResolvedDay> {
    self.days.iter().filter(|d| d.record.was_executed).collect()
  }

  /// Unexecuted days strictly before `today`. Today and future days are
  /// never "missed" — they can still be executed.
  pub fn missed_days(&self, today: NaiveDate) -> Vec<&ResolvedDay> {
    self
      .days
      .iter()
      .filter(|d| !d.record.was_executed && d.date < today)
      .collect()
  }

  /// Days strictly before `today`.
  pub fn past_days(&self, today: NaiveDate) -> Vec<&ResolvedDay> {
    self.days.iter().filter(|d| d.date < today).collect()
  }

  /// Days strictly after `today`.
  pub fn future_days(&self, today: NaiveDate) -> Vec<&ResolvedDay> {
    self.days.iter().filter(|d| d.date > today).collect()
  }

  /// Progress toward the total day count: every elapsed day counts whether
  /// executed or missed, and today counts once it has been executed.
  pub fn completion_progress(&self, today: NaiveDate) -> Progress {
    let mut past = self.days.iter().filter(|d| d.date < today).count();
    if self
      .current_day(today)
      .is_some_and(|d| d.record.was_executed)
    {
      past += 1;
    }
    Progress { past, total: self.days.len().max(1) }
  }

  // ── Transitions ───────────────────────────────────────────────────────

  /// Set the executed flag on today's day record.
  ///
  /// Returns `None` (and changes nothing) when today is not a member day.
  /// A successful mark on the final day closes the challenge; marking the
  /// final day as missed does not. A closed challenge never reopens.
  pub fn mark_current_day(
    &mut self,
    executed: bool,
    today: NaiveDate,
    at: DateTime<Utc>,
  ) -> Option<DayMark> {
    let total = self.days.len();
    let idx = self.days.iter().position(|d| d.date == today)?;

    let day = &mut self.days[idx];
    day.record.was_executed = executed;
    day.record.updated_at = at;
    let habit_day_id = day.record.habit_day_id;

    let is_final = idx + 1 == total;
    let closes = is_final && executed && !self.challenge.is_closed;
    if closes {
      self.challenge.is_closed = true;
    }

    Some(DayMark {
      habit_day_id,
      executed,
      marked_at: at,
      closed_challenge: closes,
    })
  }

  /// Close the challenge, truncating its unexecuted tail.
  ///
  /// Removes today's day (if any) and every future day from the set, and
  /// pins `to_date` to yesterday regardless of the original bound, so
  /// historical views never show future days inside a closed challenge.
  /// Closing an already-closed challenge is a harmless no-op removal.
  pub fn close(&mut self, today: NaiveDate) -> Closure {
    let removed_day_ids: Vec<Uuid> = self
      .days
      .iter()
      .filter(|d| d.date >= today)
      .map(|d| d.record.habit_day_id)
      .collect();
    self.days.retain(|d| d.date < today);

    let to_date = today.pred_opt().unwrap_or(NaiveDate::MIN);
    self.challenge.is_closed = true;
    self.challenge.to_date = to_date;

    Closure {
      challenge_id: self.challenge.challenge_id,
      removed_day_ids,
      to_date,
    }
  }
}

// ─── Reminder text ───────────────────────────────────────────────────────────

/// The reminder body line for the day at 1-based `order`:
/// `"1st day."`, `"22nd day."`, and so on.
pub fn notification_text(order: usize) -> String {
  format!("{} day.", ordinal(order))
}

fn ordinal(n: usize) -> String {
  let suffix = match (n % 100, n % 10) {
    (11..=13, _) => "th",
    (_, 1) => "st",
    (_, 2) => "nd",
    (_, 3) => "rd",
    _ => "th",
  };
  format!("{n}{suffix}")
}
