//! Fire times and reminder notifications.
//!
//! A fire time is a wall-clock moment the user wants to be reminded at; a
//! notification is one concrete reminder instance, tied to a challenge day
//! and a fire time. Planning (which reminders a challenge needs) is pure and
//! lives here; talking to the OS primitive is the scheduling bridge's job.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  challenge::ChallengeView,
  error::{Error, Result},
};

// ─── Fire times ──────────────────────────────────────────────────────────────

/// A user-configured time of day at which a reminder should fire.
/// No two fire times of the same habit share an (hour, minute) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FireTime {
  pub fire_time_id: Uuid,
  pub habit_id:     Uuid,
  pub hour:         u8,
  pub minute:       u8,
  pub created_at:   DateTime<Utc>,
}

impl FireTime {
  /// The wall-clock time this fire time names.
  pub fn time(&self) -> NaiveTime {
    NaiveTime::from_hms_opt(u32::from(self.hour), u32::from(self.minute), 0)
      .unwrap_or(NaiveTime::MIN)
  }
}

/// Input to [`crate::store::HabitStore::add_fire_time`]. Range-validated at
/// construction, so a stored fire time always names a real wall-clock time.
#[derive(Debug, Clone, Copy)]
pub struct NewFireTime {
  hour:   u8,
  minute: u8,
}

impl NewFireTime {
  pub fn new(hour: u8, minute: u8) -> Result<Self> {
    if hour > 23 || minute > 59 {
      return Err(Error::InvalidFireTime { hour, minute });
    }
    Ok(Self { hour, minute })
  }

  pub fn hour(&self) -> u8 { self.hour }

  pub fn minute(&self) -> u8 { self.minute }
}

// ─── Notifications ───────────────────────────────────────────────────────────

/// A scheduled reminder instance tied to one challenge day and fire time.
///
/// `user_notification_id` is the external scheduling-system key; it is
/// assigned at schedule time, never at creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
  pub notification_id:      Uuid,
  pub habit_id:             Uuid,
  /// Absolute instant the reminder should fire. Must be strictly in the
  /// future at the moment of scheduling; otherwise scheduling is skipped.
  pub fire_date:            DateTime<Utc>,
  /// 1-based position of the target day within its challenge.
  pub day_order:            u32,
  pub was_scheduled:        bool,
  pub user_notification_id: Option<Uuid>,
}

/// Input to [`crate::store::HabitStore::add_notifications`].
#[derive(Debug, Clone)]
pub struct NewNotification {
  pub habit_id:  Uuid,
  pub fire_date: DateTime<Utc>,
  pub day_order: u32,
}

/// Plan one reminder per (pending day × fire time) pair.
///
/// Days strictly before `today` get no reminders; a reminder's fire instant
/// is the day's date combined with the fire time's wall-clock moment.
pub fn plan_reminders(
  view: &ChallengeView,
  fire_times: &[FireTime],
  today: NaiveDate,
) -> Vec<NewNotification> {
  let mut planned = Vec::new();
  for (idx, day) in view.days().iter().enumerate() {
    if day.date < today {
      continue;
    }
    for fire_time in fire_times {
      planned.push(NewNotification {
        habit_id:  day.record.habit_id,
        fire_date: day.date.and_time(fire_time.time()).and_utc(),
        day_order: (idx + 1) as u32,
      });
    }
  }
  planned
}
