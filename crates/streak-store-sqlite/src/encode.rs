//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, calendar dates as ISO 8601
//! dates, UUIDs as hyphenated lowercase strings, and the habit color as the
//! lowercase variant name.

use chrono::{DateTime, NaiveDate, Utc};
use streak_core::{
  challenge::DaysChallenge,
  day::{CalendarDay, HabitDay, ResolvedDay},
  habit::{Habit, HabitColor},
  reminder::{FireTime, Notification},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(date: NaiveDate) -> String { date.to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  s.parse().map_err(|e: chrono::ParseError| Error::DateParse(e.to_string()))
}

// ─── HabitColor ──────────────────────────────────────────────────────────────

pub fn encode_color(c: HabitColor) -> &'static str {
  match c {
    HabitColor::Red => "red",
    HabitColor::Orange => "orange",
    HabitColor::Yellow => "yellow",
    HabitColor::Green => "green",
    HabitColor::Teal => "teal",
    HabitColor::Blue => "blue",
    HabitColor::Indigo => "indigo",
    HabitColor::Purple => "purple",
    HabitColor::Pink => "pink",
  }
}

pub fn decode_color(s: &str) -> Result<HabitColor> {
  match s {
    "red" => Ok(HabitColor::Red),
    "orange" => Ok(HabitColor::Orange),
    "yellow" => Ok(HabitColor::Yellow),
    "green" => Ok(HabitColor::Green),
    "teal" => Ok(HabitColor::Teal),
    "blue" => Ok(HabitColor::Blue),
    "indigo" => Ok(HabitColor::Indigo),
    "purple" => Ok(HabitColor::Purple),
    "pink" => Ok(HabitColor::Pink),
    other => Err(Error::Decode(format!("unknown habit color: {other:?}"))),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `habits` row.
pub struct RawHabit {
  pub habit_id:   String,
  pub name:       String,
  pub color:      String,
  pub created_at: String,
}

impl RawHabit {
  pub fn into_habit(self) -> Result<Habit> {
    Ok(Habit {
      habit_id:   decode_uuid(&self.habit_id)?,
      name:       self.name,
      color:      decode_color(&self.color)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `challenges` row.
pub struct RawChallenge {
  pub challenge_id: String,
  pub habit_id:     String,
  pub created_at:   String,
  pub from_date:    String,
  pub to_date:      String,
  pub is_closed:    bool,
}

impl RawChallenge {
  pub fn into_challenge(self) -> Result<DaysChallenge> {
    Ok(DaysChallenge {
      challenge_id: decode_uuid(&self.challenge_id)?,
      habit_id:     decode_uuid(&self.habit_id)?,
      created_at:   decode_dt(&self.created_at)?,
      from_date:    decode_date(&self.from_date)?,
      to_date:      decode_date(&self.to_date)?,
      is_closed:    self.is_closed,
    })
  }
}

/// Raw strings read from a `habit_days` row joined with `calendar_days`.
pub struct RawDay {
  pub habit_day_id: String,
  pub habit_id:     String,
  pub challenge_id: String,
  pub day_id:       String,
  pub was_executed: bool,
  pub updated_at:   String,
  pub date:         String,
}

impl RawDay {
  pub fn into_resolved(self) -> Result<ResolvedDay> {
    Ok(ResolvedDay {
      record: HabitDay {
        habit_day_id: decode_uuid(&self.habit_day_id)?,
        habit_id:     decode_uuid(&self.habit_id)?,
        challenge_id: decode_uuid(&self.challenge_id)?,
        day_id:       decode_uuid(&self.day_id)?,
        was_executed: self.was_executed,
        updated_at:   decode_dt(&self.updated_at)?,
      },
      date: decode_date(&self.date)?,
    })
  }
}

/// Raw strings read directly from a `calendar_days` row.
pub struct RawCalendarDay {
  pub day_id: String,
  pub date:   String,
}

impl RawCalendarDay {
  pub fn into_day(self) -> Result<CalendarDay> {
    Ok(CalendarDay {
      day_id: decode_uuid(&self.day_id)?,
      date:   decode_date(&self.date)?,
    })
  }
}

/// Raw strings read directly from a `fire_times` row.
pub struct RawFireTime {
  pub fire_time_id: String,
  pub habit_id:     String,
  pub hour:         u8,
  pub minute:       u8,
  pub created_at:   String,
}

impl RawFireTime {
  pub fn into_fire_time(self) -> Result<FireTime> {
    Ok(FireTime {
      fire_time_id: decode_uuid(&self.fire_time_id)?,
      habit_id:     decode_uuid(&self.habit_id)?,
      hour:         self.hour,
      minute:       self.minute,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `notifications` row.
pub struct RawNotification {
  pub notification_id:      String,
  pub habit_id:             String,
  pub fire_date:            String,
  pub day_order:            u32,
  pub was_scheduled:        bool,
  pub user_notification_id: Option<String>,
}

impl RawNotification {
  pub fn into_notification(self) -> Result<Notification> {
    Ok(Notification {
      notification_id:      decode_uuid(&self.notification_id)?,
      habit_id:             decode_uuid(&self.habit_id)?,
      fire_date:            decode_dt(&self.fire_date)?,
      day_order:            self.day_order,
      was_scheduled:        self.was_scheduled,
      user_notification_id: self
        .user_notification_id
        .as_deref()
        .map(decode_uuid)
        .transpose()?,
    })
  }
}
