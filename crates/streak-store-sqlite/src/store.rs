//! [`SqliteStore`] — the SQLite implementation of [`HabitStore`].

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use streak_core::{
  challenge::{ChallengeView, Closure, DaysChallenge},
  day::{CalendarDay, HabitDay, ResolvedDay},
  habit::{Habit, NewHabit},
  reminder::{FireTime, NewFireTime, NewNotification, Notification},
  store::HabitStore,
};

use crate::{
  encode::{
    encode_color, encode_date, encode_dt, encode_uuid, RawCalendarDay,
    RawChallenge, RawDay, RawFireTime, RawHabit, RawNotification,
  },
  schema::SCHEMA,
  Error, Result,
};

const DAY_COLUMNS: &str = "hd.habit_day_id, hd.habit_id, hd.challenge_id, \
                           hd.day_id, hd.was_executed, hd.updated_at, cd.date";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A streak habit store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Error with `HabitNotFound` unless a habit row exists.
  async fn check_habit_exists(&self, habit_id: Uuid) -> Result<()> {
    let id_str = encode_uuid(habit_id);
    let exists: bool = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM habits WHERE habit_id = ?1",
              rusqlite::params![id_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;

    if exists {
      Ok(())
    } else {
      Err(Error::HabitNotFound(habit_id))
    }
  }

  /// Fetch a challenge row without its days.
  async fn challenge_record(
    &self,
    challenge_id: Uuid,
  ) -> Result<Option<DaysChallenge>> {
    let id_str = encode_uuid(challenge_id);
    let raw: Option<RawChallenge> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT challenge_id, habit_id, created_at, from_date, to_date, is_closed
               FROM challenges WHERE challenge_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawChallenge {
                  challenge_id: row.get(0)?,
                  habit_id:     row.get(1)?,
                  created_at:   row.get(2)?,
                  from_date:    row.get(3)?,
                  to_date:      row.get(4)?,
                  is_closed:    row.get(5)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawChallenge::into_challenge).transpose()
  }

  /// All day records of one challenge, joined with their dates.
  async fn challenge_days(&self, challenge_id: Uuid) -> Result<Vec<ResolvedDay>> {
    let id_str = encode_uuid(challenge_id);
    let raws: Vec<RawDay> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {DAY_COLUMNS}
           FROM habit_days hd
           JOIN calendar_days cd ON cd.day_id = hd.day_id
           WHERE hd.challenge_id = ?1"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], read_day_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDay::into_resolved).collect()
  }

  /// Insert one habit day for an existing calendar day.
  async fn insert_habit_day(
    &self,
    habit_id: Uuid,
    challenge_id: Uuid,
    day: &CalendarDay,
    at: DateTime<Utc>,
  ) -> Result<ResolvedDay> {
    let record_id = Uuid::new_v4();

    let record_id_str    = encode_uuid(record_id);
    let habit_id_str     = encode_uuid(habit_id);
    let challenge_id_str = encode_uuid(challenge_id);
    let day_id_str       = encode_uuid(day.day_id);
    let at_str           = encode_dt(at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO habit_days
             (habit_day_id, habit_id, challenge_id, day_id, was_executed, updated_at)
           VALUES (?1, ?2, ?3, ?4, 0, ?5)",
          rusqlite::params![
            record_id_str,
            habit_id_str,
            challenge_id_str,
            day_id_str,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(ResolvedDay {
      record: HabitDay {
        habit_day_id: record_id,
        habit_id,
        challenge_id,
        day_id: day.day_id,
        was_executed: false,
        updated_at: at,
      },
      date: day.date,
    })
  }

  /// Drop calendar days that no habit day references any more.
  async fn prune_orphan_days(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute(
          "DELETE FROM calendar_days
           WHERE day_id NOT IN (SELECT DISTINCT day_id FROM habit_days)",
          [],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

fn read_day_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawDay> {
  Ok(RawDay {
    habit_day_id: row.get(0)?,
    habit_id:     row.get(1)?,
    challenge_id: row.get(2)?,
    day_id:       row.get(3)?,
    was_executed: row.get(4)?,
    updated_at:   row.get(5)?,
    date:         row.get(6)?,
  })
}

// ─── HabitStore impl ─────────────────────────────────────────────────────────

impl HabitStore for SqliteStore {
  type Error = Error;

  // ── Habits ────────────────────────────────────────────────────────────────

  async fn add_habit(&self, input: NewHabit) -> Result<Habit> {
    let habit = Habit {
      habit_id:   Uuid::new_v4(),
      name:       input.name,
      color:      input.color,
      created_at: Utc::now(),
    };

    let id_str    = encode_uuid(habit.habit_id);
    let name      = habit.name.clone();
    let color_str = encode_color(habit.color).to_owned();
    let at_str    = encode_dt(habit.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO habits (habit_id, name, color, created_at) VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, name, color_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(habit)
  }

  async fn get_habit(&self, id: Uuid) -> Result<Option<Habit>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawHabit> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT habit_id, name, color, created_at FROM habits WHERE habit_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawHabit {
                  habit_id:   row.get(0)?,
                  name:       row.get(1)?,
                  color:      row.get(2)?,
                  created_at: row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawHabit::into_habit).transpose()
  }

  async fn list_habits(&self) -> Result<Vec<Habit>> {
    let raws: Vec<RawHabit> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT habit_id, name, color, created_at FROM habits ORDER BY created_at",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawHabit {
              habit_id:   row.get(0)?,
              name:       row.get(1)?,
              color:      row.get(2)?,
              created_at: row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawHabit::into_habit).collect()
  }

  async fn delete_habit(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);
    let deleted: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM habits WHERE habit_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if deleted == 0 {
      return Err(Error::HabitNotFound(id));
    }

    // Cascades removed the habit's day records; shared dates may be orphaned.
    self.prune_orphan_days().await
  }

  // ── Calendar day registry ─────────────────────────────────────────────────

  async fn day_for(&self, date: NaiveDate) -> Result<CalendarDay> {
    let candidate_id = encode_uuid(Uuid::new_v4());
    let date_str = encode_date(date);

    let raw: RawCalendarDay = self
      .conn
      .call(move |conn| {
        // The UNIQUE(date) constraint turns the find-or-create race into
        // first-writer-wins: everyone reads back the same row.
        conn.execute(
          "INSERT OR IGNORE INTO calendar_days (day_id, date) VALUES (?1, ?2)",
          rusqlite::params![candidate_id, date_str],
        )?;
        Ok(conn.query_row(
          "SELECT day_id, date FROM calendar_days WHERE date = ?1",
          rusqlite::params![date_str],
          |row| {
            Ok(RawCalendarDay {
              day_id: row.get(0)?,
              date:   row.get(1)?,
            })
          },
        )?)
      })
      .await?;

    raw.into_day()
  }

  // ── Challenges ────────────────────────────────────────────────────────────

  async fn add_challenge(
    &self,
    habit_id: Uuid,
    dates: &[NaiveDate],
  ) -> Result<ChallengeView> {
    if dates.is_empty() {
      return Err(Error::EmptyDaySelection);
    }
    self.check_habit_exists(habit_id).await?;

    let challenge = DaysChallenge {
      challenge_id: Uuid::new_v4(),
      habit_id,
      created_at: Utc::now(),
      from_date: dates.iter().copied().min().unwrap_or(dates[0]),
      to_date: dates.iter().copied().max().unwrap_or(dates[0]),
      is_closed: false,
    };

    let challenge_id_str = encode_uuid(challenge.challenge_id);
    let habit_id_str     = encode_uuid(habit_id);
    let created_at_str   = encode_dt(challenge.created_at);
    let from_str         = encode_date(challenge.from_date);
    let to_str           = encode_date(challenge.to_date);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO challenges
             (challenge_id, habit_id, created_at, from_date, to_date, is_closed)
           VALUES (?1, ?2, ?3, ?4, ?5, 0)",
          rusqlite::params![
            challenge_id_str,
            habit_id_str,
            created_at_str,
            from_str,
            to_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    // One day record per selected date, reusing shared calendar days.
    let mut days = Vec::with_capacity(dates.len());
    for &date in dates {
      let day = self.day_for(date).await?;
      days.push(
        self
          .insert_habit_day(habit_id, challenge.challenge_id, &day, challenge.created_at)
          .await?,
      );
    }

    Ok(ChallengeView::new(challenge, days))
  }

  async fn get_challenge(&self, id: Uuid) -> Result<Option<ChallengeView>> {
    let challenge = match self.challenge_record(id).await? {
      Some(c) => c,
      None => return Ok(None),
    };

    let days = self.challenge_days(id).await?;
    Ok(Some(ChallengeView::new(challenge, days)))
  }

  async fn list_challenges(&self, habit_id: Uuid) -> Result<Vec<DaysChallenge>> {
    let id_str = encode_uuid(habit_id);
    let raws: Vec<RawChallenge> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT challenge_id, habit_id, created_at, from_date, to_date, is_closed
           FROM challenges WHERE habit_id = ?1 ORDER BY created_at",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawChallenge {
              challenge_id: row.get(0)?,
              habit_id:     row.get(1)?,
              created_at:   row.get(2)?,
              from_date:    row.get(3)?,
              to_date:      row.get(4)?,
              is_closed:    row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawChallenge::into_challenge).collect()
  }

  async fn current_challenge(
    &self,
    habit_id: Uuid,
    today: NaiveDate,
  ) -> Result<Option<ChallengeView>> {
    let id_str = encode_uuid(habit_id);
    let today_str = encode_date(today);

    let raw: Option<RawChallenge> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT challenge_id, habit_id, created_at, from_date, to_date, is_closed
               FROM challenges
               WHERE habit_id = ?1
                 AND is_closed = 0
                 AND from_date <= ?2
                 AND to_date   >= ?2
               ORDER BY created_at DESC
               LIMIT 1",
              rusqlite::params![id_str, today_str],
              |row| {
                Ok(RawChallenge {
                  challenge_id: row.get(0)?,
                  habit_id:     row.get(1)?,
                  created_at:   row.get(2)?,
                  from_date:    row.get(3)?,
                  to_date:      row.get(4)?,
                  is_closed:    row.get(5)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    let challenge = match raw.map(RawChallenge::into_challenge).transpose()? {
      Some(c) => c,
      None => return Ok(None),
    };

    let days = self.challenge_days(challenge.challenge_id).await?;
    Ok(Some(ChallengeView::new(challenge, days)))
  }

  async fn add_day(&self, challenge_id: Uuid, date: NaiveDate) -> Result<ResolvedDay> {
    let challenge = self
      .challenge_record(challenge_id)
      .await?
      .ok_or(Error::ChallengeNotFound(challenge_id))?;

    let day = self.day_for(date).await?;
    self
      .insert_habit_day(challenge.habit_id, challenge_id, &day, Utc::now())
      .await
  }

  async fn set_day_executed(
    &self,
    habit_day_id: Uuid,
    executed: bool,
    at: DateTime<Utc>,
  ) -> Result<()> {
    let id_str = encode_uuid(habit_day_id);
    let at_str = encode_dt(at);

    let updated: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE habit_days SET was_executed = ?2, updated_at = ?3 WHERE habit_day_id = ?1",
          rusqlite::params![id_str, executed, at_str],
        )?)
      })
      .await?;

    if updated == 0 {
      return Err(Error::DayNotFound(habit_day_id));
    }
    Ok(())
  }

  async fn set_challenge_closed(&self, challenge_id: Uuid) -> Result<()> {
    let id_str = encode_uuid(challenge_id);

    let updated: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE challenges SET is_closed = 1 WHERE challenge_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if updated == 0 {
      return Err(Error::ChallengeNotFound(challenge_id));
    }
    Ok(())
  }

  async fn apply_closure(&self, closure: &Closure) -> Result<()> {
    let challenge_id = closure.challenge_id;
    let id_str = encode_uuid(challenge_id);
    let to_str = encode_date(closure.to_date);
    let removed: Vec<String> =
      closure.removed_day_ids.iter().copied().map(encode_uuid).collect();

    let updated: usize = self
      .conn
      .call(move |conn| {
        let updated = conn.execute(
          "UPDATE challenges SET is_closed = 1, to_date = ?2 WHERE challenge_id = ?1",
          rusqlite::params![id_str, to_str],
        )?;
        if updated == 0 {
          return Ok(0);
        }

        if !removed.is_empty() {
          let placeholders =
            removed.iter().map(|_| "?").collect::<Vec<_>>().join(", ");
          conn.execute(
            &format!("DELETE FROM habit_days WHERE habit_day_id IN ({placeholders})"),
            rusqlite::params_from_iter(removed.iter()),
          )?;
        }
        Ok(updated)
      })
      .await?;

    if updated == 0 {
      return Err(Error::ChallengeNotFound(challenge_id));
    }

    self.prune_orphan_days().await
  }

  async fn list_days(&self, habit_id: Uuid) -> Result<Vec<ResolvedDay>> {
    let id_str = encode_uuid(habit_id);
    let raws: Vec<RawDay> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {DAY_COLUMNS}
           FROM habit_days hd
           JOIN calendar_days cd ON cd.day_id = hd.day_id
           WHERE hd.habit_id = ?1
           ORDER BY cd.date"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], read_day_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDay::into_resolved).collect()
  }

  // ── Fire times ────────────────────────────────────────────────────────────

  async fn add_fire_time(
    &self,
    habit_id: Uuid,
    input: NewFireTime,
  ) -> Result<FireTime> {
    self.check_habit_exists(habit_id).await?;

    let fire_time = FireTime {
      fire_time_id: Uuid::new_v4(),
      habit_id,
      hour: input.hour(),
      minute: input.minute(),
      created_at: Utc::now(),
    };

    let id_str       = encode_uuid(fire_time.fire_time_id);
    let habit_id_str = encode_uuid(habit_id);
    let hour         = fire_time.hour;
    let minute       = fire_time.minute;
    let at_str       = encode_dt(fire_time.created_at);

    let inserted: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT OR IGNORE INTO fire_times
             (fire_time_id, habit_id, hour, minute, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, habit_id_str, hour, minute, at_str],
        )?)
      })
      .await?;

    if inserted == 0 {
      return Err(Error::FireTimeTaken { habit_id, hour, minute });
    }
    Ok(fire_time)
  }

  async fn list_fire_times(&self, habit_id: Uuid) -> Result<Vec<FireTime>> {
    let id_str = encode_uuid(habit_id);
    let raws: Vec<RawFireTime> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT fire_time_id, habit_id, hour, minute, created_at
           FROM fire_times WHERE habit_id = ?1 ORDER BY hour, minute",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawFireTime {
              fire_time_id: row.get(0)?,
              habit_id:     row.get(1)?,
              hour:         row.get(2)?,
              minute:       row.get(3)?,
              created_at:   row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFireTime::into_fire_time).collect()
  }

  // ── Notifications ─────────────────────────────────────────────────────────

  async fn add_notifications(
    &self,
    inputs: &[NewNotification],
  ) -> Result<Vec<Notification>> {
    let notifications: Vec<Notification> = inputs
      .iter()
      .map(|input| Notification {
        notification_id:      Uuid::new_v4(),
        habit_id:             input.habit_id,
        fire_date:            input.fire_date,
        day_order:            input.day_order,
        was_scheduled:        false,
        user_notification_id: None,
      })
      .collect();

    let rows: Vec<(String, String, String, u32)> = notifications
      .iter()
      .map(|n| {
        (
          encode_uuid(n.notification_id),
          encode_uuid(n.habit_id),
          encode_dt(n.fire_date),
          n.day_order,
        )
      })
      .collect();

    self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "INSERT INTO notifications
             (notification_id, habit_id, fire_date, day_order, was_scheduled)
           VALUES (?1, ?2, ?3, ?4, 0)",
        )?;
        for (id, habit_id, fire_date, day_order) in &rows {
          stmt.execute(rusqlite::params![id, habit_id, fire_date, day_order])?;
        }
        Ok(())
      })
      .await?;

    Ok(notifications)
  }

  async fn list_notifications(&self, habit_id: Uuid) -> Result<Vec<Notification>> {
    let id_str = encode_uuid(habit_id);
    let raws: Vec<RawNotification> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT notification_id, habit_id, fire_date, day_order,
                  was_scheduled, user_notification_id
           FROM notifications WHERE habit_id = ?1 ORDER BY fire_date",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawNotification {
              notification_id:      row.get(0)?,
              habit_id:             row.get(1)?,
              fire_date:            row.get(2)?,
              day_order:            row.get(3)?,
              was_scheduled:        row.get(4)?,
              user_notification_id: row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawNotification::into_notification)
      .collect()
  }

  async fn mark_notification_scheduled(
    &self,
    id: Uuid,
    user_notification_id: Uuid,
  ) -> Result<()> {
    let id_str = encode_uuid(id);
    let user_id_str = encode_uuid(user_notification_id);

    let updated: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE notifications
           SET was_scheduled = 1, user_notification_id = ?2
           WHERE notification_id = ?1",
          rusqlite::params![id_str, user_id_str],
        )?)
      })
      .await?;

    if updated == 0 {
      return Err(Error::NotificationNotFound(id));
    }
    Ok(())
  }

  async fn delete_notifications(&self, ids: &[Uuid]) -> Result<()> {
    if ids.is_empty() {
      return Ok(());
    }
    let id_strs: Vec<String> = ids.iter().copied().map(encode_uuid).collect();

    self
      .conn
      .call(move |conn| {
        let placeholders =
          id_strs.iter().map(|_| "?").collect::<Vec<_>>().join(", ");
        conn.execute(
          &format!("DELETE FROM notifications WHERE notification_id IN ({placeholders})"),
          rusqlite::params_from_iter(id_strs.iter()),
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
