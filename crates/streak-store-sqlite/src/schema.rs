//! SQL schema for the streak SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! the `PRAGMA user_version` number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS habits (
    habit_id   TEXT PRIMARY KEY,
    name       TEXT NOT NULL,
    color      TEXT NOT NULL,   -- lowercase HabitColor variant
    created_at TEXT NOT NULL    -- ISO 8601 UTC
);

-- One row per distinct calendar date, shared across habits. The UNIQUE
-- constraint is what makes find-or-create safe without a single-writer
-- assumption.
CREATE TABLE IF NOT EXISTS calendar_days (
    day_id TEXT PRIMARY KEY,
    date   TEXT NOT NULL,       -- ISO 8601 date, day granularity
    UNIQUE (date)
);

CREATE TABLE IF NOT EXISTS challenges (
    challenge_id TEXT PRIMARY KEY,
    habit_id     TEXT NOT NULL REFERENCES habits(habit_id) ON DELETE CASCADE,
    created_at   TEXT NOT NULL,
    from_date    TEXT NOT NULL,  -- inclusive lower bound
    to_date      TEXT NOT NULL,  -- inclusive upper bound
    is_closed    INTEGER NOT NULL DEFAULT 0
);

-- A habit has at most one day record per calendar date.
CREATE TABLE IF NOT EXISTS habit_days (
    habit_day_id TEXT PRIMARY KEY,
    habit_id     TEXT NOT NULL REFERENCES habits(habit_id) ON DELETE CASCADE,
    challenge_id TEXT NOT NULL REFERENCES challenges(challenge_id) ON DELETE CASCADE,
    day_id       TEXT NOT NULL REFERENCES calendar_days(day_id),
    was_executed INTEGER NOT NULL DEFAULT 0,
    updated_at   TEXT NOT NULL,
    UNIQUE (habit_id, day_id)
);

CREATE TABLE IF NOT EXISTS fire_times (
    fire_time_id TEXT PRIMARY KEY,
    habit_id     TEXT NOT NULL REFERENCES habits(habit_id) ON DELETE CASCADE,
    hour         INTEGER NOT NULL,
    minute       INTEGER NOT NULL,
    created_at   TEXT NOT NULL,
    UNIQUE (habit_id, hour, minute)
);

CREATE TABLE IF NOT EXISTS notifications (
    notification_id      TEXT PRIMARY KEY,
    habit_id             TEXT NOT NULL REFERENCES habits(habit_id) ON DELETE CASCADE,
    fire_date            TEXT NOT NULL,   -- ISO 8601 UTC
    day_order            INTEGER NOT NULL,
    was_scheduled        INTEGER NOT NULL DEFAULT 0,
    user_notification_id TEXT             -- external scheduling-system key
);

CREATE INDEX IF NOT EXISTS habit_days_habit_idx     ON habit_days(habit_id);
CREATE INDEX IF NOT EXISTS habit_days_challenge_idx ON habit_days(challenge_id);
CREATE INDEX IF NOT EXISTS challenges_habit_idx     ON challenges(habit_id);
CREATE INDEX IF NOT EXISTS notifications_habit_idx  ON notifications(habit_id);

PRAGMA user_version = 1;
";
