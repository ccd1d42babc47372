//! Application layer for the streak habit tracker.
//!
//! [`HabitService`] orchestrates a [`streak_core::store::HabitStore`] backend
//! and a [`streak_notify::NotificationCenter`] behind one API: creating
//! habits with their challenges and reminders, marking days, closing
//! challenges, and keeping OS-level reminders in sync with what is
//! persisted. Both collaborators are injected at construction.

pub mod error;
pub mod service;

pub use error::{Error, Result};
pub use service::{HabitCreation, HabitService, HabitStats};
