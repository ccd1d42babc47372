//! The OS notification primitive, as a capability trait.
//!
//! Implementations wrap whatever the platform provides (user notification
//! center, D-Bus daemon, a test double). Components receive their center at
//! construction instead of reaching for a process-wide singleton.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// What a delivered reminder shows the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderContent {
  pub title:    String,
  pub subtitle: String,
  pub body:     String,
}

/// A reminder handed to the OS primitive, keyed by the external id stored on
/// the originating notification record.
#[derive(Debug, Clone)]
pub struct ReminderRequest {
  pub id:        Uuid,
  pub content:   ReminderContent,
  pub fire_date: DateTime<Utc>,
}

/// Abstraction over the platform's notification delivery mechanism.
///
/// All methods return `Send` futures so the trait can be used from
/// multi-threaded async runtimes.
pub trait NotificationCenter: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Ask the user for permission to deliver reminders.
  fn request_authorization(
    &self,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Whether the user has granted permission. Denial is a valid state, not
  /// an error.
  fn is_authorized(
    &self,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Register a reminder for future delivery.
  fn add(
    &self,
    request: ReminderRequest,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// All reminders registered but not yet delivered.
  fn pending(
    &self,
  ) -> impl Future<Output = Result<Vec<ReminderRequest>, Self::Error>> + Send + '_;

  /// Cancel the pending reminders with the given ids. Unknown ids are
  /// silently ignored.
  fn remove_pending<'a>(
    &'a self,
    ids: &'a [Uuid],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
