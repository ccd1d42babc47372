//! [`ReminderScheduler`] — keeps notification records and the OS primitive
//! in sync.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use streak_core::{
  challenge,
  habit::Habit,
  reminder::Notification,
  Error, Result,
};

use crate::center::{NotificationCenter, ReminderContent, ReminderRequest};

/// What happened to one schedule attempt.
///
/// There is no retry and no failed state on the record itself: anything but
/// `Scheduled` leaves the notification unscheduled indefinitely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleOutcome {
  /// Handed to the OS primitive; the record now carries its external id.
  Scheduled,
  /// The user declined permission. Intentionally silent — not an error.
  Unauthorized,
  /// The fire date was not strictly in the future; the OS primitive was
  /// never invoked.
  PastFireDate,
  /// The OS primitive (or the authorization query) returned an error; it was
  /// logged and swallowed.
  Failed,
}

pub struct ReminderScheduler<C> {
  center: C,
}

impl<C: NotificationCenter> ReminderScheduler<C> {
  pub fn new(center: C) -> Self { Self { center } }

  pub fn center(&self) -> &C { &self.center }

  /// Build the user-visible content for one reminder.
  ///
  /// Errors if the habit has no name to show — the one precondition content
  /// generation cannot recover from.
  pub fn make_options(
    &self,
    habit: &Habit,
    notification: &Notification,
  ) -> Result<ReminderContent> {
    if habit.name.trim().is_empty() {
      return Err(Error::UnnamedHabit(habit.habit_id));
    }
    Ok(ReminderContent {
      title:    habit.name.clone(),
      subtitle: "Did you practice this activity today?".into(),
      body:     challenge::notification_text(notification.day_order as usize),
    })
  }

  /// Try to hand one reminder to the OS primitive.
  ///
  /// On success the record is mutated in place: a fresh external id is
  /// assigned and `was_scheduled` flips. On any other outcome the record's
  /// scheduled flag is left untouched.
  pub async fn schedule(
    &self,
    notification: &mut Notification,
    content: ReminderContent,
    now: DateTime<Utc>,
  ) -> ScheduleOutcome {
    if notification.fire_date <= now {
      debug!(
        notification = %notification.notification_id,
        fire_date = %notification.fire_date,
        "skipping reminder with elapsed fire date",
      );
      return ScheduleOutcome::PastFireDate;
    }

    match self.center.is_authorized().await {
      Ok(true) => {}
      Ok(false) => {
        debug!(
          notification = %notification.notification_id,
          "notifications not authorized, skipping",
        );
        return ScheduleOutcome::Unauthorized;
      }
      Err(e) => {
        warn!(error = %e, "authorization query failed");
        return ScheduleOutcome::Failed;
      }
    }

    let external_id = Uuid::new_v4();
    notification.user_notification_id = Some(external_id);

    let request = ReminderRequest {
      id:        external_id,
      content,
      fire_date: notification.fire_date,
    };

    match self.center.add(request).await {
      Ok(()) => {
        notification.was_scheduled = true;
        ScheduleOutcome::Scheduled
      }
      Err(e) => {
        warn!(
          notification = %notification.notification_id,
          error = %e,
          "failed to schedule reminder",
        );
        ScheduleOutcome::Failed
      }
    }
  }

  /// Schedule a batch sequentially — no batching against the primitive, no
  /// rollback of partial failures.
  pub async fn schedule_all(
    &self,
    habit: &Habit,
    notifications: &mut [Notification],
    now: DateTime<Utc>,
  ) -> Result<Vec<ScheduleOutcome>> {
    let mut outcomes = Vec::with_capacity(notifications.len());
    for notification in notifications.iter_mut() {
      let content = self.make_options(habit, notification)?;
      outcomes.push(self.schedule(notification, content, now).await);
    }
    Ok(outcomes)
  }

  /// Cancel the OS-level reminders behind the given records. Records that
  /// never got an external id, and ids the primitive no longer knows, are
  /// silently ignored.
  pub async fn unschedule(&self, notifications: &[Notification]) {
    let ids: Vec<Uuid> = notifications
      .iter()
      .filter_map(|n| n.user_notification_id)
      .collect();
    if ids.is_empty() {
      return;
    }
    if let Err(e) = self.center.remove_pending(&ids).await {
      warn!(error = %e, "failed to cancel pending reminders");
    }
  }
}
