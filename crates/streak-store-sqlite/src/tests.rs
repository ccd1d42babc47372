//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{NaiveDate, Utc};
use streak_core::{
  habit::{HabitColor, NewHabit},
  reminder::{NewFireTime, NewNotification},
  store::HabitStore,
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn d(s: &str) -> NaiveDate {
  s.parse().expect("test date")
}

fn reading_habit() -> NewHabit {
  NewHabit {
    name:  "Read 20 pages".into(),
    color: HabitColor::Blue,
  }
}

// ─── Habits ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_habit() {
  let s = store().await;

  let habit = s.add_habit(reading_habit()).await.unwrap();
  assert_eq!(habit.color, HabitColor::Blue);

  let fetched = s.get_habit(habit.habit_id).await.unwrap().unwrap();
  assert_eq!(fetched.habit_id, habit.habit_id);
  assert_eq!(fetched.name, "Read 20 pages");
}

#[tokio::test]
async fn get_habit_missing_returns_none() {
  let s = store().await;
  assert!(s.get_habit(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_habit_missing_errors() {
  let s = store().await;
  let err = s.delete_habit(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, crate::Error::HabitNotFound(_)));
}

// ─── Calendar day registry ───────────────────────────────────────────────────

#[tokio::test]
async fn registry_dedups_calendar_days() {
  let s = store().await;

  let first = s.day_for(d("2024-01-01")).await.unwrap();
  let second = s.day_for(d("2024-01-01")).await.unwrap();
  assert_eq!(first.day_id, second.day_id);

  let other = s.day_for(d("2024-01-02")).await.unwrap();
  assert_ne!(first.day_id, other.day_id);
}

#[tokio::test]
async fn registry_is_shared_across_habits() {
  let s = store().await;
  let a = s.add_habit(reading_habit()).await.unwrap();
  let b = s
    .add_habit(NewHabit { name: "Meditate".into(), color: HabitColor::Teal })
    .await
    .unwrap();

  let dates = [d("2024-01-10")];
  let view_a = s.add_challenge(a.habit_id, &dates).await.unwrap();
  let view_b = s.add_challenge(b.habit_id, &dates).await.unwrap();

  assert_eq!(
    view_a.days()[0].record.day_id,
    view_b.days()[0].record.day_id
  );
}

// ─── Challenges ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_challenge_computes_bounds_and_sorts_days() {
  let s = store().await;
  let habit = s.add_habit(reading_habit()).await.unwrap();

  // Selection order is not date order.
  let dates = [d("2024-01-12"), d("2024-01-10"), d("2024-01-11")];
  let view = s.add_challenge(habit.habit_id, &dates).await.unwrap();

  assert_eq!(view.challenge.from_date, d("2024-01-10"));
  assert_eq!(view.challenge.to_date, d("2024-01-12"));
  assert!(!view.challenge.is_closed);

  let day_dates: Vec<_> = view.days().iter().map(|day| day.date).collect();
  assert_eq!(day_dates, vec![d("2024-01-10"), d("2024-01-11"), d("2024-01-12")]);
}

#[tokio::test]
async fn add_challenge_rejects_empty_selection() {
  let s = store().await;
  let habit = s.add_habit(reading_habit()).await.unwrap();

  let err = s.add_challenge(habit.habit_id, &[]).await.unwrap_err();
  assert!(matches!(err, crate::Error::EmptyDaySelection));
}

#[tokio::test]
async fn add_challenge_for_unknown_habit_errors() {
  let s = store().await;
  let err = s
    .add_challenge(Uuid::new_v4(), &[d("2024-01-10")])
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::HabitNotFound(_)));
}

#[tokio::test]
async fn get_challenge_round_trips_the_view() {
  let s = store().await;
  let habit = s.add_habit(reading_habit()).await.unwrap();
  let dates = [d("2024-01-10"), d("2024-01-11")];
  let created = s.add_challenge(habit.habit_id, &dates).await.unwrap();

  let fetched = s
    .get_challenge(created.challenge.challenge_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(fetched.days().len(), 2);
  assert_eq!(fetched.challenge.from_date, d("2024-01-10"));
}

#[tokio::test]
async fn current_challenge_requires_today_in_open_range() {
  let s = store().await;
  let habit = s.add_habit(reading_habit()).await.unwrap();
  let dates = [d("2024-01-10"), d("2024-01-11"), d("2024-01-12")];
  s.add_challenge(habit.habit_id, &dates).await.unwrap();

  assert!(s.current_challenge(habit.habit_id, d("2024-01-11")).await.unwrap().is_some());
  assert!(s.current_challenge(habit.habit_id, d("2024-01-13")).await.unwrap().is_none());
  assert!(s.current_challenge(habit.habit_id, d("2024-01-09")).await.unwrap().is_none());
}

#[tokio::test]
async fn current_challenge_skips_closed_challenges() {
  let s = store().await;
  let habit = s.add_habit(reading_habit()).await.unwrap();
  let view = s
    .add_challenge(habit.habit_id, &[d("2024-01-10"), d("2024-01-11")])
    .await
    .unwrap();

  s.set_challenge_closed(view.challenge.challenge_id).await.unwrap();
  assert!(s.current_challenge(habit.habit_id, d("2024-01-10")).await.unwrap().is_none());
}

#[tokio::test]
async fn set_day_executed_persists() {
  let s = store().await;
  let habit = s.add_habit(reading_habit()).await.unwrap();
  let view = s
    .add_challenge(habit.habit_id, &[d("2024-01-10")])
    .await
    .unwrap();

  let day_id = view.days()[0].record.habit_day_id;
  s.set_day_executed(day_id, true, Utc::now()).await.unwrap();

  let fetched = s
    .get_challenge(view.challenge.challenge_id)
    .await
    .unwrap()
    .unwrap();
  assert!(fetched.days()[0].record.was_executed);
}

#[tokio::test]
async fn apply_closure_truncates_and_prunes() {
  let s = store().await;
  let habit = s.add_habit(reading_habit()).await.unwrap();
  let today = d("2024-01-12");
  let mut view = s
    .add_challenge(
      habit.habit_id,
      &[d("2024-01-10"), d("2024-01-11"), today, d("2024-01-13")],
    )
    .await
    .unwrap();

  let removed_day_id = view
    .day_for(today)
    .expect("member day")
    .record
    .day_id;
  let kept_day_id = view
    .day_for(d("2024-01-10"))
    .expect("member day")
    .record
    .day_id;

  let closure = view.close(today);
  s.apply_closure(&closure).await.unwrap();

  let fetched = s
    .get_challenge(view.challenge.challenge_id)
    .await
    .unwrap()
    .unwrap();
  assert!(fetched.challenge.is_closed);
  assert_eq!(fetched.challenge.to_date, d("2024-01-11"));
  assert_eq!(fetched.days().len(), 2);

  // The removed days' calendar dates are no longer referenced by anyone and
  // must be pruned; re-registering creates a fresh identity. Dates still in
  // use keep theirs.
  assert_ne!(s.day_for(today).await.unwrap().day_id, removed_day_id);
  assert_eq!(s.day_for(d("2024-01-10")).await.unwrap().day_id, kept_day_id);
}

#[tokio::test]
async fn add_day_attaches_to_existing_challenge() {
  let s = store().await;
  let habit = s.add_habit(reading_habit()).await.unwrap();
  let view = s
    .add_challenge(habit.habit_id, &[d("2024-01-10"), d("2024-01-12")])
    .await
    .unwrap();

  let added = s
    .add_day(view.challenge.challenge_id, d("2024-01-11"))
    .await
    .unwrap();
  assert_eq!(added.date, d("2024-01-11"));
  assert!(!added.record.was_executed);

  let fetched = s
    .get_challenge(view.challenge.challenge_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(fetched.days().len(), 3);
  assert_eq!(fetched.order_of(added.record.habit_day_id), Some(2));
}

// ─── Fire times ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_fire_time_errors() {
  let s = store().await;
  let habit = s.add_habit(reading_habit()).await.unwrap();

  let input = NewFireTime::new(8, 30).unwrap();
  s.add_fire_time(habit.habit_id, input).await.unwrap();

  let err = s.add_fire_time(habit.habit_id, input).await.unwrap_err();
  assert!(matches!(
    err,
    crate::Error::FireTimeTaken { hour: 8, minute: 30, .. }
  ));
}

#[tokio::test]
async fn same_fire_time_on_two_habits_is_fine() {
  let s = store().await;
  let a = s.add_habit(reading_habit()).await.unwrap();
  let b = s
    .add_habit(NewHabit { name: "Meditate".into(), color: HabitColor::Teal })
    .await
    .unwrap();

  let input = NewFireTime::new(7, 0).unwrap();
  s.add_fire_time(a.habit_id, input).await.unwrap();
  s.add_fire_time(b.habit_id, input).await.unwrap();

  assert_eq!(s.list_fire_times(a.habit_id).await.unwrap().len(), 1);
  assert_eq!(s.list_fire_times(b.habit_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn fire_times_list_in_firing_order() {
  let s = store().await;
  let habit = s.add_habit(reading_habit()).await.unwrap();

  s.add_fire_time(habit.habit_id, NewFireTime::new(21, 30).unwrap()).await.unwrap();
  s.add_fire_time(habit.habit_id, NewFireTime::new(7, 0).unwrap()).await.unwrap();
  s.add_fire_time(habit.habit_id, NewFireTime::new(7, 30).unwrap()).await.unwrap();

  let times: Vec<_> = s
    .list_fire_times(habit.habit_id)
    .await
    .unwrap()
    .into_iter()
    .map(|ft| (ft.hour, ft.minute))
    .collect();
  assert_eq!(times, vec![(7, 0), (7, 30), (21, 30)]);
}

// ─── Notifications ───────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_mark_notifications() {
  let s = store().await;
  let habit = s.add_habit(reading_habit()).await.unwrap();

  let inputs = vec![
    NewNotification {
      habit_id:  habit.habit_id,
      fire_date: "2024-01-10T08:30:00Z".parse().unwrap(),
      day_order: 1,
    },
    NewNotification {
      habit_id:  habit.habit_id,
      fire_date: "2024-01-11T08:30:00Z".parse().unwrap(),
      day_order: 2,
    },
  ];
  let notifications = s.add_notifications(&inputs).await.unwrap();
  assert_eq!(notifications.len(), 2);
  assert!(notifications.iter().all(|n| !n.was_scheduled));

  let external = Uuid::new_v4();
  s.mark_notification_scheduled(notifications[0].notification_id, external)
    .await
    .unwrap();

  let listed = s.list_notifications(habit.habit_id).await.unwrap();
  assert!(listed[0].was_scheduled);
  assert_eq!(listed[0].user_notification_id, Some(external));
  assert!(!listed[1].was_scheduled);
}

#[tokio::test]
async fn delete_notifications_ignores_unknown_ids() {
  let s = store().await;
  let habit = s.add_habit(reading_habit()).await.unwrap();

  let notifications = s
    .add_notifications(&[NewNotification {
      habit_id:  habit.habit_id,
      fire_date: "2024-01-10T08:30:00Z".parse().unwrap(),
      day_order: 1,
    }])
    .await
    .unwrap();

  s.delete_notifications(&[notifications[0].notification_id, Uuid::new_v4()])
    .await
    .unwrap();
  assert!(s.list_notifications(habit.habit_id).await.unwrap().is_empty());
}

// ─── Cascade delete ──────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_habit_cascades_and_prunes_orphan_days() {
  let s = store().await;
  let doomed = s.add_habit(reading_habit()).await.unwrap();
  let survivor = s
    .add_habit(NewHabit { name: "Meditate".into(), color: HabitColor::Teal })
    .await
    .unwrap();

  let shared = d("2024-01-10");
  let doomed_view = s
    .add_challenge(doomed.habit_id, &[shared, d("2024-01-11")])
    .await
    .unwrap();
  s.add_challenge(survivor.habit_id, &[shared]).await.unwrap();

  s.add_fire_time(doomed.habit_id, NewFireTime::new(8, 0).unwrap()).await.unwrap();
  s.add_notifications(&[NewNotification {
    habit_id:  doomed.habit_id,
    fire_date: "2024-01-10T08:00:00Z".parse().unwrap(),
    day_order: 1,
  }])
  .await
  .unwrap();

  s.delete_habit(doomed.habit_id).await.unwrap();

  assert!(s.get_habit(doomed.habit_id).await.unwrap().is_none());
  assert!(
    s.get_challenge(doomed_view.challenge.challenge_id)
      .await
      .unwrap()
      .is_none()
  );
  assert!(s.list_fire_times(doomed.habit_id).await.unwrap().is_empty());
  assert!(s.list_notifications(doomed.habit_id).await.unwrap().is_empty());

  // The shared date is still referenced by the survivor and must keep its
  // identity; the doomed habit's other date is pruned.
  let kept = s.day_for(shared).await.unwrap();
  assert_eq!(kept.day_id, doomed_view.days()[0].record.day_id);
  let pruned = s.day_for(d("2024-01-11")).await.unwrap();
  assert_ne!(pruned.day_id, doomed_view.days()[1].record.day_id);
}

// ─── Habit-wide day listing ──────────────────────────────────────────────────

#[tokio::test]
async fn list_days_spans_challenges() {
  let s = store().await;
  let habit = s.add_habit(reading_habit()).await.unwrap();

  let first = s
    .add_challenge(habit.habit_id, &[d("2024-01-10"), d("2024-01-11")])
    .await
    .unwrap();
  s.add_challenge(habit.habit_id, &[d("2024-02-01")]).await.unwrap();

  let days = s.list_days(habit.habit_id).await.unwrap();
  assert_eq!(days.len(), 3);
  assert_eq!(days[0].date, d("2024-01-10"));
  assert_eq!(days[2].date, d("2024-02-01"));
  assert_eq!(days[0].record.challenge_id, first.challenge.challenge_id);
}
