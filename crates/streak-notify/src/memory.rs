//! [`MemoryCenter`] — an in-process [`NotificationCenter`].
//!
//! Stands in for the platform primitive in tests and headless builds. State
//! is a plain mutex; no method holds the lock across an await point.

use std::sync::{Arc, Mutex};

use thiserror::Error;
use uuid::Uuid;

use crate::center::{NotificationCenter, ReminderRequest};

#[derive(Debug, Error)]
pub enum MemoryCenterError {
  /// The center was configured to reject adds, mimicking a platform that
  /// returns an error from its add primitive.
  #[error("reminder center rejected the request")]
  Rejected,
}

#[derive(Default)]
struct Inner {
  authorized:  bool,
  reject_adds: bool,
  pending:     Vec<ReminderRequest>,
}

/// Cloning is cheap — clones share the same pending set.
#[derive(Clone, Default)]
pub struct MemoryCenter {
  inner: Arc<Mutex<Inner>>,
}

impl MemoryCenter {
  /// A center whose user has granted permission.
  pub fn authorized() -> Self {
    let center = Self::default();
    center.lock().authorized = true;
    center
  }

  /// A center whose user declined permission.
  pub fn denied() -> Self { Self::default() }

  /// An authorized center whose add primitive always fails.
  pub fn rejecting() -> Self {
    let center = Self::authorized();
    center.lock().reject_adds = true;
    center
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
    self.inner.lock().expect("reminder center lock poisoned")
  }
}

impl NotificationCenter for MemoryCenter {
  type Error = MemoryCenterError;

  async fn request_authorization(&self) -> Result<bool, MemoryCenterError> {
    Ok(self.lock().authorized)
  }

  async fn is_authorized(&self) -> Result<bool, MemoryCenterError> {
    Ok(self.lock().authorized)
  }

  async fn add(&self, request: ReminderRequest) -> Result<(), MemoryCenterError> {
    let mut inner = self.lock();
    if inner.reject_adds {
      return Err(MemoryCenterError::Rejected);
    }
    inner.pending.push(request);
    Ok(())
  }

  async fn pending(&self) -> Result<Vec<ReminderRequest>, MemoryCenterError> {
    Ok(self.lock().pending.clone())
  }

  async fn remove_pending(&self, ids: &[Uuid]) -> Result<(), MemoryCenterError> {
    self.lock().pending.retain(|r| !ids.contains(&r.id));
    Ok(())
  }
}
