//! Error type for `streak-app`.

use thiserror::Error;

/// An error returned by a [`crate::HabitService`] operation.
#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] streak_core::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub(crate) fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
