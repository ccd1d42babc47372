//! Core types and trait definitions for the streak habit tracker.
//!
//! This crate is deliberately free of database and runtime dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod challenge;
pub mod day;
pub mod error;
pub mod habit;
pub mod reminder;
pub mod store;

pub use error::{Error, Result};
