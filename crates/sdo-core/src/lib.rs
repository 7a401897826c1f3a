//! Core types and decision logic for State of DevOps alarm capture.
//!
//! This crate is deliberately free of AWS and database dependencies. The
//! external services the handler talks to are expressed as the traits in
//! [`store`]; the Lambda and CLI crates supply concrete backends.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod alarm;
pub mod app_name;
pub mod dashboard;
pub mod error;
pub mod handler;
pub mod history;
pub mod memory;
pub mod resolver;
pub mod store;

pub use error::{Error, Result};
pub use handler::{Outcome, StateChangeHandler};
pub use resolver::{Decision, IgnoreReason, PreviousState};
