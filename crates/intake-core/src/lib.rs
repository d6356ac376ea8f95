//! Core types and trait definitions for the client intake service.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! server, the storage backends, and the CLI all depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod files;
pub mod notify;
pub mod payload;
pub mod store;
pub mod submission;
pub mod validate;

pub use error::{Error, Result};
