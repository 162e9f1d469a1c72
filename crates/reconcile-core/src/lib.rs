//! Core types and trait definitions for the Reconcile identity service.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! The store backend and the HTTP surface both depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod contact;
pub mod error;
pub mod identity;
pub mod store;

pub use error::{Error, Result};
