//! Core types and trait definitions for the Roster student directory.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends and external collaborators plug in through the traits in
//! [`store`] and [`collaborator`]; [`directory::StudentDirectory`] ties them
//! together.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod collaborator;
pub mod directory;
pub mod error;
pub mod store;
pub mod student;

pub use directory::StudentDirectory;
pub use error::{Error, Result};
