//! Hosted-backend adapters for the Roster student directory.
//!
//! - [`RemoteStore`] implements [`StudentStore`](roster_core::store::StudentStore)
//!   over a PostgREST-style table API (`/rest/v1/{table}`).
//! - [`HttpPurchaseVerifier`] asks the commerce platform's verification
//!   endpoint whether an email has purchased the course.
//! - [`FunctionNotifier`] invokes the hosted function that sends welcome
//!   emails (`/functions/v1/{name}`).
//!
//! All three share a [`RemoteClient`], which carries the credentials handed in
//! at construction.

mod client;
mod notifier;
mod store;
mod verifier;

pub mod error;

pub use client::{Credentials, RemoteClient, RemoteConfig};
pub use error::{Error, Result};
pub use notifier::FunctionNotifier;
pub use store::{DEFAULT_TABLE, RemoteStore};
pub use verifier::HttpPurchaseVerifier;
