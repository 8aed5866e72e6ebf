//! Client-side state for the nest household app.
//!
//! [`NestStore`] holds the signed-in user's profile, household, members,
//! todos, calendar, budget and goals, and keeps them in step with the nest
//! REST API. Without a joined household it works purely in memory.

pub mod api;
pub mod config;
mod error;
pub mod logging;
pub mod repository;
pub mod store;

pub use config::ClientConfig;
pub use error::{StoreError, GENERIC_NETWORK_ERROR};
pub use store::{NestState, NestStore};
