//! Chirpy: a small social-post service.
//!
//! The interesting part is [`auth`]: bcrypt password hashing, HS256 access
//! tokens, store-backed refresh tokens, and the [`auth::SessionManager`]
//! that ties them together. Everything else is HTTP plumbing around it.

pub mod auth;
pub mod configuration;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod startup;
pub mod state;
pub mod store;
pub mod telemetry;
pub mod validators;
