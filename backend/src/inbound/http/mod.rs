//! HTTP inbound adapter exposing REST endpoints.
//!
//! Handlers stay thin: they resolve the session [`Actor`](crate::domain::Actor),
//! parse path and body input, call one driving port, and shape the response.

pub mod alerts;
pub mod care_graph;
pub mod error;
pub mod falls;
pub mod health;
pub mod medical_history;
pub mod schemas;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;
