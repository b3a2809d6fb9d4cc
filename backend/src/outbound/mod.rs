//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: in-process user and fall event repositories
//! - **notification**: reqwest-backed email relay and a logging fallback
//! - **documents**: cap-std sandboxed document storage
//! - **credentials**: salted SHA-256 credential hashing
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations. They contain no business logic.

pub mod credentials;
pub mod documents;
pub mod notification;
pub mod persistence;
