//! In-process persistence adapters.
//!
//! Thin implementations of the user and fall event repository ports. They
//! hold no business logic: revision checks and email uniqueness are the only
//! rules enforced here, matching what a database-backed adapter would enforce
//! through constraints.

mod in_memory_fall_event_repository;
mod in_memory_user_repository;

pub use in_memory_fall_event_repository::InMemoryFallEventRepository;
pub use in_memory_user_repository::InMemoryUserRepository;
