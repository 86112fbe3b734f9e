//! Domain layer: AI gateway, audio extraction pipeline and the user service.
//!
//! Entity types are re-exported from `entity_api` so that consumers of `domain` never
//! need to depend on the entity crates directly.
pub use entity_api::{users, Id};

pub mod ai;
pub mod audio;
pub mod error;
pub mod gateway;
pub mod user;
