//! Service facade over the engine and cache.

pub mod auth;
mod builder;
pub mod query;
mod service;

pub use auth::{AllowAll, Caller, PostAuthorizer, TokenAuthorizer};
pub use builder::{Kapow, KapowBuilder};
pub use service::KapowService;
