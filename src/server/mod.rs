//! HTTP daemon support.
//!
//! This module provides:
//! - Configuration types (`config`)
//! - The axum router over a [`KapowService`] (`routes`)
//! - Construction of a service from configuration ([`build_service`])

pub mod config;
pub mod routes;

use std::sync::Arc;

use crate::Result;
use crate::gateway::{Kapow, KapowService, TokenAuthorizer};
use config::{Config, Secrets};

pub use routes::{AppState, create_router};

/// Build a [`KapowService`] from configuration.
///
/// Feedback is accepted only from callers presenting one of
/// `[auth] editor_tokens`.
pub fn build_service(config: &Config, secrets: &Secrets) -> Result<KapowService> {
    Kapow::builder()
        .settings(config.settings(secrets))
        .base_url(&config.api.base_url)
        .timeout(config.timeout())
        .image_source(config.image_source())
        .cache(config.cache_config())
        .authorizer(Arc::new(TokenAuthorizer::new(
            config.auth.editor_tokens.iter().cloned(),
        )))
        .build()
}

/// Router state for `service`, with admin tokens from `config`.
pub fn app_state(service: Arc<KapowService>, config: &Config) -> AppState {
    AppState {
        service,
        admins: Arc::new(TokenAuthorizer::new(
            config.auth.admin_tokens.iter().cloned(),
        )),
    }
}
