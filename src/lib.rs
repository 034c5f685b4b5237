//! School portal server.
//!
//! Dashboards live under a protected namespace. An edge gate routes each
//! request from the role in the authoritative cookie, and a client-readable
//! session mirror drives what the dashboard displays. Every API operation
//! re-verifies the signed token before touching data.

pub mod auth;
pub mod config;
pub mod db;
pub mod gate;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod routes;
pub mod services;
pub mod session;

use std::sync::Arc;

use axum::{Router, middleware::from_fn, middleware::from_fn_with_state};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::{
    auth::TokenService,
    config::{ConfigError, PortalConfig},
    db::Repos,
    gate::Gate,
    services::Services,
    session::SessionObservers,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<PortalConfig>,
    pub services: Services,
    pub tokens: Arc<TokenService>,
    pub gate: Arc<Gate>,
    /// Listeners for session mirror changes made while handling requests.
    pub observers: SessionObservers,
}

impl AppState {
    /// Build state over the in-memory repositories.
    pub fn new(config: PortalConfig) -> Result<Self, ConfigError> {
        Self::with_repos(config, Repos::memory())
    }

    pub fn with_repos(config: PortalConfig, db: Repos) -> Result<Self, ConfigError> {
        let gate = Gate::from_config(&config.gate)?;
        let tokens = TokenService::from_config(&config.auth);
        let services = Services::new(db, &config);
        Ok(Self {
            config: Arc::new(config),
            services,
            tokens: Arc::new(tokens),
            gate: Arc::new(gate),
            observers: SessionObservers::new(),
        })
    }
}

pub fn build_app(config: &PortalConfig, state: AppState) -> Router {
    let mut app = Router::new()
        .merge(routes::health_routes())
        .merge(routes::page_routes())
        .nest("/api", routes::api_routes());

    // Innermost first: gate redirects still get request ids and security headers.
    app = app
        .layer(from_fn_with_state(state.clone(), middleware::gate_middleware))
        .layer(from_fn(middleware::request_id_middleware))
        .layer(tower_cookies::CookieManagerLayer::new())
        .layer(from_fn_with_state(
            state.clone(),
            middleware::security_headers_middleware,
        ));

    if let Some(cors_layer) = config.server.cors.clone().into_layer() {
        app = app.layer(cors_layer);
    }

    app.layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(config.server.body_limit_bytes))
        .with_state(state)
}


#[cfg(test)]
mod tests;
