// ABOUTME: HTTP route organization and top-level router assembly
// ABOUTME: Merges agent and health routes and applies shared middleware layers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ghiraas

//! # HTTP Routes
//!
//! Route handlers stay thin: deserialize, validate, delegate to the agent
//! pipeline or resources, serialize. Shared concerns (tracing, CORS, request
//! timeout, body limits) are tower layers applied once here.

pub mod agent;
pub mod health;
pub mod recommendations;

pub use agent::AgentRoutes;
pub use health::HealthRoutes;
pub use recommendations::RecommendationRoutes;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::resources::ServerResources;

/// Agent responses can take minutes against a slow local model
const REQUEST_TIMEOUT: Duration = Duration::from_secs(330);

/// Maximum request body size in bytes (1 MiB)
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Build the complete application router
#[must_use]
pub fn router(resources: Arc<ServerResources>) -> Router {
    Router::new()
        .merge(AgentRoutes::routes(resources.clone()))
        .merge(RecommendationRoutes::routes(resources.clone()))
        .merge(HealthRoutes::routes(resources))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
}
