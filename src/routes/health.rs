// ABOUTME: Health check route handlers for service monitoring and status endpoints
// ABOUTME: Provides health and readiness endpoints for monitoring infrastructure
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ghiraas

//! Health check routes for service monitoring
//!
//! `/health` is liveness (always ok if the process answers); `/ready`
//! additionally reports whether the configured LLM provider responds.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::resources::ServerResources;

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create all health check routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/ready", get(ready_handler))
            .with_state(resources)
    }
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn ready_handler(State(resources): State<Arc<ServerResources>>) -> Json<serde_json::Value> {
    let provider = resources.provider.inner();
    let provider_healthy = provider.health_check().await.unwrap_or(false);

    Json(serde_json::json!({
        "status": if provider_healthy { "ready" } else { "degraded" },
        "provider": provider.name(),
        "provider_healthy": provider_healthy,
        "tools": resources.registry.len(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}
