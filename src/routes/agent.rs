// ABOUTME: Agent generation route: POST /api/agent/generate
// ABOUTME: Thin handler that validates input and delegates to the agent pipeline
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ghiraas

//! Agent generation routes
//!
//! A single endpoint takes a user message (and optional user id), runs the
//! classify → handle → normalize pipeline, and returns the `{text, data}`
//! envelope. Errors come back as the standard error body with a proper
//! status code.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::agents;
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::models::AgentResponse;
use crate::resources::ServerResources;

/// Request body for `POST /api/agent/generate`
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    /// The user's message
    pub user_message: String,
    /// Optional user id for personalized answers
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Agent routes implementation
pub struct AgentRoutes;

impl AgentRoutes {
    /// Create the agent route tree
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/agent/generate", post(generate_handler))
            .with_state(resources)
    }
}

/// Handle a generate request end to end
async fn generate_handler(
    State(resources): State<Arc<ServerResources>>,
    Json(request): Json<GenerateRequest>,
) -> AppResult<Json<AgentResponse>> {
    if request.user_message.trim().is_empty() {
        return Err(AppError::new(
            ErrorCode::MissingRequiredField,
            "user_message must not be empty",
        ));
    }

    let request_id = Uuid::new_v4().to_string();
    info!(
        request_id,
        user_id = request.user_id.as_deref().unwrap_or("-"),
        message_len = request.user_message.len(),
        "Agent generate request"
    );

    let response = agents::respond(
        resources.provider.inner(),
        &resources.registry,
        &resources.gateway,
        &resources.config.llm,
        &request.user_message,
        request.user_id,
        &request_id,
    )
    .await
    .map_err(|e| e.with_request_id(request_id))?;

    Ok(Json(response))
}
