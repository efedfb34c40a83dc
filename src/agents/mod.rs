// ABOUTME: Agent pipeline: classify intent, dispatch a domain handler, normalize the result
// ABOUTME: The single entry point routes call for every generate request
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ghiraas

//! # Agent Pipeline
//!
//! One request flows through one sequential pipeline:
//!
//! ```text
//! classify → dispatch handler → tool loop → reformat → extract/validate
//!          → normalize → {text, data}
//! ```
//!
//! Handlers return a [`normalize::HandlerOutcome`]; [`normalize::normalize`]
//! is the only code that turns untrusted handler output into the
//! [`AgentResponse`] envelope. There are no automatic retries: the only
//! local recovery is the nutrition parse-failure fallback.

pub mod exercise;
pub mod extract;
pub mod general;
pub mod intent;
pub mod normalize;
pub mod nutrition;
pub mod recommendation;
pub mod tool_loop;

pub use intent::classify_intent;
pub use normalize::{normalize, HandlerOutcome};
pub use recommendation::recommend_brands;
pub use tool_loop::MAX_TOOL_ITERATIONS;

use tracing::{info, instrument};

use crate::config::LlmConfig;
use crate::errors::AppResult;
use crate::gateway::DataGateway;
use crate::llm::LlmProvider;
use crate::models::{AgentResponse, Intent};
use crate::tools::{ToolContext, ToolRegistry};

/// Run the full agent pipeline for one user message
///
/// # Errors
///
/// Returns classification rejections, provider errors, loop-termination
/// errors, or workout schema violations.
#[instrument(skip_all, fields(request_id = %request_id))]
pub async fn respond(
    provider: &dyn LlmProvider,
    registry: &ToolRegistry,
    gateway: &DataGateway,
    llm: &LlmConfig,
    user_message: &str,
    user_id: Option<String>,
    request_id: &str,
) -> AppResult<AgentResponse> {
    let intent = classify_intent(
        provider,
        llm.intent_model.as_deref(),
        user_message,
    )
    .await?;
    info!(intent = %intent, "Request classified");

    let context = ToolContext::new(gateway.clone(), user_id, request_id.to_owned());
    let model = llm.model.as_deref();

    let outcome = match intent {
        Intent::Exercise => {
            exercise::handle_exercise_request(provider, registry, &context, user_message, model)
                .await?
        }
        Intent::Nutrition => {
            nutrition::handle_nutrition_request(provider, registry, &context, user_message, model)
                .await?
        }
        Intent::Other => {
            general::handle_general_request(provider, registry, &context, user_message, model)
                .await?
        }
    };

    Ok(normalize(outcome))
}
