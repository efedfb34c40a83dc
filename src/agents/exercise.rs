// ABOUTME: Exercise domain handler: tool loop plus schema-validated workout plan output
// ABOUTME: The strict path; schema violations are surfaced to the caller, not repaired
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ghiraas

//! # Exercise Handler
//!
//! The strictest of the three domain handlers. The tool loop gathers real
//! exercises from the catalog (the coach prompt forbids invented exercise
//! names), then a reformat pass turns the transcript into
//! `{text, data: WorkoutPlan | null}`.
//!
//! On providers with native structured output the reformat pass is
//! schema-constrained; otherwise the reply goes through fence stripping and
//! a JSON parse. Either way the plan is deserialized into [`WorkoutPlan`]
//! and validated: a malformed plan is an `InvalidFormat` error for the
//! caller, never a silently degraded response.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::errors::{AppError, AppResult};
use crate::llm::{prompts, ChatMessage, ChatRequest, LlmProvider};
use crate::models::{workout_response_schema, AgentResponse, WorkoutPlan};
use crate::tools::{ToolContext, ToolRegistry};

use super::extract::extract_json;
use super::normalize::HandlerOutcome;
use super::tool_loop::run_tool_loop;

/// Reformat-pass envelope before validation
#[derive(Debug, Deserialize)]
struct ExerciseEnvelope {
    text: String,
    #[serde(default)]
    data: Option<WorkoutPlan>,
}

/// Handle an exercise-intent request
///
/// # Errors
///
/// Returns provider errors, a loop-termination error, or `InvalidFormat`
/// when the reformatted plan violates the workout schema.
#[instrument(skip_all, fields(user_id = context.user_id.as_deref().unwrap_or("-")))]
pub async fn handle_exercise_request(
    provider: &dyn LlmProvider,
    registry: &ToolRegistry,
    context: &ToolContext,
    user_message: &str,
    model: Option<&str>,
) -> AppResult<HandlerOutcome> {
    let mut messages = vec![
        ChatMessage::system(prompts::exercise_system_prompt(context.user_id.as_deref())),
        ChatMessage::user(user_message),
    ];

    let loop_result = run_tool_loop(provider, registry, context, &mut messages, model).await?;
    debug!(
        transcript_len = loop_result.content.len(),
        "Tool loop finished, reformatting"
    );

    let reformat = prompts::exercise_reformat_prompt(&loop_result.content);
    let envelope_value = reformat_to_json(provider, &reformat, model).await?;
    let envelope: ExerciseEnvelope = serde_json::from_value(envelope_value)
        .map_err(|e| AppError::invalid_format(format!("Workout response violates schema: {e}")))?;

    let data = match envelope.data {
        Some(plan) => {
            plan.validate()?;
            match serde_json::to_value(&plan)? {
                Value::Object(map) => Some(map),
                _ => None,
            }
        }
        None => None,
    };

    Ok(HandlerOutcome::Typed(AgentResponse {
        text: envelope.text,
        data,
    }))
}

/// Run the reformat pass, preferring native structured output
async fn reformat_to_json(
    provider: &dyn LlmProvider,
    reformat_prompt: &str,
    model: Option<&str>,
) -> AppResult<Value> {
    let mut request = ChatRequest::new(vec![ChatMessage::user(reformat_prompt)]);
    if let Some(model) = model {
        request = request.with_model(model);
    }

    if provider.capabilities().supports_structured_output() {
        provider
            .complete_structured(&request, &workout_response_schema())
            .await
    } else {
        let response = provider.complete(&request).await?;
        extract_json(&response.content)
            .map_err(|e| AppError::invalid_format(format!("Workout response was not JSON: {e}")))
    }
}
