// ABOUTME: General domain handler: tool loop plus a text-only answer, data forced to null
// ABOUTME: Handles fitness-adjacent questions that fit neither coaching schema
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ghiraas

//! # General Handler
//!
//! For questions that are fitness- or nutrition-adjacent but produce no
//! structured plan. The envelope's `data` is always null here, whatever the
//! model returns.

use tracing::{debug, instrument};

use crate::errors::AppResult;
use crate::llm::{prompts, ChatMessage, ChatRequest, LlmProvider};
use crate::models::general_response_schema;
use crate::tools::{ToolContext, ToolRegistry};

use super::extract::extract_json;
use super::normalize::HandlerOutcome;
use super::tool_loop::run_tool_loop;

/// Handle a general-intent request
///
/// # Errors
///
/// Returns provider errors or a loop-termination error.
#[instrument(skip_all, fields(user_id = context.user_id.as_deref().unwrap_or("-")))]
pub async fn handle_general_request(
    provider: &dyn LlmProvider,
    registry: &ToolRegistry,
    context: &ToolContext,
    user_message: &str,
    model: Option<&str>,
) -> AppResult<HandlerOutcome> {
    let mut messages = vec![
        ChatMessage::system(prompts::general_system_prompt(context.user_id.as_deref())),
        ChatMessage::user(user_message),
    ];

    let loop_result = run_tool_loop(provider, registry, context, &mut messages, model).await?;
    debug!(
        transcript_len = loop_result.content.len(),
        "Tool loop finished, reformatting"
    );

    let reformat = prompts::general_reformat_prompt(&loop_result.content);
    let mut request = ChatRequest::new(vec![ChatMessage::user(reformat)]);
    if let Some(model) = model {
        request = request.with_model(model);
    }

    let text = if provider.capabilities().supports_structured_output() {
        let envelope = provider
            .complete_structured(&request, &general_response_schema())
            .await?;
        envelope
            .get("text")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_owned()
    } else {
        let response = provider.complete(&request).await?;
        // A general answer needs no structure; if the model skipped the JSON
        // envelope, its raw text is the answer
        match extract_json(&response.content) {
            Ok(envelope) => envelope
                .get("text")
                .and_then(serde_json::Value::as_str)
                .map_or_else(|| response.content.clone(), ToOwned::to_owned),
            Err(_) => response.content,
        }
    };

    Ok(HandlerOutcome::Null { text })
}
