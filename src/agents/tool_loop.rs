// ABOUTME: Multi-turn tool execution loop shared by all domain handlers
// ABOUTME: Bounded iterations; tool errors are fed back to the model, not fatal
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ghiraas

//! # Tool Loop
//!
//! Drives the conversation between the LLM and the tool registry: the model
//! is called with the tool declarations, requested calls are executed, and
//! results are appended to the message history until the model produces a
//! plain text answer.
//!
//! Tool failures (bad arguments, unknown user) become `{"error": ...}`
//! payloads fed back conversationally so the model can recover — for
//! example by answering without personal data. Only provider failures and
//! iteration exhaustion abort the loop.

use serde_json::json;
use tracing::{info, instrument, warn};

use crate::errors::{AppError, AppResult};
use crate::llm::{
    ChatMessage, ChatRequest, FunctionCall, FunctionResponse, LlmProvider, TokenUsage,
};
use crate::tools::{ToolContext, ToolRegistry};

/// Maximum number of LLM round-trips per request
pub const MAX_TOOL_ITERATIONS: usize = 10;

/// Final state of a completed tool loop
#[derive(Debug)]
pub struct ToolLoopResult {
    /// Final text produced by the model
    pub content: String,
    /// Token usage of the last completion
    pub usage: Option<TokenUsage>,
    /// Finish reason of the last completion
    pub finish_reason: Option<String>,
}

/// Run the multi-turn tool execution loop
///
/// `messages` is mutated in place; on return it holds the full transcript
/// including tool results.
///
/// # Errors
///
/// Returns an error if the provider call fails or the iteration limit is
/// reached without a text answer.
#[instrument(skip_all, fields(model = model.unwrap_or("default")))]
pub async fn run_tool_loop(
    provider: &dyn LlmProvider,
    registry: &ToolRegistry,
    context: &ToolContext,
    messages: &mut Vec<ChatMessage>,
    model: Option<&str>,
) -> AppResult<ToolLoopResult> {
    let tools = registry.as_llm_tools();

    for iteration in 0..MAX_TOOL_ITERATIONS {
        let mut request = ChatRequest::new(messages.clone());
        if let Some(model) = model {
            request = request.with_model(model);
        }

        let response = provider
            .complete_with_tools(&request, Some(tools.clone()))
            .await?;

        if let Some(ref function_calls) = response.function_calls {
            if !function_calls.is_empty() {
                info!(
                    iteration,
                    count = function_calls.len(),
                    "Executing tool calls"
                );

                let function_responses =
                    execute_function_calls(registry, context, function_calls).await;

                // Keep the assistant's interleaved text in the transcript
                if let Some(ref text) = response.content {
                    if !text.is_empty() {
                        messages.push(ChatMessage::assistant(text));
                    }
                }

                add_function_responses_to_messages(messages, &function_responses);
                continue;
            }
        }

        // No function calls, the model answered in text
        return Ok(ToolLoopResult {
            content: response.content.unwrap_or_default(),
            usage: response.usage,
            finish_reason: response.finish_reason,
        });
    }

    warn!("Tool loop exhausted {MAX_TOOL_ITERATIONS} iterations without a final answer");
    Err(AppError::internal(format!(
        "Tool loop did not converge within {MAX_TOOL_ITERATIONS} iterations"
    )))
}

/// Execute a batch of function calls, converting failures into error payloads
async fn execute_function_calls(
    registry: &ToolRegistry,
    context: &ToolContext,
    function_calls: &[FunctionCall],
) -> Vec<FunctionResponse> {
    let mut responses = Vec::with_capacity(function_calls.len());
    for function_call in function_calls {
        info!(tool = %function_call.name, "Executing tool");
        let payload = match registry
            .execute(&function_call.name, function_call.args.clone(), context)
            .await
        {
            Ok(value) => value,
            Err(error) => {
                warn!(tool = %function_call.name, %error, "Tool execution failed");
                json!({"error": error.message})
            }
        };
        responses.push(FunctionResponse {
            name: function_call.name.clone(),
            response: payload,
        });
    }
    responses
}

/// Add function responses as user messages for the next LLM iteration
fn add_function_responses_to_messages(
    messages: &mut Vec<ChatMessage>,
    function_responses: &[FunctionResponse],
) {
    for func_response in function_responses {
        let response_text =
            serde_json::to_string(&func_response.response).unwrap_or_else(|_| "{}".to_owned());
        messages.push(ChatMessage::user(format!(
            "[Tool Result for {}]: {}",
            func_response.name, response_text
        )));
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::llm::MessageRole;
    use serde_json::Value;

    #[test]
    fn test_function_responses_appended_as_user_messages() {
        let mut messages = vec![ChatMessage::user("plan my week")];
        let responses = vec![FunctionResponse {
            name: "list_available_facts".to_owned(),
            response: serde_json::json!({"targetMuscles": ["abs"]}),
        }];

        add_function_responses_to_messages(&mut messages, &responses);

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].role, MessageRole::User);
        assert!(messages[1].content.starts_with("[Tool Result for list_available_facts]:"));
        let payload: Value = serde_json::from_str(
            messages[1]
                .content
                .split_once(": ")
                .unwrap()
                .1,
        )
        .unwrap();
        assert_eq!(payload["targetMuscles"][0], "abs");
    }
}
