// ABOUTME: Nutrition domain handler: tool loop, loose JSON parse, rounding, rebalancing
// ABOUTME: The forgiving path; a parse failure degrades to a fixed apology envelope
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ghiraas

//! # Nutrition Handler
//!
//! The forgiving counterpart to the exercise handler. The reformat pass asks
//! for the wire format verbatim (no schema constraint), the reply goes
//! through fence stripping and a JSON parse, and a failed parse returns a
//! fixed apology envelope instead of an error — a bad meal plan response is
//! not worth a 5xx.
//!
//! Successful parses are repaired rather than rejected: every calorie/macro
//! field is rounded to a whole number, and when the data parses as a full
//! [`MealPlan`] the calorie sums are rebalanced so each meal's total equals
//! its ingredient sum and each day's total equals its meal sum.

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::errors::AppResult;
use crate::llm::{prompts, ChatMessage, ChatRequest, LlmProvider};
use crate::models::{round_nutrition_numbers, MealPlan};
use crate::tools::{ToolContext, ToolRegistry};

use super::extract::extract_json;
use super::normalize::HandlerOutcome;
use super::tool_loop::run_tool_loop;

/// Fixed envelope text returned when the reformat reply cannot be parsed
pub const NUTRITION_FALLBACK_TEXT: &str =
    "Sorry, there was an error processing the nutrition response. Please try again.";

/// Handle a nutrition-intent request
///
/// # Errors
///
/// Returns provider errors or a loop-termination error. Parse failures are
/// not errors; they produce the fallback envelope.
#[instrument(skip_all, fields(user_id = context.user_id.as_deref().unwrap_or("-")))]
pub async fn handle_nutrition_request(
    provider: &dyn LlmProvider,
    registry: &ToolRegistry,
    context: &ToolContext,
    user_message: &str,
    model: Option<&str>,
) -> AppResult<HandlerOutcome> {
    let mut messages = vec![
        ChatMessage::system(prompts::nutrition_system_prompt(context.user_id.as_deref())),
        ChatMessage::user(user_message),
    ];

    let loop_result = run_tool_loop(provider, registry, context, &mut messages, model).await?;
    debug!(
        transcript_len = loop_result.content.len(),
        "Tool loop finished, reformatting"
    );

    let today = Utc::now().format("%Y-%m-%d").to_string();
    let reformat = prompts::nutrition_reformat_prompt(&loop_result.content, &today);

    let mut request = ChatRequest::new(vec![ChatMessage::user(reformat)]);
    if let Some(model) = model {
        request = request.with_model(model);
    }
    let response = provider.complete(&request).await?;

    match extract_json(&response.content) {
        Ok(mut envelope) => {
            repair_envelope(&mut envelope);
            Ok(HandlerOutcome::Raw(envelope))
        }
        Err(error) => {
            warn!(%error, "Nutrition reformat reply was not valid JSON, returning fallback");
            Ok(HandlerOutcome::Raw(serde_json::json!({
                "text": NUTRITION_FALLBACK_TEXT,
                "data": null
            })))
        }
    }
}

/// Round calorie/macro numbers and rebalance sums when the plan is complete
fn repair_envelope(envelope: &mut Value) {
    round_nutrition_numbers(envelope);

    let Some(data) = envelope.get_mut("data") else {
        return;
    };
    if data.is_null() {
        return;
    }

    // A full meal plan gets its totals recomputed; partial or free-form data
    // keeps the rounded values as-is.
    if let Ok(mut plan) = serde_json::from_value::<MealPlan>(data.clone()) {
        plan.rebalance();
        if let Ok(rebalanced) = serde_json::to_value(&plan) {
            *data = rebalanced;
        }
    }
}
