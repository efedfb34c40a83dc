// ABOUTME: Intent classification: one cheap LLM call mapping a message to a coarse category
// ABOUTME: Unknown labels are rejected, never silently routed
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ghiraas

//! # Intent Classifier
//!
//! Maps a user message to [`Intent::Exercise`], [`Intent::Nutrition`], or
//! [`Intent::Other`] with a temperature-0 completion against the (cheaper)
//! classification model. The classifier prompt demands a one-word reply; any
//! label outside the contract is an `InvalidInput` rejection asking the user
//! to clarify, not a guess.

use tracing::{debug, instrument, warn};

use crate::errors::{AppError, AppResult};
use crate::llm::{prompts, ChatMessage, ChatRequest, LlmProvider};
use crate::models::Intent;

/// Classify a user message
///
/// `model` overrides the provider default, letting operators point
/// classification at a cheaper model than generation.
///
/// # Errors
///
/// Returns `InvalidInput` when the classifier emits a label outside the
/// contract, or propagates the provider error.
#[instrument(skip(provider, user_message), fields(model = model.unwrap_or("default")))]
pub async fn classify_intent(
    provider: &dyn LlmProvider,
    model: Option<&str>,
    user_message: &str,
) -> AppResult<Intent> {
    let messages = vec![
        ChatMessage::system(prompts::INTENT_CLASSIFIER_PROMPT),
        ChatMessage::user(user_message),
    ];

    let mut request = ChatRequest::new(messages).with_temperature(0.0);
    if let Some(model) = model {
        request = request.with_model(model);
    }

    let response = provider.complete(&request).await?;
    let label = response.content.trim().to_lowercase();
    debug!(label, "Intent classifier replied");

    Intent::from_label(&label).ok_or_else(|| {
        warn!(label, "Classifier produced an unknown label");
        AppError::invalid_input(
            "Could not understand what your request is about, please clarify whether you are asking about exercise or nutrition.",
        )
        .with_details(serde_json::json!({"label": label}))
    })
}
