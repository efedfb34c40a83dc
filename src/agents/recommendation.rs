// ABOUTME: Brand recommendations: one LLM call mapped to a typed brand list
// ABOUTME: Standalone path, no intent classification or tool loop involved
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ghiraas

//! # Brand Recommendations
//!
//! Turns a product name into a list of UAE-available, sustainability-rated
//! brands. A single completion call, schema-constrained on providers with
//! native structured output, fence-stripped and parsed otherwise.
//!
//! Individual malformed brand entries are skipped rather than failing the
//! whole request; an empty result after filtering is `ResourceNotFound`.

use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::config::LlmConfig;
use crate::errors::{AppError, AppResult};
use crate::llm::{prompts, ChatMessage, ChatRequest, LlmProvider};
use crate::models::{brand_response_schema, Brand, RecommendedBrands};

use super::extract::extract_json;

/// Recommend brands for a product
///
/// # Errors
///
/// Returns provider errors, `InvalidFormat` when the model reply is not the
/// expected JSON shape, or `ResourceNotFound` when no valid brand entries
/// survive filtering.
#[instrument(skip(provider, llm))]
pub async fn recommend_brands(
    provider: &dyn LlmProvider,
    llm: &LlmConfig,
    product: &str,
) -> AppResult<RecommendedBrands> {
    let prompt = prompts::brand_recommendation_prompt(product);
    let mut request = ChatRequest::new(vec![ChatMessage::user(prompt)]);
    if let Some(model) = llm.model.as_deref() {
        request = request.with_model(model);
    }

    let payload = if provider.capabilities().supports_structured_output() {
        provider
            .complete_structured(&request, &brand_response_schema())
            .await?
    } else {
        let response = provider.complete(&request).await?;
        extract_json(&response.content).map_err(|e| {
            AppError::invalid_format(format!("Brand recommendations were not JSON: {e}"))
        })?
    };

    let brands = parse_brands(&payload);
    debug!(count = brands.len(), "Parsed brand recommendations");

    if brands.is_empty() {
        return Err(AppError::not_found(format!(
            "brand recommendations for '{product}'"
        )));
    }
    Ok(RecommendedBrands { brands })
}

/// Collect the well-formed entries of a `{brands: [...]}` payload
fn parse_brands(payload: &Value) -> Vec<Brand> {
    let Some(entries) = payload.get("brands").and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut brands = Vec::with_capacity(entries.len());
    for entry in entries {
        match serde_json::from_value::<Brand>(entry.clone()) {
            Ok(brand) => brands.push(brand),
            Err(error) => warn!(%error, "Skipping malformed brand entry"),
        }
    }
    brands
}
