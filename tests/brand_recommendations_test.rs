// ABOUTME: Brand recommendation tests driven by a scripted fake provider
// ABOUTME: Covers parse-path and structured-path replies, filtering, and failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ghiraas

#![allow(clippy::unwrap_used)]

mod common;

use serde_json::json;

use common::{FakeProvider, ScriptedReply};
use ghiraas_agent_server::agents;
use ghiraas_agent_server::config::{LlmConfig, LlmProviderType};
use ghiraas_agent_server::errors::ErrorCode;

fn test_llm_config() -> LlmConfig {
    LlmConfig {
        provider: LlmProviderType::Gemini,
        model: None,
        intent_model: None,
    }
}

fn brands_payload() -> serde_json::Value {
    json!({
        "brands": [
            {
                "name": "Al Ain Farms",
                "price": 25.5,
                "sustainability_rating": "Excellent",
                "description": "Local dairy with sustainable farming practices."
            },
            {
                "name": "Kibsons",
                "price": 35.75,
                "sustainability_rating": "Excellent",
                "description": "Organic produce delivery with zero-waste packaging."
            }
        ]
    })
}

#[tokio::test]
async fn fenced_brand_reply_is_parsed() {
    let payload = brands_payload();
    let provider = FakeProvider::new(vec![ScriptedReply::text(format!("```json\n{payload}\n```"))]);

    let recommendations = agents::recommend_brands(&provider, &test_llm_config(), "greek yogurt")
        .await
        .unwrap();

    assert_eq!(recommendations.brands.len(), 2);
    assert_eq!(recommendations.brands[0].name, "Al Ain Farms");
    assert!((recommendations.brands[0].price - 25.5).abs() < f64::EPSILON);
    assert_eq!(recommendations.brands[1].sustainability_rating, "Excellent");
}

#[tokio::test]
async fn structured_output_used_when_available() {
    let provider = FakeProvider::full_featured(vec![ScriptedReply::Structured(brands_payload())]);

    let recommendations = agents::recommend_brands(&provider, &test_llm_config(), "quinoa")
        .await
        .unwrap();

    assert_eq!(recommendations.brands.len(), 2);
    let kinds: Vec<&str> = provider
        .recorded_calls()
        .iter()
        .map(|call| call.kind)
        .collect();
    assert_eq!(kinds, ["complete_structured"]);
}

#[tokio::test]
async fn malformed_entries_are_skipped() {
    let payload = json!({
        "brands": [
            {"name": "No Price Brand", "sustainability_rating": "Good"},
            {
                "name": "Bayara",
                "price": 30.0,
                "sustainability_rating": "Good",
                "description": "Nuts and dried fruits with eco-friendly packaging."
            }
        ]
    });
    let provider = FakeProvider::new(vec![ScriptedReply::text(payload.to_string())]);

    let recommendations = agents::recommend_brands(&provider, &test_llm_config(), "almonds")
        .await
        .unwrap();

    assert_eq!(recommendations.brands.len(), 1);
    assert_eq!(recommendations.brands[0].name, "Bayara");
}

#[tokio::test]
async fn no_valid_brands_is_a_404() {
    let provider = FakeProvider::new(vec![ScriptedReply::text(r#"{"brands": []}"#)]);

    let error = agents::recommend_brands(&provider, &test_llm_config(), "protein powder")
        .await
        .unwrap_err();

    assert_eq!(error.code, ErrorCode::ResourceNotFound);
    assert_eq!(error.http_status(), 404);
}

#[tokio::test]
async fn non_json_reply_is_an_invalid_format_error() {
    let provider = FakeProvider::new(vec![ScriptedReply::text("I don't know any brands.")]);

    let error = agents::recommend_brands(&provider, &test_llm_config(), "green tea")
        .await
        .unwrap_err();

    assert_eq!(error.code, ErrorCode::InvalidFormat);
}
