// ABOUTME: HTTP surface tests: health endpoints and generate request validation
// ABOUTME: Exercises the assembled router with tower::ServiceExt::oneshot
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ghiraas

#![allow(clippy::unwrap_used)]

mod common;

use std::sync::Arc;

use axum::body::Body;
use http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use common::seeded_gateway;
use ghiraas_agent_server::config::{DataConfig, LlmConfig, LlmProviderType, ServerConfig};
use ghiraas_agent_server::llm::{ChatProvider, OpenAiCompatibleConfig, OpenAiCompatibleProvider};
use ghiraas_agent_server::resources::ServerResources;
use ghiraas_agent_server::routes;
use ghiraas_agent_server::tools::ToolRegistry;

fn test_resources() -> Arc<ServerResources> {
    // An unreachable local endpoint: good enough for routing tests, which
    // never complete an LLM call.
    let provider = ChatProvider::Local(
        OpenAiCompatibleProvider::new(OpenAiCompatibleConfig::ollama("test-model")).unwrap(),
    );
    let config = ServerConfig {
        http_port: 0,
        llm: LlmConfig {
            provider: LlmProviderType::Local,
            model: None,
            intent_model: None,
        },
        data: DataConfig {
            exercise_data_path: None,
            user_seed_path: None,
        },
    };
    ServerResources::new(provider, ToolRegistry::with_builtin_tools(), seeded_gateway(), config)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_endpoint_reports_service_identity() {
    let app = routes::router(test_resources());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "ghiraas_agent_server");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn ready_endpoint_reports_provider_and_tools() {
    let app = routes::router(test_resources());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/ready")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    // The test endpoint is unreachable, so readiness degrades but still answers
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["provider"], "ollama");
    assert_eq!(body["tools"], 6);
}

#[tokio::test]
async fn generate_rejects_empty_user_message() {
    let app = routes::router(test_resources());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/agent/generate")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"user_message": "   "}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "MISSING_REQUIRED_FIELD");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("user_message"));
}

#[tokio::test]
async fn brand_recommendations_reject_short_product() {
    let app = routes::router(test_resources());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/recommendations/brands?product=x")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn brand_recommendations_require_product_param() {
    let app = routes::router(test_resources());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/recommendations/brands")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn generate_rejects_malformed_body() {
    let app = routes::router(test_resources());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/agent/generate")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}
