// ABOUTME: End-to-end agent pipeline tests driven by a scripted fake provider
// ABOUTME: Covers classification, tool loops, reformat parsing, repair, and normalization
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ghiraas

#![allow(clippy::unwrap_used)]

mod common;

use serde_json::json;

use common::{
    builtin_registry, seeded_gateway, unbalanced_meal_plan, valid_workout_plan, FakeProvider,
    ScriptedReply,
};
use ghiraas_agent_server::agents::{self, MAX_TOOL_ITERATIONS};
use ghiraas_agent_server::config::{LlmConfig, LlmProviderType};
use ghiraas_agent_server::errors::ErrorCode;

fn test_llm_config() -> LlmConfig {
    LlmConfig {
        provider: LlmProviderType::Gemini,
        model: None,
        intent_model: None,
    }
}

async fn run_pipeline(
    provider: &FakeProvider,
    user_message: &str,
    user_id: Option<&str>,
) -> ghiraas_agent_server::errors::AppResult<ghiraas_agent_server::models::AgentResponse> {
    let registry = builtin_registry();
    let gateway = seeded_gateway();
    agents::respond(
        provider,
        &registry,
        &gateway,
        &test_llm_config(),
        user_message,
        user_id.map(ToOwned::to_owned),
        "test-request",
    )
    .await
}

#[tokio::test]
async fn unknown_intent_label_is_rejected_not_guessed() {
    let provider = FakeProvider::new(vec![ScriptedReply::text("banana")]);

    let error = run_pipeline(&provider, "what is the weather like", None)
        .await
        .unwrap_err();

    assert_eq!(error.code, ErrorCode::InvalidInput);
    assert_eq!(error.http_status(), 400);
    assert!(error.message.contains("clarify"));
}

#[tokio::test]
async fn exercise_request_returns_validated_plan() {
    let envelope = json!({
        "text": "Here is a 3-day plan focused on your chest.",
        "data": valid_workout_plan()
    });
    let provider = FakeProvider::new(vec![
        ScriptedReply::text("exercise"),
        ScriptedReply::call("get_exercise_by_target", json!({"target": "pectorals"})),
        ScriptedReply::text("I picked bench press from the catalog."),
        ScriptedReply::text(format!("```json\n{envelope}\n```")),
    ]);

    let response = run_pipeline(&provider, "build me a chest plan", Some("user-1"))
        .await
        .unwrap();

    assert_eq!(response.text, "Here is a 3-day plan focused on your chest.");
    let data = response.data.unwrap();
    assert_eq!(data["sessions_per_week"], 3);
    assert_eq!(
        data["workout_sessions"][0]["exercises"][0]["exercise_id"],
        "0001"
    );

    // The catalog tool result was fed back into the conversation
    let calls = provider.recorded_calls();
    let fed_back = calls.iter().any(|call| {
        call.request
            .messages
            .iter()
            .any(|m| m.content.starts_with("[Tool Result for get_exercise_by_target]"))
    });
    assert!(fed_back);
    assert_eq!(provider.remaining_replies(), 0);
}

#[tokio::test]
async fn exercise_request_uses_structured_output_when_available() {
    let provider = FakeProvider::full_featured(vec![
        ScriptedReply::text("exercise"),
        ScriptedReply::text("Bench press it is."),
        ScriptedReply::Structured(json!({
            "text": "A focused chest session.",
            "data": valid_workout_plan()
        })),
    ]);

    let response = run_pipeline(&provider, "chest workout please", Some("user-1"))
        .await
        .unwrap();

    assert_eq!(response.text, "A focused chest session.");
    assert!(response.data.is_some());
    let kinds: Vec<_> = provider
        .recorded_calls()
        .iter()
        .map(|c| c.kind)
        .collect();
    assert!(kinds.contains(&"complete_structured"));
}

#[tokio::test]
async fn exercise_plan_violating_schema_is_a_422() {
    let envelope = json!({
        "text": "Plan below.",
        "data": {
            "warmup": {"description": "jog", "duration": 5},
            "cardio": {"description": "row", "duration": 15},
            "sessions_per_week": 3,
            "workout_sessions": [],
            "cooldown": {"description": "stretch", "duration": 5}
        }
    });
    let provider = FakeProvider::new(vec![
        ScriptedReply::text("exercise"),
        ScriptedReply::text("Done."),
        ScriptedReply::text(envelope.to_string()),
    ]);

    let error = run_pipeline(&provider, "plan my training", Some("user-1"))
        .await
        .unwrap_err();

    assert_eq!(error.code, ErrorCode::InvalidFormat);
    assert_eq!(error.http_status(), 422);
    assert!(error.message.contains("no workout sessions"));
}

#[tokio::test]
async fn exercise_question_can_answer_without_a_plan() {
    let provider = FakeProvider::new(vec![
        ScriptedReply::text("exercise"),
        ScriptedReply::text("Rest 48 hours between sessions."),
        ScriptedReply::text(r#"{"text": "Rest 48 hours between sessions.", "data": null}"#),
    ]);

    let response = run_pipeline(&provider, "how long should I rest", None)
        .await
        .unwrap();

    assert_eq!(response.text, "Rest 48 hours between sessions.");
    assert!(response.data.is_none());
}

#[tokio::test]
async fn nutrition_plan_is_rounded_and_rebalanced() {
    let envelope = json!({
        "text": "A one-day meal plan for you.",
        "data": unbalanced_meal_plan()
    });
    let provider = FakeProvider::new(vec![
        ScriptedReply::text("nutrition"),
        ScriptedReply::call("get_user_profile", json!({})),
        ScriptedReply::text("Plan drafted around your profile."),
        ScriptedReply::text(format!("```json\n{envelope}\n```")),
    ]);

    let response = run_pipeline(&provider, "make me a meal plan", Some("user-1"))
        .await
        .unwrap();

    assert_eq!(response.text, "A one-day meal plan for you.");
    let data = response.data.unwrap();
    let day = &data["daily_meal_plans"][0];
    // 303.6 -> 304 and 96.4 -> 96; the stale 9999 total becomes the sum
    assert_eq!(day["breakfast"]["total_calories"], 400);
    assert_eq!(day["lunch"]["total_calories"], 525);
    assert_eq!(day["dinner"]["total_calories"], 443);
    assert_eq!(day["snacks"][0]["total_calories"], 213);
    assert_eq!(day["total_daily_calories"], 1581);
    assert_eq!(data["daily_calories_range"]["max"], 2201);
    assert_eq!(day["daily_macros"]["protein"], 146);
}

#[tokio::test]
async fn nutrition_parse_failure_degrades_to_fallback_envelope() {
    let provider = FakeProvider::new(vec![
        ScriptedReply::text("nutrition"),
        ScriptedReply::text("Here is what I would eat."),
        ScriptedReply::text("I am afraid I cannot produce JSON today."),
    ]);

    let response = run_pipeline(&provider, "what should I eat", None)
        .await
        .unwrap();

    assert_eq!(
        response.text,
        "Sorry, there was an error processing the nutrition response. Please try again."
    );
    assert!(response.data.is_none());
}

#[tokio::test]
async fn general_answer_always_has_null_data() {
    let provider = FakeProvider::new(vec![
        ScriptedReply::text("other"),
        ScriptedReply::text("Hydration matters for recovery."),
        ScriptedReply::text(r#"{"text": "Drink 2-3 liters of water daily.", "data": {"foo": 1}}"#),
    ]);

    let response = run_pipeline(&provider, "how much water should I drink", None)
        .await
        .unwrap();

    assert_eq!(response.text, "Drink 2-3 liters of water daily.");
    // Whatever the model stuffs into data, the general path drops it
    assert!(response.data.is_none());
}

#[tokio::test]
async fn general_answer_falls_back_to_raw_text() {
    let provider = FakeProvider::new(vec![
        ScriptedReply::text("other"),
        ScriptedReply::text("Sleep 7-9 hours."),
        ScriptedReply::text("Sleep 7-9 hours a night for proper recovery."),
    ]);

    let response = run_pipeline(&provider, "how much sleep do I need", None)
        .await
        .unwrap();

    assert_eq!(response.text, "Sleep 7-9 hours a night for proper recovery.");
    assert!(response.data.is_none());
}

#[tokio::test]
async fn tool_errors_are_fed_back_not_fatal() {
    // No user_id: get_user_profile fails, the error payload goes back to the
    // model, and the model answers without personal data.
    let provider = FakeProvider::new(vec![
        ScriptedReply::text("nutrition"),
        ScriptedReply::call("get_user_profile", json!({})),
        ScriptedReply::text("A generic plan, since I have no profile."),
        ScriptedReply::text(r#"{"text": "General advice only.", "data": null}"#),
    ]);

    let response = run_pipeline(&provider, "plan my meals", None).await.unwrap();

    assert_eq!(response.text, "General advice only.");
    let calls = provider.recorded_calls();
    let error_fed_back = calls.iter().any(|call| {
        call.request.messages.iter().any(|m| {
            m.content.starts_with("[Tool Result for get_user_profile]")
                && m.content.contains("error")
        })
    });
    assert!(error_fed_back);
}

#[tokio::test]
async fn tool_loop_exhaustion_is_an_internal_error() {
    let mut replies = vec![ScriptedReply::text("exercise")];
    for _ in 0..MAX_TOOL_ITERATIONS {
        replies.push(ScriptedReply::call("list_available_facts", json!({})));
    }
    let provider = FakeProvider::new(replies);

    let error = run_pipeline(&provider, "plan something", Some("user-1"))
        .await
        .unwrap_err();

    assert_eq!(error.code, ErrorCode::InternalError);
    assert!(error.message.contains("did not converge"));
}

#[tokio::test]
async fn classifier_runs_at_temperature_zero() {
    let provider = FakeProvider::new(vec![
        ScriptedReply::text("other"),
        ScriptedReply::text("ok"),
        ScriptedReply::text("ok"),
    ]);

    run_pipeline(&provider, "hello", None).await.unwrap();

    let calls = provider.recorded_calls();
    let classify = &calls[0];
    assert_eq!(classify.kind, "complete");
    assert_eq!(classify.request.temperature, Some(0.0));
}
