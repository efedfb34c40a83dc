// ABOUTME: Shared test utilities: scripted fake LLM provider and seeded data fixtures
// ABOUTME: Lets pipeline tests drive multi-turn tool conversations without a live model
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ghiraas

#![allow(dead_code)]
#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use ghiraas_agent_server::errors::AppError;
use ghiraas_agent_server::gateway::{DataGateway, ExerciseCatalog, InMemoryUserStore};
use ghiraas_agent_server::llm::{
    ChatRequest, ChatResponse, ChatResponseWithTools, FunctionCall, LlmCapabilities, LlmProvider,
    Tool,
};
use ghiraas_agent_server::tools::ToolRegistry;

/// One scripted model turn consumed by the next provider call
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// Plain text answer (served by `complete` and `complete_with_tools`)
    Text(String),
    /// Function calls requested by the model (served by `complete_with_tools`)
    FunctionCalls(Vec<FunctionCall>),
    /// Parsed JSON from a schema-constrained completion (`complete_structured`)
    Structured(Value),
}

impl ScriptedReply {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }

    pub fn call(name: &str, args: Value) -> Self {
        Self::FunctionCalls(vec![FunctionCall {
            name: name.to_owned(),
            args,
        }])
    }
}

/// A recorded provider invocation for post-hoc assertions
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub kind: &'static str,
    pub request: ChatRequest,
}

/// Scripted in-process provider: each call pops the next reply off the queue
pub struct FakeProvider {
    replies: Mutex<VecDeque<ScriptedReply>>,
    calls: Mutex<Vec<RecordedCall>>,
    capabilities: LlmCapabilities,
    healthy: bool,
}

impl FakeProvider {
    /// Provider without native structured output (parse-path behavior)
    pub fn new(replies: Vec<ScriptedReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
            capabilities: LlmCapabilities::tool_calling(),
            healthy: true,
        }
    }

    /// Provider with native structured output (schema-constrained behavior)
    pub fn full_featured(replies: Vec<ScriptedReply>) -> Self {
        Self {
            capabilities: LlmCapabilities::full_featured(),
            ..Self::new(replies)
        }
    }

    pub fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn remaining_replies(&self) -> usize {
        self.replies.lock().unwrap().len()
    }

    fn record(&self, kind: &'static str, request: &ChatRequest) {
        self.calls.lock().unwrap().push(RecordedCall {
            kind,
            request: request.clone(),
        });
    }

    fn next_reply(&self) -> Result<ScriptedReply, AppError> {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AppError::internal("FakeProvider script exhausted"))
    }
}

impl std::fmt::Debug for FakeProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakeProvider")
            .field("remaining", &self.remaining_replies())
            .finish()
    }
}

#[async_trait]
impl LlmProvider for FakeProvider {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn display_name(&self) -> &'static str {
        "Fake Provider"
    }

    fn capabilities(&self) -> LlmCapabilities {
        self.capabilities
    }

    fn default_model(&self) -> &str {
        "fake-model"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        self.record("complete", request);
        match self.next_reply()? {
            ScriptedReply::Text(content) => Ok(ChatResponse {
                content,
                model: "fake-model".to_owned(),
                usage: None,
                finish_reason: Some("stop".to_owned()),
            }),
            other => Err(AppError::internal(format!(
                "FakeProvider: complete() got non-text reply {other:?}"
            ))),
        }
    }

    async fn complete_with_tools(
        &self,
        request: &ChatRequest,
        _tools: Option<Vec<Tool>>,
    ) -> Result<ChatResponseWithTools, AppError> {
        self.record("complete_with_tools", request);
        match self.next_reply()? {
            ScriptedReply::Text(content) => Ok(ChatResponseWithTools {
                content: Some(content),
                function_calls: None,
                model: "fake-model".to_owned(),
                usage: None,
                finish_reason: Some("stop".to_owned()),
            }),
            ScriptedReply::FunctionCalls(calls) => Ok(ChatResponseWithTools {
                content: None,
                function_calls: Some(calls),
                model: "fake-model".to_owned(),
                usage: None,
                finish_reason: None,
            }),
            other @ ScriptedReply::Structured(_) => Err(AppError::internal(format!(
                "FakeProvider: complete_with_tools() got structured reply {other:?}"
            ))),
        }
    }

    async fn complete_structured(
        &self,
        request: &ChatRequest,
        _schema: &Value,
    ) -> Result<Value, AppError> {
        self.record("complete_structured", request);
        match self.next_reply()? {
            ScriptedReply::Structured(value) => Ok(value),
            other => Err(AppError::internal(format!(
                "FakeProvider: complete_structured() got non-structured reply {other:?}"
            ))),
        }
    }

    async fn health_check(&self) -> Result<bool, AppError> {
        Ok(self.healthy)
    }
}

/// Gateway with the embedded catalog and one fully seeded user ("user-1")
pub fn seeded_gateway() -> DataGateway {
    let catalog = ExerciseCatalog::embedded().unwrap();
    let mut store = InMemoryUserStore::new();
    store.insert_user(
        "user-1",
        json!({
            "weight": 82.0,
            "height": 178.0,
            "age": 31,
            "sex": "male",
            "goal": "muscle building",
            "dietary_preferences": ["high protein"],
            "food_intolerance": ["dairy"]
        }),
        vec![
            json!({"name": "Push day", "endTime": "2025-08-20T18:30:00Z", "durationMinutes": 55}),
            json!({"name": "Pull day", "endTime": "2025-08-22T18:00:00Z", "durationMinutes": 60}),
        ],
        vec![json!({"createdAt": "2025-08-22T23:10:00Z", "durationHours": 7.5})],
        vec![
            json!({"createdAt": "2025-08-22T08:00:00Z", "name": "oats", "calories": 300}),
            json!({"createdAt": "2025-08-21T13:00:00Z", "name": "chicken", "calories": 450}),
        ],
    );
    DataGateway::new(Arc::new(catalog), Arc::new(store))
}

/// Registry with all builtin tools
pub fn builtin_registry() -> ToolRegistry {
    ToolRegistry::with_builtin_tools()
}

/// A workout plan JSON value that passes schema validation
pub fn valid_workout_plan() -> Value {
    json!({
        "warmup": {"description": "5 minutes of jumping jacks", "duration": 5},
        "cardio": {"description": "15 minutes moderate rowing", "duration": 15},
        "sessions_per_week": 3,
        "workout_sessions": [{
            "exercises": [{
                "exercise_id": "0001",
                "name": "barbell bench press",
                "sets": 4,
                "reps": "8-12",
                "rest": 90
            }]
        }],
        "cooldown": {"description": "5 minutes of static stretching", "duration": 5}
    })
}

/// A one-day meal plan with deliberately wrong totals and fractional numbers
pub fn unbalanced_meal_plan() -> Value {
    json!({
        "daily_calories_range": {"min": 1800.4, "max": 2200.6},
        "macronutrients_range": {
            "protein": {"min": 100, "max": 140},
            "carbohydrates": {"min": 180, "max": 240},
            "fat": {"min": 50, "max": 70}
        },
        "daily_meal_plans": [{
            "day": 1,
            "date": "2025-08-30",
            "breakfast": {
                "description": "oatmeal with banana",
                "ingredients": [
                    {"ingredient": "oats", "quantity": "80g", "calories": 303.6},
                    {"ingredient": "banana", "quantity": "1", "calories": 96.4}
                ],
                "total_calories": 9999,
                "recipe": "Simmer oats for 10 minutes, slice the banana on top.",
                "suggested_brands": []
            },
            "lunch": {
                "description": "grilled chicken and rice",
                "ingredients": [
                    {"ingredient": "chicken breast", "quantity": "200g", "calories": 330},
                    {"ingredient": "rice", "quantity": "150g", "calories": 195}
                ],
                "total_calories": 0,
                "recipe": "Grill the chicken 6 minutes per side, serve over rice.",
                "suggested_brands": []
            },
            "dinner": {
                "description": "salmon with vegetables",
                "ingredients": [
                    {"ingredient": "salmon", "quantity": "180g", "calories": 375},
                    {"ingredient": "broccoli", "quantity": "200g", "calories": 68}
                ],
                "total_calories": 500,
                "recipe": "Bake the salmon at 200C for 15 minutes, steam the broccoli.",
                "suggested_brands": []
            },
            "snacks": [{
                "description": "apple with peanut butter",
                "ingredients": [
                    {"ingredient": "apple", "quantity": "1", "calories": 95},
                    {"ingredient": "peanut butter", "quantity": "20g", "calories": 118}
                ],
                "total_calories": 1,
                "recipe": "Slice the apple, spread the peanut butter.",
                "suggested_brands": []
            }],
            "total_daily_calories": 42,
            "daily_macros": {"protein": 145.5, "carbohydrates": 160, "fat": 55}
        }],
        "total_days": 1
    })
}
