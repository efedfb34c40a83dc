// ABOUTME: Exercise catalog tools: list_available_facts and get_exercise_by_target
// ABOUTME: Read-only lookups against the embedded or configured exercise dataset
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ghiraas

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::errors::{AppError, AppResult};
use crate::tools::context::ToolContext;
use crate::tools::traits::{AgentTool, ToolCapabilities};

/// Lists the distinct target muscles, equipment, and body parts in the dataset
///
/// The exercise coach calls this first so it plans against muscles that
/// actually exist in the catalog.
pub struct ListAvailableFactsTool;

#[async_trait]
impl AgentTool for ListAvailableFactsTool {
    fn name(&self) -> &'static str {
        "list_available_facts"
    }

    fn description(&self) -> &'static str {
        "List all available target muscles, equipment, and body parts from the exercise dataset."
    }

    fn parameters(&self) -> Option<Value> {
        None
    }

    fn capabilities(&self) -> ToolCapabilities {
        ToolCapabilities::READS_CATALOG
    }

    async fn execute(&self, _args: Value, context: &ToolContext) -> AppResult<Value> {
        let facts = context.gateway.catalog.list_facts();
        debug!(
            target_muscles = facts.target_muscles.len(),
            equipment = facts.equipment.len(),
            "Listing catalog facts"
        );
        serde_json::to_value(facts).map_err(AppError::from)
    }
}

/// Fetches exercises matching a target muscle group
pub struct GetExerciseByTargetTool;

#[async_trait]
impl AgentTool for GetExerciseByTargetTool {
    fn name(&self) -> &'static str {
        "get_exercise_by_target"
    }

    fn description(&self) -> &'static str {
        "Fetch exercise data from the exercise dataset based on the target muscle group."
    }

    fn parameters(&self) -> Option<Value> {
        Some(json!({
            "type": "object",
            "properties": {
                "target": {
                    "type": "string",
                    "description": "Target muscle group, e.g. 'pectorals' or 'quads'"
                }
            },
            "required": ["target"]
        }))
    }

    fn capabilities(&self) -> ToolCapabilities {
        ToolCapabilities::READS_CATALOG
    }

    async fn execute(&self, args: Value, context: &ToolContext) -> AppResult<Value> {
        let target = args
            .get("target")
            .and_then(Value::as_str)
            .ok_or_else(|| AppError::invalid_input("get_exercise_by_target requires 'target'"))?;

        debug!(target, "Looking up exercises by target muscle");
        context.gateway.catalog.exercises_by_target_json(target)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::tools::implementations::tests::test_context;

    #[tokio::test]
    async fn test_list_facts_payload_shape() {
        let ctx = test_context(None);
        let facts = ListAvailableFactsTool
            .execute(Value::Null, &ctx)
            .await
            .unwrap();
        assert!(facts["targetMuscles"].is_array());
        assert!(facts["equipment"].is_array());
        assert!(facts["bodyParts"].is_array());
    }

    #[tokio::test]
    async fn test_get_by_target_requires_argument() {
        let ctx = test_context(None);
        let err = GetExerciseByTargetTool
            .execute(json!({}), &ctx)
            .await
            .unwrap_err();
        assert_eq!(err.http_status(), 400);
    }

    #[tokio::test]
    async fn test_get_by_target_returns_matches() {
        let ctx = test_context(None);
        let result = GetExerciseByTargetTool
            .execute(json!({"target": "pectorals"}), &ctx)
            .await
            .unwrap();
        let list = result.as_array().unwrap();
        assert!(!list.is_empty());
        assert!(list[0]["exerciseId"].is_string());
    }
}
