// ABOUTME: User history tools: recent workouts, sleep sessions, and the food log
// ABOUTME: All three read the user data store and respect caller-supplied limits
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ghiraas

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::errors::{AppError, AppResult};
use crate::gateway::{DEFAULT_FOOD_LOG_DAYS, DEFAULT_HISTORY_LIMIT};
use crate::tools::context::ToolContext;
use crate::tools::traits::{AgentTool, ToolCapabilities};

/// Resolve the user id from tool arguments or the request context
fn resolve_user(args: &Value, context: &ToolContext) -> AppResult<String> {
    match args.get("user_id").and_then(Value::as_str) {
        Some(id) => Ok(id.to_owned()),
        None => context.require_user().map(ToOwned::to_owned),
    }
}

/// Read a positive integer limit argument with a default
fn limit_arg(args: &Value, name: &str, default: usize) -> usize {
    args.get(name)
        .and_then(Value::as_u64)
        .map_or(default, |n| usize::try_from(n).unwrap_or(default))
        .max(1)
}

/// Retrieves the user's most recent completed workouts, newest first
pub struct GetRecentWorkoutsTool;

#[async_trait]
impl AgentTool for GetRecentWorkoutsTool {
    fn name(&self) -> &'static str {
        "get_user_recent_workouts"
    }

    fn description(&self) -> &'static str {
        "Retrieve the user's most recent completed workouts, ordered from newest to oldest. Default limit is 10."
    }

    fn parameters(&self) -> Option<Value> {
        Some(json!({
            "type": "object",
            "properties": {
                "user_id": {"type": "string", "description": "The ID of the user"},
                "limit": {"type": "integer", "description": "Maximum number of workouts to retrieve (default: 10)"}
            },
            "required": ["user_id"]
        }))
    }

    fn capabilities(&self) -> ToolCapabilities {
        ToolCapabilities::REQUIRES_USER | ToolCapabilities::READS_USER_DATA
    }

    async fn execute(&self, args: Value, context: &ToolContext) -> AppResult<Value> {
        let user_id = resolve_user(&args, context)?;
        let limit = limit_arg(&args, "limit", DEFAULT_HISTORY_LIMIT);

        debug!(user_id, limit, "Fetching recent workouts");
        let workouts = context
            .gateway
            .users
            .get_recent_workouts(&user_id, limit)
            .await?;
        serde_json::to_value(workouts).map_err(AppError::from)
    }
}

/// Retrieves the user's sleep logging data, newest first
pub struct GetSleepSessionsTool;

#[async_trait]
impl AgentTool for GetSleepSessionsTool {
    fn name(&self) -> &'static str {
        "get_user_sleep_sessions"
    }

    fn description(&self) -> &'static str {
        "Retrieve the user's sleep logging data, ordered by creation time from newest to oldest. Default limit is 10."
    }

    fn parameters(&self) -> Option<Value> {
        Some(json!({
            "type": "object",
            "properties": {
                "user_id": {"type": "string", "description": "The ID of the user"},
                "limit": {"type": "integer", "description": "Maximum number of sleep sessions to retrieve (default: 10)"}
            },
            "required": ["user_id"]
        }))
    }

    fn capabilities(&self) -> ToolCapabilities {
        ToolCapabilities::REQUIRES_USER | ToolCapabilities::READS_USER_DATA
    }

    async fn execute(&self, args: Value, context: &ToolContext) -> AppResult<Value> {
        let user_id = resolve_user(&args, context)?;
        let limit = limit_arg(&args, "limit", DEFAULT_HISTORY_LIMIT);

        debug!(user_id, limit, "Fetching sleep sessions");
        let sessions = context
            .gateway
            .users
            .get_sleep_sessions(&user_id, limit)
            .await?;
        serde_json::to_value(sessions).map_err(AppError::from)
    }
}

/// Retrieves the user's logged food data, grouped by day
pub struct GetFoodLogByDaysTool;

#[async_trait]
impl AgentTool for GetFoodLogByDaysTool {
    fn name(&self) -> &'static str {
        "get_user_food_log_by_days"
    }

    fn description(&self) -> &'static str {
        "Retrieve the user's logged food data grouped by day. Default is the last 7 days with entries."
    }

    fn parameters(&self) -> Option<Value> {
        Some(json!({
            "type": "object",
            "properties": {
                "user_id": {"type": "string", "description": "The ID of the user"},
                "limit_days": {"type": "integer", "description": "Maximum number of days to retrieve (default: 7)"}
            },
            "required": ["user_id"]
        }))
    }

    fn capabilities(&self) -> ToolCapabilities {
        ToolCapabilities::REQUIRES_USER | ToolCapabilities::READS_USER_DATA
    }

    async fn execute(&self, args: Value, context: &ToolContext) -> AppResult<Value> {
        let user_id = resolve_user(&args, context)?;
        let limit_days = limit_arg(&args, "limit_days", DEFAULT_FOOD_LOG_DAYS);

        debug!(user_id, limit_days, "Fetching food log");
        let log = context
            .gateway
            .users
            .get_food_log_by_days(&user_id, limit_days)
            .await?;

        // serde_json's preserve_order feature keeps the newest-first day
        // ordering in the serialized object
        let mut payload = serde_json::Map::new();
        for (day, entries) in log {
            payload.insert(day, Value::Array(entries));
        }
        Ok(Value::Object(payload))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::tools::implementations::tests::test_context;

    #[tokio::test]
    async fn test_workouts_respect_limit_argument() {
        let ctx = test_context(Some("user-1"));
        let result = GetRecentWorkoutsTool
            .execute(json!({"limit": 1}), &ctx)
            .await
            .unwrap();
        assert_eq!(result.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_zero_limit_clamped_to_one() {
        let ctx = test_context(Some("user-1"));
        let result = GetSleepSessionsTool
            .execute(json!({"limit": 0}), &ctx)
            .await
            .unwrap();
        assert_eq!(result.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_food_log_grouped_by_day_newest_first() {
        let ctx = test_context(Some("user-1"));
        let result = GetFoodLogByDaysTool
            .execute(json!({}), &ctx)
            .await
            .unwrap();
        let days = result.as_object().unwrap();
        let keys: Vec<&str> = days.keys().map(String::as_str).collect();
        assert_eq!(keys, ["2025-09-08", "2025-09-07"]);
        for entries in days.values() {
            assert!(entries.is_array());
        }
    }
}
