// ABOUTME: User profile tool backed by the user data store
// ABOUTME: Returns the profile document or a not-found payload for the model
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ghiraas

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::errors::AppResult;
use crate::tools::context::ToolContext;
use crate::tools::traits::{AgentTool, ToolCapabilities};

/// Retrieves the user's profile document
///
/// Profile fields use metric units (kg, cm); the system prompts tell the
/// model to answer accordingly.
pub struct GetUserProfileTool;

#[async_trait]
impl AgentTool for GetUserProfileTool {
    fn name(&self) -> &'static str {
        "get_user_profile"
    }

    fn description(&self) -> &'static str {
        "Retrieve the user's profile information (age, weight, goals, preferences). Units are metric."
    }

    fn parameters(&self) -> Option<Value> {
        Some(json!({
            "type": "object",
            "properties": {
                "user_id": {
                    "type": "string",
                    "description": "The ID of the user"
                }
            },
            "required": ["user_id"]
        }))
    }

    fn capabilities(&self) -> ToolCapabilities {
        ToolCapabilities::REQUIRES_USER | ToolCapabilities::READS_USER_DATA
    }

    async fn execute(&self, args: Value, context: &ToolContext) -> AppResult<Value> {
        // Prefer the model-supplied id, fall back to the request context
        let user_id = match args.get("user_id").and_then(Value::as_str) {
            Some(id) => id.to_owned(),
            None => context.require_user()?.to_owned(),
        };

        debug!(user_id, "Fetching user profile");
        let profile = context.gateway.users.get_user_profile(&user_id).await?;

        Ok(profile.unwrap_or_else(|| {
            json!({"error": format!("No profile found for user {user_id}")})
        }))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::tools::implementations::tests::test_context;

    #[tokio::test]
    async fn test_profile_from_context_user() {
        let ctx = test_context(Some("user-1"));
        let profile = GetUserProfileTool.execute(json!({}), &ctx).await.unwrap();
        assert_eq!(profile["user_id"], "user-1");
    }

    #[tokio::test]
    async fn test_missing_profile_is_error_payload() {
        let ctx = test_context(Some("ghost"));
        let payload = GetUserProfileTool.execute(json!({}), &ctx).await.unwrap();
        assert!(payload["error"].as_str().unwrap().contains("ghost"));
    }

    #[tokio::test]
    async fn test_no_user_anywhere_is_invalid_input() {
        let ctx = test_context(None);
        let err = GetUserProfileTool.execute(json!({}), &ctx).await.unwrap_err();
        assert_eq!(err.http_status(), 400);
    }
}
