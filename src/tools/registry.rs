// ABOUTME: Central registry for agent tools with declaration listing and execution
// ABOUTME: Provides tool registration, lookup, and the function declarations fed to the LLM
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ghiraas

//! # Tool Registry
//!
//! Central registry for agent tools, providing:
//! - Tool registration and lookup
//! - Function declaration generation for LLM tool calling
//! - Unified execution with tracing
//!
//! The registry is built once at startup and then used immutably. All
//! registered tools are `Arc`-wrapped for efficient sharing across async
//! tasks.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::{AppError, AppResult};
use crate::llm::{FunctionDeclaration, Tool};

use super::context::ToolContext;
use super::implementations::{
    GetExerciseByTargetTool, GetFoodLogByDaysTool, GetRecentWorkoutsTool, GetSleepSessionsTool,
    GetUserProfileTool, ListAvailableFactsTool,
};
use super::traits::AgentTool;

/// Central registry for agent tools
///
/// `BTreeMap` keeps declaration order stable across runs, which keeps
/// prompts and cassette-style tests deterministic.
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn AgentTool>>,
}

impl ToolRegistry {
    /// Create a new empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// Create a registry with all builtin tools registered
    #[must_use]
    pub fn with_builtin_tools() -> Self {
        let mut registry = Self::new();
        registry.register_builtin_tools();
        registry
    }

    /// Register a tool in the registry
    ///
    /// # Returns
    ///
    /// `true` if the tool was registered, `false` if a tool with the same
    /// name already exists.
    pub fn register(&mut self, tool: Arc<dyn AgentTool>) -> bool {
        let name = tool.name().to_owned();

        if self.tools.contains_key(&name) {
            warn!("Tool '{}' is already registered, skipping", name);
            return false;
        }

        debug!(
            "Registering tool '{}' with capabilities: {}",
            name,
            tool.capabilities().describe()
        );
        self.tools.insert(name, tool);
        true
    }

    /// Register the builtin tool set
    pub fn register_builtin_tools(&mut self) {
        self.register(Arc::new(ListAvailableFactsTool));
        self.register(Arc::new(GetExerciseByTargetTool));
        self.register(Arc::new(GetUserProfileTool));
        self.register(Arc::new(GetRecentWorkoutsTool));
        self.register(Arc::new(GetSleepSessionsTool));
        self.register(Arc::new(GetFoodLogByDaysTool));
    }

    /// Get a tool by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn AgentTool>> {
        self.tools.get(name)
    }

    /// Check if a tool is registered
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Number of registered tools
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Function declarations for all registered tools
    #[must_use]
    pub fn function_declarations(&self) -> Vec<FunctionDeclaration> {
        self.tools.values().map(|tool| tool.declaration()).collect()
    }

    /// All tools wrapped as a single LLM `Tool` definition
    #[must_use]
    pub fn as_llm_tools(&self) -> Vec<Tool> {
        vec![Tool {
            function_declarations: self.function_declarations(),
        }]
    }

    /// Execute a tool by name
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for unknown tool names, or the tool's own
    /// error for execution failures.
    pub async fn execute(
        &self,
        name: &str,
        args: Value,
        context: &ToolContext,
    ) -> AppResult<Value> {
        let tool = self
            .get(name)
            .ok_or_else(|| AppError::not_found(format!("Tool '{name}'")))?;

        debug!(tool = name, "Executing tool");
        tool.execute(args, context).await
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::with_builtin_tools()
    }
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tools.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::tools::implementations::tests::test_context;
    use serde_json::json;

    #[test]
    fn test_builtin_tools_registered() {
        let registry = ToolRegistry::with_builtin_tools();
        assert_eq!(registry.len(), 6);
        for name in [
            "list_available_facts",
            "get_exercise_by_target",
            "get_user_profile",
            "get_user_recent_workouts",
            "get_user_sleep_sessions",
            "get_user_food_log_by_days",
        ] {
            assert!(registry.contains(name), "missing tool {name}");
        }
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = ToolRegistry::with_builtin_tools();
        let before = registry.len();
        assert!(!registry.register(Arc::new(
            crate::tools::implementations::ListAvailableFactsTool
        )));
        assert_eq!(registry.len(), before);
    }

    #[test]
    fn test_declarations_are_deterministic() {
        let names: Vec<String> = ToolRegistry::with_builtin_tools()
            .function_declarations()
            .into_iter()
            .map(|d| d.name)
            .collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[tokio::test]
    async fn test_execute_unknown_tool() {
        let registry = ToolRegistry::with_builtin_tools();
        let ctx = test_context(None);
        let err = registry
            .execute("frobnicate", json!({}), &ctx)
            .await
            .unwrap_err();
        assert_eq!(err.http_status(), 404);
    }
}
