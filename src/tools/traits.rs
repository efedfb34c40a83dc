// ABOUTME: Defines the AgentTool trait and ToolCapabilities for the pluggable tools architecture
// ABOUTME: Tools implement this trait to be registered and executed via the ToolRegistry
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ghiraas

//! # Agent Tool Trait and Capabilities
//!
//! Core abstraction for the functions exposed to the LLM during the tool
//! loop. All tools implement `AgentTool`, which provides:
//! - Tool metadata (name, description, parameter schema)
//! - Capability flags for filtering and validation
//! - Async execution with context

use async_trait::async_trait;
use bitflags::bitflags;
use serde_json::Value;

use crate::errors::AppResult;
use crate::llm::FunctionDeclaration;

use super::context::ToolContext;

bitflags! {
    /// Capabilities that tools declare for filtering and discovery.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ToolCapabilities: u8 {
        /// Tool needs a user_id in the context to do anything useful
        const REQUIRES_USER = 0b0000_0001;
        /// Tool reads the exercise catalog
        const READS_CATALOG = 0b0000_0010;
        /// Tool reads per-user documents
        const READS_USER_DATA = 0b0000_0100;
    }
}

impl ToolCapabilities {
    /// Check if the tool needs a user id
    #[must_use]
    pub const fn requires_user(self) -> bool {
        self.contains(Self::REQUIRES_USER)
    }

    /// Get a description of all enabled capabilities for logging
    #[must_use]
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if self.contains(Self::REQUIRES_USER) {
            parts.push("requires_user");
        }
        if self.contains(Self::READS_CATALOG) {
            parts.push("reads_catalog");
        }
        if self.contains(Self::READS_USER_DATA) {
            parts.push("reads_user_data");
        }
        if parts.is_empty() {
            "none".to_owned()
        } else {
            parts.join(", ")
        }
    }
}

/// The trait all agent tools implement.
///
/// Tools are registered with the `ToolRegistry`, surfaced to the LLM as
/// function declarations, and executed when the model requests them during
/// the tool loop.
///
/// # Design Notes
///
/// - Tools are `Send + Sync` for safe sharing across async tasks
/// - `name()` returns `&'static str` for zero-allocation lookup
/// - `execute()` returns a JSON payload that is fed back to the model verbatim
#[async_trait]
pub trait AgentTool: Send + Sync {
    /// Unique identifier for the tool (e.g., `get_exercise_by_target`)
    fn name(&self) -> &'static str;

    /// Human-readable description for LLM consumption
    ///
    /// This is what the model reads to decide when to call the tool, so it
    /// should describe behavior and defaults, not implementation.
    fn description(&self) -> &'static str;

    /// JSON Schema for the tool's parameters, if it takes any
    fn parameters(&self) -> Option<Value>;

    /// Capability flags for filtering and validation
    fn capabilities(&self) -> ToolCapabilities;

    /// Execute the tool with given arguments and context
    ///
    /// # Errors
    ///
    /// Returns `AppError` for validation failures or data access errors.
    /// The tool loop converts errors into `{"error": ...}` payloads so the
    /// model can recover instead of aborting the conversation.
    async fn execute(&self, args: Value, context: &ToolContext) -> AppResult<Value>;

    /// Function declaration advertised to the LLM
    fn declaration(&self) -> FunctionDeclaration {
        FunctionDeclaration {
            name: self.name().to_owned(),
            description: self.description().to_owned(),
            parameters: self.parameters(),
        }
    }
}
