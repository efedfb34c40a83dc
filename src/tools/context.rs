// ABOUTME: Defines ToolContext which gives tools access to the data gateway and user identity
// ABOUTME: Replaces scattered parameter passing with a unified context object
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ghiraas

//! # Tool Execution Context
//!
//! Unified context object for tool execution, containing the (optional)
//! user identity and access to the data gateway. Built per-request by the
//! domain handlers and shared across all tool calls in one tool loop.

use std::fmt;

use crate::errors::{AppError, AppResult};
use crate::gateway::DataGateway;

/// Context provided to every tool execution
#[derive(Clone)]
pub struct ToolContext {
    /// User this request is about, when the caller supplied one
    pub user_id: Option<String>,
    /// Request ID for tracing/logging
    pub request_id: String,
    /// Data sources shared by all tools
    pub gateway: DataGateway,
}

impl ToolContext {
    /// Create a new context
    #[must_use]
    pub fn new(gateway: DataGateway, user_id: Option<String>, request_id: String) -> Self {
        Self {
            user_id,
            request_id,
            gateway,
        }
    }

    /// Get the user id or fail for tools that require one
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when the request carried no user id. The tool
    /// loop surfaces this to the model as an error payload, prompting it to
    /// answer without personal data.
    pub fn require_user(&self) -> AppResult<&str> {
        self.user_id
            .as_deref()
            .ok_or_else(|| AppError::invalid_input("No user_id provided for this request"))
    }
}

impl fmt::Debug for ToolContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolContext")
            .field("user_id", &self.user_id)
            .field("request_id", &self.request_id)
            .field("gateway", &"<DataGateway>")
            .finish()
    }
}
