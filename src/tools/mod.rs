// ABOUTME: Pluggable tools architecture exposing data lookups to the LLM
// ABOUTME: Trait, context, registry, and the builtin tool implementations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ghiraas

//! # Agent Tools
//!
//! The functions the LLM can call during the tool loop:
//!
//! | Tool | Reads |
//! |---|---|
//! | `list_available_facts` | exercise catalog |
//! | `get_exercise_by_target` | exercise catalog |
//! | `get_user_profile` | user store |
//! | `get_user_recent_workouts` | user store |
//! | `get_user_sleep_sessions` | user store |
//! | `get_user_food_log_by_days` | user store |
//!
//! Tools are registered in a [`ToolRegistry`] at startup and executed with a
//! per-request [`ToolContext`] carrying the user identity and data gateway.

pub mod context;
pub mod implementations;
pub mod registry;
pub mod traits;

pub use context::ToolContext;
pub use registry::ToolRegistry;
pub use traits::{AgentTool, ToolCapabilities};
