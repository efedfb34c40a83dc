// ABOUTME: Configuration module root for the Ghiraas agent server
// ABOUTME: Re-exports server configuration and LLM provider type selection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ghiraas

//! Configuration management
//!
//! All configuration is environment-driven. `ServerConfig::from_env` is the
//! single entry point; the server binary loads it once at startup and passes
//! the result into `ServerResources`.

/// Environment-based server configuration
pub mod environment;

pub use environment::{DataConfig, LlmConfig, LlmProviderType, ServerConfig};
