// ABOUTME: Main library entry point for the Ghiraas agent server
// ABOUTME: Intent-routed LLM agent backend for fitness and nutrition assistance
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ghiraas

#![deny(unsafe_code)]

//! # Ghiraas Agent Server
//!
//! A fitness and nutrition assistant backend. Each request flows through one
//! sequential pipeline: an intent classifier picks a domain handler, the
//! handler runs a tool-augmented LLM conversation against the exercise
//! catalog and user data gateway, and the raw model output is extracted,
//! validated, and normalized into a `{text, data}` envelope.
//!
//! ## Architecture
//!
//! - **agents**: the classify → handle → normalize pipeline
//! - **llm**: provider abstraction with Gemini and OpenAI-compatible backends
//! - **tools**: agent-callable functions over catalog and user data
//! - **gateway**: exercise catalog and user document store
//! - **routes**: axum HTTP surface (`/api/agent/generate`,
//!   `/api/recommendations/brands`, health)
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use ghiraas_agent_server::config::ServerConfig;
//! use ghiraas_agent_server::errors::AppResult;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Ghiraas agent server configured for port {}", config.http_port);
//!     Ok(())
//! }
//! ```

/// Agent pipeline: intent classification, domain handlers, normalization
pub mod agents;

/// Environment-driven server configuration
pub mod config;

/// Application error types and HTTP error responses
pub mod errors;

/// Exercise catalog and user document store
pub mod gateway;

/// LLM provider abstraction and concrete backends
pub mod llm;

/// Structured logging initialization
pub mod logging;

/// Domain models: intents, response envelopes, workout and meal plans
pub mod models;

/// Shared server dependency container
pub mod resources;

/// HTTP route handlers and router assembly
pub mod routes;

/// Agent tool trait, registry, and built-in tools
pub mod tools;
