// ABOUTME: Environment-based server configuration loaded once at startup
// ABOUTME: Covers HTTP port, LLM provider selection, model names, and seed data paths
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ghiraas

//! # Server Configuration
//!
//! Environment-only configuration. Every knob has a sensible default so the
//! server starts with nothing but an API key set.
//!
//! | Variable | Default | Purpose |
//! |---|---|---|
//! | `HTTP_PORT` | `8081` | HTTP listen port |
//! | `GHIRAAS_LLM_PROVIDER` | `gemini` | `gemini` or `local`/`ollama`/`vllm`/`localai` |
//! | `GHIRAAS_LLM_MODEL` | provider default | generation model |
//! | `GHIRAAS_INTENT_MODEL` | provider default | cheap classification model |
//! | `GHIRAAS_EXERCISE_DATA` | embedded dataset | path to an exercises JSON file |
//! | `GHIRAAS_USER_SEED_DATA` | none | path to a user seed JSON file |

use std::env;

use serde::{Deserialize, Serialize};

use crate::errors::AppResult;

/// Which LLM provider backs the completion service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProviderType {
    /// Google Gemini provider - full-featured with native structured output (default)
    #[default]
    Gemini,
    /// Local LLM provider - `OpenAI`-compatible endpoint (Ollama, vLLM, `LocalAI`)
    Local,
}

impl LlmProviderType {
    /// Environment variable name for LLM provider selection
    pub const ENV_VAR: &'static str = "GHIRAAS_LLM_PROVIDER";

    /// Parse from string with fallback to default
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "local" | "ollama" | "vllm" | "localai" => Self::Local,
            _ => Self::Gemini, // Default fallback (including "gemini"/"google")
        }
    }

    /// Load from environment variable
    #[must_use]
    pub fn from_env() -> Self {
        env::var(Self::ENV_VAR)
            .map(|s| Self::from_str_or_default(&s))
            .unwrap_or_default()
    }
}

impl std::fmt::Display for LlmProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gemini => write!(f, "gemini"),
            Self::Local => write!(f, "local"),
        }
    }
}

/// LLM-related configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Which provider backs the completion service
    pub provider: LlmProviderType,
    /// Model for tool-augmented generation (None = provider default)
    pub model: Option<String>,
    /// Model for intent classification (None = provider default)
    ///
    /// Classification is a one-word task; a cheaper/faster model is fine here.
    pub intent_model: Option<String>,
}

impl LlmConfig {
    /// Environment variable for the generation model
    pub const MODEL_ENV_VAR: &'static str = "GHIRAAS_LLM_MODEL";

    /// Environment variable for the classification model
    pub const INTENT_MODEL_ENV_VAR: &'static str = "GHIRAAS_INTENT_MODEL";

    /// Load from environment
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            provider: LlmProviderType::from_env(),
            model: env::var(Self::MODEL_ENV_VAR).ok().filter(|s| !s.is_empty()),
            intent_model: env::var(Self::INTENT_MODEL_ENV_VAR)
                .ok()
                .filter(|s| !s.is_empty()),
        }
    }
}

/// Gateway / data configuration
#[derive(Debug, Clone)]
pub struct DataConfig {
    /// Optional path to an exercises JSON file (falls back to the embedded dataset)
    pub exercise_data_path: Option<String>,
    /// Optional path to a user seed JSON file for the in-memory store
    pub user_seed_path: Option<String>,
}

impl DataConfig {
    /// Load from environment
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            exercise_data_path: env::var("GHIRAAS_EXERCISE_DATA")
                .ok()
                .filter(|s| !s.is_empty()),
            user_seed_path: env::var("GHIRAAS_USER_SEED_DATA")
                .ok()
                .filter(|s| !s.is_empty()),
        }
    }
}

/// Complete server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,
    /// LLM provider configuration
    pub llm: LlmConfig,
    /// Gateway data configuration
    pub data: DataConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns a config error if `HTTP_PORT` is set but not a valid port number.
    pub fn from_env() -> AppResult<Self> {
        let http_port = match env::var("HTTP_PORT") {
            Ok(value) => value.parse::<u16>().map_err(|_| {
                crate::errors::AppError::config(format!("Invalid HTTP_PORT value: {value}"))
            })?,
            Err(_) => 8081,
        };

        Ok(Self {
            http_port,
            llm: LlmConfig::from_env(),
            data: DataConfig::from_env(),
        })
    }

    /// One-line configuration summary for startup logging
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "port={} provider={} model={} intent_model={}",
            self.http_port,
            self.llm.provider,
            self.llm.model.as_deref().unwrap_or("(provider default)"),
            self.llm
                .intent_model
                .as_deref()
                .unwrap_or("(provider default)"),
        )
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_provider_type_from_env_default() {
        std::env::remove_var(LlmProviderType::ENV_VAR);
        assert_eq!(LlmProviderType::from_env(), LlmProviderType::Gemini);
    }

    #[test]
    #[serial]
    fn test_provider_type_aliases() {
        assert_eq!(
            LlmProviderType::from_str_or_default("ollama"),
            LlmProviderType::Local
        );
        assert_eq!(
            LlmProviderType::from_str_or_default("GOOGLE"),
            LlmProviderType::Gemini
        );
        assert_eq!(
            LlmProviderType::from_str_or_default("anything-else"),
            LlmProviderType::Gemini
        );
    }

    #[test]
    #[serial]
    fn test_server_config_invalid_port() {
        std::env::set_var("HTTP_PORT", "not-a-port");
        let result = ServerConfig::from_env();
        std::env::remove_var("HTTP_PORT");
        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn test_server_config_defaults() {
        std::env::remove_var("HTTP_PORT");
        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.http_port, 8081);
    }
}
