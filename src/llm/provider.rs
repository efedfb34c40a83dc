// ABOUTME: Runtime provider selection between Gemini and OpenAI-compatible backends
// ABOUTME: Enum dispatch keeps the agents generic without trait objects in ServerResources
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ghiraas

use tracing::info;

use super::{GeminiProvider, LlmProvider, OpenAiCompatibleProvider};
use crate::config::{LlmProviderType, ServerConfig};
use crate::errors::AppError;

/// The configured completion backend
///
/// Built once at startup from `ServerConfig` and shared through
/// `ServerResources`. Enum dispatch instead of `Box<dyn LlmProvider>` so the
/// concrete provider is visible at construction time.
#[derive(Debug)]
pub enum ChatProvider {
    /// Google Gemini (native structured output)
    Gemini(GeminiProvider),
    /// Any `OpenAI`-compatible endpoint (Ollama, vLLM, `LocalAI`)
    Local(OpenAiCompatibleProvider),
}

impl ChatProvider {
    /// Build the provider selected by configuration
    ///
    /// # Errors
    ///
    /// Returns a config error if the selected provider cannot be initialized
    /// (missing API key for Gemini, HTTP client failure for local).
    pub fn from_config(config: &ServerConfig) -> Result<Self, AppError> {
        let provider = match config.llm.provider {
            LlmProviderType::Gemini => {
                let mut gemini = GeminiProvider::from_env()?;
                if let Some(model) = &config.llm.model {
                    gemini = gemini.with_default_model(model);
                }
                Self::Gemini(gemini)
            }
            LlmProviderType::Local => Self::Local(OpenAiCompatibleProvider::from_env()?),
        };

        info!(
            provider = provider.inner().name(),
            model = provider.inner().default_model(),
            "LLM provider initialized"
        );
        Ok(provider)
    }

    /// Access the provider through the common trait
    #[must_use]
    pub fn inner(&self) -> &dyn LlmProvider {
        match self {
            Self::Gemini(p) => p,
            Self::Local(p) => p,
        }
    }
}
