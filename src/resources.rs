// ABOUTME: ServerResources dependency container built once at startup
// ABOUTME: Holds the LLM provider, tool registry, data gateway, and configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ghiraas

//! # Server Resources
//!
//! All shared state lives here, constructed once in the binary and passed as
//! `Arc<ServerResources>` through axum state. No lazy statics: everything a
//! request needs is visible at construction time, which keeps tests able to
//! swap in fakes.

use std::sync::Arc;

use tracing::info;

use crate::config::ServerConfig;
use crate::errors::AppResult;
use crate::gateway::DataGateway;
use crate::llm::ChatProvider;
use crate::tools::ToolRegistry;

/// Container for all shared server dependencies
pub struct ServerResources {
    /// The configured completion backend
    pub provider: ChatProvider,
    /// Registered agent tools
    pub registry: ToolRegistry,
    /// Exercise catalog and user document store
    pub gateway: DataGateway,
    /// Server configuration
    pub config: ServerConfig,
}

impl ServerResources {
    /// Build all resources from configuration
    ///
    /// # Errors
    ///
    /// Returns a config error if the provider, catalog, or user store cannot
    /// be initialized.
    pub fn from_config(config: ServerConfig) -> AppResult<Arc<Self>> {
        let provider = ChatProvider::from_config(&config)?;
        let gateway = DataGateway::from_config(&config)?;
        let registry = ToolRegistry::with_builtin_tools();

        info!(
            tools = registry.len(),
            exercises = gateway.catalog.len(),
            "Server resources initialized"
        );

        Ok(Arc::new(Self {
            provider,
            registry,
            gateway,
            config,
        }))
    }

    /// Build resources around explicit components (tests and demos)
    #[must_use]
    pub fn new(
        provider: ChatProvider,
        registry: ToolRegistry,
        gateway: DataGateway,
        config: ServerConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            provider,
            registry,
            gateway,
            config,
        })
    }
}

impl std::fmt::Debug for ServerResources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerResources")
            .field("provider", &self.provider)
            .field("registry", &self.registry)
            .field("gateway", &self.gateway)
            .field("config", &self.config)
            .finish()
    }
}
