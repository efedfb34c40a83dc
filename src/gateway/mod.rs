// ABOUTME: Data gateway bundling the exercise catalog and the user data store
// ABOUTME: Defines the UserDataStore trait that coaching tools read through
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ghiraas

//! # Data Gateway
//!
//! Single access point for the data the coaching tools need:
//!
//! - [`ExerciseCatalog`]: read-only exercise dataset (embedded or file)
//! - [`UserDataStore`]: per-user profile, workout, sleep, and food documents
//!
//! Tools never touch storage directly; they go through [`DataGateway`] so a
//! future persistent backend only has to implement `UserDataStore`.

pub mod catalog;
pub mod memory;

pub use catalog::{CatalogFacts, ExerciseCatalog, ExerciseRecord};
pub use memory::InMemoryUserStore;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::ServerConfig;
use crate::errors::AppResult;

/// Default number of workouts/sleep sessions returned by history tools
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Default number of days returned by the food log tool
pub const DEFAULT_FOOD_LOG_DAYS: usize = 7;

/// Read access to per-user documents
///
/// Documents are schemaless JSON so the store does not have to chase the
/// mobile client's evolving field set. Ordering contracts:
/// workouts newest-first by `endTime`, sleep sessions newest-first by
/// `createdAt`, food log grouped by `createdAt` date with the newest date
/// first. Sleep documents carry their duration in a `durationHours` field.
#[async_trait]
pub trait UserDataStore: Send + Sync {
    /// The user's profile document, or `None` if unknown
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store fails.
    async fn get_user_profile(&self, user_id: &str) -> AppResult<Option<Value>>;

    /// Most recent completed workouts, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store fails.
    async fn get_recent_workouts(&self, user_id: &str, limit: usize) -> AppResult<Vec<Value>>;

    /// Most recent sleep sessions, newest first, with duration normalized
    /// to hours (`durationHours`)
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store fails.
    async fn get_sleep_sessions(&self, user_id: &str, limit: usize) -> AppResult<Vec<Value>>;

    /// Food log entries grouped by day (`YYYY-MM-DD`), covering at most
    /// `limit_days` of the most recent days. The returned pairs are ordered
    /// newest date first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store fails.
    async fn get_food_log_by_days(
        &self,
        user_id: &str,
        limit_days: usize,
    ) -> AppResult<Vec<(String, Vec<Value>)>>;
}

/// Bundle of data sources shared by all tools
#[derive(Clone)]
pub struct DataGateway {
    /// Exercise catalog
    pub catalog: Arc<ExerciseCatalog>,
    /// User document store
    pub users: Arc<dyn UserDataStore>,
}

impl DataGateway {
    /// Build the gateway from server configuration
    ///
    /// # Errors
    ///
    /// Returns a config error if the exercise dataset or user seed file
    /// cannot be loaded.
    pub fn from_config(config: &ServerConfig) -> AppResult<Self> {
        let catalog = ExerciseCatalog::from_path_or_embedded(config.data.exercise_data_path.as_deref())?;
        let users = InMemoryUserStore::from_path(config.data.user_seed_path.as_deref())?;
        Ok(Self {
            catalog: Arc::new(catalog),
            users: Arc::new(users),
        })
    }

    /// Build a gateway around explicit components (tests and demos)
    #[must_use]
    pub fn new(catalog: Arc<ExerciseCatalog>, users: Arc<dyn UserDataStore>) -> Self {
        Self { catalog, users }
    }
}

impl std::fmt::Debug for DataGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataGateway")
            .field("catalog_len", &self.catalog.len())
            .field("users", &"<dyn UserDataStore>")
            .finish()
    }
}
