// ABOUTME: In-memory user data store seeded from an optional JSON file
// ABOUTME: Backs the profile, workout history, sleep, and food log tools
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ghiraas

//! # In-Memory User Store
//!
//! Holds per-user documents the coaching tools read: profile, completed
//! workouts, sleep sessions, and food log entries. Documents are schemaless
//! JSON; the store only cares about the timestamp fields used for ordering
//! (`endTime` for workouts, `createdAt` for sleep and food entries) and the
//! sleep duration fields (`durationSeconds`/`durationMinutes`, converted to
//! `durationHours` at load time).
//!
//! A seed file can be supplied via `GHIRAAS_USER_SEED_DATA`:
//!
//! ```json
//! {
//!   "users": {
//!     "user-1": {
//!       "profile": { "age": 30, "weight_kg": 72.5 },
//!       "workouts": [ { "endTime": "2025-09-07T21:46:08", "name": "Push day" } ],
//!       "sleep_sessions": [ { "createdAt": "2025-09-08T06:30:00", "durationMinutes": 450 } ],
//!       "food_entries": [ { "createdAt": "2025-09-08T08:00:00", "name": "Oats" } ]
//!     }
//!   }
//! }
//! ```

use std::collections::HashMap;
use std::fs;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::{AppError, AppResult};

use super::UserDataStore;

/// Seed file root
#[derive(Debug, Default, Deserialize)]
struct SeedFile {
    #[serde(default)]
    users: HashMap<String, SeedUser>,
}

/// Per-user seed data
#[derive(Debug, Default, Deserialize)]
struct SeedUser {
    #[serde(default)]
    profile: Option<Value>,
    #[serde(default)]
    workouts: Vec<Value>,
    #[serde(default)]
    sleep_sessions: Vec<Value>,
    #[serde(default)]
    food_entries: Vec<Value>,
}

/// All documents for one user
#[derive(Debug, Default, Clone)]
struct UserRecord {
    profile: Option<Value>,
    workouts: Vec<Value>,
    sleep_sessions: Vec<Value>,
    food_entries: Vec<Value>,
}

impl UserRecord {
    /// Sort newest first and normalize sleep durations once, so reads are a
    /// plain slice take
    fn finalize(&mut self) {
        self.workouts
            .sort_by(|a, b| timestamp_of(b, "endTime").cmp(&timestamp_of(a, "endTime")));
        self.sleep_sessions
            .sort_by(|a, b| timestamp_of(b, "createdAt").cmp(&timestamp_of(a, "createdAt")));
        self.food_entries
            .sort_by(|a, b| timestamp_of(b, "createdAt").cmp(&timestamp_of(a, "createdAt")));
        for session in &mut self.sleep_sessions {
            normalize_sleep_duration(session);
        }
    }
}

/// Convert a sleep document's duration to hours in `durationHours`.
///
/// Source documents come from the mobile client and may record the duration
/// in seconds or minutes; tools always see hours. An existing
/// `durationHours` field wins over the raw fields.
fn normalize_sleep_duration(doc: &mut Value) {
    let Some(obj) = doc.as_object_mut() else {
        return;
    };
    if obj.contains_key("durationHours") {
        obj.remove("durationSeconds");
        obj.remove("durationMinutes");
        return;
    }

    let hours = if let Some(minutes) = obj.get("durationMinutes").and_then(Value::as_f64) {
        Some(minutes / 60.0)
    } else {
        obj.get("durationSeconds")
            .and_then(Value::as_f64)
            .map(|seconds| seconds / 3600.0)
    };

    if let Some(hours) = hours {
        obj.remove("durationSeconds");
        obj.remove("durationMinutes");
        obj.insert(
            "durationHours".to_owned(),
            Value::from((hours * 100.0).round() / 100.0),
        );
    }
}

/// In-memory implementation of [`UserDataStore`]
///
/// Built once at startup; reads are lock-free because the store is immutable
/// after construction.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: HashMap<String, UserRecord>,
}

/// Extract a sortable timestamp string from a document field
fn timestamp_of(doc: &Value, field: &str) -> String {
    doc.get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned()
}

/// Date prefix (`YYYY-MM-DD`) of an ISO timestamp field, if present
fn date_of(doc: &Value, field: &str) -> Option<String> {
    doc.get(field)
        .and_then(Value::as_str)
        .filter(|s| s.len() >= 10)
        .map(|s| s[..10].to_owned())
}

impl InMemoryUserStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store from an optional seed file path
    ///
    /// With no path configured, the store starts empty and tools report
    /// users as not found.
    ///
    /// # Errors
    ///
    /// Returns a config error if the seed file cannot be read or parsed.
    pub fn from_path(path: Option<&str>) -> AppResult<Self> {
        let Some(path) = path else {
            warn!("No user seed data configured, user store starts empty");
            return Ok(Self::new());
        };

        let json = fs::read_to_string(path)
            .map_err(|e| AppError::config(format!("Cannot read user seed data {path}: {e}")))?;
        let seed: SeedFile = serde_json::from_str(&json)
            .map_err(|e| AppError::config(format!("Invalid user seed data {path}: {e}")))?;

        let store = Self::from_seed(seed);
        info!(path, users = store.users.len(), "Loaded user seed data");
        Ok(store)
    }

    fn from_seed(seed: SeedFile) -> Self {
        let users = seed
            .users
            .into_iter()
            .map(|(id, user)| {
                let mut record = UserRecord {
                    profile: user.profile,
                    workouts: user.workouts,
                    sleep_sessions: user.sleep_sessions,
                    food_entries: user.food_entries,
                };
                record.finalize();
                (id, record)
            })
            .collect();
        Self { users }
    }

    /// Seed a single user programmatically (used by tests and demos)
    pub fn insert_user(
        &mut self,
        user_id: impl Into<String>,
        profile: Value,
        workouts: Vec<Value>,
        sleep_sessions: Vec<Value>,
        food_entries: Vec<Value>,
    ) {
        let mut record = UserRecord {
            profile: Some(profile),
            workouts,
            sleep_sessions,
            food_entries,
        };
        record.finalize();
        self.users.insert(user_id.into(), record);
    }
}

#[async_trait]
impl UserDataStore for InMemoryUserStore {
    async fn get_user_profile(&self, user_id: &str) -> AppResult<Option<Value>> {
        Ok(self
            .users
            .get(user_id)
            .and_then(|record| record.profile.clone())
            .map(|mut profile| {
                if let Some(obj) = profile.as_object_mut() {
                    obj.insert("user_id".to_owned(), Value::String(user_id.to_owned()));
                }
                profile
            }))
    }

    async fn get_recent_workouts(&self, user_id: &str, limit: usize) -> AppResult<Vec<Value>> {
        Ok(self
            .users
            .get(user_id)
            .map(|record| record.workouts.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn get_sleep_sessions(&self, user_id: &str, limit: usize) -> AppResult<Vec<Value>> {
        Ok(self
            .users
            .get(user_id)
            .map(|record| record.sleep_sessions.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn get_food_log_by_days(
        &self,
        user_id: &str,
        limit_days: usize,
    ) -> AppResult<Vec<(String, Vec<Value>)>> {
        let Some(record) = self.users.get(user_id) else {
            return Ok(Vec::new());
        };

        // Entries are newest-first, so days fill in reverse chronological
        // order and the returned pairs keep that ordering
        let mut by_day: Vec<(String, Vec<Value>)> = Vec::new();
        for entry in &record.food_entries {
            let Some(day) = date_of(entry, "createdAt") else {
                continue;
            };
            if let Some((_, entries)) = by_day.iter_mut().find(|(d, _)| *d == day) {
                entries.push(entry.clone());
            } else if by_day.len() < limit_days {
                by_day.push((day, vec![entry.clone()]));
            }
        }
        Ok(by_day)
    }
}
