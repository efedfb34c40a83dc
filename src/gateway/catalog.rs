// ABOUTME: Read-only exercise catalog backing the coaching tools
// ABOUTME: Loads an embedded dataset by default or a JSON file from configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ghiraas

//! # Exercise Catalog
//!
//! The catalog is the source of truth for exercise names and IDs. The
//! exercise coach is instructed to never invent exercises; everything it
//! plans must come from here.
//!
//! The dataset ships embedded in the binary. Operators can override it with
//! `GHIRAAS_EXERCISE_DATA` pointing at a JSON file in the same shape.

use std::collections::{BTreeSet, HashMap};
use std::fs;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::errors::{AppError, AppResult};

/// Embedded default dataset
const EMBEDDED_EXERCISES: &str = include_str!("exercises.json");

/// Maximum number of exercises returned per target-muscle lookup
const MAX_EXERCISES_PER_TARGET: usize = 20;

/// A single exercise record from the dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseRecord {
    /// Stable identifier referenced by workout plans
    pub exercise_id: String,
    /// Exercise name
    pub name: String,
    /// Demo animation URL
    #[serde(default)]
    pub gif_url: Option<String>,
    /// Primary muscles worked
    pub target_muscles: Vec<String>,
    /// Body parts involved
    pub body_parts: Vec<String>,
    /// Equipment needed
    pub equipments: Vec<String>,
    /// Secondary muscles worked
    #[serde(default)]
    pub secondary_muscles: Vec<String>,
    /// Step-by-step instructions
    #[serde(default)]
    pub instructions: Vec<String>,
}

/// Distinct facts across the dataset, lowercased
///
/// `BTreeSet` keeps the listing deterministic for prompts and tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogFacts {
    /// All target muscles
    pub target_muscles: BTreeSet<String>,
    /// All equipment types
    pub equipment: BTreeSet<String>,
    /// All body parts
    pub body_parts: BTreeSet<String>,
}

/// In-memory exercise catalog with id and target-muscle lookups
#[derive(Debug)]
pub struct ExerciseCatalog {
    exercises: Vec<ExerciseRecord>,
    by_id: HashMap<String, usize>,
}

impl ExerciseCatalog {
    /// Build a catalog from a JSON array of exercise records
    ///
    /// # Errors
    ///
    /// Returns a config error if the JSON does not parse as an exercise list.
    pub fn from_json(json: &str) -> AppResult<Self> {
        let exercises: Vec<ExerciseRecord> = serde_json::from_str(json)
            .map_err(|e| AppError::config(format!("Invalid exercise dataset: {e}")))?;

        let by_id = exercises
            .iter()
            .enumerate()
            .map(|(i, ex)| (ex.exercise_id.clone(), i))
            .collect();

        Ok(Self { exercises, by_id })
    }

    /// Build the catalog from the embedded dataset
    ///
    /// # Errors
    ///
    /// Returns a config error if the embedded dataset is malformed, which
    /// indicates a packaging problem.
    pub fn embedded() -> AppResult<Self> {
        Self::from_json(EMBEDDED_EXERCISES)
    }

    /// Build the catalog from an optional override path
    ///
    /// Falls back to the embedded dataset when no path is configured.
    ///
    /// # Errors
    ///
    /// Returns a config error if the file cannot be read or parsed.
    pub fn from_path_or_embedded(path: Option<&str>) -> AppResult<Self> {
        let catalog = match path {
            Some(path) => {
                let json = fs::read_to_string(path).map_err(|e| {
                    AppError::config(format!("Cannot read exercise dataset {path}: {e}"))
                })?;
                let catalog = Self::from_json(&json)?;
                info!(path, exercises = catalog.len(), "Loaded exercise dataset");
                catalog
            }
            None => {
                let catalog = Self::embedded()?;
                info!(exercises = catalog.len(), "Using embedded exercise dataset");
                catalog
            }
        };
        Ok(catalog)
    }

    /// Number of exercises in the catalog
    #[must_use]
    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    /// Whether the catalog is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    /// Distinct target muscles, equipment, and body parts, lowercased
    #[must_use]
    pub fn list_facts(&self) -> CatalogFacts {
        let mut target_muscles = BTreeSet::new();
        let mut equipment = BTreeSet::new();
        let mut body_parts = BTreeSet::new();

        for exercise in &self.exercises {
            target_muscles.extend(exercise.target_muscles.iter().map(|s| s.to_lowercase()));
            equipment.extend(exercise.equipments.iter().map(|s| s.to_lowercase()));
            body_parts.extend(exercise.body_parts.iter().map(|s| s.to_lowercase()));
        }

        CatalogFacts {
            target_muscles,
            equipment,
            body_parts,
        }
    }

    /// Exercises whose target muscles include the given muscle
    /// (case-insensitive), capped at [`MAX_EXERCISES_PER_TARGET`]
    #[must_use]
    pub fn get_exercises_by_target(&self, target_muscle: &str) -> Vec<&ExerciseRecord> {
        let target = target_muscle.to_lowercase();
        self.exercises
            .iter()
            .filter(|ex| {
                ex.target_muscles
                    .iter()
                    .any(|tm| tm.to_lowercase() == target)
            })
            .take(MAX_EXERCISES_PER_TARGET)
            .collect()
    }

    /// Look up an exercise by its stable identifier
    #[must_use]
    pub fn get_exercise_by_id(&self, exercise_id: &str) -> Option<&ExerciseRecord> {
        self.by_id
            .get(exercise_id)
            .and_then(|&i| self.exercises.get(i))
    }

    /// Exercises by target as a JSON value, ready for a tool payload
    ///
    /// # Errors
    ///
    /// Returns a serialization error if a record cannot be converted.
    pub fn exercises_by_target_json(&self, target_muscle: &str) -> AppResult<Value> {
        serde_json::to_value(self.get_exercises_by_target(target_muscle)).map_err(AppError::from)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_embedded_dataset_parses() {
        let catalog = ExerciseCatalog::embedded().unwrap();
        assert!(!catalog.is_empty());
    }

    #[test]
    fn test_list_facts_lowercased_and_sorted() {
        let catalog = ExerciseCatalog::embedded().unwrap();
        let facts = catalog.list_facts();
        assert!(facts.target_muscles.contains("pectorals"));
        assert!(facts.equipment.contains("barbell"));
        assert!(facts.body_parts.contains("chest"));
        for muscle in &facts.target_muscles {
            assert_eq!(muscle, &muscle.to_lowercase());
        }
    }

    #[test]
    fn test_target_lookup_case_insensitive() {
        let catalog = ExerciseCatalog::embedded().unwrap();
        let upper = catalog.get_exercises_by_target("PECTORALS");
        let lower = catalog.get_exercises_by_target("pectorals");
        assert!(!lower.is_empty());
        assert_eq!(upper.len(), lower.len());
    }

    #[test]
    fn test_target_lookup_capped() {
        let records: Vec<Value> = (0..30)
            .map(|i| {
                serde_json::json!({
                    "exerciseId": format!("{i:04}"),
                    "name": format!("exercise {i}"),
                    "targetMuscles": ["abs"],
                    "bodyParts": ["waist"],
                    "equipments": ["body weight"]
                })
            })
            .collect();
        let json = serde_json::to_string(&records).unwrap();
        let catalog = ExerciseCatalog::from_json(&json).unwrap();
        assert_eq!(catalog.get_exercises_by_target("abs").len(), 20);
    }

    #[test]
    fn test_lookup_by_id() {
        let catalog = ExerciseCatalog::embedded().unwrap();
        let exercise = catalog.get_exercise_by_id("0001").unwrap();
        assert_eq!(exercise.name, "barbell bench press");
        assert!(catalog.get_exercise_by_id("nope").is_none());
    }
}
