// ABOUTME: Domain models for agent responses, workout plans, and meal plans
// ABOUTME: Enforces whole-number calorie invariants and calorie-sum consistency
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ghiraas

//! # Domain Models
//!
//! Typed schemas for the structured data the agents produce:
//!
//! - [`AgentResponse`]: the uniform `{text, data}` envelope every request
//!   resolves to
//! - [`WorkoutPlan`]: strict-typed exercise plan (validated, violations are
//!   reported to the caller)
//! - [`MealPlan`]: nutrition plan (loosely coerced on the wire, rebalanced
//!   here so calorie sums actually hold)
//!
//! All calorie/macro numerics deserialize through [`de_whole_number`]: models
//! frequently emit `187.5` where the schema says integer, and the contract is
//! to round, never truncate.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::errors::{AppError, AppResult};

// ============================================================================
// Intent
// ============================================================================

/// Coarse category a user request is routed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    /// Workout plans, exercise questions, training analysis
    Exercise,
    /// Meal plans, diet questions, food log analysis
    Nutrition,
    /// Anything else fitness-adjacent (handled by the general assistant)
    Other,
}

impl Intent {
    /// Parse a classifier label.
    ///
    /// Returns `None` for anything outside the contract's label set; the
    /// caller must reject the request rather than guess an intent.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "exercise" => Some(Self::Exercise),
            "nutrition" => Some(Self::Nutrition),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    /// Label string as the classifier prompt uses it
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Exercise => "exercise",
            Self::Nutrition => "nutrition",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Response Envelope
// ============================================================================

/// Uniform response envelope returned by every agent request.
///
/// Invariant: when `data` is present it satisfies the domain schema for the
/// request's intent. The [`crate::agents::normalize`] module is the only
/// place allowed to construct this from untrusted handler output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResponse {
    /// Explanatory text for the user
    pub text: String,
    /// Structured plan data, or null for informational/analytical answers
    pub data: Option<Map<String, Value>>,
}

impl AgentResponse {
    /// Create a text-only response
    #[must_use]
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            data: None,
        }
    }
}

// ============================================================================
// Numeric normalization
// ============================================================================

/// Deserialize a numeric field that must end up a whole number.
///
/// Accepts integers as-is; fractional values are rounded (not truncated).
///
/// # Errors
///
/// Returns a deserialization error for non-numeric input.
pub fn de_whole_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    Ok(round_whole(raw))
}

/// Round a calorie/macro value to a whole number. Idempotent on integers.
#[must_use]
pub fn round_whole(value: f64) -> i64 {
    value.round() as i64
}

/// Round every calorie/macro field in a loose meal-plan JSON value in place.
///
/// Best-effort coercion for the loosely-typed nutrition path: walks the known
/// numeric field names and rounds fractional values. Unknown shapes are left
/// untouched rather than rejected.
pub fn round_nutrition_numbers(value: &mut Value) {
    const NUMERIC_FIELDS: &[&str] = &[
        "calories",
        "total_calories",
        "total_daily_calories",
        "protein",
        "carbohydrates",
        "fat",
        "min",
        "max",
        "total_days",
        "day",
    ];

    match value {
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                if NUMERIC_FIELDS.contains(&key.as_str()) {
                    if let Some(n) = child.as_f64() {
                        *child = Value::from(round_whole(n));
                        continue;
                    }
                }
                round_nutrition_numbers(child);
            }
        }
        Value::Array(items) => {
            for item in items {
                round_nutrition_numbers(item);
            }
        }
        _ => {}
    }
}

// ============================================================================
// Workout Plan (strict-typed)
// ============================================================================

/// A warmup, cardio, or cooldown block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutBlock {
    /// What to do
    pub description: String,
    /// Duration in minutes
    #[serde(deserialize_with = "de_whole_number")]
    pub duration: i64,
}

/// A single exercise within a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    /// Catalog identifier; never fabricated, always resolved via tools
    pub exercise_id: String,
    /// Exercise name
    pub name: String,
    /// Number of sets
    #[serde(deserialize_with = "de_whole_number")]
    pub sets: i64,
    /// Repetitions; a string so ranges like "8-12" or "as many as possible" fit
    pub reps: String,
    /// Rest time in seconds
    #[serde(deserialize_with = "de_whole_number")]
    pub rest: i64,
}

/// One workout session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutSession {
    /// Ordered exercises for this session
    pub exercises: Vec<Exercise>,
}

/// A complete workout plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutPlan {
    /// Warmup block (typically 5-10 minutes)
    pub warmup: WorkoutBlock,
    /// Cardio block (typically 15-20 minutes)
    pub cardio: WorkoutBlock,
    /// Sessions per week
    #[serde(deserialize_with = "de_whole_number")]
    pub sessions_per_week: i64,
    /// Ordered workout sessions
    pub workout_sessions: Vec<WorkoutSession>,
    /// Cooldown block (typically 5-10 minutes)
    pub cooldown: WorkoutBlock,
}

impl WorkoutPlan {
    /// Validate schema invariants the type system cannot express.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidFormat` error naming the first violated invariant.
    pub fn validate(&self) -> AppResult<()> {
        if self.workout_sessions.is_empty() {
            return Err(AppError::invalid_format(
                "workout plan has no workout sessions",
            ));
        }
        if self.sessions_per_week < 1 {
            return Err(AppError::invalid_format(
                "sessions_per_week must be at least 1",
            ));
        }
        for (i, session) in self.workout_sessions.iter().enumerate() {
            if session.exercises.is_empty() {
                return Err(AppError::invalid_format(format!(
                    "workout session {} has no exercises",
                    i + 1
                )));
            }
            for exercise in &session.exercises {
                if exercise.rest < 0 {
                    return Err(AppError::invalid_format(format!(
                        "exercise '{}' has negative rest time",
                        exercise.name
                    )));
                }
                if exercise.sets < 1 {
                    return Err(AppError::invalid_format(format!(
                        "exercise '{}' has no sets",
                        exercise.name
                    )));
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// Meal Plan
// ============================================================================

/// A min/max range (calories or grams)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericRange {
    /// Lower bound
    #[serde(deserialize_with = "de_whole_number")]
    pub min: i64,
    /// Upper bound
    #[serde(deserialize_with = "de_whole_number")]
    pub max: i64,
}

/// Macronutrient ranges in grams
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacronutrientRanges {
    /// Protein range
    pub protein: NumericRange,
    /// Carbohydrate range
    pub carbohydrates: NumericRange,
    /// Fat range
    pub fat: NumericRange,
}

/// Daily macro totals in grams
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacroSplit {
    /// Protein in grams
    #[serde(deserialize_with = "de_whole_number")]
    pub protein: i64,
    /// Carbohydrates in grams
    #[serde(deserialize_with = "de_whole_number")]
    pub carbohydrates: i64,
    /// Fat in grams
    #[serde(deserialize_with = "de_whole_number")]
    pub fat: i64,
}

/// A single ingredient with its calorie contribution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ingredient {
    /// Ingredient name
    pub ingredient: String,
    /// Quantity, free-form ("100g", "1 cup")
    pub quantity: String,
    /// Calories, whole number
    #[serde(deserialize_with = "de_whole_number")]
    pub calories: i64,
}

/// One meal option (breakfast, lunch, dinner, or a snack)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealOption {
    /// Meal description
    pub description: String,
    /// Ingredients with calorie breakdown
    pub ingredients: Vec<Ingredient>,
    /// Total calories; rebalanced to the ingredient sum
    #[serde(deserialize_with = "de_whole_number")]
    pub total_calories: i64,
    /// Detailed recipe with cooking time
    pub recipe: String,
    /// Locally available brand suggestions
    #[serde(default)]
    pub suggested_brands: Vec<String>,
}

impl MealOption {
    /// Sum of ingredient calories
    #[must_use]
    pub fn ingredient_calories(&self) -> i64 {
        self.ingredients.iter().map(|i| i.calories).sum()
    }
}

/// One day of the meal plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyMealPlan {
    /// Day number (1-based)
    #[serde(deserialize_with = "de_whole_number")]
    pub day: i64,
    /// Date in YYYY-MM-DD format
    pub date: String,
    /// Breakfast
    pub breakfast: MealOption,
    /// Lunch
    pub lunch: MealOption,
    /// Dinner
    pub dinner: MealOption,
    /// Snacks, zero or more
    #[serde(default)]
    pub snacks: Vec<MealOption>,
    /// Total calories for the day; rebalanced to the meal sum
    #[serde(deserialize_with = "de_whole_number")]
    pub total_daily_calories: i64,
    /// Daily macro totals
    pub daily_macros: MacroSplit,
}

/// A complete meal plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealPlan {
    /// Daily calorie range
    pub daily_calories_range: NumericRange,
    /// Macro ranges
    pub macronutrients_range: MacronutrientRanges,
    /// Ordered daily plans
    pub daily_meal_plans: Vec<DailyMealPlan>,
    /// Number of days covered
    #[serde(deserialize_with = "de_whole_number")]
    pub total_days: i64,
}

impl MealPlan {
    /// Enforce the calorie-sum invariants by rebalancing.
    ///
    /// Prompts ask the model for consistent sums, but that is unreliable, so
    /// totals are recomputed here: a meal's `total_calories` becomes the sum
    /// of its ingredient calories, and a day's `total_daily_calories` becomes
    /// the sum of its meals and snacks.
    pub fn rebalance(&mut self) {
        for day in &mut self.daily_meal_plans {
            for meal in [&mut day.breakfast, &mut day.lunch, &mut day.dinner] {
                meal.total_calories = meal.ingredient_calories();
            }
            let mut snack_total = 0;
            for snack in &mut day.snacks {
                snack.total_calories = snack.ingredient_calories();
                snack_total += snack.total_calories;
            }
            day.total_daily_calories = day.breakfast.total_calories
                + day.lunch.total_calories
                + day.dinner.total_calories
                + snack_total;
        }
    }
}

// ============================================================================
// Brand Recommendations
// ============================================================================

/// A recommended product brand
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brand {
    /// Brand name
    pub name: String,
    /// Typical retail price in AED
    pub price: f64,
    /// Free-form sustainability rating ("Excellent", "Good", ...)
    pub sustainability_rating: String,
    /// Why this brand fits the product and the sustainability focus
    pub description: String,
}

/// Brand recommendations for one product query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendedBrands {
    /// Recommended brands, best match first
    pub brands: Vec<Brand>,
}

// ============================================================================
// User Profile
// ============================================================================

/// User profile as stored in the document store (metric units)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// Weight in kilograms
    pub weight: f64,
    /// Height in centimeters
    pub height: f64,
    /// Age in years
    pub age: u32,
    /// "male" or "female"
    pub sex: String,
    /// Goal: bulking, shredding, fat loss, muscle building
    pub goal: String,
    /// e.g. ["vegetarian", "high protein"]
    #[serde(default)]
    pub dietary_preferences: Option<Vec<String>>,
    /// e.g. ["dairy", "gluten"]
    #[serde(default)]
    pub food_intolerance: Option<Vec<String>>,
}

// ============================================================================
// Structured-output schemas
// ============================================================================

/// Response schema for the exercise reformat pass (`{text, data: WorkoutPlan|null}`).
///
/// JSON Schema subset accepted by Gemini's `responseSchema` generation config.
#[must_use]
pub fn workout_response_schema() -> Value {
    let block = serde_json::json!({
        "type": "object",
        "properties": {
            "description": {"type": "string"},
            "duration": {"type": "integer"}
        },
        "required": ["description", "duration"]
    });

    serde_json::json!({
        "type": "object",
        "properties": {
            "text": {"type": "string"},
            "data": {
                "type": "object",
                "nullable": true,
                "properties": {
                    "warmup": block,
                    "cardio": block,
                    "sessions_per_week": {"type": "integer"},
                    "workout_sessions": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "exercises": {
                                    "type": "array",
                                    "items": {
                                        "type": "object",
                                        "properties": {
                                            "exercise_id": {"type": "string"},
                                            "name": {"type": "string"},
                                            "sets": {"type": "integer"},
                                            "reps": {"type": "string"},
                                            "rest": {"type": "integer"}
                                        },
                                        "required": ["exercise_id", "name", "sets", "reps", "rest"]
                                    }
                                }
                            },
                            "required": ["exercises"]
                        }
                    },
                    "cooldown": block
                },
                "required": [
                    "warmup", "cardio", "sessions_per_week",
                    "workout_sessions", "cooldown"
                ]
            }
        },
        "required": ["text"]
    })
}

/// Response schema for the brand recommendation pass (`{brands: [...]}`)
#[must_use]
pub fn brand_response_schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "brands": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": {"type": "string"},
                        "price": {"type": "number"},
                        "sustainability_rating": {"type": "string"},
                        "description": {"type": "string"}
                    },
                    "required": ["name", "price", "sustainability_rating", "description"]
                }
            }
        },
        "required": ["brands"]
    })
}

/// Response schema for the general reformat pass (`{text, data: null}`)
#[must_use]
pub fn general_response_schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "text": {"type": "string"},
            "data": {"type": "object", "nullable": true}
        },
        "required": ["text"]
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_intent_labels() {
        assert_eq!(Intent::from_label(" Exercise \n"), Some(Intent::Exercise));
        assert_eq!(Intent::from_label("nutrition"), Some(Intent::Nutrition));
        assert_eq!(Intent::from_label("other"), Some(Intent::Other));
        assert_eq!(Intent::from_label("weather"), None);
        assert_eq!(Intent::from_label(""), None);
    }

    #[test]
    fn test_round_whole_rounds_not_truncates() {
        assert_eq!(round_whole(187.5), 188);
        assert_eq!(round_whole(187.4), 187);
        assert_eq!(round_whole(200.0), 200);
        // Idempotent: rounding an already-whole value is a no-op
        assert_eq!(round_whole(round_whole(187.5) as f64), 188);
    }

    #[test]
    fn test_de_whole_number_in_struct() {
        let ingredient: Ingredient = serde_json::from_value(serde_json::json!({
            "ingredient": "oats",
            "quantity": "80g",
            "calories": 303.6
        }))
        .unwrap();
        assert_eq!(ingredient.calories, 304);
    }

    #[test]
    fn test_round_nutrition_numbers_walks_nested() {
        let mut value = serde_json::json!({
            "daily_calories_range": {"min": 1800.2, "max": 2200.7},
            "daily_meal_plans": [{
                "breakfast": {
                    "ingredients": [{"ingredient": "egg", "quantity": "2", "calories": 155.4}],
                    "total_calories": 155.4
                },
                "daily_macros": {"protein": 120.5, "carbohydrates": 200.0, "fat": 60.2}
            }]
        });
        round_nutrition_numbers(&mut value);
        assert_eq!(value["daily_calories_range"]["max"], 2201);
        assert_eq!(
            value["daily_meal_plans"][0]["breakfast"]["ingredients"][0]["calories"],
            155
        );
        assert_eq!(value["daily_meal_plans"][0]["daily_macros"]["protein"], 121);
    }

    #[test]
    fn test_workout_plan_validation() {
        let plan = WorkoutPlan {
            warmup: WorkoutBlock {
                description: "jumping jacks".into(),
                duration: 5,
            },
            cardio: WorkoutBlock {
                description: "rowing".into(),
                duration: 15,
            },
            sessions_per_week: 3,
            workout_sessions: vec![],
            cooldown: WorkoutBlock {
                description: "stretching".into(),
                duration: 5,
            },
        };
        assert!(plan.validate().is_err());
    }

    fn meal(calories: &[i64], stale_total: i64) -> MealOption {
        MealOption {
            description: "meal".into(),
            ingredients: calories
                .iter()
                .map(|c| Ingredient {
                    ingredient: "x".into(),
                    quantity: "1".into(),
                    calories: *c,
                })
                .collect(),
            total_calories: stale_total,
            recipe: "mix".into(),
            suggested_brands: vec![],
        }
    }

    #[test]
    fn test_meal_plan_rebalance() {
        let mut plan = MealPlan {
            daily_calories_range: NumericRange {
                min: 1800,
                max: 2200,
            },
            macronutrients_range: MacronutrientRanges {
                protein: NumericRange { min: 100, max: 140 },
                carbohydrates: NumericRange { min: 180, max: 240 },
                fat: NumericRange { min: 50, max: 70 },
            },
            daily_meal_plans: vec![DailyMealPlan {
                day: 1,
                date: "2025-01-01".into(),
                breakfast: meal(&[200, 150], 999),
                lunch: meal(&[400], 400),
                dinner: meal(&[300, 300], 0),
                snacks: vec![meal(&[120], 500)],
                total_daily_calories: 42,
                daily_macros: MacroSplit {
                    protein: 120,
                    carbohydrates: 200,
                    fat: 60,
                },
            }],
            total_days: 1,
        };

        plan.rebalance();

        let day = &plan.daily_meal_plans[0];
        assert_eq!(day.breakfast.total_calories, 350);
        assert_eq!(day.snacks[0].total_calories, 120);
        // 350 + 400 + 600 + 120
        assert_eq!(day.total_daily_calories, 1470);
    }
}
