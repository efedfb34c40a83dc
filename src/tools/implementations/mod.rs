// ABOUTME: Concrete tool implementations exposed to the LLM during the tool loop
// ABOUTME: Catalog lookups plus per-user profile and history readers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ghiraas

pub mod catalog;
pub mod history;
pub mod profile;

pub use catalog::{GetExerciseByTargetTool, ListAvailableFactsTool};
pub use history::{GetFoodLogByDaysTool, GetRecentWorkoutsTool, GetSleepSessionsTool};
pub use profile::GetUserProfileTool;
