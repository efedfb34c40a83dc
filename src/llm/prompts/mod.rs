// ABOUTME: System and reformat prompts for the agent pipeline, loaded at compile time
// ABOUTME: Markdown files hold the static instructions; builders splice in runtime context
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ghiraas

//! # System Prompts
//!
//! Prompts are loaded at compile time from markdown files for easy
//! maintenance. Each domain handler gets a system prompt (used during the
//! tool loop) and a reformat prompt (used to turn the loop transcript into
//! the final `{text, data}` envelope).

/// Intent classification system prompt (one-word output: exercise/nutrition/other)
pub const INTENT_CLASSIFIER_PROMPT: &str = include_str!("intent_classifier.md");

/// Exercise coach system prompt for the tool loop
pub const EXERCISE_COACH_PROMPT: &str = include_str!("exercise_coach.md");

/// Nutrition coach system prompt for the tool loop
pub const NUTRITION_COACH_PROMPT: &str = include_str!("nutrition_coach.md");

/// General assistant system prompt for the tool loop
pub const GENERAL_ASSISTANT_PROMPT: &str = include_str!("general_assistant.md");

/// Brand recommendation prompt (standalone, no tool loop)
pub const BRAND_RECOMMENDER_PROMPT: &str = include_str!("brand_recommender.md");

/// Format the user id line appended to each handler's system prompt
fn user_id_line(user_id: Option<&str>) -> String {
    format!(
        "Here is the user_id you can use to get the user profile and preferences: {}",
        user_id.unwrap_or("No user_id provided")
    )
}

/// Complete exercise system prompt with user context
#[must_use]
pub fn exercise_system_prompt(user_id: Option<&str>) -> String {
    format!("{EXERCISE_COACH_PROMPT}\n{}", user_id_line(user_id))
}

/// Complete nutrition system prompt with user context
#[must_use]
pub fn nutrition_system_prompt(user_id: Option<&str>) -> String {
    format!("{NUTRITION_COACH_PROMPT}\n{}", user_id_line(user_id))
}

/// Complete general-assistant system prompt with user context
#[must_use]
pub fn general_system_prompt(user_id: Option<&str>) -> String {
    format!("{GENERAL_ASSISTANT_PROMPT}\n{}", user_id_line(user_id))
}

/// Complete brand recommendation prompt for a product query
#[must_use]
pub fn brand_recommendation_prompt(product: &str) -> String {
    format!("{BRAND_RECOMMENDER_PROMPT}\nProduct: {product}\n")
}

/// Reformat prompt for the exercise handler
///
/// Consumed by the structured-output pass: the model restates the tool-loop
/// transcript as a `{text, data}` envelope matching the workout plan schema.
#[must_use]
pub fn exercise_reformat_prompt(agent_response: &str) -> String {
    format!(
        "Based on the following agent response, create a structured output with:\n\
         1. text: Summary and explanation of the workout plan, don't include the workout ID (if any). Make sure to return the same text with no changes.\n\
         2. data: Complete workout plan in the workout plan format. If null, it means the request was about analyzing previous workouts OR providing insights.\n\
         \n\
         Agent response:\n\
         {agent_response}\n\
         \n\
         Create a comprehensive workout plan (ONLY IF REQUESTED AND DATA IS NOT NULL) with:\n\
         - Proper warm-up (5-10 minutes)\n\
         - Cardio component (15-20 minutes)\n\
         - Workout sessions covering major muscle groups\n\
         - Cool-down (5-10 minutes)\n\
         - Each exercise should have: name, sets, reps, rest time\n\
         - Use realistic exercise names and parameters\n"
    )
}

/// Reformat prompt for the nutrition handler
///
/// The nutrition path has no schema-constrained pass; the wire format is
/// spelled out verbatim and the reply goes through fence stripping and JSON
/// parsing. `today` is the plan start date in `YYYY-MM-DD`.
#[must_use]
pub fn nutrition_reformat_prompt(agent_response: &str, today: &str) -> String {
    format!(
        r#"Based on the following agent response, create a structured output with:
1. text: The text of advice or meal plan. Don't make it a summary, include all the details and explanations to return to the user.
2. data: Complete meal plan in the meal plan format (or null if this is a general question). If the data is a meal plan, structure it in this format:

IMPORTANT: Respond ONLY with valid JSON format. Do NOT include any markdown formatting, code blocks, or additional explanation. Do NOT wrap the response in ```json``` blocks.

{{"text": "<summary text>",
"data": {{
    "daily_calories_range": {{"min": <min calories>, "max": <max calories>}},
    "macronutrients_range": {{
        "protein": {{"min": <min grams>, "max": <max grams>}},
        "carbohydrates": {{"min": <min grams>, "max": <max grams>}},
        "fat": {{"min": <min grams>, "max": <max grams>}}
    }},
    "daily_meal_plans": [
        {{
        "day": 1,
        "date": "{today}",
        "breakfast": {{
            "description": "<meal description>",
            "ingredients": [
            {{"ingredient": "<ingredient>", "quantity": "<quantity>", "calories": <whole_number_calories>}}
            ],
            "total_calories": <whole_number_calories>,
            "recipe": "<detailed recipe with cooking time>",
            "suggested_brands": ["<UAE brands>"]
        }},
        "lunch": {{"description": "...", "ingredients": [...], "total_calories": <whole_number_calories>, "recipe": "...", "suggested_brands": [...]}},
        "dinner": {{"description": "...", "ingredients": [...], "total_calories": <whole_number_calories>, "recipe": "...", "suggested_brands": [...]}},
        "snacks": [
            {{"description": "...", "ingredients": [...], "total_calories": <whole_number_calories>, "recipe": "...", "suggested_brands": [...]}}
        ],
        "total_daily_calories": <whole_number_total>,
        "daily_macros": {{"protein": <grams>, "carbohydrates": <grams>, "fat": <grams>}}
        }}
    ],
    "total_days": <number_of_days>
}}}}

Agent response:
{agent_response}

If this is a meal plan request, create a comprehensive meal plan with:
- Daily calorie ranges
- Macronutrient breakdowns
- Daily meal plans with breakfast, lunch, dinner, and snacks
- Detailed recipes and brand recommendations
- Use realistic meal names and nutritional parameters

If this is a general nutrition question, set data to null and provide the answer in text.

Remember: Return ONLY the JSON object, no markdown formatting or explanation.
"#
    )
}

/// Reformat prompt for the general handler
#[must_use]
pub fn general_reformat_prompt(agent_response: &str) -> String {
    format!(
        "Based on the following agent response, create a structured output with:\n\
         1. text: The text to return to the user.\n\
         2. data: Make it null always, as this is a general question.\n\
         \n\
         Agent response:\n\
         {agent_response}\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifier_prompt_names_all_labels() {
        for label in ["exercise", "nutrition", "other"] {
            assert!(INTENT_CLASSIFIER_PROMPT.contains(label));
        }
    }

    #[test]
    fn test_system_prompt_user_id_line() {
        let with_id = exercise_system_prompt(Some("user-42"));
        assert!(with_id.ends_with("user-42"));

        let without = nutrition_system_prompt(None);
        assert!(without.ends_with("No user_id provided"));
    }

    #[test]
    fn test_brand_prompt_embeds_product() {
        let prompt = brand_recommendation_prompt("organic olive oil");
        assert!(prompt.ends_with("Product: organic olive oil\n"));
        assert!(prompt.contains("AED"));
    }

    #[test]
    fn test_nutrition_reformat_embeds_date_and_template() {
        let prompt = nutrition_reformat_prompt("transcript here", "2025-06-01");
        assert!(prompt.contains("\"date\": \"2025-06-01\""));
        assert!(prompt.contains("total_daily_calories"));
        assert!(prompt.contains("transcript here"));
        // No stray unexpanded format braces in the template
        assert!(!prompt.contains("{{"));
    }
}
