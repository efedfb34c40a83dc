// ABOUTME: Response normalization: reconciles handler outcomes into the {text, data} envelope
// ABOUTME: The data slot is a JSON object or null, never a string or scalar
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ghiraas

//! # Response Normalizer
//!
//! Every domain handler finishes with a [`HandlerOutcome`]; this module is
//! the only consumer. It guarantees the invariant clients rely on: the
//! envelope's `data` field is either a JSON object or `null`.
//!
//! Normalization rules for the data slot, in order:
//! 1. JSON `null`, empty string, or the sentinel strings `"none"`/`"null"`
//!    (case-insensitive) become `null`
//! 2. A JSON object passes through
//! 3. A string that parses as a JSON object is decoded; any other string
//!    becomes `null`
//! 4. Everything else (arrays, numbers, booleans) becomes `null`

use serde_json::{Map, Value};
use tracing::debug;

use crate::models::AgentResponse;

/// What a domain handler produced, before normalization
#[derive(Debug, Clone)]
pub enum HandlerOutcome {
    /// Schema-validated response (exercise path)
    Typed(AgentResponse),
    /// Raw parsed envelope, not yet validated (nutrition path)
    Raw(Value),
    /// Text-only answer with data forced to null (general path)
    Null {
        /// The answer text
        text: String,
    },
}

/// Normalize a raw data slot per the rules above
#[must_use]
pub fn normalize_data(data: Value) -> Option<Map<String, Value>> {
    match data {
        Value::Null => None,
        Value::Object(map) => Some(map),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none")
                || trimmed.eq_ignore_ascii_case("null")
            {
                return None;
            }
            // Models sometimes double-encode the data object as a string
            match serde_json::from_str::<Value>(trimmed) {
                Ok(Value::Object(map)) => {
                    debug!("Decoded string-encoded data object");
                    Some(map)
                }
                _ => None,
            }
        }
        Value::Array(_) | Value::Number(_) | Value::Bool(_) => None,
    }
}

/// Reconcile a handler outcome into the uniform response envelope
#[must_use]
pub fn normalize(outcome: HandlerOutcome) -> AgentResponse {
    match outcome {
        HandlerOutcome::Typed(response) => AgentResponse {
            text: response.text,
            data: response.data.and_then(|map| normalize_data(Value::Object(map))),
        },
        HandlerOutcome::Raw(mut value) => {
            let text = value
                .get("text")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned();
            let data = value
                .get_mut("data")
                .map(Value::take)
                .and_then(normalize_data);
            AgentResponse { text, data }
        }
        HandlerOutcome::Null { text } => AgentResponse::text_only(text),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_and_sentinels_become_none() {
        assert!(normalize_data(Value::Null).is_none());
        assert!(normalize_data(json!("")).is_none());
        assert!(normalize_data(json!("  ")).is_none());
        assert!(normalize_data(json!("none")).is_none());
        assert!(normalize_data(json!("None")).is_none());
        assert!(normalize_data(json!("NULL")).is_none());
    }

    #[test]
    fn test_object_passes_through() {
        let data = normalize_data(json!({"total_days": 3})).unwrap();
        assert_eq!(data["total_days"], 3);
    }

    #[test]
    fn test_string_encoded_object_decoded() {
        let data = normalize_data(json!("{\"total_days\": 3}")).unwrap();
        assert_eq!(data["total_days"], 3);
    }

    #[test]
    fn test_non_object_values_become_none() {
        assert!(normalize_data(json!([1, 2, 3])).is_none());
        assert!(normalize_data(json!(42)).is_none());
        assert!(normalize_data(json!(true)).is_none());
        assert!(normalize_data(json!("just prose")).is_none());
        assert!(normalize_data(json!("[1, 2]")).is_none());
    }

    #[test]
    fn test_raw_outcome_extracts_text_and_data() {
        let response = normalize(HandlerOutcome::Raw(json!({
            "text": "here is your plan",
            "data": {"total_days": 1}
        })));
        assert_eq!(response.text, "here is your plan");
        assert_eq!(response.data.unwrap()["total_days"], 1);
    }

    #[test]
    fn test_raw_outcome_missing_fields() {
        let response = normalize(HandlerOutcome::Raw(json!({})));
        assert!(response.text.is_empty());
        assert!(response.data.is_none());
    }

    #[test]
    fn test_null_outcome_forces_data_null() {
        let response = normalize(HandlerOutcome::Null {
            text: "general answer".to_owned(),
        });
        assert_eq!(response.text, "general answer");
        assert!(response.data.is_none());
    }
}
