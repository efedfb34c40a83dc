// ABOUTME: JSON extraction from raw LLM text: fence stripping and synthetic call removal
// ABOUTME: Turns a model reply into a parsed envelope or a parse error
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ghiraas

//! # Envelope Extraction
//!
//! Models asked for "JSON only" still wrap replies in markdown fences or
//! leak pseudo function-call markup. This module undoes both before the
//! `serde_json` parse.
//!
//! The fence grammar is deliberately narrow: a leading ` ```json ` or
//! ` ``` ` and a trailing ` ``` ` are removed, once each, from the trimmed
//! ends only. Backticks inside JSON string values are untouched, and
//! unfenced input passes through unchanged.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::{AppError, AppResult};

/// Remove markdown code fences from model output
#[must_use]
pub fn strip_code_fences(content: &str) -> String {
    let mut content = content.trim();

    if let Some(rest) = content.strip_prefix("```json") {
        content = rest;
    } else if let Some(rest) = content.strip_prefix("```") {
        content = rest;
    }

    if let Some(rest) = content.strip_suffix("```") {
        content = rest;
    }

    content.trim().to_owned()
}

/// Regex matching synthetic function-call markup some models emit as text
/// instead of real tool calls, e.g. `<function/get_user_profile>...</function>`
/// or `<function(get_user_profile)>...</function>`
fn synthetic_call_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        #[allow(clippy::expect_used)]
        Regex::new(r"<function[/\(][^>]+>[\s\S]*?</function>")
            .expect("synthetic function-call regex is valid")
    })
}

/// Strip synthetic `<function...>...</function>` text from model output
#[must_use]
pub fn strip_synthetic_function_calls(content: &str) -> String {
    let stripped = synthetic_call_regex().replace_all(content, "");
    if stripped.len() != content.len() {
        warn!("Stripped synthetic function-call markup from model output");
    }
    stripped.trim().to_owned()
}

/// Extract a JSON value from raw model output
///
/// Applies synthetic-call stripping and fence stripping, then parses.
///
/// # Errors
///
/// Returns a serialization error when the cleaned text is not valid JSON.
/// The nutrition handler maps this to its fixed fallback envelope.
pub fn extract_json(content: &str) -> AppResult<Value> {
    let cleaned = strip_code_fences(&strip_synthetic_function_calls(content));
    debug!(raw_len = content.len(), cleaned_len = cleaned.len(), "Extracting JSON envelope");
    serde_json::from_str(&cleaned).map_err(AppError::from)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_fenced_json_with_language_tag() {
        let input = "```json\n{\"text\": \"hi\", \"data\": null}\n```";
        assert_eq!(strip_code_fences(input), "{\"text\": \"hi\", \"data\": null}");
    }

    #[test]
    fn test_fenced_json_without_language_tag() {
        let input = "```\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fences(input), "{\"a\": 1}");
    }

    #[test]
    fn test_unfenced_passes_through() {
        let input = "{\"a\": 1}";
        assert_eq!(strip_code_fences(input), input);
    }

    #[test]
    fn test_backticks_inside_string_values_survive() {
        let input = "```json\n{\"recipe\": \"use `tahini` paste\"}\n```";
        let value = extract_json(input).unwrap();
        assert_eq!(value["recipe"], "use `tahini` paste");
    }

    #[test]
    fn test_leading_fence_only() {
        let input = "```json\n{\"a\": 1}";
        assert_eq!(strip_code_fences(input), "{\"a\": 1}");
    }

    #[test]
    fn test_synthetic_function_calls_removed() {
        let input = "<function/get_user_profile>{\"user_id\": \"u1\"}</function>{\"text\": \"ok\", \"data\": null}";
        let value = extract_json(input).unwrap();
        assert_eq!(value["text"], "ok");
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(extract_json("not json at all").is_err());
        assert!(extract_json("```json\n{broken\n```").is_err());
    }
}
