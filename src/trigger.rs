//! Trigger patterns and their resolution into an ordered run list.
//!
//! A pattern is either a literal trigger identifier or a wildcard expression
//! where `*` matches any run of characters (including none). Matching is
//! anchored at both ends and case-sensitive. Every other character is literal.

use crate::error::PrepareError;
use crate::model::ModelId;
use crate::registry::ModelRegistry;
use regex::Regex;
use std::collections::HashSet;

const WILDCARD: char = '*';

/// A single user supplied trigger pattern.
#[derive(Debug, Clone)]
pub enum TriggerPattern {
    Literal(String),
    Wildcard(Regex),
}

impl TriggerPattern {
    pub fn parse(raw: &str) -> Self {
        if !raw.contains(WILDCARD) {
            return Self::Literal(raw.to_string());
        }
        let body = raw
            .split(WILDCARD)
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");
        // Every non-`*` character is escaped, so the expression is always valid.
        match Regex::new(&format!("^{body}$")) {
            Ok(regex) => Self::Wildcard(regex),
            Err(_) => Self::Literal(raw.to_string()),
        }
    }

    pub fn matches(&self, trigger: &str) -> bool {
        match self {
            Self::Literal(raw) => raw == trigger,
            Self::Wildcard(regex) => regex.is_match(trigger),
        }
    }
}

/// Splits a comma-delimited CLI value into patterns, dropping surrounding
/// whitespace and empty items.
pub fn split_patterns(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Resolves `patterns` against `registry` into the run list.
///
/// Results of each pattern are concatenated in pattern order, then
/// deduplicated by model identity keeping the first occurrence.
///
/// # Errors
/// Returns [`PrepareError::NoModelsFound`] naming the patterns verbatim when
/// nothing matched.
pub fn resolve<S: AsRef<str>>(
    patterns: &[S],
    registry: &ModelRegistry,
) -> Result<Vec<ModelId>, PrepareError> {
    let mut seen = HashSet::new();
    let mut resolved = Vec::new();

    for pattern in patterns {
        let pattern = pattern.as_ref();
        let matched = registry.all_for_trigger(pattern);
        tracing::debug!(pattern, matched = matched.len(), "resolved trigger pattern");
        for id in matched {
            if seen.insert(id) {
                resolved.push(id);
            }
        }
    }

    if resolved.is_empty() {
        return Err(PrepareError::no_models_found(patterns));
    }
    Ok(resolved)
}
