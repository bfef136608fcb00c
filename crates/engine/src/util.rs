//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::Consistency(format!("invalid {label} id")))
}

/// Parse an optional UUID column.
pub(crate) fn parse_optional_uuid(value: Option<&str>, label: &str) -> ResultEngine<Option<Uuid>> {
    value.map(|raw| parse_uuid(raw, label)).transpose()
}

/// Trim, NFKC-normalize and collapse inner whitespace of a display name.
pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let normalized: String = value.nfkc().collect();
    let collapsed = normalized.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return Err(EngineError::Validation(format!(
            "{label} name must not be empty"
        )));
    }
    if collapsed.chars().count() > 120 {
        return Err(EngineError::Validation(format!(
            "{label} name must be at most 120 characters"
        )));
    }
    Ok(collapsed)
}

/// Case-insensitive key used for per-budget uniqueness checks.
pub(crate) fn name_key(display: &str) -> String {
    display.nfkc().flat_map(char::to_lowercase).collect()
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Trimmed transaction description, 1 to 255 characters.
pub(crate) fn normalize_description(value: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation(
            "description must not be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > 255 {
        return Err(EngineError::Validation(
            "description must be at most 255 characters".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

/// Validate a day-of-month configuration value.
pub(crate) fn validate_day_of_month(day: u32, label: &str) -> ResultEngine<()> {
    if !(1..=31).contains(&day) {
        return Err(EngineError::Validation(format!(
            "{label} must be between 1 and 31"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_trimmed_and_collapsed() {
        assert_eq!(
            normalize_required_name("  Super   market ", "category").unwrap(),
            "Super market"
        );
        assert!(normalize_required_name("   ", "category").is_err());
    }

    #[test]
    fn name_key_is_case_insensitive() {
        assert_eq!(name_key("Mercado"), name_key("MERCADO"));
        // Fullwidth letters fold to ASCII under NFKC.
        assert_eq!(name_key("ＲＥＮＴ"), "rent");
    }
}
