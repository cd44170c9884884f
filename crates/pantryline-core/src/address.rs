//! Address normalization — clean a raw utterance into geocodable text.
//!
//! Callers speak naturally ("my address is 112 Alden Street"), so a fixed set
//! of leading filler phrases is stripped before the text goes to a geocoder.
//! A configured default locality is appended to bare street addresses that
//! don't already name a city, state, or local ZIP.

use crate::error::{AssistantError, Result};

/// Leading conversational filler stripped (case-insensitively) before geocoding.
const FILLER_PHRASES: &[&str] = &[
    "my address is",
    "i live at",
    "i'm at",
    "i'm located at",
    "address:",
    "location:",
    "it's",
    "it is",
];

/// Regional tokens that count as "locality already present" alongside the
/// configured city and state.
const REGION_TOKENS: &[&str] = &["new york", "ny", "onondaga"];

/// Local ZIP prefix recognized as a complete-enough address.
const ZIP_PREFIX: &str = "132";

/// A cleaned, geocodable address. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    /// The utterance exactly as received.
    pub raw: String,
    /// Cleaned text handed to the geocoder; non-empty, >= 3 chars.
    pub normalized: String,
    /// The configured fallback locality, kept for the geocode retry.
    pub default_locality: Option<String>,
}

/// Clean `raw` into an [`Address`], appending `default_locality` when the text
/// looks like a bare street address.
///
/// Fails with [`AssistantError::AddressTooShort`] when fewer than 3 characters
/// remain after stripping filler. Pure function of its inputs.
pub fn normalize(raw: &str, default_locality: Option<&str>) -> Result<Address> {
    let trimmed = raw.trim();

    let mut cleaned = trimmed;
    for phrase in FILLER_PHRASES {
        // Matching ASCII bytes case-insensitively keeps the split point a
        // valid char boundary regardless of what follows the phrase.
        if trimmed.len() >= phrase.len()
            && trimmed.as_bytes()[..phrase.len()].eq_ignore_ascii_case(phrase.as_bytes())
        {
            cleaned = trimmed[phrase.len()..].trim_start();
            break;
        }
    }
    let cleaned = cleaned.trim();

    if cleaned.len() < 3 {
        return Err(AssistantError::AddressTooShort(raw.to_string()));
    }

    let starts_with_digit = cleaned.chars().next().is_some_and(|c| c.is_ascii_digit());
    let normalized = match default_locality {
        Some(locality) if starts_with_digit && !mentions_locality(cleaned, locality) => {
            format!("{}, {}", cleaned, locality)
        }
        _ => cleaned.to_string(),
    };

    Ok(Address {
        raw: raw.to_string(),
        normalized,
        default_locality: default_locality.map(|s| s.to_string()),
    })
}

/// Does `text` already name the locality's city, its state abbreviation, a
/// regional token, or a local ZIP code?
fn mentions_locality(text: &str, locality: &str) -> bool {
    let lower = text.to_lowercase();
    let mut parts = locality.split(',');
    let city = parts.next().map(|s| s.trim().to_lowercase()).unwrap_or_default();
    let state = parts.next().map(|s| s.trim().to_lowercase()).unwrap_or_default();

    if !city.is_empty() && lower.contains(&city) {
        return true;
    }
    if !state.is_empty() && contains_token(&lower, &state) {
        return true;
    }
    for token in REGION_TOKENS {
        // Multi-word tokens can't come out of a whitespace split.
        let found = if token.contains(' ') {
            lower.contains(token)
        } else {
            contains_token(&lower, token)
        };
        if found {
            return true;
        }
    }
    has_zip(&lower)
}

fn contains_token(text: &str, token: &str) -> bool {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .any(|word| word == token)
}

fn has_zip(text: &str) -> bool {
    text.split(|c: char| !c.is_ascii_digit())
        .any(|run| run.len() == 5 && run.starts_with(ZIP_PREFIX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_leading_filler() {
        let addr = normalize("My address is 112 Alden Street, Syracuse, NY", None).unwrap();
        assert_eq!(addr.normalized, "112 Alden Street, Syracuse, NY");

        let addr = normalize("i live at 500 Main Street", None).unwrap();
        assert_eq!(addr.normalized, "500 Main Street");

        let addr = normalize("it's 42 Elm Ave", None).unwrap();
        assert_eq!(addr.normalized, "42 Elm Ave");
    }

    #[test]
    fn strips_filler_in_any_case() {
        let addr = normalize("I LIVE AT 500 Main Street, Syracuse, NY", None).unwrap();
        assert_eq!(addr.normalized, "500 Main Street, Syracuse, NY");

        let addr = normalize("Address: 112 Alden Street, Syracuse, NY", None).unwrap();
        assert_eq!(addr.normalized, "112 Alden Street, Syracuse, NY");
    }

    #[test]
    fn non_ascii_input_is_handled_without_stripping() {
        let addr = normalize("my address is 5 Señora Café Lane, Syracuse, NY", None).unwrap();
        assert_eq!(addr.normalized, "5 Señora Café Lane, Syracuse, NY");

        let addr = normalize("İstiklal Caddesi 10, Syracuse, NY", None).unwrap();
        assert_eq!(addr.normalized, "İstiklal Caddesi 10, Syracuse, NY");
    }

    #[test]
    fn rejects_too_short_input() {
        assert!(matches!(
            normalize("hm", None),
            Err(AssistantError::AddressTooShort(_))
        ));
        assert!(matches!(
            normalize("it's a", Some("Syracuse, NY")),
            Err(AssistantError::AddressTooShort(_))
        ));
        assert!(matches!(
            normalize("   ", None),
            Err(AssistantError::AddressTooShort(_))
        ));
    }

    #[test]
    fn appends_default_locality_to_bare_street_address() {
        let addr = normalize("112 Alden Street", Some("Syracuse, NY")).unwrap();
        assert_eq!(addr.normalized, "112 Alden Street, Syracuse, NY");
    }

    #[test]
    fn leaves_complete_address_unchanged() {
        let addr = normalize("112 Alden Street, Syracuse, NY", Some("Syracuse, NY")).unwrap();
        assert_eq!(addr.normalized, "112 Alden Street, Syracuse, NY");
    }

    #[test]
    fn zip_code_counts_as_locality() {
        let addr = normalize("112 Alden Street 13210", Some("Syracuse, NY")).unwrap();
        assert_eq!(addr.normalized, "112 Alden Street 13210");
    }

    #[test]
    fn state_abbreviation_counts_as_locality() {
        let addr = normalize("112 Alden Street, NY", Some("Syracuse, NY")).unwrap();
        assert_eq!(addr.normalized, "112 Alden Street, NY");
    }

    #[test]
    fn natural_language_address_passes_through() {
        // Doesn't start with a digit, so the locality is never appended;
        // downstream geocoding is trusted to parse it.
        let addr = normalize("the corner of Main and Elm", Some("Syracuse, NY")).unwrap();
        assert_eq!(addr.normalized, "the corner of Main and Elm");
    }

    #[test]
    fn raw_text_is_preserved() {
        let addr = normalize("My address is 112 Alden Street", Some("Syracuse, NY")).unwrap();
        assert_eq!(addr.raw, "My address is 112 Alden Street");
        assert_eq!(addr.normalized, "112 Alden Street, Syracuse, NY");
    }
}
