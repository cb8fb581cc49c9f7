//! Plausibility checks on a recovered key.

use serde::Serialize;

/// How much a recovered key should be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Confidence {
    Low,
    High,
}

/// Observations about an accepted key that do not reject it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Advisory {
    /// The key is purely alphanumeric.
    NoSpecialCharacters,
    ControlCharacters,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub accepted: bool,
    pub reason: Option<String>,
    pub confidence: Confidence,
    pub advisories: Vec<Advisory>,
}

pub fn validate(key: &str, min_key_len: usize) -> Verdict {
    let len = key.chars().count();
    if len < min_key_len {
        return Verdict {
            accepted: false,
            reason: Some(format!(
                "key has {} characters, at least {} required",
                len, min_key_len
            )),
            confidence: Confidence::Low,
            advisories: Vec::new(),
        };
    }

    let mut advisories = Vec::new();
    if key.chars().all(|c| c.is_ascii_alphanumeric()) {
        advisories.push(Advisory::NoSpecialCharacters);
    }
    if key.chars().any(char::is_control) {
        advisories.push(Advisory::ControlCharacters);
    }

    let confidence = if character_classes(key) >= 2 {
        Confidence::High
    } else {
        Confidence::Low
    };

    Verdict {
        accepted: true,
        reason: None,
        confidence,
        advisories,
    }
}

/// Number of distinct classes among lowercase, uppercase, digits and other.
fn character_classes(key: &str) -> usize {
    let classes = [
        key.chars().any(|c| c.is_lowercase()),
        key.chars().any(|c| c.is_uppercase()),
        key.chars().any(|c| c.is_ascii_digit()),
        key.chars().any(|c| !c.is_alphanumeric()),
    ];
    classes.iter().filter(|&&present| present).count()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_short_key_is_rejected() {
        let verdict = validate("abcd", 10);
        assert!(!verdict.accepted);
        assert_eq!(
            verdict.reason.as_deref(),
            Some("key has 4 characters, at least 10 required")
        );
    }

    #[test]
    fn test_length_floor_counts_characters() {
        // Ten characters, twenty bytes.
        assert!(validate("éééééééééé", 10).accepted);
        assert!(!validate("ééééééééé", 10).accepted);
    }

    #[test]
    fn test_mixed_key_is_high_confidence() {
        let verdict = validate("a1B2c3D4e5F6g7H8i9J0k1L2m3N4o5P6", 10);
        assert!(verdict.accepted);
        assert_eq!(verdict.confidence, Confidence::High);
        assert_eq!(verdict.advisories, vec![Advisory::NoSpecialCharacters]);
    }

    #[test]
    fn test_single_class_key_is_low_confidence() {
        let verdict = validate("aaaaaaaaaaaa", 10);
        assert!(verdict.accepted);
        assert_eq!(verdict.confidence, Confidence::Low);
    }

    #[test]
    fn test_special_characters_suppress_advisory() {
        let verdict = validate("k3y-with/slashes+", 10);
        assert!(verdict.accepted);
        assert!(verdict.advisories.is_empty());
    }

    #[test]
    fn test_control_characters_advisory() {
        let verdict = validate("abc\u{1}defghij", 10);
        assert!(verdict.accepted);
        assert_eq!(verdict.advisories, vec![Advisory::ControlCharacters]);
    }
}
