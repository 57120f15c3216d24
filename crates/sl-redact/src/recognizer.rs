//! Pluggable entity recognition.
//!
//! The content-inspecting strategy asks an [`EntityRecognizer`] for PII
//! spans in each leaf string. Backends are created lazily through a
//! [`RecognizerFactory`], so a heavy model is only loaded when the first
//! value is scanned and a missing backend can be detected at that point.
//! [`PatternRecognizer`] is the built-in regex backend.

use once_cell::sync::Lazy;
use regex::Regex;
use sl_common::Detection;

use crate::error::RecognizerError;

/// A general-purpose PII recognizer.
pub trait EntityRecognizer: Send {
    /// Stable backend identifier (part of the policy hash).
    fn name(&self) -> &str;

    /// Find entity spans in `text`. Offsets are byte offsets into `text`.
    fn analyze(&self, text: &str) -> Result<Vec<Detection>, RecognizerError>;
}

/// Creates a recognizer on first use.
pub type RecognizerFactory =
    Box<dyn Fn() -> Result<Box<dyn EntityRecognizer>, RecognizerError> + Send>;

/// Factory for the built-in pattern recognizer.
pub fn default_factory() -> RecognizerFactory {
    Box::new(|| Ok(Box::new(PatternRecognizer::new()) as Box<dyn EntityRecognizer>))
}

struct PiiPattern {
    entity_type: &'static str,
    regex: Regex,
    score: f64,
    validate: Option<fn(&str) -> bool>,
}

fn pii(entity_type: &'static str, pattern: &str, score: f64) -> PiiPattern {
    PiiPattern {
        entity_type,
        regex: Regex::new(pattern).expect("pii pattern compiles"),
        score,
        validate: None,
    }
}

// Most specific first; overlaps are resolved in favor of the longer match.
static PII_PATTERNS: Lazy<Vec<PiiPattern>> = Lazy::new(|| {
    vec![
        pii(
            "EMAIL_ADDRESS",
            r"[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}",
            0.95,
        ),
        pii("US_SSN", r"\b\d{3}-\d{2}-\d{4}\b", 0.85),
        PiiPattern {
            validate: Some(luhn_valid),
            ..pii("CREDIT_CARD", r"\b(?:\d[ \-]?){12,18}\d\b", 0.9)
        },
        pii(
            "IBAN_CODE",
            r"\b[A-Z]{2}\d{2}[A-Z0-9]{4}\d{7}(?:[A-Z0-9]?\d{0,16})\b",
            0.85,
        ),
        pii(
            "IP_ADDRESS",
            r"\b(?:(?:25[0-5]|2[0-4]\d|[01]?\d\d?)\.){3}(?:25[0-5]|2[0-4]\d|[01]?\d\d?)\b",
            0.7,
        ),
        pii("IP_ADDRESS", r"\b(?:[0-9a-fA-F]{1,4}:){7}[0-9a-fA-F]{1,4}\b", 0.75),
        pii(
            "PHONE_NUMBER",
            r"(?:\+\d{1,3}[\s.\-]?)?(?:\(\d{3}\)|\b\d{3})[\s.\-]?\d{3}[\s.\-]?\d{4}\b",
            0.6,
        ),
    ]
});

/// Regex-based recognizer for common PII classes.
///
/// Covers email, phone, credit card (Luhn-checked), IP address, US SSN and
/// IBAN.
#[derive(Debug, Clone, Default)]
pub struct PatternRecognizer;

impl PatternRecognizer {
    pub fn new() -> Self {
        Self
    }

    /// Entity types this recognizer can emit.
    pub fn supported_entities() -> Vec<&'static str> {
        let mut types: Vec<&'static str> = PII_PATTERNS.iter().map(|p| p.entity_type).collect();
        types.dedup();
        types
    }
}

impl EntityRecognizer for PatternRecognizer {
    fn name(&self) -> &str {
        "pattern"
    }

    fn analyze(&self, text: &str) -> Result<Vec<Detection>, RecognizerError> {
        let mut matches = Vec::new();
        for pattern in PII_PATTERNS.iter() {
            for m in pattern.regex.find_iter(text) {
                if let Some(validate) = pattern.validate {
                    if !validate(m.as_str()) {
                        continue;
                    }
                }
                matches.push(Detection::new(
                    pattern.entity_type,
                    m.start(),
                    m.end(),
                    pattern.score,
                ));
            }
        }
        Ok(dedup_overlapping(matches))
    }
}

/// Remove overlapping matches, keeping the longer one, or the
/// higher-scoring one if lengths are equal.
fn dedup_overlapping(mut matches: Vec<Detection>) -> Vec<Detection> {
    matches.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut kept: Vec<Detection> = Vec::with_capacity(matches.len());
    for candidate in matches {
        match kept.last_mut() {
            Some(last) if candidate.start < last.end => {
                let last_len = last.end - last.start;
                let cand_len = candidate.end - candidate.start;
                if cand_len > last_len || (cand_len == last_len && candidate.score > last.score) {
                    *last = candidate;
                }
            }
            _ => kept.push(candidate),
        }
    }
    kept
}

/// Luhn checksum over the digits of a candidate card number.
pub fn luhn_valid(candidate: &str) -> bool {
    let digits: Vec<u32> = candidate.chars().filter_map(|c| c.to_digit(10)).collect();
    if !(13..=19).contains(&digits.len()) {
        return false;
    }

    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity_types(text: &str) -> Vec<String> {
        PatternRecognizer::new()
            .analyze(text)
            .unwrap()
            .into_iter()
            .map(|d| d.entity_type)
            .collect()
    }

    #[test]
    fn test_email() {
        let text = "contact john.doe@example.com today";
        let found = PatternRecognizer::new().analyze(text).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].entity_type, "EMAIL_ADDRESS");
        assert_eq!(&text[found[0].start..found[0].end], "john.doe@example.com");
    }

    #[test]
    fn test_phone_ssn_ip() {
        assert_eq!(entity_types("call 555-123-4567"), vec!["PHONE_NUMBER"]);
        assert_eq!(entity_types("call (555) 123-4567"), vec!["PHONE_NUMBER"]);
        assert_eq!(entity_types("ssn 123-45-6789"), vec!["US_SSN"]);
        assert_eq!(entity_types("from 192.168.1.20"), vec!["IP_ADDRESS"]);
    }

    #[test]
    fn test_credit_card_requires_luhn() {
        assert_eq!(entity_types("card 4111 1111 1111 1111"), vec!["CREDIT_CARD"]);
        assert!(!entity_types("order 4111 1111 1111 1112").contains(&"CREDIT_CARD".to_string()));
    }

    #[test]
    fn test_luhn() {
        assert!(luhn_valid("4111111111111111"));
        assert!(luhn_valid("4111-1111-1111-1111"));
        assert!(!luhn_valid("4111111111111112"));
        assert!(!luhn_valid("411"));
    }

    #[test]
    fn test_overlaps_keep_longer_match() {
        // Digit runs inside the card must not surface as separate entities.
        let found = PatternRecognizer::new().analyze("4111111111111111").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].entity_type, "CREDIT_CARD");
    }

    #[test]
    fn test_plain_text() {
        assert!(entity_types("nothing to see here").is_empty());
        assert!(entity_types("").is_empty());
    }

    #[test]
    fn test_supported_entities() {
        let entities = PatternRecognizer::supported_entities();
        assert!(entities.contains(&"EMAIL_ADDRESS"));
        assert!(entities.contains(&"IP_ADDRESS"));
        assert_eq!(
            entities.iter().filter(|e| **e == "IP_ADDRESS").count(),
            1
        );
    }
}
