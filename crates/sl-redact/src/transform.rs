//! Irreversible value transforms.
//!
//! All transforms operate on Unicode scalar values, so multi-byte
//! characters are never split.

use sha2::{Digest, Sha256};
use sl_common::Detection;

/// Number of hex characters kept from the SHA-256 digest.
pub const HASH_HEX_CHARS: usize = 16;

/// Prefix of hashed values.
pub const HASH_PREFIX: &str = "hash_";

/// Placeholder for a fully redacted field: `[EMAIL_REDACTED]`.
pub fn redact_placeholder(field_name: &str) -> String {
    format!("[{}_REDACTED]", field_name.to_uppercase())
}

/// Placeholder for a detected entity span: `[EMAIL_ADDRESS_REDACTED]`.
pub fn entity_placeholder(entity_type: &str) -> String {
    format!("[{}_REDACTED]", entity_type.to_uppercase())
}

/// Mask a value while keeping its outline.
///
/// Emails (split on the first `@`) keep the first character of the local
/// part and the whole domain. Other values longer than four characters keep
/// their first and last character; shorter ones become `***`.
pub fn mask_value(value: &str) -> String {
    if let Some((local, domain)) = value.split_once('@') {
        return match local.chars().next() {
            Some(first) => format!("{}***@{}", first, domain),
            None => format!("***@{}", domain),
        };
    }

    if value.chars().count() <= 4 {
        return "***".to_string();
    }

    let mut chars = value.chars();
    match (chars.next(), chars.next_back()) {
        (Some(first), Some(last)) => format!("{}***{}", first, last),
        _ => "***".to_string(),
    }
}

/// Deterministic one-way hash: `hash_` + first 16 hex chars of SHA-256.
pub fn hash_value(value: &str) -> String {
    let digest = hex::encode(Sha256::digest(value.as_bytes()));
    format!("{}{}", HASH_PREFIX, &digest[..HASH_HEX_CHARS])
}

/// Replace detected spans with entity placeholders.
///
/// Spans are applied from the highest start offset to the lowest so that
/// offsets not yet processed stay valid. A span nested inside a wider span
/// is absorbed by it; a span partially overlapping one already replaced is
/// cut at that span's start.
pub fn replace_spans(text: &str, detections: &[&Detection]) -> String {
    if detections.is_empty() {
        return text.to_string();
    }
    if text.is_empty() {
        return entity_placeholder(&detections[0].entity_type);
    }

    let mut by_start: Vec<&Detection> = detections.to_vec();
    by_start.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut ordered: Vec<&Detection> = Vec::with_capacity(by_start.len());
    let mut max_end = 0;
    for detection in by_start {
        if !ordered.is_empty() && detection.end <= max_end {
            continue;
        }
        max_end = max_end.max(detection.end);
        ordered.push(detection);
    }
    ordered.reverse();

    let mut out = text.to_string();
    // Everything before `limit` is still byte-identical to `text`.
    let mut limit = text.len();

    for detection in ordered {
        let start = floor_char_boundary(text, detection.start.min(limit));
        let end = ceil_char_boundary(text, detection.end.min(limit)).min(limit);
        if start >= end {
            continue;
        }
        out.replace_range(start..end, &entity_placeholder(&detection.entity_type));
        limit = start;
    }

    out
}

fn floor_char_boundary(text: &str, mut idx: usize) -> usize {
    while idx > 0 && !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn ceil_char_boundary(text: &str, mut idx: usize) -> usize {
    while idx < text.len() && !text.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_value("john@example.com"), "j***@example.com");
        assert_eq!(mask_value("@example.com"), "***@example.com");
        assert_eq!(mask_value("a@b@c"), "a***@b@c");
    }

    #[test]
    fn test_mask_plain() {
        assert_eq!(mask_value(""), "***");
        assert_eq!(mask_value("abcd"), "***");
        assert_eq!(mask_value("abcde"), "a***e");
        assert_eq!(mask_value("555-123-4567"), "5***7");
    }

    #[test]
    fn test_mask_counts_characters_not_bytes() {
        // four characters, eight bytes
        assert_eq!(mask_value("éééé"), "***");
        assert_eq!(mask_value("éabcü"), "é***ü");
    }

    #[test]
    fn test_hash_shape() {
        let hashed = hash_value("secret");
        assert!(hashed.starts_with("hash_"));
        assert_eq!(hashed.len(), 5 + 16);
        assert_eq!(hashed, hash_value("secret"));
        assert_ne!(hashed, hash_value("secret2"));
        // sha256("") = e3b0c44298fc1c14...
        assert_eq!(hash_value(""), "hash_e3b0c44298fc1c14");
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(redact_placeholder("ssn"), "[SSN_REDACTED]");
        assert_eq!(redact_placeholder("first_name"), "[FIRST_NAME_REDACTED]");
        assert_eq!(entity_placeholder("email_address"), "[EMAIL_ADDRESS_REDACTED]");
    }

    #[test]
    fn test_replace_spans_right_to_left() {
        let text = "mail a@b.io or c@d.io";
        let a = Detection::new("EMAIL_ADDRESS", 5, 11, 0.9);
        let b = Detection::new("EMAIL_ADDRESS", 15, 21, 0.9);
        assert_eq!(
            replace_spans(text, &[&a, &b]),
            "mail [EMAIL_ADDRESS_REDACTED] or [EMAIL_ADDRESS_REDACTED]"
        );
    }

    #[test]
    fn test_replace_adjacent_spans() {
        let a = Detection::new("A", 0, 3, 1.0);
        let b = Detection::new("B", 3, 6, 1.0);
        assert_eq!(replace_spans("abcdef", &[&a, &b]), "[A_REDACTED][B_REDACTED]");
    }

    #[test]
    fn test_replace_overlapping_spans_leaves_nothing_behind() {
        let a = Detection::new("A", 0, 8, 1.0);
        let b = Detection::new("B", 4, 12, 1.0);
        let out = replace_spans("0123456789ab", &[&a, &b]);
        assert_eq!(out, "[A_REDACTED][B_REDACTED]");
    }

    #[test]
    fn test_replace_nested_span_is_absorbed() {
        let outer = Detection::new("OUTER", 0, 10, 1.0);
        let inner = Detection::new("INNER", 2, 4, 1.0);
        let out = replace_spans("0123456789", &[&outer, &inner]);
        assert_eq!(out, "[OUTER_REDACTED]");
    }

    #[test]
    fn test_replace_chain_covers_union() {
        let outer = Detection::new("OUTER", 0, 10, 1.0);
        let inner = Detection::new("INNER", 2, 4, 1.0);
        let tail = Detection::new("TAIL", 8, 12, 1.0);
        let out = replace_spans("0123456789ab", &[&inner, &tail, &outer]);
        assert_eq!(out, "[OUTER_REDACTED][TAIL_REDACTED]");
    }

    #[test]
    fn test_replace_empty_text() {
        let d = Detection::whole("REDACT", 0);
        assert_eq!(replace_spans("", &[&d]), "[REDACT_REDACTED]");
        assert_eq!(replace_spans("", &[]), "");
    }

    #[test]
    fn test_replace_out_of_range_is_clamped() {
        let d = Detection::new("X", 2, 99, 1.0);
        assert_eq!(replace_spans("abcd", &[&d]), "ab[X_REDACTED]");
    }
}
