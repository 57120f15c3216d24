//! Curated high-precision patterns and the sensitive key-name set.
//!
//! These run regardless of which entity recognizer is plugged in, so the
//! content-inspecting strategy always has a regex-only floor.

use once_cell::sync::Lazy;
use regex::Regex;
use sl_common::Detection;

/// Entity type for values whose key name marks them as sensitive.
pub const SENSITIVE_KEY: &str = "SENSITIVE_KEY";

/// Case-insensitive key-name pattern, matched anywhere in the key
/// (`author` and `tokenizer` match too).
pub const SENSITIVE_KEY_PATTERN: &str = r"(?i)(api[_\-\s.]?key|access[_\-\s.]?key|private[_\-\s.]?key|secret|passw(or)?d|passphrase|pwd|token|auth|credentials?|ssn|social[_\-\s.]?security|soc[_\-\s.]?sec)";

static SENSITIVE_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(SENSITIVE_KEY_PATTERN).expect("sensitive key pattern compiles"));

/// Returns whether a field or nested key names sensitive content.
pub fn is_sensitive_key(key: &str) -> bool {
    SENSITIVE_KEY_RE.is_match(key)
}

/// A compiled credential pattern.
pub struct CuratedPattern {
    pub entity_type: &'static str,
    pub regex: Regex,
    pub score: f64,
}

fn curated(entity_type: &'static str, pattern: &str, score: f64) -> CuratedPattern {
    CuratedPattern {
        entity_type,
        regex: Regex::new(pattern).expect("curated pattern compiles"),
        score,
    }
}

static CURATED_PATTERNS: Lazy<Vec<CuratedPattern>> = Lazy::new(|| {
    vec![
        curated(
            "AWS_ACCESS_KEY",
            r"\b(?:AKIA|ASIA|AGPA|AIDA|AROA|ANPA|ANVA|AIPA)[0-9A-Z]{16}\b",
            1.0,
        ),
        curated("GITHUB_TOKEN", r"\bgh[pousr]_[A-Za-z0-9_]{36,}", 1.0),
        curated("GITLAB_TOKEN", r"\bglpat-[A-Za-z0-9\-_]{20,}", 1.0),
        curated("SLACK_TOKEN", r"\bxox[baprs]-[A-Za-z0-9\-]{10,}", 1.0),
        curated("GOOGLE_API_KEY", r"\bAIza[0-9A-Za-z_\-]{35}", 1.0),
        // OpenAI: sk-..., Anthropic: sk-ant-...
        curated("AI_API_KEY", r"\bsk-(?:ant-|proj-)?[A-Za-z0-9_\-]{20,}", 0.95),
        curated(
            "JWT",
            r"\beyJ[A-Za-z0-9_\-]+\.eyJ[A-Za-z0-9_\-]+\.[A-Za-z0-9_\-]+",
            0.95,
        ),
        curated("PRIVATE_KEY", r"-----BEGIN[A-Z ]*PRIVATE KEY-----", 1.0),
        curated(
            "CONNECTION_STRING",
            r#"(?i)\b(?:postgres(?:ql)?|mysql|mongodb(?:\+srv)?|redis|amqp)://[^\s:@/]+:[^\s@/]+@[^\s"']+"#,
            0.95,
        ),
    ]
});

/// Names of the curated patterns, for fingerprinting.
pub fn curated_entity_types() -> Vec<&'static str> {
    CURATED_PATTERNS.iter().map(|p| p.entity_type).collect()
}

/// Run every curated pattern over `text`.
pub fn scan_curated(text: &str) -> Vec<Detection> {
    let mut out = Vec::new();
    for pattern in CURATED_PATTERNS.iter() {
        for m in pattern.regex.find_iter(text) {
            out.push(Detection::new(pattern.entity_type, m.start(), m.end(), pattern.score));
        }
    }
    out
}
